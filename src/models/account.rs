use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::DatabaseAccountId;
use crate::models::common::{check_range, normalize_location};
use crate::sdk;
use crate::sdk::DatabaseAccountKind::{GlobalDocumentDB, MongoDB, Parse};
use crate::traits::{CosmosResource, CosmosResourceId};

pub use crate::sdk::{
    AnalyticalStorageSchemaType, BackupStorageRedundancy, ConsistencyLevel, ContinuousTier, CreateMode,
    DatabaseAccountKind, DatabaseAccountOfferType, ManagedIdentityType, MinimalTlsVersion,
};

pub const DEFAULT_MAX_STALENESS_PREFIX: i64 = 100;
pub const DEFAULT_MAX_INTERVAL_IN_SECONDS: i64 = 5;

const MULTI_REGION_MIN_STALENESS_PREFIX: i64 = 100_000;
const MULTI_REGION_MIN_INTERVAL_IN_SECONDS: i64 = 300;

static ACCOUNT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-z0-9]{3,50}$").expect("account name pattern is valid"));

static VERSIONLESS_KEY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://[^/]+/keys/[^/]+/?$").expect("key id pattern is valid"));

static RFC3339: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$")
        .expect("timestamp pattern is valid")
});

const ENABLE_MONGO: &str = "EnableMongo";
const MONGO_DB_V34: &str = "MongoDBv3.4";

/// Which account kinds accept a capability. Names compare case-insensitively.
const CAPABILITY_KINDS: &[(&str, &[DatabaseAccountKind])] = &[
    ("EnableMongo", &[MongoDB]),
    ("EnableMongo16MBDocumentSupport", &[MongoDB]),
    ("EnableMongoRoleBasedAccessControl", &[MongoDB]),
    ("EnableMongoRetryableWrites", &[MongoDB]),
    ("EnableUniqueCompoundNestedDocs", &[MongoDB]),
    ("EnableTtlOnCustomPath", &[MongoDB]),
    ("EnablePartialUniqueIndex", &[MongoDB]),
    ("EnableNoSQLVectorSearch", &[GlobalDocumentDB]),
    ("EnableNoSQLFullTextSearch", &[GlobalDocumentDB]),
    ("EnableCassandra", &[GlobalDocumentDB, Parse]),
    ("EnableGremlin", &[GlobalDocumentDB, Parse]),
    ("EnableTable", &[GlobalDocumentDB, Parse]),
    ("EnableServerless", &[GlobalDocumentDB, MongoDB, Parse]),
    ("EnableAggregationPipeline", &[GlobalDocumentDB, MongoDB, Parse]),
    ("MongoDBv3.4", &[GlobalDocumentDB, MongoDB, Parse]),
    ("mongoEnableDocLevelTTL", &[GlobalDocumentDB, MongoDB, Parse]),
    ("DeleteAllItemsByPartitionKey", &[GlobalDocumentDB, MongoDB, Parse]),
    ("DisableRateLimitingResponses", &[GlobalDocumentDB, MongoDB, Parse]),
    ("AllowSelfServeUpgradeToMongo36", &[GlobalDocumentDB, MongoDB, Parse]),
];

/// Capabilities the service lets an existing account gain.
const ADDABLE_CAPABILITIES: &[&str] = &[
    "DeleteAllItemsByPartitionKey",
    "DisableRateLimitingResponses",
    "AllowSelfServeUpgradeToMongo36",
    "EnableAggregationPipeline",
    "MongoDBv3.4",
    "mongoEnableDocLevelTTL",
    "EnableMongo16MBDocumentSupport",
    "EnableMongoRetryableWrites",
    "EnableMongoRoleBasedAccessControl",
    "EnableUniqueCompoundNestedDocs",
    "EnableTtlOnCustomPath",
    "EnablePartialUniqueIndex",
];

/// Capabilities the service lets an existing account drop.
const REMOVABLE_CAPABILITIES: &[&str] = &["EnableMongoRetryableWrites", "DisableRateLimitingResponses"];

fn contains_ignore_case(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().any(|c| c.eq_ignore_ascii_case(needle))
}

/// The account kinds a capability may be enabled on, `None` for unknown capabilities.
pub fn capability_kinds(capability: &str) -> Option<&'static [DatabaseAccountKind]> {
    CAPABILITY_KINDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(capability))
        .map(|(_, kinds)| *kinds)
}

/// Whether moving an account of `kind` from `old` to `new` capabilities can be
/// done in place. Every added capability must be known, supported by the kind
/// and addable; every removed one must be removable.
pub fn can_update_capabilities(kind: DatabaseAccountKind, old: &[String], new: &[String]) -> bool {
    let had = |name: &str, list: &[String]| list.iter().any(|c| c.eq_ignore_ascii_case(name));

    let additions_ok = new.iter().filter(|c| !had(c, old)).all(|added| {
        capability_kinds(added).is_some_and(|kinds| kinds.contains(&kind))
            && contains_ignore_case(ADDABLE_CAPABILITIES, added)
    });

    let removals_ok = old
        .iter()
        .filter(|c| !had(c, new))
        .all(|removed| contains_ignore_case(REMOVABLE_CAPABILITIES, removed));

    additions_ok && removals_ok
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ConsistencyPolicy {
    pub consistency_level: ConsistencyLevel,
    /// Zero or absent means the service default of 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_interval_in_seconds: Option<i64>,
    /// Zero or absent means the service default of 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_staleness_prefix: Option<i64>,
}

impl ConsistencyPolicy {
    pub fn effective_max_interval_in_seconds(&self) -> i64 {
        self.max_interval_in_seconds
            .filter(|v| *v != 0)
            .unwrap_or(DEFAULT_MAX_INTERVAL_IN_SECONDS)
    }

    pub fn effective_max_staleness_prefix(&self) -> i64 {
        self.max_staleness_prefix
            .filter(|v| *v != 0)
            .unwrap_or(DEFAULT_MAX_STALENESS_PREFIX)
    }

    fn validate(&self, regions: usize) -> Result<(), ValidationError> {
        if let Some(interval) = self.max_interval_in_seconds.filter(|v| *v != 0) {
            check_range("max_interval_in_seconds", interval, 5, 86400)?;
        }
        if let Some(prefix) = self.max_staleness_prefix.filter(|v| *v != 0) {
            check_range("max_staleness_prefix", prefix, 10, i64::from(i32::MAX))?;
        }

        if regions > 1 && self.consistency_level == ConsistencyLevel::BoundedStaleness {
            let prefix = self.effective_max_staleness_prefix();
            if prefix < MULTI_REGION_MIN_STALENESS_PREFIX {
                return Err(ValidationError::MultiRegionStaleness {
                    attribute: "max_staleness_prefix".to_string(),
                    value: prefix,
                    min: MULTI_REGION_MIN_STALENESS_PREFIX,
                });
            }
            let interval = self.effective_max_interval_in_seconds();
            if interval < MULTI_REGION_MIN_INTERVAL_IN_SECONDS {
                return Err(ValidationError::MultiRegionStaleness {
                    attribute: "max_interval_in_seconds".to_string(),
                    value: interval,
                    min: MULTI_REGION_MIN_INTERVAL_IN_SECONDS,
                });
            }
        }
        Ok(())
    }

    fn expand(&self) -> sdk::ConsistencyPolicy {
        sdk::ConsistencyPolicy {
            default_consistency_level: self.consistency_level,
            max_staleness_prefix: Some(self.effective_max_staleness_prefix()),
            max_interval_in_seconds: Some(self.effective_max_interval_in_seconds()),
        }
    }

    fn flatten(policy: &sdk::ConsistencyPolicy) -> Self {
        ConsistencyPolicy {
            consistency_level: policy.default_consistency_level,
            max_interval_in_seconds: policy.max_interval_in_seconds,
            max_staleness_prefix: policy.max_staleness_prefix,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GeoLocation {
    pub location: String,
    pub failover_priority: i64,
    pub zone_redundant: bool,
    /// Assigned by the service, e.g. `acc1-westeurope`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
}

/// Priorities and regions must be unique, priorities dense from zero.
pub fn validate_geo_locations(locations: &[GeoLocation]) -> Result<(), ValidationError> {
    let mut priorities = HashSet::new();
    let mut names = HashSet::new();
    let max_priority = locations.len() as i64 - 1;

    for location in locations {
        let priority = location.failover_priority;
        let name = normalize_location(&location.location);

        if !priorities.insert(priority) {
            return Err(ValidationError::DuplicateFailoverPriority(priority));
        }
        if !names.insert(name.clone()) {
            return Err(ValidationError::DuplicateGeoLocation(name));
        }
        if priority > max_priority {
            return Err(ValidationError::FailoverPriorityTooHigh { priority });
        }
    }

    if !priorities.contains(&0) {
        return Err(ValidationError::MissingPrimaryGeoLocation);
    }
    Ok(())
}

/// Failover policies carry no zone information, so it is looked up in
/// `locations` by id.
fn flatten_geo_locations(properties: &sdk::DatabaseAccountProperties) -> Vec<GeoLocation> {
    let zone_redundant = |id: &str| {
        properties
            .locations
            .iter()
            .flatten()
            .find(|l| l.id.as_deref() == Some(id))
            .and_then(|l| l.is_zone_redundant)
            .unwrap_or(false)
    };

    properties
        .failover_policies
        .iter()
        .flatten()
        .filter_map(|policy| {
            let id = policy.id.as_deref()?;
            Some(GeoLocation {
                location: normalize_location(policy.location_name.as_deref().unwrap_or_default()),
                failover_priority: policy.failover_priority.unwrap_or_default(),
                zone_redundant: zone_redundant(id),
                id: id.to_string(),
            })
        })
        .sorted_by_key(|l| l.failover_priority)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VirtualNetworkRule {
    pub id: String,
    pub ignore_missing_vnet_service_endpoint: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AnalyticalStorage {
    pub schema_type: AnalyticalStorageSchemaType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Capacity {
    pub total_throughput_limit: i64,
}

/// Backup policy, tagged by `type`. Continuous backup takes no interval or
/// retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum Backup {
    Periodic {
        interval_in_minutes: i64,
        retention_in_hours: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        storage_redundancy: Option<BackupStorageRedundancy>,
    },
    Continuous {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tier: Option<ContinuousTier>,
    },
}

impl Backup {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Backup::Periodic {
            interval_in_minutes,
            retention_in_hours,
            ..
        } = self
        {
            check_range("backup.interval_in_minutes", *interval_in_minutes, 60, 1440)?;
            check_range("backup.retention_in_hours", *retention_in_hours, 8, 720)?;
        }
        Ok(())
    }

    fn is_continuous(&self) -> bool {
        matches!(self, Backup::Continuous { .. })
    }

    fn expand(&self) -> sdk::BackupPolicy {
        match self {
            Backup::Periodic {
                interval_in_minutes,
                retention_in_hours,
                storage_redundancy,
            } => sdk::BackupPolicy::Periodic {
                periodic_mode_properties: Some(sdk::PeriodicModeProperties {
                    backup_interval_in_minutes: Some(*interval_in_minutes),
                    backup_retention_interval_in_hours: Some(*retention_in_hours),
                    backup_storage_redundancy: *storage_redundancy,
                }),
            },
            Backup::Continuous { tier } => sdk::BackupPolicy::Continuous {
                continuous_mode_properties: tier.map(|tier| sdk::ContinuousModeProperties { tier: Some(tier) }),
            },
        }
    }

    fn flatten(policy: &sdk::BackupPolicy) -> Self {
        match policy {
            sdk::BackupPolicy::Periodic {
                periodic_mode_properties,
            } => {
                let props = periodic_mode_properties.clone().unwrap_or_default();
                Backup::Periodic {
                    interval_in_minutes: props.backup_interval_in_minutes.unwrap_or_default(),
                    retention_in_hours: props.backup_retention_interval_in_hours.unwrap_or_default(),
                    storage_redundancy: props.backup_storage_redundancy,
                }
            }
            sdk::BackupPolicy::Continuous {
                continuous_mode_properties,
            } => Backup::Continuous {
                tier: continuous_mode_properties.as_ref().and_then(|p| p.tier),
            },
        }
    }
}

const FIRST_PARTY_IDENTITY: &str = "FirstPartyIdentity";
const SYSTEM_ASSIGNED_IDENTITY: &str = "SystemAssignedIdentity";
const USER_ASSIGNED_IDENTITY_PREFIX: &str = "UserAssignedIdentity=";

/// The identity the account uses to reach its customer-managed key.
/// Written as `FirstPartyIdentity`, `SystemAssignedIdentity` or
/// `UserAssignedIdentity={identity id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DefaultIdentity {
    #[default]
    FirstParty,
    SystemAssigned,
    UserAssigned(String),
}

impl fmt::Display for DefaultIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultIdentity::FirstParty => f.write_str(FIRST_PARTY_IDENTITY),
            DefaultIdentity::SystemAssigned => f.write_str(SYSTEM_ASSIGNED_IDENTITY),
            DefaultIdentity::UserAssigned(id) => write!(f, "{USER_ASSIGNED_IDENTITY_PREFIX}{id}"),
        }
    }
}

impl FromStr for DefaultIdentity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            FIRST_PARTY_IDENTITY => Ok(DefaultIdentity::FirstParty),
            SYSTEM_ASSIGNED_IDENTITY => Ok(DefaultIdentity::SystemAssigned),
            _ => match s.strip_prefix(USER_ASSIGNED_IDENTITY_PREFIX) {
                Some(id) if !id.is_empty() => Ok(DefaultIdentity::UserAssigned(id.to_string())),
                _ => Err(ValidationError::InvalidDefaultIdentity(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for DefaultIdentity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DefaultIdentity> for String {
    fn from(value: DefaultIdentity) -> Self {
        value.to_string()
    }
}

/// Managed identity of the account. `identity_ids` only applies to the
/// user-assigned types and reads back in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: ManagedIdentityType,
    pub identity_ids: Vec<String>,
    // Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Identity {
    fn validate(&self) -> Result<(), ValidationError> {
        let identity_type = self.identity_type.to_string();
        if self.identity_type.is_user_assigned() && self.identity_ids.is_empty() {
            return Err(ValidationError::MissingIdentityIds(identity_type));
        }
        if !self.identity_type.is_user_assigned() && !self.identity_ids.is_empty() {
            return Err(ValidationError::UnexpectedIdentityIds(identity_type));
        }
        Ok(())
    }

    fn expand(&self) -> sdk::ManagedServiceIdentity {
        let user_assigned_identities = self.identity_type.is_user_assigned().then(|| {
            self.identity_ids
                .iter()
                .map(|id| (id.clone(), sdk::UserAssignedIdentity::default()))
                .collect()
        });
        sdk::ManagedServiceIdentity {
            identity_type: Some(self.identity_type),
            user_assigned_identities,
            ..Default::default()
        }
    }

    /// `None` when the service reports no identity.
    fn flatten(identity: &sdk::ManagedServiceIdentity) -> Option<Self> {
        let identity_type = identity.identity_type.unwrap_or_default();
        if identity_type == ManagedIdentityType::None {
            return None;
        }
        Some(Identity {
            identity_type,
            identity_ids: identity
                .user_assigned_identities
                .iter()
                .flat_map(|identities| identities.keys())
                .cloned()
                .collect(),
            principal_id: identity.principal_id.clone(),
            tenant_id: identity.tenant_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RestoreDatabase {
    pub name: String,
    pub collection_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RestoreGremlinDatabase {
    pub name: String,
    pub graph_names: Vec<String>,
}

/// Point-in-time restore source, used with `create_mode = Restore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Restore {
    pub source_cosmosdb_account_id: String,
    pub restore_timestamp_in_utc: String,
    pub database: Vec<RestoreDatabase>,
    pub gremlin_database: Vec<RestoreGremlinDatabase>,
    pub tables_to_restore: Vec<String>,
}

impl Restore {
    fn validate(&self) -> Result<(), ValidationError> {
        if !RFC3339.is_match(&self.restore_timestamp_in_utc) {
            return Err(ValidationError::InvalidTimestamp {
                attribute: "restore.restore_timestamp_in_utc".to_string(),
                value: self.restore_timestamp_in_utc.clone(),
            });
        }
        Ok(())
    }

    fn expand(&self) -> sdk::RestoreParameters {
        sdk::RestoreParameters {
            restore_mode: Some(sdk::RestoreMode::PointInTime),
            restore_source: Some(self.source_cosmosdb_account_id.clone()),
            restore_timestamp_in_utc: Some(self.restore_timestamp_in_utc.clone()),
            databases_to_restore: Some(
                self.database
                    .iter()
                    .map(|db| sdk::DatabaseRestoreResource {
                        database_name: Some(db.name.clone()),
                        collection_names: Some(db.collection_names.clone()),
                    })
                    .collect(),
            ),
            gremlin_databases_to_restore: Some(
                self.gremlin_database
                    .iter()
                    .map(|db| sdk::GremlinDatabaseRestoreResource {
                        database_name: Some(db.name.clone()),
                        graph_names: Some(db.graph_names.clone()),
                    })
                    .collect(),
            ),
            tables_to_restore: (!self.tables_to_restore.is_empty()).then(|| self.tables_to_restore.clone()),
        }
    }

    fn flatten(params: &sdk::RestoreParameters) -> Self {
        Restore {
            source_cosmosdb_account_id: params.restore_source.clone().unwrap_or_default(),
            restore_timestamp_in_utc: params.restore_timestamp_in_utc.clone().unwrap_or_default(),
            database: params
                .databases_to_restore
                .iter()
                .flatten()
                .map(|db| RestoreDatabase {
                    name: db.database_name.clone().unwrap_or_default(),
                    collection_names: db.collection_names.clone().unwrap_or_default(),
                })
                .collect(),
            gremlin_database: params
                .gremlin_databases_to_restore
                .iter()
                .flatten()
                .map(|db| RestoreGremlinDatabase {
                    name: db.database_name.clone().unwrap_or_default(),
                    graph_names: db.graph_names.clone().unwrap_or_default(),
                })
                .collect(),
            tables_to_restore: params.tables_to_restore.clone().unwrap_or_default(),
        }
    }
}

/// An `azurerm_cosmosdb_account`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DatabaseAccountModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub tags: BTreeMap<String, String>,
    pub offer_type: DatabaseAccountOfferType,
    pub kind: DatabaseAccountKind,
    pub consistency_policy: ConsistencyPolicy,
    pub geo_locations: Vec<GeoLocation>,
    pub capabilities: Vec<String>,
    pub ip_range_filter: Vec<String>,
    pub is_virtual_network_filter_enabled: bool,
    pub virtual_network_rules: Vec<VirtualNetworkRule>,
    pub free_tier_enabled: bool,
    pub automatic_failover_enabled: bool,
    pub multiple_write_locations_enabled: bool,
    /// Absent leaves the service default (enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access_enabled: Option<bool>,
    pub analytical_storage_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage: Option<AnalyticalStorage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<Backup>,
    pub minimal_tls_version: MinimalTlsVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongo_server_version: Option<String>,
    pub local_authentication_disabled: bool,
    pub network_acl_bypass_for_azure_services: bool,
    pub network_acl_bypass_ids: Vec<String>,
    /// Absent leaves the service default (enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_metadata_writes_enabled: Option<bool>,
    pub burst_capacity_enabled: bool,
    pub partition_merge_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_vault_key_id: Option<String>,
    #[schema(value_type = String)]
    pub default_identity_type: DefaultIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<Restore>,

    // Computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub read_endpoints: Vec<String>,
    pub write_endpoints: Vec<String>,
}

impl DatabaseAccountModel {
    fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c == name)
    }
}

fn endpoints(locations: Option<&Vec<sdk::Location>>) -> Vec<String> {
    locations
        .into_iter()
        .flatten()
        .filter_map(|l| l.document_endpoint.clone())
        .collect()
}

/// Attribute names for the connection strings the service describes.
const CONNECTION_STRING_ATTRIBUTES: &[(&str, &str)] = &[
    ("Primary SQL Connection String", "primary_sql_connection_string"),
    ("Secondary SQL Connection String", "secondary_sql_connection_string"),
    ("Primary Read-Only SQL Connection String", "primary_readonly_sql_connection_string"),
    ("Secondary Read-Only SQL Connection String", "secondary_readonly_sql_connection_string"),
    ("Primary MongoDB Connection String", "primary_mongodb_connection_string"),
    ("Secondary MongoDB Connection String", "secondary_mongodb_connection_string"),
    ("Primary Read-Only MongoDB Connection String", "primary_readonly_mongodb_connection_string"),
    ("Secondary Read-Only MongoDB Connection String", "secondary_readonly_mongodb_connection_string"),
];

/// Keys and connection strings of an account, from its list actions.
///
/// These are kept apart from [`DatabaseAccountModel`] so reading an account
/// never puts secrets into state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AccountKeys {
    pub primary_key: String,
    pub secondary_key: String,
    pub primary_readonly_key: String,
    pub secondary_readonly_key: String,
    /// Every connection string, in service order.
    pub connection_strings: Vec<String>,
    /// The recognised connection strings by attribute name, e.g.
    /// `primary_sql_connection_string`.
    pub named_connection_strings: BTreeMap<String, String>,
}

impl AccountKeys {
    pub fn flatten(
        keys: &sdk::DatabaseAccountListKeysResult,
        readonly_keys: &sdk::DatabaseAccountListKeysResult,
        connection_strings: &sdk::DatabaseAccountListConnectionStringsResult,
    ) -> Self {
        let entries = connection_strings.connection_strings.iter().flatten();
        let named_connection_strings = entries
            .clone()
            .filter_map(|entry| {
                let description = entry.description.as_deref()?;
                let (_, attribute) = CONNECTION_STRING_ATTRIBUTES
                    .iter()
                    .find(|(known, _)| *known == description)?;
                Some((attribute.to_string(), entry.connection_string.clone()?))
            })
            .collect();

        AccountKeys {
            primary_key: keys.primary_master_key.clone().unwrap_or_default(),
            secondary_key: keys.secondary_master_key.clone().unwrap_or_default(),
            primary_readonly_key: readonly_keys.primary_readonly_master_key.clone().unwrap_or_default(),
            secondary_readonly_key: readonly_keys.secondary_readonly_master_key.clone().unwrap_or_default(),
            connection_strings: entries.filter_map(|entry| entry.connection_string.clone()).collect(),
            named_connection_strings,
        }
    }
}

pub struct DatabaseAccount;

impl CosmosResource for DatabaseAccount {
    type Id = DatabaseAccountId;
    type Model = DatabaseAccountModel;
    type Request = sdk::DatabaseAccountCreateUpdateParameters;
    type Response = sdk::DatabaseAccountGetResults;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(DatabaseAccountId::new(
            subscription_id,
            &model.resource_group_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        if !ACCOUNT_NAME.is_match(&model.name) {
            return Err(ValidationError::InvalidAccountName(model.name.clone()));
        }
        model.consistency_policy.validate(model.geo_locations.len())?;
        validate_geo_locations(&model.geo_locations)?;
        if let Some(backup) = &model.backup {
            backup.validate()?;
        }
        if model.kind == MongoDB && model.has_capability(MONGO_DB_V34) && !model.has_capability(ENABLE_MONGO) {
            return Err(ValidationError::MissingEnableMongo);
        }
        if let Some(key) = model.key_vault_key_id.as_deref().filter(|k| !VERSIONLESS_KEY_ID.is_match(k)) {
            return Err(ValidationError::InvalidKeyVaultKeyId(key.to_string()));
        }
        if matches!(&model.default_identity_type, DefaultIdentity::UserAssigned(id) if id.is_empty()) {
            return Err(ValidationError::InvalidDefaultIdentity(model.default_identity_type.to_string()));
        }
        if let Some(identity) = &model.identity {
            identity.validate()?;
        }
        if model.create_mode.is_some() && !model.backup.as_ref().is_some_and(Backup::is_continuous) {
            return Err(ValidationError::CreateModeRequiresContinuousBackup);
        }
        if (model.create_mode == Some(CreateMode::Restore)) != model.restore.is_some() {
            return Err(ValidationError::RestoreModeMismatch);
        }
        if let Some(restore) = &model.restore {
            restore.validate()?;
        }
        Ok(())
    }

    fn expand(model: &Self::Model) -> Self::Request {
        let locations = model
            .geo_locations
            .iter()
            .map(|l| sdk::Location {
                location_name: Some(normalize_location(&l.location)),
                failover_priority: Some(l.failover_priority),
                is_zone_redundant: Some(l.zone_redundant),
                ..Default::default()
            })
            .collect();

        let properties = sdk::DatabaseAccountProperties {
            database_account_offer_type: Some(model.offer_type),
            consistency_policy: Some(model.consistency_policy.expand()),
            locations: Some(locations),
            capabilities: Some(
                model
                    .capabilities
                    .iter()
                    .map(|name| sdk::Capability {
                        name: Some(name.clone()),
                    })
                    .collect(),
            ),
            ip_rules: Some(
                model
                    .ip_range_filter
                    .iter()
                    .map(|ip| sdk::IpAddressOrRange {
                        ip_address_or_range: Some(ip.clone()),
                    })
                    .collect(),
            ),
            is_virtual_network_filter_enabled: Some(model.is_virtual_network_filter_enabled),
            virtual_network_rules: Some(
                model
                    .virtual_network_rules
                    .iter()
                    .map(|rule| sdk::VirtualNetworkRule {
                        id: Some(rule.id.clone()),
                        ignore_missing_vnet_service_endpoint: Some(rule.ignore_missing_vnet_service_endpoint),
                    })
                    .collect(),
            ),
            enable_free_tier: Some(model.free_tier_enabled),
            enable_automatic_failover: Some(model.automatic_failover_enabled),
            enable_multiple_write_locations: Some(model.multiple_write_locations_enabled),
            public_network_access: model.public_network_access_enabled.map(|enabled| {
                if enabled {
                    sdk::PublicNetworkAccess::Enabled
                } else {
                    sdk::PublicNetworkAccess::Disabled
                }
            }),
            enable_analytical_storage: Some(model.analytical_storage_enabled),
            analytical_storage_configuration: model.analytical_storage.as_ref().map(|a| {
                sdk::AnalyticalStorageConfiguration {
                    schema_type: Some(a.schema_type),
                }
            }),
            capacity: model.capacity.as_ref().map(|c| sdk::Capacity {
                total_throughput_limit: Some(c.total_throughput_limit),
            }),
            backup_policy: model.backup.as_ref().map(Backup::expand),
            minimal_tls_version: Some(model.minimal_tls_version),
            api_properties: model.mongo_server_version.as_ref().map(|v| sdk::ApiProperties {
                server_version: Some(v.clone()),
            }),
            disable_local_auth: Some(model.local_authentication_disabled),
            network_acl_bypass: Some(if model.network_acl_bypass_for_azure_services {
                sdk::NetworkAclBypass::AzureServices
            } else {
                sdk::NetworkAclBypass::None
            }),
            network_acl_bypass_resource_ids: Some(model.network_acl_bypass_ids.clone()),
            disable_key_based_metadata_write_access: model.access_key_metadata_writes_enabled.map(|enabled| !enabled),
            enable_burst_capacity: Some(model.burst_capacity_enabled),
            enable_partition_merge: Some(model.partition_merge_enabled),
            key_vault_key_uri: model.key_vault_key_id.clone(),
            default_identity: Some(model.default_identity_type.to_string()),
            create_mode: model.create_mode,
            restore_parameters: model.restore.as_ref().map(Restore::expand),
            ..Default::default()
        };

        sdk::DatabaseAccountCreateUpdateParameters {
            location: normalize_location(&model.location),
            tags: model.tags.clone(),
            kind: model.kind,
            identity: model.identity.as_ref().map(Identity::expand),
            properties,
        }
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let mut model = DatabaseAccountModel {
            name: id.name().to_string(),
            resource_group_name: id.resource_group().to_string(),
            location: normalize_location(response.location.as_deref().unwrap_or_default()),
            tags: response.tags.clone().unwrap_or_default(),
            kind: response.kind.unwrap_or_default(),
            identity: response.identity.as_ref().and_then(Identity::flatten),
            ..Default::default()
        };

        let Some(props) = &response.properties else {
            return model;
        };

        model.offer_type = props.database_account_offer_type.unwrap_or_default();
        model.consistency_policy = props
            .consistency_policy
            .as_ref()
            .map(ConsistencyPolicy::flatten)
            .unwrap_or_default();
        model.geo_locations = flatten_geo_locations(props);
        model.capabilities = props
            .capabilities
            .iter()
            .flatten()
            .filter_map(|c| c.name.clone())
            .collect();
        model.ip_range_filter = props
            .ip_rules
            .iter()
            .flatten()
            .filter_map(|r| r.ip_address_or_range.clone())
            .collect();
        model.is_virtual_network_filter_enabled = props.is_virtual_network_filter_enabled.unwrap_or_default();
        model.virtual_network_rules = props
            .virtual_network_rules
            .iter()
            .flatten()
            .map(|rule| VirtualNetworkRule {
                id: rule.id.clone().unwrap_or_default(),
                ignore_missing_vnet_service_endpoint: rule.ignore_missing_vnet_service_endpoint.unwrap_or_default(),
            })
            .collect();
        model.free_tier_enabled = props.enable_free_tier.unwrap_or_default();
        model.automatic_failover_enabled = props.enable_automatic_failover.unwrap_or_default();
        model.multiple_write_locations_enabled = props.enable_multiple_write_locations.unwrap_or_default();
        model.public_network_access_enabled = props
            .public_network_access
            .map(|access| access == sdk::PublicNetworkAccess::Enabled);
        model.analytical_storage_enabled = props.enable_analytical_storage.unwrap_or_default();
        model.analytical_storage = props
            .analytical_storage_configuration
            .as_ref()
            .map(|a| AnalyticalStorage {
                schema_type: a.schema_type.unwrap_or_default(),
            });
        model.capacity = props.capacity.as_ref().map(|c| Capacity {
            total_throughput_limit: c.total_throughput_limit.unwrap_or_default(),
        });
        model.backup = props.backup_policy.as_ref().map(Backup::flatten);
        model.minimal_tls_version = props.minimal_tls_version.unwrap_or_default();
        model.mongo_server_version = props.api_properties.as_ref().and_then(|a| a.server_version.clone());
        model.local_authentication_disabled = props.disable_local_auth.unwrap_or_default();
        model.network_acl_bypass_for_azure_services =
            props.network_acl_bypass == Some(sdk::NetworkAclBypass::AzureServices);
        model.network_acl_bypass_ids = props.network_acl_bypass_resource_ids.clone().unwrap_or_default();
        model.access_key_metadata_writes_enabled = props.disable_key_based_metadata_write_access.map(|disabled| !disabled);
        model.burst_capacity_enabled = props.enable_burst_capacity.unwrap_or_default();
        model.partition_merge_enabled = props.enable_partition_merge.unwrap_or_default();
        model.key_vault_key_id = props.key_vault_key_uri.clone();
        model.default_identity_type = props
            .default_identity
            .as_deref()
            .and_then(|identity| identity.parse().ok())
            .unwrap_or_default();
        model.create_mode = props.create_mode;
        model.restore = props.restore_parameters.as_ref().map(Restore::flatten);
        model.endpoint = props.document_endpoint.clone();
        model.read_endpoints = endpoints(props.read_locations.as_ref());
        model.write_endpoints = endpoints(props.write_locations.as_ref());
        model
    }

    fn check_update(id: &Self::Id, existing: &Self::Model, desired: &Self::Model) -> Result<(), CosmosError> {
        let replace = |attribute: &str| {
            Err(CosmosError::RequiresReplacement {
                id: id.id(),
                attribute: attribute.to_string(),
            })
        };

        if existing.kind != desired.kind {
            return replace("kind");
        }
        if existing.free_tier_enabled != desired.free_tier_enabled {
            return replace("free_tier_enabled");
        }
        let existing_continuous = existing.backup.as_ref().is_some_and(Backup::is_continuous);
        let desired_periodic = matches!(desired.backup, Some(Backup::Periodic { .. }));
        if existing_continuous && desired_periodic {
            return replace("backup.type");
        }
        if existing.analytical_storage_enabled && !desired.analytical_storage_enabled {
            return replace("analytical_storage_enabled");
        }
        if !can_update_capabilities(desired.kind, &existing.capabilities, &desired.capabilities) {
            return replace("capabilities");
        }
        if existing.key_vault_key_id != desired.key_vault_key_id {
            return replace("key_vault_key_id");
        }
        if desired.create_mode.is_some() && existing.create_mode != desired.create_mode {
            return replace("create_mode");
        }
        if existing.restore != desired.restore {
            return replace("restore");
        }
        Ok(())
    }
}
