use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
pub enum DatabaseAccountKind {
    #[default]
    GlobalDocumentDB,
    MongoDB,
    Parse,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum DatabaseAccountOfferType {
    #[default]
    Standard,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum ConsistencyLevel {
    BoundedStaleness,
    ConsistentPrefix,
    Eventual,
    #[default]
    Session,
    Strong,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum MinimalTlsVersion {
    Tls,
    Tls11,
    #[default]
    Tls12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum PublicNetworkAccess {
    Enabled,
    Disabled,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum AnalyticalStorageSchemaType {
    #[default]
    WellDefined,
    FullFidelity,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum BackupStorageRedundancy {
    #[default]
    Geo,
    Local,
    Zone,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum ContinuousTier {
    #[serde(rename = "Continuous7Days")]
    #[strum(serialize = "Continuous7Days")]
    Continuous7Days,
    #[default]
    #[serde(rename = "Continuous30Days")]
    #[strum(serialize = "Continuous30Days")]
    Continuous30Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum NetworkAclBypass {
    None,
    AzureServices,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum CreateMode {
    #[default]
    Default,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum RestoreMode {
    PointInTime,
}

/// The service spells the combined type without a space; the configuration
/// form with a space is accepted too.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum ManagedIdentityType {
    #[default]
    None,
    SystemAssigned,
    UserAssigned,
    #[serde(rename = "SystemAssigned,UserAssigned", alias = "SystemAssigned, UserAssigned")]
    #[strum(to_string = "SystemAssigned, UserAssigned", serialize = "SystemAssigned,UserAssigned")]
    SystemAssignedUserAssigned,
}

impl ManagedIdentityType {
    pub fn is_user_assigned(self) -> bool {
        matches!(self, Self::UserAssigned | Self::SystemAssignedUserAssigned)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagedServiceIdentity {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<ManagedIdentityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assigned_identities: Option<BTreeMap<String, UserAssignedIdentity>>,
}

/// Sent as an empty object; the ids are filled in by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAssignedIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAccountCreateUpdateParameters {
    pub location: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub tags: BTreeMap<String, String>,
    pub kind: DatabaseAccountKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub identity: Option<ManagedServiceIdentity>,
    pub properties: DatabaseAccountProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseAccountGetResults {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<DatabaseAccountKind>,
    pub tags: Option<BTreeMap<String, String>>,
    pub identity: Option<ManagedServiceIdentity>,
    pub properties: Option<DatabaseAccountProperties>,
}

/// Properties of an account. The trailing read-only fields are only ever
/// populated on responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseAccountProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_account_offer_type: Option<DatabaseAccountOfferType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_policy: Option<ConsistencyPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<Capability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_rules: Option<Vec<IpAddressOrRange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_virtual_network_filter_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_network_rules: Option<Vec<VirtualNetworkRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_free_tier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_automatic_failover: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_multiple_write_locations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_analytical_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage_configuration: Option<AnalyticalStorageConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_policy: Option<BackupPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimal_tls_version: Option<MinimalTlsVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_properties: Option<ApiProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acl_bypass: Option<NetworkAclBypass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acl_bypass_resource_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_key_based_metadata_write_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_burst_capacity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_partition_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_vault_key_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_parameters: Option<RestoreParameters>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_locations: Option<Vec<Location>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_locations: Option<Vec<Location>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_policies: Option<Vec<FailoverPolicy>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsistencyPolicy {
    pub default_consistency_level: ConsistencyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_staleness_prefix: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_interval_in_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_zone_redundant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FailoverPolicy {
    pub id: Option<String>,
    pub location_name: Option<String>,
    pub failover_priority: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capability {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpAddressOrRange {
    pub ip_address_or_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualNetworkRule {
    pub id: Option<String>,
    #[serde(rename = "ignoreMissingVNetServiceEndpoint")]
    pub ignore_missing_vnet_service_endpoint: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticalStorageConfiguration {
    pub schema_type: Option<AnalyticalStorageSchemaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capacity {
    pub total_throughput_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiProperties {
    pub server_version: Option<String>,
}

/// Discriminated on the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackupPolicy {
    Periodic {
        #[serde(rename = "periodicModeProperties", default)]
        periodic_mode_properties: Option<PeriodicModeProperties>,
    },
    Continuous {
        #[serde(rename = "continuousModeProperties", default)]
        continuous_mode_properties: Option<ContinuousModeProperties>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodicModeProperties {
    pub backup_interval_in_minutes: Option<i64>,
    pub backup_retention_interval_in_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_storage_redundancy: Option<BackupStorageRedundancy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContinuousModeProperties {
    pub tier: Option<ContinuousTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestoreParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_mode: Option<RestoreMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore_timestamp_in_utc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases_to_restore: Option<Vec<DatabaseRestoreResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gremlin_databases_to_restore: Option<Vec<GremlinDatabaseRestoreResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_to_restore: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseRestoreResource {
    pub database_name: Option<String>,
    pub collection_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GremlinDatabaseRestoreResource {
    pub database_name: Option<String>,
    pub graph_names: Option<Vec<String>>,
}

/// Body of the `listKeys` and `readonlykeys` actions. `readonlykeys` only
/// fills in the read-only pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseAccountListKeysResult {
    pub primary_master_key: Option<String>,
    pub secondary_master_key: Option<String>,
    pub primary_readonly_master_key: Option<String>,
    pub secondary_readonly_master_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseAccountListConnectionStringsResult {
    pub connection_strings: Option<Vec<ConnectionString>>,
}

/// One entry of `listConnectionStrings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionString {
    pub connection_string: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_policy_is_tagged_by_type() {
        let policy: BackupPolicy = serde_json::from_value(json!({
            "type": "Periodic",
            "periodicModeProperties": { "backupIntervalInMinutes": 240, "backupRetentionIntervalInHours": 8 }
        }))
        .unwrap();
        assert_eq!(
            policy,
            BackupPolicy::Periodic {
                periodic_mode_properties: Some(PeriodicModeProperties {
                    backup_interval_in_minutes: Some(240),
                    backup_retention_interval_in_hours: Some(8),
                    backup_storage_redundancy: None,
                }),
            }
        );

        let continuous = BackupPolicy::Continuous {
            continuous_mode_properties: Some(ContinuousModeProperties {
                tier: Some(ContinuousTier::Continuous7Days),
            }),
        };
        assert_eq!(
            serde_json::to_value(&continuous).unwrap(),
            json!({ "type": "Continuous", "continuousModeProperties": { "tier": "Continuous7Days" } })
        );
    }

    #[test]
    fn test_unknown_backup_type_is_rejected() {
        let result: Result<BackupPolicy, _> = serde_json::from_value(json!({ "type": "Hourly" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_combined_identity_type_spellings() {
        let spaced: ManagedIdentityType = serde_json::from_value(json!("SystemAssigned, UserAssigned")).unwrap();
        let compact: ManagedIdentityType = serde_json::from_value(json!("SystemAssigned,UserAssigned")).unwrap();
        assert_eq!(spaced, ManagedIdentityType::SystemAssignedUserAssigned);
        assert_eq!(compact, spaced);
        assert_eq!(serde_json::to_value(spaced).unwrap(), json!("SystemAssigned,UserAssigned"));
        assert_eq!(spaced.to_string(), "SystemAssigned, UserAssigned");
    }

    #[test]
    fn test_account_response_tolerates_sparse_body() {
        let account: DatabaseAccountGetResults =
            serde_json::from_value(json!({ "name": "acc1", "properties": {} })).unwrap();
        assert_eq!(account.name.as_deref(), Some("acc1"));
        assert!(account.properties.unwrap().consistency_policy.is_none());
    }
}
