use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::{SqlContainerId, SqlDatabaseId, SqlFunctionId, SqlStoredProcedureId, SqlTriggerId};
use crate::indexing::{
    IndexingPolicy, expand_indexing_policy, flatten_indexing_policy, validate_indexing_policy,
};
use crate::models::common::{
    ConflictResolutionPolicy, ProvisionedThroughput, UniqueKey, check_range,
    expand_conflict_resolution_policy, expand_unique_keys, flatten_conflict_resolution_policy,
    flatten_unique_keys, validate_entity_name,
};
use crate::sdk::{self, CreateUpdateParameters, GetResults};
use crate::traits::{CosmosResource, CosmosResourceId};

pub use crate::sdk::{PartitionKind, TriggerOperation, TriggerType};

/// Accepted range for `default_ttl` and `analytical_storage_ttl`. `-1` means
/// items never expire.
pub(crate) fn validate_ttl(attribute: &str, ttl: Option<i64>) -> Result<(), ValidationError> {
    match ttl {
        Some(ttl) => check_range(attribute, ttl, -1, i64::from(i32::MAX)),
        None => Ok(()),
    }
}

pub(crate) fn expand_partition_key(
    paths: &[String],
    kind: PartitionKind,
    version: Option<i64>,
) -> Option<sdk::PartitionKey> {
    if paths.is_empty() {
        return None;
    }
    Some(sdk::PartitionKey {
        paths: Some(paths.to_vec()),
        kind: Some(kind),
        version,
    })
}

/// `(paths, kind, version)`, empty when the service sent no key.
pub(crate) fn flatten_partition_key(
    key: Option<&sdk::PartitionKey>,
) -> (Vec<String>, PartitionKind, Option<i64>) {
    match key {
        Some(key) => (
            key.paths.clone().unwrap_or_default(),
            key.kind.unwrap_or_default(),
            key.version,
        ),
        None => (Vec::new(), PartitionKind::default(), None),
    }
}

fn invalid_container_id(input: &str, source: crate::error::ParseError) -> CosmosError {
    CosmosError::InvalidId {
        input: input.to_string(),
        source,
    }
}

/// An `azurerm_cosmosdb_sql_database`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SqlDatabaseModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct SqlDatabase;

impl CosmosResource for SqlDatabase {
    type Id = SqlDatabaseId;
    type Model = SqlDatabaseModel;
    type Request = CreateUpdateParameters<sdk::NamedResource>;
    type Response = GetResults<sdk::NamedResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(SqlDatabaseId::new(
            subscription_id,
            &model.resource_group_name,
            &model.account_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)?;
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        CreateUpdateParameters::new(
            sdk::NamedResource {
                id: Some(model.name.clone()),
                ..Default::default()
            },
            model.provisioned.expand_create_options(),
        )
    }

    fn flatten(id: &Self::Id, _response: &Self::Response) -> Self::Model {
        SqlDatabaseModel {
            name: id.sql_database_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            provisioned: ProvisionedThroughput::default(),
        }
    }

    fn provisioned_throughput(model: &Self::Model) -> Option<&ProvisionedThroughput> {
        Some(&model.provisioned)
    }

    fn provisioned_throughput_mut(model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        Some(&mut model.provisioned)
    }
}

/// An `azurerm_cosmosdb_sql_container`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SqlContainerModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub database_name: String,
    pub partition_key_paths: Vec<String>,
    pub partition_key_kind: PartitionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_version: Option<i64>,
    pub unique_keys: Vec<UniqueKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_policy: Option<IndexingPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolution_policy: Option<ConflictResolutionPolicy>,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct SqlContainer;

impl CosmosResource for SqlContainer {
    type Id = SqlContainerId;
    type Model = SqlContainerModel;
    type Request = CreateUpdateParameters<sdk::SqlContainerResource>;
    type Response = GetResults<sdk::SqlContainerResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(SqlContainerId::new(
            subscription_id,
            &model.resource_group_name,
            &model.account_name,
            &model.database_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)?;
        validate_entity_name("database_name", &model.database_name)?;
        validate_ttl("default_ttl", model.default_ttl)?;
        validate_ttl("analytical_storage_ttl", model.analytical_storage_ttl)?;
        validate_indexing_policy(model.indexing_policy.as_ref())?;
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        let resource = sdk::SqlContainerResource {
            id: Some(model.name.clone()),
            indexing_policy: expand_indexing_policy(model.indexing_policy.as_ref()),
            partition_key: expand_partition_key(
                &model.partition_key_paths,
                model.partition_key_kind,
                model.partition_key_version,
            ),
            default_ttl: model.default_ttl,
            unique_key_policy: expand_unique_keys(&model.unique_keys),
            conflict_resolution_policy: expand_conflict_resolution_policy(
                model.conflict_resolution_policy.as_ref(),
            ),
            analytical_storage_ttl: model.analytical_storage_ttl,
        };
        CreateUpdateParameters::new(resource, model.provisioned.expand_create_options())
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let mut model = SqlContainerModel {
            name: id.container_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            database_name: id.sql_database_name.clone(),
            ..Default::default()
        };
        let Some(resource) = response.resource() else {
            return model;
        };

        let (paths, kind, version) = flatten_partition_key(resource.partition_key.as_ref());
        model.partition_key_paths = paths;
        model.partition_key_kind = kind;
        model.partition_key_version = version;
        model.unique_keys = flatten_unique_keys(resource.unique_key_policy.as_ref());
        model.default_ttl = resource.default_ttl;
        model.analytical_storage_ttl = resource.analytical_storage_ttl;
        model.indexing_policy = flatten_indexing_policy(resource.indexing_policy.as_ref());
        model.conflict_resolution_policy =
            flatten_conflict_resolution_policy(resource.conflict_resolution_policy.as_ref());
        model
    }

    fn check_update(id: &Self::Id, existing: &Self::Model, desired: &Self::Model) -> Result<(), CosmosError> {
        let changed = if existing.partition_key_paths != desired.partition_key_paths {
            Some("partition_key_paths")
        } else if existing.partition_key_version != desired.partition_key_version {
            Some("partition_key_version")
        } else if existing.unique_keys != desired.unique_keys {
            Some("unique_key")
        } else if existing.conflict_resolution_policy != desired.conflict_resolution_policy {
            Some("conflict_resolution_policy")
        } else {
            None
        };
        match changed {
            Some(attribute) => Err(CosmosError::RequiresReplacement {
                id: id.id(),
                attribute: attribute.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn provisioned_throughput(model: &Self::Model) -> Option<&ProvisionedThroughput> {
        Some(&model.provisioned)
    }

    fn provisioned_throughput_mut(model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        Some(&mut model.provisioned)
    }
}

/// An `azurerm_cosmosdb_sql_stored_procedure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SqlStoredProcedureModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub database_name: String,
    pub container_name: String,
    pub body: String,
}

pub struct SqlStoredProcedure;

impl CosmosResource for SqlStoredProcedure {
    type Id = SqlStoredProcedureId;
    type Model = SqlStoredProcedureModel;
    type Request = CreateUpdateParameters<sdk::ScriptResource>;
    type Response = GetResults<sdk::ScriptResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(SqlStoredProcedureId::new(
            subscription_id,
            &model.resource_group_name,
            &model.account_name,
            &model.database_name,
            &model.container_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)?;
        validate_entity_name("database_name", &model.database_name)?;
        validate_entity_name("container_name", &model.container_name)
    }

    fn expand(model: &Self::Model) -> Self::Request {
        CreateUpdateParameters::new(
            sdk::ScriptResource {
                id: Some(model.name.clone()),
                body: Some(model.body.clone()),
            },
            None,
        )
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        SqlStoredProcedureModel {
            name: id.stored_procedure_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            database_name: id.sql_database_name.clone(),
            container_name: id.container_name.clone(),
            body: response
                .resource()
                .and_then(|r| r.body.clone())
                .unwrap_or_default(),
        }
    }
}

/// An `azurerm_cosmosdb_sql_trigger`, addressed through its container's id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SqlTriggerModel {
    pub name: String,
    pub container_id: String,
    pub body: String,
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    pub operation: TriggerOperation,
}

pub struct SqlTrigger;

impl CosmosResource for SqlTrigger {
    type Id = SqlTriggerId;
    type Model = SqlTriggerModel;
    type Request = CreateUpdateParameters<sdk::TriggerResource>;
    type Response = GetResults<sdk::TriggerResource>;

    /// The subscription comes from `container_id`.
    fn resource_id(model: &Self::Model, _subscription_id: &str) -> Result<Self::Id, CosmosError> {
        let container = SqlContainerId::parse(&model.container_id)
            .map_err(|source| invalid_container_id(&model.container_id, source))?;
        Ok(SqlTriggerId::new(
            container.subscription_id,
            container.resource_group,
            container.database_account_name,
            container.sql_database_name,
            container.container_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)
    }

    fn expand(model: &Self::Model) -> Self::Request {
        CreateUpdateParameters::new(
            sdk::TriggerResource {
                id: Some(model.name.clone()),
                body: Some(model.body.clone()),
                trigger_type: Some(model.trigger_type),
                trigger_operation: Some(model.operation),
            },
            None,
        )
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let container_id = SqlContainerId::new(
            &id.subscription_id,
            &id.resource_group,
            &id.database_account_name,
            &id.sql_database_name,
            &id.container_name,
        );
        let resource = response.resource().cloned().unwrap_or_default();
        SqlTriggerModel {
            name: id.trigger_name.clone(),
            container_id: container_id.id(),
            body: resource.body.unwrap_or_default(),
            trigger_type: resource.trigger_type.unwrap_or_default(),
            operation: resource.trigger_operation.unwrap_or_default(),
        }
    }
}

/// An `azurerm_cosmosdb_sql_function`, addressed through its container's id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SqlFunctionModel {
    pub name: String,
    pub container_id: String,
    pub body: String,
}

pub struct SqlFunction;

impl CosmosResource for SqlFunction {
    type Id = SqlFunctionId;
    type Model = SqlFunctionModel;
    type Request = CreateUpdateParameters<sdk::ScriptResource>;
    type Response = GetResults<sdk::ScriptResource>;

    fn resource_id(model: &Self::Model, _subscription_id: &str) -> Result<Self::Id, CosmosError> {
        let container = SqlContainerId::parse(&model.container_id)
            .map_err(|source| invalid_container_id(&model.container_id, source))?;
        Ok(SqlFunctionId::new(
            container.subscription_id,
            container.resource_group,
            container.database_account_name,
            container.sql_database_name,
            container.container_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)
    }

    fn expand(model: &Self::Model) -> Self::Request {
        CreateUpdateParameters::new(
            sdk::ScriptResource {
                id: Some(model.name.clone()),
                body: Some(model.body.clone()),
            },
            None,
        )
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let container_id = SqlContainerId::new(
            &id.subscription_id,
            &id.resource_group,
            &id.database_account_name,
            &id.sql_database_name,
            &id.container_name,
        );
        SqlFunctionModel {
            name: id.user_defined_function_name.clone(),
            container_id: container_id.id(),
            body: response
                .resource()
                .and_then(|r| r.body.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::indexing::IndexingMode;
    use serde_json::json;

    const SUB: &str = "12345678-1234-9876-4563-123456789012";

    fn container() -> SqlContainerModel {
        SqlContainerModel {
            name: "c1".to_string(),
            resource_group_name: "rg1".to_string(),
            account_name: "acc1".to_string(),
            database_name: "db1".to_string(),
            partition_key_paths: vec!["/pk".to_string()],
            partition_key_version: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_container_rejects_inconsistent_indexing_policy() {
        let mut model = container();
        model.indexing_policy = Some(IndexingPolicy {
            indexing_mode: IndexingMode::Consistent,
            included_paths: vec!["/testing/?".to_string()],
            ..Default::default()
        });
        assert_eq!(
            SqlContainer::validate(&model),
            Err(ValidationError::MissingWildcardInIncluded)
        );
    }

    #[test]
    fn test_container_request_shape() {
        let mut model = container();
        model.default_ttl = Some(-1);
        model.provisioned = ProvisionedThroughput::autoscale(4000);
        model.unique_keys = vec![UniqueKey {
            paths: vec!["/email".to_string()],
        }];
        let request = serde_json::to_value(SqlContainer::expand(&model)).unwrap();
        insta::assert_json_snapshot!(request, @r#"
        {
          "properties": {
            "options": {
              "autoscaleSettings": {
                "maxThroughput": 4000
              }
            },
            "resource": {
              "defaultTtl": -1,
              "id": "c1",
              "partitionKey": {
                "kind": "Hash",
                "paths": [
                  "/pk"
                ],
                "version": 2
              },
              "uniqueKeyPolicy": {
                "uniqueKeys": [
                  {
                    "paths": [
                      "/email"
                    ]
                  }
                ]
              }
            }
          }
        }
        "#);
    }

    #[test]
    fn test_container_flatten_drops_etag_path() {
        let response: GetResults<sdk::SqlContainerResource> = serde_json::from_value(json!({
            "id": "/subscriptions/x",
            "properties": {
                "resource": {
                    "id": "c1",
                    "partitionKey": { "paths": ["/pk"], "kind": "Hash" },
                    "indexingPolicy": {
                        "indexingMode": "consistent",
                        "includedPaths": [{ "path": "/*" }],
                        "excludedPaths": [{ "path": "/\"_etag\"/?" }]
                    },
                    "conflictResolutionPolicy": { "mode": "LastWriterWins", "conflictResolutionPath": "/_ts", "conflictResolutionProcedure": "" }
                }
            }
        }))
        .unwrap();
        let id = SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1");
        let model = SqlContainer::flatten(&id, &response);

        assert_eq!(model.partition_key_paths, vec!["/pk".to_string()]);
        let policy = model.indexing_policy.unwrap();
        assert!(policy.excluded_paths.is_empty());
        assert_eq!(
            model
                .conflict_resolution_policy
                .and_then(|p| p.conflict_resolution_path),
            Some("/_ts".to_string())
        );
    }

    #[test]
    fn test_container_flatten_without_properties() {
        let response: GetResults<sdk::SqlContainerResource> = serde_json::from_value(json!({})).unwrap();
        let id = SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1");
        let model = SqlContainer::flatten(&id, &response);
        assert_eq!(model.name, "c1");
        assert!(model.indexing_policy.is_none());
    }

    #[test]
    fn test_partition_key_change_requires_replacement() {
        let id = SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1");
        let existing = container();
        let mut desired = container();
        desired.default_ttl = Some(3600);
        assert!(SqlContainer::check_update(&id, &existing, &desired).is_ok());

        desired.partition_key_paths = vec!["/other".to_string()];
        assert!(matches!(
            SqlContainer::check_update(&id, &existing, &desired),
            Err(CosmosError::RequiresReplacement { attribute, .. }) if attribute == "partition_key_paths"
        ));
    }

    #[test]
    fn test_trigger_id_comes_from_container_id() {
        let container_id = SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1");
        let model = SqlTriggerModel {
            name: "t1".to_string(),
            container_id: container_id.id(),
            body: "function() {}".to_string(),
            trigger_type: TriggerType::Post,
            operation: TriggerOperation::Delete,
        };
        let id = SqlTrigger::resource_id(&model, "ignored").unwrap();
        assert_eq!(id, SqlTriggerId::new(SUB, "rg1", "acc1", "db1", "c1", "t1"));

        let response: GetResults<sdk::TriggerResource> = serde_json::from_value(json!({
            "properties": { "resource": { "id": "t1", "body": "function() {}", "triggerType": "Post", "triggerOperation": "Delete" } }
        }))
        .unwrap();
        assert_eq!(SqlTrigger::flatten(&id, &response), model);
    }

    #[test]
    fn test_function_with_malformed_container_id() {
        let model = SqlFunctionModel {
            name: "f1".to_string(),
            container_id: "/subscriptions/sub/resourceGroups/rg1".to_string(),
            body: String::new(),
        };
        let err = SqlFunction::resource_id(&model, SUB).unwrap_err();
        assert!(matches!(
            err,
            CosmosError::InvalidId { source: ParseError::MissingSegment(ref key), .. } if key == "providers"
        ));
    }

    #[test]
    fn test_stored_procedure_flatten() {
        let id = SqlStoredProcedureId::new(SUB, "rg1", "acc1", "db1", "c1", "sp1");
        let response: GetResults<sdk::ScriptResource> = serde_json::from_value(json!({
            "properties": { "resource": { "id": "sp1", "body": "function () { return 1; }" } }
        }))
        .unwrap();
        let model = SqlStoredProcedure::flatten(&id, &response);
        assert_eq!(model.container_name, "c1");
        assert_eq!(model.body, "function () { return 1; }");
    }
}
