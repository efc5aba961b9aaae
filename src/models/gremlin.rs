use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::{GremlinDatabaseId, GremlinGraphId};
use crate::indexing::{IndexingPolicy, expand_indexing_policy, flatten_indexing_policy};
use crate::models::common::{
    ConflictResolutionPolicy, ProvisionedThroughput, UniqueKey, expand_conflict_resolution_policy,
    expand_unique_keys, flatten_conflict_resolution_policy, flatten_unique_keys, validate_entity_name,
};
use crate::models::sql::{PartitionKind, expand_partition_key, flatten_partition_key, validate_ttl};
use crate::sdk::{self, CreateUpdateParameters, GetResults};
use crate::traits::{CosmosResource, CosmosResourceId};

/// An `azurerm_cosmosdb_gremlin_database`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GremlinDatabaseModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct GremlinDatabase;

impl CosmosResource for GremlinDatabase {
    type Id = GremlinDatabaseId;
    type Model = GremlinDatabaseModel;
    type Request = CreateUpdateParameters<sdk::NamedResource>;
    type Response = GetResults<sdk::NamedResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(GremlinDatabaseId::new(
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
        GremlinDatabaseModel {
            name: id.gremlin_database_name.clone(),
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

/// An `azurerm_cosmosdb_gremlin_graph`. Its `index_policy` is not checked
/// locally; the service rejects inconsistent policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GremlinGraphModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub database_name: String,
    pub partition_key_paths: Vec<String>,
    pub partition_key_kind: PartitionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_policy: Option<IndexingPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolution_policy: Option<ConflictResolutionPolicy>,
    pub unique_keys: Vec<UniqueKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage_ttl: Option<i64>,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct GremlinGraph;

impl CosmosResource for GremlinGraph {
    type Id = GremlinGraphId;
    type Model = GremlinGraphModel;
    type Request = CreateUpdateParameters<sdk::GremlinGraphResource>;
    type Response = GetResults<sdk::GremlinGraphResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(GremlinGraphId::new(
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
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        let resource = sdk::GremlinGraphResource {
            id: Some(model.name.clone()),
            indexing_policy: expand_indexing_policy(model.index_policy.as_ref()),
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
        let mut model = GremlinGraphModel {
            name: id.graph_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            database_name: id.gremlin_database_name.clone(),
            ..Default::default()
        };
        let Some(resource) = response.resource() else {
            return model;
        };

        let (paths, kind, version) = flatten_partition_key(resource.partition_key.as_ref());
        model.partition_key_paths = paths;
        model.partition_key_kind = kind;
        model.partition_key_version = version;
        model.index_policy = flatten_indexing_policy(resource.indexing_policy.as_ref());
        model.conflict_resolution_policy =
            flatten_conflict_resolution_policy(resource.conflict_resolution_policy.as_ref());
        model.unique_keys = flatten_unique_keys(resource.unique_key_policy.as_ref());
        model.default_ttl = resource.default_ttl;
        model.analytical_storage_ttl = resource.analytical_storage_ttl;
        model
    }

    fn check_update(id: &Self::Id, existing: &Self::Model, desired: &Self::Model) -> Result<(), CosmosError> {
        let attribute = if existing.partition_key_paths != desired.partition_key_paths {
            "partition_key_paths"
        } else if existing.unique_keys != desired.unique_keys {
            "unique_key"
        } else {
            return Ok(());
        };
        Err(CosmosError::RequiresReplacement {
            id: id.id(),
            attribute: attribute.to_string(),
        })
    }

    fn provisioned_throughput(model: &Self::Model) -> Option<&ProvisionedThroughput> {
        Some(&model.provisioned)
    }

    fn provisioned_throughput_mut(model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        Some(&mut model.provisioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::IndexingMode;

    fn graph() -> GremlinGraphModel {
        GremlinGraphModel {
            name: "graph1".to_string(),
            resource_group_name: "rg1".to_string(),
            account_name: "acc1".to_string(),
            database_name: "db1".to_string(),
            partition_key_paths: vec!["/pk".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_index_policy_is_left_to_the_service() {
        let mut model = graph();
        model.index_policy = Some(IndexingPolicy {
            indexing_mode: IndexingMode::None,
            included_paths: vec!["/*".to_string()],
            ..Default::default()
        });
        assert_eq!(GremlinGraph::validate(&model), Ok(()));
        assert!(GremlinGraph::expand(&model).properties.resource.indexing_policy.is_some());
    }

    #[test]
    fn test_graph_flatten_tolerates_empty_resource() {
        let response: GetResults<sdk::GremlinGraphResource> =
            serde_json::from_value(serde_json::json!({ "properties": { "resource": {} } })).unwrap();
        let id = GremlinGraphId::new("sub", "rg1", "acc1", "db1", "graph1");
        let model = GremlinGraph::flatten(&id, &response);
        assert_eq!(model.database_name, "db1");
        assert!(model.partition_key_paths.is_empty());
        assert!(model.index_policy.is_none());
    }

    #[test]
    fn test_throughput_is_validated() {
        let mut model = graph();
        model.provisioned = ProvisionedThroughput::manual(350);
        assert!(GremlinGraph::validate(&model).is_err());
    }
}
