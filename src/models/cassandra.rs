use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::{CassandraKeyspaceId, CassandraTableId};
use crate::models::common::{ProvisionedThroughput, validate_entity_name};
use crate::models::sql::validate_ttl;
use crate::sdk::{self, CreateUpdateParameters, GetResults};
use crate::traits::{CosmosResource, CosmosResourceId};

pub use crate::sdk::ClusterKeyOrder;

/// An `azurerm_cosmosdb_cassandra_keyspace`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CassandraKeyspaceModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct CassandraKeyspace;

impl CosmosResource for CassandraKeyspace {
    type Id = CassandraKeyspaceId;
    type Model = CassandraKeyspaceModel;
    type Request = CreateUpdateParameters<sdk::NamedResource>;
    type Response = GetResults<sdk::NamedResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(CassandraKeyspaceId::new(
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
        CassandraKeyspaceModel {
            name: id.cassandra_keyspace_name.clone(),
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

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CassandraColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CassandraClusterKey {
    pub name: String,
    pub order_by: ClusterKeyOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CassandraSchema {
    pub columns: Vec<CassandraColumn>,
    pub partition_keys: Vec<String>,
    pub cluster_keys: Vec<CassandraClusterKey>,
}

impl CassandraSchema {
    fn expand(&self) -> sdk::CassandraSchema {
        sdk::CassandraSchema {
            columns: Some(
                self.columns
                    .iter()
                    .map(|c| sdk::CassandraColumn {
                        name: Some(c.name.clone()),
                        column_type: Some(c.column_type.clone()),
                    })
                    .collect(),
            ),
            partition_keys: Some(
                self.partition_keys
                    .iter()
                    .map(|name| sdk::CassandraPartitionKey {
                        name: Some(name.clone()),
                    })
                    .collect(),
            ),
            cluster_keys: Some(
                self.cluster_keys
                    .iter()
                    .map(|k| sdk::CassandraClusterKey {
                        name: Some(k.name.clone()),
                        order_by: Some(k.order_by),
                    })
                    .collect(),
            ),
        }
    }

    fn flatten(schema: &sdk::CassandraSchema) -> Self {
        CassandraSchema {
            columns: schema
                .columns
                .iter()
                .flatten()
                .map(|c| CassandraColumn {
                    name: c.name.clone().unwrap_or_default(),
                    column_type: c.column_type.clone().unwrap_or_default(),
                })
                .collect(),
            partition_keys: schema
                .partition_keys
                .iter()
                .flatten()
                .filter_map(|k| k.name.clone())
                .collect(),
            cluster_keys: schema
                .cluster_keys
                .iter()
                .flatten()
                .map(|k| CassandraClusterKey {
                    name: k.name.clone().unwrap_or_default(),
                    order_by: k.order_by.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// An `azurerm_cosmosdb_cassandra_table`, addressed through its keyspace's id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CassandraTableModel {
    pub name: String,
    pub cassandra_keyspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage_ttl: Option<i64>,
    pub schema: CassandraSchema,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct CassandraTable;

impl CosmosResource for CassandraTable {
    type Id = CassandraTableId;
    type Model = CassandraTableModel;
    type Request = CreateUpdateParameters<sdk::CassandraTableResource>;
    type Response = GetResults<sdk::CassandraTableResource>;

    fn resource_id(model: &Self::Model, _subscription_id: &str) -> Result<Self::Id, CosmosError> {
        let keyspace = CassandraKeyspaceId::parse(&model.cassandra_keyspace_id).map_err(|source| {
            CosmosError::InvalidId {
                input: model.cassandra_keyspace_id.clone(),
                source,
            }
        })?;
        Ok(CassandraTableId::new(
            keyspace.subscription_id,
            keyspace.resource_group,
            keyspace.database_account_name,
            keyspace.cassandra_keyspace_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)?;
        validate_ttl("default_ttl", model.default_ttl)?;
        validate_ttl("analytical_storage_ttl", model.analytical_storage_ttl)?;
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        let resource = sdk::CassandraTableResource {
            id: Some(model.name.clone()),
            default_ttl: model.default_ttl,
            schema: Some(model.schema.expand()),
            analytical_storage_ttl: model.analytical_storage_ttl,
        };
        CreateUpdateParameters::new(resource, model.provisioned.expand_create_options())
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let mut model = CassandraTableModel {
            name: id.table_name.clone(),
            cassandra_keyspace_id: id.keyspace_id().id(),
            ..Default::default()
        };
        if let Some(resource) = response.resource() {
            model.default_ttl = resource.default_ttl;
            model.analytical_storage_ttl = resource.analytical_storage_ttl;
            model.schema = resource
                .schema
                .as_ref()
                .map(CassandraSchema::flatten)
                .unwrap_or_default();
        }
        model
    }

    fn check_update(id: &Self::Id, existing: &Self::Model, desired: &Self::Model) -> Result<(), CosmosError> {
        if existing.schema.partition_keys != desired.schema.partition_keys
            || existing.schema.cluster_keys != desired.schema.cluster_keys
        {
            return Err(CosmosError::RequiresReplacement {
                id: id.id(),
                attribute: "schema".to_string(),
            });
        }
        Ok(())
    }

    fn provisioned_throughput(model: &Self::Model) -> Option<&ProvisionedThroughput> {
        Some(&model.provisioned)
    }

    fn provisioned_throughput_mut(model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        Some(&mut model.provisioned)
    }
}
