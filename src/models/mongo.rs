use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::{MongoDbCollectionId, MongoDbDatabaseId};
use crate::models::common::{ProvisionedThroughput, validate_entity_name};
use crate::models::sql::validate_ttl;
use crate::sdk::{self, CreateUpdateParameters, GetResults};
use crate::traits::{CosmosResource, CosmosResourceId};

/// Every shard key is hash partitioned.
const SHARD_KEY_KIND: &str = "Hash";
const ID_KEY: &str = "_id";
const TTL_KEY: &str = "_ts";

/// An `azurerm_cosmosdb_mongo_database`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MongoDbDatabaseModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct MongoDbDatabase;

impl CosmosResource for MongoDbDatabase {
    type Id = MongoDbDatabaseId;
    type Model = MongoDbDatabaseModel;
    type Request = CreateUpdateParameters<sdk::NamedResource>;
    type Response = GetResults<sdk::NamedResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(MongoDbDatabaseId::new(
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
        MongoDbDatabaseModel {
            name: id.mongodb_database_name.clone(),
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
pub struct MongoIndex {
    pub keys: Vec<String>,
    pub unique: bool,
}

/// An `azurerm_cosmosdb_mongo_collection`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MongoDbCollectionModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub database_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_key: Option<String>,
    /// Sent as a TTL index on `_ts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ttl_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical_storage_ttl: Option<i64>,
    pub indexes: Vec<MongoIndex>,
    /// Computed: indexes the service maintains itself, e.g. on `_id`.
    pub system_indexes: Vec<MongoIndex>,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

fn expand_indexes(indexes: &[MongoIndex], default_ttl_seconds: Option<i64>) -> Vec<sdk::MongoIndex> {
    let user_indexes = indexes.iter().map(|index| sdk::MongoIndex {
        key: Some(sdk::MongoIndexKeys {
            keys: Some(index.keys.clone()),
        }),
        options: Some(sdk::MongoIndexOptions {
            expire_after_seconds: None,
            unique: Some(index.unique),
        }),
    });

    let ttl_index = default_ttl_seconds.map(|ttl| sdk::MongoIndex {
        key: Some(sdk::MongoIndexKeys {
            keys: Some(vec![TTL_KEY.to_string()]),
        }),
        options: Some(sdk::MongoIndexOptions {
            expire_after_seconds: Some(ttl),
            unique: None,
        }),
    });

    user_indexes.chain(ttl_index).collect()
}

/// Splits the service's index list into user indexes, system indexes and the TTL.
fn flatten_indexes(indexes: &[sdk::MongoIndex]) -> (Vec<MongoIndex>, Vec<MongoIndex>, Option<i64>) {
    let mut user = Vec::new();
    let mut system = Vec::new();
    let mut ttl = None;

    for index in indexes {
        let keys = index
            .key
            .as_ref()
            .and_then(|k| k.keys.clone())
            .unwrap_or_default();
        let options = index.options.clone().unwrap_or_default();

        if keys.is_empty() {
            continue;
        }
        if keys[0] == TTL_KEY {
            ttl = options.expire_after_seconds;
        } else if keys == [ID_KEY] {
            system.push(MongoIndex { keys, unique: true });
        } else {
            user.push(MongoIndex {
                keys,
                unique: options.unique.unwrap_or_default(),
            });
        }
    }
    (user, system, ttl)
}

pub struct MongoDbCollection;

impl CosmosResource for MongoDbCollection {
    type Id = MongoDbCollectionId;
    type Model = MongoDbCollectionModel;
    type Request = CreateUpdateParameters<sdk::MongoDbCollectionResource>;
    type Response = GetResults<sdk::MongoDbCollectionResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(MongoDbCollectionId::new(
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
        validate_ttl("default_ttl_seconds", model.default_ttl_seconds)?;
        validate_ttl("analytical_storage_ttl", model.analytical_storage_ttl)?;
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        let shard_key = model
            .shard_key
            .as_ref()
            .map(|key| BTreeMap::from([(key.clone(), SHARD_KEY_KIND.to_string())]));
        let resource = sdk::MongoDbCollectionResource {
            id: Some(model.name.clone()),
            shard_key,
            indexes: Some(expand_indexes(&model.indexes, model.default_ttl_seconds)),
            analytical_storage_ttl: model.analytical_storage_ttl,
        };
        CreateUpdateParameters::new(resource, model.provisioned.expand_create_options())
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        let mut model = MongoDbCollectionModel {
            name: id.collection_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            database_name: id.mongodb_database_name.clone(),
            ..Default::default()
        };
        let Some(resource) = response.resource() else {
            return model;
        };

        model.shard_key = resource
            .shard_key
            .as_ref()
            .and_then(|keys| keys.keys().next().cloned());
        let (indexes, system_indexes, ttl) = flatten_indexes(resource.indexes.as_deref().unwrap_or_default());
        model.indexes = indexes;
        model.system_indexes = system_indexes;
        model.default_ttl_seconds = ttl;
        model.analytical_storage_ttl = resource.analytical_storage_ttl;
        model
    }

    fn check_update(id: &Self::Id, existing: &Self::Model, desired: &Self::Model) -> Result<(), CosmosError> {
        if existing.shard_key != desired.shard_key {
            return Err(CosmosError::RequiresReplacement {
                id: id.id(),
                attribute: "shard_key".to_string(),
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
