use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MongoDbCollectionResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Shard key path to partitioning scheme, always `Hash` today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_key: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<MongoIndex>>,
    #[serde(rename = "analyticalStorageTtl", skip_serializing_if = "Option::is_none")]
    pub analytical_storage_ttl: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MongoIndex {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<MongoIndexKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<MongoIndexOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MongoIndexKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MongoIndexOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_after_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}
