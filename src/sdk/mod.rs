//! Serde models of the Azure Resource Manager request and response bodies for
//! the Cosmos DB management API.
//!
//! Every field is optional so that partially populated responses decode
//! cleanly; absent request fields are omitted from the JSON.

mod account;
mod cassandra;
mod mongo;
mod sql;

pub use account::*;
pub use cassandra::*;
pub use mongo::*;
pub use sql::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `{ "location": .., "tags": .., "properties": { "resource": .., "options": .. } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateParameters<R> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: CreateUpdateProperties<R>,
}

impl<R> CreateUpdateParameters<R> {
    pub fn new(resource: R, options: Option<CreateUpdateOptions>) -> Self {
        CreateUpdateParameters {
            location: None,
            tags: None,
            properties: CreateUpdateProperties { resource, options },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateProperties<R> {
    pub resource: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<CreateUpdateOptions>,
}

/// Throughput requested when a database or container is first created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale_settings: Option<AutoscaleSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoscaleSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_throughput: Option<i64>,
}

/// `GET` shape shared by all sub-resources: `{ "id", "name", "properties": { "resource": .. } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResults<R> {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: Option<GetProperties<R>>,
}

impl<R> GetResults<R> {
    /// The `properties.resource` block, if the service returned one.
    pub fn resource(&self) -> Option<&R> {
        self.properties.as_ref().and_then(|p| p.resource.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProperties<R> {
    pub resource: Option<R>,
}

/// Body for `PUT {id}/throughputSettings/default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputSettingsUpdateParameters {
    pub properties: ThroughputSettingsProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThroughputSettingsProperties {
    pub resource: ThroughputSettingsResource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThroughputSettingsResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale_settings: Option<AutoscaleSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_throughput: Option<String>,
}

/// `GET {id}/throughputSettings/default`.
pub type ThroughputSettingsGetResults = GetResults<ThroughputSettingsResource>;

/// Body for resources that take no settings, e.g. the Table API table or a notebook workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rid", skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(rename = "_etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// `PUT .../notebookWorkspaces/default` takes an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookWorkspaceCreateUpdateParameters {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotebookWorkspace {
    pub id: Option<String>,
    pub name: Option<String>,
    pub properties: Option<NotebookWorkspaceProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotebookWorkspaceProperties {
    pub notebook_server_endpoint: Option<String>,
    pub status: Option<String>,
}
