//! The Azure Resource Manager client seam.
//!
//! Handlers talk to ARM only through [`ArmClient`]. A real implementation
//! owns transport, authentication and long-running-operation polling, and
//! must give up once `timeout` has elapsed.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde_json::{Map, Value};
use strum_macros::Display;

use crate::error::ClientError;

/// Path suffix of the shared throughput settings of a database or container.
pub const THROUGHPUT_SETTINGS_SUFFIX: &str = "throughputSettings/default";

pub fn throughput_settings_id(id: &str) -> String {
    format!("{id}/{THROUGHPUT_SETTINGS_SUFFIX}")
}

pub trait ArmClient: Send + Sync {
    /// `GET {id}`; `Ok(None)` when the service answers 404.
    fn get(&self, id: &str, timeout: Duration) -> Result<Option<Value>, ClientError>;

    /// `PUT {id}` and wait for the operation to finish. Returns the final body.
    fn put(&self, id: &str, body: Value, timeout: Duration) -> Result<Value, ClientError>;

    /// `DELETE {id}` and wait for the operation to finish.
    fn delete(&self, id: &str, timeout: Duration) -> Result<(), ClientError>;

    /// `POST {id}` with an empty body, for list actions such as
    /// `{account}/listKeys`. `Ok(None)` when the service answers 404.
    fn post(&self, id: &str, timeout: Duration) -> Result<Option<Value>, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Delete,
    Post,
}

/// A map-backed [`ArmClient`] for tests and local use.
///
/// `PUT` stores the body with `id` and `name` filled in and drops
/// `properties.options`; any throughput in those options is stored under
/// `{id}/throughputSettings/default` the way the service exposes it.
/// `DELETE` also removes everything nested below the id. `POST` answers
/// with whatever was seeded for the action id.
#[derive(Debug, Default)]
pub struct InMemoryArmClient {
    resources: RwLock<BTreeMap<String, Value>>,
    failures: RwLock<BTreeMap<String, ClientError>>,
    calls: RwLock<Vec<(Method, String)>>,
}

fn poisoned<T>(_: PoisonError<T>) -> ClientError {
    ClientError::Transport("in-memory store lock poisoned".to_string())
}

fn last_segment(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or_default()
}

impl InMemoryArmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a response body exactly as given.
    pub fn insert(&self, id: impl Into<String>, body: Value) -> Result<(), ClientError> {
        self.resources.write().map_err(poisoned)?.insert(id.into(), body);
        Ok(())
    }

    /// The stored body for `id`, without recording a call.
    pub fn stored(&self, id: &str) -> Option<Value> {
        self.resources.read().ok()?.get(id).cloned()
    }

    /// Make every subsequent call for `id` fail with `error`.
    pub fn fail_with(&self, id: impl Into<String>, error: ClientError) -> Result<(), ClientError> {
        self.failures.write().map_err(poisoned)?.insert(id.into(), error);
        Ok(())
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.read().map(|c| c.to_vec()).unwrap_or_default()
    }

    fn record(&self, method: Method, id: &str) -> Result<(), ClientError> {
        self.calls.write().map_err(poisoned)?.push((method, id.to_string()));
        match self.failures.read().map_err(poisoned)?.get(id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn take_options(body: &mut Value) -> Option<Value> {
    body.get_mut("properties")
        .and_then(Value::as_object_mut)
        .and_then(|properties| properties.remove("options"))
}

fn settings_from_options(options: &Value) -> Option<Value> {
    let mut resource = Map::new();
    for key in ["throughput", "autoscaleSettings"] {
        if let Some(value) = options.get(key).filter(|v| !v.is_null()) {
            resource.insert(key.to_string(), value.clone());
        }
    }
    if resource.is_empty() {
        return None;
    }
    Some(serde_json::json!({ "properties": { "resource": resource } }))
}

impl ArmClient for InMemoryArmClient {
    fn get(&self, id: &str, _timeout: Duration) -> Result<Option<Value>, ClientError> {
        self.record(Method::Get, id)?;
        Ok(self.resources.read().map_err(poisoned)?.get(id).cloned())
    }

    fn put(&self, id: &str, mut body: Value, _timeout: Duration) -> Result<Value, ClientError> {
        self.record(Method::Put, id)?;
        let settings = take_options(&mut body).as_ref().and_then(settings_from_options);
        if let Some(object) = body.as_object_mut() {
            object.insert("id".to_string(), Value::String(id.to_string()));
            object.insert("name".to_string(), Value::String(last_segment(id).to_string()));
        }

        let mut resources = self.resources.write().map_err(poisoned)?;
        if let Some(settings) = settings {
            resources.insert(throughput_settings_id(id), settings);
        }
        resources.insert(id.to_string(), body.clone());
        Ok(body)
    }

    fn delete(&self, id: &str, _timeout: Duration) -> Result<(), ClientError> {
        self.record(Method::Delete, id)?;
        let nested = format!("{id}/");
        self.resources
            .write()
            .map_err(poisoned)?
            .retain(|key, _| key != id && !key.starts_with(&nested));
        Ok(())
    }

    fn post(&self, id: &str, _timeout: Duration) -> Result<Option<Value>, ClientError> {
        self.record(Method::Post, id)?;
        Ok(self.resources.read().map_err(poisoned)?.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_put_fills_in_id_and_name() {
        let client = InMemoryArmClient::new();
        let stored = client
            .put("/a/tables/t1", json!({ "properties": { "resource": { "id": "t1" } } }), TIMEOUT)
            .unwrap();
        assert_eq!(stored["id"], "/a/tables/t1");
        assert_eq!(stored["name"], "t1");
        assert_eq!(client.get("/a/tables/t1", TIMEOUT).unwrap(), Some(stored));
    }

    #[test]
    fn test_put_moves_options_into_throughput_settings() {
        let client = InMemoryArmClient::new();
        let body = json!({ "properties": { "resource": { "id": "db" }, "options": { "throughput": 400 } } });
        let stored = client.put("/a/sqlDatabases/db", body, TIMEOUT).unwrap();
        assert!(stored["properties"].get("options").is_none());
        insta::assert_json_snapshot!(client.stored("/a/sqlDatabases/db/throughputSettings/default"), @r#"
        {
          "properties": {
            "resource": {
              "throughput": 400
            }
          }
        }
        "#);
    }

    #[test]
    fn test_delete_removes_nested_resources() {
        let client = InMemoryArmClient::new();
        client.insert("/a/sqlDatabases/db", json!({})).unwrap();
        client.insert("/a/sqlDatabases/db/containers/c", json!({})).unwrap();
        client.insert("/a/sqlDatabases/db2", json!({})).unwrap();

        client.delete("/a/sqlDatabases/db", TIMEOUT).unwrap();
        assert!(client.stored("/a/sqlDatabases/db").is_none());
        assert!(client.stored("/a/sqlDatabases/db/containers/c").is_none());
        assert!(client.stored("/a/sqlDatabases/db2").is_some());
    }

    #[test]
    fn test_injected_failure_and_call_log() {
        let client = InMemoryArmClient::new();
        let error = ClientError::Status {
            id: "/x".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        client.fail_with("/x", error.clone()).unwrap();
        assert_eq!(client.get("/x", TIMEOUT), Err(error));
        assert_eq!(client.get("/y", TIMEOUT), Ok(None));
        assert_eq!(
            client.calls(),
            vec![(Method::Get, "/x".to_string()), (Method::Get, "/y".to_string())]
        );
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_post_answers_seeded_action() {
        let client = InMemoryArmClient::new();
        assert_eq!(client.post("/a/listKeys", TIMEOUT), Ok(None));

        client.insert("/a/listKeys", json!({ "primaryMasterKey": "k1" })).unwrap();
        assert_eq!(
            client.post("/a/listKeys", TIMEOUT),
            Ok(Some(json!({ "primaryMasterKey": "k1" })))
        );
        assert_eq!(client.calls()[0], (Method::Post, "/a/listKeys".to_string()));
    }
}
