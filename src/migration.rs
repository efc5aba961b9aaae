//! Upgraders for resource state persisted under older schema versions.
//!
//! Version 0 ids of the API-specific kinds used the `apis/{api}/{type}`
//! spellings (e.g. `.../apis/sql/databases/db1`). The version 0 to 1 upgrade
//! rewrites the stored `id` to the canonical keys and leaves every other
//! attribute untouched.

use serde_json::{Map, Value};
use tracing::debug;

use crate::ids::ResourceKind;

/// The attribute holding the resource id in persisted state.
pub const ID_ATTRIBUTE: &str = "id";

/// One schema version step for a resource kind.
pub trait StateUpgrader: Send + Sync {
    /// The schema version this upgrader reads.
    fn from_version(&self) -> u32;

    /// Never fails: state it does not recognise is returned as is.
    fn upgrade(&self, state: Map<String, Value>) -> Map<String, Value>;
}

/// Rewrites every legacy alias in the `id` attribute to its canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSegmentRewrite {
    kind: ResourceKind,
    /// `(/apis/sql/databases/, /sqlDatabases/)` pairs, applied in order.
    rewrites: Vec<(String, String)>,
}

impl IdSegmentRewrite {
    pub fn new(kind: ResourceKind) -> Self {
        let rewrites = kind
            .segments()
            .iter()
            .flat_map(|segment| {
                segment
                    .legacy
                    .iter()
                    .map(move |alias| (format!("/{}/", alias.join("/")), format!("/{}/", segment.key)))
            })
            .collect();
        IdSegmentRewrite { kind, rewrites }
    }

    fn rewrite(&self, id: &str) -> String {
        self.rewrites
            .iter()
            .fold(id.to_string(), |id, (legacy, canonical)| id.replace(legacy, canonical))
    }
}

impl StateUpgrader for IdSegmentRewrite {
    fn from_version(&self) -> u32 {
        0
    }

    fn upgrade(&self, mut state: Map<String, Value>) -> Map<String, Value> {
        let Some(Value::String(old)) = state.get(ID_ATTRIBUTE) else {
            return state;
        };
        let new = self.rewrite(old);
        if &new != old {
            debug!(
                event = "Migration",
                phase = "Rewrite",
                kind = %self.kind,
                from = old.as_str(),
                to = new.as_str()
            );
            state.insert(ID_ATTRIBUTE.to_string(), Value::String(new));
        }
        state
    }
}

/// The upgraders for `kind`, ordered by the version they read.
pub fn upgraders(kind: ResourceKind) -> Vec<Box<dyn StateUpgrader>> {
    if kind.schema_version() == 0 {
        return Vec::new();
    }
    vec![Box::new(IdSegmentRewrite::new(kind))]
}

/// Bring state written at `from_version` up to `kind.schema_version()`.
pub fn upgrade_state(kind: ResourceKind, from_version: u32, state: Map<String, Value>) -> Map<String, Value> {
    upgraders(kind)
        .into_iter()
        .filter(|u| u.from_version() >= from_version)
        .fold(state, |state, upgrader| upgrader.upgrade(state))
}
