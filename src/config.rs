use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CosmosError;
use crate::ids::{ResourceKind, Timeouts};

/// Per-kind timeout overrides, in minutes. Unset fields keep the kind's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TimeoutOverrides {
    pub create_minutes: Option<u64>,
    pub read_minutes: Option<u64>,
    pub update_minutes: Option<u64>,
    pub delete_minutes: Option<u64>,
}

/// Settings shared by every handler of a [`CosmosProvider`](crate::provider::CosmosProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub subscription_id: String,
    #[serde(default)]
    pub timeouts: BTreeMap<ResourceKind, TimeoutOverrides>,
}

impl ProviderConfig {
    pub fn new(subscription_id: impl Into<String>) -> Result<Self, CosmosError> {
        let config = ProviderConfig {
            subscription_id: subscription_id.into(),
            timeouts: BTreeMap::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON document such as
    /// `{"subscription_id": "..", "timeouts": {"SqlContainer": {"create_minutes": 60}}}`.
    pub fn from_json(input: &str) -> Result<Self, CosmosError> {
        let config: ProviderConfig = serde_json::from_str(input)
            .map_err(|e| CosmosError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeouts(mut self, kind: ResourceKind, overrides: TimeoutOverrides) -> Self {
        self.timeouts.insert(kind, overrides);
        self
    }

    fn validate(&self) -> Result<(), CosmosError> {
        if self.subscription_id.trim().is_empty() {
            return Err(CosmosError::InvalidConfiguration(
                "`subscription_id` must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The effective deadlines for `kind`.
    pub fn timeouts(&self, kind: ResourceKind) -> Timeouts {
        let defaults = kind.default_timeouts();
        let Some(overrides) = self.timeouts.get(&kind) else {
            return defaults;
        };
        let pick = |minutes: Option<u64>, default: Duration| {
            minutes.map_or(default, |m| Duration::from_secs(m.saturating_mul(60)))
        };
        Timeouts {
            create: pick(overrides.create_minutes, defaults.create),
            read: pick(overrides.read_minutes, defaults.read),
            update: pick(overrides.update_minutes, defaults.update),
            delete: pick(overrides.delete_minutes, defaults.delete),
        }
    }
}
