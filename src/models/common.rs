use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::sdk;

pub use crate::sdk::ConflictResolutionMode;

pub const MIN_THROUGHPUT: i64 = 400;
pub const THROUGHPUT_STEP: i64 = 100;
pub const MIN_AUTOSCALE_THROUGHPUT: i64 = 1000;
pub const AUTOSCALE_STEP: i64 = 1000;
pub const MAX_THROUGHPUT: i64 = 1_000_000;

const MAX_ENTITY_NAME_LEN: usize = 255;

static ENTITY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/?#\\]*[^/?#\\ ]$").expect("entity name pattern is valid"));

/// Manual or autoscale throughput shared by databases, containers and tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProvisionedThroughput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale_settings: Option<AutoscaleSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AutoscaleSettings {
    pub max_throughput: i64,
}

impl ProvisionedThroughput {
    pub fn manual(throughput: i64) -> Self {
        ProvisionedThroughput {
            throughput: Some(throughput),
            autoscale_settings: None,
        }
    }

    pub fn autoscale(max_throughput: i64) -> Self {
        ProvisionedThroughput {
            throughput: None,
            autoscale_settings: Some(AutoscaleSettings { max_throughput }),
        }
    }

    pub fn is_set(&self) -> bool {
        self.throughput.is_some() || self.autoscale_settings.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(throughput) = self.throughput {
            check_stepped("throughput", throughput, MIN_THROUGHPUT, THROUGHPUT_STEP)?;
        }
        if let Some(autoscale) = &self.autoscale_settings {
            if self.throughput.is_some() {
                return Err(ValidationError::ThroughputConflict);
            }
            check_stepped(
                "autoscale_settings.max_throughput",
                autoscale.max_throughput,
                MIN_AUTOSCALE_THROUGHPUT,
                AUTOSCALE_STEP,
            )?;
        }
        Ok(())
    }

    /// The `options` block sent on create, if any throughput is configured.
    pub fn expand_create_options(&self) -> Option<sdk::CreateUpdateOptions> {
        if !self.is_set() {
            return None;
        }
        Some(sdk::CreateUpdateOptions {
            throughput: self.throughput,
            autoscale_settings: self.expand_autoscale(),
        })
    }

    /// The body of a `throughputSettings/default` update.
    pub fn expand_settings(&self) -> Option<sdk::ThroughputSettingsUpdateParameters> {
        if !self.is_set() {
            return None;
        }
        Some(sdk::ThroughputSettingsUpdateParameters {
            properties: sdk::ThroughputSettingsProperties {
                resource: sdk::ThroughputSettingsResource {
                    throughput: self.throughput,
                    autoscale_settings: self.expand_autoscale(),
                    minimum_throughput: None,
                },
            },
        })
    }

    fn expand_autoscale(&self) -> Option<sdk::AutoscaleSettings> {
        self.autoscale_settings
            .as_ref()
            .map(|autoscale| sdk::AutoscaleSettings {
                max_throughput: Some(autoscale.max_throughput),
            })
    }

    /// Autoscale wins: the service also reports the current throughput for
    /// autoscale resources, which is not user configuration.
    pub fn flatten(settings: &sdk::ThroughputSettingsGetResults) -> Self {
        let Some(resource) = settings.resource() else {
            return ProvisionedThroughput::default();
        };
        match resource
            .autoscale_settings
            .as_ref()
            .and_then(|a| a.max_throughput)
        {
            Some(max_throughput) => ProvisionedThroughput::autoscale(max_throughput),
            None => ProvisionedThroughput {
                throughput: resource.throughput,
                autoscale_settings: None,
            },
        }
    }
}

fn check_stepped(attribute: &str, value: i64, min: i64, step: i64) -> Result<(), ValidationError> {
    check_range(attribute, value, min, MAX_THROUGHPUT)?;
    if value % step != 0 {
        return Err(ValidationError::NotAnIncrement {
            attribute: attribute.to_string(),
            value,
            step,
        });
    }
    Ok(())
}

pub(crate) fn check_range(attribute: &str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            attribute: attribute.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Database, container, collection, keyspace, table and graph names.
pub fn validate_entity_name(attribute: &str, name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_ENTITY_NAME_LEN || !ENTITY_NAME.is_match(name) {
        return Err(ValidationError::InvalidEntityName {
            attribute: attribute.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// `West Europe` and `westeurope` name the same region.
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UniqueKey {
    pub paths: Vec<String>,
}

pub fn expand_unique_keys(keys: &[UniqueKey]) -> Option<sdk::UniqueKeyPolicy> {
    if keys.is_empty() {
        return None;
    }
    Some(sdk::UniqueKeyPolicy {
        unique_keys: Some(
            keys.iter()
                .map(|key| sdk::UniqueKey {
                    paths: Some(key.paths.clone()),
                })
                .collect(),
        ),
    })
}

pub fn flatten_unique_keys(policy: Option<&sdk::UniqueKeyPolicy>) -> Vec<UniqueKey> {
    policy
        .and_then(|p| p.unique_keys.as_ref())
        .into_iter()
        .flatten()
        .map(|key| UniqueKey {
            paths: key.paths.clone().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ConflictResolutionPolicy {
    pub mode: ConflictResolutionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolution_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolution_procedure: Option<String>,
}

pub fn expand_conflict_resolution_policy(
    policy: Option<&ConflictResolutionPolicy>,
) -> Option<sdk::ConflictResolutionPolicy> {
    policy.map(|policy| sdk::ConflictResolutionPolicy {
        mode: Some(policy.mode),
        conflict_resolution_path: policy.conflict_resolution_path.clone(),
        conflict_resolution_procedure: policy.conflict_resolution_procedure.clone(),
    })
}

/// Empty strings from the service are treated as unset.
pub fn flatten_conflict_resolution_policy(
    policy: Option<&sdk::ConflictResolutionPolicy>,
) -> Option<ConflictResolutionPolicy> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    policy.map(|policy| ConflictResolutionPolicy {
        mode: policy.mode.unwrap_or_default(),
        conflict_resolution_path: non_empty(&policy.conflict_resolution_path),
        conflict_resolution_procedure: non_empty(&policy.conflict_resolution_procedure),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    #[parameterized(
        minimum = { ProvisionedThroughput::manual(400), Ok(()) },
        large = { ProvisionedThroughput::manual(100_000), Ok(()) },
        too_low = { ProvisionedThroughput::manual(300), Err(ValidationError::OutOfRange { attribute: "throughput".to_string(), value: 300, min: 400, max: 1_000_000 }) },
        not_hundreds = { ProvisionedThroughput::manual(450), Err(ValidationError::NotAnIncrement { attribute: "throughput".to_string(), value: 450, step: 100 }) },
        autoscale = { ProvisionedThroughput::autoscale(4000), Ok(()) },
        autoscale_too_low = { ProvisionedThroughput::autoscale(500), Err(ValidationError::OutOfRange { attribute: "autoscale_settings.max_throughput".to_string(), value: 500, min: 1000, max: 1_000_000 }) },
        autoscale_not_thousands = { ProvisionedThroughput::autoscale(1500), Err(ValidationError::NotAnIncrement { attribute: "autoscale_settings.max_throughput".to_string(), value: 1500, step: 1000 }) },
        both = { ProvisionedThroughput { throughput: Some(400), autoscale_settings: Some(AutoscaleSettings { max_throughput: 4000 }) }, Err(ValidationError::ThroughputConflict) },
        unset = { ProvisionedThroughput::default(), Ok(()) },
    )]
    fn test_throughput_validation(throughput: ProvisionedThroughput, expected: Result<(), ValidationError>) {
        assert_eq!(throughput.validate(), expected);
    }

    #[parameterized(
        simple = { "db1", true },
        with_space_inside = { "my db", true },
        trailing_space = { "db1 ", false },
        slash = { "a/b", false },
        question_mark = { "a?b", false },
        hash = { "a#b", false },
        backslash = { "a\\b", false },
        empty = { "", false },
    )]
    fn test_entity_names(name: &str, valid: bool) {
        assert_eq!(validate_entity_name("name", name).is_ok(), valid);
    }

    #[test]
    fn test_entity_name_length_limit() {
        assert!(validate_entity_name("name", &"a".repeat(255)).is_ok());
        assert!(validate_entity_name("name", &"a".repeat(256)).is_err());
    }

    #[test]
    fn test_flatten_prefers_autoscale() {
        let settings: sdk::ThroughputSettingsGetResults = serde_json::from_value(json!({
            "properties": { "resource": { "throughput": 400, "autoscaleSettings": { "maxThroughput": 4000 } } }
        }))
        .unwrap();
        assert_eq!(ProvisionedThroughput::flatten(&settings), ProvisionedThroughput::autoscale(4000));
    }

    #[test]
    fn test_unset_throughput_sends_no_options() {
        assert!(ProvisionedThroughput::default().expand_create_options().is_none());
        assert!(ProvisionedThroughput::default().expand_settings().is_none());
        assert_eq!(
            ProvisionedThroughput::manual(400)
                .expand_create_options()
                .and_then(|o| o.throughput),
            Some(400)
        );
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("eastus2"), "eastus2");
    }

    #[test]
    fn test_conflict_resolution_blank_strings_are_unset() {
        let policy = sdk::ConflictResolutionPolicy {
            mode: Some(ConflictResolutionMode::LastWriterWins),
            conflict_resolution_path: Some("/_ts".to_string()),
            conflict_resolution_procedure: Some(String::new()),
        };
        let flattened = flatten_conflict_resolution_policy(Some(&policy)).unwrap();
        assert_eq!(flattened.conflict_resolution_path.as_deref(), Some("/_ts"));
        assert!(flattened.conflict_resolution_procedure.is_none());
    }

    #[test]
    fn test_unique_keys_round_trip() {
        let keys = vec![UniqueKey {
            paths: vec!["/email".to_string(), "/tenant".to_string()],
        }];
        assert_eq!(flatten_unique_keys(expand_unique_keys(&keys).as_ref()), keys);
        assert!(expand_unique_keys(&[]).is_none());
    }
}
