//! The SQL/Gremlin indexing policy: the user-facing model, the local
//! consistency check run before a request is sent, and the mappers to and from
//! the wire shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::sdk;

pub use crate::sdk::{CompositePathOrder, IndexingMode};

/// Matches every path in a document.
pub const WILDCARD_PATH: &str = "/*";

/// Injected into `excludedPaths` by the service, never configured by users.
pub const ETAG_SYSTEM_PATH: &str = "/\"_etag\"/?";

/// Every geometry type the service indexes for a spatial path.
pub const SPATIAL_TYPES: [&str; 4] = ["Point", "LineString", "Polygon", "MultiPolygon"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IndexingPolicy {
    pub indexing_mode: IndexingMode,
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub composite_indexes: Vec<CompositeIndex>,
    pub spatial_indexes: Vec<SpatialIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CompositeIndex {
    pub indexes: Vec<CompositeIndexPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CompositeIndexPath {
    pub path: String,
    pub order: CompositePathOrder,
}

/// A spatial index. `types` is computed by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SpatialIndex {
    pub path: String,
    pub types: Vec<String>,
}

impl IndexingPolicy {
    fn has_paths(&self) -> bool {
        !self.included_paths.is_empty() || !self.excluded_paths.is_empty()
    }
}

fn contains_wildcard(paths: &[String]) -> bool {
    paths.iter().any(|p| p == WILDCARD_PATH)
}

/// Check that the included and excluded paths agree with the indexing mode.
///
/// `None` means no explicit policy and is always accepted. With mode `none`
/// neither path list may be set. Otherwise, as soon as either list is set, the
/// wildcard path has to appear in exactly one of them.
pub fn validate_indexing_policy(policy: Option<&IndexingPolicy>) -> Result<(), ValidationError> {
    let Some(policy) = policy else {
        return Ok(());
    };

    if policy.indexing_mode == IndexingMode::None {
        if policy.has_paths() {
            return Err(ValidationError::PathsNotAllowedWithNoneMode);
        }
        return Ok(());
    }

    if !policy.has_paths() {
        return Ok(());
    }

    let in_included = contains_wildcard(&policy.included_paths);
    let in_excluded = contains_wildcard(&policy.excluded_paths);
    match (in_included, in_excluded) {
        (true, true) => Err(ValidationError::WildcardInBothLists),
        (false, false) => Err(ValidationError::MissingWildcardInIncluded),
        _ => Ok(()),
    }
}

fn expand_paths(paths: &[String]) -> Option<Vec<sdk::IndexPath>> {
    Some(
        paths
            .iter()
            .map(|path| sdk::IndexPath {
                path: Some(path.clone()),
            })
            .collect(),
    )
}

pub fn expand_indexing_policy(policy: Option<&IndexingPolicy>) -> Option<sdk::IndexingPolicy> {
    let policy = policy?;

    let composite_indexes = policy
        .composite_indexes
        .iter()
        .map(|composite| {
            composite
                .indexes
                .iter()
                .map(|index| sdk::CompositePath {
                    path: Some(index.path.clone()),
                    order: Some(index.order),
                })
                .collect()
        })
        .collect();

    let spatial_indexes = policy
        .spatial_indexes
        .iter()
        .map(|spatial| sdk::SpatialSpec {
            path: Some(spatial.path.clone()),
            types: Some(SPATIAL_TYPES.iter().map(|t| t.to_string()).collect()),
        })
        .collect();

    Some(sdk::IndexingPolicy {
        automatic: None,
        indexing_mode: Some(policy.indexing_mode),
        included_paths: expand_paths(&policy.included_paths),
        excluded_paths: expand_paths(&policy.excluded_paths),
        composite_indexes: Some(composite_indexes),
        spatial_indexes: Some(spatial_indexes),
    })
}

fn flatten_paths<'a>(paths: Option<&'a [sdk::IndexPath]>) -> impl Iterator<Item = String> + 'a {
    paths
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.path.clone())
}

pub fn flatten_indexing_policy(policy: Option<&sdk::IndexingPolicy>) -> Option<IndexingPolicy> {
    let policy = policy?;

    let included_paths = flatten_paths(policy.included_paths.as_deref()).collect();
    let excluded_paths = flatten_paths(policy.excluded_paths.as_deref())
        .filter(|path| path != ETAG_SYSTEM_PATH)
        .collect();

    let composite_indexes = policy
        .composite_indexes
        .iter()
        .flatten()
        .map(|composite| CompositeIndex {
            indexes: composite
                .iter()
                .map(|index| CompositeIndexPath {
                    path: index.path.clone().unwrap_or_default(),
                    order: index.order.unwrap_or_default(),
                })
                .collect(),
        })
        .collect();

    let spatial_indexes = policy
        .spatial_indexes
        .iter()
        .flatten()
        .map(|spatial| SpatialIndex {
            path: spatial.path.clone().unwrap_or_default(),
            types: spatial.types.clone().unwrap_or_default(),
        })
        .collect();

    Some(IndexingPolicy {
        indexing_mode: policy.indexing_mode.unwrap_or_default(),
        included_paths,
        excluded_paths,
        composite_indexes,
        spatial_indexes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    fn policy(mode: IndexingMode, included: &[&str], excluded: &[&str]) -> IndexingPolicy {
        IndexingPolicy {
            indexing_mode: mode,
            included_paths: included.iter().map(|p| p.to_string()).collect(),
            excluded_paths: excluded.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_policy_is_valid() {
        assert_eq!(validate_indexing_policy(None), Ok(()));
    }

    #[parameterized(
        none_with_included = { IndexingMode::None, &["/*"], &[], Err(ValidationError::PathsNotAllowedWithNoneMode) },
        none_with_excluded = { IndexingMode::None, &[], &["/foo/?"], Err(ValidationError::PathsNotAllowedWithNoneMode) },
        none_without_paths = { IndexingMode::None, &[], &[], Ok(()) },
        wildcard_in_both = { IndexingMode::Consistent, &["/*", "/foo/?"], &["/*", "/bar/?"], Err(ValidationError::WildcardInBothLists) },
        no_wildcard = { IndexingMode::Consistent, &["/testing/?", "/foo/?"], &[], Err(ValidationError::MissingWildcardInIncluded) },
        wildcard_included = { IndexingMode::Consistent, &["/*", "/foo/?"], &["/testing/?", "/bar/?"], Ok(()) },
        wildcard_excluded = { IndexingMode::Consistent, &["/foo/?"], &["/*"], Ok(()) },
        lazy_no_wildcard = { IndexingMode::Lazy, &[], &["/bar/?"], Err(ValidationError::MissingWildcardInIncluded) },
        consistent_without_paths = { IndexingMode::Consistent, &[], &[], Ok(()) },
    )]
    fn test_validate_indexing_policy(
        mode: IndexingMode,
        included: &[&str],
        excluded: &[&str],
        expected: Result<(), ValidationError>,
    ) {
        let policy = policy(mode, included, excluded);
        assert_eq!(validate_indexing_policy(Some(&policy)), expected);
    }

    #[test]
    fn test_flatten_filters_etag_path() {
        let response: sdk::IndexingPolicy = serde_json::from_value(json!({
            "indexingMode": "consistent",
            "includedPaths": [{ "path": "/*" }],
            "excludedPaths": [{ "path": "/\"_etag\"/?" }, { "path": "/bar/?" }, {}]
        }))
        .unwrap();

        let flattened = flatten_indexing_policy(Some(&response)).unwrap();
        assert_eq!(flattened.included_paths, vec!["/*".to_string()]);
        assert_eq!(flattened.excluded_paths, vec!["/bar/?".to_string()]);
    }

    #[test]
    fn test_flatten_tolerates_empty_response() {
        let flattened = flatten_indexing_policy(Some(&sdk::IndexingPolicy::default())).unwrap();
        assert_eq!(flattened, IndexingPolicy::default());
        assert!(flatten_indexing_policy(None).is_none());
    }

    #[test]
    fn test_expand_sets_every_spatial_type() {
        let policy = IndexingPolicy {
            included_paths: vec!["/*".to_string()],
            composite_indexes: vec![CompositeIndex {
                indexes: vec![
                    CompositeIndexPath {
                        path: "/name".to_string(),
                        order: CompositePathOrder::Ascending,
                    },
                    CompositeIndexPath {
                        path: "/age".to_string(),
                        order: CompositePathOrder::Descending,
                    },
                ],
            }],
            spatial_indexes: vec![SpatialIndex {
                path: "/location/*".to_string(),
                types: vec![],
            }],
            ..Default::default()
        };

        let expanded = expand_indexing_policy(Some(&policy)).unwrap();
        insta::assert_json_snapshot!(expanded, @r#"
        {
          "indexingMode": "consistent",
          "includedPaths": [
            {
              "path": "/*"
            }
          ],
          "excludedPaths": [],
          "compositeIndexes": [
            [
              {
                "path": "/name",
                "order": "ascending"
              },
              {
                "path": "/age",
                "order": "descending"
              }
            ]
          ],
          "spatialIndexes": [
            {
              "path": "/location/*",
              "types": [
                "Point",
                "LineString",
                "Polygon",
                "MultiPolygon"
              ]
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_expand_then_flatten_keeps_user_paths() {
        let original = policy(IndexingMode::Consistent, &["/*"], &["/secret/?"]);
        let expanded = expand_indexing_policy(Some(&original));
        assert_eq!(flatten_indexing_policy(expanded.as_ref()), Some(original));
    }
}
