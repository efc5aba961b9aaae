use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::ids::ResourceKind;

/// Failure to parse a Cosmos DB resource id.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ParseError {
    #[error("no subscription ID found, expected the id to start with `/subscriptions/`")]
    MissingSubscription,

    #[error("no resource group name found, expected a `resourceGroups` segment")]
    MissingResourceGroup,

    #[error("ID was missing the `{0}` element")]
    MissingSegment(String),

    #[error("expected the segment `{expected}` but found `{found}` (segment keys are case-sensitive)")]
    UnexpectedSegment { expected: String, found: String },

    #[error("ID contained more segments than required: `{0}`")]
    UnexpectedTrailingSegments(String),
}

/// A configuration that is internally inconsistent and would be rejected by the service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("`included_path` and `excluded_path` cannot be set when `indexing_mode` is `none`")]
    PathsNotAllowedWithNoneMode,

    #[error("the wildcard path `/*` cannot be in both `included_path` and `excluded_path`")]
    WildcardInBothLists,

    #[error("either `included_path` or `excluded_path` must include the wildcard path `/*`")]
    MissingWildcardInIncluded,

    #[error("Cosmos DB Account name {0:?} must be 3 - 50 characters long, contain only lowercase letters, numbers and hyphens")]
    InvalidAccountName(String),

    #[error("{attribute} {name:?} must not end with a space or contain the characters `/`, `?`, `#` or `\\`, and must be at most 255 characters")]
    InvalidEntityName { attribute: String, name: String },

    #[error("`{attribute}` must be between {min} and {max}, got {value}")]
    OutOfRange {
        attribute: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("`{attribute}` must be set in increments of {step}, got {value}")]
    NotAnIncrement {
        attribute: String,
        value: i64,
        step: i64,
    },

    #[error("`throughput` and `autoscale_settings` cannot both be set")]
    ThroughputConflict,

    #[error("each `geo_location` needs to have a unique failover_priority. Multiple instances of '{0}' found")]
    DuplicateFailoverPriority(i64),

    #[error("each `geo_location` needs to be in unique location. Multiple instances of {0:?} found")]
    DuplicateGeoLocation(String),

    #[error("the maximum value for a failover priority = (total number of regions - 1). '{priority}' was found")]
    FailoverPriorityTooHigh { priority: i64 },

    #[error("there needs to be a `geo_location` with a `failover_priority` of `0`")]
    MissingPrimaryGeoLocation,

    #[error("`{attribute}` ({value}) must be at least {min} when more than one geo_location is used")]
    MultiRegionStaleness {
        attribute: String,
        value: i64,
        min: i64,
    },

    #[error("capability EnableMongo must be enabled if MongoDBv3.4 is also enabled")]
    MissingEnableMongo,

    #[error("notebook workspace name must be `default`, got {0:?}")]
    InvalidNotebookWorkspaceName(String),

    #[error("`key_vault_key_id` {0:?} must be a versionless key id such as `https://{{vault}}.vault.azure.net/keys/{{name}}`")]
    InvalidKeyVaultKeyId(String),

    #[error("`default_identity_type` {0:?} must be `FirstPartyIdentity`, `SystemAssignedIdentity` or `UserAssignedIdentity={{id}}`")]
    InvalidDefaultIdentity(String),

    #[error("`identity_ids` must be set when `identity.type` is `{0}`")]
    MissingIdentityIds(String),

    #[error("`identity_ids` cannot be set when `identity.type` is `{0}`")]
    UnexpectedIdentityIds(String),

    #[error("`create_mode` only works when `backup.type` is `Continuous`")]
    CreateModeRequiresContinuousBackup,

    #[error("`restore` must be set exactly when `create_mode` is `Restore`")]
    RestoreModeMismatch,

    #[error("`{attribute}` {value:?} must be an RFC 3339 timestamp")]
    InvalidTimestamp { attribute: String, value: String },
}

/// Errors surfaced by an [`ArmClient`](crate::client::ArmClient) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ClientError {
    #[error("request for {id:?} failed with status {status}: {message}")]
    Status {
        id: String,
        status: u16,
        message: String,
    },

    #[error("timed out after {seconds}s waiting for {id:?}")]
    Timeout { id: String, seconds: u64 },

    #[error("transport error: {0}")]
    Transport(String),
}

/// The handler step that failed, used when wrapping errors with context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Creating,
    Reading,
    Updating,
    Deleting,
    Importing,
}

#[derive(Debug, Error)]
pub enum CosmosError {
    #[error("parsing resource id {input:?}: {source}")]
    InvalidId {
        input: String,
        #[source]
        source: ParseError,
    },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("a resource with the ID {0:?} already exists - to be managed via Terraform this resource needs to be imported into the State")]
    AlreadyExists(String),

    #[error("{0:?} was not found")]
    NotFound(String),

    #[error("changing `{attribute}` on {id:?} requires the resource to be replaced")]
    RequiresReplacement { id: String, attribute: String },

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("decoding response for {id:?}: {message}")]
    Decode { id: String, message: String },

    #[error("encoding request: {0}")]
    Encode(String),

    #[error("{operation} {kind} {name:?} (Resource Group {resource_group:?}): {source}")]
    Operation {
        operation: Operation,
        kind: ResourceKind,
        name: String,
        resource_group: String,
        #[source]
        source: Box<CosmosError>,
    },
}

impl CosmosError {
    /// The innermost error, skipping any [`CosmosError::Operation`] context.
    pub fn root(&self) -> &CosmosError {
        match self {
            CosmosError::Operation { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for CosmosError {
    fn from(err: serde_json::Error) -> Self {
        CosmosError::Encode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_operation_context() {
        let err = CosmosError::Operation {
            operation: Operation::Reading,
            kind: ResourceKind::SqlContainer,
            name: "c1".to_string(),
            resource_group: "rg1".to_string(),
            source: Box::new(CosmosError::NotFound("/x".to_string())),
        };
        assert!(matches!(err.root(), CosmosError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            r#"reading SqlContainer "c1" (Resource Group "rg1"): "/x" was not found"#
        );
    }

    #[test]
    fn test_invalid_id_names_the_input() {
        let err = CosmosError::InvalidId {
            input: "/bogus".to_string(),
            source: ParseError::MissingSubscription,
        };
        assert!(err.to_string().contains("\"/bogus\""));
    }

    #[test]
    fn test_parse_error_serialization() {
        let err = ParseError::MissingSegment("containers".to_string());
        let serialized = serde_json::to_value(&err).unwrap();
        let deserialized: ParseError = serde_json::from_value(serialized).unwrap();
        assert_eq!(err, deserialized);
    }
}
