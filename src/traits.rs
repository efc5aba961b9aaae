use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CosmosError, ParseError, ValidationError};
use crate::ids::{DatabaseAccountId, ResourceKind, ResourcePath, codec};
use crate::models::ProvisionedThroughput;

/// A typed Cosmos DB resource id, e.g. `SqlContainerId`.
///
/// Implementors only describe their components; formatting and parsing are
/// shared through [`codec`].
pub trait CosmosResourceId: Sized + Clone + Debug {
    /// The kind this id addresses.
    const KIND: ResourceKind;

    fn subscription_id(&self) -> &str;

    fn resource_group(&self) -> &str;

    /// One name per segment of [`Self::KIND`], the account first.
    fn names(&self) -> Vec<&str>;

    /// Bind parsed components. The codec guarantees one name per segment.
    fn from_path(path: ResourcePath) -> Self;

    /// The canonical id string.
    fn id(&self) -> String {
        codec::format(
            Self::KIND,
            self.subscription_id(),
            self.resource_group(),
            &self.names(),
        )
    }

    fn parse(input: &str) -> Result<Self, ParseError> {
        codec::parse(input, Self::KIND).map(Self::from_path)
    }

    /// The name of the addressed resource (the last segment).
    fn name(&self) -> &str {
        self.names().last().copied().unwrap_or_default()
    }

    fn account_name(&self) -> &str {
        self.names().first().copied().unwrap_or_default()
    }

    fn account_id(&self) -> DatabaseAccountId {
        DatabaseAccountId::new(
            self.subscription_id(),
            self.resource_group(),
            self.account_name(),
        )
    }
}

/// A manageable Cosmos DB resource: its id, its user-facing model and the
/// ARM request/response shapes, plus the expand/flatten mappers between them.
pub trait CosmosResource {
    type Id: CosmosResourceId;
    type Model: Clone + Debug + Serialize + DeserializeOwned;
    type Request: Serialize;
    type Response: DeserializeOwned;

    /// Build the id for a model that is about to be created.
    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError>;

    /// Local consistency checks run before any request is sent.
    fn validate(_model: &Self::Model) -> Result<(), ValidationError> {
        Ok(())
    }

    fn expand(model: &Self::Model) -> Self::Request;

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model;

    /// Reject in-place updates the service cannot apply.
    fn check_update(
        _id: &Self::Id,
        _existing: &Self::Model,
        _desired: &Self::Model,
    ) -> Result<(), CosmosError> {
        Ok(())
    }

    /// Shared throughput settings, for kinds that carry them.
    fn provisioned_throughput(_model: &Self::Model) -> Option<&ProvisionedThroughput> {
        None
    }

    fn provisioned_throughput_mut(_model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        None
    }
}
