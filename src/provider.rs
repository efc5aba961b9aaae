//! Create/read/update/delete handlers for every Cosmos DB resource kind.
//!
//! The handlers are generic over [`CosmosResource`]; the kind-specific work
//! lives in the expand/flatten mappers of [`crate::models`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{ArmClient, throughput_settings_id};
use crate::config::ProviderConfig;
use crate::error::{CosmosError, Operation, ParseError};
use crate::ids::{DatabaseAccountId, ResourceKind, Timeouts};
use crate::models::{AccountKeys, ProvisionedThroughput};
use crate::sdk::{
    DatabaseAccountListConnectionStringsResult, DatabaseAccountListKeysResult, ThroughputSettingsGetResults,
};
use crate::traits::{CosmosResource, CosmosResourceId};

/// The handler entry point. Cheap to share: `C` only needs to be `Send + Sync`.
pub struct CosmosProvider<C: ArmClient> {
    client: C,
    config: ProviderConfig,
}

fn context<I: CosmosResourceId>(operation: Operation, id: &I) -> impl FnOnce(CosmosError) -> CosmosError + '_ {
    move |source| CosmosError::Operation {
        operation,
        kind: I::KIND,
        name: id.name().to_string(),
        resource_group: id.resource_group().to_string(),
        source: Box::new(source),
    }
}

fn parse_id<I: CosmosResourceId>(input: &str) -> Result<I, CosmosError> {
    I::parse(input).map_err(|source| CosmosError::InvalidId {
        input: input.to_string(),
        source,
    })
}

const LIST_KEYS: &str = "listKeys";
const LIST_READ_ONLY_KEYS: &str = "readonlykeys";
const LIST_CONNECTION_STRINGS: &str = "listConnectionStrings";

/// An id built from a model must parse back to itself. Empty or `/`-containing
/// components do not.
fn check_round_trip<I: CosmosResourceId>(id: &I) -> Result<(), CosmosError> {
    let formatted = id.id();
    let reformatted = parse_id::<I>(&formatted)?.id();
    if reformatted != formatted {
        return Err(CosmosError::InvalidId {
            input: formatted.clone(),
            source: ParseError::UnexpectedSegment {
                expected: formatted,
                found: reformatted,
            },
        });
    }
    Ok(())
}

/// Drop the create-time `options` block; updates carry throughput separately.
fn strip_create_options(body: &mut Value) {
    if let Some(properties) = body.get_mut("properties").and_then(Value::as_object_mut) {
        properties.remove("options");
    }
}

impl<C: ArmClient> CosmosProvider<C> {
    pub fn new(client: C, config: ProviderConfig) -> Self {
        CosmosProvider { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn timeouts<R: CosmosResource>(&self) -> Timeouts {
        self.config.timeouts(<R::Id as CosmosResourceId>::KIND)
    }

    /// Create the resource described by `model` and return it as read back.
    pub fn create<R: CosmosResource>(&self, model: &R::Model) -> Result<R::Model, CosmosError> {
        let id = R::resource_id(model, &self.config.subscription_id)?;
        self.create_at::<R>(&id, model)
            .map_err(context(Operation::Creating, &id))
    }

    fn create_at<R: CosmosResource>(&self, id: &R::Id, model: &R::Model) -> Result<R::Model, CosmosError> {
        let resource_id = id.id();
        debug!(event = "Create", phase = "Start", id = resource_id.as_str());

        check_round_trip(id)?;
        R::validate(model)?;
        if self.client.get(&resource_id, self.timeouts::<R>().read)?.is_some() {
            return Err(CosmosError::AlreadyExists(resource_id));
        }

        let body = serde_json::to_value(R::expand(model))?;
        debug!(event = "Create", phase = "Request", id = resource_id.as_str(), body = %body);
        self.client.put(&resource_id, body, self.timeouts::<R>().create)?;

        self.read_at::<R>(id)?
            .ok_or(CosmosError::NotFound(resource_id))
    }

    /// `Ok(None)` means the resource is gone and should be dropped from state.
    pub fn read<R: CosmosResource>(&self, id: &str) -> Result<Option<R::Model>, CosmosError> {
        let id: R::Id = parse_id(id)?;
        let model = self
            .read_at::<R>(&id)
            .map_err(context(Operation::Reading, &id))?;
        if model.is_none() {
            info!(
                event = "Read",
                phase = "Missing",
                id = id.id().as_str(),
                "resource was not found, removing from state"
            );
        }
        Ok(model)
    }

    fn read_at<R: CosmosResource>(&self, id: &R::Id) -> Result<Option<R::Model>, CosmosError> {
        let resource_id = id.id();
        let timeout = self.timeouts::<R>().read;
        let Some(body) = self.client.get(&resource_id, timeout)? else {
            debug!(event = "Read", phase = "Missing", id = resource_id.as_str());
            return Ok(None);
        };

        let response: R::Response = serde_json::from_value(body).map_err(|e| CosmosError::Decode {
            id: resource_id.clone(),
            message: e.to_string(),
        })?;
        let mut model = R::flatten(id, &response);
        if let Some(throughput) = R::provisioned_throughput_mut(&mut model) {
            *throughput = self.read_throughput(&resource_id, timeout)?;
        }
        debug!(event = "Read", phase = "Flattened", id = resource_id.as_str());
        Ok(Some(model))
    }

    /// Resources without dedicated throughput have no settings; that is not an error.
    fn read_throughput(&self, resource_id: &str, timeout: std::time::Duration) -> Result<ProvisionedThroughput, CosmosError> {
        let settings_id = throughput_settings_id(resource_id);
        let Some(body) = self.client.get(&settings_id, timeout)? else {
            return Ok(ProvisionedThroughput::default());
        };
        match serde_json::from_value::<ThroughputSettingsGetResults>(body) {
            Ok(settings) => Ok(ProvisionedThroughput::flatten(&settings)),
            Err(e) => {
                warn!(
                    event = "Read",
                    phase = "Throughput",
                    id = settings_id.as_str(),
                    error = %e
                );
                Ok(ProvisionedThroughput::default())
            }
        }
    }

    /// Apply `model` to the existing resource at `id`.
    pub fn update<R: CosmosResource>(&self, id: &str, model: &R::Model) -> Result<R::Model, CosmosError> {
        let id: R::Id = parse_id(id)?;
        self.update_at::<R>(&id, model)
            .map_err(context(Operation::Updating, &id))
    }

    fn update_at<R: CosmosResource>(&self, id: &R::Id, model: &R::Model) -> Result<R::Model, CosmosError> {
        let resource_id = id.id();
        debug!(event = "Update", phase = "Start", id = resource_id.as_str());

        let desired = R::resource_id(model, &self.config.subscription_id)?;
        check_round_trip(&desired)?;
        R::validate(model)?;
        if desired.resource_group() != id.resource_group() {
            return Err(CosmosError::RequiresReplacement {
                id: resource_id,
                attribute: "resource_group_name".to_string(),
            });
        }
        if desired.names() != id.names() {
            return Err(CosmosError::RequiresReplacement {
                id: resource_id,
                attribute: "name".to_string(),
            });
        }

        let existing = self
            .read_at::<R>(id)?
            .ok_or_else(|| CosmosError::NotFound(resource_id.clone()))?;
        R::check_update(id, &existing, model)?;

        let timeouts = self.timeouts::<R>();
        let mut body = serde_json::to_value(R::expand(model))?;
        strip_create_options(&mut body);
        self.client.put(&resource_id, body, timeouts.update)?;

        if let (Some(current), Some(wanted)) = (
            R::provisioned_throughput(&existing),
            R::provisioned_throughput(model),
        ) {
            if current != wanted {
                if let Some(settings) = wanted.expand_settings() {
                    debug!(event = "Update", phase = "Throughput", id = resource_id.as_str());
                    self.client.put(
                        &throughput_settings_id(&resource_id),
                        serde_json::to_value(settings)?,
                        timeouts.update,
                    )?;
                }
            }
        }

        self.read_at::<R>(id)?
            .ok_or(CosmosError::NotFound(resource_id))
    }

    pub fn delete<R: CosmosResource>(&self, id: &str) -> Result<(), CosmosError> {
        let id: R::Id = parse_id(id)?;
        let resource_id = id.id();
        debug!(event = "Delete", phase = "Start", id = resource_id.as_str());
        self.client
            .delete(&resource_id, self.timeouts::<R>().delete)
            .map_err(CosmosError::from)
            .map_err(context(Operation::Deleting, &id))
    }

    /// Bring an existing resource under management. Missing is an error here.
    pub fn import<R: CosmosResource>(&self, id: &str) -> Result<R::Model, CosmosError> {
        let id: R::Id = parse_id(id)?;
        self.read_at::<R>(&id)
            .and_then(|model| model.ok_or_else(|| CosmosError::NotFound(id.id())))
            .map_err(context(Operation::Importing, &id))
    }

    /// Look up a resource for a data source. Missing is an error here.
    pub fn data_source<R: CosmosResource>(&self, id: &R::Id) -> Result<R::Model, CosmosError> {
        self.read_at::<R>(id)
            .and_then(|model| model.ok_or_else(|| CosmosError::NotFound(id.id())))
            .map_err(context(Operation::Reading, id))
    }

    /// The keys and connection strings of the account at `id`.
    pub fn account_keys(&self, id: &str) -> Result<AccountKeys, CosmosError> {
        let id: DatabaseAccountId = parse_id(id)?;
        self.account_keys_at(&id)
            .map_err(context(Operation::Reading, &id))
    }

    fn account_keys_at(&self, id: &DatabaseAccountId) -> Result<AccountKeys, CosmosError> {
        let account_id = id.id();
        let timeout = self.config.timeouts(ResourceKind::DatabaseAccount).read;
        let keys: DatabaseAccountListKeysResult = self.list_action(&account_id, LIST_KEYS, timeout)?;
        let readonly_keys: DatabaseAccountListKeysResult =
            self.list_action(&account_id, LIST_READ_ONLY_KEYS, timeout)?;
        let connection_strings: DatabaseAccountListConnectionStringsResult =
            self.list_action(&account_id, LIST_CONNECTION_STRINGS, timeout)?;
        Ok(AccountKeys::flatten(&keys, &readonly_keys, &connection_strings))
    }

    fn list_action<T: DeserializeOwned>(
        &self,
        resource_id: &str,
        action: &str,
        timeout: std::time::Duration,
    ) -> Result<T, CosmosError> {
        let action_id = format!("{resource_id}/{action}");
        debug!(event = "Read", phase = "ListAction", id = action_id.as_str());
        let body = self
            .client
            .post(&action_id, timeout)?
            .ok_or_else(|| CosmosError::NotFound(action_id.clone()))?;
        serde_json::from_value(body).map_err(|e| CosmosError::Decode {
            id: action_id,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests;
