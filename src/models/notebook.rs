use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::NotebookWorkspaceId;
use crate::sdk;
use crate::traits::CosmosResource;

/// The only name the service accepts for a notebook workspace.
pub const NOTEBOOK_WORKSPACE_NAME: &str = "default";

/// An `azurerm_cosmosdb_notebook_workspace`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotebookWorkspaceModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_endpoint: Option<String>,
}

pub struct NotebookWorkspace;

impl CosmosResource for NotebookWorkspace {
    type Id = NotebookWorkspaceId;
    type Model = NotebookWorkspaceModel;
    type Request = sdk::NotebookWorkspaceCreateUpdateParameters;
    type Response = sdk::NotebookWorkspace;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(NotebookWorkspaceId::new(
            subscription_id,
            &model.resource_group_name,
            &model.account_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        if model.name != NOTEBOOK_WORKSPACE_NAME {
            return Err(ValidationError::InvalidNotebookWorkspaceName(model.name.clone()));
        }
        Ok(())
    }

    fn expand(_model: &Self::Model) -> Self::Request {
        sdk::NotebookWorkspaceCreateUpdateParameters {}
    }

    fn flatten(id: &Self::Id, response: &Self::Response) -> Self::Model {
        NotebookWorkspaceModel {
            name: id.notebook_workspace_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            server_endpoint: response
                .properties
                .as_ref()
                .and_then(|p| p.notebook_server_endpoint.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_default_name_is_accepted() {
        let mut model = NotebookWorkspaceModel {
            name: "default".to_string(),
            ..Default::default()
        };
        assert_eq!(NotebookWorkspace::validate(&model), Ok(()));

        model.name = "mine".to_string();
        assert_eq!(
            NotebookWorkspace::validate(&model),
            Err(ValidationError::InvalidNotebookWorkspaceName("mine".to_string()))
        );
    }

    #[test]
    fn test_server_endpoint_is_computed() {
        let response: sdk::NotebookWorkspace = serde_json::from_value(serde_json::json!({
            "properties": { "notebookServerEndpoint": "https://nb.example/", "status": "Online" }
        }))
        .unwrap();
        let id = NotebookWorkspaceId::new("sub", "rg1", "acc1", "default");
        let model = NotebookWorkspace::flatten(&id, &response);
        assert_eq!(model.server_endpoint.as_deref(), Some("https://nb.example/"));
    }
}
