use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CosmosError, ValidationError};
use crate::ids::TableId;
use crate::models::common::{ProvisionedThroughput, validate_entity_name};
use crate::sdk::{self, CreateUpdateParameters, GetResults};
use crate::traits::CosmosResource;

/// An `azurerm_cosmosdb_table`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TableModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    #[serde(flatten)]
    pub provisioned: ProvisionedThroughput,
}

pub struct Table;

impl CosmosResource for Table {
    type Id = TableId;
    type Model = TableModel;
    type Request = CreateUpdateParameters<sdk::NamedResource>;
    type Response = GetResults<sdk::NamedResource>;

    fn resource_id(model: &Self::Model, subscription_id: &str) -> Result<Self::Id, CosmosError> {
        Ok(TableId::new(
            subscription_id,
            &model.resource_group_name,
            &model.account_name,
            &model.name,
        ))
    }

    fn validate(model: &Self::Model) -> Result<(), ValidationError> {
        validate_entity_name("name", &model.name)?;
        model.provisioned.validate()
    }

    fn expand(model: &Self::Model) -> Self::Request {
        CreateUpdateParameters::new(
            sdk::NamedResource {
                id: Some(model.name.clone()),
                ..Default::default()
            },
            model.provisioned.expand_create_options(),
        )
    }

    fn flatten(id: &Self::Id, _response: &Self::Response) -> Self::Model {
        TableModel {
            name: id.table_name.clone(),
            resource_group_name: id.resource_group.clone(),
            account_name: id.database_account_name.clone(),
            provisioned: ProvisionedThroughput::default(),
        }
    }

    fn provisioned_throughput(model: &Self::Model) -> Option<&ProvisionedThroughput> {
        Some(&model.provisioned)
    }

    fn provisioned_throughput_mut(model: &mut Self::Model) -> Option<&mut ProvisionedThroughput> {
        Some(&mut model.provisioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_request_carries_manual_throughput() {
        let model = TableModel {
            name: "t1".to_string(),
            resource_group_name: "rg1".to_string(),
            account_name: "acc1".to_string(),
            provisioned: ProvisionedThroughput::manual(400),
        };
        assert_eq!(Table::validate(&model), Ok(()));
        insta::assert_json_snapshot!(Table::expand(&model), @r#"
        {
          "properties": {
            "resource": {
              "id": "t1"
            },
            "options": {
              "throughput": 400
            }
          }
        }
        "#);
    }

    #[test]
    fn test_model_flattens_throughput_fields() {
        let model = TableModel {
            name: "t1".to_string(),
            provisioned: ProvisionedThroughput::autoscale(4000),
            ..Default::default()
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["autoscale_settings"]["max_throughput"], 4000);
        assert!(value.get("provisioned").is_none());
    }
}
