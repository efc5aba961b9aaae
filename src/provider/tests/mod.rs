use super::*;
use crate::client::{InMemoryArmClient, Method};
use crate::error::{ClientError, ValidationError};
use crate::indexing::{IndexingMode, IndexingPolicy};
use crate::models::{
    CassandraSchema, CassandraTable, CassandraTableModel, NotebookWorkspace, NotebookWorkspaceModel,
    SqlContainer, SqlContainerModel, SqlDatabase, SqlDatabaseModel, SqlStoredProcedure,
    SqlStoredProcedureModel, SqlTrigger, SqlTriggerModel, TriggerOperation, TriggerType,
};


pub(super) const SUBSCRIPTION: &str = "12345678-1234-9876-4563-123456789012";
pub(super) const ACCOUNT_ID: &str = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acc1";

pub(super) fn provider() -> CosmosProvider<InMemoryArmClient> {
    let config = ProviderConfig::new(SUBSCRIPTION).unwrap();
    CosmosProvider::new(InMemoryArmClient::new(), config)
}

pub(super) fn database(provisioned: ProvisionedThroughput) -> SqlDatabaseModel {
    SqlDatabaseModel {
        name: "db1".to_string(),
        resource_group_name: "rg1".to_string(),
        account_name: "acc1".to_string(),
        provisioned,
    }
}

pub(super) fn container() -> SqlContainerModel {
    SqlContainerModel {
        name: "c1".to_string(),
        resource_group_name: "rg1".to_string(),
        account_name: "acc1".to_string(),
        database_name: "db1".to_string(),
        partition_key_paths: vec!["/tenant".to_string()],
        partition_key_version: Some(2),
        default_ttl: Some(3600),
        indexing_policy: Some(IndexingPolicy {
            included_paths: vec!["/*".to_string()],
            excluded_paths: vec!["/blob/?".to_string()],
            ..Default::default()
        }),
        provisioned: ProvisionedThroughput::manual(400),
        ..Default::default()
    }
}

fn container_id() -> String {
    format!("{ACCOUNT_ID}/sqlDatabases/db1/containers/c1")
}

#[test]
fn test_create_then_read_round_trips() {
    let provider = provider();
    let created = provider.create::<SqlContainer>(&container()).unwrap();
    assert_eq!(created, container());

    let read = provider.read::<SqlContainer>(&container_id()).unwrap();
    assert_eq!(read, Some(container()));
}

#[test]
fn test_create_twice_is_already_exists() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();

    let err = provider.create::<SqlContainer>(&container()).unwrap_err();
    assert!(matches!(
        &err,
        CosmosError::Operation {
            operation: Operation::Creating,
            ..
        }
    ));
    assert!(matches!(err.root(), CosmosError::AlreadyExists(id) if *id == container_id()));
}

#[test]
fn test_validation_runs_before_any_request() {
    let provider = provider();
    let mut model = container();
    model.indexing_policy = Some(IndexingPolicy {
        indexing_mode: IndexingMode::None,
        included_paths: vec!["/*".to_string()],
        ..Default::default()
    });

    let err = provider.create::<SqlContainer>(&model).unwrap_err();
    assert!(matches!(
        err.root(),
        CosmosError::Validation(ValidationError::PathsNotAllowedWithNoneMode)
    ));
    assert!(provider.client().calls().is_empty());
}

fn assert_unaddressable(err: &CosmosError) {
    assert!(
        matches!(err.root(), CosmosError::InvalidId { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_create_rejects_empty_parent_components() {
    let provider = provider();

    let mut no_account = database(ProvisionedThroughput::default());
    no_account.account_name = String::new();
    assert_unaddressable(&provider.create::<SqlDatabase>(&no_account).unwrap_err());

    let mut no_group = database(ProvisionedThroughput::default());
    no_group.resource_group_name = String::new();
    assert_unaddressable(&provider.create::<SqlDatabase>(&no_group).unwrap_err());

    assert!(provider.client().calls().is_empty());
}

#[test]
fn test_create_rejects_slash_in_parent_name() {
    let provider = provider();
    let procedure = SqlStoredProcedureModel {
        name: "sp1".to_string(),
        resource_group_name: "rg1".to_string(),
        account_name: "acc1".to_string(),
        database_name: "db1".to_string(),
        container_name: "c1/extra".to_string(),
        body: "function sp1() {}".to_string(),
    };
    assert_unaddressable(&provider.create::<SqlStoredProcedure>(&procedure).unwrap_err());
    assert!(provider.client().calls().is_empty());

    let procedure = SqlStoredProcedureModel {
        container_name: "c1".to_string(),
        ..procedure
    };
    assert_eq!(provider.create::<SqlStoredProcedure>(&procedure).unwrap(), procedure);
}

#[test]
fn test_update_rejects_unaddressable_model() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();
    let before = provider.client().calls().len();

    let mut desired = container();
    desired.database_name = "db1/containers".to_string();
    assert_unaddressable(&provider.update::<SqlContainer>(&container_id(), &desired).unwrap_err());
    assert_eq!(provider.client().calls().len(), before);
}

#[test]
fn test_read_of_missing_resource_is_none() {
    let provider = provider();
    assert_eq!(provider.read::<SqlContainer>(&container_id()).unwrap(), None);
}

#[test]
fn test_delete_then_read_is_none() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();
    provider.delete::<SqlContainer>(&container_id()).unwrap();

    assert_eq!(provider.read::<SqlContainer>(&container_id()).unwrap(), None);
    assert!(
        provider
            .client()
            .stored(&format!("{}/throughputSettings/default", container_id()))
            .is_none()
    );
}

#[test]
fn test_import_requires_an_existing_resource() {
    let provider = provider();
    let err = provider.import::<SqlContainer>(&container_id()).unwrap_err();
    assert!(matches!(
        &err,
        CosmosError::Operation {
            operation: Operation::Importing,
            ..
        }
    ));
    assert!(matches!(err.root(), CosmosError::NotFound(_)));

    provider.create::<SqlContainer>(&container()).unwrap();
    assert_eq!(provider.import::<SqlContainer>(&container_id()).unwrap(), container());
}

#[test]
fn test_import_accepts_legacy_ids() {
    let provider = provider();
    provider
        .create::<SqlDatabase>(&database(ProvisionedThroughput::default()))
        .unwrap();

    let legacy = format!("{ACCOUNT_ID}/apis/sql/databases/db1");
    let imported = provider.import::<SqlDatabase>(&legacy).unwrap();
    assert_eq!(imported.name, "db1");
}

#[test]
fn test_malformed_id_names_the_input() {
    let provider = provider();
    let input = format!("{ACCOUNT_ID}/SqlDatabases/db1/containers/c1");
    let err = provider.read::<SqlContainer>(&input).unwrap_err();
    match err {
        CosmosError::InvalidId { input: found, .. } => assert_eq!(found, input),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_data_source_reads_by_typed_id() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();

    let id = crate::ids::SqlContainerId::new(SUBSCRIPTION, "rg1", "acc1", "db1", "c1");
    assert_eq!(provider.data_source::<SqlContainer>(&id).unwrap(), container());

    let missing = crate::ids::SqlContainerId::new(SUBSCRIPTION, "rg1", "acc1", "db1", "c2");
    let err = provider.data_source::<SqlContainer>(&missing).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            r#"reading SqlContainer "c2" (Resource Group "rg1"): "{ACCOUNT_ID}/sqlDatabases/db1/containers/c2" was not found"#
        )
    );
}

#[test]
fn test_client_failures_carry_operation_context() {
    let provider = provider();
    provider
        .client()
        .fail_with(
            container_id(),
            ClientError::Timeout {
                id: container_id(),
                seconds: 1800,
            },
        )
        .unwrap();

    let err = provider.delete::<SqlContainer>(&container_id()).unwrap_err();
    assert!(err.to_string().starts_with(r#"deleting SqlContainer "c1" (Resource Group "rg1")"#));
    assert!(matches!(err.root(), CosmosError::Client(ClientError::Timeout { .. })));
    assert_eq!(provider.client().calls(), vec![(Method::Delete, container_id())]);
}

#[test]
fn test_update_rejects_partition_key_change() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();

    let mut desired = container();
    desired.partition_key_paths = vec!["/region".to_string()];
    let err = provider.update::<SqlContainer>(&container_id(), &desired).unwrap_err();
    assert!(matches!(
        err.root(),
        CosmosError::RequiresReplacement { attribute, .. } if attribute == "partition_key_paths"
    ));
}

#[test]
fn test_update_rejects_rename() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();

    let mut desired = container();
    desired.name = "c2".to_string();
    let err = provider.update::<SqlContainer>(&container_id(), &desired).unwrap_err();
    assert!(matches!(
        err.root(),
        CosmosError::RequiresReplacement { attribute, .. } if attribute == "name"
    ));
}

#[test]
fn test_update_of_missing_resource_is_not_found() {
    let provider = provider();
    let err = provider.update::<SqlContainer>(&container_id(), &container()).unwrap_err();
    assert!(matches!(err.root(), CosmosError::NotFound(_)));
}

#[test]
fn test_update_applies_in_place_changes() {
    let provider = provider();
    provider.create::<SqlContainer>(&container()).unwrap();

    let mut desired = container();
    desired.default_ttl = Some(-1);
    let updated = provider.update::<SqlContainer>(&container_id(), &desired).unwrap();
    assert_eq!(updated, desired);
}

#[test]
fn test_trigger_is_addressed_through_its_container() {
    let provider = provider();
    let trigger = SqlTriggerModel {
        name: "audit".to_string(),
        container_id: container_id(),
        body: "function audit() {}".to_string(),
        trigger_type: TriggerType::Post,
        operation: TriggerOperation::Create,
    };
    assert_eq!(provider.create::<SqlTrigger>(&trigger).unwrap(), trigger);
    assert!(
        provider
            .client()
            .stored(&format!("{}/triggers/audit", container_id()))
            .is_some()
    );
}

#[test]
fn test_cassandra_table_lifecycle() {
    let provider = provider();
    let keyspace_id = format!("{ACCOUNT_ID}/cassandraKeyspaces/ks1");
    let model = CassandraTableModel {
        name: "t1".to_string(),
        cassandra_keyspace_id: keyspace_id.clone(),
        schema: CassandraSchema {
            partition_keys: vec!["id".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    assert_eq!(provider.create::<CassandraTable>(&model).unwrap(), model);

    let table_id = format!("{keyspace_id}/tables/t1");
    provider.delete::<CassandraTable>(&table_id).unwrap();
    assert_eq!(provider.read::<CassandraTable>(&table_id).unwrap(), None);
}

#[test]
fn test_notebook_workspace_must_be_named_default() {
    let provider = provider();
    let mut model = NotebookWorkspaceModel {
        name: "default".to_string(),
        resource_group_name: "rg1".to_string(),
        account_name: "acc1".to_string(),
        server_endpoint: None,
    };
    assert_eq!(provider.create::<NotebookWorkspace>(&model).unwrap(), model);

    model.name = "mine".to_string();
    let err = provider.create::<NotebookWorkspace>(&model).unwrap_err();
    assert!(matches!(
        err.root(),
        CosmosError::Validation(ValidationError::InvalidNotebookWorkspaceName(_))
    ));
}
