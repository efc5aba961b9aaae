//! Typed identifiers, one per resource kind.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;
use crate::traits::CosmosResourceId;

use super::codec::ResourcePath;
use super::kind::ResourceKind;

macro_rules! cosmos_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub struct $name {
            pub subscription_id: String,
            pub resource_group: String,
            $(pub $field: String,)+
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new(
                subscription_id: impl Into<String>,
                resource_group: impl Into<String>,
                $($field: impl Into<String>,)+
            ) -> Self {
                Self {
                    subscription_id: subscription_id.into(),
                    resource_group: resource_group.into(),
                    $($field: $field.into(),)+
                }
            }
        }

        impl CosmosResourceId for $name {
            const KIND: ResourceKind = ResourceKind::$kind;

            fn subscription_id(&self) -> &str {
                &self.subscription_id
            }

            fn resource_group(&self) -> &str {
                &self.resource_group
            }

            fn names(&self) -> Vec<&str> {
                vec![$(self.$field.as_str()),+]
            }

            fn from_path(path: ResourcePath) -> Self {
                let mut names = path.names.into_iter();
                Self {
                    subscription_id: path.subscription_id,
                    resource_group: path.resource_group,
                    $($field: names.next().unwrap_or_default(),)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(&self.id())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as CosmosResourceId>::parse(s)
            }
        }

        impl From<$name> for ResourceId {
            fn from(id: $name) -> Self {
                ResourceId::$kind(id)
            }
        }
    };
}

cosmos_id!(
    /// `.../databaseAccounts/{account}`
    DatabaseAccountId => DatabaseAccount { database_account_name }
);
cosmos_id!(
    /// `.../databaseAccounts/{account}/sqlDatabases/{db}`
    SqlDatabaseId => SqlDatabase { database_account_name, sql_database_name }
);
cosmos_id!(
    /// `.../sqlDatabases/{db}/containers/{container}`
    SqlContainerId => SqlContainer { database_account_name, sql_database_name, container_name }
);
cosmos_id!(
    SqlStoredProcedureId => SqlStoredProcedure {
        database_account_name,
        sql_database_name,
        container_name,
        stored_procedure_name,
    }
);
cosmos_id!(
    SqlTriggerId => SqlTrigger {
        database_account_name,
        sql_database_name,
        container_name,
        trigger_name,
    }
);
cosmos_id!(
    SqlFunctionId => SqlFunction {
        database_account_name,
        sql_database_name,
        container_name,
        user_defined_function_name,
    }
);
cosmos_id!(
    MongoDbDatabaseId => MongoDbDatabase { database_account_name, mongodb_database_name }
);
cosmos_id!(
    MongoDbCollectionId => MongoDbCollection {
        database_account_name,
        mongodb_database_name,
        collection_name,
    }
);
cosmos_id!(
    CassandraKeyspaceId => CassandraKeyspace { database_account_name, cassandra_keyspace_name }
);
cosmos_id!(
    CassandraTableId => CassandraTable {
        database_account_name,
        cassandra_keyspace_name,
        table_name,
    }
);
cosmos_id!(
    GremlinDatabaseId => GremlinDatabase { database_account_name, gremlin_database_name }
);
cosmos_id!(
    GremlinGraphId => GremlinGraph { database_account_name, gremlin_database_name, graph_name }
);
cosmos_id!(
    /// A Table API table, `.../databaseAccounts/{account}/tables/{table}`.
    TableId => Table { database_account_name, table_name }
);
cosmos_id!(
    NotebookWorkspaceId => NotebookWorkspace { database_account_name, notebook_workspace_name }
);

impl SqlContainerId {
    pub fn database_id(&self) -> SqlDatabaseId {
        SqlDatabaseId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.database_account_name,
            &self.sql_database_name,
        )
    }
}

impl CassandraTableId {
    pub fn keyspace_id(&self) -> CassandraKeyspaceId {
        CassandraKeyspaceId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.database_account_name,
            &self.cassandra_keyspace_name,
        )
    }
}

macro_rules! resource_id_enum {
    ($($kind:ident($ty:ident)),+ $(,)?) => {
        /// Any Cosmos DB resource id, tagged with its kind.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum ResourceId {
            $($kind($ty),)+
        }

        impl ResourceId {
            /// Parse `input` as an id of `kind`.
            pub fn parse(input: &str, kind: ResourceKind) -> Result<Self, ParseError> {
                match kind {
                    $(ResourceKind::$kind => <$ty as CosmosResourceId>::parse(input).map(Self::$kind),)+
                }
            }

            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(Self::$kind(_) => ResourceKind::$kind,)+
                }
            }

            /// The canonical id string.
            pub fn id(&self) -> String {
                match self {
                    $(Self::$kind(id) => id.id(),)+
                }
            }

            /// The name of the addressed resource (the last segment).
            pub fn name(&self) -> &str {
                match self {
                    $(Self::$kind(id) => id.name(),)+
                }
            }

            pub fn resource_group(&self) -> &str {
                match self {
                    $(Self::$kind(id) => id.resource_group(),)+
                }
            }

            pub fn account_id(&self) -> DatabaseAccountId {
                match self {
                    $(Self::$kind(id) => id.account_id(),)+
                }
            }
        }
    };
}

resource_id_enum!(
    DatabaseAccount(DatabaseAccountId),
    SqlDatabase(SqlDatabaseId),
    SqlContainer(SqlContainerId),
    SqlStoredProcedure(SqlStoredProcedureId),
    SqlTrigger(SqlTriggerId),
    SqlFunction(SqlFunctionId),
    MongoDbDatabase(MongoDbDatabaseId),
    MongoDbCollection(MongoDbCollectionId),
    CassandraKeyspace(CassandraKeyspaceId),
    CassandraTable(CassandraTableId),
    GremlinDatabase(GremlinDatabaseId),
    GremlinGraph(GremlinGraphId),
    Table(TableId),
    NotebookWorkspace(NotebookWorkspaceId),
);

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    const SUB: &str = "12345678-1234-9876-4563-123456789012";

    fn sample(kind: ResourceKind) -> ResourceId {
        match kind {
            ResourceKind::DatabaseAccount => DatabaseAccountId::new(SUB, "rg1", "acc1").into(),
            ResourceKind::SqlDatabase => SqlDatabaseId::new(SUB, "rg1", "acc1", "db1").into(),
            ResourceKind::SqlContainer => SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1").into(),
            ResourceKind::SqlStoredProcedure => {
                SqlStoredProcedureId::new(SUB, "rg1", "acc1", "db1", "c1", "sp1").into()
            }
            ResourceKind::SqlTrigger => SqlTriggerId::new(SUB, "rg1", "acc1", "db1", "c1", "t1").into(),
            ResourceKind::SqlFunction => SqlFunctionId::new(SUB, "rg1", "acc1", "db1", "c1", "f1").into(),
            ResourceKind::MongoDbDatabase => MongoDbDatabaseId::new(SUB, "rg1", "acc1", "mdb").into(),
            ResourceKind::MongoDbCollection => {
                MongoDbCollectionId::new(SUB, "rg1", "acc1", "mdb", "coll").into()
            }
            ResourceKind::CassandraKeyspace => CassandraKeyspaceId::new(SUB, "rg1", "acc1", "ks1").into(),
            ResourceKind::CassandraTable => CassandraTableId::new(SUB, "rg1", "acc1", "ks1", "tbl").into(),
            ResourceKind::GremlinDatabase => GremlinDatabaseId::new(SUB, "rg1", "acc1", "gdb").into(),
            ResourceKind::GremlinGraph => GremlinGraphId::new(SUB, "rg1", "acc1", "gdb", "g1").into(),
            ResourceKind::Table => TableId::new(SUB, "rg1", "acc1", "t1").into(),
            ResourceKind::NotebookWorkspace => {
                NotebookWorkspaceId::new(SUB, "rg1", "acc1", "default").into()
            }
        }
    }

    #[test]
    fn test_round_trip_for_every_kind() {
        for kind in ResourceKind::iter() {
            let id = sample(kind);
            assert_eq!(id.kind(), kind);
            let parsed = ResourceId::parse(&id.id(), kind).unwrap();
            assert_eq!(parsed, id, "{kind}");
            assert_eq!(parsed.id(), id.id());
        }
    }

    #[test]
    fn test_parse_cassandra_table_example() {
        let id = CassandraTableId::parse(
            "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.DocumentDB/databaseAccounts/acc1/cassandraKeyspaces/keyspace1/tables/table1",
        )
        .unwrap();
        assert_eq!(
            id,
            CassandraTableId {
                subscription_id: SUB.to_string(),
                resource_group: "resGroup1".to_string(),
                database_account_name: "acc1".to_string(),
                cassandra_keyspace_name: "keyspace1".to_string(),
                table_name: "table1".to_string(),
            }
        );
        assert_eq!(id.keyspace_id().name(), "keyspace1");
    }

    #[test]
    fn test_sql_container_id_display() {
        let id = SqlContainerId::new(SUB, "rg1", "acc1", "db1", "c1");
        insta::assert_snapshot!(id, @"/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acc1/sqlDatabases/db1/containers/c1");
        assert_eq!(id.database_id().name(), "db1");
    }

    #[parameterized(
        account = { ResourceKind::DatabaseAccount, "acc1" },
        trigger = { ResourceKind::SqlTrigger, "t1" },
        table = { ResourceKind::Table, "t1" },
        graph = { ResourceKind::GremlinGraph, "g1" },
    )]
    fn test_name_is_last_segment(kind: ResourceKind, expected: &str) {
        let id = sample(kind);
        assert_eq!(id.name(), expected);
        assert_eq!(id.resource_group(), "rg1");
        assert_eq!(id.account_id().database_account_name, "acc1");
    }

    #[test]
    fn test_from_str_rejects_wrong_kind() {
        let container = sample(ResourceKind::SqlContainer).id();
        assert!(SqlContainerId::from_str(&container).is_ok());
        assert_eq!(
            SqlDatabaseId::from_str(&container),
            Err(ParseError::UnexpectedTrailingSegments("containers/c1".to_string()))
        );
    }

    #[test]
    fn test_serialization() {
        let id = GremlinGraphId::new(SUB, "rg1", "acc1", "gdb", "g1");
        let serialized = serde_json::to_value(&id).unwrap();
        let deserialized: GremlinGraphId = serde_json::from_value(serialized.clone()).unwrap();
        assert_eq!(id, deserialized);
        insta::assert_json_snapshot!(serialized, @r#"
        {
          "database_account_name": "acc1",
          "graph_name": "g1",
          "gremlin_database_name": "gdb",
          "resource_group": "rg1",
          "subscription_id": "12345678-1234-9876-4563-123456789012"
        }
        "#);
    }
}
