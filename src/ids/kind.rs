//! Resource kinds and the segment layout of their ids.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// One `{key}/{value}` pair in a resource id, below the provider namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// The canonical key, always used when formatting.
    pub key: &'static str,
    /// Historical spellings of the key accepted when parsing. Each alias is a
    /// run of path components that stands in for `key`, e.g. `apis/sql/databases`.
    pub legacy: &'static [&'static [&'static str]],
}

impl Segment {
    const fn new(key: &'static str) -> Self {
        Segment { key, legacy: &[] }
    }

    const fn with_legacy(key: &'static str, legacy: &'static [&'static [&'static str]]) -> Self {
        Segment { key, legacy }
    }
}

const ACCOUNT: Segment = Segment::new("databaseAccounts");
const SQL_DATABASE: Segment = Segment::with_legacy("sqlDatabases", &[&["apis", "sql", "databases"]]);
/// The SQL database key without aliases, for kinds that never had a legacy id.
const SQL_DATABASE_CURRENT: Segment = Segment::new("sqlDatabases");
const CONTAINER: Segment = Segment::new("containers");
const STORED_PROCEDURE: Segment = Segment::new("storedProcedures");
const TRIGGER: Segment = Segment::new("triggers");
const FUNCTION: Segment = Segment::new("userDefinedFunctions");
const MONGODB_DATABASE: Segment =
    Segment::with_legacy("mongodbDatabases", &[&["apis", "mongodb", "databases"]]);
const COLLECTION: Segment = Segment::new("collections");
const CASSANDRA_KEYSPACE: Segment =
    Segment::with_legacy("cassandraKeyspaces", &[&["apis", "cassandra", "keyspaces"]]);
const CASSANDRA_TABLE: Segment = Segment::new("tables");
const GREMLIN_DATABASE: Segment =
    Segment::with_legacy("gremlinDatabases", &[&["apis", "gremlin", "databases"]]);
const GRAPH: Segment = Segment::new("graphs");
const TABLE: Segment = Segment::with_legacy("tables", &[&["apis", "table", "tables"]]);
const NOTEBOOK_WORKSPACE: Segment = Segment::new("notebookWorkspaces");

const ACCOUNT_SEGMENTS: &[Segment] = &[ACCOUNT];
const SQL_DATABASE_SEGMENTS: &[Segment] = &[ACCOUNT, SQL_DATABASE];
const SQL_CONTAINER_SEGMENTS: &[Segment] = &[ACCOUNT, SQL_DATABASE, CONTAINER];
const SQL_STORED_PROCEDURE_SEGMENTS: &[Segment] =
    &[ACCOUNT, SQL_DATABASE_CURRENT, CONTAINER, STORED_PROCEDURE];
const SQL_TRIGGER_SEGMENTS: &[Segment] = &[ACCOUNT, SQL_DATABASE_CURRENT, CONTAINER, TRIGGER];
const SQL_FUNCTION_SEGMENTS: &[Segment] = &[ACCOUNT, SQL_DATABASE_CURRENT, CONTAINER, FUNCTION];
const MONGODB_DATABASE_SEGMENTS: &[Segment] = &[ACCOUNT, MONGODB_DATABASE];
const MONGODB_COLLECTION_SEGMENTS: &[Segment] = &[ACCOUNT, MONGODB_DATABASE, COLLECTION];
const CASSANDRA_KEYSPACE_SEGMENTS: &[Segment] = &[ACCOUNT, CASSANDRA_KEYSPACE];
const CASSANDRA_TABLE_SEGMENTS: &[Segment] = &[ACCOUNT, CASSANDRA_KEYSPACE, CASSANDRA_TABLE];
const GREMLIN_DATABASE_SEGMENTS: &[Segment] = &[ACCOUNT, GREMLIN_DATABASE];
const GREMLIN_GRAPH_SEGMENTS: &[Segment] = &[ACCOUNT, GREMLIN_DATABASE, GRAPH];
const TABLE_SEGMENTS: &[Segment] = &[ACCOUNT, TABLE];
const NOTEBOOK_WORKSPACE_SEGMENTS: &[Segment] = &[ACCOUNT, NOTEBOOK_WORKSPACE];

/// Every Cosmos DB resource this crate can address.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum ResourceKind {
    DatabaseAccount,
    SqlDatabase,
    SqlContainer,
    SqlStoredProcedure,
    SqlTrigger,
    SqlFunction,
    MongoDbDatabase,
    MongoDbCollection,
    CassandraKeyspace,
    CassandraTable,
    GremlinDatabase,
    GremlinGraph,
    Table,
    NotebookWorkspace,
}

/// Per-operation deadlines handed to the client's long-running-operation poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl ResourceKind {
    /// The ordered segments below `providers/Microsoft.DocumentDB`, account first.
    pub fn segments(self) -> &'static [Segment] {
        match self {
            Self::DatabaseAccount => ACCOUNT_SEGMENTS,
            Self::SqlDatabase => SQL_DATABASE_SEGMENTS,
            Self::SqlContainer => SQL_CONTAINER_SEGMENTS,
            Self::SqlStoredProcedure => SQL_STORED_PROCEDURE_SEGMENTS,
            Self::SqlTrigger => SQL_TRIGGER_SEGMENTS,
            Self::SqlFunction => SQL_FUNCTION_SEGMENTS,
            Self::MongoDbDatabase => MONGODB_DATABASE_SEGMENTS,
            Self::MongoDbCollection => MONGODB_COLLECTION_SEGMENTS,
            Self::CassandraKeyspace => CASSANDRA_KEYSPACE_SEGMENTS,
            Self::CassandraTable => CASSANDRA_TABLE_SEGMENTS,
            Self::GremlinDatabase => GREMLIN_DATABASE_SEGMENTS,
            Self::GremlinGraph => GREMLIN_GRAPH_SEGMENTS,
            Self::Table => TABLE_SEGMENTS,
            Self::NotebookWorkspace => NOTEBOOK_WORKSPACE_SEGMENTS,
        }
    }

    /// The Terraform resource type name, e.g. `azurerm_cosmosdb_sql_container`.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::DatabaseAccount => "azurerm_cosmosdb_account",
            Self::SqlDatabase => "azurerm_cosmosdb_sql_database",
            Self::SqlContainer => "azurerm_cosmosdb_sql_container",
            Self::SqlStoredProcedure => "azurerm_cosmosdb_sql_stored_procedure",
            Self::SqlTrigger => "azurerm_cosmosdb_sql_trigger",
            Self::SqlFunction => "azurerm_cosmosdb_sql_function",
            Self::MongoDbDatabase => "azurerm_cosmosdb_mongo_database",
            Self::MongoDbCollection => "azurerm_cosmosdb_mongo_collection",
            Self::CassandraKeyspace => "azurerm_cosmosdb_cassandra_keyspace",
            Self::CassandraTable => "azurerm_cosmosdb_cassandra_table",
            Self::GremlinDatabase => "azurerm_cosmosdb_gremlin_database",
            Self::GremlinGraph => "azurerm_cosmosdb_gremlin_graph",
            Self::Table => "azurerm_cosmosdb_table",
            Self::NotebookWorkspace => "azurerm_cosmosdb_notebook_workspace",
        }
    }

    /// Kinds whose ids once used a legacy spelling are on schema version 1.
    pub fn schema_version(self) -> u32 {
        if self.segments().iter().any(|s| !s.legacy.is_empty()) {
            1
        } else {
            0
        }
    }

    pub fn default_timeouts(self) -> Timeouts {
        let minutes = |m: u64| Duration::from_secs(m * 60);
        match self {
            Self::DatabaseAccount => Timeouts {
                create: minutes(180),
                read: minutes(5),
                update: minutes(180),
                delete: minutes(180),
            },
            _ => Timeouts {
                create: minutes(30),
                read: minutes(5),
                update: minutes(30),
                delete: minutes(30),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    #[test]
    fn test_every_kind_starts_with_the_account() {
        for kind in ResourceKind::iter() {
            assert_eq!(kind.segments()[0].key, "databaseAccounts", "{kind}");
        }
    }

    #[parameterized(
        account = { ResourceKind::DatabaseAccount, 0 },
        sql_database = { ResourceKind::SqlDatabase, 1 },
        sql_container = { ResourceKind::SqlContainer, 1 },
        sql_stored_procedure = { ResourceKind::SqlStoredProcedure, 0 },
        sql_trigger = { ResourceKind::SqlTrigger, 0 },
        sql_function = { ResourceKind::SqlFunction, 0 },
        table = { ResourceKind::Table, 1 },
        notebook = { ResourceKind::NotebookWorkspace, 0 },
    )]
    fn test_schema_version(kind: ResourceKind, expected: u32) {
        assert_eq!(kind.schema_version(), expected);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            ResourceKind::from_str("GremlinGraph").unwrap(),
            ResourceKind::GremlinGraph
        );
        assert!(ResourceKind::from_str("gremlin_graph").is_err());
    }

    #[test]
    fn test_account_timeouts_are_longer() {
        let account = ResourceKind::DatabaseAccount.default_timeouts();
        let table = ResourceKind::Table.default_timeouts();
        assert_eq!(account.create, Duration::from_secs(180 * 60));
        assert_eq!(table.create, Duration::from_secs(30 * 60));
        assert_eq!(account.read, table.read);
    }
}
