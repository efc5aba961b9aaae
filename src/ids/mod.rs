//! Cosmos DB resource identifiers.
//!
//! Canonical string form:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DocumentDB/databaseAccounts/{account}[/{key}/{name}]...`
//!
//! Each [`ResourceKind`] has a fixed, ordered list of segment keys. Parsing is
//! strict about key casing; a few kinds also accept the `apis/...` spellings
//! written by older schema versions.

pub mod codec;
mod kind;
mod resource_id;

pub use codec::{PROVIDER_NAMESPACE, ResourcePath};
pub use kind::{ResourceKind, Segment, Timeouts};
pub use resource_id::{
    CassandraKeyspaceId, CassandraTableId, DatabaseAccountId, GremlinDatabaseId, GremlinGraphId,
    MongoDbCollectionId, MongoDbDatabaseId, NotebookWorkspaceId, ResourceId, SqlContainerId,
    SqlDatabaseId, SqlFunctionId, SqlStoredProcedureId, SqlTriggerId, TableId,
};
