//! Typed configuration models, one per resource kind, and the
//! [`CosmosResource`](crate::traits::CosmosResource) marker types that map
//! them to and from the ARM wire shapes in [`crate::sdk`].

pub mod account;
mod cassandra;
mod common;
mod gremlin;
mod mongo;
mod notebook;
mod sql;
mod table;

pub use account::{AccountKeys, DatabaseAccount, DatabaseAccountModel};
pub use cassandra::*;
pub use common::*;
pub use gremlin::*;
pub use mongo::*;
pub use notebook::*;
pub use sql::*;
pub use table::*;
