// src/lib.rs
pub use client::{ArmClient, InMemoryArmClient};
pub use config::ProviderConfig;
pub use error::{ClientError, CosmosError, ParseError, ValidationError};
pub use ids::{ResourceId, ResourceKind};
pub use provider::CosmosProvider;
pub use traits::{CosmosResource, CosmosResourceId};

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod indexing;
pub mod migration;
pub mod models;
pub mod provider;
pub mod sdk;
pub mod traits;
