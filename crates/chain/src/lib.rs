//! Block builder, chain manager, and the chain repository abstraction.

mod builder;
mod canonical;
mod chain;
mod config;
mod error;
mod repository;

pub use builder::BlockBuilder;
pub use canonical::{canonical_hash, full_bytes, signing_bytes};
pub use chain::ChainManager;
pub use config::{BlockBuilderConfig, ChainConfig};
pub use error::{BuilderError, ChainError};
pub use repository::{ChainRepository, InMemoryChainRepository};
