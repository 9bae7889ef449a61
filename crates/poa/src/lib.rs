//! The Proof-of-Authority engine: mempool, production loop, round monitor,
//! transaction intake, and the policy for accepting externally-proposed
//! blocks.

mod config;
mod engine;
mod error;
mod mempool;

pub use config::PoaConfig;
pub use engine::{Engine, ProductionEvent};
pub use error::PoaError;
pub use mempool::Mempool;
