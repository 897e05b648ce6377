//! In-memory collaborators for simulations and tests

mod oracle;
mod pools;

pub use oracle::{FailingPriceOracle, StaticPriceOracle};
pub use pools::{InMemoryPools, PoolState};
