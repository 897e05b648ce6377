//! Trader domain - per-address trade history

mod store;

pub use store::{TraderRecord, TraderStore};
