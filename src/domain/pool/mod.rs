//! Pool domain - collaborator interfaces to the host's pool machinery

mod pool_interface;

pub use pool_interface::{
    LiquidityDirection, LiquidityMover, PoolReserveReader, PriceOracle, SwapExecutor,
};
