//! Application layer - use cases wiring the domain together

mod services;

pub use services::{SwapIntent, SwapOutcome, SwapPipeline};
