//! Rebalance target rotation
//!
//! An explicit table mapping each pool to the next one in a closed
//! cycle; corrective liquidity always moves one hop forward.

use std::collections::HashMap;

use crate::shared::types::PoolKey;

#[derive(Debug, Clone, Default)]
pub struct PoolRotation {
    next: HashMap<PoolKey, PoolKey>,
}

impl PoolRotation {
    /// Build from an ordered cycle; the last pool wraps back to the first
    pub fn from_cycle(cycle: &[PoolKey]) -> Self {
        let mut next = HashMap::with_capacity(cycle.len());
        for (i, pool) in cycle.iter().enumerate() {
            next.insert(pool.clone(), cycle[(i + 1) % cycle.len()].clone());
        }
        Self { next }
    }

    /// Rebalance target for `pool`; pools outside the rotation have none
    pub fn target_for(&self, pool: &PoolKey) -> Option<&PoolKey> {
        self.next.get(pool)
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}
