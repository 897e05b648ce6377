//! Per-address trade history store

use std::collections::HashMap;
use std::sync::Mutex;

use ethers_core::types::U256;

use crate::shared::types::Address;

/// An address's most recent accepted trade.
///
/// All three fields are written together on acceptance and nowhere else;
/// the zero record means the address has never traded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraderRecord {
    /// Execution-ordering position of the last accepted trade (0 = never)
    pub last_trade_sequence: u64,
    /// Pool price observed at that trade (0 = unset)
    pub last_trade_price: U256,
    /// Ledger timestamp of that trade in seconds (0 = never)
    pub last_trade_time: u64,
}

impl TraderRecord {
    pub fn new(last_trade_sequence: u64, last_trade_price: U256, last_trade_time: u64) -> Self {
        Self {
            last_trade_sequence,
            last_trade_price,
            last_trade_time,
        }
    }
}

/// Keyed store of trader records. Pure state holder: absent addresses
/// read as the zero record, writes overwrite atomically, nothing is
/// ever evicted.
#[derive(Debug, Default)]
pub struct TraderStore {
    records: Mutex<HashMap<Address, TraderRecord>>,
}

impl TraderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `address`, or the zero record if it has never traded
    pub fn get(&self, address: &Address) -> TraderRecord {
        self.records
            .lock()
            .expect("trader store lock poisoned")
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the record for `address`
    pub fn set(&self, address: &Address, record: TraderRecord) {
        self.records
            .lock()
            .expect("trader store lock poisoned")
            .insert(address.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("trader store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
