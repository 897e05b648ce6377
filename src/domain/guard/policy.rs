//! Administrative guard policy: trade cooldown and the denylist
//!
//! Explicitly owned and injected into the guard; the administrative
//! surface mutates this object, nothing else does.

use std::collections::HashSet;

use crate::shared::errors::PolicyError;
use crate::shared::types::Address;

/// Cooldown applied when none is configured
pub const DEFAULT_COOLDOWN_SECS: u64 = 15;

/// Ceiling the administrative surface enforces on the cooldown
pub const MAX_COOLDOWN_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GuardPolicy {
    cooldown_seconds: u64,
    denylist: HashSet<Address>,
}

impl GuardPolicy {
    /// Policy with the given cooldown; rejects values above the ceiling
    pub fn new(cooldown_seconds: u64) -> Result<Self, PolicyError> {
        if cooldown_seconds > MAX_COOLDOWN_SECS {
            return Err(PolicyError::CooldownTooLong(cooldown_seconds));
        }
        Ok(Self {
            cooldown_seconds,
            denylist: HashSet::new(),
        })
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }

    /// Administrative setter, bounded at the same ceiling as `new`
    pub fn set_cooldown(&mut self, seconds: u64) -> Result<(), PolicyError> {
        if seconds > MAX_COOLDOWN_SECS {
            return Err(PolicyError::CooldownTooLong(seconds));
        }
        self.cooldown_seconds = seconds;
        Ok(())
    }

    /// Flag or unflag an address as a blocked bot
    pub fn set_blocked(&mut self, address: Address, blocked: bool) {
        if blocked {
            self.denylist.insert(address);
        } else {
            self.denylist.remove(&address);
        }
    }

    pub fn is_blocked(&self, address: &Address) -> bool {
        self.denylist.contains(address)
    }
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            cooldown_seconds: DEFAULT_COOLDOWN_SECS,
            denylist: HashSet::new(),
        }
    }
}
