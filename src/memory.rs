//! An in-memory [`Host`] for tests, simulations and the demo.
//!
//! [`MemoryHost`] keeps a balance table keyed by `(asset, account)` and a
//! settable clock. Transfers can be switched off to exercise the pool's
//! failure paths. While a checkpoint is open every balance write is logged
//! with the value it replaced, so a revert costs as much as the writes it
//! undoes.
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use hydra_clmm::domain::Address;
//! use hydra_clmm::memory::MemoryHost;
//! use hydra_clmm::traits::Host;
//!
//! let asset = Address::repeat_byte(1);
//! let alice = Address::repeat_byte(0xa1);
//! let bob = Address::repeat_byte(0xb0);
//!
//! let mut host = MemoryHost::new(1_000);
//! host.mint(asset, alice, U256::from(10u8));
//! assert_eq!(host.transfer(asset, alice, bob, U256::from(4u8)), Ok(true));
//! assert_eq!(host.balance_of(asset, bob), U256::from(4u8));
//! assert_eq!(host.transfer(asset, alice, bob, U256::from(7u8)), Ok(false));
//! ```

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::domain::Address;
use crate::error::AmmError;
use crate::traits::Host;

type BalanceKey = (Address, Address);

/// Balances and a clock held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryHost {
    balances: BTreeMap<BalanceKey, U256>,
    timestamp: u32,
    transfers_disabled: bool,
    /// Replaced balances, oldest first; empty when no checkpoint is open.
    journal: Vec<(BalanceKey, Option<U256>)>,
    open_checkpoints: usize,
}

impl MemoryHost {
    /// Creates an empty ledger at `timestamp`.
    #[must_use]
    pub fn new(timestamp: u32) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Sets the block time.
    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    /// Moves the clock forward, wrapping at `u32::MAX`.
    pub fn advance(&mut self, seconds: u32) {
        self.timestamp = self.timestamp.wrapping_add(seconds);
    }

    /// Credits `amount` of `asset` to `account` out of thin air.
    pub fn mint(&mut self, asset: Address, account: Address, amount: U256) {
        let balance = self.balance_of(asset, account).saturating_add(amount);
        self.set_balance((asset, account), balance);
    }

    /// Makes every subsequent transfer report failure (or succeed again).
    pub fn set_transfers_disabled(&mut self, disabled: bool) {
        self.transfers_disabled = disabled;
    }

    fn set_balance(&mut self, key: BalanceKey, balance: U256) {
        let replaced = self.balances.insert(key, balance);
        if self.open_checkpoints > 0 {
            self.journal.push((key, replaced));
        }
    }

    fn close_checkpoint(&mut self) {
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }
}

impl Host for MemoryHost {
    type Checkpoint = usize;

    fn block_timestamp(&self) -> u32 {
        self.timestamp
    }

    fn balance_of(&self, asset: Address, account: Address) -> U256 {
        self.balances
            .get(&(asset, account))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, AmmError> {
        if self.transfers_disabled {
            return Ok(false);
        }
        let from_balance = self.balance_of(asset, from);
        let Some(from_after) = from_balance.checked_sub(amount) else {
            return Ok(false);
        };
        let to_after = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(AmmError::Overflow("recipient balance overflow"))?;
        if from == to {
            return Ok(true);
        }
        self.set_balance((asset, from), from_after);
        self.set_balance((asset, to), to_after);
        Ok(true)
    }

    fn checkpoint(&mut self) -> usize {
        self.open_checkpoints += 1;
        self.journal.len()
    }

    fn commit(&mut self, _checkpoint: usize) {
        self.close_checkpoint();
    }

    fn revert(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some((key, replaced)) = self.journal.pop() else {
                break;
            };
            match replaced {
                Some(balance) => self.balances.insert(key, balance),
                None => self.balances.remove(&key),
            };
        }
        self.close_checkpoint();
    }
}
