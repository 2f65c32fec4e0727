//! Undo log for the operation holding the pool lock.
//!
//! [`Pool::locked`] opens a [`Journal`] before running an operation. The
//! scalar state is saved up front; map entries, bitmap words and oracle
//! slots are saved the first time the operation writes them. Reverting
//! puts back exactly those entries, so the cost of a rollback follows
//! what the operation touched and not the size of the pool.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use super::Pool;
use crate::domain::PositionKey;
use crate::state::{Observation, Oracle, PositionInfo, ProtocolFees, Slot, TickBitmap, TickInfo};

/// State replaced by the running operation, as it was before the first
/// write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Journal {
    active: bool,
    slot: Slot,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
    protocol_fees: ProtocolFees,
    liquidity: u128,
    ticks: BTreeMap<i32, Option<TickInfo>>,
    words: BTreeMap<i16, U256>,
    positions: BTreeMap<PositionKey, Option<PositionInfo>>,
    observations: BTreeMap<u16, Observation>,
    observations_len: usize,
}

impl Pool {
    pub(super) fn begin_journal(&mut self) {
        self.journal = Journal {
            active: true,
            slot: self.slot,
            fee_growth_global_0_x128: self.fee_growth_global_0_x128,
            fee_growth_global_1_x128: self.fee_growth_global_1_x128,
            protocol_fees: self.protocol_fees,
            liquidity: self.liquidity,
            observations_len: self.oracle.len(),
            ..Journal::default()
        };
    }

    pub(super) fn commit_journal(&mut self) {
        self.journal = Journal::default();
    }

    pub(super) fn revert_journal(&mut self) {
        let journal = std::mem::take(&mut self.journal);
        if !journal.active {
            return;
        }
        self.slot = journal.slot;
        self.fee_growth_global_0_x128 = journal.fee_growth_global_0_x128;
        self.fee_growth_global_1_x128 = journal.fee_growth_global_1_x128;
        self.protocol_fees = journal.protocol_fees;
        self.liquidity = journal.liquidity;
        for (tick, info) in journal.ticks {
            self.ticks.restore(tick, info);
        }
        for (word_pos, word) in journal.words {
            self.tick_bitmap.restore_word(word_pos, word);
        }
        for (key, info) in journal.positions {
            self.positions.restore(key, info);
        }
        for (index, observation) in journal.observations {
            self.oracle.restore(index, observation);
        }
        self.oracle.truncate(journal.observations_len);
    }

    /// Saves the record of `tick` before it is changed.
    pub(super) fn journal_tick(&mut self, tick: i32) {
        if self.journal.active {
            let ticks = &self.ticks;
            self.journal
                .ticks
                .entry(tick)
                .or_insert_with(|| ticks.get(tick).cloned());
        }
    }

    /// Saves the bitmap word holding `tick` before it is flipped.
    pub(super) fn journal_tick_word(&mut self, tick: i32) {
        if self.journal.active {
            let word_pos = TickBitmap::word_position(tick, self.immutables.tick_spacing);
            let word = self.tick_bitmap.word(word_pos);
            self.journal.words.entry(word_pos).or_insert(word);
        }
    }

    /// Saves the position under `key` before it is changed.
    pub(super) fn journal_position(&mut self, key: PositionKey) {
        if self.journal.active {
            let positions = &self.positions;
            self.journal
                .positions
                .entry(key)
                .or_insert_with(|| positions.get(&key).cloned());
        }
    }

    /// Saves the oracle slot the next write from `slot` lands in.
    pub(super) fn journal_oracle_write(&mut self, slot: &Slot) {
        if !self.journal.active {
            return;
        }
        let Some((index, _)) = Oracle::write_target(
            slot.observation_index,
            slot.observation_cardinality,
            slot.observation_cardinality_next,
        ) else {
            return;
        };
        if let Some(observation) = self.oracle.get(index) {
            self.journal.observations.entry(index).or_insert(*observation);
        }
    }
}
