//! Persistent unlock progress.
//!
//! `ProgressStore` owns the in-memory ledger and a durable backend. The
//! ledger is loaded lazily on first use, exactly once, and every mutation is
//! written through to the backend before the call returns.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::scoring::tier_for_quality;
use crate::error::{FailOpen, Result};
use crate::storage::ledger::Ledger;
use crate::storage::LedgerStore;

/// What a single `record_result` call newly unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnlockChange {
    /// The tier the recorded quality falls into.
    pub tier: u8,
    /// The tier was not unlocked before.
    pub new_tier: bool,
    /// The perfect variant was not unlocked before.
    pub new_perfect: bool,
}

impl UnlockChange {
    pub fn is_new(&self) -> bool {
        self.new_tier || self.new_perfect
    }
}

/// Unlock ledger with write-through persistence.
#[derive(Debug)]
pub struct ProgressStore<S: LedgerStore> {
    store: S,
    /// `None` until first use.
    ledger: Mutex<Option<Ledger>>,
}

impl<S: LedgerStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ledger: Mutex::new(None),
        }
    }

    /// The durable backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Record a finished growth session for `plant_id`.
    ///
    /// The perfect flag is only ever set, never cleared, and the quality tier
    /// is inserted with set semantics. The full ledger is then saved. When
    /// the save fails the error is returned, but the in-memory ledger keeps
    /// the unlock so the next successful save includes it.
    pub fn record_result(
        &self,
        plant_id: &str,
        quality: u8,
        is_perfect: bool,
    ) -> Result<UnlockChange> {
        let tier = tier_for_quality(quality);
        let mut guard = self.loaded();
        let ledger = guard.get_or_insert_with(Ledger::new);

        let record = ledger.get_or_create(plant_id);
        let new_perfect = is_perfect && !record.perfect_unlocked;
        record.perfect_unlocked |= is_perfect;
        let new_tier = record.unlocked_tiers.insert(tier);

        if new_perfect {
            info!(plant = plant_id, "perfect variant unlocked");
        }
        if new_tier {
            info!(plant = plant_id, tier, "quality tier unlocked");
        }

        self.store.save(ledger)?;
        debug!(plant = plant_id, quality, "ledger saved");

        Ok(UnlockChange {
            tier,
            new_tier,
            new_perfect,
        })
    }

    /// Whether the perfect variant of `plant_id` is unlocked.
    pub fn is_perfect_unlocked(&self, plant_id: &str) -> bool {
        self.with_record(plant_id, |ledger| {
            ledger.get_or_create(plant_id).perfect_unlocked
        })
    }

    /// A copy of the tiers unlocked for `plant_id`.
    pub fn unlocked_tiers(&self, plant_id: &str) -> BTreeSet<u8> {
        self.with_record(plant_id, |ledger| {
            ledger.get_or_create(plant_id).unlocked_tiers.clone()
        })
    }

    /// Whether a specific tier is unlocked for `plant_id`.
    pub fn is_tier_unlocked(&self, plant_id: &str, tier: u8) -> bool {
        self.with_record(plant_id, |ledger| {
            let record = ledger.get_or_create(plant_id);
            record.unlocked_tiers.contains(&tier)
        })
    }

    /// Number of plants with the perfect variant unlocked.
    pub fn perfect_count(&self) -> usize {
        self.loaded().as_ref().map_or(0, Ledger::perfect_count)
    }

    /// A copy of the whole ledger.
    pub fn snapshot(&self) -> Ledger {
        self.loaded().clone().unwrap_or_default()
    }

    /// Erase all progress, in memory and on disk. Irreversible.
    pub fn delete_all(&self) -> Result<()> {
        let mut guard = self.loaded();
        self.store.delete()?;
        *guard = Some(Ledger::new());
        info!("all progress deleted");
        Ok(())
    }

    fn with_record<R>(&self, plant_id: &str, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let mut guard = self.loaded();
        let ledger = guard.get_or_insert_with(Ledger::new);
        if ledger.get(plant_id).is_none() {
            debug!(plant = plant_id, "creating unlock record");
        }
        f(ledger)
    }

    /// Lock the ledger, loading it from the backend on first access.
    ///
    /// Unreadable or corrupt storage degrades to an empty ledger.
    fn loaded(&self) -> MutexGuard<'_, Option<Ledger>> {
        let mut guard = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            let mut ledger = self
                .store
                .load()
                .fail_open_default("loading ledger")
                .unwrap_or_default();
            let dropped = ledger.sanitize();
            if dropped > 0 {
                warn!(dropped, "discarded invalid ledger entries");
            }
            debug!(plants = ledger.len(), "ledger loaded");
            *guard = Some(ledger);
        }
        guard
    }
}
