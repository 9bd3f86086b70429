//! Unlock ledger document.
//!
//! The on-disk layout keeps the field names of the game's existing
//! `fruit_save.json` so saves written by earlier builds still load:
//!
//! ```json
//! {
//!   "fruits": [
//!     {
//!       "fruitCode": "akebia",
//!       "perfectVersionUnlocked": false,
//!       "unlockedMutations": [25, 50]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::scoring::is_valid_tier;

/// Unlock state for a single plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    /// Plant identifier.
    #[serde(rename = "fruitCode")]
    pub plant_id: String,
    /// Whether the perfect variant has ever been grown.
    #[serde(rename = "perfectVersionUnlocked", default)]
    pub perfect_unlocked: bool,
    /// Quality tiers reached so far, drawn from 0/25/50/75/100.
    #[serde(rename = "unlockedMutations", default)]
    pub unlocked_tiers: BTreeSet<u8>,
}

impl UnlockRecord {
    pub fn new(plant_id: impl Into<String>) -> Self {
        Self {
            plant_id: plant_id.into(),
            perfect_unlocked: false,
            unlocked_tiers: BTreeSet::new(),
        }
    }
}

/// The persisted collection of per-plant unlock records.
///
/// Records keep first-reference order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(rename = "fruits", default)]
    pub records: Vec<UnlockRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, plant_id: &str) -> Option<&UnlockRecord> {
        self.records.iter().find(|r| r.plant_id == plant_id)
    }

    /// Fetch the record for `plant_id`, appending a blank one if absent.
    pub fn get_or_create(&mut self, plant_id: &str) -> &mut UnlockRecord {
        let index = match self.records.iter().position(|r| r.plant_id == plant_id) {
            Some(index) => index,
            None => {
                self.records.push(UnlockRecord::new(plant_id));
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of plants whose perfect variant is unlocked.
    pub fn perfect_count(&self) -> usize {
        self.records.iter().filter(|r| r.perfect_unlocked).count()
    }

    /// Drop tier values outside 0/25/50/75/100 and merge duplicate plant ids.
    ///
    /// Returns the number of entries that were discarded or merged.
    pub fn sanitize(&mut self) -> usize {
        let mut dropped = 0;
        let mut merged: Vec<UnlockRecord> = Vec::with_capacity(self.records.len());

        for mut record in self.records.drain(..) {
            let before = record.unlocked_tiers.len();
            record.unlocked_tiers.retain(|tier| is_valid_tier(*tier));
            dropped += before - record.unlocked_tiers.len();

            match merged.iter_mut().find(|r| r.plant_id == record.plant_id) {
                Some(existing) => {
                    existing.perfect_unlocked |= record.perfect_unlocked;
                    existing.unlocked_tiers.extend(record.unlocked_tiers);
                    dropped += 1;
                }
                None => merged.push(record),
            }
        }

        self.records = merged;
        dropped
    }
}
