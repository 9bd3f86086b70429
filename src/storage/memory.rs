//! In-memory ledger storage for testing.
//!
//! This module provides a thread-safe in-memory implementation of the
//! LedgerStore trait, primarily for use in unit tests. Writes can be made to
//! fail on demand to exercise the persistence-failure paths.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{OrchardError, Result};
use crate::storage::ledger::Ledger;
use crate::storage::LedgerStore;

/// In-memory ledger store for testing.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledger: RwLock<Option<Ledger>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryLedgerStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `ledger`.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(Some(ledger)),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The currently saved ledger, if any.
    pub fn saved(&self) -> Option<Ledger> {
        self.ledger.read().unwrap().clone()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Option<Ledger>> {
        Ok(self.ledger.read().unwrap().clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            let err = io::Error::other("simulated write failure");
            return Err(OrchardError::storage("memory", err));
        }

        *self.ledger.write().unwrap() = Some(ledger.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.ledger.write().unwrap() = None;
        Ok(())
    }
}
