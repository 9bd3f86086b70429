//! Ledger storage traits for Orchard.
//!
//! This module defines the `LedgerStore` trait for durable ledger persistence.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::ledger::Ledger;

/// Trait for ledger storage backends.
///
/// The whole ledger is read and written as one document. `save` must be
/// all-or-nothing: a failed save leaves the previously saved ledger intact.
pub trait LedgerStore: Send + Sync {
    /// Read the saved ledger.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Ledger>>;

    /// Replace the saved ledger.
    fn save(&self, ledger: &Ledger) -> Result<()>;

    /// Remove the saved ledger.
    ///
    /// Returns `Ok(())` even if nothing was saved.
    fn delete(&self) -> Result<()>;

    /// Check if a ledger has been saved.
    fn exists(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }
}

/// Blanket implementation of LedgerStore for Arc-wrapped stores.
///
/// Lets tests keep a handle on the backend while a `ProgressStore` owns it.
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn load(&self) -> Result<Option<Ledger>> {
        (**self).load()
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        (**self).save(ledger)
    }

    fn delete(&self) -> Result<()> {
        (**self).delete()
    }
}
