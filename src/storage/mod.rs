//! Unlock ledger storage for Orchard.
//!
//! This module provides the persisted ledger document, durable backends
//! (file-based and in-memory) and the `ProgressStore` that sits on top.

pub mod file;
pub mod ledger;
pub mod memory;
pub mod progress;
pub mod traits;

pub use file::FileLedgerStore;
pub use ledger::{Ledger, UnlockRecord};
pub use memory::MemoryLedgerStore;
pub use progress::{ProgressStore, UnlockChange};
pub use traits::LedgerStore;
