//! In-memory token ledger
//!
//! One `DashMap` entry per user holds that user's transaction sequence.
//! `update_ledger` runs its closure while the entry is exclusively held, so
//! a balance computed inside the closure cannot be invalidated by a
//! concurrent append before the closure's own append commits - this is what
//! rules out overdraft races between debits and recharges on the same user.
//! Ledgers of different users share nothing and never block each other.

use crate::core::traits::TokenRepository;
use crate::types::{CanteenError, TokenTransaction, UserId};
use dashmap::DashMap;

/// Thread-safe in-memory token ledger
#[derive(Debug, Default)]
pub struct MemoryTokenRepository {
    /// Transactions per user, in append order
    ledgers: DashMap<UserId, Vec<TokenTransaction>>,
}

impl MemoryTokenRepository {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRepository for MemoryTokenRepository {
    fn update_ledger<F, T>(&self, user_id: &str, f: F) -> Result<T, CanteenError>
    where
        F: FnOnce(&mut Vec<TokenTransaction>) -> Result<T, CanteenError>,
    {
        let mut entry = self.ledgers.entry(user_id.to_string()).or_default();

        // Run the closure on a copy and commit only on success, so a failed
        // balance check leaves the ledger untouched.
        let mut entries = entry.clone();
        let out = f(&mut entries)?;
        *entry = entries;

        Ok(out)
    }

    fn list_by_user(&self, user_id: &str) -> Vec<TokenTransaction> {
        let mut entries = self
            .ledgers
            .get(user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();

        // Append order already is chronological; the stable sort keeps it
        // for entries created within the same timestamp tick.
        entries.sort_by_key(|tx| tx.created_at);
        entries
    }
}
