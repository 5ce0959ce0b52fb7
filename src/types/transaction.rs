//! Ledger transaction types
//!
//! The wallet of every student is backed by an append-only sequence of
//! signed transactions. Balance is always derived by summing a user's
//! transactions; it is never stored, which keeps it reconstructible and
//! auditable from the ledger alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger transaction identifier
pub type TransactionId = String;

/// Monetary amount
pub type Amount = Decimal;

/// Kind of ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Top-up of a student wallet; positive amount
    ///
    /// Initiated by the student's parent (or the student), and also appended
    /// as the compensating entry when a debited order is cancelled.
    Recharge,

    /// Spend against an order; negative amount
    ///
    /// Appended exactly once per paid order, by the lifecycle service's
    /// payment transition.
    Purchase,
}

/// A single immutable ledger entry
///
/// The sign of `amount` is fixed by `kind`: recharges are positive,
/// purchases negative. Construct through [`TokenTransaction::recharge`] and
/// [`TokenTransaction::purchase`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransaction {
    /// Unique transaction id
    pub id: TransactionId,

    /// Ledger owner - always the student whose wallet is affected
    pub user_id: String,

    /// Kind of transaction
    pub kind: TransactionKind,

    /// Signed amount: positive for recharges, negative for purchases
    pub amount: Amount,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TokenTransaction {
    /// Create a recharge entry of `+amount` for the given user
    ///
    /// `amount` is the magnitude and must be positive; callers validate
    /// before constructing.
    pub fn recharge(user_id: &str, amount: Amount, now: DateTime<Utc>) -> Self {
        TokenTransaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: TransactionKind::Recharge,
            amount,
            created_at: now,
        }
    }

    /// Create a purchase entry of `-amount` for the given user
    ///
    /// `amount` is the magnitude and must be positive; callers validate
    /// before constructing.
    pub fn purchase(user_id: &str, amount: Amount, now: DateTime<Utc>) -> Self {
        TokenTransaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: TransactionKind::Purchase,
            amount: -amount,
            created_at: now,
        }
    }
}
