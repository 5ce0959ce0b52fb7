//! Wallet service
//!
//! Orchestrates recharges (parent → child ledger) and purchase debits
//! (triggered by the order lifecycle), and exposes balance queries. The
//! service holds no state of its own: balance is always derived from the
//! ledger behind [`TokenRepository`].

use crate::core::traits::{TokenRepository, UserRepository};
use crate::types::{Amount, CanteenError, Role, TokenTransaction};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Wallet orchestration over the token ledger
///
/// Cheap to clone; clones share the underlying repositories.
pub struct WalletService<T, U> {
    tokens: Arc<T>,
    users: Arc<U>,
}

impl<T, U> Clone for WalletService<T, U> {
    fn clone(&self) -> Self {
        WalletService {
            tokens: Arc::clone(&self.tokens),
            users: Arc::clone(&self.users),
        }
    }
}

impl<T, U> WalletService<T, U>
where
    T: TokenRepository,
    U: UserRepository,
{
    /// Create a wallet service over the given repositories
    pub fn new(tokens: Arc<T>, users: Arc<U>) -> Self {
        WalletService { tokens, users }
    }

    /// Current balance of the given user's wallet
    ///
    /// Derived by summing the user's ledger; nothing is cached between
    /// calls.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn balance(&self, user_id: &str) -> Result<Amount, CanteenError> {
        self.users.get(user_id)?;
        Ok(self.tokens.balance(user_id))
    }

    /// Transaction history of the given user, oldest first
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn transactions(&self, user_id: &str) -> Result<Vec<TokenTransaction>, CanteenError> {
        self.users.get(user_id)?;
        Ok(self.tokens.list_by_user(user_id))
    }

    /// Top up a student wallet
    ///
    /// # Errors
    ///
    /// - `Validation` if `amount` is not positive, or the wallet owner is
    ///   not a student
    /// - `NotFound` if the wallet owner or the initiator does not exist
    /// - `Unauthorized` if the initiator is neither the wallet owner nor
    ///   the owner's linked parent
    pub fn recharge(
        &self,
        user_id: &str,
        amount: Amount,
        initiated_by: &str,
    ) -> Result<TokenTransaction, CanteenError> {
        if amount <= Decimal::ZERO {
            return Err(CanteenError::validation(format!(
                "recharge amount must be positive, got {}",
                amount
            )));
        }

        let owner = self.users.get(user_id)?;
        if owner.role != Role::Student {
            return Err(CanteenError::validation(format!(
                "wallets belong to students; user '{}' has role {}",
                user_id, owner.role
            )));
        }

        let initiator = self.users.get(initiated_by)?;
        if initiator.id != owner.id && !initiator.is_parent_of(&owner.id) {
            return Err(CanteenError::unauthorized(
                initiated_by,
                &format!("recharge the wallet of user '{}'", user_id),
            ));
        }

        let now = Utc::now();
        self.tokens.update_ledger(user_id, |entries| {
            let tx = TokenTransaction::recharge(user_id, amount, now);
            entries.push(tx.clone());
            Ok(tx)
        })
    }

    /// Debit a wallet for an order payment
    ///
    /// Crate-internal: only the order lifecycle service may spend from a
    /// wallet. The balance read and the append run inside the same ledger
    /// lock, so concurrent debits and recharges on the same user cannot
    /// produce an overdraft.
    ///
    /// # Errors
    ///
    /// - `Validation` if `amount` is not positive
    /// - `InsufficientFunds` if the balance does not cover `amount`;
    ///   nothing is appended
    pub(crate) fn debit(
        &self,
        user_id: &str,
        amount: Amount,
        reason: &str,
    ) -> Result<TokenTransaction, CanteenError> {
        if amount <= Decimal::ZERO {
            return Err(CanteenError::validation(format!(
                "debit amount must be positive, got {}",
                amount
            )));
        }

        let now = Utc::now();
        self.tokens.update_ledger(user_id, |entries| {
            let balance = entries
                .iter()
                .try_fold(Decimal::ZERO, |acc, tx| acc.checked_add(tx.amount))
                .ok_or_else(|| CanteenError::arithmetic_overflow("balance"))?;

            if balance < amount {
                return Err(CanteenError::insufficient_funds(user_id, balance, amount));
            }

            let tx = TokenTransaction::purchase(user_id, amount, now);
            entries.push(tx.clone());
            debug!(user = user_id, %amount, reason, "wallet debited");
            Ok(tx)
        })
    }

    /// Append a compensating recharge for a cancelled, already-debited order
    ///
    /// Crate-internal counterpart of [`debit`]: restores the debited amount
    /// so the post-cancel balance equals the pre-debit balance.
    ///
    /// [`debit`]: WalletService::debit
    pub(crate) fn refund(
        &self,
        user_id: &str,
        amount: Amount,
        reason: &str,
    ) -> Result<TokenTransaction, CanteenError> {
        if amount <= Decimal::ZERO {
            return Err(CanteenError::validation(format!(
                "refund amount must be positive, got {}",
                amount
            )));
        }

        let now = Utc::now();
        self.tokens.update_ledger(user_id, |entries| {
            let tx = TokenTransaction::recharge(user_id, amount, now);
            entries.push(tx.clone());
            debug!(user = user_id, %amount, reason, "wallet refunded");
            Ok(tx)
        })
    }
}
