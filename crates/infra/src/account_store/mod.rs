//! Account store contract and implementations.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use giftflow_accounts::Account;
use giftflow_core::{AccountId, GiftId, Stars};

/// Account store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached; cycle-local, the next cycle retries.
    #[error("account store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt account record: {0}")]
    Corrupt(String),

    /// The operation violated a store-side rule (e.g. non-positive credit).
    #[error("operation rejected: {0}")]
    Rejected(String),

    /// The store reports a non-recoverable condition (e.g. closed pool).
    /// This is the only variant that stops the scheduler.
    #[error("account store fatal: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Fatal(_))
    }
}

/// Result of a conditional debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitApplication {
    /// Balance still covered the price at write time and was decremented.
    Applied { new_balance: Stars },
    /// The stored balance no longer covered the price (or the record is
    /// gone); nothing was written.
    NotCovered,
}

/// Conditional read/update operations over account records.
///
/// Mutating operations bump `last_activity`. `debit_if_covered` is the load-
/// bearing one: the decrement and the balance check happen as one atomic
/// operation, never as a read followed by a blind write.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_one(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// First-touch creation: insert the default record if none exists and
    /// return whatever is stored afterwards.
    async fn upsert_defaults(&self, id: AccountId, now: DateTime<Utc>)
    -> Result<Account, StoreError>;

    /// Unconditional increment, creating the record on first touch. Called
    /// by the external credit feed. The amount must be positive.
    async fn credit(
        &self,
        id: AccountId,
        amount: Stars,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError>;

    /// Decrement `price` only if the stored balance still covers it at
    /// write time.
    async fn debit_if_covered(
        &self,
        id: AccountId,
        price: Stars,
        now: DateTime<Utc>,
    ) -> Result<DebitApplication, StoreError>;

    /// Queue opt-in; creates the record on first touch (balance 0).
    async fn join_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<Account, StoreError>;

    /// Queue opt-out; returns false if there was no record to update.
    async fn leave_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Append a preference (duplicates suppressed), creating the record on
    /// first touch.
    async fn add_preference(
        &self,
        id: AccountId,
        gift: GiftId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError>;

    /// Drop all preferences; returns false if there was no record.
    async fn clear_preferences(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Snapshot of accounts with `balance > 0 AND queued`, ordered by
    /// last-activity ascending (FIFO). Callers must re-read each account
    /// before acting on it.
    async fn query_eligible(&self) -> Result<Vec<Account>, StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn find_one(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).find_one(id).await
    }

    async fn upsert_defaults(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        (**self).upsert_defaults(id, now).await
    }

    async fn credit(
        &self,
        id: AccountId,
        amount: Stars,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        (**self).credit(id, amount, now).await
    }

    async fn debit_if_covered(
        &self,
        id: AccountId,
        price: Stars,
        now: DateTime<Utc>,
    ) -> Result<DebitApplication, StoreError> {
        (**self).debit_if_covered(id, price, now).await
    }

    async fn join_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<Account, StoreError> {
        (**self).join_queue(id, now).await
    }

    async fn leave_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).leave_queue(id, now).await
    }

    async fn add_preference(
        &self,
        id: AccountId,
        gift: GiftId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        (**self).add_preference(id, gift, now).await
    }

    async fn clear_preferences(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).clear_preferences(id, now).await
    }

    async fn query_eligible(&self) -> Result<Vec<Account>, StoreError> {
        (**self).query_eligible().await
    }
}
