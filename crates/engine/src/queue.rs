//! The working set of accounts for one cycle.

use std::sync::Arc;

use tracing::debug;

use giftflow_accounts::Account;
use giftflow_core::AccountId;
use giftflow_infra::{AccountStore, StoreError};

/// Produces the ordered, re-validated working set of eligible accounts.
///
/// The snapshot and the per-account fresh read are deliberately separate
/// operations: credits, opt-outs, and debits land concurrently between the
/// snapshot and the moment an account is actually processed, so nothing
/// state-changing may ever trust the snapshot.
pub struct AccountQueue {
    store: Arc<dyn AccountStore>,
}

impl AccountQueue {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// One snapshot of `balance > 0 AND queued`, FIFO by last activity.
    pub async fn snapshot(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.store.query_eligible().await?;
        debug!(eligible = accounts.len(), "eligible-account snapshot taken");
        Ok(accounts)
    }

    /// Fresh re-read immediately before matching/purchase. Returns `None`
    /// if the account no longer satisfies the eligibility predicate; the
    /// caller skips it without side effects.
    pub async fn revalidate(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let account = self.store.find_one(id).await?;
        match account {
            Some(a) if a.is_eligible() => Ok(Some(a)),
            Some(_) => {
                debug!(account = %id, "account no longer eligible at re-read; skipping");
                Ok(None)
            }
            None => {
                debug!(account = %id, "account record gone at re-read; skipping");
                Ok(None)
            }
        }
    }
}
