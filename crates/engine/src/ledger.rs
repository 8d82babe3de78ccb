//! The conditional balance debit tied to a confirmed purchase.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::error;

use giftflow_core::{AccountId, Stars};
use giftflow_infra::{AccountStore, DebitApplication};
use giftflow_purchasing::DebitOutcome;

/// Settles confirmed purchases against the account store.
pub struct BalanceLedger {
    store: Arc<dyn AccountStore>,
}

impl BalanceLedger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Debit exactly `price` for a purchase the platform has confirmed.
    ///
    /// The decrement is conditional on the stored balance still covering the
    /// price at write time. If it does not apply — or the store fails and we
    /// cannot know whether it applied — the attempt is terminal in the
    /// inconsistent state: re-submitting the purchase risks double-charging
    /// the platform side, re-attempting a plain debit risks charging for an
    /// item that was never confirmed. Surfaced loudly for manual
    /// reconciliation, never auto-retried.
    pub async fn settle_confirmed(
        &self,
        account: AccountId,
        price: Stars,
        now: DateTime<Utc>,
    ) -> DebitOutcome {
        match self.store.debit_if_covered(account, price, now).await {
            Ok(DebitApplication::Applied { new_balance }) => DebitOutcome::Applied { new_balance },
            Ok(DebitApplication::NotCovered) => {
                error!(
                    account = %account,
                    price = %price,
                    alert = "debit_inconsistent",
                    "purchase confirmed but conditional debit did not apply; manual reconciliation required"
                );
                DebitOutcome::Inconsistent
            }
            Err(e) => {
                error!(
                    account = %account,
                    price = %price,
                    error = %e,
                    alert = "debit_inconsistent",
                    "purchase confirmed but debit outcome is unknown; manual reconciliation required"
                );
                DebitOutcome::Inconsistent
            }
        }
    }
}
