use giftflow_core::{AccountId, AttemptId, GiftId, Stars};
use giftflow_matching::MatchReason;

use crate::service::PurchaseAck;

/// Terminal result of the submission step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The platform confirmed the purchase; the ledger must now debit
    /// exactly the attempt price.
    Confirmed(PurchaseAck),
    /// Explicit rejection; no ledger mutation.
    Declined { code: String, message: String },
    /// Transport-level failure; no ledger mutation, next cycle retries.
    TransientFailure(String),
}

impl AttemptOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, AttemptOutcome::Confirmed(_))
    }
}

/// Result of the ledger step after the submission outcome is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Conditional debit applied; balance decreased by exactly the price.
    Applied { new_balance: Stars },
    /// No debit was due (attempt was not confirmed).
    Skipped,
    /// The purchase was confirmed but the conditional debit did not apply.
    /// Critical, never auto-retried: re-submitting risks double-charging the
    /// platform side, a blind debit risks charging for an unconfirmed item.
    Inconsistent,
}

/// One account's purchase attempt within one cycle. Not persisted; this is
/// what the cycle logs and tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseAttempt {
    pub id: AttemptId,
    pub account: AccountId,
    pub gift: GiftId,
    /// Price at the time of the attempt.
    pub price: Stars,
    pub reason: MatchReason,
    pub outcome: AttemptOutcome,
    pub debit: DebitOutcome,
}
