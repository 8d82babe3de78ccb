//! One discover-then-process pass.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use giftflow_accounts::Account;
use giftflow_catalog::{Discoverer, GiftItem};
use giftflow_core::AttemptId;
use giftflow_infra::{Notifier, StoreError};
use giftflow_matching::{MatchReason, Selection, select};
use giftflow_purchasing::{
    AttemptOutcome, DebitOutcome, PurchaseAttempt, PurchaseExecutor, PurchaseRequest,
};

use crate::ledger::BalanceLedger;
use crate::queue::AccountQueue;
use crate::scheduler::ShutdownSignal;

/// Cycle-level failure, i.e. anything not contained by per-account
/// handling. The scheduler logs these and continues, except for fatal store
/// conditions.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("account store failure: {0}")]
    Store(#[from] StoreError),
}

impl CycleError {
    pub fn is_fatal(&self) -> bool {
        match self {
            CycleError::Store(e) => e.is_fatal(),
        }
    }
}

/// What one cycle did; logged by the scheduler and asserted on by tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// Available items discovered this cycle.
    pub discovered: usize,
    /// Accounts from the snapshot that were looked at.
    pub considered: usize,
    /// Accounts skipped: no longer eligible at re-read, or nothing
    /// affordable.
    pub skipped: usize,
    /// Confirmed purchases whose debit applied.
    pub purchased: usize,
    pub declined: usize,
    pub transient_failures: usize,
    /// Confirmed purchases whose debit did not apply. Every one of these
    /// was already surfaced at error severity.
    pub inconsistent: usize,
    /// True when a shutdown request stopped the cycle before the snapshot
    /// was exhausted.
    pub halted_early: bool,
}

/// Runs one full cycle: discover, then process the eligible-account
/// snapshot strictly sequentially, one account fully resolved before the
/// next is started.
pub struct PurchaseCycle {
    discoverer: Discoverer,
    queue: AccountQueue,
    executor: PurchaseExecutor,
    ledger: BalanceLedger,
    notifier: Arc<dyn Notifier>,
}

impl PurchaseCycle {
    pub fn new(
        discoverer: Discoverer,
        queue: AccountQueue,
        executor: PurchaseExecutor,
        ledger: BalanceLedger,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            discoverer,
            queue,
            executor,
            ledger,
            notifier,
        }
    }

    pub async fn run_once(&self, shutdown: &ShutdownSignal) -> Result<CycleSummary, CycleError> {
        let available = self.discoverer.discover().await;
        let mut summary = CycleSummary {
            discovered: available.len(),
            ..CycleSummary::default()
        };

        if available.is_empty() {
            debug!("no available items this cycle");
            return Ok(summary);
        }

        let snapshot = self.queue.snapshot().await?;

        for account in snapshot {
            // Accounts not yet started are not begun once shutdown is
            // requested; the in-flight one has already run to a terminal
            // state by the time we get back here.
            if shutdown.is_requested() {
                info!("shutdown requested; not starting further accounts this cycle");
                summary.halted_early = true;
                break;
            }

            summary.considered += 1;
            match self.process_account(account, &available).await {
                Ok(Some(attempt)) => match (&attempt.outcome, &attempt.debit) {
                    (AttemptOutcome::Confirmed(_), DebitOutcome::Applied { .. }) => {
                        summary.purchased += 1
                    }
                    (AttemptOutcome::Confirmed(_), _) => summary.inconsistent += 1,
                    (AttemptOutcome::Declined { .. }, _) => summary.declined += 1,
                    (AttemptOutcome::TransientFailure(_), _) => summary.transient_failures += 1,
                },
                Ok(None) => summary.skipped += 1,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    // Transient store trouble for this account only; it
                    // stays queued and the next cycle retries.
                    warn!(error = %e, "account skipped after store failure");
                    summary.transient_failures += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Resolve one account completely: fresh re-read, match, at most one
    /// purchase submission, conditional debit, notification.
    async fn process_account(
        &self,
        snapshotted: Account,
        available: &[GiftItem],
    ) -> Result<Option<PurchaseAttempt>, StoreError> {
        let id = snapshotted.id;

        // The snapshot is stale by now; all decisions use the fresh read.
        let Some(account) = self.queue.revalidate(id).await? else {
            return Ok(None);
        };

        let Some(selection) = select(&account, available) else {
            debug!(account = %id, balance = %account.balance, "nothing affordable; account stays queued");
            return Ok(None);
        };

        let attempt_id = AttemptId::new();
        let request = PurchaseRequest {
            recipient: id,
            gift_id: selection.item.id,
            price: selection.item.price,
        };

        let outcome = self.executor.submit_once(attempt_id, request).await;

        let debit = match &outcome {
            AttemptOutcome::Confirmed(_) => {
                self.ledger
                    .settle_confirmed(id, selection.item.price, Utc::now())
                    .await
            }
            _ => DebitOutcome::Skipped,
        };

        self.notify(&account, &selection, &outcome, &debit).await;

        Ok(Some(PurchaseAttempt {
            id: attempt_id,
            account: id,
            gift: selection.item.id,
            price: selection.item.price,
            reason: selection.reason,
            outcome,
            debit,
        }))
    }

    /// Best-effort notifications. Failures are logged, never retried, and
    /// never influence the attempt's outcome.
    async fn notify(
        &self,
        account: &Account,
        selection: &Selection,
        outcome: &AttemptOutcome,
        debit: &DebitOutcome,
    ) {
        let reason_phrase = match selection.reason {
            MatchReason::Preferred => "your preferred gift",
            MatchReason::Fallback => "an available limited gift",
        };

        let text = match (outcome, debit) {
            (AttemptOutcome::Confirmed(_), DebitOutcome::Applied { new_balance }) => {
                format!(
                    "Congratulations! We've acquired {reason_phrase}: '{}' for {} Stars on your behalf. Your new balance is {} Stars.",
                    selection.item.label(),
                    selection.item.price,
                    new_balance
                )
            }
            // The inconsistent state is an operator problem, not something
            // to tell the account holder about.
            (AttemptOutcome::Confirmed(_), _) => return,
            (AttemptOutcome::Declined { message, .. }, _)
                if selection.reason == MatchReason::Preferred =>
            {
                format!(
                    "We tried to get your preferred gift '{}' but the purchase was declined: {message}. It stays on your list for future cycles.",
                    selection.item.label()
                )
            }
            (AttemptOutcome::TransientFailure(_), _)
                if selection.reason == MatchReason::Preferred =>
            {
                format!(
                    "We tried to get your preferred gift '{}' but hit a temporary problem. We'll try again next cycle.",
                    selection.item.label()
                )
            }
            // Fallback failures are silent: not worth interrupting the
            // account holder for an opportunistic pick.
            _ => return,
        };

        if let Err(e) = self.notifier.send(account.id, &text).await {
            warn!(account = %account.id, error = %e, "notification failed (not retried)");
        }
    }
}
