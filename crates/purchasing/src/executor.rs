//! Purchase submission with at-most-once semantics per attempt.

use std::sync::Arc;

use tracing::{debug, info, warn};

use giftflow_core::AttemptId;

use crate::attempt::AttemptOutcome;
use crate::service::{PurchaseApiError, PurchaseRequest, PurchaseService};

/// Submits purchases to the external transactional API and interprets the
/// outcome. Holds no state between attempts.
pub struct PurchaseExecutor {
    service: Arc<dyn PurchaseService>,
}

impl PurchaseExecutor {
    pub fn new(service: Arc<dyn PurchaseService>) -> Self {
        Self { service }
    }

    /// Invoke the purchase API exactly once and classify the result.
    ///
    /// The API is not assumed idempotent: whatever comes back (including a
    /// transport failure where the remote state is unknown), this attempt is
    /// finished and is never re-submitted.
    pub async fn submit_once(
        &self,
        attempt: AttemptId,
        request: PurchaseRequest,
    ) -> AttemptOutcome {
        debug!(
            attempt = %attempt,
            recipient = %request.recipient,
            gift = %request.gift_id,
            price = %request.price,
            "submitting purchase"
        );

        match self.service.submit(request).await {
            Ok(ack) => {
                info!(attempt = %attempt, "purchase confirmed");
                AttemptOutcome::Confirmed(ack)
            }
            Err(PurchaseApiError::Declined { code, message }) => {
                info!(attempt = %attempt, code = %code, "purchase declined");
                AttemptOutcome::Declined { code, message }
            }
            Err(PurchaseApiError::Transient(msg)) => {
                warn!(attempt = %attempt, error = %msg, "purchase submission failed transiently");
                AttemptOutcome::TransientFailure(msg)
            }
        }
    }
}
