use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use giftflow_core::{AccountId, GiftId, Stars};

/// One purchase submission. The buyer is the system identity, carried by the
/// service implementation; the recipient is the account being gifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub recipient: AccountId,
    pub gift_id: GiftId,
    /// Price at the time of the attempt.
    pub price: Stars,
}

/// Success acknowledgment from the platform.
///
/// The payload is opaque: it is carried for logging and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseAck {
    pub payload: JsonValue,
}

/// Purchase API failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseApiError {
    /// The platform explicitly rejected the purchase. A normal outcome, not
    /// an operational error: no state changes, the account stays queued.
    #[error("purchase declined ({code}): {message}")]
    Declined { code: String, message: String },

    /// Network/timeout/remote-side failure; the next cycle may retry with a
    /// fresh attempt.
    #[error("purchase transport failure: {0}")]
    Transient(String),
}

impl PurchaseApiError {
    pub fn declined(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declined {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }
}

/// The external transactional purchase API.
///
/// Implementations must not retry internally: the executor's
/// at-most-once-per-attempt contract depends on a single upstream call per
/// `submit`.
#[async_trait]
pub trait PurchaseService: Send + Sync {
    async fn submit(&self, request: PurchaseRequest) -> Result<PurchaseAck, PurchaseApiError>;
}
