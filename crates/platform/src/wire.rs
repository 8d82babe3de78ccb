//! Wire DTOs for the gateway API.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use giftflow_catalog::RawGiftOption;
use giftflow_core::{AccountId, GiftId, Stars};

/// `GET /catalog/options` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub options: Vec<RawGiftOption>,
}

/// `POST /purchases` body.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseBody {
    pub recipient: AccountId,
    pub gift_id: GiftId,
    pub price: Stars,
}

/// Structured error body the gateway returns on an explicit rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorBody {
    pub code: String,
    pub message: String,
}

/// `POST /purchases` success body: the platform's confirmation payload,
/// carried opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseResponse {
    #[serde(default)]
    pub confirmation: JsonValue,
}

/// `POST /notifications` body.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationBody<'a> {
    pub recipient: AccountId,
    pub text: &'a str,
}
