//! Per-cycle catalog discovery.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::item::GiftItem;
use crate::raw::RawGiftOption;
use crate::service::CatalogService;

/// Fetches the catalog once per cycle and keeps only purchasable items.
pub struct Discoverer {
    service: Arc<dyn CatalogService>,
}

impl Discoverer {
    pub fn new(service: Arc<dyn CatalogService>) -> Self {
        Self { service }
    }

    /// One discovery pass.
    ///
    /// A transient fetch failure is not fatal: it is logged and an empty set
    /// is returned, so the cycle proceeds as "nothing found" and the next
    /// cycle retries.
    pub async fn discover(&self) -> Vec<GiftItem> {
        let raw = match self.service.fetch_options().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "catalog fetch failed; treating as empty this cycle");
                return Vec::new();
            }
        };

        let total = raw.len();
        let available = filter_available(raw);
        debug!(
            total,
            available = available.len(),
            "catalog discovery finished"
        );
        available
    }
}

/// Decode raw entries and keep the available ones (limited && !sold_out).
///
/// Pure and deterministic: the same input always yields the same filtered
/// set.
pub fn filter_available(raw: Vec<RawGiftOption>) -> Vec<GiftItem> {
    raw.into_iter()
        .filter_map(RawGiftOption::decode)
        .filter(GiftItem::is_available)
        .collect()
}
