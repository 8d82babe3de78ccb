use serde::{Deserialize, Serialize};

use giftflow_core::{GiftId, Stars};

/// A decoded catalog gift item.
///
/// Transient: rediscovered every cycle, never persisted. The descriptive
/// fields are carried through unchanged for notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftItem {
    pub id: GiftId,
    pub price: Stars,
    pub limited: bool,
    pub sold_out: bool,
    pub months: Option<u32>,
    pub store_product: Option<String>,
    pub description: Option<String>,
}

impl GiftItem {
    /// Purchasable right now: limited and not yet sold out.
    pub fn is_available(&self) -> bool {
        self.limited && !self.sold_out
    }

    /// Human-readable label for notifications.
    pub fn label(&self) -> String {
        match (&self.description, self.months) {
            (Some(desc), _) => desc.clone(),
            (None, Some(months)) => format!("{months}-month gift {}", self.id),
            (None, None) => format!("gift {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(limited: bool, sold_out: bool) -> GiftItem {
        GiftItem {
            id: GiftId::new(1),
            price: Stars::new(100),
            limited,
            sold_out,
            months: None,
            store_product: None,
            description: None,
        }
    }

    #[test]
    fn available_means_limited_and_not_sold_out() {
        assert!(item(true, false).is_available());
        assert!(!item(true, true).is_available());
        assert!(!item(false, false).is_available());
        assert!(!item(false, true).is_available());
    }

    #[test]
    fn label_prefers_description() {
        let mut g = item(true, false);
        g.months = Some(3);
        assert_eq!(g.label(), "3-month gift 1");
        g.description = Some("Premium for 3 months".to_string());
        assert_eq!(g.label(), "Premium for 3 months");
    }
}
