//! Raw catalog entries as the platform returns them.

use serde::{Deserialize, Serialize};

use giftflow_core::{GiftId, Stars};

use crate::item::GiftItem;

/// Bit 0 of `flags`: the option is a limited-availability one.
const FLAG_LIMITED: u32 = 1 << 0;
/// Bit 1 of `flags`: the limited option is sold out.
const FLAG_SOLD_OUT: u32 = 1 << 1;

/// One catalog entry, wire-shaped.
///
/// `flags` is the platform's availability bitset; it is decoded into named
/// booleans by [`RawGiftOption::decode`] and must not be interpreted
/// anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGiftOption {
    pub id: i64,
    /// Price in the platform currency's smallest unit.
    pub stars: i64,
    pub flags: u32,
    pub currency: String,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub store_product: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RawGiftOption {
    /// Decode into the domain item, dropping malformed entries.
    ///
    /// An entry with a non-positive price cannot be matched or debited and
    /// is treated as malformed rather than available-for-free.
    pub fn decode(self) -> Option<GiftItem> {
        if self.stars <= 0 {
            return None;
        }
        Some(GiftItem {
            id: GiftId::new(self.id),
            price: Stars::new(self.stars),
            limited: self.flags & FLAG_LIMITED != 0,
            sold_out: self.flags & FLAG_SOLD_OUT != 0,
            months: self.months,
            store_product: self.store_product,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: i64, stars: i64, flags: u32) -> RawGiftOption {
        RawGiftOption {
            id,
            stars,
            flags,
            currency: "XTR".to_string(),
            months: None,
            store_product: None,
            description: None,
        }
    }

    #[test]
    fn flags_decode_to_named_booleans() {
        let item = raw(1, 100, 0b01).decode().unwrap();
        assert!(item.limited);
        assert!(!item.sold_out);

        let item = raw(1, 100, 0b11).decode().unwrap();
        assert!(item.limited);
        assert!(item.sold_out);

        let item = raw(1, 100, 0b00).decode().unwrap();
        assert!(!item.limited);
        assert!(!item.sold_out);
    }

    #[test]
    fn higher_bits_are_ignored() {
        let item = raw(1, 100, 0b1100).decode().unwrap();
        assert!(!item.limited);
        assert!(!item.sold_out);
    }

    #[test]
    fn non_positive_price_is_malformed() {
        assert!(raw(1, 0, 0b01).decode().is_none());
        assert!(raw(1, -5, 0b01).decode().is_none());
    }
}
