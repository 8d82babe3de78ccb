//! The `Stars` currency value type.
//!
//! All balances and prices are expressed in the platform's smallest
//! purchasable currency unit. The type is a plain i64 underneath; the
//! non-negativity of *balances* is an invariant enforced by the account
//! record and the store, not by this type (a delta during arithmetic may
//! legitimately be compared against zero).

use serde::{Deserialize, Serialize};

/// An amount of the platform currency.
///
/// Compared and ordered by value. `checked_sub` refuses to go negative,
/// which is what every balance mutation in the system goes through.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Stars(i64);

impl Stars {
    pub const ZERO: Stars = Stars(0);

    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub const fn amount(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Whether a balance of `self` can pay `price`.
    pub const fn covers(&self, price: Stars) -> bool {
        self.0 >= price.0
    }

    /// Addition, `None` on overflow.
    pub fn checked_add(self, other: Stars) -> Option<Stars> {
        self.0.checked_add(other.0).map(Stars)
    }

    /// Subtraction, `None` if the result would be negative (or underflow).
    pub fn checked_sub(self, other: Stars) -> Option<Stars> {
        match self.0.checked_sub(other.0) {
            Some(rest) if rest >= 0 => Some(Stars(rest)),
            _ => None,
        }
    }
}

impl core::fmt::Display for Stars {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Stars {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn covers_is_inclusive() {
        assert!(Stars::new(300).covers(Stars::new(300)));
        assert!(Stars::new(301).covers(Stars::new(300)));
        assert!(!Stars::new(299).covers(Stars::new(300)));
    }

    #[test]
    fn checked_sub_refuses_to_go_negative() {
        assert_eq!(
            Stars::new(100).checked_sub(Stars::new(40)),
            Some(Stars::new(60))
        );
        assert_eq!(Stars::new(100).checked_sub(Stars::new(101)), None);
    }

    proptest! {
        /// Adding then subtracting the same amount is the identity.
        #[test]
        fn add_then_sub_round_trips(balance in 0i64..1_000_000, delta in 0i64..1_000_000) {
            let start = Stars::new(balance);
            let credited = start.checked_add(Stars::new(delta)).unwrap();
            prop_assert_eq!(credited.checked_sub(Stars::new(delta)), Some(start));
        }

        /// A successful subtraction never produces a negative amount.
        #[test]
        fn checked_sub_never_negative(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            if let Some(rest) = Stars::new(a).checked_sub(Stars::new(b)) {
                prop_assert!(rest.amount() >= 0);
                prop_assert!(a >= b);
            } else {
                prop_assert!(a < b);
            }
        }
    }
}
