use serde::{Deserialize, Serialize};

use giftflow_accounts::Account;
use giftflow_catalog::GiftItem;

/// Why an item was chosen for an account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchReason {
    /// The item appears in the account's stored preference list.
    Preferred,
    /// Cheapest affordable item, chosen because no preference matched.
    Fallback,
}

/// A chosen item together with the reason it won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub item: GiftItem,
    pub reason: MatchReason,
}

/// Choose an item for an account from the cycle's available set.
///
/// 1. Walk the preference list in stored order; the first preference that
///    is present in `available` and affordable wins (order is a priority,
///    not an average).
/// 2. Otherwise the minimum-price affordable item wins, ties broken by the
///    lowest gift id so the choice is deterministic.
/// 3. Otherwise `None`: the account stays queued, nothing is mutated.
pub fn select(account: &Account, available: &[GiftItem]) -> Option<Selection> {
    for pref in &account.preferences {
        if let Some(item) = available.iter().find(|g| g.id == *pref) {
            if account.balance.covers(item.price) {
                return Some(Selection {
                    item: item.clone(),
                    reason: MatchReason::Preferred,
                });
            }
        }
    }

    available
        .iter()
        .filter(|g| account.balance.covers(g.price))
        .min_by_key(|g| (g.price, g.id))
        .map(|item| Selection {
            item: item.clone(),
            reason: MatchReason::Fallback,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    use giftflow_core::{AccountId, GiftId, Stars};

    fn item(id: i64, price: i64) -> GiftItem {
        GiftItem {
            id: GiftId::new(id),
            price: Stars::new(price),
            limited: true,
            sold_out: false,
            months: None,
            store_product: None,
            description: None,
        }
    }

    fn account(balance: i64, prefs: &[i64]) -> Account {
        let now = Utc::now();
        let mut a = Account::fresh(AccountId::new(1), now);
        if balance > 0 {
            a.apply_credit(Stars::new(balance), now).unwrap();
        }
        for p in prefs {
            a.add_preference(GiftId::new(*p), now);
        }
        a
    }

    #[test]
    fn preferred_wins_over_cheaper_fallback() {
        let available = [item(77, 300), item(5, 90)];
        let sel = select(&account(500, &[77]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(77));
        assert_eq!(sel.reason, MatchReason::Preferred);
    }

    #[test]
    fn earlier_preference_beats_later_one() {
        let available = [item(2, 100), item(1, 50)];
        let sel = select(&account(200, &[2, 1]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(2));
    }

    #[test]
    fn unaffordable_preference_falls_through_to_later_one() {
        let available = [item(2, 1_000), item(1, 50)];
        let sel = select(&account(200, &[2, 1]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(1));
        assert_eq!(sel.reason, MatchReason::Preferred);
    }

    #[test]
    fn fallback_picks_cheapest_affordable() {
        let available = [item(1, 150), item(2, 90)];
        let sel = select(&account(100, &[]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(2));
        assert_eq!(sel.reason, MatchReason::Fallback);
    }

    #[test]
    fn fallback_tie_breaks_on_lowest_id() {
        let available = [item(9, 90), item(3, 90), item(5, 90)];
        let sel = select(&account(100, &[]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(3));
    }

    #[test]
    fn nothing_affordable_yields_none() {
        let available = [item(1, 100), item(2, 200)];
        assert!(select(&account(50, &[1]), &available).is_none());
    }

    #[test]
    fn empty_catalog_yields_none() {
        assert!(select(&account(1_000, &[1]), &[]).is_none());
    }

    #[test]
    fn exact_balance_is_affordable() {
        let available = [item(1, 100)];
        let sel = select(&account(100, &[]), &available).unwrap();
        assert_eq!(sel.item.id, GiftId::new(1));
    }

    proptest! {
        /// Whatever is selected is always affordable.
        #[test]
        fn selection_is_always_affordable(
            balance in 0i64..5_000,
            prices in prop::collection::vec(1i64..5_000, 0..20),
        ) {
            let available: Vec<GiftItem> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| item(i as i64, *p))
                .collect();
            let a = account(balance, &[]);
            if let Some(sel) = select(&a, &available) {
                prop_assert!(a.balance.covers(sel.item.price));
            } else {
                prop_assert!(available.iter().all(|g| !a.balance.covers(g.price)));
            }
        }

        /// When any preferred item is affordable, the reason is never
        /// Fallback.
        #[test]
        fn affordable_preference_always_wins(
            balance in 1i64..5_000,
            pref_price in 1i64..5_000,
            other_price in 1i64..5_000,
        ) {
            let available = [item(1, pref_price), item(2, other_price)];
            let a = account(balance, &[1]);
            if let Some(sel) = select(&a, &available) {
                if a.balance.covers(Stars::new(pref_price)) {
                    prop_assert_eq!(sel.reason, MatchReason::Preferred);
                    prop_assert_eq!(sel.item.id, GiftId::new(1));
                }
            }
        }
    }
}
