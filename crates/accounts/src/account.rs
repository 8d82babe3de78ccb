use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftflow_core::{AccountId, DomainError, DomainResult, GiftId, Stars};

/// One account record as held by the account store.
///
/// Balance is never negative at any observable point; the only mutations
/// that touch it are [`Account::apply_credit`] and [`Account::apply_debit`].
/// `last_activity` is bumped on every mutation and is the FIFO sort key for
/// the gift queue (oldest activity first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Stars,
    /// Ordered preference list, duplicates suppressed on insert.
    /// Earlier entries win over later ones when matching.
    pub preferences: Vec<GiftId>,
    /// Whether the account opted into automatic gift purchases.
    pub queued: bool,
    pub last_activity: DateTime<Utc>,
}

impl Account {
    /// The record created on first touch (first credit or first queue join).
    pub fn fresh(id: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            balance: Stars::ZERO,
            preferences: Vec::new(),
            queued: true,
            last_activity: now,
        }
    }

    /// Whether this account should be considered for automatic purchases.
    pub fn is_eligible(&self) -> bool {
        self.queued && self.balance.is_positive()
    }

    /// Apply an incoming credit. The amount must be positive.
    pub fn apply_credit(&mut self, amount: Stars, now: DateTime<Utc>) -> DomainResult<()> {
        if !amount.is_positive() {
            return Err(DomainError::validation("credit amount must be positive"));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::invariant("balance overflow on credit"))?;
        self.last_activity = now;
        Ok(())
    }

    /// Apply a confirmed-purchase debit. Refused unless the balance still
    /// covers the price; returns the new balance.
    pub fn apply_debit(&mut self, price: Stars, now: DateTime<Utc>) -> DomainResult<Stars> {
        if !price.is_positive() {
            return Err(DomainError::validation("debit amount must be positive"));
        }
        self.balance = self.balance.checked_sub(price).ok_or_else(|| {
            DomainError::invariant(format!(
                "debit of {} would overdraw balance {}",
                price, self.balance
            ))
        })?;
        self.last_activity = now;
        Ok(self.balance)
    }

    /// Append a preference. Returns false (and leaves the list untouched)
    /// if the gift is already listed.
    pub fn add_preference(&mut self, gift: GiftId, now: DateTime<Utc>) -> bool {
        if self.preferences.contains(&gift) {
            return false;
        }
        self.preferences.push(gift);
        self.last_activity = now;
        true
    }

    pub fn remove_preference(&mut self, gift: GiftId, now: DateTime<Utc>) -> bool {
        let before = self.preferences.len();
        self.preferences.retain(|g| *g != gift);
        if self.preferences.len() == before {
            return false;
        }
        self.last_activity = now;
        true
    }

    pub fn clear_preferences(&mut self, now: DateTime<Utc>) {
        self.preferences.clear();
        self.last_activity = now;
    }

    /// Queue opt-in / opt-out.
    pub fn set_queued(&mut self, queued: bool, now: DateTime<Utc>) {
        self.queued = queued;
        self.last_activity = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn fresh_account_has_defaults() {
        let a = Account::fresh(AccountId::new(1), t0());
        assert_eq!(a.balance, Stars::ZERO);
        assert!(a.preferences.is_empty());
        assert!(a.queued);
        assert!(!a.is_eligible()); // zero balance
    }

    #[test]
    fn eligibility_requires_balance_and_queue_flag() {
        let now = t0();
        let mut a = Account::fresh(AccountId::new(1), now);
        a.apply_credit(Stars::new(10), now).unwrap();
        assert!(a.is_eligible());

        a.set_queued(false, now);
        assert!(!a.is_eligible());
    }

    #[test]
    fn debit_refused_when_balance_does_not_cover() {
        let now = t0();
        let mut a = Account::fresh(AccountId::new(1), now);
        a.apply_credit(Stars::new(50), now).unwrap();

        let err = a.apply_debit(Stars::new(100), now).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(a.balance, Stars::new(50)); // untouched
    }

    #[test]
    fn non_positive_credit_is_rejected() {
        let now = t0();
        let mut a = Account::fresh(AccountId::new(1), now);
        assert!(a.apply_credit(Stars::ZERO, now).is_err());
        assert!(a.apply_credit(Stars::new(-5), now).is_err());
    }

    #[test]
    fn duplicate_preferences_are_suppressed_and_order_kept() {
        let now = t0();
        let mut a = Account::fresh(AccountId::new(1), now);
        assert!(a.add_preference(GiftId::new(7), now));
        assert!(a.add_preference(GiftId::new(3), now));
        assert!(!a.add_preference(GiftId::new(7), now));
        assert_eq!(a.preferences, vec![GiftId::new(7), GiftId::new(3)]);
    }

    #[test]
    fn mutations_bump_last_activity() {
        let now = t0();
        let later = now + chrono::Duration::seconds(10);
        let mut a = Account::fresh(AccountId::new(1), now);
        a.apply_credit(Stars::new(1), later).unwrap();
        assert_eq!(a.last_activity, later);
    }

    proptest! {
        /// Credit of X followed by a debit of X returns the balance to its
        /// pre-credit value exactly.
        #[test]
        fn credit_then_debit_round_trips(start in 0i64..1_000_000, x in 1i64..1_000_000) {
            let now = t0();
            let mut a = Account::fresh(AccountId::new(1), now);
            if start > 0 {
                a.apply_credit(Stars::new(start), now).unwrap();
            }
            let before = a.balance;

            a.apply_credit(Stars::new(x), now).unwrap();
            a.apply_debit(Stars::new(x), now).unwrap();
            prop_assert_eq!(a.balance, before);
        }

        /// No interleaving of credits and debits ever drives the balance
        /// negative; overdrawing debits are refused without effect.
        #[test]
        fn balance_never_negative(ops in prop::collection::vec((any::<bool>(), 1i64..10_000), 0..50)) {
            let now = t0();
            let mut a = Account::fresh(AccountId::new(1), now);
            for (credit, amount) in ops {
                let amount = Stars::new(amount);
                if credit {
                    let _ = a.apply_credit(amount, now);
                } else {
                    let _ = a.apply_debit(amount, now);
                }
                prop_assert!(a.balance.amount() >= 0);
            }
        }
    }
}
