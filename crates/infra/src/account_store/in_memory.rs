use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use giftflow_accounts::Account;
use giftflow_core::{AccountId, GiftId, Stars};

use super::{AccountStore, DebitApplication, StoreError};

/// In-memory account store.
///
/// Intended for tests/dev. Conditional operations run under the write lock,
/// so the check-and-decrement of `debit_if_covered` is atomic here exactly
/// as it is in the SQL implementation.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<AccountId, Account>>, StoreError> {
        self.accounts
            .read()
            .map_err(|_| StoreError::Fatal("account map lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<AccountId, Account>>, StoreError> {
        self.accounts
            .write()
            .map_err(|_| StoreError::Fatal("account map lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_one(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn upsert_defaults(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.write()?;
        Ok(accounts
            .entry(id)
            .or_insert_with(|| Account::fresh(id, now))
            .clone())
    }

    async fn credit(
        &self,
        id: AccountId,
        amount: Stars,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.write()?;
        let account = accounts.entry(id).or_insert_with(|| Account::fresh(id, now));
        account
            .apply_credit(amount, now)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        Ok(account.clone())
    }

    async fn debit_if_covered(
        &self,
        id: AccountId,
        price: Stars,
        now: DateTime<Utc>,
    ) -> Result<DebitApplication, StoreError> {
        let mut accounts = self.write()?;
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(DebitApplication::NotCovered);
        };
        if !account.balance.covers(price) {
            return Ok(DebitApplication::NotCovered);
        }
        let new_balance = account
            .apply_debit(price, now)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        Ok(DebitApplication::Applied { new_balance })
    }

    async fn join_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<Account, StoreError> {
        let mut accounts = self.write()?;
        let account = accounts.entry(id).or_insert_with(|| Account::fresh(id, now));
        account.set_queued(true, now);
        Ok(account.clone())
    }

    async fn leave_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut accounts = self.write()?;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.set_queued(false, now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_preference(
        &self,
        id: AccountId,
        gift: GiftId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.write()?;
        let account = accounts.entry(id).or_insert_with(|| Account::fresh(id, now));
        account.add_preference(gift, now);
        Ok(account.clone())
    }

    async fn clear_preferences(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.write()?;
        match accounts.get_mut(&id) {
            Some(account) => {
                account.clear_preferences(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_eligible(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.read()?;
        let mut eligible: Vec<Account> = accounts
            .values()
            .filter(|a| a.is_eligible())
            .cloned()
            .collect();
        // FIFO by last activity; id as a deterministic tie-break.
        eligible.sort_by_key(|a| (a.last_activity, a.id));
        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        Utc::now()
    }

    #[tokio::test]
    async fn upsert_defaults_is_idempotent() {
        let store = InMemoryAccountStore::new();
        let now = t0();
        let id = AccountId::new(1);

        let first = store.upsert_defaults(id, now).await.unwrap();
        assert_eq!(first.balance, Stars::ZERO);
        assert!(first.queued);

        store.credit(id, Stars::new(100), now).await.unwrap();
        let second = store.upsert_defaults(id, now).await.unwrap();
        assert_eq!(second.balance, Stars::new(100)); // existing record kept
    }

    #[tokio::test]
    async fn credit_creates_on_first_touch() {
        let store = InMemoryAccountStore::new();
        let account = store
            .credit(AccountId::new(5), Stars::new(25), t0())
            .await
            .unwrap();
        assert_eq!(account.balance, Stars::new(25));
        assert!(account.queued);
    }

    #[tokio::test]
    async fn debit_applies_only_while_covered() {
        let store = InMemoryAccountStore::new();
        let now = t0();
        let id = AccountId::new(1);
        store.credit(id, Stars::new(100), now).await.unwrap();

        let applied = store
            .debit_if_covered(id, Stars::new(60), now)
            .await
            .unwrap();
        assert_eq!(
            applied,
            DebitApplication::Applied {
                new_balance: Stars::new(40)
            }
        );

        // Second debit no longer covered: nothing written.
        let refused = store
            .debit_if_covered(id, Stars::new(60), now)
            .await
            .unwrap();
        assert_eq!(refused, DebitApplication::NotCovered);
        let account = store.find_one(id).await.unwrap().unwrap();
        assert_eq!(account.balance, Stars::new(40));
    }

    #[tokio::test]
    async fn debit_on_missing_account_is_not_covered() {
        let store = InMemoryAccountStore::new();
        let result = store
            .debit_if_covered(AccountId::new(404), Stars::new(1), t0())
            .await
            .unwrap();
        assert_eq!(result, DebitApplication::NotCovered);
    }

    #[tokio::test]
    async fn eligible_snapshot_is_fifo_by_last_activity() {
        let store = InMemoryAccountStore::new();
        let base = t0();

        // Created later but active earlier: must come first.
        store
            .credit(AccountId::new(2), Stars::new(10), base)
            .await
            .unwrap();
        store
            .credit(AccountId::new(1), Stars::new(10), base + Duration::seconds(5))
            .await
            .unwrap();

        let eligible = store.query_eligible().await.unwrap();
        let ids: Vec<AccountId> = eligible.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AccountId::new(2), AccountId::new(1)]);
    }

    #[tokio::test]
    async fn opted_out_and_zero_balance_accounts_are_excluded() {
        let store = InMemoryAccountStore::new();
        let now = t0();

        store.upsert_defaults(AccountId::new(1), now).await.unwrap(); // zero balance
        store.credit(AccountId::new(2), Stars::new(10), now).await.unwrap();
        store.leave_queue(AccountId::new(2), now).await.unwrap(); // opted out
        store.credit(AccountId::new(3), Stars::new(10), now).await.unwrap();

        let eligible = store.query_eligible().await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, AccountId::new(3));
    }

    #[tokio::test]
    async fn leave_queue_without_record_reports_false() {
        let store = InMemoryAccountStore::new();
        assert!(!store.leave_queue(AccountId::new(9), t0()).await.unwrap());
    }

    #[tokio::test]
    async fn preferences_round_trip_through_the_store() {
        let store = InMemoryAccountStore::new();
        let now = t0();
        let id = AccountId::new(1);

        store.add_preference(id, GiftId::new(7), now).await.unwrap();
        let account = store.add_preference(id, GiftId::new(3), now).await.unwrap();
        assert_eq!(account.preferences, vec![GiftId::new(7), GiftId::new(3)]);

        assert!(store.clear_preferences(id, now).await.unwrap());
        let account = store.find_one(id).await.unwrap().unwrap();
        assert!(account.preferences.is_empty());
    }
}
