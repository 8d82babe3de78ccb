//! Postgres-backed account store.
//!
//! The conditional debit is pushed into the database: a single `UPDATE ...
//! WHERE balance >= price RETURNING balance`, so the check and the decrement
//! cannot be interleaved with a concurrent credit or debit. The `CHECK
//! (balance >= 0)` constraint is a second line of defense; the store never
//! relies on it for the happy path.
//!
//! ## Error mapping
//!
//! | sqlx error                  | StoreError    | scenario                      |
//! |-----------------------------|---------------|-------------------------------|
//! | `PoolClosed`                | `Fatal`       | process is shutting down      |
//! | database check violation    | `Rejected`    | balance constraint tripped    |
//! | `Decode` / column type      | `Corrupt`     | unreadable stored record      |
//! | anything else               | `Unavailable` | network, timeouts, failover   |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use giftflow_accounts::Account;
use giftflow_core::{AccountId, GiftId, Stars};

use super::{AccountStore, DebitApplication, StoreError};

/// Postgres-backed account store over an `accounts` table.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `accounts` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                account_id    BIGINT PRIMARY KEY,
                balance       BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
                preferences   JSONB NOT NULL DEFAULT '[]'::jsonb,
                queued        BOOLEAN NOT NULL DEFAULT TRUE,
                last_activity TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let id: i64 = row
        .try_get("account_id")
        .map_err(|e| StoreError::Corrupt(format!("account_id: {e}")))?;
    let balance: i64 = row
        .try_get("balance")
        .map_err(|e| StoreError::Corrupt(format!("balance: {e}")))?;
    let preferences: JsonValue = row
        .try_get("preferences")
        .map_err(|e| StoreError::Corrupt(format!("preferences: {e}")))?;
    let preferences: Vec<GiftId> = serde_json::from_value(preferences)
        .map_err(|e| StoreError::Corrupt(format!("preferences: {e}")))?;
    let queued: bool = row
        .try_get("queued")
        .map_err(|e| StoreError::Corrupt(format!("queued: {e}")))?;
    let last_activity: DateTime<Utc> = row
        .try_get("last_activity")
        .map_err(|e| StoreError::Corrupt(format!("last_activity: {e}")))?;

    Ok(Account {
        id: AccountId::new(id),
        balance: Stars::new(balance),
        preferences,
        queued,
        last_activity,
    })
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolClosed => StoreError::Fatal(format!("{op}: connection pool closed")),
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23514") => {
            StoreError::Rejected(format!("{op}: balance constraint violated"))
        }
        sqlx::Error::Decode(e) => StoreError::Corrupt(format!("{op}: {e}")),
        other => StoreError::Unavailable(format!("{op}: {other}")),
    }
}

const SELECT_COLUMNS: &str = "account_id, balance, preferences, queued, last_activity";

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), fields(account = %id))]
    async fn find_one(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_one", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip(self), fields(account = %id))]
    async fn upsert_defaults(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        // DO UPDATE with a no-op assignment so RETURNING always yields the
        // stored row, inserted or pre-existing.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (account_id, balance, preferences, queued, last_activity)
            VALUES ($1, 0, '[]'::jsonb, TRUE, $2)
            ON CONFLICT (account_id) DO UPDATE SET account_id = EXCLUDED.account_id
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_defaults", e))?;

        account_from_row(&row)
    }

    #[instrument(skip(self), fields(account = %id, amount = %amount))]
    async fn credit(
        &self,
        id: AccountId,
        amount: Stars,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        if !amount.is_positive() {
            return Err(StoreError::Rejected(
                "credit amount must be positive".to_string(),
            ));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (account_id, balance, preferences, queued, last_activity)
            VALUES ($1, $2, '[]'::jsonb, TRUE, $3)
            ON CONFLICT (account_id) DO UPDATE
                SET balance = accounts.balance + EXCLUDED.balance,
                    last_activity = EXCLUDED.last_activity
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(amount.amount())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("credit", e))?;

        account_from_row(&row)
    }

    #[instrument(skip(self), fields(account = %id, price = %price))]
    async fn debit_if_covered(
        &self,
        id: AccountId,
        price: Stars,
        now: DateTime<Utc>,
    ) -> Result<DebitApplication, StoreError> {
        if !price.is_positive() {
            return Err(StoreError::Rejected(
                "debit amount must be positive".to_string(),
            ));
        }

        // Check and decrement in one statement; no row back means the
        // balance no longer covered the price (or the record is gone).
        let row = sqlx::query(
            r#"
            UPDATE accounts
               SET balance = balance - $2,
                   last_activity = $3
             WHERE account_id = $1 AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(id.as_i64())
        .bind(price.amount())
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("debit_if_covered", e))?;

        match row {
            Some(row) => {
                let new_balance: i64 = row
                    .try_get("balance")
                    .map_err(|e| StoreError::Corrupt(format!("balance: {e}")))?;
                Ok(DebitApplication::Applied {
                    new_balance: Stars::new(new_balance),
                })
            }
            None => Ok(DebitApplication::NotCovered),
        }
    }

    #[instrument(skip(self), fields(account = %id))]
    async fn join_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (account_id, balance, preferences, queued, last_activity)
            VALUES ($1, 0, '[]'::jsonb, TRUE, $2)
            ON CONFLICT (account_id) DO UPDATE
                SET queued = TRUE,
                    last_activity = EXCLUDED.last_activity
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("join_queue", e))?;

        account_from_row(&row)
    }

    #[instrument(skip(self), fields(account = %id))]
    async fn leave_queue(&self, id: AccountId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        // No upsert: leaving a queue you were never in creates nothing.
        let result = sqlx::query(
            "UPDATE accounts SET queued = FALSE, last_activity = $2 WHERE account_id = $1",
        )
        .bind(id.as_i64())
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("leave_queue", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(account = %id, gift = %gift))]
    async fn add_preference(
        &self,
        id: AccountId,
        gift: GiftId,
        now: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (account_id, balance, preferences, queued, last_activity)
            VALUES ($1, 0, to_jsonb(ARRAY[$2::bigint]), TRUE, $3)
            ON CONFLICT (account_id) DO UPDATE
                SET preferences = CASE
                        WHEN accounts.preferences @> to_jsonb($2::bigint)
                        THEN accounts.preferences
                        ELSE accounts.preferences || to_jsonb($2::bigint)
                    END,
                    last_activity = EXCLUDED.last_activity
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(gift.as_i64())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_preference", e))?;

        account_from_row(&row)
    }

    #[instrument(skip(self), fields(account = %id))]
    async fn clear_preferences(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE accounts SET preferences = '[]'::jsonb, last_activity = $2 WHERE account_id = $1",
        )
        .bind(id.as_i64())
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("clear_preferences", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn query_eligible(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
              FROM accounts
             WHERE balance > 0 AND queued
             ORDER BY last_activity ASC, account_id ASC
            "#
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_eligible", e))?;

        rows.iter().map(account_from_row).collect()
    }
}
