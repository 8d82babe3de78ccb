//! `giftflow-infra` — account persistence and the notification channel.
//!
//! The account store is the one contended shared resource in the system:
//! the scheduler's purchase cycle and the out-of-scope command/credit
//! surfaces mutate the same records concurrently. Correctness rests on the
//! store's conditional operations (never blind read-modify-write), so both
//! implementations here make the conditional debit atomic.

pub mod account_store;
pub mod notifier;

pub use account_store::{
    AccountStore, DebitApplication, InMemoryAccountStore, PostgresAccountStore, StoreError,
};
pub use notifier::{Notifier, NotifyError, RecordingNotifier, TracingNotifier};
