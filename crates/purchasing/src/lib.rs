//! `giftflow-purchasing` — purchase submission and the attempt state
//! machine.
//!
//! Per attempt: `selected → submitted → {confirmed, declined,
//! transient-failure}`; a confirmed attempt then resolves to `{debited,
//! debit-inconsistent}` in the ledger. The external purchase API is not
//! assumed idempotent, so [`PurchaseExecutor`] invokes it at most once per
//! attempt.

pub mod attempt;
pub mod executor;
pub mod service;

pub use attempt::{AttemptOutcome, DebitOutcome, PurchaseAttempt};
pub use executor::PurchaseExecutor;
pub use service::{PurchaseAck, PurchaseApiError, PurchaseRequest, PurchaseService};
