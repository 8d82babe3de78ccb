//! `giftflow-engine` — the discovery → matching → purchase → ledger cycle.
//!
//! The scheduler drives one cycle per interval, forever, without overlap.
//! Within a cycle accounts are processed strictly sequentially; each account
//! is fully resolved (matched, purchased, debited, notified) before the next
//! one starts. The command/credit surfaces live outside this crate and only
//! share the account store with it.

pub mod cycle;
pub mod ledger;
pub mod queue;
pub mod scheduler;


pub use cycle::{CycleError, CycleSummary, PurchaseCycle};
pub use ledger::BalanceLedger;
pub use queue::AccountQueue;
pub use scheduler::{Scheduler, SchedulerConfig, ShutdownHandle, ShutdownSignal, shutdown_channel};
