//! `giftflow-matching` — pure account/item matching.
//!
//! No I/O, no side effects: `(account, available items) -> chosen item or
//! none`. The caller is responsible for passing a *fresh* account read and
//! the cycle's available set.

pub mod select;

pub use select::{MatchReason, Selection, select};
