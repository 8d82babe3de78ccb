//! `giftflow-core` — shared domain primitives.
//!
//! Identifiers, the `Stars` currency value type, and the domain error model.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod id;
pub mod stars;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, AttemptId, GiftId};
pub use stars::Stars;
