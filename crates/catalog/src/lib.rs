//! `giftflow-catalog` — catalog discovery.
//!
//! Fetches the platform's gift catalog through a [`CatalogService`] and
//! filters it down to the currently purchasable limited items. The
//! platform's bitset availability flags are decoded into named booleans at
//! this boundary; no raw flag value leaks past this crate.

pub mod discover;
pub mod item;
pub mod raw;
pub mod service;

pub use discover::Discoverer;
pub use item::GiftItem;
pub use raw::RawGiftOption;
pub use service::{CatalogError, CatalogService};
