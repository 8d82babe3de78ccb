//! `giftflow-accounts` — the account record and its pure mutation rules.

pub mod account;

pub use account::Account;
