//! `giftflow-platform` — HTTP client for the platform gateway.
//!
//! One client implements all three external collaborator traits
//! ([`CatalogService`](giftflow_catalog::CatalogService),
//! [`PurchaseService`](giftflow_purchasing::PurchaseService),
//! [`Notifier`](giftflow_infra::Notifier)) against a gateway that proxies
//! the platform's own API. Session/authentication setup with the platform
//! itself is the gateway's problem, not ours.

pub mod client;
pub mod wire;

pub use client::{GatewayClient, GatewayConfig};
