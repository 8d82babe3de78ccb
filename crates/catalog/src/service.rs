use async_trait::async_trait;
use thiserror::Error;

use crate::raw::RawGiftOption;

/// Catalog fetch error. Every variant is transient: the discoverer degrades
/// to "nothing found this cycle" and the next cycle retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Could not reach the platform (network, timeout, TLS).
    #[error("catalog transport failure: {0}")]
    Transport(String),

    /// The platform answered with an error.
    #[error("catalog remote error {code}: {message}")]
    Remote { code: i32, message: String },
}

impl CatalogError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn remote(code: i32, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }
}

/// External catalog access.
///
/// One implementation speaks to the real platform gateway; tests script the
/// responses.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the full catalog. Ordering of the result carries no meaning.
    async fn fetch_options(&self) -> Result<Vec<RawGiftOption>, CatalogError>;
}
