//! Rate provider abstraction

use crate::core::currency::{CurrencyCode, RatePayload};
use crate::core::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates relative to `base`.
    ///
    /// A returned payload is still unvalidated.
    async fn latest(&self, base: &CurrencyCode) -> Result<RatePayload, FetchError>;
}
