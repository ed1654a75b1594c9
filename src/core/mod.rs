//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod presenter;
pub mod rates;
pub mod store;

// Re-export main types for cleaner imports
pub use currency::{ConversionQuery, ConversionResult, CurrencyCode, RatePayload, RateTable};
pub use error::{ErrorNotice, FetchError, Language, ProviderErrorKind, ValidationError};
pub use rates::RateProvider;
pub use store::RateStore;
