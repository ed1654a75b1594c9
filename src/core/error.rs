//! Fetch failure taxonomy and the user-facing messages attached to it

use crate::core::currency::CurrencyCode;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Language used for messages shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Response missing required rates data")]
    MissingRates,
    #[error("Response body could not be parsed: {0}")]
    MalformedBody(String),
    #[error("Invalid currency code in response: {0:?}")]
    InvalidCurrencyCode(String),
    #[error("Invalid rate {rate} for {code}")]
    InvalidRate { code: CurrencyCode, rate: f64 },
    #[error("Rates do not include {0}")]
    MissingCurrency(CurrencyCode),
}

/// Error codes reported by the provider in its `error-type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    UnsupportedCode,
    MalformedRequest,
    InvalidKey,
    InactiveAccount,
    QuotaReached,
    ServerError,
}

impl ProviderErrorKind {
    /// Maps a provider code, falling back to `ServerError` for anything unknown.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("unsupported-code") => ProviderErrorKind::UnsupportedCode,
            Some("malformed-request") => ProviderErrorKind::MalformedRequest,
            Some("invalid-key") => ProviderErrorKind::InvalidKey,
            Some("inactive-account") => ProviderErrorKind::InactiveAccount,
            Some("quota-reached") => ProviderErrorKind::QuotaReached,
            _ => ProviderErrorKind::ServerError,
        }
    }

    pub fn message(&self, language: Language) -> &'static str {
        match (self, language) {
            (ProviderErrorKind::UnsupportedCode, Language::Pt) => "Moeda não suportada",
            (ProviderErrorKind::UnsupportedCode, Language::En) => "Unsupported currency",
            (ProviderErrorKind::MalformedRequest, Language::Pt) => "Requisição mal formada",
            (ProviderErrorKind::MalformedRequest, Language::En) => "Malformed request",
            (ProviderErrorKind::InvalidKey, Language::Pt) => "A chave de acesso é inválida.",
            (ProviderErrorKind::InvalidKey, Language::En) => "The access key is invalid.",
            (ProviderErrorKind::InactiveAccount, Language::Pt) => "Sua conta está inativa.",
            (ProviderErrorKind::InactiveAccount, Language::En) => "Your account is inactive.",
            (ProviderErrorKind::QuotaReached, Language::Pt) => {
                "Sua conta atingiu o limite de requisições."
            }
            (ProviderErrorKind::QuotaReached, Language::En) => {
                "Your account has reached its request quota."
            }
            (ProviderErrorKind::ServerError, Language::Pt) => "Ocorreu um erro no servidor.",
            (ProviderErrorKind::ServerError, Language::En) => "A server error occurred.",
        }
    }
}

impl Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message(Language::En))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider error: {0}")]
    Provider(ProviderErrorKind),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FetchError {
    /// Text shown to the end user for this failure.
    pub fn user_message(&self, language: Language) -> String {
        match self {
            FetchError::Network(_) => match language {
                Language::Pt => "Erro de Conexão com a internet".to_string(),
                Language::En => "Internet connection error".to_string(),
            },
            FetchError::Provider(kind) => kind.message(language).to_string(),
            FetchError::Validation(err) => err.user_message(language),
        }
    }
}

impl ValidationError {
    pub fn user_message(&self, language: Language) -> String {
        match (self, language) {
            (ValidationError::MissingRates, Language::Pt) => {
                "O objeto precisa conter a propriedade conversion_rates.".to_string()
            }
            (ValidationError::MissingRates, Language::En) => {
                "response missing required rates data".to_string()
            }
            (ValidationError::MalformedBody(_), Language::Pt) => {
                "A resposta do servidor é inválida.".to_string()
            }
            (ValidationError::MalformedBody(_), Language::En) => {
                "The server response is invalid.".to_string()
            }
            (ValidationError::InvalidCurrencyCode(code), Language::Pt) => {
                format!("A resposta contém um código de moeda inválido: {code}")
            }
            (ValidationError::InvalidCurrencyCode(code), Language::En) => {
                format!("The response contains an invalid currency code: {code}")
            }
            (ValidationError::InvalidRate { code, .. }, Language::Pt) => {
                format!("A resposta contém uma cotação inválida para {code}")
            }
            (ValidationError::InvalidRate { code, .. }, Language::En) => {
                format!("The response contains an invalid rate for {code}")
            }
            (ValidationError::MissingCurrency(code), Language::Pt) => {
                format!("A moeda {code} não está disponível")
            }
            (ValidationError::MissingCurrency(code), Language::En) => {
                format!("The currency {code} is not available")
            }
        }
    }
}

/// A dismissible message describing a failure to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
}

impl ErrorNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(error: &FetchError, language: Language) -> Self {
        Self::new(error.user_message(language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes() {
        let cases = [
            ("unsupported-code", ProviderErrorKind::UnsupportedCode),
            ("malformed-request", ProviderErrorKind::MalformedRequest),
            ("invalid-key", ProviderErrorKind::InvalidKey),
            ("inactive-account", ProviderErrorKind::InactiveAccount),
            ("quota-reached", ProviderErrorKind::QuotaReached),
            ("base-code-only-on-pro", ProviderErrorKind::ServerError),
        ];
        for (code, expected) in cases {
            assert_eq!(ProviderErrorKind::from_code(Some(code)), expected);
        }
        assert_eq!(
            ProviderErrorKind::from_code(None),
            ProviderErrorKind::ServerError
        );
    }

    #[test]
    fn test_user_messages() {
        let quota = FetchError::Provider(ProviderErrorKind::QuotaReached);
        assert_eq!(
            quota.user_message(Language::Pt),
            "Sua conta atingiu o limite de requisições."
        );

        let network = FetchError::Network("connection refused".to_string());
        assert_eq!(
            network.user_message(Language::Pt),
            "Erro de Conexão com a internet"
        );

        let missing = FetchError::from(ValidationError::MissingRates);
        assert_eq!(
            missing.user_message(Language::En),
            "response missing required rates data"
        );

        let unknown = FetchError::Provider(ProviderErrorKind::from_code(Some("teapot")));
        assert_eq!(
            ErrorNotice::from_error(&unknown, Language::Pt).message,
            "Ocorreu um erro no servidor."
        );
    }
}
