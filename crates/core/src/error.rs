//! Error types for the wordsplit domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.
//!
//! User-facing messages are in Portuguese, matching the HTTP API surface.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SegmentError {
    /// The requested language code is not one of the supported ones.
    #[error("Idioma '{0}' não suportado. Idiomas disponíveis: pt, en")]
    UnsupportedLanguage(String),

    /// The model artifact for a language does not exist on disk.
    #[error("Modelo '{model}' para o idioma '{language}' não encontrado em {path}")]
    ModelNotFound {
        language: String,
        model: String,
        path: String,
    },

    /// The artifact exists but could not be parsed.
    #[error("Falha ao carregar o modelo '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    #[error("Falha na tokenização: {0}")]
    Tokenization(String),
}

#[derive(Debug, Clone, Error)]
pub enum SecretError {
    #[error("Secret store not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication with the secret store failed: {0}")]
    Authentication(String),

    #[error("Secret request failed: {message} (status: {status_code})")]
    Request { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid secret name '{0}': only ASCII letters, digits and '-' are allowed")]
    InvalidName(String),
}
