// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Spotify integration is not configured: set a client id")]
    NotConfigured,

    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    #[error("Spotify authentication failed: {0}")]
    Authentication(String),

    #[error("No track found for \"{title}\" by \"{artist}\"")]
    NotFound { artist: String, title: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from Spotify API: {0}")]
    InvalidResponse(String),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotConfigured,
    /// The client was built with unusable settings, such as a malformed base URL.
    Configuration,
    Authentication,
    NotFound,
    /// Transport failures, timeouts, unexpected statuses and malformed bodies.
    Provider,
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Request(_) | Self::Api { .. } | Self::InvalidResponse(_) => ErrorKind::Provider,
        }
    }

    pub fn is_provider(&self) -> bool {
        self.kind() == ErrorKind::Provider
    }
}
