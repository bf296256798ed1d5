//! Errors raised while talking to a live provider.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }
}
