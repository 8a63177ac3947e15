use std::fmt;

use crate::response::GeocodeResult;

/// Boxed error produced by a [`Transport`](crate::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing API key")]
    MissingKey,

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("request failed")]
    Transport(#[source] TransportError),

    #[error("failed to decode geocoding response")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

impl Error {
    /// Status code reported by the service, for domain errors only.
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::Geocode(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Returned when the service answers with a non-200 status code.
///
/// Carries the whole decoded response so callers can inspect the rate block
/// (e.g. on `402 quota exceeded`).
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeError {
    result: Box<GeocodeResult>,
}

impl GeocodeError {
    pub(crate) fn new(result: GeocodeResult) -> Self {
        Self {
            result: Box::new(result),
        }
    }

    pub fn code(&self) -> u16 {
        self.result.status.code
    }

    pub fn message(&self) -> &str {
        &self.result.status.message
    }

    pub fn result(&self) -> &GeocodeResult {
        &self.result
    }

    pub fn into_result(self) -> GeocodeResult {
        *self.result
    }
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for GeocodeError {}
