use std::fmt;

use listkit_core::ListError;
use thiserror::Error;

use crate::JwtError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Response body did not have the expected shape.
    Decode,
    Token(JwtError),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Token(err) => write!(f, "token error ({err})"),
        }
    }
}

impl From<JwtError> for FetchError {
    fn from(err: JwtError) -> Self {
        let message = err.to_string();
        Self::new(FailureKind::Token(err), message)
    }
}

impl From<FetchError> for ListError {
    fn from(err: FetchError) -> Self {
        match err.kind {
            FailureKind::HttpStatus(status) => ListError::server(status, err.message),
            _ => ListError::network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_code() {
        let err: ListError = FetchError::new(FailureKind::HttpStatus(404), "no such page").into();
        assert_eq!(err, ListError::server(404, "no such page"));
        assert_eq!(err.code(), 404);
    }

    #[test]
    fn transport_errors_become_unknown() {
        let err: ListError = FetchError::new(FailureKind::Timeout, "60s elapsed").into();
        assert_eq!(err, ListError::network("timeout: 60s elapsed"));
        assert_eq!(err.code(), listkit_core::CODE_UNKNOWN);
    }
}
