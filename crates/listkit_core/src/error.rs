use thiserror::Error;

/// Numeric code for an unclassified failure.
pub const CODE_UNKNOWN: i32 = -9003;
/// Numeric code for a search result discarded after search mode ended.
pub const CODE_USER_CANCEL: i32 = -9004;
/// Numeric code for a request rejected because another one is in flight.
pub const CODE_HAS_REQUESTING: i32 = -9005;
/// Numeric code for a request cut off by a newer search or reset.
pub const CODE_SUPERSEDED: i32 = -9006;
/// Numeric code for a search started without a search capability.
pub const CODE_NO_FUNCTION: i32 = -9007;

/// Failure carried by [`crate::ResultState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Another request already holds the in-flight marker.
    #[error("a request is already in flight")]
    HasRequesting,
    /// A search result arrived after the user left search mode.
    #[error("search was cancelled before its result arrived")]
    UserCancelledSearch,
    /// A search or reset replaced the request before its result arrived.
    #[error("request was replaced by a newer one")]
    Superseded,
    /// `begin_search` was called on a list with no search capability.
    #[error("no search function configured")]
    SearchUnavailable,
    /// Opaque failure passed through from the page source.
    #[error("request failed: {message}")]
    NetworkOrServer {
        status: Option<u16>,
        message: String,
    },
}

impl ListError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkOrServer {
            status: None,
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::NetworkOrServer {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error code as reported by the toolkit's error domain.
    pub fn code(&self) -> i32 {
        match self {
            Self::HasRequesting => CODE_HAS_REQUESTING,
            Self::UserCancelledSearch => CODE_USER_CANCEL,
            Self::Superseded => CODE_SUPERSEDED,
            Self::SearchUnavailable => CODE_NO_FUNCTION,
            Self::NetworkOrServer {
                status: Some(status),
                ..
            } => i32::from(*status),
            Self::NetworkOrServer { status: None, .. } => CODE_UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_error_domain() {
        assert_eq!(ListError::HasRequesting.code(), -9005);
        assert_eq!(ListError::UserCancelledSearch.code(), -9004);
        assert_eq!(ListError::Superseded.code(), -9006);
        assert_eq!(ListError::SearchUnavailable.code(), -9007);
        assert_eq!(ListError::server(404, "missing").code(), 404);
        assert_eq!(ListError::network("reset").code(), -9003);
    }

    #[test]
    fn display_includes_server_message() {
        let err = ListError::server(500, "boom");
        assert_eq!(err.to_string(), "request failed: boom");
    }
}
