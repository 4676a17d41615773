//! Error types for the session manager

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Every expected failure of a token operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with `successful == false`, or with a payload
    /// that cannot be used.
    #[error("{message}")]
    Protocol { code: String, message: String },

    /// The refresh token was revoked server-side (envelope code `406`).
    #[error("session revoked by server")]
    SessionRevoked,

    /// The access token payload could not be decoded.
    #[error("invalid access token: {0}")]
    Decode(String),

    /// Invalid configuration, e.g. a malformed base server URL.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn protocol(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Config(e.to_string())
    }
}
