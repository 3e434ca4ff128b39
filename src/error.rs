//! Error types for the Stockfighter client.
//!
//! Transport-level failures (`Transport`, `Status`) are kept apart from
//! decoding failures (`Decode`) and from logical rejections of a response that
//! decoded fine (`NotOk`, `EchoMismatch`, `StillOpen`).

use thiserror::Error;

use crate::exchange::transport::Method;

#[derive(Debug, Error)]
pub enum Error {
    /// Connection or I/O failure while talking to the exchange
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the JSON shape we expected
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request body could not be serialized
    #[error("encode error: {0}")]
    Encode(serde_json::Error),

    #[error("{0} request requires a body")]
    MissingBody(Method),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Response decoded but its `ok` flag was false
    #[error("exchange reported failure: {}", .error.as_deref().unwrap_or("no error message"))]
    NotOk { error: Option<String> },

    /// Response echoed a venue or symbol other than the one requested
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    EchoMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Cancel request went through but the order is still open
    #[error("order {id} is still open")]
    StillOpen { id: u64 },
}

impl Error {
    /// True for failures that happened before a body could be decoded.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let status = Error::Status { status: 503, body: "down".to_string() };
        assert!(status.is_transport());
        assert!(!status.is_decode());

        let decode = Error::Decode(serde_json::from_str::<u64>("nope").unwrap_err());
        assert!(decode.is_decode());
        assert!(!decode.is_transport());
    }

    #[test]
    fn test_not_ok_message() {
        let err = Error::NotOk { error: Some("down".to_string()) };
        assert_eq!(err.to_string(), "exchange reported failure: down");
        let err = Error::NotOk { error: None };
        assert_eq!(err.to_string(), "exchange reported failure: no error message");
    }
}
