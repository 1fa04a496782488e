use crate::TransportError;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum GdprError {
    /// No HTTP response could be obtained, even after retrying.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Non-200 HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// The service answered HTTP 200 but reported a failure in the envelope.
    #[error("gdpr service returned error {status_code}: {message}")]
    Service {
        /// `statusCode` field of the envelope.
        status_code: i64,
        /// `message` field of the envelope, empty when absent.
        message: String,
    },
    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// Response decoding or envelope-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GdprError {
    /// Whether the failure was a transport error of the given kind.
    pub fn is_transport_kind(&self, kind: crate::TransportErrorKind) -> bool {
        matches!(self, Self::Transport(err) if err.kind() == kind)
    }
}
