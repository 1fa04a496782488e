use std::{error::Error as StdError, fmt, io};

use async_trait::async_trait;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Coarse classification of a failed transport call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// A per-attempt timeout or caller deadline elapsed.
    DeadlineExceeded,
    /// The call was aborted before a response arrived.
    Canceled,
    /// The remote host actively refused the connection.
    ConnectionRefused,
    /// Host name resolution failed.
    NoSuchHost,
    /// Anything else (TLS, protocol, malformed URL, ...).
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DeadlineExceeded => "deadline exceeded",
            Self::Canceled => "canceled",
            Self::ConnectionRefused => "connection refused",
            Self::NoSuchHost => "no such host",
            Self::Other => "transport failure",
        };
        f.write_str(label)
    }
}

/// Error returned when no HTTP response could be obtained.
///
/// The original error is kept as the source so callers can still
/// downcast to e.g. [`reqwest::Error`].
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: BoxError,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Returns the wrapped error as a `reqwest::Error`, if it is one.
    pub fn as_reqwest(&self) -> Option<&reqwest::Error> {
        self.source.downcast_ref::<reqwest::Error>()
    }

    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = classify_reqwest_error(&err);
        Self::new(kind, err)
    }
}

fn classify_reqwest_error(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        return TransportErrorKind::DeadlineExceeded;
    }

    // hyper-util buries the io::Error a few levels down the source chain.
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(inner) = current {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return TransportErrorKind::ConnectionRefused,
                io::ErrorKind::TimedOut => return TransportErrorKind::DeadlineExceeded,
                io::ErrorKind::Interrupted => return TransportErrorKind::Canceled,
                _ => {}
            }
        }
        let message = inner.to_string().to_ascii_lowercase();
        if message.contains("connection refused") {
            return TransportErrorKind::ConnectionRefused;
        }
        if is_dns_failure(&message) {
            return TransportErrorKind::NoSuchHost;
        }
        current = inner.source();
    }

    TransportErrorKind::Other
}

/// Expects an already lowercased message.
fn is_dns_failure(message: &str) -> bool {
    message.contains("dns error")
        || message.contains("failed to lookup address")
        || message.contains("no such host")
        || message.contains("name or service not known")
}

/// Sends exactly one HTTP request.
///
/// This is the seam the retry executor drives. It is implemented for
/// [`reqwest::Client`]; tests and custom stacks can provide their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, TransportError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, TransportError> {
        self.execute(request).await.map_err(TransportError::from)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, TransportError> {
        (**self).send(request).await
    }
}
