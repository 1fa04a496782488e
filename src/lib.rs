//! `gdpr-client` is an async HTTP client for the GDPR data subject request
//! service.
//!
//! Information-access and deletion requests are submitted and queried with
//! methods on [`GdprClient`], for example:
//! - [`GdprClient::create_info_request`]
//! - [`GdprClient::fetch_delete_request`]
//! - [`GdprClient::fetch_delete_requests_by_status`]
//!
//! Every call goes through the [`Executor`], which retries transport
//! failures, `429` and `5xx` (except `501`) with exponential backoff and
//! jitter as configured by a [`RetryPolicy`].

mod client;
mod envelope;
mod error;
mod executor;
mod inputs;
mod options;
pub mod policy;
mod transport;
mod types;

pub use async_trait::async_trait;
pub use client::GdprClient;
pub use error::GdprError;
pub use executor::{Executor, RequestTemplate, RETRY_ATTEMPT_HEADER};
pub use inputs::{
    CreateRequestInput, DeleteRequestInput, FetchAllRequestInput, FetchByCreatorInput,
    FetchByStatusInput, FetchByTypeInput, FetchRequestInput, Paginated, UpdateRequestInput,
};
pub use options::ClientOptions;
pub use policy::{compute_backoff, should_retry, RetryPolicy};
pub use transport::{Transport, TransportError, TransportErrorKind};
pub use types::{
    DataRequest, DeleteRequest, InfoRequest, PaginatedResponse, RequestStatus, RequestType,
};

pub type Result<T> = std::result::Result<T, GdprError>;
