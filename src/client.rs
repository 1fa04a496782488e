use std::fmt;

use reqwest::{Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    envelope::{decode_data, ensure_ok, parse_envelope, Envelope},
    executor::{Executor, RequestTemplate},
    inputs::WithApiKey,
    ClientOptions, CreateRequestInput, DeleteRequest, DeleteRequestInput, FetchAllRequestInput,
    FetchByCreatorInput, FetchByStatusInput, FetchByTypeInput, FetchRequestInput, GdprError,
    InfoRequest, PaginatedResponse, Result, Transport, TransportError, TransportErrorKind,
    UpdateRequestInput,
};

const CREATE_INFO: &str = "action=create";
const FETCH_INFO: &str = "action=fetch";
const UPDATE_INFO: &str = "action=update";
const DELETE_INFO: &str = "action=delete";
const FETCH_ALL_INFO: &str = "action=fetchAll";
const FETCH_INFO_BY_TYPE: &str = "action=fetchByType";
const FETCH_INFO_BY_CREATOR: &str = "action=fetchByCreator";
const CREATE_DELETE: &str = "controller=delete&action=create";
const FETCH_DELETE: &str = "controller=delete&action=fetch";
const UPDATE_DELETE: &str = "controller=delete&action=update";
const DELETE_DELETE: &str = "controller=delete&action=delete";
const FETCH_DELETE_BY_STATUS: &str = "controller=delete&action=fetchByStatus";
const FETCH_DELETE_BY_CREATOR: &str = "controller=delete&action=fetchByCreator";

/// Client for the GDPR data subject request service.
///
/// Every operation POSTs a JSON body to `{base_url}/gdpr?...` through the
/// retrying [`Executor`] and unwraps the service's response envelope.
#[derive(Clone)]
pub struct GdprClient<T = reqwest::Client> {
    executor: Executor<T>,
    base_url: String,
    api_key: String,
    options: ClientOptions,
}

impl<T> fmt::Debug for GdprClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GdprClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl GdprClient<reqwest::Client> {
    /// Creates a client with default options on a fresh `reqwest` client.
    ///
    /// `api_key` is injected into every request body that does not carry
    /// its own key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let options = ClientOptions::default();
        Self {
            executor: Executor::new(reqwest::Client::new(), options.retry_policy.clone()),
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            options,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `GDPR_BASE_URL`: service root, e.g. `https://privacy.internal`
    /// - `GDPR_API_KEY`: pre-shared key
    /// - `GDPR_ENVIRONMENT`: optional environment label (default `Prod`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gdpr_client::GdprClient;
    ///
    /// let client = GdprClient::from_env().expect("missing GDPR_* env vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        let base_url = required_env("GDPR_BASE_URL")?;
        let api_key = required_env("GDPR_API_KEY")?;
        let client = Self::new(base_url, api_key);
        match std::env::var("GDPR_ENVIRONMENT") {
            Ok(environment) if !environment.trim().is_empty() => {
                let options = client
                    .options
                    .clone()
                    .with_environment(environment.trim());
                client.with_options(options)
            }
            _ => Ok(client),
        }
    }
}

impl<T: Transport> GdprClient<T> {
    /// Replaces the options after validating them.
    pub fn with_options(self, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let transport = self.executor.into_transport();
        Ok(Self {
            executor: Executor::new(transport, options.retry_policy.clone()),
            base_url: self.base_url,
            api_key: self.api_key,
            options,
        })
    }

    /// Swaps the transport, keeping every other setting.
    pub fn with_transport<U: Transport>(self, transport: U) -> GdprClient<U> {
        GdprClient {
            executor: Executor::new(transport, self.options.retry_policy.clone()),
            base_url: self.base_url,
            api_key: self.api_key,
            options: self.options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn environment(&self) -> &str {
        &self.options.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }

    /// Submits a new right-of-access request.
    pub async fn create_info_request(&self, input: CreateRequestInput) -> Result<InfoRequest> {
        self.record(CREATE_INFO, input, None).await
    }

    /// Submits a new erasure request.
    pub async fn create_delete_request(&self, input: CreateRequestInput) -> Result<DeleteRequest> {
        self.record(CREATE_DELETE, input, None).await
    }

    /// Looks up one info request; a missing record is [`GdprError::NotFound`].
    pub async fn fetch_info_request(&self, input: FetchRequestInput) -> Result<InfoRequest> {
        self.record(FETCH_INFO, input, Some("info request")).await
    }

    /// Looks up one deletion request; a missing record is [`GdprError::NotFound`].
    pub async fn fetch_delete_request(&self, input: FetchRequestInput) -> Result<DeleteRequest> {
        self.record(FETCH_DELETE, input, Some("delete request"))
            .await
    }

    pub async fn update_info_request(&self, input: UpdateRequestInput) -> Result<()> {
        self.acknowledge(UPDATE_INFO, input).await
    }

    pub async fn update_delete_request(&self, input: UpdateRequestInput) -> Result<()> {
        self.acknowledge(UPDATE_DELETE, input).await
    }

    pub async fn delete_info_request(&self, input: DeleteRequestInput) -> Result<()> {
        self.acknowledge(DELETE_INFO, input).await
    }

    pub async fn delete_delete_request(&self, input: DeleteRequestInput) -> Result<()> {
        self.acknowledge(DELETE_DELETE, input).await
    }

    /// Lists the info requests of one data subject.
    pub async fn fetch_all_info_requests(
        &self,
        input: FetchAllRequestInput,
    ) -> Result<PaginatedResponse> {
        self.record(FETCH_ALL_INFO, input, None).await
    }

    pub async fn fetch_info_requests_by_type(
        &self,
        input: FetchByTypeInput,
    ) -> Result<PaginatedResponse> {
        self.record(FETCH_INFO_BY_TYPE, input, None).await
    }

    pub async fn fetch_info_requests_by_creator(
        &self,
        input: FetchByCreatorInput,
    ) -> Result<PaginatedResponse> {
        self.record(FETCH_INFO_BY_CREATOR, input, None).await
    }

    pub async fn fetch_delete_requests_by_status(
        &self,
        input: FetchByStatusInput,
    ) -> Result<PaginatedResponse> {
        self.record(FETCH_DELETE_BY_STATUS, input, None).await
    }

    pub async fn fetch_delete_requests_by_creator(
        &self,
        input: FetchByCreatorInput,
    ) -> Result<PaginatedResponse> {
        self.record(FETCH_DELETE_BY_CREATOR, input, None).await
    }

    async fn record<I, R>(&self, query: &'static str, input: I, lookup: Option<&str>) -> Result<R>
    where
        I: Serialize + WithApiKey,
        R: DeserializeOwned,
    {
        let envelope = self.post(query, input).await?;
        ensure_ok(&envelope, lookup)?;
        decode_data(envelope)
    }

    async fn acknowledge<I>(&self, query: &'static str, input: I) -> Result<()>
    where
        I: Serialize + WithApiKey,
    {
        let envelope = self.post(query, input).await?;
        ensure_ok(&envelope, None)
    }

    async fn post<I>(&self, query: &'static str, mut input: I) -> Result<Envelope>
    where
        I: Serialize + WithApiKey,
    {
        input.fill_api_key(&self.api_key);
        let body = serde_json::to_vec(&input)
            .map_err(|err| GdprError::Encode(format!("request body for {query}: {err}")))?;
        let template =
            RequestTemplate::post_json(self.endpoint(query)?, body).timeout(self.options.timeout);

        let response = self.send(&template).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GdprError::Transport(err.into()))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            query,
            environment = %self.options.environment,
            status = status.as_u16(),
            body_len = body.len(),
            "gdpr service response"
        );

        if status != StatusCode::OK {
            return Err(GdprError::Http {
                status: status.as_u16(),
                body,
            });
        }
        parse_envelope(&body)
    }

    async fn send(&self, template: &RequestTemplate) -> Result<Response> {
        let call = self.executor.execute(template);
        let outcome = match self.options.overall_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|elapsed| {
                    TransportError::new(TransportErrorKind::DeadlineExceeded, elapsed)
                })?,
            None => call.await,
        };
        Ok(outcome?)
    }

    fn endpoint(&self, query: &str) -> Result<Url> {
        let raw = format!("{}/gdpr?{query}", self.base_url);
        Url::parse(&raw).map_err(|err| GdprError::Config(format!("invalid base url '{raw}': {err}")))
    }
}

fn normalize_base_url(base_url: String) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    trimmed.to_owned()
}

fn required_env(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .map_err(|_| GdprError::Config(format!("missing {name} environment variable")))?;
    if value.trim().is_empty() {
        return Err(GdprError::Config(format!("{name} is set but empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{normalize_base_url, GdprClient};
    use crate::{ClientOptions, GdprError, RetryPolicy};

    #[test]
    fn normalize_base_url_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" https://privacy.internal/api// ".to_owned()),
            "https://privacy.internal/api"
        );
    }

    #[test]
    fn endpoint_appends_gdpr_route_and_query() {
        let client = GdprClient::new("https://privacy.internal/", "key");
        let url = client
            .endpoint("controller=delete&action=fetch")
            .expect("valid endpoint");
        assert_eq!(url.path(), "/gdpr");
        assert_eq!(url.query(), Some("controller=delete&action=fetch"));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let client = GdprClient::new("not a url", "key");
        assert!(matches!(
            client.endpoint("action=create"),
            Err(GdprError::Config(_))
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = GdprClient::new("https://privacy.internal", "secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn with_options_rebuilds_executor_policy() {
        let policy = RetryPolicy {
            max_retries: 9,
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        let client = GdprClient::new("https://privacy.internal", "key")
            .with_options(
                ClientOptions::default()
                    .with_retry_policy(policy.clone())
                    .with_environment("Dev"),
            )
            .expect("valid options");
        assert_eq!(client.executor().policy(), &policy);
        assert_eq!(client.environment(), "Dev");
    }

    #[test]
    fn with_options_rejects_invalid_policy() {
        let err = GdprClient::new("https://privacy.internal", "key")
            .with_options(ClientOptions {
                retry_policy: RetryPolicy {
                    backoff_factor: 0.5,
                    ..RetryPolicy::default()
                },
                timeout: Duration::from_secs(1),
                ..ClientOptions::default()
            })
            .expect_err("factor below one");
        assert!(matches!(err, GdprError::Config(_)));
    }
}
