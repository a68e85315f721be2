//! Descriptor fetcher for `GET {host}/api/interface/get`.

use crate::config::Config;
use crate::descriptor::{ApiDescriptor, ApiId, REQUIRED_FIELDS, is_truthy};
use crate::error::{FetchError, Result};
use crate::retry::{DEFAULT_BASE_DELAY, RetryPolicy, retry_async};
use futures::future::try_join_all;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const INTERFACE_GET_PATH: &str = "/api/interface/get";
const MAX_ERROR_BODY_CHARS: usize = 2048;

/// Client for a single YApi instance. Cheap to clone; safe to share across tasks.
#[derive(Clone)]
pub struct YapiClient {
    inner: Arc<YapiClientInner>,
}

struct YapiClientInner {
    config: Config,
    http: Client,
    base_delay: Duration,
}

impl YapiClient {
    /// Build a client with the default retry delay (500ms, linear).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        Self::new_with_base_delay(config, DEFAULT_BASE_DELAY)
    }

    /// Build a client with a custom retry delay unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new_with_base_delay(config: Config, base_delay: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("yapi-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(sanitize_reqwest_error(&e)))?;
        Ok(Self {
            inner: Arc::new(YapiClientInner {
                config,
                http,
                base_delay,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.inner.config.retries, self.inner.base_delay)
    }

    /// Fetch one descriptor using the configured retry count.
    ///
    /// # Errors
    ///
    /// Returns the last error once all attempts fail, or [`FetchError::ConfigMissing`]
    /// without any request if host or token is empty.
    pub async fn fetch_one(&self, id: &ApiId) -> Result<ApiDescriptor> {
        self.fetch_one_with_retries(id, self.inner.config.retries).await
    }

    /// Fetch one descriptor, retrying up to `retries` times after the first attempt.
    ///
    /// # Errors
    ///
    /// See [`YapiClient::fetch_one`].
    pub async fn fetch_one_with_retries(&self, id: &ApiId, retries: u32) -> Result<ApiDescriptor> {
        let config = &self.inner.config;
        if !config.is_complete() {
            return Err(FetchError::ConfigMissing);
        }
        let policy = RetryPolicy::new(retries, self.inner.base_delay);

        retry_async(&policy, |attempt| async move {
            tracing::debug!(api_id = %id, attempt = attempt + 1, "fetching interface descriptor");
            let url = interface_url(config, id)?;
            self.request_once(url).await
        })
        .await
    }

    /// Fetch several descriptors concurrently. Results follow the input order.
    ///
    /// The first failure fails the whole batch; requests still in flight are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::EmptyBatch`] for an empty slice, otherwise the first error
    /// among the individual fetches.
    pub async fn fetch_many(&self, ids: &[ApiId]) -> Result<Vec<ApiDescriptor>> {
        if ids.is_empty() {
            return Err(FetchError::EmptyBatch);
        }
        try_join_all(ids.iter().map(|id| self.fetch_one(id))).await
    }

    async fn request_once(&self, url: Url) -> Result<ApiDescriptor> {
        let resp = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.config.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(sanitize_reqwest_error(&e)))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(sanitize_reqwest_error(&e)))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&bytes)),
            });
        }
        parse_interface_response(&bytes)
    }
}

/// Validate a `/api/interface/get` response body and extract its `data` record.
///
/// # Errors
///
/// [`FetchError::MalformedResponse`] if the body is not a JSON object,
/// [`FetchError::MissingData`] if it has no `data`, and
/// [`FetchError::IncompleteDescriptor`] if `data` lacks `_id`, `title` or `path`.
pub fn parse_interface_response(body: &[u8]) -> Result<ApiDescriptor> {
    let raw = String::from_utf8_lossy(body);
    let envelope = match serde_json::from_slice::<Value>(body) {
        Ok(v @ Value::Object(_)) => v,
        _ => {
            return Err(FetchError::MalformedResponse {
                body: truncate(&raw),
            });
        }
    };

    let Some(data) = envelope.get("data").filter(|d| is_truthy(d)) else {
        return Err(FetchError::MissingData {
            body: truncate(&raw),
        });
    };

    let incomplete = || FetchError::IncompleteDescriptor {
        record: truncate(&data.to_string()),
    };
    if !REQUIRED_FIELDS
        .iter()
        .all(|f| data.get(f).is_some_and(is_truthy))
    {
        return Err(incomplete());
    }
    serde_json::from_value(data.clone()).map_err(|_| incomplete())
}

fn interface_url(config: &Config, id: &ApiId) -> Result<Url> {
    let invalid = |message: String| FetchError::InvalidHost {
        host: config.yapi_host.clone(),
        message,
    };
    let base = Url::parse(&config.yapi_host).map_err(|e| invalid(e.to_string()))?;
    let mut url = base
        .join(INTERFACE_GET_PATH)
        .map_err(|e| invalid(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("token", &config.yapi_token)
        .append_pair("id", &id.to_query_value());
    Ok(url)
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_ERROR_BODY_CHARS {
        return s.to_string();
    }
    let mut out: String = s.chars().take(MAX_ERROR_BODY_CHARS).collect();
    out.push_str("...");
    out
}

fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
