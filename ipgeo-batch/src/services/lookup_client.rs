//! Geolocation lookup client
//!
//! One HTTP round-trip per address against an ip-api.com style endpoint:
//! `GET {endpoint}/{address}?fields=country,isp,...` answering with a JSON
//! object keyed by field name.
//!
//! [`LookupClient::lookup`] never fails. Transport and parse failures are
//! folded into the returned [`LookupResult`] as per-field error markers so one
//! bad address cannot abort a batch. There is no retry: a failed lookup is
//! final for that address.

use crate::error::{Error, Result};
use crate::fields::FieldSet;
use crate::models::{AddressRecord, LookupResult};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Url;
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Public ip-api.com JSON endpoint
pub const DEFAULT_ENDPOINT: &str = "http://ip-api.com/json";
/// Per-request timeout unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("ipgeo-batch/", env!("CARGO_PKG_VERSION"));

/// Why a single lookup failed
///
/// The `Display` text becomes the cause in `Error: <cause>` markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_decode() {
            TransportError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Fetches the raw response object for one address
#[async_trait]
pub trait LookupTransport: Send + Sync {
    async fn fetch(
        &self,
        address: &AddressRecord,
        fields: &FieldSet,
    ) -> std::result::Result<Map<String, Value>, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Client(format!("Invalid endpoint {:?}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Client(format!(
                "Endpoint {} cannot take a path segment",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Request URL: address appended as an escaped path segment
    pub fn url_for(&self, address: &AddressRecord, fields: &FieldSet) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(address.as_str());
        }
        url.query_pairs_mut()
            .append_pair("fields", &fields.query_param());
        url
    }
}

#[async_trait]
impl LookupTransport for HttpTransport {
    async fn fetch(
        &self,
        address: &AddressRecord,
        fields: &FieldSet,
    ) -> std::result::Result<Map<String, Value>, TransportError> {
        let url = self.url_for(address, fields);
        tracing::debug!(address = %address, url = %url, "Querying lookup service");

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        match response.json::<Value>().await? {
            Value::Object(payload) => Ok(payload),
            other => Err(TransportError::Malformed(format!(
                "expected JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Lookup client: transport plus optional client-side throttle
pub struct LookupClient {
    transport: Arc<dyn LookupTransport>,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl LookupClient {
    pub fn new(transport: Arc<dyn LookupTransport>) -> Self {
        Self {
            transport,
            rate_limiter: None,
        }
    }

    /// Client over HTTP with the given endpoint and per-request timeout
    pub fn http(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(endpoint, timeout)?)))
    }

    /// Cap outgoing requests per minute across all workers; 0 disables the cap
    ///
    /// Requests are spaced evenly (burst of one) rather than allowed to
    /// arrive all at once at the start of each minute.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limiter = NonZeroU32::new(requests_per_minute).map(|rpm| {
            RateLimiter::direct(Quota::per_minute(rpm).allow_burst(NonZeroU32::MIN))
        });
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Resolve one address; always returns a fully populated result
    pub async fn lookup(&self, address: AddressRecord, fields: &FieldSet) -> LookupResult {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        match self.transport.fetch(&address, fields).await {
            Ok(payload) => {
                tracing::debug!(address = %address, "Lookup succeeded");
                LookupResult::from_payload(address, fields, &payload)
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Lookup failed");
                LookupResult::failed(address, fields, e.to_string())
            }
        }
    }
}
