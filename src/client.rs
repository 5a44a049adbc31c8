//! HTTP client for the covidapi.info REST API.
//!
//! Builds endpoint URLs against a fixed base, memoizes response bodies in a
//! [`ResponseCache`] for the client's lifetime, and decodes the two payloads
//! the job needs directly from the body so country order is kept. A
//! non-success status is reported as an absent payload (`Ok(None)`), never
//! as an error; callers decide whether that is fatal.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::config;
use crate::error::Result;
use crate::models::{GlobalCount, TimeSeries};

/// Raw result of a GET.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs blocking GET requests.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Response>;
}

/// [`Transport`] over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the HTTP client.
    ///
    /// With `timeout` unset the transport's default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(Response { status, body })
    }
}

/// Source of the two datasets a run consumes.
///
/// `Ok(None)` means the source answered but had nothing usable.
pub trait DataSource {
    fn fetch_time_series(&mut self, start_date: &str, end_date: &str)
        -> Result<Option<TimeSeries>>;

    fn fetch_global_count(&mut self) -> Result<Option<GlobalCount>>;
}

/// Memoizing client for the covidapi.info API.
pub struct ApiClient<T: Transport = HttpTransport> {
    base_url: String,
    transport: T,
    cache: ResponseCache<Option<String>>,
}

impl ApiClient<HttpTransport> {
    /// Create a client over HTTP against `base_url`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::with_transport(base_url, HttpTransport::new(timeout)?))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over any transport, with the default cache capacity.
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.to_string(),
            transport,
            cache: ResponseCache::new(config::CACHE_CAPACITY),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> &ResponseCache<Option<String>> {
        &self.cache
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET an endpoint and return its raw body.
    ///
    /// Repeated calls for the same endpoint are answered from the cache,
    /// including absent results.
    pub fn request_body(&mut self, endpoint: &str) -> Result<Option<String>> {
        if let Some(cached) = self.cache.get(endpoint) {
            tracing::debug!(endpoint, "serving cached response");
            return Ok(cached.clone());
        }

        let url = self.url(endpoint);
        tracing::info!(%url, "fetching");
        let resp = self.transport.get(&url)?;

        let body = if resp.is_success() {
            Some(resp.body)
        } else {
            tracing::warn!(%url, status = resp.status, "request returned non-success status");
            None
        };

        self.cache.insert(endpoint, body.clone());
        Ok(body)
    }

    /// GET an endpoint and parse its JSON body, keeping object key order.
    pub fn request(&mut self, endpoint: &str) -> Result<Option<Value>> {
        self.decode(endpoint)
    }

    /// GET an endpoint and decode its body straight into `D`.
    fn decode<D: DeserializeOwned>(&mut self, endpoint: &str) -> Result<Option<D>> {
        match self.request_body(endpoint)? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

impl<T: Transport> DataSource for ApiClient<T> {
    fn fetch_time_series(
        &mut self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Option<TimeSeries>> {
        self.decode(&config::timeseries_endpoint(start_date, end_date))
    }

    fn fetch_global_count(&mut self) -> Result<Option<GlobalCount>> {
        self.decode(config::global_count_endpoint())
    }
}
