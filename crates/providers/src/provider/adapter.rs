use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};

use super::default::DEFAULT_UA;
use super::error::ProviderError;
use crate::identifier::VideoId;

/// Shared request plumbing for one conversion backend.
///
/// Owns the HTTP client plus the header set the backend's own web frontend
/// sends. Every request carries a per-call timeout: a polling adapter
/// legitimately runs far longer than any single call, so timeouts are never
/// aggregated across a whole adapter invocation.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    headers: HeaderMap,
}

impl ProviderClient {
    pub fn new(client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        Self { client, headers }
    }

    #[inline]
    pub fn set_origin_static(&mut self, origin: &'static str) {
        self.headers
            .insert(reqwest::header::ORIGIN, HeaderValue::from_static(origin));
    }

    #[inline]
    pub fn set_referer_static(&mut self, referer: &'static str) {
        self.headers
            .insert(reqwest::header::REFERER, HeaderValue::from_static(referer));
    }

    #[inline]
    pub fn set_accept_static(&mut self, accept: &'static str) {
        self.headers
            .insert(reqwest::header::ACCEPT, HeaderValue::from_static(accept));
    }

    pub fn get(&self, url: &str, timeout: Duration) -> RequestBuilder {
        self.request(Method::GET, url, timeout)
    }

    pub fn post(&self, url: &str, timeout: Duration) -> RequestBuilder {
        self.request(Method::POST, url, timeout)
    }

    fn request(&self, method: Method, url: &str, timeout: Duration) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.headers.clone())
            .timeout(timeout)
    }
}

/// One conversion backend able to turn a video reference into a direct
/// media link.
///
/// Implementations surface internal failures as typed errors; the
/// orchestrator treats any error as "no result, try the next provider".
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, video: &VideoId, format: &str) -> Result<String, ProviderError>;
}
