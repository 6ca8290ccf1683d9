//! cnv.cx converter.
//!
//! Fastest backend in the chain: a single conversion round trip after
//! fetching a one-time key the converter endpoint requires as a header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::identifier::VideoId;
use crate::provider::adapter::{ProviderAdapter, ProviderClient};
use crate::provider::configs::cnv::{CONVERT_URL, KEY_URL, ORIGIN, REFERER};
use crate::provider::error::ProviderError;

const KEY_TIMEOUT: Duration = Duration::from_secs(5);
const CONVERT_TIMEOUT: Duration = Duration::from_secs(12);
const AUDIO_BITRATE: &str = "320";

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: String,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    url: Option<String>,
}

pub struct Cnv {
    client: ProviderClient,
}

impl Cnv {
    pub fn new(client: Client) -> Self {
        let mut client = ProviderClient::new(client);
        client.set_origin_static(ORIGIN);
        client.set_referer_static(REFERER);
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for Cnv {
    fn name(&self) -> &'static str {
        "cnv"
    }

    async fn resolve(&self, video: &VideoId, format: &str) -> Result<String, ProviderError> {
        let key: KeyResponse = self
            .client
            .get(KEY_URL, KEY_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(video = %video, "fetched one-time conversion key");

        let form = [
            ("link", video.watch_url()),
            ("format", format.to_owned()),
            ("audioBitrate", AUDIO_BITRATE.to_owned()),
        ];
        let converted: ConvertResponse = self
            .client
            .post(CONVERT_URL, CONVERT_TIMEOUT)
            .header("key", key.key)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        converted.url.ok_or(ProviderError::MissingField("url"))
    }
}
