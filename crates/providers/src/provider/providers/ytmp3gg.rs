//! ytmp3.gg converter.
//!
//! Single POST, no session and no polling; success is signaled by a literal
//! `status == "success"` in the response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::identifier::VideoId;
use crate::provider::adapter::{ProviderAdapter, ProviderClient};
use crate::provider::configs::ytmp3_gg::{CONVERT_URL, REFERER};
use crate::provider::error::ProviderError;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(10);
const AUDIO_QUALITY: &str = "320";

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    status: Option<String>,
    url: Option<String>,
}

impl ConvertResponse {
    fn into_link(self) -> Result<String, ProviderError> {
        if self.status.as_deref() != Some("success") {
            return Err(ProviderError::Rejected(format!(
                "status {:?}",
                self.status.as_deref().unwrap_or("absent")
            )));
        }
        self.url.ok_or(ProviderError::MissingField("url"))
    }
}

pub struct Ytmp3Gg {
    client: ProviderClient,
}

impl Ytmp3Gg {
    pub fn new(client: Client) -> Self {
        let mut client = ProviderClient::new(client);
        client.set_referer_static(REFERER);
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for Ytmp3Gg {
    fn name(&self) -> &'static str {
        "ytmp3gg"
    }

    async fn resolve(&self, video: &VideoId, format: &str) -> Result<String, ProviderError> {
        let form = [
            ("url", video.watch_url()),
            ("format", format.to_owned()),
            ("quality", AUDIO_QUALITY.to_owned()),
        ];
        let converted: ConvertResponse = self
            .client
            .post(CONVERT_URL, CONVERT_TIMEOUT)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        converted.into_link()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status_yields_link() {
        let response = ConvertResponse {
            status: Some("success".into()),
            url: Some("https://cdn.example/a.mp3".into()),
        };
        assert_eq!(response.into_link().unwrap(), "https://cdn.example/a.mp3");
    }

    #[test]
    fn test_non_success_status_is_rejected() {
        let response = ConvertResponse {
            status: Some("processing".into()),
            url: Some("https://cdn.example/a.mp3".into()),
        };
        assert!(matches!(
            response.into_link(),
            Err(ProviderError::Rejected(_))
        ));
    }

    #[test]
    fn test_success_without_url_is_missing_field() {
        let response = ConvertResponse {
            status: Some("success".into()),
            url: None,
        };
        assert!(matches!(
            response.into_link(),
            Err(ProviderError::MissingField("url"))
        ));
    }
}
