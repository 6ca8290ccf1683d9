//! ytmp3.as converter.
//!
//! Token-gated call chain: a session credential (refreshed from the
//! backend's landing page, see [`session`]) unlocks an init endpoint, which
//! hands out the conversion endpoint to use for the actual request.

mod session;

pub use session::{SessionCredential, SessionManager};

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::identifier::VideoId;
use crate::provider::adapter::{ProviderAdapter, ProviderClient};
use crate::provider::configs::ytmp3_as::{INIT_URL, ORIGIN, REFERER};
use crate::provider::error::ProviderError;
use crate::provider::polling::{Probe, poll_until};
use crate::provider::utils::{as_f64, is_truthy};

const INIT_TIMEOUT: Duration = Duration::from_secs(6);
const CONVERT_TIMEOUT: Duration = Duration::from_secs(8);
const PROGRESS_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: u32 = 20;

/// Conversion counts as done once the backend's numeric progress reaches
/// this value. Observed upstream behavior, not documented anywhere; revisit
/// against the live backend before relying on it elsewhere.
const PROGRESS_COMPLETE: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct InitResponse {
    error: Option<Value>,
    #[serde(rename = "convertURL")]
    convert_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    error: Option<Value>,
    #[serde(rename = "progressURL")]
    progress_url: Option<String>,
    #[serde(rename = "downloadURL")]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressResponse {
    progress: Option<Value>,
    error: Option<Value>,
}

impl ProgressResponse {
    fn classify(&self) -> Probe<()> {
        if as_f64(self.progress.as_ref()).is_some_and(|p| p >= PROGRESS_COMPLETE) {
            Probe::Ready(())
        } else if is_truthy(self.error.as_ref()) {
            Probe::Abort
        } else {
            Probe::Pending
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub struct Ytmp3 {
    client: ProviderClient,
    session: Arc<SessionManager>,
}

impl Ytmp3 {
    pub fn new(client: Client) -> Self {
        Self::with_session(client, Arc::new(SessionManager::new()))
    }

    pub fn with_session(client: Client, session: Arc<SessionManager>) -> Self {
        let mut client = ProviderClient::new(client);
        client.set_accept_static("*/*");
        client.set_origin_static(ORIGIN);
        client.set_referer_static(REFERER);
        Self { client, session }
    }
}

#[async_trait]
impl ProviderAdapter for Ytmp3 {
    fn name(&self) -> &'static str {
        "ytmp3"
    }

    async fn resolve(&self, video: &VideoId, format: &str) -> Result<String, ProviderError> {
        self.session.ensure_fresh(&self.client).await;
        let credential = self.session.credential();
        let ts = unix_now().to_string();

        let init: InitResponse = self
            .client
            .get(INIT_URL, INIT_TIMEOUT)
            .query(&[
                (credential.param_name.to_string(), credential.auth_token),
                ("t".to_owned(), ts.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if is_truthy(init.error.as_ref()) {
            return Err(ProviderError::Rejected("init refused the session".into()));
        }
        let convert_url = init
            .convert_url
            .ok_or(ProviderError::MissingField("convertURL"))?;

        let converted: ConvertResponse = self
            .client
            .get(&convert_url, CONVERT_TIMEOUT)
            .query(&[("v", video.as_str()), ("f", format), ("t", ts.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if is_truthy(converted.error.as_ref()) {
            return Err(ProviderError::Rejected("conversion refused".into()));
        }

        if let Some(progress_url) = converted.progress_url.as_deref() {
            debug!(video = %video, "waiting for conversion progress");
            // The download link does not depend on the poll outcome; polling
            // only waits for the backend to finish writing the file behind it.
            let _ = poll_until(MAX_POLLS, POLL_INTERVAL, |_| {
                let request = self
                    .client
                    .get(progress_url, PROGRESS_TIMEOUT)
                    .query(&[("t", unix_now().to_string())]);
                async move {
                    let snapshot: ProgressResponse =
                        request.send().await?.error_for_status()?.json().await?;
                    Ok(snapshot.classify())
                }
            })
            .await?;
        }

        converted
            .download_url
            .ok_or(ProviderError::MissingField("downloadURL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn progress(payload: Value) -> ProgressResponse {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_progress_threshold_reached() {
        assert_eq!(progress(json!({"progress": 3})).classify(), Probe::Ready(()));
        assert_eq!(progress(json!({"progress": 5})).classify(), Probe::Ready(()));
    }

    #[test]
    fn test_progress_below_threshold_is_pending() {
        assert_eq!(progress(json!({"progress": 2})).classify(), Probe::Pending);
        assert_eq!(progress(json!({})).classify(), Probe::Pending);
    }

    #[test]
    fn test_progress_error_flag_aborts() {
        assert_eq!(
            progress(json!({"progress": 1, "error": "capacity"})).classify(),
            Probe::Abort
        );
    }

    #[test]
    fn test_progress_error_zero_is_not_an_error() {
        assert_eq!(
            progress(json!({"progress": 1, "error": 0})).classify(),
            Probe::Pending
        );
    }
}
