//! loader.to-family job backend, mirrored across equivalent hostnames.
//!
//! The only backend in the chain that converts video as well as audio, and
//! the only asynchronous one: a submission call yields a job id which is
//! then polled until a terminal state or the attempt budget runs out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::identifier::VideoId;
use crate::provider::adapter::{ProviderAdapter, ProviderClient};
use crate::provider::configs::y2down::{API_KEY, HOSTS, PROGRESS_PATH, REFERER, SUBMIT_PATH};
use crate::provider::error::ProviderError;
use crate::provider::mirrors::try_each_host;
use crate::provider::polling::{Probe, poll_until};

const CALL_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: u32 = 30;

/// Progress snapshot of a conversion job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub success: Option<i64>,
    pub text: Option<String>,
    pub download_url: Option<String>,
}

impl JobStatus {
    /// Terminal-success link: present only when the backend reports the job
    /// finished (numeric flag or textual status) AND a download URL exists.
    fn completed_url(&self) -> Option<&str> {
        let finished = self.success == Some(1) || self.text.as_deref() == Some("Finished");
        if !finished {
            return None;
        }
        self.download_url.as_deref().filter(|url| !url.is_empty())
    }

    fn is_error(&self) -> bool {
        self.text.as_deref() == Some("Error")
    }

    fn classify(&self) -> Result<Probe<String>, ProviderError> {
        if let Some(url) = self.completed_url() {
            return Ok(Probe::Ready(url.to_owned()));
        }
        if self.is_error() {
            return Err(ProviderError::JobFailed);
        }
        Ok(Probe::Pending)
    }
}

fn job_id_of(submission: &Value) -> Option<String> {
    match submission.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub struct Y2Down {
    client: ProviderClient,
}

impl Y2Down {
    pub fn new(client: Client) -> Self {
        let mut client = ProviderClient::new(client);
        client.set_referer_static(REFERER);
        Self { client }
    }

    /// Submit a conversion job; returns the raw submission payload.
    pub async fn submit_job(&self, format: &str, url: &str) -> Result<Value, ProviderError> {
        self.call(
            SUBMIT_PATH,
            &[("copyright", "0"), ("format", format), ("url", url)],
        )
        .await
    }

    /// Fetch the raw progress payload of a previously submitted job.
    pub async fn poll_job(&self, job_id: &str) -> Result<Value, ProviderError> {
        self.call(PROGRESS_PATH, &[("id", job_id)]).await
    }

    /// Issue one backend call, failing over across the mirrored hosts.
    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        try_each_host(HOSTS, |host| {
            let url = format!("https://{host}{path}");
            async move {
                let response = self
                    .client
                    .get(&url, CALL_TIMEOUT)
                    .query(params)
                    .query(&[("api", API_KEY)])
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json().await?)
            }
        })
        .await
    }
}

#[async_trait]
impl ProviderAdapter for Y2Down {
    fn name(&self) -> &'static str {
        "y2down"
    }

    async fn resolve(&self, video: &VideoId, format: &str) -> Result<String, ProviderError> {
        let submission = self.submit_job(format, &video.watch_url()).await?;
        let job_id = job_id_of(&submission).ok_or(ProviderError::MissingField("id"))?;
        debug!(video = %video, job_id = %job_id, format, "conversion job submitted");

        let link = poll_until(MAX_POLLS, POLL_INTERVAL, |_| {
            let job_id = job_id.clone();
            async move {
                let status: JobStatus = serde_json::from_value(self.poll_job(&job_id).await?)?;
                status.classify()
            }
        })
        .await?;

        link.ok_or(ProviderError::PollBudgetExhausted(MAX_POLLS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(payload: Value) -> JobStatus {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_finished_text_with_url_is_ready() {
        let probe = status(json!({"text": "Finished", "download_url": "https://dl/a.mp3"}))
            .classify()
            .unwrap();
        assert_eq!(probe, Probe::Ready("https://dl/a.mp3".to_owned()));
    }

    #[test]
    fn test_numeric_success_with_url_is_ready() {
        let probe = status(json!({"success": 1, "download_url": "https://dl/a.mp3"}))
            .classify()
            .unwrap();
        assert_eq!(probe, Probe::Ready("https://dl/a.mp3".to_owned()));
    }

    #[test]
    fn test_finished_without_url_keeps_polling() {
        let probe = status(json!({"text": "Finished"})).classify().unwrap();
        assert_eq!(probe, Probe::Pending);
    }

    #[test]
    fn test_error_text_aborts() {
        let result = status(json!({"text": "Error"})).classify();
        assert!(matches!(result, Err(ProviderError::JobFailed)));
    }

    #[test]
    fn test_in_progress_is_pending() {
        let probe = status(json!({"success": 0, "text": "Converting"}))
            .classify()
            .unwrap();
        assert_eq!(probe, Probe::Pending);
    }

    #[test]
    fn test_job_id_accepts_string_or_number() {
        assert_eq!(job_id_of(&json!({"id": "abc123"})).as_deref(), Some("abc123"));
        assert_eq!(job_id_of(&json!({"id": 42})).as_deref(), Some("42"));
        assert_eq!(job_id_of(&json!({"id": ""})), None);
        assert_eq!(job_id_of(&json!({})), None);
    }
}
