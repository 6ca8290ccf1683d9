//! Fixed-priority resolution across the conversion backends.

mod error;

pub use error::ResolveError;

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::identifier::extract_video_id;
use crate::provider::adapter::ProviderAdapter;
use crate::provider::default_client;
use crate::provider::error::ProviderError;
use crate::provider::providers::{Cnv, Y2Down, Ytmp3, Ytmp3Gg};

pub const FORMAT_MP3: &str = "mp3";
pub const FORMAT_VIDEO_360: &str = "360";

/// Resolves video references into downloadable media links by trying the
/// conversion backends in a fixed priority order, fastest first.
///
/// One instance is meant to live for the whole process: it owns the shared
/// HTTP client and the single session credential the token-gated backend
/// needs. Provider attempts within one resolution are strictly sequential;
/// concurrent resolutions only share the session credential.
pub struct Resolver {
    audio_chain: Vec<Arc<dyn ProviderAdapter>>,
    jobs: Arc<Y2Down>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_client(default_client())
    }

    pub fn with_client(client: Client) -> Self {
        let jobs = Arc::new(Y2Down::new(client.clone()));
        let audio_chain: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(Cnv::new(client.clone())),
            Arc::new(Ytmp3Gg::new(client.clone())),
            Arc::new(Ytmp3::new(client)),
            jobs.clone(),
        ];
        Self { audio_chain, jobs }
    }

    /// Resolve an audio download link for the given URL or bare identifier.
    ///
    /// A backend's internal failure is logged and treated as "no result";
    /// only the whole chain coming up empty surfaces as an error, without
    /// detail on which backends were tried or why each failed.
    pub async fn resolve_audio(&self, input: &str) -> Result<String, ResolveError> {
        let video = extract_video_id(input).ok_or(ResolveError::NoMatch)?;
        for provider in &self.audio_chain {
            match provider.resolve(&video, FORMAT_MP3).await {
                Ok(link) => {
                    info!(provider = provider.name(), video = %video, "resolved audio link");
                    return Ok(link);
                }
                Err(err) => {
                    debug!(provider = provider.name(), video = %video, error = %err, "provider yielded no result");
                }
            }
        }
        Err(ResolveError::AllProvidersFailed)
    }

    /// Resolve a video download link. Only the job backend offers video, so
    /// there is no chain to fall back through.
    pub async fn resolve_video(&self, input: &str, format: &str) -> Result<String, ResolveError> {
        let video = extract_video_id(input).ok_or(ResolveError::NoMatch)?;
        match self.jobs.resolve(&video, format).await {
            Ok(link) => {
                info!(video = %video, format, "resolved video link");
                Ok(link)
            }
            Err(err) => {
                debug!(video = %video, format, error = %err, "video provider yielded no result");
                Err(ResolveError::ProviderFailed)
            }
        }
    }

    /// Submit a conversion job to the mirrored job backend and relay its raw
    /// response.
    pub async fn submit_conversion_job(
        &self,
        format: &str,
        url: &str,
    ) -> Result<Value, ProviderError> {
        self.jobs.submit_job(format, url).await
    }

    /// Relay the raw progress payload of a previously submitted job.
    pub async fn poll_conversion_job(&self, job_id: &str) -> Result<Value, ProviderError> {
        self.jobs.poll_job(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::VideoId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INPUT: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    struct StaticProvider {
        name: &'static str,
        link: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn ok(name: &'static str, link: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                link: Some(link),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                link: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderAdapter for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _video: &VideoId, _format: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.link {
                Some(link) => Ok(link.to_owned()),
                None => Err(ProviderError::Rejected("mock failure".into())),
            }
        }
    }

    fn resolver_with_chain(chain: Vec<Arc<dyn ProviderAdapter>>) -> Resolver {
        Resolver {
            audio_chain: chain,
            jobs: Arc::new(Y2Down::new(Client::new())),
        }
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let first = StaticProvider::failing("first");
        let second = StaticProvider::failing("second");
        let third = StaticProvider::ok("third", "https://dl/third.mp3");
        let fourth = StaticProvider::ok("fourth", "https://dl/fourth.mp3");
        let resolver = resolver_with_chain(vec![
            first.clone(),
            second.clone(),
            third.clone(),
            fourth.clone(),
        ]);

        let link = resolver.resolve_audio(INPUT).await.unwrap();
        assert_eq!(link, "https://dl/third.mp3");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 1);
        assert_eq!(fourth.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_failing_is_all_providers_failed() {
        let resolver = resolver_with_chain(vec![
            StaticProvider::failing("a"),
            StaticProvider::failing("b"),
            StaticProvider::failing("c"),
            StaticProvider::failing("d"),
        ]);

        let result = resolver.resolve_audio(INPUT).await;
        assert!(matches!(result, Err(ResolveError::AllProvidersFailed)));
    }

    #[tokio::test]
    async fn test_unrecognized_input_is_no_match() {
        let provider = StaticProvider::ok("only", "https://dl/only.mp3");
        let resolver = resolver_with_chain(vec![provider.clone()]);

        let result = resolver.resolve_audio("not a video reference").await;
        assert!(matches!(result, Err(ResolveError::NoMatch)));
        // no provider consulted for unusable input
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_video_rejects_unrecognized_input() {
        let resolver = Resolver::with_client(Client::new());
        let result = resolver.resolve_video("", FORMAT_VIDEO_360).await;
        assert!(matches!(result, Err(ResolveError::NoMatch)));
    }
}
