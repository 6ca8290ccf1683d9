//! Bounded polling for job-style backends.

use std::future::Future;
use std::time::Duration;

use super::error::ProviderError;

/// Outcome of one poll probe.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Probe<T> {
    /// Not terminal yet; sleep and probe again.
    Pending,
    /// Terminal success.
    Ready(T),
    /// Terminal, but without a result; stop regardless of remaining budget.
    Abort,
}

/// Probe up to `attempts` times, sleeping `interval` between probes.
///
/// `Ok(None)` means the probe aborted or the attempt budget ran out without
/// reaching a terminal state; probe errors propagate immediately.
pub(crate) async fn poll_until<T, F, Fut>(
    attempts: u32,
    interval: Duration,
    mut probe: F,
) -> Result<Option<T>, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Probe<T>, ProviderError>>,
{
    for attempt in 0..attempts {
        match probe(attempt).await? {
            Probe::Ready(value) => return Ok(Some(value)),
            Probe::Abort => return Ok(None),
            Probe::Pending => {}
        }
        tokio::time::sleep(interval).await;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_nth_probe() {
        let result = poll_until(30, INTERVAL, |attempt| async move {
            if attempt == 4 {
                Ok(Probe::Ready("https://cdn.example/file.mp3"))
            } else {
                Ok(Probe::Pending)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, Some("https://cdn.example/file.mp3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_stops_early() {
        let mut probes = 0u32;
        let result: Option<()> = poll_until(30, INTERVAL, |_| {
            probes += 1;
            async move { Ok(Probe::Abort) }
        })
        .await
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(probes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_yields_none() {
        let mut probes = 0u32;
        let result: Option<()> = poll_until(30, INTERVAL, |_| {
            probes += 1;
            async move { Ok(Probe::Pending) }
        })
        .await
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(probes, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_propagates() {
        let result: Result<Option<()>, _> = poll_until(30, INTERVAL, |_| async move {
            Err(ProviderError::JobFailed)
        })
        .await;
        assert!(matches!(result, Err(ProviderError::JobFailed)));
    }
}
