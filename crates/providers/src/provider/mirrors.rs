//! Failover across mirrored backend hosts.

use std::future::Future;

use tracing::debug;

use super::error::ProviderError;

/// Run `op` against each host in order and return the first success.
///
/// When every host fails, the last observed error is propagated as the
/// aggregate outcome of the attempt.
pub(crate) async fn try_each_host<T, F, Fut>(
    hosts: &[&'static str],
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_err = None;
    for &host in hosts {
        match op(host).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!(host, error = %err, "mirrored host failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or(ProviderError::NoMirrors))
}
