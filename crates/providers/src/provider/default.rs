use std::time::Duration;

use reqwest::Client;

/// Browser identity the conversion backends expect; they reject obvious
/// non-browser clients.
pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client-wide ceiling; every provider call sets its own tighter timeout.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn default_client() -> Client {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}
