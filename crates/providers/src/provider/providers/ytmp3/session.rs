//! Session credential for the ytmp3.as backend.
//!
//! The backend gates its init endpoint behind a short-lived token that its
//! landing page embeds as an obfuscated JSON array: a code sequence keyed
//! against a second sequence read in reverse, an optional reversal flag and
//! the character code of the query-parameter name to send the token under.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::adapter::ProviderClient;
use crate::provider::configs::ytmp3_as::BOOTSTRAP_URL;

const STALENESS_WINDOW: Duration = Duration::from_secs(3600);
const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_TOKEN_LEN: usize = 32;

/// Credential shipped with the engine, used until the first refresh lands.
const BOOTSTRAP_AUTH: &str = "F1HY0PEK41OoQsZbEJsXSPVVuDBwkJV5";
const BOOTSTRAP_PARAM: char = 'e';

/// Locates the session descriptor the landing page embeds in its markup.
static DESCRIPTOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var json = JSON\.parse\('([^']+)'\);").unwrap());

// Descriptor array layout, as observed upstream. Later indices carry other
// provider-internal fields this engine does not consume.
const IDX_CODES: usize = 0;
const IDX_REVERSE: usize = 1;
const IDX_KEY: usize = 2;
const IDX_PARAM: usize = 6;

#[derive(Debug, Error)]
pub(crate) enum SessionParseError {
    #[error("descriptor marker not found in markup")]
    MarkerMissing,
    #[error("descriptor is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("descriptor layout unexpected: {0}")]
    Layout(&'static str),
    #[error("derived character code out of range: {0}")]
    CodeRange(i64),
}

/// Auth token plus the query-parameter name it must be sent under.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub auth_token: String,
    pub param_name: char,
    refreshed_at: Option<Instant>,
}

impl SessionCredential {
    fn bootstrap() -> Self {
        Self {
            auth_token: BOOTSTRAP_AUTH.to_owned(),
            param_name: BOOTSTRAP_PARAM,
            refreshed_at: None,
        }
    }
}

/// Process-wide owner of the single [`SessionCredential`].
///
/// Reads and writes go through the lock, but a refresh is not serialized
/// against concurrent resolutions: two stale callers may both fetch the
/// bootstrap page and the last writer wins. A spurious extra refresh is
/// cheaper than holding a lock across the network call.
pub struct SessionManager {
    credential: RwLock<SessionCredential>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            credential: RwLock::new(SessionCredential::bootstrap()),
        }
    }

    /// Snapshot of the current credential.
    pub fn credential(&self) -> SessionCredential {
        self.credential.read().clone()
    }

    fn is_fresh(&self) -> bool {
        self.credential
            .read()
            .refreshed_at
            .is_some_and(|at| at.elapsed() < STALENESS_WINDOW)
    }

    /// Refresh the credential from the bootstrap page when stale; a no-op
    /// inside the staleness window.
    ///
    /// Refresh failures keep the previous credential however stale it is:
    /// an expired token merely makes the downstream provider call fail,
    /// which the fallback chain absorbs. The failed attempt is not recorded,
    /// so the next call retries.
    pub async fn ensure_fresh(&self, client: &ProviderClient) {
        if self.is_fresh() {
            return;
        }
        let markup = match self.fetch_bootstrap(client).await {
            Ok(markup) => markup,
            Err(err) => {
                warn!(error = %err, "session bootstrap fetch failed; keeping previous credential");
                return;
            }
        };
        match parse_session_descriptor(&markup) {
            Ok((auth_token, param_name)) => {
                let mut credential = self.credential.write();
                credential.auth_token = auth_token;
                credential.param_name = param_name;
                credential.refreshed_at = Some(Instant::now());
                debug!(param = %param_name, "session credential refreshed");
            }
            Err(err) => {
                warn!(error = %err, "session descriptor unusable; keeping previous credential");
            }
        }
    }

    async fn fetch_bootstrap(&self, client: &ProviderClient) -> Result<String, reqwest::Error> {
        client
            .get(BOOTSTRAP_URL, BOOTSTRAP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    #[cfg(test)]
    fn mark_refreshed(&self) {
        self.credential.write().refreshed_at = Some(Instant::now());
    }
}

/// Extract and decode the session descriptor from the bootstrap markup.
pub(crate) fn parse_session_descriptor(
    markup: &str,
) -> Result<(String, char), SessionParseError> {
    let raw = DESCRIPTOR_REGEX
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .ok_or(SessionParseError::MarkerMissing)?;
    let descriptor: Vec<Value> = serde_json::from_str(raw.as_str())?;

    let codes = int_sequence(&descriptor, IDX_CODES, "code sequence")?;
    let reverse = crate::provider::utils::is_truthy(descriptor.get(IDX_REVERSE));
    let key = int_sequence(&descriptor, IDX_KEY, "key sequence")?;
    let param_code = descriptor
        .get(IDX_PARAM)
        .and_then(Value::as_i64)
        .ok_or(SessionParseError::Layout("parameter char code"))?;

    let auth_token = derive_token(&codes, &key, reverse)?;
    let param_name = char_from_code(param_code)?;
    Ok((auth_token, param_name))
}

/// Decode the token: each code pairs positionally with the key sequence
/// read in reverse order, the difference being the plaintext char code.
fn derive_token(codes: &[i64], key: &[i64], reverse: bool) -> Result<String, SessionParseError> {
    if key.len() < codes.len() {
        return Err(SessionParseError::Layout("key shorter than code sequence"));
    }
    let mut plain = String::with_capacity(codes.len());
    for (i, code) in codes.iter().enumerate() {
        plain.push(char_from_code(code - key[key.len() - 1 - i])?);
    }
    if reverse {
        plain = plain.chars().rev().collect();
    }
    if plain.chars().count() > MAX_TOKEN_LEN {
        plain = plain.chars().take(MAX_TOKEN_LEN).collect();
    }
    Ok(plain)
}

fn char_from_code(code: i64) -> Result<char, SessionParseError> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or(SessionParseError::CodeRange(code))
}

fn int_sequence(
    descriptor: &[Value],
    index: usize,
    what: &'static str,
) -> Result<Vec<i64>, SessionParseError> {
    descriptor
        .get(index)
        .and_then(Value::as_array)
        .ok_or(SessionParseError::Layout(what))?
        .iter()
        .map(|v| v.as_i64().ok_or(SessionParseError::Layout(what)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::default_client;

    #[test]
    fn test_derivation_is_deterministic() {
        // char(c[i] - k[k.len - 1 - i]) concatenated in original order
        let token = derive_token(&[101, 102, 103], &[1, 1, 1], false).unwrap();
        assert_eq!(token, "def");
        assert_eq!(derive_token(&[101, 102, 103], &[1, 1, 1], false).unwrap(), token);
    }

    #[test]
    fn test_derivation_reads_key_in_reverse() {
        // k[2]=0 pairs with c[0], k[0]=5 with c[2]
        let token = derive_token(&[101, 102, 103], &[5, 0, 0], false).unwrap();
        assert_eq!(token, "efb");
    }

    #[test]
    fn test_reversal_flag_reverses_plaintext() {
        let token = derive_token(&[101, 102, 103], &[1, 1, 1], true).unwrap();
        assert_eq!(token, "fed");
    }

    #[test]
    fn test_token_truncated_to_limit() {
        let codes = vec![98; 40];
        let key = vec![1; 40];
        let token = derive_token(&codes, &key, false).unwrap();
        assert_eq!(token.len(), MAX_TOKEN_LEN);
        assert!(token.chars().all(|c| c == 'a'));
    }

    #[test]
    fn test_derivation_rejects_short_key() {
        let result = derive_token(&[101, 102, 103], &[1], false);
        assert!(matches!(result, Err(SessionParseError::Layout(_))));
    }

    #[test]
    fn test_parse_descriptor_from_markup() {
        let markup = r#"<script>var json = JSON.parse('[[101,102,103],0,[1,1,1],null,null,null,101]');</script>"#;
        let (token, param) = parse_session_descriptor(markup).unwrap();
        assert_eq!(token, "def");
        assert_eq!(param, 'e');
    }

    #[test]
    fn test_parse_descriptor_honors_reverse_flag() {
        let markup = r#"var json = JSON.parse('[[101,102,103],1,[1,1,1],null,null,null,102]');"#;
        let (token, param) = parse_session_descriptor(markup).unwrap();
        assert_eq!(token, "fed");
        assert_eq!(param, 'f');
    }

    #[test]
    fn test_parse_descriptor_marker_missing() {
        let result = parse_session_descriptor("<html><body>nothing here</body></html>");
        assert!(matches!(result, Err(SessionParseError::MarkerMissing)));
    }

    #[test]
    fn test_parse_descriptor_garbage_json() {
        let result = parse_session_descriptor(r#"var json = JSON.parse('{broken');"#);
        assert!(matches!(result, Err(SessionParseError::Json(_))));
    }

    #[test]
    fn test_bootstrap_credential_is_stale() {
        let manager = SessionManager::new();
        assert!(!manager.is_fresh());
        let credential = manager.credential();
        assert_eq!(credential.auth_token, BOOTSTRAP_AUTH);
        assert_eq!(credential.param_name, BOOTSTRAP_PARAM);
    }

    #[tokio::test]
    async fn test_ensure_fresh_is_noop_inside_window() {
        let manager = SessionManager::new();
        manager.mark_refreshed();
        assert!(manager.is_fresh());

        // Fresh credential short-circuits before any network request.
        let client = ProviderClient::new(default_client());
        manager.ensure_fresh(&client).await;
        assert_eq!(manager.credential().auth_token, BOOTSTRAP_AUTH);
    }
}
