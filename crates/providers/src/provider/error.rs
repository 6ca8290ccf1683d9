use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field `{0}` in response")]
    MissingField(&'static str),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("conversion job failed upstream")]
    JobFailed,
    #[error("conversion job not finished after {0} polls")]
    PollBudgetExhausted(u32),
    #[error("no mirrored hosts configured")]
    NoMirrors,
}
