use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input could not be mapped to a valid video identifier.
    #[error("input does not reference a recognizable video")]
    NoMatch,
    /// Every backend in the fallback chain came up empty.
    #[error("no conversion backend produced a link")]
    AllProvidersFailed,
    /// The single backend capable of the requested resolution came up empty.
    #[error("the conversion backend produced no link")]
    ProviderFailed,
}
