//! Resolution of public video references into downloadable media links.
//!
//! None of the upstream conversion backends offer a stable contract, so the
//! engine leans on redundancy instead: several independent providers are
//! tried in a fixed priority order, one of them across mirrored hostnames,
//! and the token-gated one behind a periodically re-derived session
//! credential.

pub mod identifier;
pub mod provider;
pub mod resolver;

pub use identifier::{VideoId, extract_video_id};
pub use resolver::{ResolveError, Resolver};
