// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineResolverError {
    #[error("addr2line failed to resolve lines")]
    ResolveFailed,
    #[error("failed to run addr2line: {0}")]
    SpawnFailed(#[from] std::io::Error),
    #[error("addr2line produced malformed output: {0}")]
    MalformedOutput(String),
}
