// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("failed to open annotation file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse annotation file: {0}")]
    Malformed(#[from] serde_yaml::Error),
    #[error("annotation file is not a mapping at its top level")]
    NotAMapping,
}
