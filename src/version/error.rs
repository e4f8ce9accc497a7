use std::path::PathBuf;

use thiserror::Error;

/// Conditions that make a detection call meaningless.
///
/// Ordinary "could not detect" outcomes are never reported through this
/// type; they end up in [`DetectionResult::errors`](crate::version::types::DetectionResult).
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Project root is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Project root is not readable: {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
