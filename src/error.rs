//! Error taxonomy for census aggregation.
//!
//! Collaborator failures (source open/scan/release) arrive as opaque
//! [`anyhow::Error`] values and are wrapped here with the offending region
//! attached, so a multi-region caller always learns which partition broke.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CensusError>;

/// Everything that can go wrong while computing top ages.
#[derive(Debug, Error)]
pub enum CensusError {
    /// Caller contract violation on the multi-region entry point.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The factory could not produce a source for this region.
    #[error("failed to open age source for region {region:?}")]
    SourceOpen {
        region: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source failed while being drained.
    #[error("scan of region {region:?} failed")]
    SourceScan {
        region: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source failed to release after a clean scan.
    #[error("age source for region {region:?} was not released")]
    SourceRelease {
        region: String,
        #[source]
        source: anyhow::Error,
    },

    /// The scoped worker pool could not be constructed.
    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl CensusError {
    /// The region a source-flavored error originated from, if any.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::SourceOpen { region, .. }
            | Self::SourceScan { region, .. }
            | Self::SourceRelease { region, .. } => Some(region),
            Self::InvalidArgument(_) | Self::WorkerPool(_) => None,
        }
    }
}
