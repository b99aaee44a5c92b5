// src/error.rs

//! Crate-level error type
//!
//! Module errors are wrapped with the pipeline stage that produced them so
//! a failed evaluation can say whether feature extraction, format
//! inspection, or catalog loading went wrong.

use crate::catalog::CatalogError;
use crate::features::ExtractionError;
use crate::format::InspectionError;
use std::fmt;
use thiserror::Error;

/// Stage of an image evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Catalog,
    FeatureExtraction,
    FormatInspection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog loading"),
            Self::FeatureExtraction => write!(f, "feature extraction"),
            Self::FormatInspection => write!(f, "format inspection"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{stage}: {0}", stage = Stage::Catalog)]
    CatalogValidation(#[from] CatalogError),

    #[error("{stage}: {0}", stage = Stage::FeatureExtraction)]
    FeatureExtraction(#[from] ExtractionError),

    #[error("{stage}: {0}", stage = Stage::FormatInspection)]
    FormatInspectionFailed(#[from] InspectionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stage that failed, when the error came from one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::CatalogValidation(_) => Some(Stage::Catalog),
            Self::FeatureExtraction(_) => Some(Stage::FeatureExtraction),
            Self::FormatInspectionFailed(_) => Some(Stage::FormatInspection),
            Self::Json(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_in_message() {
        let err = Error::from(InspectionError::Malformed("no format".to_string()));
        assert_eq!(err.stage(), Some(Stage::FormatInspection));
        assert_eq!(err.to_string(), "format inspection: malformed inspector output: no format");
    }

    #[test]
    fn test_extraction_stage() {
        let err = Error::from(ExtractionError::PartitionTable("no volume system".to_string()));
        assert_eq!(err.stage(), Some(Stage::FeatureExtraction));
        assert!(err.to_string().starts_with("feature extraction:"));
    }
}
