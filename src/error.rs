//! Error types for accessibility evaluation.

use thiserror::Error;

use crate::models::Category;

#[derive(Debug, Error)]
pub enum AccessError {
    // Request errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sport facility with id={id} not found")]
    NotFound { id: i64 },

    // Reference data degraded
    #[error("Collection '{category}' has no features")]
    EmptyCollection { category: Category },

    // Model errors
    #[error("Model input mismatch: {reason}")]
    ModelInputMismatch { reason: String },

    // Dataset errors
    #[error("Duplicate feature id {id} in collection '{category}'")]
    DuplicateFeatureId { id: i64, category: Category },

    #[error("Unsupported CRS {crs} in {source_name}")]
    UnsupportedCrs { crs: String, source_name: String },

    #[error("Dataset error in {source_name}: {reason}")]
    Dataset { source_name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessError {
    pub fn model_mismatch(reason: impl Into<String>) -> Self {
        Self::ModelInputMismatch {
            reason: reason.into(),
        }
    }

    pub fn dataset(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Dataset {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;
