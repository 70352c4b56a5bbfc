use std::path::PathBuf;

use crate::foundation::core::LayerId;

/// Convenience result type used across skinforge.
pub type SkinResult<T> = Result<T, SkinError>;

/// Top-level error taxonomy used by store, compiler and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum SkinError {
    /// Invalid user-provided or design data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation referenced a layer id that is not in the store.
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    /// A measure identifier could not be resolved or does not apply.
    #[error("measure error: {0}")]
    Measure(String),

    /// Errors while laying out the output skin directory.
    #[error("export error: {0}")]
    Export(String),

    /// A referenced font or image could not be read, probed or copied.
    #[error("asset error for '{}': {message}", path.display())]
    Asset {
        /// Offending source path.
        path: PathBuf,
        /// Human-readable cause.
        message: String,
    },

    /// Errors when serializing or deserializing design documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkinError {
    /// Build a [`SkinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SkinError::Measure`] value.
    pub fn measure(msg: impl Into<String>) -> Self {
        Self::Measure(msg.into())
    }

    /// Build a [`SkinError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`SkinError::Asset`] value.
    pub fn asset(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Asset {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Build a [`SkinError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
