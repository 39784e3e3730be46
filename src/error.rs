use std::path::PathBuf;

pub type Result<T, E = AtlasError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("Failed to open {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Table {} is missing columns: {}", .path.display(), .missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("Malformed table record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {field} value {value:?}: not a finite number")]
    InvalidCoordinate { field: &'static str, value: String },

    /// A node that was just created or resolved could not be selected again.
    #[error("Hierarchy lookup inconsistency: {0}")]
    LookupInconsistency(String),

    #[error("{0}")]
    Validation(String),
}

impl AtlasError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileAccess { .. } => "FILE_ACCESS",
            Self::Schema { .. } => "SCHEMA_MISMATCH",
            Self::Csv(_) => "MALFORMED_TABLE",
            Self::InvalidCoordinate { .. } => "INVALID_COORDINATE",
            Self::LookupInconsistency(_) => "LOOKUP_INCONSISTENCY",
            Self::Validation(_) => "VALIDATION_FAILED",
        }
    }

    /// Errors the interactive caller can fix by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidCoordinate { .. })
    }
}
