//! Error types shared by the AgentGV crates

use std::path::PathBuf;
use thiserror::Error;

/// AgentGV errors
#[derive(Debug, Error)]
pub enum AgentGvError {
    /// A required catalog, stats or config file is missing
    #[error("Configuration not found at: {}", path.display())]
    ConfigNotFound {
        /// Expected location
        path: PathBuf,
    },

    /// A configuration file exists but could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The caller passed an unusable task description or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two catalog skills share an id
    #[error("Duplicate skill id '{id}' in categories '{first}' and '{second}'")]
    DuplicateSkillId {
        /// Conflicting id
        id: String,
        /// Category holding the first occurrence
        first: String,
        /// Category holding the second occurrence
        second: String,
    },

    /// Unknown preference mode name
    #[error("Invalid preference mode '{0}'. Valid options: quality_priority, balanced, cost_saving")]
    InvalidPreference(String),

    /// Filesystem error with the path it happened on
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error outside of file parsing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentGvError {
    pub fn parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ConfigParse { .. } => "PARSE_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::DuplicateSkillId { .. } => "DUPLICATE_SKILL_ID",
            Self::InvalidPreference(_) => "INVALID_PREFERENCE",
            Self::Io { .. } => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether the caller can retry with different input instead of fixing the environment
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidPreference(_))
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, AgentGvError>;
