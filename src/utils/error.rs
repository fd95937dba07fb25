use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Blob fetch failed: {0}")]
    FetchError(String),

    #[error("Artifact extraction failed: {0}")]
    ExtractionError(String),

    #[error("Classification failed: {0}")]
    ClassificationError(String),

    #[error("Persistence operation failed: {0}")]
    PersistenceError(String),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required field '{field}'")]
    MissingFieldError { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Media,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Degradations the pipeline already recovered from; logged only.
    Low,
    /// Bad input; the caller can fix the submission and retry.
    Medium,
    /// A collaborator call or local IO failed.
    High,
    /// The process cannot run until its configuration is repaired.
    Critical,
}

impl TriageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriageError::FetchError(_)
            | TriageError::ApiError(_)
            | TriageError::PersistenceError(_) => ErrorCategory::Network,
            TriageError::ExtractionError(_) | TriageError::ClassificationError(_) => {
                ErrorCategory::Media
            }
            TriageError::MissingFieldError { .. } | TriageError::InvalidValueError { .. } => {
                ErrorCategory::Validation
            }
            TriageError::ConfigError { .. } => ErrorCategory::Configuration,
            TriageError::IoError(_) | TriageError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TriageError::FetchError(_)
            | TriageError::ExtractionError(_)
            | TriageError::ClassificationError(_) => ErrorSeverity::Low,
            TriageError::MissingFieldError { .. } | TriageError::InvalidValueError { .. } => {
                ErrorSeverity::Medium
            }
            TriageError::PersistenceError(_)
            | TriageError::ApiError(_)
            | TriageError::IoError(_)
            | TriageError::SerializationError(_) => ErrorSeverity::High,
            TriageError::ConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TriageError::FetchError(_) => {
                "Check that the file reference points to an existing object and the storage credentials are valid"
            }
            TriageError::ExtractionError(_) => {
                "Check that the media file is decodable and the extraction tools (ffmpeg, whisper) are installed"
            }
            TriageError::ClassificationError(_) => {
                "Check the vision model endpoint and API key; the issue was still recorded with default category"
            }
            TriageError::PersistenceError(_) => {
                "Check the persistence endpoint, service key and table name, then resubmit"
            }
            TriageError::ApiError(_) => "Check network connectivity and the collaborator endpoints",
            TriageError::IoError(_) => "Check file paths and disk space",
            TriageError::SerializationError(_) => "Check that the submission file contains valid JSON",
            TriageError::ConfigError { .. } => {
                "Review the configuration file and environment variables (SUPABASE_URL, SUPABASE_KEY, GEMINI_API_KEY)"
            }
            TriageError::MissingFieldError { .. } => {
                "Provide the missing field in the submission and retry"
            }
            TriageError::InvalidValueError { .. } => "Correct the reported field and retry",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TriageError::MissingFieldError { field } => {
                format!("Submission rejected: '{}' is required", field)
            }
            TriageError::InvalidValueError { field, reason, .. } => {
                format!("Submission rejected: {} ({})", field, reason)
            }
            TriageError::ConfigError { message } => format!("Configuration problem: {}", message),
            TriageError::PersistenceError(detail) => {
                format!("The issue could not be stored: {}", detail)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
