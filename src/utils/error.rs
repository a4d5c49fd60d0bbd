use crate::domain::numbering::NumberingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Letter number error: {0}")]
    NumberingError(#[from] NumberingError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Letter number {number} is already used in {year}")]
    DuplicateNumber { number: String, year: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("No letters match the export filter")]
    NothingToExport,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Backend,
    Auth,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::NumberingError(_)
            | AppError::DuplicateNumber { .. }
            | AppError::ValidationError { .. }
            | AppError::NothingToExport => ErrorCategory::Input,
            AppError::ConfigError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AppError::ApiError(_) => ErrorCategory::Network,
            AppError::BackendError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Auth
            }
            AppError::BackendError { .. }
            | AppError::NotFound { .. }
            | AppError::SerializationError(_) => ErrorCategory::Backend,
            AppError::NotAuthenticated => ErrorCategory::Auth,
            AppError::CsvError(_) | AppError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::NothingToExport => ErrorSeverity::Low,
            AppError::ApiError(_) => ErrorSeverity::Medium,
            AppError::BackendError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AppError::IoError(_) | AppError::CsvError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Next step for the user, by error kind.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::NumberingError(NumberingError::InvalidSequence { .. }) => {
                "Use a positive whole number for the sequence"
            }
            AppError::NumberingError(NumberingError::InvalidDate { .. }) => {
                "Use a date in YYYY-MM-DD format"
            }
            AppError::NumberingError(NumberingError::UnknownMonth { .. }) => {
                "Months run from 1 to 12 (I to XII)"
            }
            AppError::NumberingError(NumberingError::SequenceOutOfRange { .. }) => {
                "Sequence numbers are stored as 32-bit values; use a smaller number"
            }
            AppError::DuplicateNumber { .. } => {
                "Run `surat suggest` for the next free number or add a suffix"
            }
            AppError::NotFound { .. } => "Check the id with `surat list`",
            AppError::NotAuthenticated => "Run `surat login` first",
            AppError::NothingToExport => "Relax the export filters",
            AppError::ApiError(_) => "Check the network connection and the backend URL",
            AppError::BackendError { status, .. } if *status == 401 || *status == 403 => {
                "The session may have expired, run `surat login` again"
            }
            AppError::BackendError { .. } | AppError::SerializationError(_) => {
                "Retry later; if it persists check the backend logs"
            }
            AppError::ConfigError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. } => {
                "Check surat.toml or the SURAT_* environment variables"
            }
            AppError::ValidationError { .. } => "Fill in every required field",
            AppError::CsvError(_) | AppError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::DuplicateNumber { .. } => "Nomor surat sudah digunakan!".to_string(),
            AppError::NothingToExport => "Tidak ada data untuk di-export".to_string(),
            AppError::NotAuthenticated => "Silakan login terlebih dahulu".to_string(),
            AppError::BackendError { message, .. } => format!("Gagal: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
