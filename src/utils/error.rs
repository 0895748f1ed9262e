use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

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

    #[error("Language model error: {message}")]
    ModelError { message: String },

    #[error("Execution error: {message}")]
    ExecutionError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Tracking failed after {attempts} attempt(s): {reason}")]
    TrackingFailed { attempts: u32, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    Model,
    Execution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackError::ApiError(_) => ErrorCategory::Network,
            TrackError::IoError(_) => ErrorCategory::Storage,
            TrackError::SerializationError(_) | TrackError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            TrackError::UrlError(_)
            | TrackError::ConfigError { .. }
            | TrackError::MissingConfigError { .. }
            | TrackError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TrackError::ModelError { .. } => ErrorCategory::Model,
            TrackError::ExecutionError { .. } | TrackError::TrackingFailed { .. } => {
                ErrorCategory::Execution
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 模型失敗只會觸發 fallback
            TrackError::ModelError { .. } => ErrorSeverity::Low,
            TrackError::ApiError(_) => ErrorSeverity::Medium,
            TrackError::SerializationError(_)
            | TrackError::ValidationError { .. }
            | TrackError::ExecutionError { .. }
            | TrackError::TrackingFailed { .. } => ErrorSeverity::High,
            TrackError::IoError(_)
            | TrackError::UrlError(_)
            | TrackError::ConfigError { .. }
            | TrackError::MissingConfigError { .. }
            | TrackError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TrackError::ApiError(_) => {
                "Check network connectivity and that POSTNL_BASE_URL is reachable".to_string()
            }
            TrackError::IoError(_) => {
                "Check that the artifacts directory is writable".to_string()
            }
            TrackError::SerializationError(_) | TrackError::ValidationError { .. } => {
                "Inspect artifacts/last_output.txt for the raw client output".to_string()
            }
            TrackError::UrlError(_) | TrackError::InvalidConfigValueError { .. } => {
                "Fix the offending environment variable and run again".to_string()
            }
            TrackError::MissingConfigError { field } => {
                format!("Export {} before running", field)
            }
            TrackError::ConfigError { .. } => "Review the configuration".to_string(),
            TrackError::ModelError { .. } => {
                "Unset OPENAI_API_KEY to use the built-in client directly".to_string()
            }
            TrackError::ExecutionError { .. } => {
                "Make sure the script interpreter is installed (see --interpreter)".to_string()
            }
            TrackError::TrackingFailed { .. } => {
                "Verify the reference and credentials; see artifacts/attempts_log.json"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the service: {}", self),
            ErrorCategory::Storage => format!("Could not write artifacts: {}", self),
            ErrorCategory::Data => format!("Unexpected response: {}", self),
            ErrorCategory::Model => format!("Code generation unavailable: {}", self),
            ErrorCategory::Execution => format!("Tracking request failed: {}", self),
        }
    }

    /// 依嚴重程度決定 process 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
