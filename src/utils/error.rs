use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProximityError {
    #[error("Invalid input for {field}: {value} ({reason})")]
    InputError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Configuration,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ProximityError {
    pub fn input(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        ProximityError::InputError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ProximityError::StorageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProximityError::InputError { .. } => ErrorCategory::Input,
            ProximityError::StorageError { .. } => ErrorCategory::Storage,
            ProximityError::SerializationError(_) => ErrorCategory::Serialization,
            ProximityError::ConfigError { .. }
            | ProximityError::ConfigValidationError { .. }
            | ProximityError::InvalidConfigValueError { .. }
            | ProximityError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Serialization => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Storage
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProximityError::InputError { .. } => {
                "Latitude must be within [-90, 90], longitude within [-180, 180] and the radius a non-negative number of miles"
            }
            ProximityError::StorageError { .. } => {
                "Check that the point store is reachable and retry the search"
            }
            ProximityError::SerializationError(_) => {
                "The point store returned data that could not be encoded; inspect the stored records"
            }
            ProximityError::MissingConfigError { .. } => {
                "Provide the missing setting on the command line, in the TOML file or via the environment"
            }
            ProximityError::ConfigError { .. }
            | ProximityError::ConfigValidationError { .. }
            | ProximityError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line arguments"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProximityError::InputError { field, reason, .. } => {
                format!("The search parameter '{}' is invalid: {}", field, reason)
            }
            ProximityError::StorageError { .. } => {
                format!("The point store could not be queried ({})", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProximityError>;
