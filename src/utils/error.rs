use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch: {status_text}")]
    Transport {
        status: reqwest::StatusCode,
        status_text: String,
    },

    #[error("Invalid response shape: {message}")]
    InvalidResponseShape { message: String },

    #[error("Invalid field value for key: {field}")]
    InvalidSchemaField { field: String },

    #[error("Record {record} does not match schema: {}", .issues.join("; "))]
    RecordValidation { record: String, issues: Vec<String> },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl LoaderError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidResponseShape {
            message: message.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidSchemaField {
            field: field.into(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidConfigValue { .. })
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
