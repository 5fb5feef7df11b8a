use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error in '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Failed to decode {entity}: {reason}")]
    DecodeError { entity: String, reason: String },

    #[error("Order rejected by server: {}", format_field_errors(.fields))]
    OrderRejected { fields: BTreeMap<String, Vec<String>> },

    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("Session expired, sign in again")]
    SessionExpired,
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Validation,
    Authorization,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Recoverable by the user without leaving the flow (bad input).
    Low,
    /// Worth retrying (connectivity, transient server trouble).
    Medium,
    /// The operation failed and retrying as-is will not help.
    High,
    /// Local environment is broken (storage, configuration).
    Critical,
}

impl QuoteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuoteError::ApiError(_) => ErrorCategory::Network,
            QuoteError::IoError(_) => ErrorCategory::Storage,
            QuoteError::SerializationError(_) | QuoteError::DecodeError { .. } => {
                ErrorCategory::Server
            }
            QuoteError::UrlError(_)
            | QuoteError::ConfigValidationError { .. }
            | QuoteError::MissingConfigError { .. }
            | QuoteError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            QuoteError::ValidationError { .. } | QuoteError::OrderRejected { .. } => {
                ErrorCategory::Validation
            }
            QuoteError::UnexpectedStatus { .. } => ErrorCategory::Server,
            QuoteError::SessionExpired => ErrorCategory::Authorization,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Authorization => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            QuoteError::ApiError(_) => {
                "Нет ответа от сервера. Проверьте подключение к интернету.".to_string()
            }
            QuoteError::OrderRejected { .. } => format!("{}", self),
            QuoteError::ValidationError { message, .. } => message.clone(),
            QuoteError::SessionExpired => {
                "Сессия истекла. Войдите в аккаунт заново.".to_string()
            }
            other => format!("{}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity and retry the command",
            ErrorCategory::Storage => "Check that the storage directory is writable",
            ErrorCategory::Configuration => "Fix the settings file or environment variables",
            ErrorCategory::Validation => "Correct the highlighted fields and try again",
            ErrorCategory::Authorization => "Run `renoquote login` to obtain a new session",
            ErrorCategory::Server => "The API returned something unexpected; retry later",
        }
    }
}

fn format_field_errors(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_rejection_lists_every_field() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "phone".to_string(),
            vec!["This field is required.".to_string()],
        );
        fields.insert(
            "end_date".to_string(),
            vec!["Must be after start_date.".to_string()],
        );
        let err = QuoteError::OrderRejected { fields };
        let rendered = format!("{}", err);
        assert!(rendered.contains("phone: This field is required."));
        assert!(rendered.contains("end_date: Must be after start_date."));
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn session_expiry_maps_to_authorization() {
        let err = QuoteError::SessionExpired;
        assert_eq!(err.category(), ErrorCategory::Authorization);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
