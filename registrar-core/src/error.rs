//! Error types for Registrar operations

use thiserror::Error;

/// Failures reported by a record gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Malformed response: {reason}")]
    Decode { reason: String },

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Response carried no data")]
    MissingData,
}

impl GatewayError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Message suitable for showing in place of the affected region.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { status, message } if message.trim().is_empty() => {
                format!("Request rejected ({status})")
            }
            GatewayError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Form workflow errors. None of these close the form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("No form is open")]
    Closed,

    #[error("Submission blocked: {reason}")]
    Blocked { reason: String },

    #[error("Fill in: {}", .titles.join(", "))]
    MissingRequired { titles: Vec<String> },

    #[error("No data to save")]
    EmptyPayload,

    #[error("No changes to save")]
    NoChanges,

    #[error("Nothing awaits confirmation")]
    NoConfirmation,

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

/// Route registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown route: {name}")]
    UnknownRoute { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_lists_titles() {
        let err = FormError::MissingRequired {
            titles: vec!["Name".to_string(), "Code".to_string()],
        };
        assert_eq!(err.to_string(), "Fill in: Name, Code");
    }

    #[test]
    fn test_rejected_user_message_prefers_server_text() {
        let err = GatewayError::rejected(500, "duplicate key");
        assert_eq!(err.user_message(), "duplicate key");
    }

    #[test]
    fn test_rejected_without_message_shows_only_status() {
        assert_eq!(
            GatewayError::rejected(404, "").user_message(),
            "Request rejected (404)"
        );
        assert_eq!(
            GatewayError::rejected(502, "  ").user_message(),
            "Request rejected (502)"
        );
    }

    #[test]
    fn test_gateway_error_converts_into_form_error() {
        let err: FormError = GatewayError::Timeout { ms: 5000 }.into();
        assert_eq!(err.to_string(), "Request timed out after 5000ms");
    }
}
