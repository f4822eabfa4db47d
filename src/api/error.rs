//! Adapter error types
//!
//! Transport failures, bad status codes and `error` fields embedded in a
//! successful body all end up as one `ApiError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not reach the FlavoursVerse API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("FlavoursVerse API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("No {what} found for \"{ingredient}\"")]
    NotFound { what: &'static str, ingredient: String },

    /// Message supplied by the server in an `error` field, kept verbatim
    #[error("{0}")]
    Server(String),

    #[error("Unexpected response from the FlavoursVerse API: {0}")]
    Decode(String),
}

/// Result type for adapter operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// True when the server answered but reported the failure itself
    pub fn is_semantic(&self) -> bool {
        matches!(self, ApiError::NotFound { .. } | ApiError::Server(_))
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let not_found = ApiError::NotFound { what: "flavor data", ingredient: "unobtainium".into() };
        assert_eq!(not_found.user_message(), "No flavor data found for \"unobtainium\"");
        assert!(not_found.is_semantic());

        let server = ApiError::Server("Ingredient name is required".into());
        assert_eq!(server.user_message(), "Ingredient name is required");

        let status = ApiError::Status { status: 502, message: "Bad Gateway".into() };
        assert!(!status.is_semantic());
        assert!(status.user_message().contains("502"));
    }
}
