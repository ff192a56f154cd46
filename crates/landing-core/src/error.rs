//! # Payment Error Types
//!
//! Typed error handling for the landing-checkout flow.
//! All fallible operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Price is zero, negative or otherwise unusable
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Currency not accepted by the checkout widget
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// Integrity signature could not be derived
    #[error("Signature derivation failed: {0}")]
    SignatureDerivation(String),

    /// Launch attempted before the fingerprint for the reference was ready
    #[error("Checkout launch disabled for reference {reference}: {reason}")]
    LaunchDisabled { reference: String, reason: String },

    /// Widget callback payload could not be parsed
    #[error("Callback parse error: {0}")]
    CallbackParseError(String),

    /// Downstream provider API error (subscriber list, pixel)
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Rate limited by provider
    #[error("Rate limited by {provider}, retry after {retry_after_secs} seconds")]
    RateLimited {
        provider: String,
        retry_after_secs: u64,
    },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidPrice { .. } => 400,
            PaymentError::UnsupportedCurrency { .. } => 400,
            PaymentError::SignatureDerivation(_) => 422,
            PaymentError::LaunchDisabled { .. } => 409,
            PaymentError::CallbackParseError(_) => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::RateLimited { .. } => 429,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(
            PaymentError::LaunchDisabled {
                reference: "ORDER-1".into(),
                reason: "pending".into()
            }
            .status_code(),
            409
        );
        assert_eq!(
            PaymentError::RateLimited {
                provider: "mailerlite".into(),
                retry_after_secs: 60
            }
            .status_code(),
            429
        );
    }

    #[test]
    fn test_error_display() {
        let err = PaymentError::ProviderError {
            provider: "mailerlite".into(),
            message: "HTTP 422".into(),
        };
        assert_eq!(err.to_string(), "Provider error [mailerlite]: HTTP 422");
    }
}
