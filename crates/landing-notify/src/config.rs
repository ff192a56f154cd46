//! # Notification Configuration
//!
//! Credentials for the subscriber list and the conversion pixel.
//! All secrets are loaded from environment variables.

use landing_core::PaymentError;
use std::env;

/// MailerLite API configuration
#[derive(Clone)]
pub struct MailerLiteConfig {
    /// API token (sent as a bearer token)
    pub api_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl MailerLiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MAILERLITE_API_KEY`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("MAILERLITE_API_KEY").map_err(|_| {
            PaymentError::Configuration("MAILERLITE_API_KEY not set".to_string())
        })?;

        if api_key.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "MAILERLITE_API_KEY is empty".to_string(),
            ));
        }

        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: "https://connect.mailerlite.com".to_string(),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for MailerLiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerLiteConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Meta Conversions API configuration
#[derive(Clone)]
pub struct PixelConfig {
    /// Numeric pixel (dataset) ID
    pub pixel_id: String,

    /// System-user access token
    pub access_token: String,

    /// Graph API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Graph API version
    pub api_version: String,

    /// Routes events to the Test Events tab when set
    pub test_event_code: Option<String>,

    /// Landing page URL reported with each event
    pub event_source_url: Option<String>,
}

impl PixelConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `META_PIXEL_ID`
    /// - `META_ACCESS_TOKEN`
    ///
    /// Optional:
    /// - `META_TEST_EVENT_CODE`
    /// - `META_EVENT_SOURCE_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let pixel_id = env::var("META_PIXEL_ID")
            .map_err(|_| PaymentError::Configuration("META_PIXEL_ID not set".to_string()))?;

        let access_token = env::var("META_ACCESS_TOKEN")
            .map_err(|_| PaymentError::Configuration("META_ACCESS_TOKEN not set".to_string()))?;

        if pixel_id.is_empty() || !pixel_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::Configuration(
                "META_PIXEL_ID must be numeric".to_string(),
            ));
        }

        let mut config = Self::new(pixel_id, access_token);
        config.test_event_code = env::var("META_TEST_EVENT_CODE").ok().filter(|s| !s.is_empty());
        config.event_source_url = env::var("META_EVENT_SOURCE_URL").ok().filter(|s| !s.is_empty());
        Ok(config)
    }

    pub fn new(pixel_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            pixel_id: pixel_id.into(),
            access_token: access_token.into(),
            api_base_url: "https://graph.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            test_event_code: None,
            event_source_url: None,
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set test event code
    pub fn with_test_event_code(mut self, code: impl Into<String>) -> Self {
        self.test_event_code = Some(code.into());
        self
    }

    /// Events endpoint for this pixel
    pub fn events_url(&self) -> String {
        format!(
            "{}/{}/{}/events",
            self.api_base_url, self.api_version, self.pixel_id
        )
    }
}

impl std::fmt::Debug for PixelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelConfig")
            .field("pixel_id", &self.pixel_id)
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("test_event_code", &self.test_event_code)
            .finish()
    }
}
