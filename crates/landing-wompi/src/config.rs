//! # Wompi Configuration
//!
//! Merchant configuration for the Wompi widget.
//! Keys are loaded from environment variables; amount and currency come from
//! the offering price. The value is built once and shared read-only.

use landing_core::{PaymentError, PaymentResult, Price};
use std::env;

/// Wompi merchant configuration
#[derive(Clone)]
pub struct MerchantConfig {
    /// Public key (pub_test_... or pub_prod_...)
    pub public_key: String,

    /// Integrity secret (test_integrity_... or prod_integrity_...). Never leaves the server.
    integrity_secret: String,

    /// Amount and currency charged by the widget
    pub price: Price,

    /// Where the widget sends the customer after paying
    pub redirect_url: Option<String>,
}

impl MerchantConfig {
    /// Load keys from environment variables.
    ///
    /// Required env vars:
    /// - `WOMPI_PUBLIC_KEY`
    /// - `WOMPI_INTEGRITY_SECRET`
    ///
    /// Optional:
    /// - `WOMPI_REDIRECT_URL`
    pub fn from_env(price: Price) -> PaymentResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_key = env::var("WOMPI_PUBLIC_KEY")
            .map_err(|_| PaymentError::Configuration("WOMPI_PUBLIC_KEY not set".to_string()))?;

        let integrity_secret = env::var("WOMPI_INTEGRITY_SECRET").map_err(|_| {
            PaymentError::Configuration("WOMPI_INTEGRITY_SECRET not set".to_string())
        })?;

        if !public_key.starts_with("pub_test_") && !public_key.starts_with("pub_prod_") {
            return Err(PaymentError::Configuration(
                "WOMPI_PUBLIC_KEY must start with pub_test_ or pub_prod_".to_string(),
            ));
        }

        if !integrity_secret.starts_with("test_integrity_")
            && !integrity_secret.starts_with("prod_integrity_")
        {
            return Err(PaymentError::Configuration(
                "WOMPI_INTEGRITY_SECRET must start with test_integrity_ or prod_integrity_"
                    .to_string(),
            ));
        }

        let config = Self::new(public_key, integrity_secret, price)?;
        if config.is_test_mode() != integrity_secret_is_test(&config.integrity_secret) {
            return Err(PaymentError::Configuration(
                "WOMPI_PUBLIC_KEY and WOMPI_INTEGRITY_SECRET belong to different environments"
                    .to_string(),
            ));
        }

        Ok(match env::var("WOMPI_REDIRECT_URL") {
            Ok(url) if !url.is_empty() => config.with_redirect_url(url),
            _ => config,
        })
    }

    /// Create config with explicit values
    pub fn new(
        public_key: impl Into<String>,
        integrity_secret: impl Into<String>,
        price: Price,
    ) -> PaymentResult<Self> {
        price.validate()?;
        Ok(Self {
            public_key: public_key.into(),
            integrity_secret: integrity_secret.into(),
            price,
            redirect_url: None,
        })
    }

    /// Check if using sandbox keys
    pub fn is_test_mode(&self) -> bool {
        self.public_key.starts_with("pub_test_")
    }

    pub(crate) fn integrity_secret(&self) -> &str {
        &self.integrity_secret
    }

    /// Builder: set redirect URL
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }
}

fn integrity_secret_is_test(secret: &str) -> bool {
    secret.starts_with("test_integrity_")
}

impl std::fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("public_key", &self.public_key)
            .field("integrity_secret", &"<redacted>")
            .field("price", &self.price)
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}
