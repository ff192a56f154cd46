//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the session launcher, the outcome notifier and the landing config.

use anyhow::Context;
use landing_core::{BoxedConversionTracker, LandingConfig, OutcomeHandler};
use landing_notify::{MailerLiteClient, MetaPixelTracker, OutcomeNotifier};
use landing_wompi::{MerchantConfig, SessionLauncher};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit offering file (`OFFERING_CONFIG`); searched for when unset
    pub offering_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            offering_path: std::env::var("OFFERING_CONFIG").ok().filter(|p| !p.is_empty()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Signs and describes widget sessions
    pub launcher: SessionLauncher,
    /// Acts on relayed widget callbacks
    pub notifier: Arc<dyn OutcomeHandler>,
    /// Offering and contact details
    pub landing: Arc<LandingConfig>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build the production state from environment variables and the offering file
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let landing = load_landing_config(config.offering_path.as_deref())?;
        let offering = Arc::new(landing.offering.clone());

        // One connection pool for both notification providers
        let http_client = reqwest::Client::new();

        let subscribers = MailerLiteClient::from_env(http_client.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize MailerLite: {}", e))?;

        let tracker: BoxedConversionTracker = Arc::new(
            MetaPixelTracker::from_env(http_client)
                .map_err(|e| anyhow::anyhow!("Failed to initialize Meta pixel: {}", e))?,
        );

        let merchant = MerchantConfig::from_env(offering.price)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Wompi: {}", e))?;

        if merchant.is_test_mode() {
            tracing::warn!("Wompi sandbox keys in use, no real charges will be made");
        }

        let launcher = SessionLauncher::new(Arc::new(merchant), offering.clone(), tracker.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize launcher: {}", e))?;

        let notifier = OutcomeNotifier::new(Arc::new(subscribers), tracker, offering);

        Ok(Self::from_parts(config, landing, launcher, Arc::new(notifier)))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        landing: LandingConfig,
        launcher: SessionLauncher,
        notifier: Arc<dyn OutcomeHandler>,
    ) -> Self {
        Self {
            launcher,
            notifier,
            landing: Arc::new(landing),
            config,
        }
    }
}

/// Load the landing config from `explicit`, or the first `config/offering.toml` found
fn load_landing_config(explicit: Option<&str>) -> anyhow::Result<LandingConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read offering config {}", path))?;
        return parse_landing_config(&content, path);
    }

    let config_paths = [
        "config/offering.toml",
        "../config/offering.toml",
        "../../config/offering.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_landing_config(&content, path);
        }
    }

    anyhow::bail!("No offering config found (set OFFERING_CONFIG or add config/offering.toml)")
}

fn parse_landing_config(content: &str, path: &str) -> anyhow::Result<LandingConfig> {
    let landing = LandingConfig::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!(
        "Loaded offering {} ({}) from {}",
        landing.offering.id,
        landing.offering.price.display(),
        path
    );
    Ok(landing)
}
