//! # MailerLite Subscriber List
//!
//! Records buyers on MailerLite. `POST /api/subscribers` creates the
//! subscriber or updates the fields of an existing one with the same email.

use crate::config::MailerLiteConfig;
use async_trait::async_trait;
use landing_core::{PaymentError, PaymentResult, SubscriberList, SubscriberRecord};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, instrument};

const PROVIDER: &str = "mailerlite";

/// MailerLite implementation of [`SubscriberList`]
pub struct MailerLiteClient {
    config: MailerLiteConfig,
    client: Client,
}

impl MailerLiteClient {
    /// Use a shared HTTP client
    pub fn new(config: MailerLiteConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env(client: Client) -> PaymentResult<Self> {
        let config = MailerLiteConfig::from_env()?;
        Ok(Self::new(config, client))
    }

    fn subscribers_url(&self) -> String {
        format!("{}/api/subscribers", self.config.api_base_url)
    }
}

#[async_trait]
impl SubscriberList for MailerLiteClient {
    #[instrument(skip(self, record), fields(purchase_id = %record.fields.purchase_id))]
    async fn upsert(&self, record: &SubscriberRecord) -> PaymentResult<()> {
        let response = self
            .client
            .post(self.subscribers_url())
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
            .json(record)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(PaymentError::RateLimited {
                provider: PROVIDER.to_string(),
                retry_after_secs,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("MailerLite API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<MailerLiteErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        debug!("MailerLite subscriber upserted: status={}", status);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Debug, Deserialize)]
struct MailerLiteErrorResponse {
    message: String,
}
