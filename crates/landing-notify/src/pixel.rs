//! # Meta Pixel (Conversions API)
//!
//! Server-side reporting of `InitiateCheckout` and `Purchase` events to the
//! offering's Meta pixel. The `event_id` matches the browser pixel so Meta
//! can deduplicate the two sources.

use crate::config::PixelConfig;
use async_trait::async_trait;
use landing_core::{ConversionEvent, ConversionTracker, PaymentError, PaymentResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};

const PROVIDER: &str = "meta_pixel";

/// Meta Conversions API implementation of [`ConversionTracker`]
pub struct MetaPixelTracker {
    config: PixelConfig,
    client: Client,
}

impl MetaPixelTracker {
    pub fn new(config: PixelConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env(client: Client) -> PaymentResult<Self> {
        let config = PixelConfig::from_env()?;
        Ok(Self::new(config, client))
    }

    fn build_request<'a>(&'a self, event: &'a ConversionEvent) -> CapiRequest<'a> {
        let em = event
            .customer_email
            .as_deref()
            .map(hash_email)
            .into_iter()
            .collect();

        CapiRequest {
            data: vec![CapiEvent {
                event_name: event.name.as_str(),
                event_time: event.occurred_at.timestamp(),
                event_id: &event.event_id,
                action_source: "website",
                event_source_url: self.config.event_source_url.as_deref(),
                user_data: CapiUserData {
                    em,
                    client_user_agent: event.client_user_agent.as_deref(),
                    client_ip_address: event.client_ip_address.as_deref(),
                },
                custom_data: CapiCustomData {
                    content_ids: &event.content_ids,
                    content_type: &event.content_type,
                    content_category: &event.content_category,
                    content_name: &event.content_name,
                    value: event.value,
                    currency: event.currency.as_str(),
                },
            }],
            access_token: &self.config.access_token,
            test_event_code: self.config.test_event_code.as_deref(),
        }
    }
}

#[async_trait]
impl ConversionTracker for MetaPixelTracker {
    #[instrument(skip(self, event), fields(event = %event.name, event_id = %event.event_id))]
    async fn track(&self, event: &ConversionEvent) -> PaymentResult<()> {
        let request = self.build_request(event);

        let response = self
            .client
            .post(self.config.events_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Conversions API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<GraphErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        debug!("Conversion event accepted: {}", body);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// SHA-256 of the trimmed, lowercased email, as the Conversions API expects
pub fn hash_email(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}

// =============================================================================
// Conversions API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CapiRequest<'a> {
    data: Vec<CapiEvent<'a>>,
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_event_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CapiEvent<'a> {
    event_name: &'static str,
    event_time: i64,
    event_id: &'a str,
    action_source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_source_url: Option<&'a str>,
    user_data: CapiUserData<'a>,
    custom_data: CapiCustomData<'a>,
}

#[derive(Debug, Serialize)]
struct CapiUserData<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    em: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_user_agent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_ip_address: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CapiCustomData<'a> {
    content_ids: &'a [String],
    content_type: &'a str,
    content_category: &'a str,
    content_name: &'a str,
    value: f64,
    currency: &'static str,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}
