//! # Notification Traits
//!
//! Seams for the post-purchase side effects: the subscriber list that
//! records buyers and the conversion tracker that reports ad events.
//!
//! ```text
//!              OutcomeHandler (trait)
//!                     │ on APPROVED
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!   SubscriberList         ConversionTracker
//!   (MailerLite)           (Meta pixel)
//! ```

use crate::error::PaymentResult;
use crate::offering::{Currency, Offering};
use crate::outcome::TransactionOutcome;
use crate::session::{AttemptReference, ClientContext};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Date format MailerLite expects for date fields
pub const SUBSCRIBER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Custom fields written on a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFields {
    pub purchase_id: String,
    pub purchase_date: String,
    /// Major units
    pub purchase_amount: f64,
    pub purchase_currency: Currency,
}

/// Upsert-by-email record for the subscriber list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberRecord {
    pub email: String,
    pub fields: PurchaseFields,
}

impl SubscriberRecord {
    /// Record a purchase of `offering` made under `reference` on `date`
    pub fn purchase(
        email: impl Into<String>,
        reference: &AttemptReference,
        offering: &Offering,
        date: NaiveDate,
    ) -> Self {
        Self {
            email: email.into(),
            fields: PurchaseFields {
                purchase_id: reference.to_string(),
                purchase_date: date.format(SUBSCRIBER_DATE_FORMAT).to_string(),
                purchase_amount: offering.price.as_decimal(),
                purchase_currency: offering.price.currency,
            },
        }
    }
}

/// Standard conversion events reported to the ad pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionEventName {
    InitiateCheckout,
    Purchase,
}

impl ConversionEventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionEventName::InitiateCheckout => "InitiateCheckout",
            ConversionEventName::Purchase => "Purchase",
        }
    }
}

impl std::fmt::Display for ConversionEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conversion event for the offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    pub name: ConversionEventName,
    /// Deduplication key shared with the browser pixel
    pub event_id: String,
    pub content_ids: Vec<String>,
    pub content_type: String,
    pub content_category: String,
    pub content_name: String,
    /// Major units
    pub value: f64,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ConversionEvent {
    pub fn new(name: ConversionEventName, reference: &AttemptReference, offering: &Offering) -> Self {
        Self {
            name,
            event_id: format!("{}-{}", name, reference),
            content_ids: vec![reference.to_string()],
            content_type: offering.content_type.clone(),
            content_category: offering.category.clone(),
            content_name: offering.name.clone(),
            value: offering.price.as_decimal(),
            currency: offering.price.currency,
            customer_email: None,
            client_user_agent: None,
            client_ip_address: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Builder: attach the visitor's browser details
    pub fn with_client(mut self, client: &ClientContext) -> Self {
        self.client_user_agent = client.user_agent.clone();
        self.client_ip_address = client.ip_address.clone();
        self
    }
}

/// Email-marketing list that records buyers
#[async_trait]
pub trait SubscriberList: Send + Sync {
    /// Create the subscriber or update its fields when the email exists
    async fn upsert(&self, record: &SubscriberRecord) -> PaymentResult<()>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Ad-conversion channel
#[async_trait]
pub trait ConversionTracker: Send + Sync {
    async fn track(&self, event: &ConversionEvent) -> PaymentResult<()>;

    fn provider_name(&self) -> &'static str;
}

pub type BoxedSubscriberList = Arc<dyn SubscriberList>;
pub type BoxedConversionTracker = Arc<dyn ConversionTracker>;

/// Result of one best-effort notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    Failed { error: String },
}

impl Delivery {
    pub fn from_result(result: &PaymentResult<()>) -> Self {
        match result {
            Ok(()) => Delivery::Sent,
            Err(e) => Delivery::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// What happened after a terminal widget callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum OutcomeDisposition {
    /// Approved: both notifications attempted
    Notified {
        subscriber: Delivery,
        conversion: Delivery,
    },
    /// Any other status: nothing sent
    Ignored { status: String },
}

/// Receives the single terminal outcome of a checkout attempt
#[async_trait]
pub trait OutcomeHandler: Send + Sync {
    /// Never fails; downstream errors are reported in the disposition
    async fn on_outcome(
        &self,
        reference: &AttemptReference,
        outcome: TransactionOutcome,
    ) -> OutcomeDisposition;
}
