//! # Checkout Widget
//!
//! The session descriptor handed to Wompi's hosted widget and the trait
//! through which the widget is opened.
//!
//! The widget runs out of process (in the customer's browser). This crate
//! only supplies its initial parameters and receives one terminal callback.

use crate::config::MerchantConfig;
use landing_core::{AttemptReference, Currency, CustomerData, IntegritySignature, WidgetResult};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

/// Script that defines `WidgetCheckout` in the browser
pub const WIDGET_SCRIPT_URL: &str = "https://checkout.wompi.co/widget.js";

/// `signature` block of the descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureBlock {
    pub integrity: IntegritySignature,
}

/// Parameters for `new WidgetCheckout({...})`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub currency: Currency,
    pub amount_in_cents: i64,
    pub reference: AttemptReference,
    pub public_key: String,
    pub signature: SignatureBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "CustomerData::is_anonymous")]
    pub customer_data: CustomerData,
}

impl SessionDescriptor {
    pub fn build(
        config: &MerchantConfig,
        reference: AttemptReference,
        integrity: IntegritySignature,
        customer_data: CustomerData,
    ) -> Self {
        Self {
            currency: config.price.currency,
            amount_in_cents: config.price.amount,
            reference,
            public_key: config.public_key.clone(),
            signature: SignatureBlock { integrity },
            redirect_url: config.redirect_url.clone(),
            customer_data,
        }
    }
}

/// Single-use handle for the widget's terminal callback.
///
/// `complete` consumes the sender, so a result is delivered at most once.
/// Dropping it without completing means the customer abandoned the widget.
#[derive(Debug)]
pub struct OutcomeSender {
    tx: oneshot::Sender<WidgetResult>,
}

impl OutcomeSender {
    pub fn complete(self, result: WidgetResult) {
        if self.tx.send(result).is_err() {
            debug!("Outcome delivered after the session was dropped");
        }
    }
}

/// Create a connected sender/receiver pair for one session
pub fn outcome_channel() -> (OutcomeSender, oneshot::Receiver<WidgetResult>) {
    let (tx, rx) = oneshot::channel();
    (OutcomeSender { tx }, rx)
}

/// Opaque handle to the provider-hosted checkout UI
pub trait CheckoutWidget: Send + Sync {
    /// Open the widget and return immediately. The result, if any, arrives
    /// later through `outcome`.
    fn open(&self, descriptor: &SessionDescriptor, outcome: OutcomeSender);
}

#[cfg(test)]
mod tests {
    use super::*;
    use landing_core::{CustomerDetails, Price};
    use serde_json::json;

    fn config() -> MerchantConfig {
        MerchantConfig::new(
            "pub_test_abc",
            "test_integrity_xyz",
            Price::from_cents(250000, Currency::COP),
        )
        .unwrap()
    }

    fn integrity() -> IntegritySignature {
        IntegritySignature::from_hex("a".repeat(64)).unwrap()
    }

    fn reference() -> AttemptReference {
        AttemptReference::new("ORDER-42").unwrap()
    }

    #[test]
    fn test_descriptor_without_identity() {
        let descriptor =
            SessionDescriptor::build(&config(), reference(), integrity(), CustomerData::Anonymous);
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(
            json,
            json!({
                "currency": "COP",
                "amountInCents": 250000,
                "reference": "ORDER-42",
                "publicKey": "pub_test_abc",
                "signature": { "integrity": "a".repeat(64) }
            })
        );
        assert!(json.get("customerData").is_none());
    }

    #[test]
    fn test_descriptor_with_identity() {
        let customer = CustomerData::from_details(CustomerDetails {
            email: Some("ana@example.com".into()),
            full_name: Some("Ana Gómez".into()),
            phone_number: Some("3040777777".into()),
            phone_number_prefix: Some("+57".into()),
        });
        let descriptor = SessionDescriptor::build(&config(), reference(), integrity(), customer);
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(
            json["customerData"],
            json!({
                "email": "ana@example.com",
                "fullName": "Ana Gómez",
                "phoneNumber": "3040777777",
                "phoneNumberPrefix": "+57"
            })
        );
    }

    #[test]
    fn test_descriptor_redirect_url() {
        let config = config().with_redirect_url("https://example.com/gracias");
        let descriptor =
            SessionDescriptor::build(&config, reference(), integrity(), CustomerData::Anonymous);
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["redirectUrl"], "https://example.com/gracias");
    }

    #[tokio::test]
    async fn test_outcome_channel_delivers_once() {
        let (sender, receiver) = outcome_channel();
        sender.complete(WidgetResult::new("APPROVED", "ana@example.com"));

        let result = receiver.await.unwrap();
        assert_eq!(result.transaction.status, "APPROVED");
    }

    #[tokio::test]
    async fn test_dropped_sender_means_abandoned() {
        let (sender, receiver) = outcome_channel();
        drop(sender);
        assert!(receiver.await.is_err());
    }
}
