//! # Transaction Outcome
//!
//! The payload the checkout widget hands back when the customer finishes,
//! and the reduced outcome the notifier acts on.

use crate::error::{PaymentError, PaymentResult};
use crate::offering::{Currency, Price};
use crate::session::ClientContext;
use serde::{Deserialize, Serialize};

/// Transaction status reported by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Approved,
    Declined,
    Voided,
    Error,
    Pending,
    Other(String),
}

impl TransactionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "APPROVED" => TransactionStatus::Approved,
            "DECLINED" => TransactionStatus::Declined,
            "VOIDED" => TransactionStatus::Voided,
            "ERROR" => TransactionStatus::Error,
            "PENDING" => TransactionStatus::Pending,
            other => TransactionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Declined => "DECLINED",
            TransactionStatus::Voided => "VOIDED",
            TransactionStatus::Error => "ERROR",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Other(s) => s,
        }
    }

    /// Only an approved transaction triggers notifications
    pub fn is_approved(&self) -> bool {
        matches!(self, TransactionStatus::Approved)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback payload from the widget (`{ "transaction": { ... } }`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetResult {
    pub transaction: WidgetTransaction,
}

/// Transaction block of the widget callback.
/// Only `status` and `customerEmail` are required; the rest is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTransaction {
    pub status: String,
    pub customer_email: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount_in_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_method_type: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub finalized_at: Option<String>,
    #[serde(default)]
    pub customer_number_prefix: Option<String>,
}

impl WidgetResult {
    /// Result carrying only the required fields
    pub fn new(status: impl Into<String>, customer_email: impl Into<String>) -> Self {
        Self {
            transaction: WidgetTransaction {
                status: status.into(),
                customer_email: customer_email.into(),
                id: None,
                reference: None,
                amount_in_cents: None,
                currency: None,
                payment_method_type: None,
                status_message: None,
                created_at: None,
                finalized_at: None,
                customer_number_prefix: None,
            },
        }
    }

    /// Builder: set the echoed reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction.reference = Some(reference.into());
        self
    }

    /// Parse a raw callback body
    pub fn from_slice(payload: &[u8]) -> PaymentResult<Self> {
        serde_json::from_slice(payload).map_err(|e| {
            PaymentError::CallbackParseError(format!("Failed to parse widget result: {}", e))
        })
    }
}

impl WidgetTransaction {
    /// Check the echoed charge against the signed price.
    ///
    /// Absent fields are accepted; present ones must match exactly.
    pub fn verify_charge(&self, price: &Price) -> PaymentResult<()> {
        if let Some(code) = &self.currency {
            let currency = Currency::parse(code)?;
            if currency != price.currency {
                return Err(PaymentError::InvalidRequest(format!(
                    "callback currency {} does not match {}",
                    currency, price.currency
                )));
            }
        }

        if let Some(amount) = self.amount_in_cents {
            if amount != price.amount {
                return Err(PaymentError::InvalidRequest(format!(
                    "callback amount {} does not match {}",
                    amount, price.amount
                )));
            }
        }

        Ok(())
    }
}

/// What the notifier needs from a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub status: TransactionStatus,
    pub customer_email: String,
    pub transaction_id: Option<String>,
    /// Browser that relayed the callback
    pub client: ClientContext,
}

impl TransactionOutcome {
    pub fn new(status: TransactionStatus, customer_email: impl Into<String>) -> Self {
        Self {
            status,
            customer_email: customer_email.into(),
            transaction_id: None,
            client: ClientContext::default(),
        }
    }

    /// Builder: set the relaying browser
    pub fn with_client(mut self, client: ClientContext) -> Self {
        self.client = client;
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}

impl From<&WidgetResult> for TransactionOutcome {
    fn from(result: &WidgetResult) -> Self {
        let tx = &result.transaction;
        Self {
            status: TransactionStatus::parse(&tx.status),
            customer_email: tx.customer_email.clone(),
            transaction_id: tx.id.clone(),
            client: ClientContext::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert!(TransactionStatus::parse("APPROVED").is_approved());
        assert!(!TransactionStatus::parse("DECLINED").is_approved());
        assert!(!TransactionStatus::parse("approved").is_approved());
        assert_eq!(
            TransactionStatus::parse("REFUNDED"),
            TransactionStatus::Other("REFUNDED".into())
        );
    }

    #[test]
    fn test_parse_full_widget_payload() {
        let payload = json!({
            "transaction": {
                "id": "1234-1610641025-49201",
                "createdAt": "2024-01-14T16:17:05.000Z",
                "finalizedAt": "2024-01-14T16:17:06.000Z",
                "amountInCents": 250000,
                "reference": "ORDER-42",
                "customerEmail": "ana@example.com",
                "currency": "COP",
                "paymentMethodType": "CARD",
                "paymentMethod": {
                    "type": "CARD",
                    "extra": { "brand": "VISA", "lastFour": "4242" },
                    "installments": 1
                },
                "customerData": {
                    "deviceId": "abc",
                    "fullName": "Ana Gómez",
                    "phoneNumber": "3040777777"
                },
                "merchant": { "id": 12010, "name": "AVE GROUP SAS" },
                "status": "APPROVED",
                "statusMessage": null,
                "canRetry": false
            }
        });

        let result = WidgetResult::from_slice(payload.to_string().as_bytes()).unwrap();
        assert_eq!(result.transaction.reference.as_deref(), Some("ORDER-42"));

        let outcome = TransactionOutcome::from(&result);
        assert!(outcome.is_approved());
        assert_eq!(outcome.customer_email, "ana@example.com");
        assert_eq!(outcome.transaction_id.as_deref(), Some("1234-1610641025-49201"));
    }

    #[test]
    fn test_parse_minimal_payload() {
        let payload = br#"{"transaction":{"status":"DECLINED","customerEmail":"x@y.co"}}"#;
        let outcome = TransactionOutcome::from(&WidgetResult::from_slice(payload).unwrap());
        assert_eq!(outcome.status, TransactionStatus::Declined);
    }

    fn cop() -> Price {
        Price::from_cents(45_000_000, Currency::COP)
    }

    #[test]
    fn test_verify_charge_accepts_matching_or_absent() {
        let mut result = WidgetResult::new("APPROVED", "ana@example.com");
        assert!(result.transaction.verify_charge(&cop()).is_ok());

        result.transaction.amount_in_cents = Some(45_000_000);
        result.transaction.currency = Some("COP".into());
        assert!(result.transaction.verify_charge(&cop()).is_ok());
    }

    #[test]
    fn test_verify_charge_rejects_other_amount() {
        let mut result = WidgetResult::new("APPROVED", "ana@example.com");
        result.transaction.amount_in_cents = Some(100);

        let err = result.transaction.verify_charge(&cop()).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_verify_charge_rejects_other_currency() {
        let mut result = WidgetResult::new("APPROVED", "ana@example.com");
        result.transaction.currency = Some("USD".into());
        assert!(matches!(
            result.transaction.verify_charge(&cop()),
            Err(PaymentError::InvalidRequest(_))
        ));

        result.transaction.currency = Some("EUR".into());
        assert!(matches!(
            result.transaction.verify_charge(&cop()),
            Err(PaymentError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_parse_missing_status_fails() {
        let payload = br#"{"transaction":{"customerEmail":"x@y.co"}}"#;
        assert!(matches!(
            WidgetResult::from_slice(payload),
            Err(PaymentError::CallbackParseError(_))
        ));
    }
}
