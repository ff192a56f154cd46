//! # Request Handlers
//!
//! Axum request handlers for the landing page API.
//! The integrity secret stays on the server; the browser only ever receives
//! the derived signature inside the session descriptor.

use crate::client::ClientInfo;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use landing_core::{
    AttemptReference, CustomerData, CustomerDetails, OutcomeDisposition, PaymentError, PriceCard,
    TransactionOutcome, WidgetResult,
};
use landing_wompi::{SessionDescriptor, WIDGET_SCRIPT_URL};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Default, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Attempt reference (optional, generated when absent)
    #[serde(default)]
    pub reference: Option<String>,
    /// Customer details for prefilling the widget (optional)
    #[serde(default)]
    pub customer: CustomerDetails,
}

/// Create checkout response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    /// Script that hosts the widget
    pub widget_script_url: &'static str,
    /// Configuration to open the widget with
    pub session: SessionDescriptor,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "landing-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Price card for the offering
pub async fn get_offering(State(state): State<AppState>) -> Json<PriceCard> {
    Json(state.landing.offering.price_card())
}

/// Sign a checkout attempt and return the widget session descriptor.
///
/// Also reports the `InitiateCheckout` intent before responding.
#[instrument(skip(state, client, request))]
pub async fn create_checkout(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let reference = match request.reference {
        Some(reference) => AttemptReference::new(reference).map_err(payment_error_to_response)?,
        None => AttemptReference::generate(),
    };

    let control = state.launcher.prepare(reference);
    let customer = CustomerData::from_details(request.customer);

    let session = state.launcher.describe(&control, customer).map_err(|e| {
        error!("Checkout not available: {}", e);
        payment_error_to_response(e)
    })?;

    state.launcher.announce(&session.reference, &client).await;

    info!(
        "Created checkout session: reference={}, amount={}, identified={}",
        session.reference,
        state.launcher.config().price.display(),
        !session.customer_data.is_anonymous()
    );

    Ok(Json(CreateCheckoutResponse {
        widget_script_url: WIDGET_SCRIPT_URL,
        session,
    }))
}

/// Relay of the widget callback.
///
/// Runs the outcome notifier once and reports what it did. Downstream
/// notification failures are part of the disposition, not an error response.
/// A callback whose charge differs from the signed price is rejected.
#[instrument(skip(state, client, body))]
pub async fn checkout_outcome(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    body: Bytes,
) -> Result<Json<OutcomeDisposition>, ApiError> {
    let result = WidgetResult::from_slice(&body).map_err(|e| {
        error!("Rejected widget callback: {}", e);
        payment_error_to_response(e)
    })?;

    let reference = result
        .transaction
        .reference
        .clone()
        .ok_or_else(|| PaymentError::InvalidRequest("transaction.reference is required".into()))
        .and_then(AttemptReference::new)
        .map_err(payment_error_to_response)?;

    result
        .transaction
        .verify_charge(&state.launcher.config().price)
        .map_err(|e| {
            warn!("Rejected widget callback for {}: {}", reference, e);
            payment_error_to_response(e)
        })?;

    let outcome = TransactionOutcome::from(&result).with_client(client);

    info!(
        "Widget outcome: reference={}, status={}, transaction={:?}",
        reference, outcome.status, outcome.transaction_id
    );

    let disposition = state.notifier.on_outcome(&reference, outcome).await;
    Ok(Json(disposition))
}

/// Redirect to the WhatsApp chat with the prefilled message
pub async fn whatsapp_contact(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let contact = state.landing.contact.as_ref().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No WhatsApp contact configured", 404)),
        )
    })?;

    let url = reqwest::Url::parse_with_params(
        &format!("https://wa.me/{}", contact.number),
        &[("text", contact.message.as_str())],
    )
    .map_err(|e| {
        payment_error_to_response(PaymentError::Configuration(format!(
            "invalid WhatsApp number {}: {}",
            contact.number, e
        )))
    })?;

    Ok(Redirect::temporary(url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("missing field");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("missing field"));
    }

    #[test]
    fn test_payment_error_conversion() {
        let err = PaymentError::InvalidRequest("Bad data".to_string());
        let (status, _json) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err = PaymentError::LaunchDisabled {
            reference: "ORDER-42".into(),
            reason: "signature failed".into(),
        };
        let (status, json) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json.code, 409);
    }

    #[test]
    fn test_checkout_request_defaults() {
        let request: CreateCheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(request.reference.is_none());
        assert!(CustomerData::from_details(request.customer).is_anonymous());
    }
}
