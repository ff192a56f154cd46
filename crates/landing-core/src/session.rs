//! # Checkout Session Types
//!
//! Attempt references, integrity fingerprints, customer identity and the
//! launch control that gates opening the checkout widget.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one checkout attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptReference(String);

impl AttemptReference {
    /// Wrap a caller-supplied reference. Rejects empty or blank strings.
    pub fn new(reference: impl Into<String>) -> PaymentResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "attempt reference must not be empty".to_string(),
            ));
        }
        Ok(Self(reference))
    }

    /// Generate a fresh reference (UUIDv4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttemptReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 integrity fingerprint, 64 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegritySignature(String);

impl IntegritySignature {
    /// Wrap a hex digest, checking its shape
    pub fn from_hex(hex: impl Into<String>) -> PaymentResult<Self> {
        let hex = hex.into();
        let well_formed = hex.len() == 64
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !well_formed {
            return Err(PaymentError::SignatureDerivation(format!(
                "expected 64 lowercase hex characters, got {:?}",
                hex
            )));
        }
        Ok(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IntegritySignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer fields as supplied by the caller. Nothing is validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_prefix: Option<String>,
}

/// Customer identity block forwarded to the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdentity {
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub phone_number_prefix: String,
}

/// Either no identity at all, or a complete identity block.
///
/// The widget prefills the customer form only when a phone number and its
/// prefix are both known; otherwise the block is left out entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CustomerData {
    Anonymous,
    Identified(CustomerIdentity),
}

impl CustomerData {
    /// Branch on the phone fields. Empty strings count as missing.
    pub fn from_details(details: CustomerDetails) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        match (
            present(details.phone_number),
            present(details.phone_number_prefix),
        ) {
            (Some(phone_number), Some(phone_number_prefix)) => {
                CustomerData::Identified(CustomerIdentity {
                    email: details.email.unwrap_or_default(),
                    full_name: details.full_name.unwrap_or_default(),
                    phone_number,
                    phone_number_prefix,
                })
            }
            _ => CustomerData::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, CustomerData::Anonymous)
    }

    pub fn identity(&self) -> Option<&CustomerIdentity> {
        match self {
            CustomerData::Anonymous => None,
            CustomerData::Identified(identity) => Some(identity),
        }
    }
}

impl Default for CustomerData {
    fn default() -> Self {
        CustomerData::Anonymous
    }
}

/// Browser the request came from, as seen by the server.
///
/// The conversion tracker needs it to match server-side events to a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl ClientContext {
    /// Blank values count as unknown
    pub fn new(user_agent: Option<String>, ip_address: Option<String>) -> Self {
        let known = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            user_agent: known(user_agent),
            ip_address: known(ip_address),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none() && self.ip_address.is_none()
    }
}

/// Fingerprint state for the current reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlState {
    /// Fingerprint still being computed
    Pending,
    /// Fingerprint available, launch allowed
    Ready(IntegritySignature),
    /// Derivation failed; stays disabled until the reference changes
    Failed(String),
}

/// Gate in front of the checkout widget.
///
/// Enabled exactly when the fingerprint for the current reference is set.
/// The fingerprint is written once per reference and dropped when the
/// reference changes.
#[derive(Debug, Clone)]
pub struct LaunchControl {
    reference: AttemptReference,
    state: ControlState,
}

impl LaunchControl {
    /// A control for `reference` whose fingerprint is not computed yet
    pub fn pending(reference: AttemptReference) -> Self {
        Self {
            reference,
            state: ControlState::Pending,
        }
    }

    pub fn reference(&self) -> &AttemptReference {
        &self.reference
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ControlState::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ControlState::Pending)
    }

    pub fn signature(&self) -> Option<&IntegritySignature> {
        match &self.state {
            ControlState::Ready(signature) => Some(signature),
            _ => None,
        }
    }

    /// Record the derivation result for `reference`.
    ///
    /// Returns `false` and leaves the control untouched when the result
    /// belongs to a stale reference or the state was already settled.
    pub fn resolve(
        &mut self,
        reference: &AttemptReference,
        result: PaymentResult<IntegritySignature>,
    ) -> bool {
        if reference != &self.reference || !self.is_pending() {
            return false;
        }
        self.state = match result {
            Ok(signature) => ControlState::Ready(signature),
            Err(e) => ControlState::Failed(e.to_string()),
        };
        true
    }

    /// Switch to a new reference. Same reference is a no-op.
    pub fn set_reference(&mut self, reference: AttemptReference) -> bool {
        if reference == self.reference {
            return false;
        }
        self.reference = reference;
        self.state = ControlState::Pending;
        true
    }

    /// Signature for launching, or why the control is disabled
    pub fn require_ready(&self) -> PaymentResult<&IntegritySignature> {
        match &self.state {
            ControlState::Ready(signature) => Ok(signature),
            ControlState::Pending => Err(PaymentError::LaunchDisabled {
                reference: self.reference.to_string(),
                reason: "integrity signature pending".to_string(),
            }),
            ControlState::Failed(reason) => Err(PaymentError::LaunchDisabled {
                reference: self.reference.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}
