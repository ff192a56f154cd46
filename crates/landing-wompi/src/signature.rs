//! # Integrity Signature
//!
//! Wompi only trusts a widget session whose `signature.integrity` is the
//! SHA-256 of `reference ++ amountInCents ++ currency ++ integritySecret`,
//! concatenated without delimiters and rendered as lowercase hex.

use crate::config::MerchantConfig;
use landing_core::{
    AttemptReference, Currency, IntegritySignature, PaymentError, PaymentResult, Price,
};
use sha2::{Digest, Sha256};

/// Derive the integrity fingerprint for one checkout attempt.
///
/// Deterministic in its four inputs.
pub fn derive(
    reference: &str,
    amount_in_cents: i64,
    currency: Currency,
    integrity_secret: &str,
) -> PaymentResult<IntegritySignature> {
    if reference.is_empty() {
        return Err(PaymentError::SignatureDerivation(
            "reference must not be empty".to_string(),
        ));
    }
    if amount_in_cents <= 0 {
        return Err(PaymentError::SignatureDerivation(format!(
            "amount must be positive, got {}",
            amount_in_cents
        )));
    }
    if integrity_secret.is_empty() {
        return Err(PaymentError::SignatureDerivation(
            "integrity secret must not be empty".to_string(),
        ));
    }

    let message = format!(
        "{}{}{}{}",
        reference,
        amount_in_cents,
        currency.as_str(),
        integrity_secret
    );
    let digest = Sha256::digest(message.as_bytes());

    IntegritySignature::from_hex(hex::encode(digest))
}

/// Derive using a merchant's price and secret
pub fn derive_for(
    config: &MerchantConfig,
    reference: &AttemptReference,
) -> PaymentResult<IntegritySignature> {
    let Price { amount, currency } = config.price;
    derive(reference.as_str(), amount, currency, config.integrity_secret())
}
