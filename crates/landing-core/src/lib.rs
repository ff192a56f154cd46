//! # landing-core
//!
//! Core types and traits for the landing-checkout payment flow.
//!
//! This crate provides:
//! - `Offering`, `Price` and `PriceCard` for the single product on sale
//! - `AttemptReference`, `CustomerData` and `LaunchControl` for a checkout attempt
//! - `WidgetResult` and `TransactionOutcome` for the widget callback
//! - `SubscriberList`, `ConversionTracker` and `OutcomeHandler` seams
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use landing_core::{AttemptReference, LaunchControl, CustomerData, CustomerDetails};
//!
//! let reference = AttemptReference::generate();
//! let mut control = LaunchControl::pending(reference.clone());
//! assert!(!control.is_enabled());
//!
//! // once the integrity signature is derived
//! control.resolve(&reference, signature);
//! assert!(control.is_enabled());
//! ```

pub mod error;
pub mod notify;
pub mod offering;
pub mod outcome;
pub mod session;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use notify::{
    BoxedConversionTracker, BoxedSubscriberList, ConversionEvent, ConversionEventName,
    ConversionTracker, Delivery, OutcomeDisposition, OutcomeHandler, PurchaseFields,
    SubscriberList, SubscriberRecord, SUBSCRIBER_DATE_FORMAT,
};
pub use offering::{
    format_grouped, Currency, LandingConfig, Offering, Price, PriceCard, Promo, WhatsappContact,
};
pub use outcome::{TransactionOutcome, TransactionStatus, WidgetResult, WidgetTransaction};
pub use session::{
    AttemptReference, ClientContext, ControlState, CustomerData, CustomerDetails,
    CustomerIdentity, IntegritySignature, LaunchControl,
};
