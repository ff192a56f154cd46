//! # landing-notify
//!
//! Post-purchase notifications for landing-checkout-rs.
//!
//! - **mailerlite** - `MailerLiteClient`, the buyer list (`SubscriberList`)
//! - **pixel** - `MetaPixelTracker`, server-side conversion events (`ConversionTracker`)
//! - **notifier** - `OutcomeNotifier`, fans an approved outcome out to both
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use landing_notify::{MailerLiteClient, MetaPixelTracker, OutcomeNotifier};
//!
//! let http = reqwest::Client::new();
//! let subscribers = Arc::new(MailerLiteClient::from_env(http.clone())?);
//! let tracker = Arc::new(MetaPixelTracker::from_env(http)?);
//! let notifier = OutcomeNotifier::new(subscribers, tracker, Arc::new(offering));
//!
//! let disposition = notifier.on_outcome(&reference, outcome).await;
//! ```

pub mod config;
pub mod mailerlite;
pub mod notifier;
pub mod pixel;

// Re-exports
pub use config::{MailerLiteConfig, PixelConfig};
pub use mailerlite::MailerLiteClient;
pub use notifier::OutcomeNotifier;
pub use pixel::{hash_email, MetaPixelTracker};
