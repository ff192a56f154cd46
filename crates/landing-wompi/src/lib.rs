//! # landing-wompi
//!
//! Wompi hosted checkout widget integration for landing-checkout-rs.
//!
//! 1. **signature** - integrity fingerprint Wompi requires per reference
//! 2. **widget** - session descriptor and the `CheckoutWidget` seam
//! 3. **launcher** - `SessionLauncher` tying both to the launch control
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use landing_wompi::{MerchantConfig, SessionLauncher};
//! use landing_core::{AttemptReference, ClientContext, CustomerData};
//!
//! let config = MerchantConfig::from_env(offering.price)?;
//! let launcher = SessionLauncher::new(Arc::new(config), Arc::new(offering), tracker)?;
//!
//! let control = launcher.prepare(AttemptReference::generate());
//! let client = ClientContext::new(user_agent, ip_address);
//! let session = launcher.launch(&control, CustomerData::Anonymous, &client, &widget).await?;
//!
//! // later, when the widget calls back
//! let end = session.settle(&notifier).await;
//! ```

pub mod config;
pub mod launcher;
pub mod signature;
pub mod widget;

// Re-exports
pub use config::MerchantConfig;
pub use launcher::{LaunchedSession, SessionEnd, SessionLauncher};
pub use signature::{derive, derive_for};
pub use widget::{
    outcome_channel, CheckoutWidget, OutcomeSender, SessionDescriptor, SignatureBlock,
    WIDGET_SCRIPT_URL,
};
