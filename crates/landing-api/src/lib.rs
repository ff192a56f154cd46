//! # landing-api
//!
//! HTTP API layer for landing-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server for the landing page
//! - Checkout session descriptors signed on the server
//! - The relay endpoint for the widget callback
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/offering` | Price card |
//! | POST | `/api/v1/checkout` | Create widget session descriptor |
//! | POST | `/api/v1/checkout/outcome` | Widget callback relay |
//! | GET | `/contact/whatsapp` | Redirect to the WhatsApp chat |

pub mod client;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
