//! # Landing Checkout RS
//!
//! Single-offering landing page backend with Wompi checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export WOMPI_PUBLIC_KEY=pub_test_...
//! export WOMPI_INTEGRITY_SECRET=test_integrity_...
//! export MAILERLITE_API_KEY=...
//! export META_PIXEL_ID=...
//! export META_ACCESS_TOKEN=...
//!
//! # Run the server
//! landing-checkout
//! ```

use landing_api::{routes, state::AppState};
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Offering: {} at {}",
        state.landing.offering.name,
        state.landing.offering.price.display()
    );

    let app = routes::create_router(state);

    info!("Landing checkout starting on http://{}", addr);

    if !is_prod {
        info!("Price card: GET http://{}/api/v1/offering", addr);
        info!("Checkout: POST http://{}/api/v1/checkout", addr);
        info!("Outcome relay: POST http://{}/api/v1/checkout/outcome", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Landing Checkout RS
  ━━━━━━━━━━━━━━━━━━━━━━━
  Wompi widget checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
