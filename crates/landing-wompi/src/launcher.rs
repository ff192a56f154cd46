//! # Session Launcher
//!
//! Arms a launch control with the integrity signature for its reference,
//! builds the widget session descriptor, reports the `InitiateCheckout`
//! intent and opens the widget.

use crate::config::MerchantConfig;
use crate::signature;
use crate::widget::{outcome_channel, CheckoutWidget, SessionDescriptor};
use landing_core::{
    AttemptReference, BoxedConversionTracker, ClientContext, ConversionEvent, ConversionEventName,
    CustomerData, LaunchControl, Offering, OutcomeDisposition, OutcomeHandler, PaymentError,
    PaymentResult, TransactionOutcome, WidgetResult,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

/// Launches Wompi checkout sessions for the configured offering
#[derive(Clone)]
pub struct SessionLauncher {
    config: Arc<MerchantConfig>,
    offering: Arc<Offering>,
    tracker: BoxedConversionTracker,
}

impl SessionLauncher {
    /// The merchant must charge exactly the offering price, since that is
    /// what conversion events report.
    pub fn new(
        config: Arc<MerchantConfig>,
        offering: Arc<Offering>,
        tracker: BoxedConversionTracker,
    ) -> PaymentResult<Self> {
        if config.price != offering.price {
            return Err(PaymentError::Configuration(format!(
                "merchant charges {} but offering {} is priced at {}",
                config.price.display(),
                offering.id,
                offering.price.display()
            )));
        }
        Ok(Self {
            config,
            offering,
            tracker,
        })
    }

    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    pub fn offering(&self) -> &Offering {
        &self.offering
    }

    /// New control for `reference`, armed with its signature
    pub fn prepare(&self, reference: AttemptReference) -> LaunchControl {
        let mut control = LaunchControl::pending(reference);
        self.arm(&mut control);
        control
    }

    /// Compute the signature for a pending control.
    ///
    /// Returns `false` if the control was not pending. A failed derivation
    /// leaves the control disabled.
    pub fn arm(&self, control: &mut LaunchControl) -> bool {
        if !control.is_pending() {
            return false;
        }
        let reference = control.reference().clone();
        let result = signature::derive_for(&self.config, &reference);
        if let Err(e) = &result {
            error!("Integrity signature failed for {}: {}", reference, e);
        }
        control.resolve(&reference, result)
    }

    /// Build the widget descriptor. Fails while the control is disabled.
    pub fn describe(
        &self,
        control: &LaunchControl,
        customer: CustomerData,
    ) -> PaymentResult<SessionDescriptor> {
        let integrity = control.require_ready()?.clone();
        Ok(SessionDescriptor::build(
            &self.config,
            control.reference().clone(),
            integrity,
            customer,
        ))
    }

    /// Report the `InitiateCheckout` intent. Tracking failures are logged only.
    #[instrument(skip(self, reference, client), fields(reference = %reference))]
    pub async fn announce(&self, reference: &AttemptReference, client: &ClientContext) {
        let event =
            ConversionEvent::new(ConversionEventName::InitiateCheckout, reference, &self.offering)
                .with_client(client);
        if let Err(e) = self.tracker.track(&event).await {
            warn!(
                "{} event not reported to {}: {}",
                event.name,
                self.tracker.provider_name(),
                e
            );
        }
    }

    /// Open a checkout session on `widget`.
    ///
    /// Nothing is opened or reported when the control is disabled.
    #[instrument(skip(self, control, customer, client, widget), fields(reference = %control.reference()))]
    pub async fn launch(
        &self,
        control: &LaunchControl,
        customer: CustomerData,
        client: &ClientContext,
        widget: &dyn CheckoutWidget,
    ) -> PaymentResult<LaunchedSession> {
        let descriptor = self.describe(control, customer)?;

        self.announce(&descriptor.reference, client).await;

        let (sender, outcome) = outcome_channel();
        widget.open(&descriptor, sender);

        info!(
            "Opened checkout widget: amount={}, identified={}",
            self.config.price.display(),
            !descriptor.customer_data.is_anonymous()
        );

        Ok(LaunchedSession {
            reference: descriptor.reference,
            outcome,
        })
    }
}

/// How a launched session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The widget was closed without a result
    Abandoned,
    /// The widget reported a result and the handler processed it
    Completed {
        outcome: TransactionOutcome,
        disposition: OutcomeDisposition,
    },
}

/// A session whose widget is open and whose result is still outstanding
#[derive(Debug)]
pub struct LaunchedSession {
    reference: AttemptReference,
    outcome: oneshot::Receiver<WidgetResult>,
}

impl LaunchedSession {
    pub fn reference(&self) -> &AttemptReference {
        &self.reference
    }

    /// Wait for the terminal callback and hand it to `handler`
    pub async fn settle(self, handler: &dyn OutcomeHandler) -> SessionEnd {
        let result = match self.outcome.await {
            Ok(result) => result,
            Err(_) => {
                debug!("Checkout {} abandoned", self.reference);
                return SessionEnd::Abandoned;
            }
        };

        let outcome = TransactionOutcome::from(&result);
        info!("Checkout {} finished with {}", self.reference, outcome.status);

        let disposition = handler.on_outcome(&self.reference, outcome.clone()).await;
        SessionEnd::Completed {
            outcome,
            disposition,
        }
    }
}
