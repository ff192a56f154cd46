//! # Outcome Notifier
//!
//! Acts on the terminal widget callback. An approved transaction fans out to
//! the subscriber list and the conversion tracker; anything else is a no-op.
//!
//! Both calls run as separate tasks. A failure (or panic) in one is captured
//! as a [`Delivery::Failed`] and never reaches the other or the caller.
//! Nothing is retried.

use async_trait::async_trait;
use chrono::Utc;
use landing_core::{
    AttemptReference, BoxedConversionTracker, BoxedSubscriberList, ConversionEvent,
    ConversionEventName, Delivery, Offering, OutcomeDisposition, OutcomeHandler, PaymentError,
    PaymentResult, SubscriberRecord, TransactionOutcome,
};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info, instrument, warn};

/// Default [`OutcomeHandler`]
#[derive(Clone)]
pub struct OutcomeNotifier {
    subscribers: BoxedSubscriberList,
    tracker: BoxedConversionTracker,
    offering: Arc<Offering>,
}

impl OutcomeNotifier {
    pub fn new(
        subscribers: BoxedSubscriberList,
        tracker: BoxedConversionTracker,
        offering: Arc<Offering>,
    ) -> Self {
        Self {
            subscribers,
            tracker,
            offering,
        }
    }
}

#[async_trait]
impl OutcomeHandler for OutcomeNotifier {
    #[instrument(skip(self, reference, outcome), fields(reference = %reference, status = %outcome.status))]
    async fn on_outcome(
        &self,
        reference: &AttemptReference,
        outcome: TransactionOutcome,
    ) -> OutcomeDisposition {
        if !outcome.is_approved() {
            info!("Transaction not approved, nothing to notify");
            return OutcomeDisposition::Ignored {
                status: outcome.status.to_string(),
            };
        }

        let record = SubscriberRecord::purchase(
            &outcome.customer_email,
            reference,
            &self.offering,
            Utc::now().date_naive(),
        );
        let event = ConversionEvent::new(ConversionEventName::Purchase, reference, &self.offering)
            .with_customer_email(&outcome.customer_email)
            .with_client(&outcome.client);

        let subscribers = Arc::clone(&self.subscribers);
        let subscriber_task = tokio::spawn(async move { subscribers.upsert(&record).await });

        let tracker = Arc::clone(&self.tracker);
        let conversion_task = tokio::spawn(async move { tracker.track(&event).await });

        let (subscriber, conversion) = tokio::join!(subscriber_task, conversion_task);
        let subscriber = flatten(subscriber, "subscriber upsert");
        let conversion = flatten(conversion, "conversion report");

        if let Err(e) = &subscriber {
            error!(
                "Subscriber upsert to {} failed: {}",
                self.subscribers.provider_name(),
                e
            );
        }
        if let Err(e) = &conversion {
            warn!(
                "Purchase event to {} failed: {}",
                self.tracker.provider_name(),
                e
            );
        }

        OutcomeDisposition::Notified {
            subscriber: Delivery::from_result(&subscriber),
            conversion: Delivery::from_result(&conversion),
        }
    }
}

fn flatten(joined: Result<PaymentResult<()>, JoinError>, what: &str) -> PaymentResult<()> {
    joined.unwrap_or_else(|e| Err(PaymentError::Internal(format!("{} task failed: {}", what, e))))
}
