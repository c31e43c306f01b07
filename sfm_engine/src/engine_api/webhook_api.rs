use std::fmt::Debug;

use log::*;
use sfm_common::Secret;

use crate::{
    db_types::Rupiah,
    engine_api::gateway_objects::{map_payment_type, map_transaction_status, PaymentNotification},
    helpers::{verify_notification_signature, GatewayOrderRef},
    traits::{MarketplaceDatabase, MarketplaceError, PaymentUpdate, ReconcileOutcome, ValidationError},
};

/// `WebhookApi` reconciles payment gateway notifications with orders, payments and business balances.
///
/// The gateway delivers notifications at least once, possibly concurrently and out of order. A notification is
/// applied only if the payment it refers to is still pending, so repeats are harmless and a business is credited at
/// most once per order.
pub struct WebhookApi<B> {
    db: B,
    server_key: Secret<String>,
}

impl<B> Debug for WebhookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi (server key: {})", self.server_key)
    }
}

impl<B> WebhookApi<B> {
    pub fn new(db: B, server_key: Secret<String>) -> Self {
        if server_key.is_empty() {
            warn!("🪝️ No gateway server key has been set. Every notification will fail signature checks.");
        }
        Self { db, server_key }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Authenticates the notification and translates it into a [`PaymentUpdate`]. Nothing is read or written here.
    pub fn verify(&self, notification: &PaymentNotification) -> Result<PaymentUpdate, MarketplaceError> {
        let valid = verify_notification_signature(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
            self.server_key.reveal(),
            &notification.signature_key,
        );
        if !valid {
            warn!("🔐️ Notification for {} has an invalid signature. Rejecting it.", notification.order_id);
            return Err(MarketplaceError::InvalidSignature);
        }
        let reference = notification
            .order_id
            .parse::<GatewayOrderRef>()
            .map_err(|e| MarketplaceError::UnknownGatewayReference(e.to_string()))?;
        let gross_amount = notification
            .gross_amount
            .parse::<Rupiah>()
            .map_err(|e| ValidationError::InvalidGrossAmount(e.to_string()))?;
        if gross_amount.value() < 0 {
            return Err(ValidationError::InvalidGrossAmount(notification.gross_amount.clone()).into());
        }
        let (payment_status, order_status) =
            map_transaction_status(&notification.transaction_status, notification.fraud_status.as_deref());
        Ok(PaymentUpdate {
            order_id: reference.order_id(),
            payment_status,
            order_status,
            transaction_id: notification.transaction_id.clone().filter(|t| !t.is_empty()),
            payment_method: map_payment_type(notification.payment_type.as_deref()),
            gross_amount,
        })
    }
}

impl<B> WebhookApi<B>
where B: MarketplaceDatabase
{
    pub async fn process_notification(
        &self,
        notification: PaymentNotification,
    ) -> Result<ReconcileOutcome, MarketplaceError> {
        let update = self.verify(&notification)?;
        trace!(
            "🪝️ Notification for {} ({} → payment {}, order {})",
            notification.order_id,
            notification.transaction_status,
            update.payment_status,
            update.order_status
        );
        let outcome = self.db.apply_payment_update(update).await?;
        match &outcome {
            ReconcileOutcome::Settled { order, credited, .. } => {
                info!("🪝️ Order #{} is paid. Business {} credited {credited}", order.id, order.business_id)
            },
            ReconcileOutcome::Updated { payment, .. } => {
                debug!("🪝️ Payment for order #{} updated to {}", payment.order_id, payment.status)
            },
            ReconcileOutcome::Unchanged { payment } => {
                debug!("🪝️ Repeat notification for order #{} ignored. Payment is {}", payment.order_id, payment.status)
            },
        }
        Ok(outcome)
    }
}
