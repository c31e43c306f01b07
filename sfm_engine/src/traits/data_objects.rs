use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLineItem, OrderStatusType, Payment, PaymentMethod, PaymentStatus, Rupiah};

/// The result of a successful order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
    /// Present for sell orders only
    pub payment: Option<Payment>,
}

impl PlacedOrder {
    pub fn gateway_token(&self) -> Option<&str> {
        self.payment.as_ref().and_then(|p| p.gateway_token.as_deref())
    }

    pub fn gateway_redirect_url(&self) -> Option<&str> {
        self.payment.as_ref().and_then(|p| p.redirect_url.as_deref())
    }

    pub fn reserved_quantity(&self, listing_id: i64) -> i64 {
        self.items.iter().filter(|i| i.listing_id == listing_id).map(|i| i.quantity).sum()
    }
}

/// An order with its line items and payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
    pub payment: Option<Payment>,
}

/// A verified gateway notification, translated into the marketplace's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub order_id: i64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatusType,
    pub transaction_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub gross_amount: Rupiah,
}

#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The payment succeeded and the business balance was credited with `credited`.
    Settled { order: Order, payment: Payment, credited: Rupiah },
    /// The payment was updated (failed, or still pending with new details). The order is included if its status
    /// changed too.
    Updated { payment: Payment, order: Option<Order> },
    /// The payment had already left `pending`, so the notification was a duplicate or arrived out of order.
    Unchanged { payment: Payment },
}

impl ReconcileOutcome {
    pub fn payment(&self) -> &Payment {
        match self {
            ReconcileOutcome::Settled { payment, .. } => payment,
            ReconcileOutcome::Updated { payment, .. } => payment,
            ReconcileOutcome::Unchanged { payment } => payment,
        }
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, ReconcileOutcome::Settled { .. })
    }
}
