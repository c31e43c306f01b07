use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{DeliveryMethod, NewOrder, Order, OrderStatusType, OrderType, Payment, PaymentStatus},
    order_objects::check_manual_transition,
    traits::{MarketplaceDatabase, MarketplaceError, OrderDetails, PaymentGateway, PlacedOrder, ValidationError},
};

/// `OrderFlowApi` is the primary API for placing orders and moving them through their lifecycle on behalf of buyers
/// and businesses.
///
/// Payment settlement is not part of this API. Only a verified gateway notification can settle a payment; see
/// [`crate::WebhookApi`].
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: MarketplaceDatabase,
    G: PaymentGateway,
{
    /// Places a new order for `order.buyer_id`.
    ///
    /// The cart is checked for shape before anything is written: it must be non-empty, every quantity must be
    /// positive, and delivery orders need an address. Stock, ownership and type checks happen inside the placement
    /// transaction. See [`MarketplaceDatabase::place_order`].
    pub async fn place_order(&self, order: NewOrder) -> Result<PlacedOrder, MarketplaceError> {
        if order.items.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        if order.items.iter().any(|i| i.quantity <= 0) {
            return Err(ValidationError::InvalidQuantity.into());
        }
        if order.delivery_method == DeliveryMethod::Delivery && order.persisted_address().is_none() {
            return Err(ValidationError::MissingAddress.into());
        }
        let buyer_id = order.buyer_id;
        trace!("🔄️📦️ Placing order for buyer {buyer_id} with {} item(s)", order.items.len());
        let placed = self.db.place_order(order, &self.gateway).await?;
        info!(
            "🔄️📦️ Order #{} ({}) placed by buyer {buyer_id} with business {}. Total {}",
            placed.order.id, placed.order.order_type, placed.order.business_id, placed.order.total_amount
        );
        Ok(placed)
    }

    /// Returns the payment intent of a pending sell order so that the buyer can pick up the checkout where they
    /// left off.
    pub async fn resume_payment(&self, caller_id: i64, order_id: i64) -> Result<Payment, MarketplaceError> {
        let order = self.fetch_order(order_id).await?;
        if order.buyer_id != caller_id {
            return Err(MarketplaceError::Authorization(format!("Order {order_id} belongs to another buyer")));
        }
        if order.order_type != OrderType::Sell {
            return Err(ValidationError::NotASellOrder(order_id).into());
        }
        let payment = self.db.fetch_payment_for_order(order_id).await?.ok_or(MarketplaceError::PaymentNotFound(order_id))?;
        if payment.status == PaymentStatus::Success {
            return Err(ValidationError::AlreadyPaid(order_id).into());
        }
        debug!("🔄️💳️ Buyer {caller_id} resumed payment for order #{order_id}");
        Ok(payment)
    }

    /// Records the transaction id the buyer's client received from the gateway's checkout. This is informational:
    /// whatever the client claims, the payment stays as it is until the gateway itself says otherwise.
    pub async fn confirm_payment_from_client(
        &self,
        caller_id: i64,
        order_id: i64,
        transaction_id: &str,
    ) -> Result<Payment, MarketplaceError> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(ValidationError::MissingTransactionId.into());
        }
        let order = self.fetch_order(order_id).await?;
        if order.buyer_id != caller_id {
            return Err(MarketplaceError::Authorization(format!("Order {order_id} belongs to another buyer")));
        }
        if order.order_type != OrderType::Sell {
            return Err(ValidationError::NotASellOrder(order_id).into());
        }
        let payment = self.db.record_client_transaction_id(order_id, transaction_id).await?;
        debug!("🔄️💳️ Client confirmation recorded for order #{order_id}. Payment is {}", payment.status);
        Ok(payment)
    }

    /// Changes the status of an order on behalf of its business.
    ///
    /// Requests from anyone other than the order's business, for a status the business may not set, or for a
    /// status not reachable from the current one, are all rejected with [`ValidationError::InvalidTransition`].
    pub async fn update_order_status(
        &self,
        caller_id: i64,
        order_id: i64,
        new_status: OrderStatusType,
    ) -> Result<Order, MarketplaceError> {
        let order = self.fetch_order(order_id).await?;
        let from = order.status;
        if order.business_id != caller_id {
            warn!("🔄️📦️ User {caller_id} tried to move order #{order_id} to {new_status}, but it is not their order");
            return Err(ValidationError::InvalidTransition { from, to: new_status }.into());
        }
        check_manual_transition(order.order_type, from, new_status)?;
        let updated = self.db.update_order_status(order_id, from, new_status).await?;
        info!("🔄️📦️ Order #{order_id} moved from {from} to {new_status}");
        Ok(updated)
    }

    /// The order with its items and payment, for its buyer or its business.
    pub async fn order_details(&self, caller_id: i64, order_id: i64) -> Result<OrderDetails, MarketplaceError> {
        let order = self.fetch_order(order_id).await?;
        if order.buyer_id != caller_id && order.business_id != caller_id {
            return Err(MarketplaceError::Authorization(format!("You are not a party to order {order_id}")));
        }
        let items = self.db.fetch_order_items(order_id).await?;
        let payment = self.db.fetch_payment_for_order(order_id).await?;
        Ok(OrderDetails { order, items, payment })
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, MarketplaceError> {
        self.db.fetch_order(order_id).await?.ok_or(MarketplaceError::OrderNotFound(order_id))
    }
}
