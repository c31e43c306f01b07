//! Read-only views of orders, payments, balances and withdrawals.
use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{BusinessProfile, Order, Payment, Withdrawal},
    traits::{AccountManagement, MarketplaceError},
};

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Orders placed by the buyer, newest first.
    pub async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, MarketplaceError> {
        let orders = self.db.fetch_orders_for_buyer(buyer_id).await?;
        trace!("{} orders for buyer {buyer_id}", orders.len());
        Ok(orders)
    }

    /// Orders placed with the business, newest first.
    pub async fn orders_for_business(&self, business_id: i64) -> Result<Vec<Order>, MarketplaceError> {
        let orders = self.db.fetch_orders_for_business(business_id).await?;
        trace!("{} orders for business {business_id}", orders.len());
        Ok(orders)
    }

    pub async fn balance_for_business(&self, business_id: i64) -> Result<BusinessProfile, MarketplaceError> {
        self.db.fetch_business(business_id).await?.ok_or(MarketplaceError::BusinessNotFound(business_id))
    }

    pub async fn withdrawals_for_business(&self, business_id: i64) -> Result<Vec<Withdrawal>, MarketplaceError> {
        let withdrawals = self.db.fetch_withdrawals_for_business(business_id).await?;
        Ok(withdrawals)
    }

    /// The payment intent for an order. Only the order's buyer and business may see it.
    pub async fn payment_for_order(&self, caller_id: i64, order_id: i64) -> Result<Payment, MarketplaceError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        if order.buyer_id != caller_id && order.business_id != caller_id {
            return Err(MarketplaceError::Authorization(format!("You are not a party to order {order_id}")));
        }
        self.db.fetch_payment_for_order(order_id).await?.ok_or(MarketplaceError::PaymentNotFound(order_id))
    }
}
