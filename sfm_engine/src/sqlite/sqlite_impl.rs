//! `SqliteDatabase` is a concrete implementation of a marketplace backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::db::{businesses, db_url, listings, new_pool, orders, payments, withdrawals};
use crate::{
    db_types::{
        BusinessProfile,
        Listing,
        NewBusiness,
        NewListing,
        NewOrder,
        NewWithdrawal,
        Order,
        OrderLineItem,
        OrderStatusType,
        OrderType,
        Payment,
        PaymentStatus,
        Rupiah,
        Withdrawal,
    },
    helpers::GatewayOrderRef,
    order_objects::{check_listing_for_order, check_transition, TransitionSource},
    traits::{
        AccountApiError,
        AccountManagement,
        ConflictError,
        ListingManagement,
        MarketplaceDatabase,
        MarketplaceError,
        PaymentGateway,
        PaymentUpdate,
        PlacedOrder,
        ReconcileOutcome,
        TransactionItem,
        TransactionRequest,
        ValidationError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `SFM_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Rolls back a payment update and reports the payment as it was before.
    async fn discard_payment_update(
        &self,
        tx: Transaction<'static, Sqlite>,
        order_id: i64,
    ) -> Result<ReconcileOutcome, MarketplaceError> {
        tx.rollback().await?;
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_order(order_id, &mut conn)
            .await?
            .ok_or(MarketplaceError::PaymentNotFound(order_id))?;
        Ok(ReconcileOutcome::Unchanged { payment })
    }

    /// How many settlements have been journalled for the order. Zero or one.
    pub async fn settlement_count(&self, order_id: i64) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        payments::settlement_count(order_id, &mut conn).await
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order<G: PaymentGateway>(
        &self,
        order: NewOrder,
        gateway: &G,
    ) -> Result<PlacedOrder, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let mut order_type: Option<OrderType> = None;
        let mut reserved = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let listing = match listings::reserve_stock(item.listing_id, item.quantity, &mut tx).await? {
                Some(listing) => listing,
                None => {
                    let listing = listings::fetch_listing(item.listing_id, &mut tx)
                        .await?
                        .ok_or(MarketplaceError::ListingNotFound(item.listing_id))?;
                    check_listing_for_order(&listing, order.business_id, order_type)?;
                    debug!(
                        "🗃️ Listing #{} has {} units, but {} were requested",
                        listing.id, listing.quantity, item.quantity
                    );
                    return Err(ConflictError::InsufficientStock {
                        listing_id: listing.id,
                        requested: item.quantity,
                        available: listing.quantity,
                    }
                    .into());
                },
            };
            check_listing_for_order(&listing, order.business_id, order_type)?;
            order_type.get_or_insert(listing.listing_type);
            reserved.push((listing, item.quantity));
        }
        let order_type = order_type.ok_or(ValidationError::EmptyCart)?;
        let total_amount = reserved
            .iter()
            .try_fold(Rupiah::default(), |total, (listing, qty)| {
                listing.unit_price().checked_mul(*qty).and_then(|line| total.checked_add(line))
            })
            .ok_or(ValidationError::TotalOverflow)?;
        let row = orders::OrderRow {
            buyer_id: order.buyer_id,
            business_id: order.business_id,
            order_type,
            total_amount,
            delivery_method: order.delivery_method,
            delivery_address: order.persisted_address(),
        };
        let new_order = orders::insert_order(row, &mut tx).await?;
        let mut items = Vec::with_capacity(reserved.len());
        for (listing, qty) in &reserved {
            let item = orders::insert_line_item(new_order.id, listing.id, *qty, listing.unit_price(), &mut tx).await?;
            items.push(item);
        }
        let payment = match order_type {
            OrderType::Donation => None,
            OrderType::Sell => {
                let reference = GatewayOrderRef::new(new_order.id).to_string();
                let payment = payments::insert_payment(new_order.id, &reference, order.payment_method, &mut tx).await?;
                let request = TransactionRequest {
                    order_reference: reference,
                    gross_amount: total_amount,
                    enabled_methods: Vec::new(),
                    customer_email: order.buyer_email.clone(),
                    items: reserved
                        .iter()
                        .map(|(listing, qty)| TransactionItem {
                            listing_id: listing.id,
                            name: listing.title.clone(),
                            unit_price: listing.unit_price(),
                            quantity: *qty,
                        })
                        .collect(),
                };
                let transaction = gateway.create_transaction(request).await.map_err(|e| {
                    warn!("🗃️ Gateway transaction for order #{} failed. Rolling back. {e}", new_order.id);
                    MarketplaceError::from(e)
                })?;
                Some(payments::attach_gateway_transaction(payment.id, &transaction, &mut tx).await?)
            },
        };
        tx.commit().await?;
        debug!(
            "🗃️ Order #{} placed: {} item(s), total {}, status {}",
            new_order.id,
            items.len(),
            new_order.total_amount,
            new_order.status
        );
        Ok(PlacedOrder { order: new_order, items, payment })
    }

    async fn apply_payment_update(&self, update: PaymentUpdate) -> Result<ReconcileOutcome, MarketplaceError> {
        let order_id = update.order_id;
        let mut tx = self.pool.begin().await?;
        let updated = payments::update_pending_payment(
            order_id,
            update.payment_status,
            update.transaction_id.as_deref(),
            update.payment_method,
            &mut tx,
        )
        .await?;
        let Some(payment) = updated else {
            // Nothing was written, so dropping the transaction is enough
            return match payments::fetch_payment_for_order(order_id, &mut tx).await? {
                Some(payment) => {
                    debug!("🗃️ Payment for order #{order_id} is already {}. Nothing to do", payment.status);
                    Ok(ReconcileOutcome::Unchanged { payment })
                },
                None => match orders::fetch_order(order_id, &mut tx).await? {
                    Some(_) => Err(MarketplaceError::PaymentNotFound(order_id)),
                    None => Err(MarketplaceError::OrderNotFound(order_id)),
                },
            };
        };
        let current = orders::fetch_order(order_id, &mut tx).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let mut order = None;
        if update.order_status != OrderStatusType::Pending {
            // The payment and the order move together or not at all
            if let Err(e) =
                check_transition(current.order_type, TransitionSource::Gateway, current.status, update.order_status)
            {
                warn!(
                    "🗃️ Order #{order_id} is {}. Ignoring gateway status '{}' for its payment. {e}",
                    current.status, update.payment_status
                );
                return self.discard_payment_update(tx, order_id).await;
            }
            order = orders::update_status_if(order_id, current.status, update.order_status, &mut tx).await?;
            if order.is_none() {
                warn!("🗃️ Order #{order_id} changed while applying gateway status '{}'", update.order_status);
                return self.discard_payment_update(tx, order_id).await;
            }
        }
        let outcome = match payment.status {
            PaymentStatus::Success => {
                let order = match order {
                    Some(o) => o,
                    None => orders::fetch_order(order_id, &mut tx).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?,
                };
                if update.gross_amount != order.total_amount {
                    warn!(
                        "🗃️ Gateway settled {} for order #{order_id}, but the order total is {}. Crediting the settled \
                         amount.",
                        update.gross_amount, order.total_amount
                    );
                }
                let business_id = order.business_id;
                let amount = update.gross_amount;
                if !payments::journal_settlement(order_id, payment.id, business_id, amount, &mut tx).await? {
                    warn!("🗃️ Order #{order_id} has already been settled. Rolling back the payment update.");
                    let payment = payments::fetch_payment_for_order(order_id, &mut tx).await?.unwrap_or(payment);
                    return Ok(ReconcileOutcome::Unchanged { payment });
                }
                let balance = businesses::credit_balance(business_id, amount, &mut tx).await?.ok_or_else(|| {
                    MarketplaceError::DatabaseError(format!("Business {business_id} has no balance ledger"))
                })?;
                info!("🗃️ Order #{order_id} settled. Business {business_id} credited {amount}, balance {balance}");
                ReconcileOutcome::Settled { order, payment, credited: amount }
            },
            _ => {
                debug!("🗃️ Payment for order #{order_id} is now {}", payment.status);
                ReconcileOutcome::Updated { payment, order }
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Order, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        match orders::update_status_if(order_id, expected, new_status, &mut conn).await? {
            Some(order) => Ok(order),
            None => match orders::fetch_order(order_id, &mut conn).await? {
                Some(order) => {
                    debug!("🗃️ Order #{order_id} changed to {} while a move to {new_status} was requested", order.status);
                    Err(ValidationError::InvalidTransition { from: order.status, to: new_status }.into())
                },
                None => Err(MarketplaceError::OrderNotFound(order_id)),
            },
        }
    }

    async fn record_client_transaction_id(
        &self,
        order_id: i64,
        transaction_id: &str,
    ) -> Result<Payment, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let updated =
            payments::update_pending_payment(order_id, PaymentStatus::Pending, Some(transaction_id), None, &mut conn)
                .await?;
        if let Some(payment) = updated {
            debug!("🗃️ Client reported transaction {transaction_id} for order #{order_id}");
            return Ok(payment);
        }
        match payments::fetch_payment_for_order(order_id, &mut conn).await? {
            Some(payment) => {
                debug!("🗃️ Payment for order #{order_id} is already {}. Client report ignored", payment.status);
                Ok(payment)
            },
            None => match orders::fetch_order(order_id, &mut conn).await? {
                Some(_) => Err(MarketplaceError::PaymentNotFound(order_id)),
                None => Err(MarketplaceError::OrderNotFound(order_id)),
            },
        }
    }

    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, MarketplaceError> {
        let business_id = withdrawal.business_id;
        let amount = withdrawal.amount;
        let mut tx = self.pool.begin().await?;
        match businesses::debit_balance(business_id, amount, &mut tx).await? {
            Some(balance) => trace!("🗃️ Withdrawal of {amount} reserved. Business {business_id} has {balance} left"),
            None => {
                return match businesses::fetch_business(business_id, &mut tx).await? {
                    Some(b) => {
                        debug!("🗃️ Business {business_id} has {} but asked to withdraw {amount}", b.balance);
                        Err(ConflictError::InsufficientBalance(business_id).into())
                    },
                    None => Err(MarketplaceError::BusinessNotFound(business_id)),
                };
            },
        }
        let record = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn close(&mut self) -> Result<(), MarketplaceError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_line_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_buyer(buyer_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_business(&self, business_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_business(business_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_business(&self, business_id: i64) -> Result<Option<BusinessProfile>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let business = businesses::fetch_business(business_id, &mut conn).await?;
        Ok(business)
    }

    async fn fetch_withdrawals_for_business(&self, business_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = withdrawals::fetch_withdrawals_for_business(business_id, &mut conn).await?;
        Ok(withdrawals)
    }
}

impl ListingManagement for SqliteDatabase {
    async fn fetch_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let listing = listings::fetch_listing(listing_id, &mut conn).await?;
        Ok(listing)
    }

    async fn fetch_listings_for_business(&self, business_id: i64) -> Result<Vec<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let listings = listings::fetch_listings_for_business(business_id, &mut conn).await?;
        Ok(listings)
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        listings::insert_listing(listing, &mut conn).await
    }

    async fn insert_business(&self, business: NewBusiness) -> Result<BusinessProfile, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        businesses::insert_business(business, &mut conn).await
    }
}
