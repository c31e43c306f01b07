use std::str::FromStr;

use cucumber::{given, then, when};
use sfm_engine::{
    db_types::{
        DeliveryMethod,
        NewBusiness,
        NewListing,
        NewOrder,
        NewOrderItem,
        NewWithdrawal,
        OrderStatusType,
        PaymentMethod,
        PaymentStatus,
        Rupiah,
    },
    gateway_objects::PaymentNotification,
    helpers::notification_signature,
    traits::{AccountManagement, ConflictError, ListingManagement, MarketplaceError, ValidationError},
};

use crate::cucumber::{marketplace_world::SERVER_KEY, MarketplaceWorld};

//--------------------------------------        Givens       ---------------------------------------------------------

#[given(expr = "a business {int} called {string}")]
async fn business(world: &mut MarketplaceWorld, user_id: i64, name: String) {
    world.system().db.insert_business(NewBusiness::new(user_id, name)).await.expect("Error creating business");
}

#[given(expr = "business {int} lists {int} units of {string} for sale at {int} IDR")]
async fn sell_listing(world: &mut MarketplaceWorld, business_id: i64, quantity: i64, title: String, price: i64) {
    add_listing(world, NewListing::for_sale(business_id, title, Rupiah::from(price), quantity)).await;
}

#[given(expr = "business {int} lists {int} units of {string} for sale at {int} IDR with a {int}% discount")]
async fn discounted_listing(
    world: &mut MarketplaceWorld,
    business_id: i64,
    quantity: i64,
    title: String,
    price: i64,
    discount: i64,
) {
    let listing = NewListing::for_sale(business_id, title, Rupiah::from(price), quantity).with_discount(discount);
    add_listing(world, listing).await;
}

#[given(expr = "business {int} offers {int} units of {string} as a donation")]
async fn donation_listing(world: &mut MarketplaceWorld, business_id: i64, quantity: i64, title: String) {
    add_listing(world, NewListing::donation(business_id, title, quantity)).await;
}

async fn add_listing(world: &mut MarketplaceWorld, listing: NewListing) {
    let listing = world.system().db.insert_listing(listing).await.expect("Error creating listing");
    world.listings.insert(listing.title.clone(), listing.id);
}

#[given(expr = "business {int} has a balance of {int} IDR")]
async fn set_balance(world: &mut MarketplaceWorld, business_id: i64, balance: i64) {
    sqlx::query("UPDATE business_profiles SET balance = $1 WHERE user_id = $2")
        .bind(balance)
        .bind(business_id)
        .execute(world.system().db.pool())
        .await
        .expect("Error setting balance");
}

//--------------------------------------     Placing orders    -------------------------------------------------------

#[when(expr = "buyer {int} orders {int} {string} from business {int} for pickup")]
async fn order_for_pickup(world: &mut MarketplaceWorld, buyer: i64, quantity: i64, title: String, business_id: i64) {
    let listing_id = world.listing_id(&title);
    let order = NewOrder::new(buyer, business_id, DeliveryMethod::Pickup).with_item(listing_id, quantity);
    place_order(world, order).await;
}

#[when(expr = "buyer {int} orders {int} {string} and {int} {string} from business {int} for pickup")]
async fn order_two_items(
    world: &mut MarketplaceWorld,
    buyer: i64,
    qty1: i64,
    title1: String,
    qty2: i64,
    title2: String,
    business_id: i64,
) {
    let order = NewOrder::new(buyer, business_id, DeliveryMethod::Pickup)
        .with_item(world.listing_id(&title1), qty1)
        .with_item(world.listing_id(&title2), qty2);
    place_order(world, order).await;
}

#[when(expr = "buyer {int} orders {int} {string} from business {int} for pickup, quoting {int} IDR each")]
async fn order_with_client_price(
    world: &mut MarketplaceWorld,
    buyer: i64,
    quantity: i64,
    title: String,
    business_id: i64,
    price: i64,
) {
    let mut order = NewOrder::new(buyer, business_id, DeliveryMethod::Pickup);
    let mut item = NewOrderItem::new(world.listing_id(&title), quantity);
    item.price = Some(Rupiah::from(price));
    order.items.push(item);
    place_order(world, order).await;
}

#[when(expr = "buyer {int} orders {int} {string} from business {int} for delivery to {string}")]
async fn order_for_delivery(
    world: &mut MarketplaceWorld,
    buyer: i64,
    quantity: i64,
    title: String,
    business_id: i64,
    address: String,
) {
    let order = NewOrder::new(buyer, business_id, DeliveryMethod::Delivery)
        .with_item(world.listing_id(&title), quantity)
        .with_address(address);
    place_order(world, order).await;
}

#[when(expr = "buyer {int} submits an empty cart to business {int}")]
async fn empty_cart(world: &mut MarketplaceWorld, buyer: i64, business_id: i64) {
    place_order(world, NewOrder::new(buyer, business_id, DeliveryMethod::Pickup)).await;
}

async fn place_order(world: &mut MarketplaceWorld, order: NewOrder) {
    let result = world.system().orders.place_order(order).await;
    match result {
        Ok(placed) => {
            world.last_order = Some(placed);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[then(expr = "the order is created with status {word} and total {int} IDR")]
async fn order_created(world: &mut MarketplaceWorld, status: String, total: i64) {
    assert!(world.last_error.is_none(), "Order failed: {:?}", world.last_error);
    let order = &world.last_order().order;
    assert_eq!(order.status.to_string(), status);
    assert_eq!(order.total_amount, Rupiah::from(total));
}

#[then(expr = "every line item is priced at {int} IDR")]
async fn line_item_prices(world: &mut MarketplaceWorld, price: i64) {
    let items = &world.last_order().items;
    assert!(!items.is_empty());
    assert!(items.iter().all(|i| i.price == Rupiah::from(price)), "{items:?}");
}

#[then(expr = "the listing {string} has {int} units left")]
async fn units_left(world: &mut MarketplaceWorld, title: String, quantity: i64) {
    let id = world.listing_id(&title);
    let listing = world.system().db.fetch_listing(id).await.expect("Error fetching listing").expect("No listing");
    assert_eq!(listing.quantity, quantity);
}

#[then("the order has a pending payment with a gateway token")]
async fn pending_payment(world: &mut MarketplaceWorld) {
    let placed = world.last_order();
    let payment = placed.payment.as_ref().expect("No payment intent");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.gateway_reference, format!("order-{}", placed.order.id));
    assert!(placed.gateway_token().is_some());
    assert!(placed.gateway_redirect_url().is_some());
}

#[then("the order has no payment")]
async fn no_payment(world: &mut MarketplaceWorld) {
    let placed = world.last_order();
    assert!(placed.payment.is_none());
    let stored = world.system().db.fetch_payment_for_order(placed.order.id).await.expect("Error fetching payment");
    assert!(stored.is_none());
}

#[then(expr = "the order is rejected with a {word} error")]
async fn order_rejected(world: &mut MarketplaceWorld, kind: String) {
    let err = world.last_error.as_ref().expect("The order was accepted");
    let matched = match kind.as_str() {
        "mixed-type" => matches!(err, MarketplaceError::Validation(ValidationError::MixedOrderType(..))),
        "empty-cart" => matches!(err, MarketplaceError::Validation(ValidationError::EmptyCart)),
        "missing-address" => matches!(err, MarketplaceError::Validation(ValidationError::MissingAddress)),
        "wrong-business" => matches!(err, MarketplaceError::Validation(ValidationError::ListingNotFromBusiness(_))),
        "insufficient-stock" => matches!(err, MarketplaceError::Conflict(ConflictError::InsufficientStock { .. })),
        other => panic!("Unknown error kind {other}"),
    };
    assert!(matched, "Expected a {kind} error, got {err:?}");
}

#[then(expr = "buyer {int} has no orders")]
async fn no_orders(world: &mut MarketplaceWorld, buyer: i64) {
    let orders = world.system().accounts.orders_for_buyer(buyer).await.expect("Error fetching orders");
    assert!(orders.is_empty(), "{orders:?}");
}

//--------------------------------------     Notifications     -------------------------------------------------------

fn notification_for_last_order(world: &MarketplaceWorld, status: &str, gross: &str) -> PaymentNotification {
    let reference = format!("order-{}", world.last_order().order.id);
    PaymentNotification {
        signature_key: notification_signature(&reference, "200", gross, SERVER_KEY),
        order_id: reference,
        status_code: "200".to_string(),
        gross_amount: gross.to_string(),
        transaction_status: status.to_string(),
        fraud_status: None,
        transaction_id: Some(format!("tx-{status}")),
        payment_type: Some("bank_transfer".to_string()),
    }
}

#[when(expr = "the gateway sends a {word} notification for the order with gross amount {string}")]
async fn gateway_notification(world: &mut MarketplaceWorld, status: String, gross: String) {
    let notification = notification_for_last_order(world, &status, &gross);
    let result = world.system().webhooks.process_notification(notification).await;
    world.last_error = result.err();
}

#[when(expr = "a forged {word} notification arrives for the order")]
async fn forged_notification(world: &mut MarketplaceWorld, status: String) {
    let mut notification = notification_for_last_order(world, &status, "30000.00");
    notification.gross_amount = "990000.00".to_string();
    let result = world.system().webhooks.process_notification(notification).await;
    world.last_error = result.err();
}

#[then("the notification is rejected as unauthenticated")]
async fn notification_rejected(world: &mut MarketplaceWorld) {
    assert!(matches!(world.last_error, Some(MarketplaceError::InvalidSignature)), "{:?}", world.last_error);
}

#[then(expr = "the payment is {word}")]
async fn payment_status(world: &mut MarketplaceWorld, status: String) {
    let order_id = world.last_order().order.id;
    let payment = world.system().db.fetch_payment_for_order(order_id).await.unwrap().expect("No payment");
    assert_eq!(payment.status, PaymentStatus::from_str(&status).expect("Not a payment status"));
}

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut MarketplaceWorld, status: String) {
    let order_id = world.last_order().order.id;
    let order = world.system().db.fetch_order(order_id).await.unwrap().expect("No order");
    assert_eq!(order.status, OrderStatusType::from_str(&status).expect("Not an order status"));
}

#[then(expr = "the balance of business {int} is {int} IDR")]
async fn balance(world: &mut MarketplaceWorld, business_id: i64, amount: i64) {
    let business = world.system().accounts.balance_for_business(business_id).await.expect("Error fetching business");
    assert_eq!(business.balance, Rupiah::from(amount));
}

//--------------------------------------     Status updates    -------------------------------------------------------

#[when(expr = "user {int} moves the order to {word}")]
async fn move_order(world: &mut MarketplaceWorld, caller: i64, status: String) {
    let order_id = world.last_order().order.id;
    let target = OrderStatusType::from_str(&status).expect("Not an order status");
    let result = world.system().orders.update_order_status(caller, order_id, target).await;
    world.last_update = Some(result);
}

#[then("the status update succeeds")]
async fn update_succeeds(world: &mut MarketplaceWorld) {
    let result = world.last_update.as_ref().expect("No status update was made");
    assert!(result.is_ok(), "{result:?}");
}

#[then("the status update is rejected as an invalid transition")]
async fn update_rejected(world: &mut MarketplaceWorld) {
    let result = world.last_update.as_ref().expect("No status update was made");
    assert!(
        matches!(result, Err(MarketplaceError::Validation(ValidationError::InvalidTransition { .. }))),
        "{result:?}"
    );
}

//--------------------------------------      Withdrawals      -------------------------------------------------------

#[when(expr = "business {int} withdraws {int} IDR to {string}")]
async fn withdraw(world: &mut MarketplaceWorld, business_id: i64, amount: i64, destination: String) {
    let withdrawal = NewWithdrawal::new(business_id, Rupiah::from(amount), destination, PaymentMethod::Transfer);
    let result = world.system().withdrawals.request_withdrawal(business_id, withdrawal).await;
    world.last_withdrawal = Some(result);
}

#[when(expr = "user {int} withdraws {int} IDR from business {int}")]
async fn withdraw_as(world: &mut MarketplaceWorld, caller: i64, amount: i64, business_id: i64) {
    let withdrawal = NewWithdrawal::new(business_id, Rupiah::from(amount), "BCA 1234567", PaymentMethod::Transfer);
    let result = world.system().withdrawals.request_withdrawal(caller, withdrawal).await;
    world.last_withdrawal = Some(result);
}

#[when(expr = "business {int} withdraws {int} IDR to {string} with reference {string}")]
async fn withdraw_with_reference(
    world: &mut MarketplaceWorld,
    business_id: i64,
    amount: i64,
    destination: String,
    reference: String,
) {
    let withdrawal = NewWithdrawal::new(business_id, Rupiah::from(amount), destination, PaymentMethod::Transfer)
        .with_transaction_id(reference);
    let result = world.system().withdrawals.request_withdrawal(business_id, withdrawal).await;
    world.last_withdrawal = Some(result);
}

#[then("the withdrawal is accepted as pending")]
async fn withdrawal_accepted(world: &mut MarketplaceWorld) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was requested");
    let withdrawal = result.as_ref().expect("The withdrawal was rejected");
    assert_eq!(withdrawal.status, PaymentStatus::Pending);
    let history = world.system().accounts.withdrawals_for_business(withdrawal.business_id).await.unwrap();
    assert!(history.iter().any(|w| w.id == withdrawal.id));
}

#[then(expr = "the withdrawal is rejected with a {word} error")]
async fn withdrawal_rejected(world: &mut MarketplaceWorld, kind: String) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was requested");
    let err = result.as_ref().expect_err("The withdrawal was accepted");
    let matched = match kind.as_str() {
        "insufficient-balance" => matches!(err, MarketplaceError::Conflict(ConflictError::InsufficientBalance(_))),
        "duplicate" => matches!(err, MarketplaceError::Conflict(ConflictError::DuplicateWithdrawal(_))),
        "invalid-amount" => matches!(err, MarketplaceError::Validation(ValidationError::InvalidAmount)),
        "authorization" => matches!(err, MarketplaceError::Authorization(_)),
        other => panic!("Unknown error kind {other}"),
    };
    assert!(matched, "Expected a {kind} error, got {err:?}");
}
