use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use sfm_engine::{
    db_types::{
        BusinessProfile,
        DeliveryMethod,
        Order,
        OrderStatusType,
        OrderType,
        Payment,
        PaymentMethod,
        PaymentStatus,
        Rupiah,
    },
    AccountApi,
};

use super::helpers::{bearer, get_request, issue_token, json};
use crate::{
    endpoint_tests::mocks::MockAccountManager,
    routes::{BusinessOrdersRoute, MyBalanceRoute, MyOrdersRoute, PaymentStatusRoute},
};

const BUYER: i64 = 7;
const BUSINESS: i64 = 12;

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No bearer token"), "{body}");
}

#[actix_web::test]
async fn fetch_my_orders_wrong_secret() {
    let _ = env_logger::try_init().ok();
    let token = format!("Bearer {}", issue_token(BUYER, "some-other-secret"));
    let (status, body) = get_request(&token, "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature is invalid"), "{body}");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&bearer(BUYER), "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders = json(&body);
    let orders = orders.as_array().expect("Expected an array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], 5);
    assert_eq!(orders[0]["buyerId"], BUYER);
    assert_eq!(orders[0]["orderType"], "sell");
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["totalAmount"], 30_000);
}

#[actix_web::test]
async fn fetch_business_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&bearer(BUSINESS), "/orders/business", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)[0]["businessId"], BUSINESS);
}

#[actix_web::test]
async fn fetch_balance() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&bearer(BUSINESS), "/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let profile = json(&body);
    assert_eq!(profile["balance"], 125_000);
    assert_eq!(profile["businessName"], "Warung Bu Tini");
}

#[actix_web::test]
async fn fetch_balance_without_a_business() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&bearer(BUYER), "/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Business 7 does not exist"), "{body}");
}

#[actix_web::test]
async fn payment_status_for_a_party() {
    let _ = env_logger::try_init().ok();
    for caller in [BUYER, BUSINESS] {
        let (status, body) =
            get_request(&bearer(caller), "/orders/5/payment-status", configure).await.expect("Request failed");
        assert_eq!(status, StatusCode::OK);
        let payment = json(&body);
        assert_eq!(payment["status"], "pending");
        assert_eq!(payment["gatewayReference"], "order-5");
    }
}

#[actix_web::test]
async fn payment_status_for_a_stranger() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(&bearer(99), "/orders/5/payment-status", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn payment_status_for_a_missing_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(&bearer(BUYER), "/orders/6/payment-status", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_orders_for_buyer().with(eq(BUYER)).returning(|_| Ok(vec![sample_order()]));
    account_manager.expect_fetch_orders_for_business().with(eq(BUSINESS)).returning(|_| Ok(vec![sample_order()]));
    account_manager.expect_fetch_business().returning(|id| Ok((id == BUSINESS).then(sample_business)));
    account_manager.expect_fetch_order().returning(|id| Ok((id == 5).then(sample_order)));
    account_manager.expect_fetch_payment_for_order().returning(|_| Ok(Some(sample_payment())));
    let accounts_api = AccountApi::new(account_manager);
    cfg.service(MyOrdersRoute::<MockAccountManager>::new())
        .service(BusinessOrdersRoute::<MockAccountManager>::new())
        .service(MyBalanceRoute::<MockAccountManager>::new())
        .service(PaymentStatusRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(accounts_api));
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
}

fn sample_order() -> Order {
    Order {
        id: 5,
        buyer_id: BUYER,
        business_id: BUSINESS,
        order_type: OrderType::Sell,
        total_amount: Rupiah::from(30_000),
        status: OrderStatusType::Pending,
        delivery_method: DeliveryMethod::Pickup,
        delivery_address: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn sample_business() -> BusinessProfile {
    BusinessProfile {
        id: 1,
        user_id: BUSINESS,
        business_name: "Warung Bu Tini".to_string(),
        balance: Rupiah::from(125_000),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn sample_payment() -> Payment {
    Payment {
        id: 1,
        order_id: 5,
        status: PaymentStatus::Pending,
        payment_method: Some(PaymentMethod::Gopay),
        gateway_reference: "order-5".to_string(),
        gateway_token: Some("snap-order-5".to_string()),
        redirect_url: Some("https://pay.example.test/snap/order-5".to_string()),
        transaction_id: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
