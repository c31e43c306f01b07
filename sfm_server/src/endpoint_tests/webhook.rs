use std::net::{IpAddr, SocketAddr};

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use sfm_engine::{
    db_types::{OrderStatusType, PaymentStatus},
    gateway_objects::PaymentNotification,
    test_utils::{
        prepare_env::{drop_database, fresh_database},
        seed::seed_business,
        stub_gateway::StubGateway,
    },
    traits::{AccountManagement, MarketplaceDatabase},
    OrderFlowApi,
    SqliteDatabase,
};

use super::helpers::{place_sell_order, send_request, signed_notification, webhook_api};
use crate::server::webhook_scope;

const BUYER: i64 = 8;
const BUSINESS: i64 = 61;

fn configure(db: SqliteDatabase, whitelist: Option<Vec<IpAddr>>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(webhook_scope::<SqliteDatabase>(whitelist, false, false)).app_data(web::Data::new(webhook_api(&db)));
    }
}

fn gateway_peer() -> SocketAddr {
    "103.208.23.6:443".parse().unwrap()
}

async fn notify(db: &SqliteDatabase, notification: &PaymentNotification) -> (StatusCode, String) {
    let req = TestRequest::post().uri("/webhook/midtrans").peer_addr(gateway_peer()).set_json(notification);
    send_request(req, configure(db.clone(), None)).await.expect("Request failed")
}

async fn balance(db: &SqliteDatabase) -> i64 {
    db.fetch_business(BUSINESS).await.unwrap().unwrap().balance.value()
}

#[actix_web::test]
async fn settlement_credits_the_business_once() {
    let (url, db) = fresh_database(2).await;
    seed_business(&db, BUSINESS, "Kedai Kopi Senja").await;
    let placed = place_sell_order(&db, BUYER, BUSINESS, 30_000).await;
    let notification = signed_notification(placed.order.id, "settlement", "30000.00");

    let (status, body) = notify(&db, &notification).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
    assert_eq!(balance(&db).await, 30_000);
    let payment = db.fetch_payment_for_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);

    // Redeliveries are acknowledged and change nothing
    for _ in 0..3 {
        let (status, body) = notify(&db, &notification).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }
    assert_eq!(balance(&db).await, 30_000);
    assert_eq!(db.settlement_count(placed.order.id).await.unwrap(), 1);
    drop_database(&url).await;
}

#[actix_web::test]
async fn settlements_for_cancelled_orders_are_acknowledged_but_not_credited() {
    let (url, db) = fresh_database(1).await;
    seed_business(&db, BUSINESS, "Kedai Kopi Senja").await;
    let placed = place_sell_order(&db, BUYER, BUSINESS, 30_000).await;
    let orders = OrderFlowApi::new(db.clone(), StubGateway::new());
    orders.update_order_status(BUSINESS, placed.order.id, OrderStatusType::Cancelled).await.unwrap();

    let (status, body) = notify(&db, &signed_notification(placed.order.id, "settlement", "30000.00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
    assert_eq!(balance(&db).await, 0);
    let payment = db.fetch_payment_for_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(db.fetch_order(placed.order.id).await.unwrap().unwrap().status, OrderStatusType::Cancelled);
    drop_database(&url).await;
}

#[actix_web::test]
async fn forged_notifications_are_refused() {
    let (url, db) = fresh_database(1).await;
    seed_business(&db, BUSINESS, "Kedai Kopi Senja").await;
    let placed = place_sell_order(&db, BUYER, BUSINESS, 30_000).await;
    let mut notification = signed_notification(placed.order.id, "settlement", "30000.00");
    notification.signature_key = "0".repeat(128);

    let (status, body) = notify(&db, &notification).await;
    assert!(status.is_client_error(), "{status}");
    assert_eq!(body, r#"{"status":"error"}"#);
    assert_eq!(balance(&db).await, 0);
    drop_database(&url).await;
}

#[actix_web::test]
async fn unknown_orders_are_not_retried() {
    let (url, db) = fresh_database(1).await;
    let (status, body) = notify(&db, &signed_notification(4040, "settlement", "30000.00")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"status":"error"}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn malformed_notifications_are_not_retried() {
    let (url, db) = fresh_database(1).await;
    let req = TestRequest::post()
        .uri("/webhook/midtrans")
        .peer_addr(gateway_peer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"order_id\": ");
    let (status, body) = send_request(req, configure(db, None)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"status":"error"}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn storage_failures_ask_for_a_retry() {
    let (url, mut db) = fresh_database(1).await;
    seed_business(&db, BUSINESS, "Kedai Kopi Senja").await;
    let placed = place_sell_order(&db, BUYER, BUSINESS, 30_000).await;
    let notification = signed_notification(placed.order.id, "settlement", "30000.00");
    db.close().await.unwrap();
    let (status, body) = notify(&db, &notification).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"status":"error"}"#);
    drop_database(&url).await;
}

#[actix_web::test]
async fn whitelist_blocks_other_peers() {
    let (url, db) = fresh_database(1).await;
    seed_business(&db, BUSINESS, "Kedai Kopi Senja").await;
    let placed = place_sell_order(&db, BUYER, BUSINESS, 30_000).await;
    let notification = signed_notification(placed.order.id, "settlement", "30000.00");
    let whitelist = Some(vec![gateway_peer().ip()]);

    let req = TestRequest::post()
        .uri("/webhook/midtrans")
        .peer_addr("198.51.100.7:5000".parse().unwrap())
        .set_json(&notification);
    let (status, _) = send_request(req, configure(db.clone(), whitelist.clone())).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(balance(&db).await, 0);

    let req = TestRequest::post().uri("/webhook/midtrans").peer_addr(gateway_peer()).set_json(&notification);
    let (status, _) = send_request(req, configure(db.clone(), whitelist)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance(&db).await, 30_000);
    drop_database(&url).await;
}
