use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json as body;
use sfm_engine::{
    test_utils::prepare_env::{drop_database, fresh_database},
    traits::AccountManagement,
    AccountApi,
    SqliteDatabase,
    WithdrawalApi,
};

use super::helpers::{bearer, fund_business, get_request, json, post_request};
use crate::routes::{MyBalanceRoute, MyWithdrawalsRoute, RequestWithdrawalRoute};

const BUSINESS: i64 = 25;

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(RequestWithdrawalRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(WithdrawalApi::new(db.clone())))
            .app_data(web::Data::new(AccountApi::new(db)));
    }
}

fn withdrawal(amount: i64) -> serde_json::Value {
    body!({ "businessId": BUSINESS, "amount": amount, "destination": "BCA 0123456789", "paymentMethod": "transfer" })
}

async fn balance(db: &SqliteDatabase) -> i64 {
    db.fetch_business(BUSINESS).await.unwrap().unwrap().balance.value()
}

#[actix_web::test]
async fn withdraw_part_of_the_balance() {
    let (url, db) = fresh_database(1).await;
    fund_business(&db, BUSINESS, 100_000).await;
    let (status, res) =
        post_request(&bearer(BUSINESS), "/withdrawals", withdrawal(40_000), configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::OK, "{res}");
    let w = json(&res);
    assert_eq!(w["amount"], 40_000);
    assert_eq!(w["status"], "pending");
    assert_eq!(w["paymentMethod"], "transfer");

    let (status, res) = get_request(&bearer(BUSINESS), "/balance", configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&res)["balance"], 60_000);

    let (status, res) = get_request(&bearer(BUSINESS), "/withdrawals", configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&res).as_array().map(|a| a.len()), Some(1));
    drop_database(&url).await;
}

#[actix_web::test]
async fn overdrafts_are_rejected() {
    let (url, db) = fresh_database(1).await;
    fund_business(&db, BUSINESS, 25_000).await;
    let (status, res) =
        post_request(&bearer(BUSINESS), "/withdrawals", withdrawal(25_001), configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("Insufficient balance"), "{res}");
    assert_eq!(balance(&db).await, 25_000);

    // The whole balance may be withdrawn
    let (status, _) =
        post_request(&bearer(BUSINESS), "/withdrawals", withdrawal(25_000), configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance(&db).await, 0);
    drop_database(&url).await;
}

#[actix_web::test]
async fn only_the_business_may_withdraw() {
    let (url, db) = fresh_database(1).await;
    fund_business(&db, BUSINESS, 50_000).await;
    let (status, _) =
        post_request(&bearer(BUSINESS + 1), "/withdrawals", withdrawal(10_000), configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(balance(&db).await, 50_000);
    drop_database(&url).await;
}

#[actix_web::test]
async fn bad_requests_change_nothing() {
    let (url, db) = fresh_database(1).await;
    fund_business(&db, BUSINESS, 50_000).await;
    let mut no_destination = withdrawal(10_000);
    no_destination["destination"] = body!(" ");
    for (request, expected) in
        [(withdrawal(0), "greater than zero"), (withdrawal(-500), "greater than zero"), (no_destination, "destination")]
    {
        let (status, res) =
            post_request(&bearer(BUSINESS), "/withdrawals", request, configure(db.clone())).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.contains(expected), "{res}");
    }
    assert_eq!(balance(&db).await, 50_000);
    drop_database(&url).await;
}

#[actix_web::test]
async fn duplicate_transaction_ids_roll_back() {
    let (url, db) = fresh_database(1).await;
    fund_business(&db, BUSINESS, 50_000).await;
    let mut request = withdrawal(10_000);
    request["transactionId"] = body!("wd-2024-001");
    let (status, _) =
        post_request(&bearer(BUSINESS), "/withdrawals", request.clone(), configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let (status, res) = post_request(&bearer(BUSINESS), "/withdrawals", request, configure(db.clone())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("wd-2024-001"), "{res}");
    assert_eq!(balance(&db).await, 40_000);
    drop_database(&url).await;
}
