use std::collections::HashMap;

use cucumber::World;
use log::*;
use sfm_common::Secret;
use sfm_engine::{
    db_types::{Order, Withdrawal},
    test_utils::{
        prepare_env::{create_database, drop_database, random_db_path, run_migrations},
        stub_gateway::StubGateway,
    },
    traits::{MarketplaceDatabase, MarketplaceError, PlacedOrder},
    AccountApi,
    OrderFlowApi,
    SqliteDatabase,
    WebhookApi,
    WithdrawalApi,
};

pub const SERVER_KEY: &str = "SB-Mid-server-cucumber";

#[derive(Default, Debug, World)]
pub struct MarketplaceWorld {
    pub system: Option<MarketplaceSystem>,
    /// Listing ids by title
    pub listings: HashMap<String, i64>,
    pub last_order: Option<PlacedOrder>,
    pub last_update: Option<Result<Order, MarketplaceError>>,
    pub last_withdrawal: Option<Result<Withdrawal, MarketplaceError>>,
    pub last_error: Option<MarketplaceError>,
}

#[derive(Debug)]
pub struct MarketplaceSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase, StubGateway>,
    pub webhooks: WebhookApi<SqliteDatabase>,
    pub withdrawals: WithdrawalApi<SqliteDatabase>,
    pub accounts: AccountApi<SqliteDatabase>,
}

impl MarketplaceWorld {
    pub fn system(&self) -> &MarketplaceSystem {
        self.system.as_ref().expect("Marketplace not initialised. Start with 'Given a fresh install'")
    }

    pub fn listing_id(&self, title: &str) -> i64 {
        *self.listings.get(title).unwrap_or_else(|| panic!("No listing called {title}"))
    }

    pub fn last_order(&self) -> &PlacedOrder {
        self.last_order.as_ref().expect("No order has been placed")
    }
}

impl MarketplaceSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let orders = OrderFlowApi::new(db.clone(), StubGateway::new());
        let webhooks = WebhookApi::new(db.clone(), Secret::new(SERVER_KEY.to_string()));
        let withdrawals = WithdrawalApi::new(db.clone());
        let accounts = AccountApi::new(db.clone());
        Self { db_path: url, db, orders, webhooks, withdrawals, accounts }
    }

    pub async fn teardown(mut self) {
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        drop_database(&self.db_path).await;
        debug!("🚀️ Removed database: {}", self.db_path);
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
