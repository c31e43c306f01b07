use std::{net::IpAddr, time::Duration};

use actix_web::{
    dev::{HttpServiceFactory, Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::future::{ok, Either};
use log::*;
use sfm_engine::{traits::MarketplaceDatabase, AccountApi, OrderFlowApi, SqliteDatabase, WebhookApi, WithdrawalApi};

use crate::{
    auth::TokenValidator,
    config::ServerConfig,
    errors::{AuthError, ServerError, ServerError::AuthenticationError},
    helpers::{get_remote_ip, peer_is_whitelisted},
    integrations::midtrans::MidtransGateway,
    routes::{
        health,
        BusinessOrdersRoute,
        MidtransWebhookRoute,
        MyBalanceRoute,
        MyOrdersRoute,
        MyWithdrawalsRoute,
        OrderByIdRoute,
        PaymentStatusRoute,
        PaymentSuccessRoute,
        PlaceOrderRoute,
        RequestWithdrawalRoute,
        ResumePaymentRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway = MidtransGateway::new(config.midtrans.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Midtrans client. {e}")))?;
    let validator = TokenValidator::new(&config.auth);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let accounts_api = AccountApi::new(db.clone());
        let withdrawals_api = WithdrawalApi::new(db.clone());
        let webhook_api = WebhookApi::new(db.clone(), config.midtrans.server_key.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfm::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(withdrawals_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(validator.clone()));
        // Routes that require a bearer token. `/orders/business` must be registered ahead of `/orders/{id}`.
        let api_scope = web::scope("/api")
            .service(PlaceOrderRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(BusinessOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(ResumePaymentRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentSuccessRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new())
            .service(RequestWithdrawalRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new());
        let webhook_scope = webhook_scope::<SqliteDatabase>(
            config.webhook_whitelist.clone(),
            config.use_x_forwarded_for,
            config.use_forwarded,
        );
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Server bound and listening");
    Ok(srv)
}

/// The `/webhook` scope. When a whitelist is given, only requests from those addresses reach the handlers.
pub fn webhook_scope<B: MarketplaceDatabase + 'static>(
    whitelist: Option<Vec<IpAddr>>,
    use_x_forwarded_for: bool,
    use_forwarded: bool,
) -> impl HttpServiceFactory {
    web::scope("/webhook")
        .wrap_fn(move |req, srv| {
            // Collect peer IP from x-forwarded-for, or forwarded headers _if_ `use_nnn` has been set to true
            // in the configuration. Otherwise, use the peer address from the connection info.
            let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
            if peer_is_whitelisted(peer_ip, whitelist.as_deref()) {
                Either::Left(srv.call(req))
            } else {
                Either::Right(ok(req.error_response(AuthenticationError(AuthError::ForbiddenPeer))))
            }
        })
        .service(MidtransWebhookRoute::<B>::new())
}
