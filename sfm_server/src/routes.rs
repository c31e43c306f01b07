//! Request handler definitions
//!
//! Define each route and its handler here. Handlers should do no more than unpack the request, call into the engine
//! and shape the response. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database and gateway call in here is async for this reason.
use actix_web::{get, http::StatusCode, web, HttpResponse, Responder, ResponseError};
use log::*;
use midtrans_tools::MidtransNotification;
use sfm_engine::{
    traits::{AccountManagement, MarketplaceDatabase, PaymentGateway},
    AccountApi,
    OrderFlowApi,
    WebhookApi,
    WithdrawalApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{
        CreateOrderRequest,
        PaymentSuccessParams,
        PlacedOrderResponse,
        UpdateStatusParams,
        WebhookResponse,
        WithdrawalRequest,
    },
    errors::ServerError,
    integrations::midtrans::payment_notification_from,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl MarketplaceDatabase, PaymentGateway);
/// Route handler for placing an order.
///
/// The caller is the buyer. Prices are taken from the listings at the moment of placement; any `price` sent by the
/// client is ignored. Sell orders come back with the gateway token and redirect URL the client needs to collect
/// payment. Donation orders have neither.
pub async fn place_order<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order for buyer {}", claims.user_id);
    let order = body.into_inner().into_new_order(&claims);
    let placed = api.place_order(order).await.map_err(|e| {
        debug!("💻️ Could not place order for buyer {}. {e}", claims.user_id);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(PlacedOrderResponse::from(placed)))
}

route!(my_orders => Get "/orders" impl AccountManagement);
/// The caller's orders, as a buyer.
pub async fn my_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.user_id);
    let orders = api.orders_for_buyer(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(business_orders => Get "/orders/business" impl AccountManagement);
/// Orders placed with the caller's business.
pub async fn business_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET business_orders for {}", claims.user_id);
    let orders = api.orders_for_business(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl MarketplaceDatabase, PaymentGateway);
pub async fn order_by_id<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", claims.user_id);
    let details = api.order_details(claims.user_id, order_id).await?;
    Ok(HttpResponse::Ok().json(details))
}

route!(update_order_status => Patch "/orders/{id}/status" impl MarketplaceDatabase, PaymentGateway);
/// Route handler for manual status changes by the order's business.
///
/// Only the moves the business is allowed to make are accepted. `paid`, `expired` and `denied` are set by the payment
/// gateway alone.
pub async fn update_order_status<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusParams>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    debug!("💻️ PATCH order {order_id} to {status} by {}", claims.user_id);
    let order = api.update_order_status(claims.user_id, order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(resume_payment => Post "/orders/{id}/payment" impl MarketplaceDatabase, PaymentGateway);
/// Hands the buyer the gateway token of an unpaid sell order again, so that checkout can be resumed.
pub async fn resume_payment<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST resume payment for order {order_id} by {}", claims.user_id);
    let payment = api.resume_payment(claims.user_id, order_id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payment_success => Patch "/orders/{id}/payment-success" impl MarketplaceDatabase, PaymentGateway);
/// Records the transaction id the client got back from the gateway's checkout.
///
/// This does not settle anything. Payments are only settled by a verified gateway notification.
pub async fn payment_success<B: MarketplaceDatabase, G: PaymentGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<PaymentSuccessParams>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH payment-success for order {order_id} by {}", claims.user_id);
    let payment = api.confirm_payment_from_client(claims.user_id, order_id, &body.transaction_id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(payment_status => Get "/orders/{id}/payment-status" impl AccountManagement);
pub async fn payment_status<B: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment-status for order {order_id} by {}", claims.user_id);
    let payment = api.payment_for_order(claims.user_id, order_id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

//----------------------------------------------   Withdrawals  ----------------------------------------------------
route!(request_withdrawal => Post "/withdrawals" impl MarketplaceDatabase);
/// Route handler for withdrawal requests. The caller must be the business the funds are withdrawn from.
pub async fn request_withdrawal<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<WithdrawalRequest>,
    api: web::Data<WithdrawalApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST withdrawal of {} for business {} by {}", request.amount, request.business_id, claims.user_id);
    let withdrawal = api.request_withdrawal(claims.user_id, request.into()).await?;
    Ok(HttpResponse::Ok().json(withdrawal))
}

route!(my_withdrawals => Get "/withdrawals" impl AccountManagement);
pub async fn my_withdrawals<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_withdrawals for {}", claims.user_id);
    let withdrawals = api.withdrawals_for_business(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}

route!(my_balance => Get "/balance" impl AccountManagement);
/// The caller's business profile, including its current balance.
pub async fn my_balance<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_balance for {}", claims.user_id);
    let profile = api.balance_for_business(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(midtrans_webhook => Post "/midtrans" impl MarketplaceDatabase);
/// Route handler for Midtrans payment notifications.
///
/// The gateway only looks at the status code. 200 means the notification was handled (including repeats that changed
/// nothing). A 4xx tells the gateway to give up: the notification is forged, malformed or refers to an order we do
/// not know. A 5xx asks it to try again later.
pub async fn midtrans_webhook<B: MarketplaceDatabase>(body: web::Bytes, api: web::Data<WebhookApi<B>>) -> HttpResponse {
    trace!("💻️ Received Midtrans notification");
    let notification = match serde_json::from_slice::<MidtransNotification>(&body) {
        Ok(n) => payment_notification_from(n),
        Err(e) => {
            warn!("💻️ Could not deserialize Midtrans notification. {e}");
            return HttpResponse::BadRequest().json(WebhookResponse::error());
        },
    };
    let order_ref = notification.order_id.clone();
    match api.process_notification(notification).await {
        Ok(outcome) => {
            debug!("💻️ Notification for {order_ref} handled. Payment is {}", outcome.payment().status);
            HttpResponse::Ok().json(WebhookResponse::ok())
        },
        Err(e) => {
            let retry = e.is_retryable();
            let status = if retry {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                ServerError::from(e.clone()).status_code()
            };
            warn!("💻️ Notification for {order_ref} failed ({status}, retry: {retry}). {e}");
            HttpResponse::build(status).json(WebhookResponse::error())
        },
    }
}
