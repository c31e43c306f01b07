use serde::{Deserialize, Serialize};
use sfm_engine::{
    db_types::{
        DeliveryMethod,
        NewOrder,
        NewOrderItem,
        NewWithdrawal,
        Order,
        OrderLineItem,
        OrderStatusType,
        Payment,
        PaymentMethod,
        Rupiah,
    },
    traits::PlacedOrder,
};

use crate::auth::JwtClaims;

/// The body of `POST /api/orders`. The buyer is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(alias = "sellerId")]
    pub business_id: i64,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl CreateOrderRequest {
    pub fn into_new_order(self, claims: &JwtClaims) -> NewOrder {
        NewOrder {
            buyer_id: claims.user_id,
            buyer_email: claims.email.clone(),
            business_id: self.business_id,
            delivery_method: self.delivery_method,
            delivery_address: self.delivery_address,
            payment_method: self.payment_method,
            items: self.items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderResponse {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_redirect_url: Option<String>,
}

impl From<PlacedOrder> for PlacedOrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        let gateway_token = placed.gateway_token().map(String::from);
        let gateway_redirect_url = placed.gateway_redirect_url().map(String::from);
        Self { order: placed.order, items: placed.items, payment: placed.payment, gateway_token, gateway_redirect_url }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusParams {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessParams {
    #[serde(alias = "transaction_id")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub business_id: i64,
    pub amount: Rupiah,
    pub destination: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl From<WithdrawalRequest> for NewWithdrawal {
    fn from(req: WithdrawalRequest) -> Self {
        NewWithdrawal {
            business_id: req.business_id,
            amount: req.amount,
            destination: req.destination,
            payment_method: req.payment_method,
            transaction_id: req.transaction_id,
        }
    }
}

/// What the gateway sees in reply to a notification. It only cares about the status code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }

    pub fn error() -> Self {
        Self { status: "error".to_string() }
    }
}
