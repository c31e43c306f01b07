//! Adapts the Midtrans Snap client to the engine's [`PaymentGateway`] seam, and Midtrans notifications to the
//! engine's [`PaymentNotification`].
use log::*;
use midtrans_tools::{
    ItemDetails,
    MidtransApi,
    MidtransApiError,
    MidtransConfig,
    MidtransNotification,
    SnapTransactionRequest,
};
use sfm_engine::{
    gateway_objects::PaymentNotification,
    traits::{GatewayError, GatewayTransaction, PaymentGateway, TransactionRequest},
};

// Snap rejects item names longer than this
const MAX_ITEM_NAME_LEN: usize = 50;

#[derive(Clone)]
pub struct MidtransGateway {
    api: MidtransApi,
}

impl MidtransGateway {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let api = MidtransApi::new(config)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &MidtransApi {
        &self.api
    }
}

impl PaymentGateway for MidtransGateway {
    async fn create_transaction(&self, request: TransactionRequest) -> Result<GatewayTransaction, GatewayError> {
        let snap_request = snap_request_from(request);
        let order_id = snap_request.transaction_details.order_id.clone();
        let transaction = self.api.create_transaction(snap_request).await.map_err(|e| {
            warn!("💳️ Could not create a Snap transaction for {order_id}. {e}");
            gateway_error_from(e)
        })?;
        debug!("💳️ Snap transaction created for {order_id}");
        Ok(GatewayTransaction { token: transaction.token, redirect_url: transaction.redirect_url })
    }
}

pub fn snap_request_from(request: TransactionRequest) -> SnapTransactionRequest {
    let mut snap = SnapTransactionRequest::new(request.order_reference, request.gross_amount.value())
        .with_enabled_payments(&request.enabled_methods);
    for item in request.items {
        snap = snap.with_item(ItemDetails {
            id: item.listing_id.to_string(),
            price: item.unit_price.value(),
            quantity: item.quantity,
            name: item.name.chars().take(MAX_ITEM_NAME_LEN).collect(),
        });
    }
    if let Some(email) = request.customer_email {
        snap = snap.with_customer_email(email);
    }
    snap
}

pub fn gateway_error_from(e: MidtransApiError) -> GatewayError {
    match e {
        MidtransApiError::Timeout => GatewayError::Timeout,
        MidtransApiError::QueryError { status, message } => GatewayError::Rejected(format!("{status}: {message}")),
        MidtransApiError::Initialization(s) | MidtransApiError::RequestError(s) | MidtransApiError::JsonError(s) => {
            GatewayError::Unreachable(s)
        },
    }
}

pub fn payment_notification_from(n: MidtransNotification) -> PaymentNotification {
    PaymentNotification {
        order_id: n.order_id,
        status_code: n.status_code,
        gross_amount: n.gross_amount,
        signature_key: n.signature_key,
        transaction_status: n.transaction_status,
        fraud_status: n.fraud_status,
        transaction_id: n.transaction_id,
        payment_type: n.payment_type,
    }
}
