//! Translation from the payment gateway's notification vocabulary into payment and order statuses.
use log::*;
use serde::{Deserialize, Serialize};

use crate::db_types::{OrderStatusType, PaymentMethod, PaymentStatus};

/// A payment notification as delivered by the gateway. Nothing in here is trusted until the signature has been
/// checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_type: Option<String>,
}

/// Maps a gateway `transaction_status` (and `fraud_status`) onto the payment and order statuses it implies.
///
/// Anything that is not a clean capture or settlement, and is not a definite failure, leaves both records pending.
pub fn map_transaction_status(transaction_status: &str, fraud_status: Option<&str>) -> (PaymentStatus, OrderStatusType) {
    let paid = (PaymentStatus::Success, OrderStatusType::Paid);
    let pending = (PaymentStatus::Pending, OrderStatusType::Pending);
    match (transaction_status, fraud_status) {
        ("capture", Some("accept")) => paid,
        ("settlement", Some("accept") | None) => paid,
        ("capture" | "settlement", fraud) => {
            warn!("🪝️ Gateway reported {transaction_status} with fraud status {fraud:?}. Holding the payment as pending");
            pending
        },
        ("pending", _) => pending,
        ("deny" | "cancel" | "failure", _) => (PaymentStatus::Failed, OrderStatusType::Cancelled),
        ("expire", _) => (PaymentStatus::Failed, OrderStatusType::Expired),
        (other, _) => {
            warn!("🪝️ Unhandled gateway transaction status '{other}'. Treating it as pending");
            pending
        },
    }
}

/// Maps the gateway's `payment_type` onto the payment methods the marketplace records.
pub fn map_payment_type(payment_type: Option<&str>) -> Option<PaymentMethod> {
    match payment_type? {
        "gopay" => Some(PaymentMethod::Gopay),
        "ovo" => Some(PaymentMethod::Ovo),
        "bank_transfer" | "echannel" | "permata" => Some(PaymentMethod::Transfer),
        _ => None,
    }
}
