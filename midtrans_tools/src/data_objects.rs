use serde::{Deserialize, Serialize};

//--------------------------------------   Snap transactions   --------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetails {
    pub id: String,
    pub price: i64,
    pub quantity: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `POST /snap/v1/transactions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapTransactionRequest {
    pub transaction_details: TransactionDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_payments: Vec<String>,
    /// Midtrans requires the item prices to add up to `gross_amount` when this is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_details: Vec<ItemDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
}

impl SnapTransactionRequest {
    pub fn new<S: Into<String>>(order_id: S, gross_amount: i64) -> Self {
        Self {
            transaction_details: TransactionDetails { order_id: order_id.into(), gross_amount },
            enabled_payments: Vec::new(),
            item_details: Vec::new(),
            customer_details: None,
        }
    }

    pub fn with_enabled_payments(mut self, payments: &[String]) -> Self {
        self.enabled_payments = payments.to_vec();
        self
    }

    pub fn with_item(mut self, item: ItemDetails) -> Self {
        self.item_details.push(item);
        self
    }

    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        let details = self.customer_details.get_or_insert_with(CustomerDetails::default);
        details.email = Some(email.into());
        self
    }

    pub fn items_total(&self) -> i64 {
        self.item_details.iter().map(|i| i.price * i.quantity).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapTransaction {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapErrorResponse {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

//--------------------------------------    Notifications     ---------------------------------------------------------

/// The HTTP notification Midtrans posts to the merchant's webhook. Only the fields the marketplace uses are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidtransNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}
