use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sfm_common::Rupiah;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

/// Display and FromStr for the lower-case text vocabularies stored in the database
macro_rules! text_enum {
    ($type:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text),)+
                }
            }
        }

        impl FromStr for $type {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    s => Err(ConversionError(format!("{s} is not a valid {}", stringify!($type)))),
                }
            }
        }
    };
}

//--------------------------------------      OrderType      ---------------------------------------------------------
/// Whether a listing (and therefore an order placed against it) is a sale or a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Sell,
    Donation,
}

text_enum!(OrderType { Sell => "sell", Donation => "donation" });

/// Listings and orders share the same sell/donation vocabulary.
pub type ListingType = OrderType;

impl OrderType {
    /// The status every new order of this type starts in.
    pub fn initial_status(&self) -> OrderStatusType {
        match self {
            OrderType::Sell => OrderStatusType::Pending,
            OrderType::Donation => OrderStatusType::Requested,
        }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// A sell order awaiting payment, or a donation accepted by the business
    Pending,
    /// A donation request awaiting the business
    Requested,
    /// The gateway has settled the payment
    Paid,
    Delivered,
    Ready,
    Completed,
    Cancelled,
    Expired,
    /// The gateway refused the payment
    Denied,
}

text_enum!(OrderStatusType {
    Pending => "pending",
    Requested => "requested",
    Paid => "paid",
    Delivered => "delivered",
    Ready => "ready",
    Completed => "completed",
    Cancelled => "cancelled",
    Expired => "expired",
    Denied => "denied",
});

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired | Self::Denied)
    }
}

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

text_enum!(PaymentStatus { Pending => "pending", Success => "success", Failed => "failed" });

impl PaymentStatus {
    /// Payment status only moves forward: once it leaves `pending` it never changes again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Withdrawals use the same pending/success/failed lifecycle as payments.
pub type WithdrawalStatus = PaymentStatus;

//--------------------------------------    DeliveryMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

text_enum!(DeliveryMethod { Pickup => "pickup", Delivery => "delivery" });

//--------------------------------------    PaymentMethod      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Gopay,
    Ovo,
    Transfer,
}

text_enum!(PaymentMethod { Gopay => "gopay", Ovo => "ovo", Transfer => "transfer" });

//--------------------------------------       Listing       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub business_id: i64,
    pub title: String,
    pub listing_type: ListingType,
    pub price: Rupiah,
    /// Percentage off `price`
    pub discount: i64,
    pub final_price: Rupiah,
    pub quantity: i64,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// The price charged per unit on a new order. Donations are always free.
    pub fn unit_price(&self) -> Rupiah {
        match self.listing_type {
            ListingType::Sell => self.final_price,
            ListingType::Donation => Rupiah::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub business_id: i64,
    pub title: String,
    pub listing_type: ListingType,
    pub price: Rupiah,
    pub discount: i64,
    pub quantity: i64,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl NewListing {
    pub fn for_sale<S: Into<String>>(business_id: i64, title: S, price: Rupiah, quantity: i64) -> Self {
        Self {
            business_id,
            title: title.into(),
            listing_type: ListingType::Sell,
            price,
            discount: 0,
            quantity,
            expiry_date: None,
        }
    }

    pub fn donation<S: Into<String>>(business_id: i64, title: S, quantity: i64) -> Self {
        Self {
            business_id,
            title: title.into(),
            listing_type: ListingType::Donation,
            price: Rupiah::default(),
            discount: 0,
            quantity,
            expiry_date: None,
        }
    }

    pub fn with_discount(mut self, percent: i64) -> Self {
        self.discount = percent;
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry);
        self
    }

    pub fn final_price(&self) -> Rupiah {
        match self.listing_type {
            ListingType::Sell => self.price.discounted(self.discount),
            ListingType::Donation => Rupiah::default(),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub buyer_id: i64,
    pub business_id: i64,
    pub order_type: OrderType,
    pub total_amount: Rupiah,
    pub status: OrderStatusType,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub listing_id: i64,
    pub quantity: i64,
    /// Unit price at the time the order was placed
    pub price: Rupiah,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    #[serde(alias = "productId")]
    pub listing_id: i64,
    pub quantity: i64,
    /// Whatever price the client displayed. It is never used for charging.
    #[serde(default)]
    pub price: Option<Rupiah>,
}

impl NewOrderItem {
    pub fn new(listing_id: i64, quantity: i64) -> Self {
        Self { listing_id, quantity, price: None }
    }
}

/// An order as submitted by a buyer, before any stock has been reserved.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i64,
    /// Forwarded to the gateway as the customer's contact address
    pub buyer_email: Option<String>,
    pub business_id: i64,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(buyer_id: i64, business_id: i64, delivery_method: DeliveryMethod) -> Self {
        Self {
            buyer_id,
            buyer_email: None,
            business_id,
            delivery_method,
            delivery_address: None,
            payment_method: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, listing_id: i64, quantity: i64) -> Self {
        self.items.push(NewOrderItem::new(listing_id, quantity));
        self
    }

    pub fn with_address<S: Into<String>>(mut self, address: S) -> Self {
        self.delivery_address = Some(address.into());
        self
    }

    pub fn with_buyer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.buyer_email = Some(email.into());
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// The address to persist. Pickup orders never store one.
    pub fn persisted_address(&self) -> Option<&str> {
        match self.delivery_method {
            DeliveryMethod::Pickup => None,
            DeliveryMethod::Delivery => self.delivery_address.as_deref().map(str::trim).filter(|a| !a.is_empty()),
        }
    }
}

//--------------------------------------       Payment       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    /// The order identifier the gateway knows this payment by
    pub gateway_reference: String,
    pub gateway_token: Option<String>,
    pub redirect_url: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   BusinessProfile     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: i64,
    pub user_id: i64,
    pub business_name: String,
    pub balance: Rupiah,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub user_id: i64,
    pub business_name: String,
}

impl NewBusiness {
    pub fn new<S: Into<String>>(user_id: i64, business_name: S) -> Self {
        Self { user_id, business_name: business_name.into() }
    }
}

//--------------------------------------     Withdrawal      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: i64,
    pub business_id: i64,
    pub amount: Rupiah,
    pub destination: String,
    pub status: WithdrawalStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub business_id: i64,
    pub amount: Rupiah,
    pub destination: String,
    pub payment_method: PaymentMethod,
    /// Reference from the downstream payout system. Must be unique when present.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl NewWithdrawal {
    pub fn new<S: Into<String>>(business_id: i64, amount: Rupiah, destination: S, method: PaymentMethod) -> Self {
        Self { business_id, amount, destination: destination.into(), payment_method: method, transaction_id: None }
    }

    pub fn with_transaction_id<S: Into<String>>(mut self, txid: S) -> Self {
        self.transaction_id = Some(txid.into());
        self
    }
}
