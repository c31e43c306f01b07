//! The order identifier sent to the payment gateway.
//!
//! Every sell order gets exactly one gateway reference, `order-<id>`, where `<id>` is the internal order id in
//! decimal. The id is generated by the database, so the reference is unique across retries and never reused. Parsing
//! is strict: anything other than the prefix followed by digits only is rejected, so a notification can never be
//! matched to the wrong order by a lenient split.
use std::{fmt::Display, str::FromStr};

use thiserror::Error;

const PREFIX: &str = "order-";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Not a marketplace gateway reference: {0}")]
pub struct GatewayReferenceError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GatewayOrderRef(i64);

impl GatewayOrderRef {
    pub fn new(order_id: i64) -> Self {
        Self(order_id)
    }

    pub fn order_id(&self) -> i64 {
        self.0
    }
}

impl Display for GatewayOrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for GatewayOrderRef {
    type Err = GatewayReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(PREFIX).ok_or_else(|| GatewayReferenceError(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayReferenceError(s.to_string()));
        }
        let id = digits.parse::<i64>().map_err(|_| GatewayReferenceError(s.to_string()))?;
        Ok(Self(id))
    }
}
