mod gateway_reference;
mod notification_signature;

pub use gateway_reference::{GatewayOrderRef, GatewayReferenceError};
pub use notification_signature::{notification_signature, verify_notification_signature};
