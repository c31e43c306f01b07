//! Order lifecycle rules.
//!
//! Sell orders:
//!
//! ```text
//!    pending   → paid | cancelled | expired | denied
//!    paid      → ready | delivered | cancelled
//!    ready     → delivered | completed | cancelled
//!    delivered → completed
//! ```
//!
//! Donation orders move between `requested` and `pending` until the business completes or cancels them.
//!
//! Gateway notifications drive `paid`, `expired`, `denied` and gateway cancellations. Businesses drive everything
//! else through [`check_manual_transition`].
use crate::{
    db_types::{Listing, OrderStatusType, OrderType},
    traits::ValidationError,
};

use OrderStatusType::*;

/// Every status reachable in one step from `from`, regardless of who is asking.
pub fn next_statuses(order_type: OrderType, from: OrderStatusType) -> &'static [OrderStatusType] {
    match (order_type, from) {
        (OrderType::Sell, Pending) => &[Paid, Cancelled, Expired, Denied],
        (OrderType::Sell, Paid) => &[Ready, Delivered, Cancelled],
        (OrderType::Sell, Ready) => &[Delivered, Completed, Cancelled],
        (OrderType::Sell, Delivered) => &[Completed],
        (OrderType::Donation, Requested) => &[Pending, Completed, Cancelled],
        (OrderType::Donation, Pending) => &[Requested, Completed, Cancelled],
        _ => &[],
    }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    /// The order's business, through the order status endpoint.
    Business,
    /// A verified payment gateway notification.
    Gateway,
}

/// The statuses `source` may set on an order of the given type.
pub fn allowed_targets(order_type: OrderType, source: TransitionSource) -> &'static [OrderStatusType] {
    match (order_type, source) {
        (OrderType::Sell, TransitionSource::Business) => &[Ready, Delivered, Completed, Cancelled],
        (OrderType::Donation, TransitionSource::Business) => &[Requested, Pending, Completed, Cancelled],
        (OrderType::Sell, TransitionSource::Gateway) => &[Paid, Expired, Cancelled, Denied],
        (OrderType::Donation, TransitionSource::Gateway) => &[],
    }
}

pub fn can_transition(order_type: OrderType, from: OrderStatusType, to: OrderStatusType) -> bool {
    next_statuses(order_type, from).contains(&to)
}

/// Checks a status change requested by `source`.
///
/// The target must be one `source` may set for this order type, and it must be reachable from the current status.
pub fn check_transition(
    order_type: OrderType,
    source: TransitionSource,
    from: OrderStatusType,
    to: OrderStatusType,
) -> Result<(), ValidationError> {
    if allowed_targets(order_type, source).contains(&to) && can_transition(order_type, from, to) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTransition { from, to })
    }
}

pub fn check_manual_transition(
    order_type: OrderType,
    from: OrderStatusType,
    to: OrderStatusType,
) -> Result<(), ValidationError> {
    check_transition(order_type, TransitionSource::Business, from, to)
}

/// Checks that `listing` can join an order placed with `business_id` whose items so far are of `order_type`.
pub fn check_listing_for_order(
    listing: &Listing,
    business_id: i64,
    order_type: Option<OrderType>,
) -> Result<(), ValidationError> {
    if listing.business_id != business_id {
        return Err(ValidationError::ListingNotFromBusiness(listing.id));
    }
    match order_type {
        Some(t) if t != listing.listing_type => Err(ValidationError::MixedOrderType(t, listing.listing_type)),
        _ => Ok(()),
    }
}
