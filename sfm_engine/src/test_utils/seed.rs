//! Helpers for populating a test database.
use crate::{
    db_types::{BusinessProfile, Listing, NewBusiness, NewListing, Rupiah},
    traits::ListingManagement,
};

pub async fn seed_business<B: ListingManagement>(db: &B, user_id: i64, name: &str) -> BusinessProfile {
    db.insert_business(NewBusiness::new(user_id, name)).await.expect("Error creating business")
}

pub async fn seed_sell_listing<B: ListingManagement>(
    db: &B,
    business_id: i64,
    title: &str,
    price: i64,
    discount: i64,
    quantity: i64,
) -> Listing {
    let listing = NewListing::for_sale(business_id, title, Rupiah::from(price), quantity).with_discount(discount);
    db.insert_listing(listing).await.expect("Error creating listing")
}

pub async fn seed_donation_listing<B: ListingManagement>(
    db: &B,
    business_id: i64,
    title: &str,
    quantity: i64,
) -> Listing {
    db.insert_listing(NewListing::donation(business_id, title, quantity)).await.expect("Error creating listing")
}
