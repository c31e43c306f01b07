use crate::{
    db_types::{BusinessProfile, Listing, NewBusiness, NewListing},
    traits::MarketplaceError,
};

/// The part of the listing catalogue the order flow depends on.
///
/// Listings and business profiles are owned by the catalogue and onboarding services. The insert methods exist for
/// seeding and tests. Stock is only ever decremented through [`crate::traits::MarketplaceDatabase::place_order`].
#[allow(async_fn_in_trait)]
pub trait ListingManagement {
    async fn fetch_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketplaceError>;

    async fn fetch_listings_for_business(&self, business_id: i64) -> Result<Vec<Listing>, MarketplaceError>;

    /// Inserts a listing. The final price is derived from the price and discount.
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, MarketplaceError>;

    /// Creates a business profile with a zero balance.
    async fn insert_business(&self, business: NewBusiness) -> Result<BusinessProfile, MarketplaceError>;
}
