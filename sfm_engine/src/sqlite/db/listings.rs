use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Listing, NewListing},
    traits::MarketplaceError,
};

pub async fn insert_listing(listing: NewListing, conn: &mut SqliteConnection) -> Result<Listing, MarketplaceError> {
    let final_price = listing.final_price();
    let business_id = listing.business_id;
    let listing: Listing = sqlx::query_as(
        r#"
            INSERT INTO listings (business_id, title, listing_type, price, discount, final_price, quantity, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(business_id)
    .bind(listing.title)
    .bind(listing.listing_type)
    .bind(listing.price)
    .bind(listing.discount)
    .bind(final_price)
    .bind(listing.quantity)
    .bind(listing.expiry_date)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_foreign_key_violation() => {
            MarketplaceError::BusinessNotFound(business_id)
        },
        _ => MarketplaceError::from(e),
    })?;
    debug!("📦️ Listing #{} '{}' created with {} units", listing.id, listing.title, listing.quantity);
    Ok(listing)
}

pub async fn fetch_listing(listing_id: i64, conn: &mut SqliteConnection) -> Result<Option<Listing>, sqlx::Error> {
    let listing = sqlx::query_as("SELECT * FROM listings WHERE id = $1").bind(listing_id).fetch_optional(conn).await?;
    Ok(listing)
}

pub async fn fetch_listings_for_business(
    business_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Listing>, sqlx::Error> {
    let listings = sqlx::query_as("SELECT * FROM listings WHERE business_id = $1 ORDER BY id")
        .bind(business_id)
        .fetch_all(conn)
        .await?;
    Ok(listings)
}

/// Takes `quantity` units out of stock, but only if at least that many are available. The check and the decrement
/// are one statement, so two concurrent reservations can never both see the same stock level.
///
/// Returns the updated listing, or `None` if the listing does not exist or does not have enough stock. Callers
/// tell the two apart with [`fetch_listing`].
pub async fn reserve_stock(
    listing_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Listing>, sqlx::Error> {
    let listing: Option<Listing> = sqlx::query_as(
        r#"
            UPDATE listings SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND quantity >= $1
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(listing_id)
    .fetch_optional(conn)
    .await?;
    if let Some(l) = &listing {
        trace!("📦️ Reserved {quantity} units of listing #{listing_id}. {} left", l.quantity);
    }
    Ok(listing)
}
