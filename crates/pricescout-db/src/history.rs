//! Database operations for `products` and `price_history`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pricescout_core::{reconcile, ReconcileAction};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from `price_history`, joined with its product's MPN.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRecord {
    pub id: i64,
    pub product_id: i64,
    pub mpn: String,
    pub vendor_name: String,
    pub price: Decimal,
    pub scraped_at: DateTime<Utc>,
}

/// Per-vendor price average for one MPN.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorAverage {
    pub vendor_name: String,
    pub average_price: Decimal,
    pub observations: i64,
}

/// The latest stored observation for one (mpn, vendor) pair, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_observation(
    pool: &PgPool,
    mpn: &str,
    vendor_name: &str,
) -> Result<Option<PriceHistoryRecord>, DbError> {
    let row = sqlx::query_as::<_, PriceHistoryRecord>(
        "SELECT h.id, h.product_id, p.mpn, h.vendor_name, h.price, h.scraped_at \
         FROM price_history h \
         JOIN products p ON p.id = h.product_id \
         WHERE p.mpn = $1 AND h.vendor_name = $2 \
         ORDER BY h.scraped_at DESC, h.id DESC \
         LIMIT 1",
    )
    .bind(mpn)
    .bind(vendor_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new price observation, creating the product row on demand.
///
/// The price string is bound as `TEXT` and cast to `NUMERIC(10,2)` inside
/// the statement so the database performs the coercion consistently and the
/// stored value reads back as the identical decimal.
///
/// Returns the new `price_history` row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_observation(
    pool: &PgPool,
    mpn: &str,
    vendor_name: &str,
    price: &str,
    scraped_at: DateTime<Utc>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "WITH product AS ( \
             INSERT INTO products (mpn) VALUES ($1) \
             ON CONFLICT (mpn) DO UPDATE SET mpn = EXCLUDED.mpn \
             RETURNING id \
         ) \
         INSERT INTO price_history (product_id, vendor_name, price, scraped_at) \
         SELECT product.id, $2, $3::numeric(10,2), $4 FROM product \
         RETURNING id",
    )
    .bind(mpn)
    .bind(vendor_name)
    .bind(price)
    .bind(scraped_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Bumps the timestamp on the latest observation for one (mpn, vendor).
///
/// Returns `true` if a row was updated, `false` if no prior record exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn refresh_timestamp(
    pool: &PgPool,
    mpn: &str,
    vendor_name: &str,
    scraped_at: DateTime<Utc>,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "UPDATE price_history SET scraped_at = $3 \
         WHERE id = ( \
             SELECT h.id FROM price_history h \
             JOIN products p ON p.id = h.product_id \
             WHERE p.mpn = $1 AND h.vendor_name = $2 \
             ORDER BY h.scraped_at DESC, h.id DESC \
             LIMIT 1 \
         )",
    )
    .bind(mpn)
    .bind(vendor_name)
    .bind(scraped_at)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// The smart-tracking write path: compares a fresh price against the latest
/// stored one and either inserts a new row, refreshes the timestamp, or does
/// nothing.
///
/// Returns the action that was applied.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn record_observation(
    pool: &PgPool,
    mpn: &str,
    vendor_name: &str,
    price: Option<Decimal>,
) -> Result<ReconcileAction, DbError> {
    let prior = latest_observation(pool, mpn, vendor_name)
        .await?
        .map(|r| r.price);
    let action = reconcile(prior, price);
    let now = Utc::now();

    match action {
        ReconcileAction::InsertNew => {
            let price = price.ok_or(DbError::NotFound)?;
            let id = insert_observation(pool, mpn, vendor_name, &price.to_string(), now).await?;
            tracing::info!(mpn, vendor = vendor_name, price = %price, id, "price change recorded");
        }
        ReconcileAction::RefreshTimestamp => {
            refresh_timestamp(pool, mpn, vendor_name, now).await?;
            tracing::debug!(mpn, vendor = vendor_name, "price unchanged, timestamp refreshed");
        }
        ReconcileAction::NoOp => {
            tracing::debug!(mpn, vendor = vendor_name, "no price to record");
        }
    }

    Ok(action)
}

/// All MPNs that have at least one stored observation, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn all_mpns_with_history(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let mpns: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT p.mpn FROM products p \
         JOIN price_history h ON h.product_id = p.id \
         ORDER BY p.mpn",
    )
    .fetch_all(pool)
    .await?;

    Ok(mpns)
}

/// Full per-vendor price series for one MPN, oldest first within each vendor.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn price_series(
    pool: &PgPool,
    mpn: &str,
) -> Result<BTreeMap<String, Vec<(DateTime<Utc>, Decimal)>>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRecord>(
        "SELECT h.id, h.product_id, p.mpn, h.vendor_name, h.price, h.scraped_at \
         FROM price_history h \
         JOIN products p ON p.id = h.product_id \
         WHERE p.mpn = $1 \
         ORDER BY h.vendor_name, h.scraped_at ASC, h.id ASC",
    )
    .bind(mpn)
    .fetch_all(pool)
    .await?;

    let mut series: BTreeMap<String, Vec<(DateTime<Utc>, Decimal)>> = BTreeMap::new();
    for row in rows {
        series
            .entry(row.vendor_name)
            .or_default()
            .push((row.scraped_at, row.price));
    }
    Ok(series)
}

/// Overall and per-vendor price averages for one MPN.
///
/// The overall figure averages across every stored observation; per-vendor
/// rows come back cheapest vendor first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the queries fail.
pub async fn average_prices(
    pool: &PgPool,
    mpn: &str,
) -> Result<(Option<Decimal>, Vec<VendorAverage>), DbError> {
    let overall: Option<Decimal> = sqlx::query_scalar(
        "SELECT ROUND(AVG(h.price), 2) FROM price_history h \
         JOIN products p ON p.id = h.product_id \
         WHERE p.mpn = $1",
    )
    .bind(mpn)
    .fetch_one(pool)
    .await?;

    let per_vendor = sqlx::query_as::<_, VendorAverage>(
        "SELECT h.vendor_name, \
                ROUND(AVG(h.price), 2) AS average_price, \
                COUNT(*) AS observations \
         FROM price_history h \
         JOIN products p ON p.id = h.product_id \
         WHERE p.mpn = $1 \
         GROUP BY h.vendor_name \
         ORDER BY average_price ASC",
    )
    .bind(mpn)
    .fetch_all(pool)
    .await?;

    Ok((overall, per_vendor))
}
