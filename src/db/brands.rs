//! Brand queries. Lookups match names exactly and prefer the oldest row.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Brand, BrandCount, NewBrand};

/// Every brand in insertion order.
pub(crate) fn fetch_brands(conn: &Connection) -> Result<Vec<Brand>> {
    let mut stmt = conn
        .prepare("SELECT brand_id, brand_name FROM brands ORDER BY brand_id")
        .context("failed to prepare brand query")?;

    let brands = stmt
        .query_map([], |row| {
            Ok(Brand {
                brand_id: row.get(0)?,
                brand_name: row.get(1)?,
            })
        })
        .context("failed to load brands")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect brands")?;

    Ok(brands)
}

/// Exact-match lookup. Duplicate names resolve to the oldest row.
pub(crate) fn find_brand_by_name(conn: &Connection, name: &str) -> Result<Option<Brand>> {
    conn.query_row(
        "SELECT brand_id, brand_name FROM brands
         WHERE brand_name = ?1
         ORDER BY brand_id
         LIMIT 1",
        params![name],
        |row| {
            Ok(Brand {
                brand_id: row.get(0)?,
                brand_name: row.get(1)?,
            })
        },
    )
    .optional()
    .with_context(|| format!("failed to look up brand {name:?}"))
}

/// Insert a brand row and echo it back with its new id.
pub(crate) fn insert_brand(conn: &Connection, brand: NewBrand) -> Result<Brand> {
    conn.execute(
        "INSERT INTO brands (brand_name) VALUES (?1)",
        params![brand.brand_name],
    )
    .context("failed to insert brand")?;

    Ok(Brand {
        brand_id: conn.last_insert_rowid(),
        brand_name: brand.brand_name,
    })
}

pub(crate) fn count_brands(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM brands", [], |row| row.get(0))
        .context("failed to count brands")
}

/// Group products by brand name and return the busiest one. Brands without
/// products never show up because of the inner join. Ties go to the name
/// whose first brand row is oldest.
pub(crate) fn brand_with_most_products(conn: &Connection) -> Result<Option<BrandCount>> {
    conn.query_row(
        "SELECT MIN(b.brand_id), b.brand_name, COUNT(p.product_id) AS product_count
         FROM brands b
         INNER JOIN products p ON p.brand_id = b.brand_id
         GROUP BY b.brand_name
         ORDER BY product_count DESC, MIN(b.brand_id) ASC
         LIMIT 1",
        [],
        |row| {
            Ok(BrandCount {
                brand_id: row.get(0)?,
                brand_name: row.get(1)?,
                product_count: row.get(2)?,
            })
        },
    )
    .optional()
    .context("failed to rank brands by product count")
}
