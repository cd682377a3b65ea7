//! Product queries and row mapping.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row};

use crate::models::{Cents, NewProduct, Product};

const PRODUCT_COLUMNS: &str =
    "product_id, product_name, product_quantity, product_price, date_updated, brand_id";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        product_id: row.get(0)?,
        product_name: row.get(1)?,
        product_quantity: row.get(2)?,
        product_price: Cents(row.get(3)?),
        date_updated: row.get(4)?,
        brand_id: row.get(5)?,
    })
}

/// Every product in insertion order.
pub(crate) fn fetch_products(conn: &Connection) -> Result<Vec<Product>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
        ))
        .context("failed to prepare product query")?;

    let products = stmt
        .query_map([], product_from_row)
        .context("failed to load products")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect products")?;

    Ok(products)
}

pub(crate) fn find_product_by_id(conn: &Connection, id: i64) -> Result<Option<Product>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
        params![id],
        product_from_row,
    )
    .optional()
    .with_context(|| format!("failed to look up product {id}"))
}

/// Insert a product and echo it back with its new id.
pub(crate) fn insert_product(conn: &Connection, product: NewProduct) -> Result<Product> {
    conn.execute(
        "INSERT INTO products (product_name, product_quantity, product_price, date_updated, brand_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            product.product_name,
            product.product_quantity,
            product.product_price.get(),
            product.date_updated,
            product.brand_id,
        ],
    )
    .map_err(|err| map_constraint(err, product.brand_id))
    .context("failed to insert product")?;

    Ok(Product {
        product_id: conn.last_insert_rowid(),
        product_name: product.product_name,
        product_quantity: product.product_quantity,
        product_price: product.product_price,
        date_updated: product.date_updated,
        brand_id: product.brand_id,
    })
}

pub(crate) fn count_products(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
        .context("failed to count products")
}

/// Cheapest or dearest product. Equal prices resolve to the oldest row.
pub(crate) fn extreme_price(conn: &Connection, highest: bool) -> Result<Option<Product>> {
    let direction = if highest { "DESC" } else { "ASC" };
    conn.query_row(
        &format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             ORDER BY product_price {direction}, product_id ASC
             LIMIT 1"
        ),
        [],
        product_from_row,
    )
    .optional()
    .context("failed to query product price")
}

/// Turn SQLite constraint failures into messages the menu can show as-is.
fn map_constraint(err: SqlError, brand_id: i64) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        anyhow!("Product rejected: brand {brand_id} does not exist or a value is out of range.")
    } else {
        err.into()
    }
}
