//! Backup writer and reader. Backups use display headers and raw cents, so
//! they are not in the loader's input format; [`read_products_backup`] exists
//! to read them back.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::WriterBuilder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::Store;
use crate::models::{Brand, Cents, Product};

pub const BRANDS_BACKUP_FILE: &str = "brands_backup.csv";
pub const PRODUCTS_BACKUP_FILE: &str = "products_backup.csv";

const BRAND_HEADER: &[&str] = &["Brand ID", "Brand Name"];
const PRODUCT_HEADER: &[&str] = &[
    "Product ID",
    "Product Name",
    "Quantity",
    "Price (in cents)",
    "Date Updated",
    "Brand ID",
];

#[derive(Debug, Serialize, Deserialize)]
struct BrandRecord {
    #[serde(rename = "Brand ID")]
    brand_id: i64,
    #[serde(rename = "Brand Name")]
    brand_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProductRecord {
    #[serde(rename = "Product ID")]
    product_id: i64,
    #[serde(rename = "Product Name")]
    product_name: String,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Price (in cents)")]
    price_cents: i64,
    #[serde(rename = "Date Updated")]
    date_updated: NaiveDate,
    #[serde(rename = "Brand ID")]
    brand_id: i64,
}

impl From<&Brand> for BrandRecord {
    fn from(brand: &Brand) -> Self {
        Self {
            brand_id: brand.brand_id,
            brand_name: brand.brand_name.clone(),
        }
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            quantity: product.product_quantity,
            price_cents: product.product_price.get(),
            date_updated: product.date_updated,
            brand_id: product.brand_id,
        }
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            product_id: record.product_id,
            product_name: record.product_name,
            product_quantity: record.quantity,
            product_price: Cents(record.price_cents),
            date_updated: record.date_updated,
            brand_id: record.brand_id,
        }
    }
}

/// Where the backup landed and how much went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub brands_path: PathBuf,
    pub products_path: PathBuf,
    pub brands: usize,
    pub products: usize,
}

/// Write both backup files in natural order. The store is only read.
pub fn export(store: &Store, brands_path: &Path, products_path: &Path) -> Result<ExportSummary> {
    let brands = store.all_brands()?;
    let products = store.all_products()?;

    write_records(brands_path, BRAND_HEADER, brands.iter().map(BrandRecord::from))?;
    write_records(
        products_path,
        PRODUCT_HEADER,
        products.iter().map(ProductRecord::from),
    )?;

    info!(
        "backed up {} brands to {} and {} products to {}",
        brands.len(),
        brands_path.display(),
        products.len(),
        products_path.display()
    );

    Ok(ExportSummary {
        brands_path: brands_path.to_path_buf(),
        products_path: products_path.to_path_buf(),
        brands: brands.len(),
        products: products.len(),
    })
}

/// Backup into `dir` using the standard file names.
pub fn export_to_dir(store: &Store, dir: &Path) -> Result<ExportSummary> {
    export(
        store,
        &dir.join(BRANDS_BACKUP_FILE),
        &dir.join(PRODUCTS_BACKUP_FILE),
    )
}

fn write_records<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: impl Iterator<Item = T>,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create backup file {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(header)
        .with_context(|| format!("failed to write {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}

pub fn read_brands_backup(path: &Path) -> Result<Vec<Brand>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open backup file {}", path.display()))?;
    reader
        .deserialize::<BrandRecord>()
        .map(|record| {
            record
                .map(|r| Brand {
                    brand_id: r.brand_id,
                    brand_name: r.brand_name,
                })
                .with_context(|| format!("malformed brand backup row in {}", path.display()))
        })
        .collect()
}

pub fn read_products_backup(path: &Path) -> Result<Vec<Product>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open backup file {}", path.display()))?;
    reader
        .deserialize::<ProductRecord>()
        .map(|record| {
            record
                .map(Product::from)
                .with_context(|| format!("malformed product backup row in {}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::schema::Schema;

    #[test]
    fn empty_store_still_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory(&Schema::inventory()).unwrap();
        let summary = export_to_dir(&store, dir.path()).unwrap();
        assert_eq!((summary.brands, summary.products), (0, 0));

        let brands = fs::read_to_string(dir.path().join(BRANDS_BACKUP_FILE)).unwrap();
        assert_eq!(brands, "Brand ID,Brand Name\n");
        let products = fs::read_to_string(dir.path().join(PRODUCTS_BACKUP_FILE)).unwrap();
        assert_eq!(
            products,
            "Product ID,Product Name,Quantity,Price (in cents),Date Updated,Brand ID\n"
        );
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory(&Schema::inventory()).unwrap();
        let missing = dir.path().join("missing");
        assert!(export_to_dir(&store, &missing).is_err());
    }
}
