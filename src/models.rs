//! Domain models that mirror the SQLite schema. These types stay light-weight
//! data holders so the loader, reports, and the TUI can pass them around
//! without caring how they were persisted.

use std::fmt;

use chrono::NaiveDate;

/// Money amount stored as whole cents. Prices never touch floating point once
/// they are inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(pub i64);

impl Cents {
    /// Raw integer value, the exact figure written to the database and backups.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Cents {
    /// Render as dollars, e.g. `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A brand row. Names are not unique in the schema; lookups take the lowest id.
pub struct Brand {
    pub brand_id: i64,
    pub brand_name: String,
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.brand_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A product row as persisted.
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub product_quantity: u32,
    /// Price in cents.
    pub product_price: Cents,
    pub date_updated: NaiveDate,
    /// Foreign key into `brands`.
    pub brand_id: i64,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.product_name, self.product_price)
    }
}

/// Brand waiting in the unit of work. It has no id until commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBrand {
    pub brand_name: String,
}

/// Product waiting in the unit of work. The brand must already be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub product_name: String,
    pub product_quantity: u32,
    pub product_price: Cents,
    pub date_updated: NaiveDate,
    pub brand_id: i64,
}

/// Anything the store can buffer before a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewEntity {
    Brand(NewBrand),
    Product(NewProduct),
}

impl From<NewBrand> for NewEntity {
    fn from(brand: NewBrand) -> Self {
        NewEntity::Brand(brand)
    }
}

impl From<NewProduct> for NewEntity {
    fn from(product: NewProduct) -> Self {
        NewEntity::Product(product)
    }
}

/// A committed entity with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Brand(Brand),
    Product(Product),
}

/// Result row of the "brand with most products" report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCount {
    /// Lowest brand id carrying this name.
    pub brand_id: i64,
    pub brand_name: String,
    pub product_count: i64,
}
