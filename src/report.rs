//! Point lookups and the three aggregate reports shown by the Analyze menu.

use anyhow::Result;

use crate::db::Store;
use crate::models::{BrandCount, Product};

/// Output of the Analyze command. Each field is `None` when there are no
/// products to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub most_expensive: Option<Product>,
    pub least_expensive: Option<Product>,
    pub top_brand: Option<BrandCount>,
}

impl Analysis {
    /// Console lines, one per report that produced a result.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(product) = &self.most_expensive {
            lines.push(format!("Most Expensive Product: {product}"));
        }
        if let Some(product) = &self.least_expensive {
            lines.push(format!("Least Expensive Product: {product}"));
        }
        if let Some(brand) = &self.top_brand {
            lines.push(format!(
                "Brand with Most Products: {} ({} products)",
                brand.brand_name, brand.product_count
            ));
        }
        if lines.is_empty() {
            lines.push("No products to analyze.".to_string());
        }
        lines
    }
}

/// Exact id lookup. A missing product is `Ok(None)`, not an error.
pub fn view_product(store: &Store, product_id: i64) -> Result<Option<Product>> {
    store.find_product_by_id(product_id)
}

pub fn max_price(store: &Store) -> Result<Option<Product>> {
    store.query_max_price()
}

pub fn min_price(store: &Store) -> Result<Option<Product>> {
    store.query_min_price()
}

pub fn brand_with_most_products(store: &Store) -> Result<Option<BrandCount>> {
    store.query_brand_with_most_products()
}

pub fn analyze(store: &Store) -> Result<Analysis> {
    Ok(Analysis {
        most_expensive: max_price(store)?,
        least_expensive: min_price(store)?,
        top_brand: brand_with_most_products(store)?,
    })
}

/// Multi-line detail block used by the View command.
pub fn describe_product(product: &Product) -> Vec<String> {
    vec![
        format!("Product ID: {}", product.product_id),
        format!("Name: {}", product.product_name),
        format!("Quantity: {}", product.product_quantity),
        format!("Price: {}", product.product_price),
        format!("Date Updated: {}", product.date_updated),
        format!("Brand ID: {}", product.brand_id),
    ]
}
