//! Interactive add path. Unlike the bulk loader, an unknown brand name is
//! created on the spot instead of skipping the product.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::db::Store;
use crate::models::{Brand, Cents, Entity, NewBrand, NewProduct, Product};

/// Values typed by the operator, already parsed into primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductInput {
    pub name: String,
    pub quantity: u32,
    pub price: Cents,
    pub brand_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedProduct {
    pub product: Product,
    pub brand: Brand,
    pub brand_created: bool,
}

/// Find or create the brand, then insert the product stamped with `today`.
/// The brand is committed on its own before the product.
pub fn add_product(
    store: &mut Store,
    input: NewProductInput,
    today: NaiveDate,
) -> Result<AddedProduct> {
    if input.price.get() < 0 {
        return Err(anyhow!("Price cannot be negative."));
    }

    let (brand, brand_created) = match store.find_brand_by_name(&input.brand_name)? {
        Some(brand) => (brand, false),
        None => {
            store.add(NewBrand {
                brand_name: input.brand_name.clone(),
            });
            let brand = match store.commit().context("failed to create brand")?.pop() {
                Some(Entity::Brand(brand)) => brand,
                _ => return Err(anyhow!("brand insert returned no row")),
            };
            info!("created brand {:?} with id {}", brand.brand_name, brand.brand_id);
            (brand, true)
        }
    };

    store.add(NewProduct {
        product_name: input.name,
        product_quantity: input.quantity,
        product_price: input.price,
        date_updated: today,
        brand_id: brand.brand_id,
    });
    let product = match store.commit().context("failed to save product")?.pop() {
        Some(Entity::Product(product)) => product,
        _ => return Err(anyhow!("product insert returned no row")),
    };
    info!(
        "added product {:?} (id {}) under brand {}",
        product.product_name, product.product_id, brand.brand_id
    );

    Ok(AddedProduct {
        product,
        brand,
        brand_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn input(brand: &str) -> NewProductInput {
        NewProductInput {
            name: "Widget".into(),
            quantity: 4,
            price: Cents(250),
            brand_name: brand.into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn unknown_brand_is_created() {
        let mut store = Store::open_in_memory(&Schema::inventory()).unwrap();
        let added = add_product(&mut store, input("Nova"), today()).unwrap();
        assert!(added.brand_created);
        assert_eq!(added.product.brand_id, added.brand.brand_id);
        assert_eq!(added.product.date_updated, today());
        assert_eq!(store.brand_count().unwrap(), 1);
        assert_eq!(store.product_count().unwrap(), 1);
    }

    #[test]
    fn existing_brand_is_reused() {
        let mut store = Store::open_in_memory(&Schema::inventory()).unwrap();
        add_product(&mut store, input("Nova"), today()).unwrap();
        let second = add_product(&mut store, input("Nova"), today()).unwrap();
        assert!(!second.brand_created);
        assert_eq!(store.brand_count().unwrap(), 1);
        assert_eq!(store.product_count().unwrap(), 2);
    }

    #[test]
    fn negative_price_is_refused_before_touching_the_store() {
        let mut store = Store::open_in_memory(&Schema::inventory()).unwrap();
        let mut bad = input("Nova");
        bad.price = Cents(-1);
        assert!(add_product(&mut store, bad, today()).is_err());
        assert_eq!(store.brand_count().unwrap(), 0);
    }
}
