//! Persistence layer: a SQLite connection plus a small unit of work. Writes are
//! buffered with [`Store::add`] and only become visible after
//! [`Store::commit`], which flushes them in one transaction.

mod brands;
mod connection;
mod products;

use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use rusqlite::Connection;

use crate::models::{Brand, BrandCount, Entity, NewEntity, Product};
use crate::schema::Schema;

/// Owned handle to the inventory database. Every component borrows it; there
/// is no global session.
pub struct Store {
    conn: Connection,
    pending: Vec<NewEntity>,
}

impl Store {
    /// Open or create the database file and make sure every table exists.
    pub fn open(path: &Path, schema: &Schema) -> Result<Self> {
        let conn = connection::open_database(path, schema)?;
        Ok(Self {
            conn,
            pending: Vec::new(),
        })
    }

    pub fn open_in_memory(schema: &Schema) -> Result<Self> {
        let conn = connection::open_in_memory(schema)?;
        Ok(Self {
            conn,
            pending: Vec::new(),
        })
    }

    /// Buffer an entity for the next commit.
    pub fn add(&mut self, entity: impl Into<NewEntity>) {
        self.pending.push(entity.into());
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything buffered since the last commit.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Flush buffered writes in insertion order inside a single transaction and
    /// return them with their assigned ids. On failure the transaction rolls
    /// back and the buffer is cleared.
    pub fn commit(&mut self) -> Result<Vec<Entity>> {
        let pending = mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;

        let mut committed = Vec::with_capacity(pending.len());
        for entity in pending {
            let saved = match entity {
                NewEntity::Brand(brand) => Entity::Brand(brands::insert_brand(&tx, brand)?),
                NewEntity::Product(product) => {
                    Entity::Product(products::insert_product(&tx, product)?)
                }
            };
            committed.push(saved);
        }

        tx.commit().context("failed to commit transaction")?;
        debug!("committed {} rows", committed.len());
        Ok(committed)
    }

    pub fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>> {
        brands::find_brand_by_name(&self.conn, name)
    }

    pub fn find_product_by_id(&self, id: i64) -> Result<Option<Product>> {
        products::find_product_by_id(&self.conn, id)
    }

    /// Brands in natural (insertion) order.
    pub fn all_brands(&self) -> Result<Vec<Brand>> {
        brands::fetch_brands(&self.conn)
    }

    /// Products in natural (insertion) order.
    pub fn all_products(&self) -> Result<Vec<Product>> {
        products::fetch_products(&self.conn)
    }

    pub fn brand_count(&self) -> Result<i64> {
        brands::count_brands(&self.conn)
    }

    pub fn product_count(&self) -> Result<i64> {
        products::count_products(&self.conn)
    }

    pub fn query_max_price(&self) -> Result<Option<Product>> {
        products::extreme_price(&self.conn, true)
    }

    pub fn query_min_price(&self) -> Result<Option<Product>> {
        products::extreme_price(&self.conn, false)
    }

    pub fn query_brand_with_most_products(&self) -> Result<Option<BrandCount>> {
        brands::brand_with_most_products(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Cents, NewBrand, NewProduct};

    fn store() -> Store {
        Store::open_in_memory(&Schema::inventory()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn brand(store: &mut Store, name: &str) -> Brand {
        store.add(NewBrand {
            brand_name: name.into(),
        });
        match store.commit().unwrap().pop() {
            Some(Entity::Brand(brand)) => brand,
            other => panic!("expected a brand, got {other:?}"),
        }
    }

    fn product(brand_id: i64, name: &str, cents: i64) -> NewProduct {
        NewProduct {
            product_name: name.into(),
            product_quantity: 1,
            product_price: Cents(cents),
            date_updated: date(),
            brand_id,
        }
    }

    #[test]
    fn pending_rows_are_invisible_until_commit() {
        let mut store = store();
        store.add(NewBrand {
            brand_name: "Acme".into(),
        });
        assert_eq!(store.pending_len(), 1);
        assert!(store.find_brand_by_name("Acme").unwrap().is_none());

        let committed = store.commit().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(store.pending_len(), 0);
        assert!(store.find_brand_by_name("Acme").unwrap().is_some());
    }

    #[test]
    fn discarded_rows_never_reach_the_database() {
        let mut store = store();
        store.add(NewBrand {
            brand_name: "Acme".into(),
        });
        store.add(NewBrand {
            brand_name: "Bolt".into(),
        });
        assert_eq!(store.discard_pending(), 2);
        assert_eq!(store.pending_len(), 0);

        assert!(store.commit().unwrap().is_empty());
        assert_eq!(store.brand_count().unwrap(), 0);
    }

    #[test]
    fn commit_assigns_ids_in_insertion_order() {
        let mut store = store();
        for name in ["Acme", "Bolt", "Crux"] {
            store.add(NewBrand {
                brand_name: name.into(),
            });
        }
        store.commit().unwrap();

        let brands = store.all_brands().unwrap();
        let names: Vec<_> = brands.iter().map(|b| b.brand_name.as_str()).collect();
        assert_eq!(names, ["Acme", "Bolt", "Crux"]);
        assert!(brands.windows(2).all(|w| w[0].brand_id < w[1].brand_id));
    }

    #[test]
    fn duplicate_brand_names_resolve_to_oldest() {
        let mut store = store();
        let first = brand(&mut store, "Acme");
        brand(&mut store, "Acme");
        let found = store.find_brand_by_name("Acme").unwrap().unwrap();
        assert_eq!(found.brand_id, first.brand_id);
        assert!(store.find_brand_by_name("acme").unwrap().is_none());
    }

    #[test]
    fn failed_commit_rolls_back_whole_batch() {
        let mut store = store();
        let acme = brand(&mut store, "Acme");
        store.add(product(acme.brand_id, "Widget", 299));
        store.add(product(acme.brand_id + 100, "Ghost", 100));

        assert!(store.commit().is_err());
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.product_count().unwrap(), 0);
        assert_eq!(store.brand_count().unwrap(), 1);
    }

    #[test]
    fn price_extremes_break_ties_by_insertion_order() {
        let mut store = store();
        let acme = brand(&mut store, "Acme");
        store.add(product(acme.brand_id, "First", 500));
        store.add(product(acme.brand_id, "Second", 500));
        store.add(product(acme.brand_id, "Cheap", 100));
        store.add(product(acme.brand_id, "AlsoCheap", 100));
        store.commit().unwrap();

        assert_eq!(store.query_max_price().unwrap().unwrap().product_name, "First");
        assert_eq!(store.query_min_price().unwrap().unwrap().product_name, "Cheap");
    }

    #[test]
    fn empty_store_reports_nothing() {
        let store = store();
        assert!(store.query_max_price().unwrap().is_none());
        assert!(store.query_min_price().unwrap().is_none());
        assert!(store.query_brand_with_most_products().unwrap().is_none());
        assert!(store.find_product_by_id(1).unwrap().is_none());
    }

    #[test]
    fn product_round_trips_through_sqlite() {
        let mut store = store();
        let acme = brand(&mut store, "Acme");
        store.add(product(acme.brand_id, "Widget", 299));
        let saved = match store.commit().unwrap().pop() {
            Some(Entity::Product(product)) => product,
            other => panic!("expected a product, got {other:?}"),
        };

        let loaded = store.find_product_by_id(saved.product_id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.date_updated, date());
    }

    #[test]
    fn opening_twice_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.db");
        {
            let mut store = Store::open(&path, &Schema::inventory()).unwrap();
            brand(&mut store, "Acme");
        }
        let store = Store::open(&path, &Schema::inventory()).unwrap();
        assert_eq!(store.brand_count().unwrap(), 1);
    }
}
