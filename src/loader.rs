//! CSV ingestion. Each entity kind has its own typed parse function; the loader
//! stages accepted rows and commits them once per file.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};

use crate::db::Store;
use crate::error::{LoadError, RowError};
use crate::models::{Cents, NewBrand, NewEntity, NewProduct};

/// Date format used by `inventory.csv`.
pub const CSV_DATE_FORMAT: &str = "%m/%d/%Y";

/// Which entity a CSV file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Brand,
    Product,
}

impl EntityKind {
    fn required_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Brand => &["brand_name"],
            EntityKind::Product => &[
                "product_name",
                "product_quantity",
                "product_price",
                "date_updated",
                "brand_name",
            ],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Brand => write!(f, "brand"),
            EntityKind::Product => write!(f, "product"),
        }
    }
}

/// What to do with a row that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Stop at the first bad row and commit nothing from the file.
    #[default]
    Abort,
    /// Log the bad row, count it, and keep going.
    Skip,
}

/// Counts reported after a file has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub kind: EntityKind,
    pub inserted: usize,
    pub skipped_missing_brand: usize,
    pub skipped_malformed: usize,
}

impl LoadSummary {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            inserted: 0,
            skipped_missing_brand: 0,
            skipped_malformed: 0,
        }
    }
}

/// A validated product row whose brand has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub product_name: String,
    pub product_quantity: u32,
    pub product_price: Cents,
    pub date_updated: NaiveDate,
    pub brand_name: String,
}

/// Header positions for the columns a kind needs, located once per file.
struct Columns {
    indices: Vec<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, kind: EntityKind) -> Result<Self, RowError> {
        let indices = kind
            .required_columns()
            .iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|header| header.trim() == *name)
                    .ok_or(RowError::MissingColumn(*name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { indices })
    }

    fn get<'r>(
        &self,
        record: &'r StringRecord,
        slot: usize,
        name: &'static str,
    ) -> Result<&'r str, RowError> {
        record
            .get(self.indices[slot])
            .ok_or(RowError::MissingColumn(name))
    }
}

/// Load one CSV file into the store.
pub fn load(
    store: &mut Store,
    path: &Path,
    kind: EntityKind,
    policy: ErrorPolicy,
) -> Result<LoadSummary, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let summary = load_reader(store, file, kind, policy)?;
    info!(
        "loaded {} from {}: {} inserted, {} skipped (missing brand), {} skipped (malformed)",
        kind,
        path.display(),
        summary.inserted,
        summary.skipped_missing_brand,
        summary.skipped_malformed
    );
    Ok(summary)
}

/// Load the brand file, then the product file. Brands must come first or
/// every product row is skipped for lack of a brand.
pub fn load_all(
    store: &mut Store,
    brands_path: &Path,
    products_path: &Path,
    policy: ErrorPolicy,
) -> Result<(LoadSummary, LoadSummary), LoadError> {
    let brands = load(store, brands_path, EntityKind::Brand, policy)?;
    let products = load(store, products_path, EntityKind::Product, policy)?;
    Ok((brands, products))
}

/// Same as [`load`] over any reader. The file is fully consumed before the
/// single commit, and that commit holds this file's rows only: anything left
/// uncommitted in the store beforehand is dropped.
pub fn load_reader<R: Read>(
    store: &mut Store,
    reader: R,
    kind: EntityKind,
    policy: ErrorPolicy,
) -> Result<LoadSummary, LoadError> {
    let leftover = store.discard_pending();
    if leftover > 0 {
        warn!("dropping {leftover} uncommitted rows before loading {kind} rows");
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|err| LoadError::Row {
            kind,
            line: 1,
            source: err.into(),
        })?
        .clone();
    let columns = Columns::locate(&headers, kind).map_err(|source| LoadError::Row {
        kind,
        line: 1,
        source,
    })?;

    let mut summary = LoadSummary::new(kind);
    let mut staged: Vec<NewEntity> = Vec::new();

    for result in rdr.records() {
        let (line, parsed) = match result {
            Ok(record) => {
                let line = record.position().map_or(0, |pos| pos.line());
                (line, parse_record(&record, &columns, kind))
            }
            Err(err) => (
                err.position().map_or(0, |pos| pos.line()),
                Err(RowError::from(err)),
            ),
        };

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(source) => match policy {
                ErrorPolicy::Abort => {
                    return Err(LoadError::Row { kind, line, source });
                }
                ErrorPolicy::Skip => {
                    warn!("skipping {kind} row on line {line}: {source}");
                    summary.skipped_malformed += 1;
                    continue;
                }
            },
        };

        match parsed {
            Parsed::Brand(brand) => staged.push(brand.into()),
            Parsed::Product(row) => {
                let brand = store
                    .find_brand_by_name(&row.brand_name)
                    .map_err(|source| LoadError::Store { kind, source })?;
                let Some(brand) = brand else {
                    warn!(
                        "skipping product {:?} on line {line}: brand {:?} not found",
                        row.product_name, row.brand_name
                    );
                    summary.skipped_missing_brand += 1;
                    continue;
                };
                debug!("staging product {:?} for brand {}", row.product_name, brand.brand_id);
                staged.push(
                    NewProduct {
                        product_name: row.product_name,
                        product_quantity: row.product_quantity,
                        product_price: row.product_price,
                        date_updated: row.date_updated,
                        brand_id: brand.brand_id,
                    }
                    .into(),
                );
            }
        }
        summary.inserted += 1;
    }

    for entity in staged {
        store.add(entity);
    }
    store
        .commit()
        .map_err(|source| LoadError::Store { kind, source })?;

    Ok(summary)
}

enum Parsed {
    Brand(NewBrand),
    Product(ProductRow),
}

fn parse_record(
    record: &StringRecord,
    columns: &Columns,
    kind: EntityKind,
) -> Result<Parsed, RowError> {
    match kind {
        EntityKind::Brand => parse_brand(record, columns).map(Parsed::Brand),
        EntityKind::Product => parse_product(record, columns).map(Parsed::Product),
    }
}

/// The name is taken verbatim; no trimming or case folding.
fn parse_brand(record: &StringRecord, columns: &Columns) -> Result<NewBrand, RowError> {
    Ok(NewBrand {
        brand_name: columns.get(record, 0, "brand_name")?.to_string(),
    })
}

fn parse_product(record: &StringRecord, columns: &Columns) -> Result<ProductRow, RowError> {
    let product_name = columns.get(record, 0, "product_name")?.to_string();
    let product_quantity = parse_quantity(columns.get(record, 1, "product_quantity")?)?;
    let product_price = parse_price(columns.get(record, 2, "product_price")?)?;
    let date_updated = parse_date(columns.get(record, 3, "date_updated")?)?;
    let brand_name = columns.get(record, 4, "brand_name")?.to_string();

    Ok(ProductRow {
        product_name,
        product_quantity,
        product_price,
        date_updated,
        brand_name,
    })
}

pub fn parse_quantity(raw: &str) -> Result<u32, RowError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| RowError::InvalidQuantity(raw.to_string()))
}

/// Dollars (optionally prefixed with `$`) to cents, rounding half to even.
pub fn parse_price(raw: &str) -> Result<Cents, RowError> {
    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    let dollars = amount
        .parse::<f64>()
        .map_err(|_| RowError::InvalidPrice(raw.to_string()))?;
    if !dollars.is_finite() {
        return Err(RowError::InvalidPrice(raw.to_string()));
    }

    let cents = (dollars * 100.0).round_ties_even();
    if cents < 0.0 {
        return Err(RowError::NegativePrice(raw.to_string()));
    }
    if cents >= i64::MAX as f64 {
        return Err(RowError::InvalidPrice(raw.to_string()));
    }
    Ok(Cents(cents as i64))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(raw.trim(), CSV_DATE_FORMAT)
        .map_err(|_| RowError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    const BRANDS: &str = "brand_name\nAcme\nBolt\n";

    fn store() -> Store {
        Store::open_in_memory(&Schema::inventory()).unwrap()
    }

    fn load_str(
        store: &mut Store,
        csv: &str,
        kind: EntityKind,
        policy: ErrorPolicy,
    ) -> Result<LoadSummary, LoadError> {
        load_reader(store, csv.as_bytes(), kind, policy)
    }

    #[test]
    fn price_parsing_rounds_to_cents() {
        assert_eq!(parse_price("$2.99").unwrap(), Cents(299));
        assert_eq!(parse_price("19.99").unwrap(), Cents(1999));
        assert_eq!(parse_price(" $0.1 ").unwrap(), Cents(10));
        assert_eq!(parse_price("$4").unwrap(), Cents(400));
        assert_eq!(parse_price("$1.005").unwrap(), Cents(100));
        assert_eq!(parse_price("0.125").unwrap(), Cents(12));
    }

    #[test]
    fn price_parsing_rejects_garbage_and_negatives() {
        assert!(matches!(parse_price("$-1.00"), Err(RowError::NegativePrice(_))));
        assert!(matches!(parse_price("-0.50"), Err(RowError::NegativePrice(_))));
        assert!(matches!(parse_price("abc"), Err(RowError::InvalidPrice(_))));
        assert!(matches!(parse_price(""), Err(RowError::InvalidPrice(_))));
        assert!(matches!(parse_price("NaN"), Err(RowError::InvalidPrice(_))));
        assert!(matches!(parse_price("$$1"), Err(RowError::InvalidPrice(_))));
    }

    #[test]
    fn date_parsing_is_month_first() {
        assert_eq!(
            parse_date("01/15/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("2024-01-15").is_err());
        assert!(parse_date("15/01/2024").is_err());
        assert!(parse_date("02/30/2024").is_err());
    }

    #[test]
    fn quantity_must_be_non_negative_integer() {
        assert_eq!(parse_quantity(" 10 ").unwrap(), 10);
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("1.5").is_err());
    }

    #[test]
    fn brands_are_inserted_without_dedup() {
        let mut store = store();
        let csv = "brand_name\nAcme\nAcme\n acme\n";
        let summary = load_str(&mut store, csv, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        assert_eq!(summary.inserted, 3);
        let names: Vec<_> = store
            .all_brands()
            .unwrap()
            .into_iter()
            .map(|b| b.brand_name)
            .collect();
        assert_eq!(names, ["Acme", "Acme", " acme"]);
    }

    #[test]
    fn products_with_unknown_brand_are_skipped_and_counted() {
        let mut store = store();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        let csv = "product_name,product_quantity,product_price,date_updated,brand_name\n\
                   Widget,10,$2.99,01/15/2024,Acme\n\
                   Orphan,1,$1.00,03/01/2024,Unknown\n";
        let summary = load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Abort).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped_missing_brand, 1);
        assert_eq!(store.product_count().unwrap(), 1);
    }

    #[test]
    fn columns_are_matched_by_header_name() {
        let mut store = store();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        let csv = "brand_name,date_updated,product_price,product_quantity,product_name\n\
                   Bolt,02/01/2024,$19.99,5,Gadget\n";
        load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Abort).unwrap();
        let product = store.find_product_by_id(1).unwrap().unwrap();
        assert_eq!(product.product_name, "Gadget");
        assert_eq!(product.product_quantity, 5);
        assert_eq!(product.product_price, Cents(1999));
    }

    #[test]
    fn abort_policy_commits_nothing_from_the_file() {
        let mut store = store();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        let csv = "product_name,product_quantity,product_price,date_updated,brand_name\n\
                   Widget,10,$2.99,01/15/2024,Acme\n\
                   Refund,1,$-5.00,01/16/2024,Acme\n";
        let err = load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Abort).unwrap_err();
        match err {
            LoadError::Row { line, source: RowError::NegativePrice(_), .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.product_count().unwrap(), 0);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn skip_policy_keeps_good_rows() {
        let mut store = store();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        let csv = "product_name,product_quantity,product_price,date_updated,brand_name\n\
                   Widget,10,$2.99,01/15/2024,Acme\n\
                   Refund,1,$-5.00,01/16/2024,Acme\n\
                   Late,1,$1.00,2024-01-16,Acme\n\
                   Gadget,5,$19.99,02/01/2024,Bolt\n";
        let summary = load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Skip).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped_malformed, 2);
        assert_eq!(store.product_count().unwrap(), 2);
    }

    #[test]
    fn missing_header_is_rejected_up_front() {
        let mut store = store();
        let err =
            load_str(&mut store, "name\nAcme\n", EntityKind::Brand, ErrorPolicy::Skip).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Row {
                line: 1,
                source: RowError::MissingColumn("brand_name"),
                ..
            }
        ));
    }

    #[test]
    fn short_rows_report_missing_column() {
        let mut store = store();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        let csv = "product_name,product_quantity,product_price,date_updated,brand_name\n\
                   Widget,10,$2.99\n";
        let err = load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Abort).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Row {
                source: RowError::MissingColumn("date_updated"),
                ..
            }
        ));
    }

    #[test]
    fn uncommitted_rows_are_not_swept_into_the_load() {
        let mut store = store();
        store.add(NewBrand {
            brand_name: "Stray".into(),
        });
        let summary = load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(store.brand_count().unwrap(), 2);
        assert!(store.find_brand_by_name("Stray").unwrap().is_none());
    }

    #[test]
    fn failed_commit_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let mut store = Store::open(&path, &Schema::inventory()).unwrap();
        load_str(&mut store, BRANDS, EntityKind::Brand, ErrorPolicy::Abort).unwrap();

        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_products BEFORE INSERT ON products
                 BEGIN SELECT RAISE(ABORT, 'products are read-only'); END;",
            )
            .unwrap();

        let csv = "product_name,product_quantity,product_price,date_updated,brand_name\n\
                   Widget,10,$2.99,01/15/2024,Acme\n\
                   Gadget,5,$19.99,02/01/2024,Bolt\n";
        let err = load_str(&mut store, csv, EntityKind::Product, ErrorPolicy::Abort).unwrap_err();
        assert!(
            matches!(err, LoadError::Store { kind: EntityKind::Product, .. }),
            "{err}"
        );
        assert_eq!(store.product_count().unwrap(), 0);
        assert_eq!(store.brand_count().unwrap(), 2);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut store = store();
        let err = load(
            &mut store,
            Path::new("does/not/exist.csv"),
            EntityKind::Brand,
            ErrorPolicy::Abort,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
