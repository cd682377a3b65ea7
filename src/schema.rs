//! Table definitions for the inventory database. The schema is an ordinary
//! value built once at startup and handed to [`crate::db::Store::open`].

/// One table and the statement that creates it.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub create_sql: &'static str,
}

/// Ordered list of tables. Parents come before children so foreign keys
/// always point at an existing table.
#[derive(Debug, Clone)]
pub struct Schema {
    tables: Vec<TableDef>,
}

impl Schema {
    /// The two-table brand/product schema.
    pub fn inventory() -> Self {
        Self {
            tables: vec![
                TableDef {
                    name: "brands",
                    create_sql: "CREATE TABLE IF NOT EXISTS brands (
                        brand_id INTEGER PRIMARY KEY AUTOINCREMENT,
                        brand_name TEXT NOT NULL
                    )",
                },
                TableDef {
                    name: "products",
                    create_sql: "CREATE TABLE IF NOT EXISTS products (
                        product_id INTEGER PRIMARY KEY AUTOINCREMENT,
                        product_name TEXT NOT NULL,
                        product_quantity INTEGER NOT NULL CHECK (product_quantity >= 0),
                        product_price INTEGER NOT NULL CHECK (product_price >= 0),
                        date_updated TEXT NOT NULL,
                        brand_id INTEGER NOT NULL,
                        FOREIGN KEY(brand_id) REFERENCES brands(brand_id)
                    )",
                },
            ],
        }
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }
}
