//! SQLite output
//!
//! Records land in a single `product_variants` table, one row per record,
//! stamped with the time they were written.

use crate::model::ProductVariantRecord;
use crate::output::traits::{OutputResult, RowSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for the output database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS product_variants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT NOT NULL,
    brand TEXT NOT NULL,
    shoe TEXT NOT NULL,
    price TEXT NOT NULL,
    url TEXT NOT NULL,
    image_url TEXT NOT NULL,
    size TEXT NOT NULL,
    width TEXT NOT NULL,
    color TEXT NOT NULL,
    gender TEXT NOT NULL,
    retailer TEXT NOT NULL,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_variants_keyword ON product_variants(keyword);
CREATE INDEX IF NOT EXISTS idx_product_variants_url ON product_variants(url);
"#;

/// Appends records to a SQLite database
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// An existing database keeps its rows; new records are appended.
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory database
    pub fn in_memory() -> OutputResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Number of stored rows
    pub fn count(&self) -> OutputResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM product_variants", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Stored rows for one keyword, in insertion order
    pub fn rows_for_keyword(&self, keyword: &str) -> OutputResult<Vec<ProductVariantRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT keyword, brand, shoe, price, url, image_url, size, width, color, gender, retailer
             FROM product_variants WHERE keyword = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![keyword], |row| {
                Ok(ProductVariantRecord {
                    keyword: row.get(0)?,
                    brand: row.get(1)?,
                    name: row.get(2)?,
                    price: row.get(3)?,
                    url: row.get(4)?,
                    image_url: row.get(5)?,
                    size: row.get(6)?,
                    width: row.get(7)?,
                    color: row.get(8)?,
                    gender: row.get(9)?,
                    retailer: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl RowSink for SqliteSink {
    fn append(&mut self, record: &ProductVariantRecord) -> OutputResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO product_variants
                (keyword, brand, shoe, price, url, image_url, size, width, color, gender, retailer, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.keyword,
                record.brand,
                record.name,
                record.price,
                record.url,
                record.image_url,
                record.size,
                record.width,
                record.color,
                record.gender,
                record.retailer,
                now
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
