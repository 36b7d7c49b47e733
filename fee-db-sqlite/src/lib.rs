//! SQLite-backed [`HistoryRepository`] implementation.
//!
//! Stores calculation snapshots in a `history_entries` table and the
//! free-save counter in an `app_settings` key/value table. Raw input
//! fields are persisted exactly as the seller typed them; derived decimal
//! values are stored as TEXT to avoid float drift.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, sqlite::SqlitePool};
use tracing::warn;

use fee_core::{
    HistoryEntry, HistoryRepository, ListingInputs, NewHistoryEntry, ProfitBreakdown,
    RepositoryError,
};

const SETTING_SAVE_COUNT: &str = "save_count";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the schema if it does not exist yet. Idempotent; call once
    /// after connecting.
    pub async fn init_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS history_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_name TEXT NOT NULL,
                sale_price TEXT NOT NULL,
                item_cost TEXT NOT NULL,
                shipping_charge TEXT NOT NULL,
                shipping_cost TEXT NOT NULL,
                vat_percentage TEXT NOT NULL,
                category_id TEXT NOT NULL,
                price_includes_vat INTEGER NOT NULL,
                total_revenue TEXT NOT NULL,
                vat_amount TEXT NOT NULL,
                referral_fee TEXT NOT NULL,
                payment_processing_fee TEXT NOT NULL,
                total_marketplace_fees TEXT NOT NULL,
                total_costs TEXT NOT NULL,
                net_profit TEXT NOT NULL,
                profit_margin TEXT NOT NULL,
                roi TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn get_entry(
        &self,
        id: i64,
    ) -> Result<HistoryEntry, RepositoryError> {
        let row: HistoryEntryRow = sqlx::query_as(
            "SELECT id, item_name, sale_price, item_cost, shipping_charge, shipping_cost,
                    vat_percentage, category_id, price_includes_vat,
                    total_revenue, vat_amount, referral_fee, payment_processing_fee,
                    total_marketplace_fees, total_costs, net_profit, profit_margin, roi,
                    created_at
             FROM history_entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

#[derive(FromRow)]
struct HistoryEntryRow {
    id: i64,
    item_name: String,
    sale_price: String,
    item_cost: String,
    shipping_charge: String,
    shipping_cost: String,
    vat_percentage: String,
    category_id: String,
    price_includes_vat: bool,
    total_revenue: String,
    vat_amount: String,
    referral_fee: String,
    payment_processing_fee: String,
    total_marketplace_fees: String,
    total_costs: String,
    net_profit: String,
    profit_margin: String,
    roi: String,
    created_at: String,
}

impl TryFrom<HistoryEntryRow> for HistoryEntry {
    type Error = RepositoryError;

    fn try_from(row: HistoryEntryRow) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            id: row.id,
            created_at: parse_datetime(&row.created_at)?,
            inputs: ListingInputs {
                item_name: row.item_name,
                sale_price: row.sale_price,
                item_cost: row.item_cost,
                shipping_charge: row.shipping_charge,
                shipping_cost: row.shipping_cost,
                vat_percentage: row.vat_percentage,
                category_id: row.category_id,
                price_includes_vat: row.price_includes_vat,
            },
            results: ProfitBreakdown {
                total_revenue: parse_decimal(&row.total_revenue)?,
                vat_amount: parse_decimal(&row.vat_amount)?,
                referral_fee: parse_decimal(&row.referral_fee)?,
                payment_processing_fee: parse_decimal(&row.payment_processing_fee)?,
                total_marketplace_fees: parse_decimal(&row.total_marketplace_fees)?,
                total_costs: parse_decimal(&row.total_costs)?,
                net_profit: parse_decimal(&row.net_profit)?,
                profit_margin: parse_decimal(&row.profit_margin)?,
                roi: parse_decimal(&row.roi)?,
            },
        })
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    // SQLite stores timestamps in various formats, try common ones
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl HistoryRepository for SqliteRepository {
    async fn add_entry(
        &self,
        entry: NewHistoryEntry,
    ) -> Result<HistoryEntry, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "INSERT INTO history_entries (
                item_name, sale_price, item_cost, shipping_charge, shipping_cost,
                vat_percentage, category_id, price_includes_vat,
                total_revenue, vat_amount, referral_fee, payment_processing_fee,
                total_marketplace_fees, total_costs, net_profit, profit_margin, roi,
                created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.inputs.item_name)
        .bind(&entry.inputs.sale_price)
        .bind(&entry.inputs.item_cost)
        .bind(&entry.inputs.shipping_charge)
        .bind(&entry.inputs.shipping_cost)
        .bind(&entry.inputs.vat_percentage)
        .bind(&entry.inputs.category_id)
        .bind(entry.inputs.price_includes_vat)
        .bind(entry.results.total_revenue.to_string())
        .bind(entry.results.vat_amount.to_string())
        .bind(entry.results.referral_fee.to_string())
        .bind(entry.results.payment_processing_fee.to_string())
        .bind(entry.results.total_marketplace_fees.to_string())
        .bind(entry.results.total_costs.to_string())
        .bind(entry.results.net_profit.to_string())
        .bind(entry.results.profit_margin.to_string())
        .bind(entry.results.roi.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_entry(id).await
    }

    async fn list_entries(&self) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let rows: Vec<HistoryEntryRow> = sqlx::query_as(
            "SELECT id, item_name, sale_price, item_cost, shipping_charge, shipping_cost,
                    vat_percentage, category_id, price_includes_vat,
                    total_revenue, vat_amount, referral_fee, payment_processing_fee,
                    total_marketplace_fees, total_costs, net_profit, profit_margin, roi,
                    created_at
             FROM history_entries ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn delete_entries(
        &self,
        ids: &[i64],
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM history_entries WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn clear_entries(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM history_entries")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn load_save_count(&self) -> Result<u32, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM app_settings WHERE key = ?")
                .bind(SETTING_SAVE_COUNT)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        match row {
            Some((value,)) => match value.parse::<u32>() {
                Ok(count) => Ok(count),
                Err(_) => {
                    // A corrupt counter reads as empty state, never fatal.
                    warn!(value, "malformed save counter; treating as 0");
                    Ok(0)
                }
            },
            None => Ok(0),
        }
    }

    async fn store_save_count(
        &self,
        count: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO app_settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(SETTING_SAVE_COUNT)
        .bind(count.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use fee_core::calculations::ProfitWorksheet;
    use fee_core::models::CategoryTable;

    use super::*;

    async fn test_repo() -> SqliteRepository {
        // One connection: each in-memory SQLite connection is its own db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        let repo = SqliteRepository::with_pool(pool);
        repo.init_schema().await.expect("schema");
        repo
    }

    fn sample_entry(item_name: &str) -> NewHistoryEntry {
        let categories = CategoryTable::built_in();
        let inputs = ListingInputs {
            item_name: item_name.to_string(),
            sale_price: "100".to_string(),
            item_cost: "40".to_string(),
            shipping_charge: "5".to_string(),
            shipping_cost: "3".to_string(),
            vat_percentage: "20".to_string(),
            category_id: "books".to_string(),
            price_includes_vat: false,
        };
        let results = ProfitWorksheet::new(&categories).calculate(&inputs);
        NewHistoryEntry { inputs, results }
    }

    // =========================================================================
    // history entry tests
    // =========================================================================

    #[tokio::test]
    async fn add_entry_round_trips_the_snapshot() {
        let repo = test_repo().await;

        let saved = repo.add_entry(sample_entry("Paperback")).await.unwrap();

        assert_eq!(saved.inputs.item_name, "Paperback");
        assert_eq!(saved.inputs.sale_price, "100"); // raw string preserved
        assert!(!saved.inputs.price_includes_vat);
        assert_eq!(saved.results.total_revenue, dec!(125.00));
        assert_eq!(saved.results.net_profit, dec!(50.75));

        let listed = repo.list_entries().await.unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[tokio::test]
    async fn ids_are_assigned_monotonically() {
        let repo = test_repo().await;

        let first = repo.add_entry(sample_entry("first")).await.unwrap();
        let second = repo.add_entry(sample_entry("second")).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_entries_returns_newest_first() {
        let repo = test_repo().await;
        repo.add_entry(sample_entry("older")).await.unwrap();
        repo.add_entry(sample_entry("newer")).await.unwrap();

        let entries = repo.list_entries().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].inputs.item_name, "newer");
        assert_eq!(entries[1].inputs.item_name, "older");
    }

    #[tokio::test]
    async fn delete_entries_removes_only_the_selected_ids() {
        let repo = test_repo().await;
        let keep = repo.add_entry(sample_entry("keep")).await.unwrap();
        let drop_a = repo.add_entry(sample_entry("drop a")).await.unwrap();
        let drop_b = repo.add_entry(sample_entry("drop b")).await.unwrap();

        let deleted = repo.delete_entries(&[drop_a.id, drop_b.id]).await.unwrap();

        assert_eq!(deleted, 2);
        let remaining = repo.list_entries().await.unwrap();
        assert_eq!(remaining, vec![keep]);
    }

    #[tokio::test]
    async fn delete_entries_with_no_ids_is_a_no_op() {
        let repo = test_repo().await;
        repo.add_entry(sample_entry("kept")).await.unwrap();

        let deleted = repo.delete_entries(&[]).await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(repo.list_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_entries_ignores_unknown_ids() {
        let repo = test_repo().await;
        let entry = repo.add_entry(sample_entry("kept")).await.unwrap();

        let deleted = repo.delete_entries(&[entry.id + 100]).await.unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn clear_entries_empties_the_history() {
        let repo = test_repo().await;
        repo.add_entry(sample_entry("one")).await.unwrap();
        repo.add_entry(sample_entry("two")).await.unwrap();

        let deleted = repo.clear_entries().await.unwrap();

        assert_eq!(deleted, 2);
        assert!(repo.list_entries().await.unwrap().is_empty());
    }

    // =========================================================================
    // save counter tests
    // =========================================================================

    #[tokio::test]
    async fn missing_counter_reads_as_zero() {
        let repo = test_repo().await;

        assert_eq!(repo.load_save_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counter_round_trips() {
        let repo = test_repo().await;

        repo.store_save_count(2).await.unwrap();

        assert_eq!(repo.load_save_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn counter_overwrites_on_each_store() {
        let repo = test_repo().await;

        repo.store_save_count(1).await.unwrap();
        repo.store_save_count(3).await.unwrap();
        repo.store_save_count(0).await.unwrap();

        assert_eq!(repo.load_save_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_counter_reads_as_zero() {
        let repo = test_repo().await;
        sqlx::query("INSERT INTO app_settings (key, value) VALUES ('save_count', 'banana')")
            .execute(repo.pool())
            .await
            .unwrap();

        assert_eq!(repo.load_save_count().await.unwrap(), 0);
    }
}
