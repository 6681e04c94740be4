//! Postgres backend.
//!
//! Every entity maps onto one table named after [`Entity::COLLECTION`]. The
//! SQL is generated from the row's column list, so adding a field means
//! touching the row struct, its column list and the migration.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres};

use super::{Entity, Repository, StoreError};

pub type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// A snake_case row as stored in Postgres.
pub trait TableRow: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// Column names in bind order. The first column must be `id`.
    const COLUMNS: &'static [&'static str];

    /// Binds every column, in [`TableRow::COLUMNS`] order.
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

/// An entity that has a Postgres row adapter.
pub trait PgTable: Entity {
    type Row: TableRow;

    fn to_row(&self) -> Self::Row;

    fn from_row(row: Self::Row) -> Result<Self, StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects with the same pool settings for every deployment.
    pub async fn connect(database_url: &SecretString) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn select_sql<T: PgTable>() -> String {
    format!("SELECT {} FROM {}", T::Row::COLUMNS.join(", "), T::COLLECTION)
}

pub(crate) fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    let updates: Vec<String> = columns.iter().skip(1).map(|c| format!("{c} = EXCLUDED.{c}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT (id) DO UPDATE SET {}",
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

#[async_trait]
impl<T: PgTable> Repository<T> for PgStore {
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!("{} ORDER BY id", select_sql::<T>());
        let rows = sqlx::query_as::<_, T::Row>(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(T::from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let sql = format!("{} WHERE id = $1", select_sql::<T>());
        let row = sqlx::query_as::<_, T::Row>(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(T::from_row).transpose()
    }

    async fn save(&self, entity: &T) -> Result<(), StoreError> {
        let sql = upsert_sql(T::COLLECTION, T::Row::COLUMNS);
        let row = entity.to_row();
        row.bind(sqlx::query(&sql)).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
