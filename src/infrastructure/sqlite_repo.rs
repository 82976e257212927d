use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    QueryBuilder, Row, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use uuid::Uuid;

use crate::domain::{
    item::{Item, ItemFilter, ItemId, ItemQuery, ItemStatus},
    repository::ItemRepository,
};

const COLUMNS: &str = "id, title, description, date_of_creation, updated_at, status, is_deleted";

#[derive(Clone)]
pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        // Each in-memory connection is its own database, so keep exactly one alive.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };
        Ok(Self { pool })
    }
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn init(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("running migrations")?;
        Ok(())
    }

    async fn find(&self, id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todo_items WHERE id = ?1"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_item).transpose()
    }

    async fn query(&self, query: ItemQuery) -> Result<Vec<Item>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM todo_items"));
        push_filter(&mut builder, query.filter);
        builder.push(" ORDER BY date_of_creation DESC");
        if let Some(page) = query.page {
            builder.push(" LIMIT ").push_bind(page.take);
            builder.push(" OFFSET ").push_bind(page.skip);
        }
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_item).collect()
    }

    async fn count(&self, filter: ItemFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM todo_items");
        push_filter(&mut builder, filter);
        let count = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn add(&self, item: &Item) -> Result<()> {
        sqlx::query(
            "INSERT INTO todo_items (id, title, description, date_of_creation, updated_at, status, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(item.id.0.to_string())
        .bind(&item.title)
        .bind(&item.description)
        .bind(format_timestamp(item.date_of_creation))
        .bind(item.updated_at.map(format_timestamp))
        .bind(i64::from(u8::from(item.status)))
        .bind(item.is_deleted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, item: &Item) -> Result<()> {
        let result = sqlx::query(
            "UPDATE todo_items SET title = ?2, description = ?3, updated_at = ?4, status = ?5, is_deleted = ?6
             WHERE id = ?1",
        )
        .bind(item.id.0.to_string())
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.updated_at.map(format_timestamp))
        .bind(i64::from(u8::from(item.status)))
        .bind(item.is_deleted)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("no stored item with id {}", item.id);
        }
        Ok(())
    }

    async fn soft_delete_matching(&self, filter: ItemFilter, at: DateTime<Utc>) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE todo_items SET is_deleted = 1, updated_at = ");
        builder.push_bind(format_timestamp(at));
        push_filter(&mut builder, filter);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Every filtered statement starts from the live rows only.
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: ItemFilter) {
    builder.push(" WHERE is_deleted = 0");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(i64::from(u8::from(status)));
    }
}

/// Fixed-width so that text ordering matches time ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("bad timestamp {raw:?}"))?
        .with_timezone(&Utc))
}

fn row_to_item(row: SqliteRow) -> Result<Item> {
    let id: String = row.try_get("id")?;
    let created: String = row.try_get("date_of_creation")?;
    let updated: Option<String> = row.try_get("updated_at")?;
    let status: i64 = row.try_get("status")?;

    Ok(Item {
        id: ItemId(Uuid::parse_str(&id).with_context(|| format!("bad item id {id:?}"))?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date_of_creation: parse_timestamp(&created)?,
        updated_at: updated.as_deref().map(parse_timestamp).transpose()?,
        status: ItemStatus::try_from(status)?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 1).unwrap();
        let fraction = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + chrono::Duration::milliseconds(500);
        let (a, b) = (format_timestamp(fraction), format_timestamp(whole));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_timestamp(&a).unwrap(), fraction);
    }
}
