use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::item::{Item, ItemFilter, ItemId, ItemQuery};

/// Persistence primitives the service is written against. Every mutating call is
/// a single statement.
#[async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    /// Returns the row whatever its deleted flag; callers apply the liveness check.
    async fn find(&self, id: ItemId) -> anyhow::Result<Option<Item>>;
    async fn query(&self, query: ItemQuery) -> anyhow::Result<Vec<Item>>;
    async fn count(&self, filter: ItemFilter) -> anyhow::Result<i64>;
    async fn add(&self, item: &Item) -> anyhow::Result<()>;
    async fn save(&self, item: &Item) -> anyhow::Result<()>;
    /// Flags every live row matching `filter` as deleted and stamps `updated_at`.
    /// Only those two columns are written. Returns the number of rows flagged.
    async fn soft_delete_matching(&self, filter: ItemFilter, at: DateTime<Utc>) -> anyhow::Result<u64>;
}
