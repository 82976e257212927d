use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::{ItemId, ItemStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemStatusRequest {
    #[serde(default)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub date_of_creation: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: ItemStatus,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemsListResponse {
    /// Live items matching the filter, across all pages.
    pub total_count: i64,
    pub current_page_count: usize,
    pub to_do_items: Vec<ItemResponse>,
}

impl ItemsListResponse {
    pub fn new(to_do_items: Vec<ItemResponse>, total_count: i64) -> Self {
        Self { total_count, current_page_count: to_do_items.len(), to_do_items }
    }
}
