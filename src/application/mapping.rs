use chrono::{DateTime, Utc};

use super::models::{CreateItemRequest, ItemResponse, UpdateItemRequest};
use crate::domain::item::{Item, ItemId, ItemStatus};

/// Field copies between stored items and request/response shapes.
pub trait ItemMapper: Send + Sync + 'static {
    fn to_response(&self, item: &Item) -> ItemResponse;
    fn from_create(&self, request: CreateItemRequest, id: ItemId, now: DateTime<Utc>) -> Item;
    /// Leaves `id`, `date_of_creation` and `is_deleted` alone.
    fn apply_update(&self, request: UpdateItemRequest, item: &mut Item);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl ItemMapper for FieldMapper {
    fn to_response(&self, item: &Item) -> ItemResponse {
        ItemResponse {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            date_of_creation: item.date_of_creation,
            updated_at: item.updated_at,
            status: item.status,
            is_deleted: item.is_deleted,
        }
    }

    fn from_create(&self, request: CreateItemRequest, id: ItemId, now: DateTime<Utc>) -> Item {
        Item {
            id,
            title: request.title,
            description: request.description,
            date_of_creation: now,
            updated_at: None,
            status: ItemStatus::Active,
            is_deleted: false,
        }
    }

    fn apply_update(&self, request: UpdateItemRequest, item: &mut Item) {
        item.title = request.title;
        item.description = request.description;
        item.status = request.status;
    }
}
