use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};

use super::error::{ServiceError, ServiceResult};
use super::mapping::{FieldMapper, ItemMapper};
use super::models::{CreateItemRequest, ItemResponse, ItemsListResponse, UpdateItemRequest};
use crate::domain::item::{Item, ItemFilter, ItemId, ItemQuery, ItemStatus, Page};
use crate::domain::repository::ItemRepository;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_PAGE_NUMBER: i64 = 1;

#[async_trait]
pub trait ItemService: Send + Sync + 'static {
    async fn get(&self, id: ItemId) -> ServiceResult<ItemResponse>;
    async fn get_list(&self, page_size: i64, page_number: i64, status: Option<ItemStatus>) -> ServiceResult<ItemsListResponse>;
    async fn create(&self, request: Option<CreateItemRequest>) -> ServiceResult<ItemResponse>;
    async fn update(&self, id: ItemId, request: Option<UpdateItemRequest>) -> ServiceResult<ItemResponse>;
    async fn update_status(&self, id: ItemId, status: ItemStatus) -> ServiceResult<ItemResponse>;
    async fn delete(&self, id: ItemId) -> ServiceResult<()>;
    /// Returns the number of items that were soft-deleted.
    async fn delete_all_completed(&self) -> ServiceResult<usize>;
}

#[derive(Clone)]
pub struct ItemServiceImpl<R: ItemRepository, M: ItemMapper = FieldMapper> {
    repo: R,
    mapper: M,
}

impl<R: ItemRepository> ItemServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo, mapper: FieldMapper } }
}

impl<R: ItemRepository, M: ItemMapper> ItemServiceImpl<R, M> {
    pub fn with_mapper(repo: R, mapper: M) -> Self { Self { repo, mapper } }

    /// Loads an item that exists and is not soft-deleted.
    async fn load_live(&self, operation: &'static str, id: ItemId) -> ServiceResult<Item> {
        match self.repo.find(id).await? {
            Some(item) if item.is_live() => Ok(item),
            _ => {
                tracing::warn!(%id, operation, "item not found");
                Err(ServiceError::NotFound { operation, id })
            }
        }
    }
}

/// Stored timestamps keep microseconds; responses must carry the same value.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

fn require<T>(request: Option<T>, what: &str) -> ServiceResult<T> {
    request.ok_or_else(|| {
        tracing::warn!(what, "request body missing");
        ServiceError::InvalidArgument(format!("{what} request is required"))
    })
}

fn require_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        tracing::warn!("rejected empty title");
        return Err(ServiceError::InvalidArgument("title must not be empty".into()));
    }
    Ok(())
}

fn page_window(page_size: i64, page_number: i64) -> ServiceResult<Page> {
    if page_size <= 0 || page_number <= 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "pageSize and pageNumber must be positive (got pageSize = {page_size}, pageNumber = {page_number})"
        )));
    }
    let skip = (page_number - 1)
        .checked_mul(page_size)
        .ok_or_else(|| ServiceError::InvalidArgument("page is out of range".into()))?;
    Ok(Page { skip, take: page_size })
}

#[async_trait]
impl<R: ItemRepository, M: ItemMapper> ItemService for ItemServiceImpl<R, M> {
    async fn get(&self, id: ItemId) -> ServiceResult<ItemResponse> {
        let item = self.load_live("Get To Do Item", id).await?;
        Ok(self.mapper.to_response(&item))
    }

    async fn get_list(&self, page_size: i64, page_number: i64, status: Option<ItemStatus>) -> ServiceResult<ItemsListResponse> {
        let page = page_window(page_size, page_number)?;
        let filter = ItemFilter { status };
        // Count and page are read separately; a concurrent write can land between them.
        let items = self.repo.query(ItemQuery { filter, page: Some(page) }).await?;
        let total = self.repo.count(filter).await?;
        tracing::debug!(page_size, page_number, ?status, returned = items.len(), total, "listed items");
        Ok(ItemsListResponse::new(items.iter().map(|i| self.mapper.to_response(i)).collect(), total))
    }

    async fn create(&self, request: Option<CreateItemRequest>) -> ServiceResult<ItemResponse> {
        let request = require(request, "create")?;
        require_title(&request.title)?;
        let item = self.mapper.from_create(request, ItemId::new(), now());
        self.repo.add(&item).await?;
        tracing::info!(id = %item.id, "created item");
        Ok(self.mapper.to_response(&item))
    }

    async fn update(&self, id: ItemId, request: Option<UpdateItemRequest>) -> ServiceResult<ItemResponse> {
        let request = require(request, "update")?;
        require_title(&request.title)?;
        let mut item = self.load_live("Update To Do Item", id).await?;
        self.mapper.apply_update(request, &mut item);
        item.touch(now());
        self.repo.save(&item).await?;
        tracing::info!(%id, "updated item");
        Ok(self.mapper.to_response(&item))
    }

    async fn update_status(&self, id: ItemId, status: ItemStatus) -> ServiceResult<ItemResponse> {
        let mut item = self.load_live("Update To Do Item Status", id).await?;
        item.status = status;
        item.touch(now());
        self.repo.save(&item).await?;
        tracing::info!(%id, %status, "updated item status");
        Ok(self.mapper.to_response(&item))
    }

    async fn delete(&self, id: ItemId) -> ServiceResult<()> {
        let mut item = self.load_live("Delete To Do Item", id).await?;
        item.is_deleted = true;
        item.touch(now());
        self.repo.save(&item).await?;
        tracing::info!(%id, "deleted item");
        Ok(())
    }

    async fn delete_all_completed(&self) -> ServiceResult<usize> {
        let count = self.repo.soft_delete_matching(ItemFilter::with_status(ItemStatus::Completed), now()).await?;
        tracing::info!(count, "deleted completed items");
        Ok(count as usize)
    }
}
