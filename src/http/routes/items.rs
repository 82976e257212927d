use axum::{extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State}, routing::{delete, get, put}, Router, Json};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::application::item_service::{ItemService, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::application::models::{CreateItemRequest, ItemResponse, ItemsListResponse, UpdateItemRequest, UpdateItemStatusRequest};
use crate::domain::item::{ItemId, ItemStatus};
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState<S: ItemService> { pub service: S }

pub fn router<S: ItemService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/ToDoItem", get(list_items::<S>).post(create_item::<S>))
        .route("/api/ToDoItem/delete-all-completed", delete(delete_all_completed::<S>))
        .route("/api/ToDoItem/update-status/:id", put(update_status::<S>))
        .route("/api/ToDoItem/:id", get(get_item::<S>).put(update_item::<S>).delete(delete_item::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page_size: Option<i64>,
    page_number: Option<i64>,
    to_do_item_status: Option<ItemStatus>,
}

#[derive(Debug, Deserialize)]
struct StatusParams { status: Option<ItemStatus> }

async fn get_item<S: ItemService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get(id).await?))
}

async fn list_items<S: ItemService>(State(state): State<AppState<S>>, params: Result<Query<ListParams>, QueryRejection>) -> Result<Json<ItemsListResponse>, ApiError> {
    let Query(params) = params?;
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let page_number = params.page_number.unwrap_or(DEFAULT_PAGE_NUMBER);
    Ok(Json(state.service.get_list(page_size, page_number, params.to_do_item_status).await?))
}

async fn create_item<S: ItemService>(State(state): State<AppState<S>>, payload: Result<Json<CreateItemRequest>, JsonRejection>) -> Result<Json<ItemResponse>, ApiError> {
    Ok(Json(state.service.create(optional_body(payload)?).await?))
}

async fn update_item<S: ItemService>(State(state): State<AppState<S>>, Path(id): Path<String>, payload: Result<Json<UpdateItemRequest>, JsonRejection>) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.update(id, optional_body(payload)?).await?))
}

/// Status comes from `?status=` and falls back to a `{ "status": .. }` body.
async fn update_status<S: ItemService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    params: Result<Query<StatusParams>, QueryRejection>,
    payload: Result<Json<UpdateItemStatusRequest>, JsonRejection>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Query(params) = params?;
    let status = match params.status {
        Some(status) => status,
        None => optional_body(payload)?
            .map(|p| p.status)
            .ok_or_else(|| ApiError::bad_request("status is required"))?,
    };
    Ok(Json(state.service.update_status(id, status).await?))
}

async fn delete_item<S: ItemService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::OK)
}

async fn delete_all_completed<S: ItemService>(State(state): State<AppState<S>>) -> Result<StatusCode, ApiError> {
    state.service.delete_all_completed().await?;
    Ok(StatusCode::OK)
}

/// A request without a JSON body reaches the service as `None`; a body that
/// does not parse is rejected here with the reason.
fn optional_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<Option<T>, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(Some(body)),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(None),
        Err(rejection) => Err(rejection.into()),
    }
}

fn parse_id(s: &str) -> Result<ItemId, ApiError> {
    uuid::Uuid::parse_str(s).map(ItemId).map_err(|_| ApiError::bad_request(format!("invalid id {s:?}")))
}
