use crate::domain::item::ItemId;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{operation}: To Do Item with Id = {id} not found.")]
    NotFound { operation: &'static str, id: ItemId },
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
