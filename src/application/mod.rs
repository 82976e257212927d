pub mod error;
pub mod item_service;
pub mod mapping;
pub mod models;
