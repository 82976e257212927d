use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for ItemId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Lifecycle flag of an item. Travels as `0`/`1` on the wire and in the table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum ItemStatus {
    #[default]
    Active,
    Completed,
}

impl From<ItemStatus> for u8 {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Active => 0,
            ItemStatus::Completed => 1,
        }
    }
}

impl TryFrom<u8> for ItemStatus {
    type Error = InvalidStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ItemStatus::Active),
            1 => Ok(ItemStatus::Completed),
            other => Err(InvalidStatus(other as i64)),
        }
    }
}

impl TryFrom<i64> for ItemStatus {
    type Error = InvalidStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).map_err(|_| InvalidStatus(value)).and_then(ItemStatus::try_from)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Active => f.write_str("Active"),
            ItemStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status {0}: expected 0 (Active) or 1 (Completed)")]
pub struct InvalidStatus(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub date_of_creation: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: ItemStatus,
    pub is_deleted: bool,
}

impl Item {
    /// Soft-deleted items are treated as absent everywhere.
    pub fn is_live(&self) -> bool { !self.is_deleted }

    pub fn touch(&mut self, now: DateTime<Utc>) { self.updated_at = Some(now); }
}

/// Restriction shared by every read path. Deleted rows never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub status: Option<ItemStatus>,
}

impl ItemFilter {
    pub fn live() -> Self { Self::default() }

    pub fn with_status(status: ItemStatus) -> Self { Self { status: Some(status) } }

    pub fn matches(&self, item: &Item) -> bool {
        item.is_live() && self.status.is_none_or(|s| s == item.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub take: i64,
}

/// Filter plus optional paging; results always come back newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub page: Option<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ItemStatus, is_deleted: bool) -> Item {
        Item {
            id: ItemId::new(),
            title: "t".into(),
            description: None,
            date_of_creation: Utc::now(),
            updated_at: None,
            status,
            is_deleted,
        }
    }

    #[test]
    fn status_travels_as_integer() {
        assert_eq!(serde_json::to_string(&ItemStatus::Active).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ItemStatus::Completed).unwrap(), "1");
        assert_eq!(serde_json::from_str::<ItemStatus>("1").unwrap(), ItemStatus::Completed);
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!(serde_json::from_str::<ItemStatus>("2").is_err());
        assert!(serde_json::from_str::<ItemStatus>("-1").is_err());
        assert_eq!(ItemStatus::try_from(7_i64), Err(InvalidStatus(7)));
    }

    #[test]
    fn filter_never_matches_deleted_items() {
        assert!(!ItemFilter::live().matches(&item(ItemStatus::Active, true)));
        assert!(!ItemFilter::with_status(ItemStatus::Completed).matches(&item(ItemStatus::Completed, true)));
        assert!(ItemFilter::live().matches(&item(ItemStatus::Completed, false)));
        assert!(!ItemFilter::with_status(ItemStatus::Active).matches(&item(ItemStatus::Completed, false)));
    }
}
