use chrono::{Duration, TimeZone, Utc};
use todo_api::application::item_service::{ItemService, ItemServiceImpl};
use todo_api::application::models::CreateItemRequest;
use todo_api::domain::item::{Item, ItemFilter, ItemId, ItemQuery, ItemStatus, Page};
use todo_api::domain::repository::ItemRepository;
use todo_api::infrastructure::sqlite_repo::SqliteItemRepository;

async fn repo() -> SqliteItemRepository {
    let repo = SqliteItemRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    repo
}

/// 7 Active, 3 Completed and one deleted Completed item, one minute apart.
async fn seeded() -> (SqliteItemRepository, Vec<Item>) {
    let repo = repo().await;
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let mut items = Vec::new();
    for n in 0..11 {
        let item = Item {
            id: ItemId::new(),
            title: format!("item {n}"),
            description: (n % 2 == 0).then(|| format!("description {n}")),
            date_of_creation: base + Duration::minutes(n),
            updated_at: None,
            status: if (7..10).contains(&n) || n == 5 { ItemStatus::Completed } else { ItemStatus::Active },
            is_deleted: n == 5,
        };
        repo.add(&item).await.unwrap();
        items.push(item);
    }
    (repo, items)
}

fn ids(items: &[Item]) -> Vec<ItemId> { items.iter().map(|i| i.id).collect() }

#[tokio::test]
async fn find_round_trips_every_column() {
    let (repo, items) = seeded().await;
    for item in &items {
        assert_eq!(repo.find(item.id).await.unwrap().as_ref(), Some(item));
    }
    assert_eq!(repo.find(ItemId::new()).await.unwrap(), None);
}

#[tokio::test]
async fn query_pages_newest_first_and_skips_deleted() {
    let (repo, items) = seeded().await;
    let first = repo.query(ItemQuery { filter: ItemFilter::live(), page: Some(Page { skip: 0, take: 5 }) }).await.unwrap();
    assert_eq!(ids(&first), ids(&[items[10].clone(), items[9].clone(), items[8].clone(), items[7].clone(), items[6].clone()]));

    let second = repo.query(ItemQuery { filter: ItemFilter::live(), page: Some(Page { skip: 7, take: 7 }) }).await.unwrap();
    assert_eq!(ids(&second), ids(&[items[2].clone(), items[1].clone(), items[0].clone()]));

    assert_eq!(repo.count(ItemFilter::live()).await.unwrap(), 10);
}

#[tokio::test]
async fn status_filter_excludes_deleted_rows() {
    let (repo, _) = seeded().await;
    let completed = repo.query(ItemQuery { filter: ItemFilter::with_status(ItemStatus::Completed), page: None }).await.unwrap();
    assert_eq!(completed.len(), 3);
    assert!(completed.iter().all(|i| i.status == ItemStatus::Completed && !i.is_deleted));
    assert_eq!(repo.count(ItemFilter::with_status(ItemStatus::Active)).await.unwrap(), 7);
}

#[tokio::test]
async fn soft_delete_writes_only_flag_and_timestamp() {
    let (repo, items) = seeded().await;
    // Item 8 is reopened and renamed after someone read it as Completed.
    let mut reopened = items[8].clone();
    reopened.status = ItemStatus::Active;
    reopened.title = "renamed".into();
    repo.save(&reopened).await.unwrap();

    let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let flagged = repo.soft_delete_matching(ItemFilter::with_status(ItemStatus::Completed), at).await.unwrap();
    assert_eq!(flagged, 2);

    assert_eq!(repo.find(items[8].id).await.unwrap(), Some(reopened));
    for n in [7, 9] {
        let stored = repo.find(items[n].id).await.unwrap().unwrap();
        assert!(stored.is_deleted);
        assert_eq!(stored.updated_at, Some(at));
        assert_eq!(stored.title, items[n].title);
    }
    // already deleted rows keep their old stamp
    assert_eq!(repo.find(items[5].id).await.unwrap().unwrap().updated_at, None);
    assert_eq!(repo.count(ItemFilter::live()).await.unwrap(), 8);
}

#[tokio::test]
async fn soft_delete_with_no_matches_flags_nothing() {
    let repo = repo().await;
    assert_eq!(repo.soft_delete_matching(ItemFilter::with_status(ItemStatus::Completed), Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn service_responses_match_what_reads_return() {
    let service = ItemServiceImpl::new(repo().await);
    for n in 0..20 {
        let created = service.create(Some(CreateItemRequest { title: format!("item {n}"), description: None })).await.unwrap();
        let read = service.get(created.id).await.unwrap();
        assert_eq!(read.date_of_creation, created.date_of_creation);

        let updated = service.update_status(created.id, ItemStatus::Completed).await.unwrap();
        assert_eq!(service.get(created.id).await.unwrap().updated_at, updated.updated_at);
    }
}

#[tokio::test]
async fn save_of_unknown_item_fails() {
    let (repo, items) = seeded().await;
    let mut stranger = items[0].clone();
    stranger.id = ItemId::new();
    assert!(repo.save(&stranger).await.is_err());
}

#[tokio::test]
async fn init_is_idempotent() {
    let repo = repo().await;
    repo.init().await.unwrap();
}
