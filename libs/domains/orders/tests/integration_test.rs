//! Integration tests for the Orders domain against real PostgreSQL

use domain_orders::*;
use migration::OrdersMigrator;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

fn new_order(user_id: Uuid, lines: &[(&str, i64, u32)]) -> Order {
    Order::new(
        Customer {
            user_id,
            name: "Ann".into(),
            email: "ann@bistro.test".into(),
        },
        lines
            .iter()
            .map(|(name, price, quantity)| {
                OrderItem::new(Uuid::now_v7(), name.to_string(), *price, *quantity)
            })
            .collect(),
        CreateOrder {
            delivery_address: "1 Main St".into(),
            phone: "+100000000".into(),
            comment: Some("Ring twice".into()),
        },
    )
}

#[tokio::test]
async fn test_create_and_get_keeps_item_order() {
    let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
    let repo = PgOrderRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_orders_create");

    let order = new_order(
        builder.user_id(),
        &[("Borscht", 1250, 2), ("Lemonade", 450, 1), ("Pie", 700, 3)],
    );
    repo.create(order.clone()).await.unwrap();

    let fetched = assert_some(repo.get_by_id(order.id).await.unwrap(), "order");
    assert_uuid_eq(fetched.user_id, builder.user_id(), "user_id");
    assert_eq!(fetched.status, OrderStatus::Draft);
    assert_eq!(fetched.total_cents, 2500 + 450 + 2100);
    let names: Vec<&str> = fetched.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Borscht", "Lemonade", "Pie"]);
    assert_eq!(fetched.items[2].line_total_cents, 2100);
    assert_eq!(fetched.comment.as_deref(), Some("Ring twice"));
}

#[tokio::test]
async fn test_update_persists_status_and_timestamps() {
    let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
    let repo = PgOrderRepository::new(db.connection());

    let mut order = repo
        .create(new_order(Uuid::now_v7(), &[("Borscht", 1250, 1)]))
        .await
        .unwrap();
    assert!(order.transition(OrderStatus::Pending));
    assert!(order.transition(OrderStatus::Paid));
    repo.update(order.clone()).await.unwrap();

    let fetched = assert_some(repo.get_by_id(order.id).await.unwrap(), "order");
    assert_eq!(fetched.status, OrderStatus::Paid);
    assert!(fetched.confirmed_at.is_some());
    assert!(fetched.paid_at.is_some());
    assert!(fetched.completed_at.is_none());
    assert_eq!(fetched.items.len(), 1);
}

#[tokio::test]
async fn test_update_missing_order() {
    let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
    let repo = PgOrderRepository::new(db.connection());

    let result = repo
        .update(new_order(Uuid::now_v7(), &[("Borscht", 1250, 1)]))
        .await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_and_attaches_items() {
    let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
    let repo = PgOrderRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_orders_list");
    let ann = builder.user_id();
    let bob = builder.other_user_id();

    repo.create(new_order(ann, &[("Borscht", 1250, 1)]))
        .await
        .unwrap();
    let mut confirmed = new_order(ann, &[("Pie", 700, 2), ("Tea", 300, 1)]);
    confirmed.transition(OrderStatus::Pending);
    repo.create(confirmed).await.unwrap();
    repo.create(new_order(bob, &[("Ramen", 1500, 1)]))
        .await
        .unwrap();

    let anns = OrderFilter {
        user_id: Some(ann),
        ..Default::default()
    };
    let listed = repo.list(anns.clone()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(repo.count(anns).await.unwrap(), 2);
    let pending = listed
        .iter()
        .find(|o| o.status == OrderStatus::Pending)
        .expect("pending order listed");
    assert_eq!(pending.items.len(), 2);
    assert_eq!(pending.items[0].name, "Pie");

    let by_status = OrderFilter {
        status: Some(OrderStatus::Pending),
        ..Default::default()
    };
    assert_eq!(repo.count(by_status).await.unwrap(), 1);

    let page = repo
        .list(OrderFilter {
            limit: 1,
            offset: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert!(!page[0].items.is_empty());
}

#[tokio::test]
async fn test_delete_cascades_items() {
    let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
    let repo = PgOrderRepository::new(db.connection());

    let order = repo
        .create(new_order(Uuid::now_v7(), &[("Borscht", 1250, 1)]))
        .await
        .unwrap();

    assert!(repo.delete(order.id).await.unwrap());
    assert!(!repo.delete(order.id).await.unwrap());
    assert!(repo.get_by_id(order.id).await.unwrap().is_none());
}
