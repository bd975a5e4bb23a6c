//! Integration tests for the Users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries and row mapping work against the migrated schema
//! - The unique email constraint is reported as a domain error
//! - Filters, counting and pagination agree with each other

use axum_helpers::Role;
use chrono::{Duration, Utc};
use domain_users::*;
use migration::UsersMigrator;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn new_user(email: &str, name: &str, role: Role) -> User {
    User::new(email, name.to_string(), "$argon2id$test".to_string(), role)
}

#[tokio::test]
async fn test_create_and_get_user() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_create_and_get");

    let created = repo
        .create(new_user(&builder.email("ann"), "Ann", Role::User))
        .await
        .unwrap();

    let by_id = assert_some(repo.get_by_id(created.id).await.unwrap(), "user by id");
    assert_uuid_eq(by_id.id, created.id, "user id");
    assert_eq!(by_id.email, builder.email("ann"));
    assert_eq!(by_id.role, Role::User);
    assert!(by_id.is_active);

    let by_email = assert_some(
        repo.get_by_email(&builder.email("ann")).await.unwrap(),
        "user by email",
    );
    assert_uuid_eq(by_email.id, created.id, "user id by email");
}

#[tokio::test]
async fn test_duplicate_email_constraint() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_duplicate_email");

    repo.create(new_user(&builder.email("dup"), "First", Role::User))
        .await
        .unwrap();

    let result = repo
        .create(new_user(&builder.email("dup"), "Second", Role::User))
        .await;
    assert!(
        matches!(result, Err(UserError::DuplicateEmail(_))),
        "Expected DuplicateEmail error, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_update_persists_reset_token_and_role() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_update");

    let mut user = repo
        .create(new_user(&builder.email("reset"), "Reset", Role::User))
        .await
        .unwrap();

    user.role = Role::Manager;
    user.reset_token_hash = Some("abc123".to_string());
    user.reset_token_expires_at = Some(Utc::now() + Duration::minutes(60));
    user.touch();
    repo.update(user.clone()).await.unwrap();

    let found = assert_some(
        repo.get_by_reset_token_hash("abc123").await.unwrap(),
        "user by reset token",
    );
    assert_uuid_eq(found.id, user.id, "reset token owner");
    assert_eq!(found.role, Role::Manager);
    assert!(found.reset_token_expires_at.is_some());
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());

    let ghost = new_user("ghost@bistro.test", "Ghost", Role::User);
    let result = repo.update(ghost).await;
    assert!(matches!(result, Err(UserError::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_and_counts() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_list");

    for i in 0..3 {
        repo.create(new_user(
            &builder.email(&format!("cook{}", i)),
            &format!("Cook {}", i),
            Role::User,
        ))
        .await
        .unwrap();
    }
    repo.create(new_user(&builder.email("boss"), "Boss", Role::Manager))
        .await
        .unwrap();

    let managers = UserFilter {
        role: Some(Role::Manager),
        ..Default::default()
    };
    assert_eq!(repo.count(managers.clone()).await.unwrap(), 1);
    assert_eq!(repo.list(managers).await.unwrap()[0].name, "Boss");

    let cooks = UserFilter {
        search: Some("COOK".to_string()),
        limit: 2,
        ..Default::default()
    };
    assert_eq!(repo.count(cooks.clone()).await.unwrap(), 3);
    assert_eq!(repo.list(cooks.clone()).await.unwrap().len(), 2);

    let second_page = UserFilter {
        offset: 2,
        ..cooks
    };
    assert_eq!(repo.list(second_page).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_user() {
    let db = TestDatabase::with_migrator::<UsersMigrator>().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_delete");

    let user = repo
        .create(new_user(&builder.email("bye"), "Bye", Role::User))
        .await
        .unwrap();

    assert!(repo.delete(user.id).await.unwrap());
    assert!(!repo.delete(user.id).await.unwrap());
    assert!(repo.get_by_id(user.id).await.unwrap().is_none());
}
