use std::sync::Arc;

use blog_core::domain::{Post, User};
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};

use crate::database::entity::{post, user};
use crate::database::postgres_base::map_db_err;
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresUserRepository, mask_email,
};

fn user_model(email: &str) -> user::Model {
    let now = chrono::Utc::now();
    user::Model {
        id: uuid::Uuid::new_v4(),
        first_name: "admin".to_owned(),
        last_name: "admin".to_owned(),
        email: email.to_owned(),
        password_hash: "$argon2id$stub".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn post_model(user_id: uuid::Uuid, title: &str, minutes_ago: i64) -> post::Model {
    let at = chrono::Utc::now() - chrono::TimeDelta::minutes(minutes_ago);
    post::Model {
        id: uuid::Uuid::new_v4(),
        user_id,
        title: title.to_owned(),
        content: "Test Content".to_owned(),
        created_at: at.into(),
        updated_at: at.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = uuid::Uuid::new_v4();
    let user_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            user_id,
            title: "Test Title".to_owned(),
            content: "Test Content".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Title");
    assert_eq!(post.id, post_id);
    assert_eq!(post.user_id, user_id);
}

#[tokio::test]
async fn test_find_user_by_email() {
    let model = user_model("admin@admin.com");
    let id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .append_query_results(vec![Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let found: User = repo
        .find_by_email("admin@admin.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.full_name(), "admin admin");

    let missing = repo.find_by_email("nobody@admin.com").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_by_user_id_reports_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let removed = repo.delete_by_user_id(uuid::Uuid::new_v4()).await.unwrap();
    assert_eq!(removed, 2);
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let err = BaseRepository::<User, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, blog_core::RepoError::NotFound));
}

#[test]
fn test_mask_email() {
    assert_eq!(mask_email("admin@admin.com"), "a***@admin.com");
    assert_eq!(mask_email("a@admin.com"), "***@admin.com");
    assert_eq!(mask_email("no-at-sign"), "***");
}

#[tokio::test]
async fn test_save_new_user_falls_back_to_insert() {
    let model = user_model("new@user.com");
    let user: User = model.clone().into();

    // The UPDATE ... RETURNING matches nothing, then the INSERT returns the row.
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<user::Model>::new(), vec![model]])
            .into_connection(),
    );
    let repo = PostgresUserRepository::shared(db.clone());

    let saved = repo.save(user.clone()).await.unwrap();
    assert_eq!(saved.id, user.id);
    assert_eq!(saved.email, "new@user.com");

    drop(repo);
    let log = Arc::try_unwrap(db)
        .ok()
        .map(|db| db.into_transaction_log())
        .unwrap();
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn test_save_existing_user_updates() {
    let mut model = user_model("admin@admin.com");
    let mut user: User = model.clone().into();
    user.update_profile(
        "Admin".to_string(),
        "One".to_string(),
        "admin@admin.com".to_string(),
    );
    model.first_name = "Admin".to_owned();
    model.last_name = "One".to_owned();

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection(),
    );
    let repo = PostgresUserRepository::shared(db.clone());

    let saved = repo.save(user).await.unwrap();
    assert_eq!(saved.full_name(), "Admin One");

    drop(repo);
    let log = Arc::try_unwrap(db)
        .ok()
        .map(|db| db.into_transaction_log())
        .unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_save_does_not_insert_after_connection_failure() {
    let user: User = user_model("admin@admin.com").into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors(vec![DbErr::Conn(RuntimeErr::Internal(
            "connection reset".to_owned(),
        ))])
        .into_connection();
    let repo = PostgresUserRepository::new(db);

    let err = repo.save(user).await.unwrap_err();
    assert!(matches!(err, blog_core::RepoError::Connection(_)));
}

#[tokio::test]
async fn test_recent_with_authors_maps_joined_rows() {
    let admin = user_model("admin@admin.com");
    let mut tester = user_model("test@user.com");
    tester.first_name = "test".to_owned();
    tester.last_name = "user".to_owned();

    let newer = post_model(tester.id, "Newer", 1);
    let older = post_model(admin.id, "Older", 10);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![(newer, tester), (older, admin)]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let listing = repo.find_recent_with_authors().await.unwrap();
    let rows: Vec<(&str, &str)> = listing
        .iter()
        .map(|entry| (entry.post.title.as_str(), entry.author.as_str()))
        .collect();
    assert_eq!(rows, [("Newer", "test user"), ("Older", "admin admin")]);
}

#[tokio::test]
async fn test_repositories_share_one_pool() {
    let model = user_model("admin@admin.com");
    let owner = model.id;

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection(),
    );
    let users = PostgresUserRepository::shared(db.clone());
    let posts = PostgresPostRepository::shared(db);

    let found = users.find_by_email("admin@admin.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(owner));
    assert_eq!(posts.delete_by_user_id(owner).await.unwrap(), 3);
}

#[test]
fn test_map_db_err() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotFound("users".to_owned())),
        blog_core::RepoError::NotFound
    ));
    assert!(matches!(
        map_db_err(DbErr::Conn(RuntimeErr::Internal("down".to_owned()))),
        blog_core::RepoError::Connection(_)
    ));
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".to_owned())),
        blog_core::RepoError::Query(_)
    ));
}
