mod common;

use anyhow::Result;
use click_service::{ClickRepository, ClickStore};
use shared::{ServiceError, SessionId};
use sqlx::PgPool;

fn session(name: &str) -> SessionId {
    SessionId::new(name).expect("valid session id")
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_increment_creates_and_adds(pool: PgPool) -> Result<()> {
    let repo = ClickRepository::new(pool);
    let key = session("pg_sess");

    let first = repo.increment(&key, 1).await?;
    assert_eq!(first.count(), 1);

    let second = repo.increment(&key, 1).await?;
    assert_eq!(second.count(), 2);
    assert_eq!(second.id(), first.id());

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_increments(pool: PgPool) -> Result<()> {
    let repo = ClickRepository::new(pool);
    let key = session("pg_concurrent");

    let futures: Vec<_> = (0..50).map(|_| repo.increment(&key, 1)).collect();
    for result in futures::future::join_all(futures).await {
        result?;
    }

    let stored = repo.find_by_session(&key).await?.expect("session exists");
    assert_eq!(stored.count(), 50);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_find_missing_session(pool: PgPool) -> Result<()> {
    let repo = ClickRepository::new(pool);
    assert!(repo.find_by_session(&session("nobody")).await?.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_set_count_and_sum(pool: PgPool) -> Result<()> {
    let repo = ClickRepository::new(pool);

    repo.set_count(&session("a"), 7).await?;
    repo.increment(&session("b"), 1).await?;
    repo.increment(&session("b"), 1).await?;

    assert_eq!(repo.sum_counts().await?, 9);
    assert_eq!(repo.scan_all().await?.len(), 2);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_negative_result_hits_check_constraint(pool: PgPool) -> Result<()> {
    let repo = ClickRepository::new(pool);
    let key = session("guarded");

    repo.increment(&key, 1).await?;
    let result = repo.increment(&key, -5).await;
    assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));

    Ok(())
}
