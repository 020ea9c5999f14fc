//! Deployment against file-backed SQLite databases shared by two pools.

use std::time::Duration;

use oxide_change::prelude::*;
use oxide_deploy::prelude::*;

fn config() -> DeployConfig {
    DeployConfig {
        lock_poll_ms: 10,
        lock_timeout_ms: 10_000,
        ..DeployConfig::default()
    }
}

fn changelog() -> ChangeLog {
    ChangeLog::new(vec![
        ChangeSet::new("1", "ada", "main.json").change(
            CreateTableChange::new("accounts")
                .column(ColumnConfig::new("id").with_type("int").primary_key().auto_increment())
                .column(ColumnConfig::new("owner").with_type("varchar(50)").not_null())
                .column(ColumnConfig::new("active").with_type("boolean")),
        ),
        ChangeSet::new("2", "ada", "main.json").change(
            InsertDataChange::new("accounts")
                .column(ColumnConfig::new("id").with_value(ColumnValue::Integer(100)).auto_increment())
                .column(ColumnConfig::new("owner").with_value(ColumnValue::String("Ada".into())))
                .column(ColumnConfig::new("active").with_value(ColumnValue::Boolean(true))),
        ),
    ])
}

async fn two_targets(ctx: &DeployContext, dir: &tempfile::TempDir) -> (Target, Target) {
    let url = format!("sqlite:{}", dir.path().join("deploy.db").display());
    let a = Target::connect_named(ctx, "a", &url).await.unwrap();
    let b = Target::connect_named(ctx, "b", &url).await.unwrap();
    (a, b)
}

#[tokio::test]
async fn test_concurrent_sessions_apply_once() {
    let ctx = DeployContext::standard(config());
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = two_targets(&ctx, &dir).await;
    let changelog = changelog();

    let session_a = DeploySession::new(&ctx, &a);
    let session_b = DeploySession::new(&ctx, &b);
    let (ra, rb) = tokio::join!(session_a.update(&changelog), session_b.update(&changelog));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    assert_eq!(ra.applied.len() + rb.applied.len(), 2);
    assert_eq!(ra.already_applied.len() + rb.already_applied.len(), 2);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(a.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);

    let history = session_b.history().await.unwrap();
    assert_eq!(
        history.iter().map(|h| h.order_executed).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_lock_blocks_second_pool_until_release() {
    let ctx = DeployContext::standard(config());
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = two_targets(&ctx, &dir).await;

    let holder = LockService::with_session(&ctx, &a, SessionId::new("holder"));
    let waiter = LockService::with_session(&ctx, &b, SessionId::new("waiter"))
        .with_timing(Duration::from_secs(5), Duration::from_millis(10));
    holder.init().await.unwrap();

    let held = holder.acquire().await.unwrap();
    assert!(waiter.try_acquire().await.unwrap().is_none());

    let release = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        holder.release(&held).await.unwrap();
    };
    let (acquired, ()) = tokio::join!(waiter.acquire(), release);
    let acquired = acquired.unwrap();

    assert_eq!(acquired.session().as_str(), "waiter");
    assert_eq!(waiter.status().await.unwrap().holder(), "waiter");
}

#[tokio::test]
async fn test_update_times_out_while_locked() {
    let ctx = DeployContext::standard(DeployConfig {
        lock_timeout_ms: 40,
        lock_poll_ms: 10,
        ..DeployConfig::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = two_targets(&ctx, &dir).await;

    let holder = LockService::with_session(&ctx, &a, SessionId::new("holder"));
    holder.init().await.unwrap();
    let _held = holder.acquire().await.unwrap();

    let err = DeploySession::new(&ctx, &b)
        .update(&changelog())
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::LockTimeout { ref holder, .. } if holder == "holder"));
    assert!(DeploySession::new(&ctx, &b).history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cleanup_after_update() {
    let ctx = DeployContext::standard(config());
    let dir = tempfile::tempdir().unwrap();
    let (a, _) = two_targets(&ctx, &dir).await;
    DeploySession::new(&ctx, &a).update(&changelog()).await.unwrap();

    let ledger = Ledger::for_target(&ctx, &a);
    let locks = LockService::new(&ctx, &a);
    let lock = locks.acquire().await.unwrap();
    let report = Cleanup::new(&a, &ledger)
        .objects([TableRef::new("accounts")])
        .run(&lock)
        .await
        .unwrap();
    assert_eq!(report.dropped.len(), 3);
    assert!(report.absent.is_empty());
    locks.release(&lock).await.unwrap();

    locks.init().await.unwrap();
    let lock = locks.acquire().await.unwrap();
    let again = Cleanup::new(&a, &ledger)
        .objects([TableRef::new("accounts")])
        .run(&lock)
        .await
        .unwrap();
    assert_eq!(again.dropped, vec![r#""oxide_changeloglock""#]);
    assert_eq!(again.absent, vec![r#""accounts""#, r#""oxide_changelog""#]);
}
