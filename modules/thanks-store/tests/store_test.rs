//! Integration tests for ThanksStore.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use sqlx::PgPool;
use thanks_store::{NewThanks, Recipient, ThanksRepository, ThanksStore, WEEKLY_WINDOW_DAYS};
use tokio::sync::{Mutex, MutexGuard};

// Tests share one table and truncate it, so they take turns.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

struct TestDb {
    store: ThanksStore,
    pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

async fn connect() -> Option<(PgPool, MutexGuard<'static, ()>)> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let guard = DB_LOCK.lock().await;
    let pool = PgPool::connect(&url).await.ok()?;
    Some((pool, guard))
}

/// Get a migrated, empty test store, or skip if no test DB is available.
async fn test_db() -> Option<TestDb> {
    let (pool, guard) = connect().await?;
    let store = ThanksStore::new(pool.clone());
    store.migrate().await.ok()?;

    // Clean slate for each test
    sqlx::query("TRUNCATE thanks").execute(&pool).await.ok()?;

    Some(TestDb {
        store,
        pool,
        _guard: guard,
    })
}

fn mention(sender: &str, recipients: &[(&str, &str)]) -> NewThanks {
    NewThanks {
        sender: sender.to_string(),
        message: "obrigado pela ajuda!".to_string(),
        permalink_url: "https://example.com/posts/1".to_string(),
        recipients: recipients
            .iter()
            .map(|(id, manager)| Recipient::new(*id, *manager))
            .collect(),
    }
}

#[tokio::test]
async fn writes_one_row_per_recipient() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    let window = store
        .record_and_read_window(mention("S", &[("r1", "m1"), ("r2", ""), ("r3", "m3")]))
        .await
        .unwrap();

    assert_eq!(window.len(), 3);
    assert!(window.iter().all(|r| r.sender == "S"));

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    let mut recipients: Vec<_> = all.iter().map(|r| r.recipient.as_str()).collect();
    recipients.sort();
    assert_eq!(recipients, vec!["r1", "r2", "r3"]);
}

#[tokio::test]
async fn window_includes_earlier_rows_and_new_rows() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    store
        .record_and_read_window(mention("S", &[("r1", "")]))
        .await
        .unwrap();
    store
        .record_and_read_window(mention("S", &[("r1", "")]))
        .await
        .unwrap();

    let window = store
        .record_and_read_window(mention("S", &[("r1", ""), ("r2", "")]))
        .await
        .unwrap();

    assert_eq!(window.len(), 4);
    assert_eq!(window.iter().filter(|r| r.recipient == "r1").count(), 3);
    assert_eq!(window.iter().filter(|r| r.sender == "S").count(), 4);
}

#[tokio::test]
async fn rows_older_than_a_week_are_outside_the_window() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    store
        .record_and_read_window(mention("S", &[("r1", "")]))
        .await
        .unwrap();
    let window = store
        .record_and_read_window(mention("S", &[("r1", "")]))
        .await
        .unwrap();
    assert_eq!(window.len(), 2);

    // Age every existing row past the window.
    sqlx::query("UPDATE thanks SET create_date = now() - interval '8 days'")
        .execute(&db.pool)
        .await
        .unwrap();

    let window = store
        .record_and_read_window(mention("S", &[("r1", "")]))
        .await
        .unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(store.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn values_are_stored_verbatim() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    let hostile = "'); DROP TABLE thanks; --";
    let thanks = NewThanks {
        sender: "S".into(),
        message: hostile.into(),
        permalink_url: "https://example.com/?a='b'".into(),
        recipients: vec![Recipient::new("r1", "O'Brien")],
    };
    store.record_and_read_window(thanks).await.unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, hostile);
    assert_eq!(all[0].manager, "O'Brien");
    assert_eq!(all[0].permalink_url, "https://example.com/?a='b'");
}

#[tokio::test]
async fn list_all_is_newest_first() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    store
        .record_and_read_window(mention("first", &[("r1", "")]))
        .await
        .unwrap();
    store
        .record_and_read_window(mention("second", &[("r1", "")]))
        .await
        .unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all[0].sender, "second");
    assert_eq!(all[1].sender, "first");
}

#[tokio::test]
async fn window_length_follows_weekly_window_days() {
    let Some(db) = test_db().await else {
        return;
    };
    let store = &db.store;

    store
        .record_and_read_window(mention("S", &[("inside", ""), ("outside", "")]))
        .await
        .unwrap();
    sqlx::query(
        "UPDATE thanks SET create_date = now() - make_interval(days => $1::int, hours => $2::int) \
         WHERE recipient = $3",
    )
    .bind(WEEKLY_WINDOW_DAYS - 1)
    .bind(23_i64)
    .bind("inside")
    .execute(&db.pool)
    .await
    .unwrap();
    sqlx::query(
        "UPDATE thanks SET create_date = now() - make_interval(days => $1::int, hours => 1) \
         WHERE recipient = $2",
    )
    .bind(WEEKLY_WINDOW_DAYS)
    .bind("outside")
    .execute(&db.pool)
    .await
    .unwrap();

    let window = store
        .record_and_read_window(mention("S", &[("new", "")]))
        .await
        .unwrap();
    let mut recipients: Vec<_> = window.iter().map(|r| r.recipient.as_str()).collect();
    recipients.sort();
    assert_eq!(recipients, vec!["inside", "new"]);
}

#[tokio::test]
async fn migrates_a_table_with_plain_timestamps() {
    let Some((pool, _guard)) = connect().await else {
        return;
    };

    // Start over from the schema the first deployments created by hand.
    for statement in [
        "DROP TABLE IF EXISTS thanks",
        "DROP TABLE IF EXISTS _sqlx_migrations",
        "CREATE TABLE thanks (create_date timestamp, permalink_url text, \
         recipient text, manager text, sender text, message text)",
        "INSERT INTO thanks VALUES (now(), 'https://example.com/posts/0', 'r1', NULL, 'S', 'valeu')",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    let store = ThanksStore::new(pool.clone());
    store.migrate().await.unwrap();

    let window = store
        .record_and_read_window(mention("S", &[("r1", "m1")]))
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window.iter().filter(|r| r.recipient == "r1").count(), 2);

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].manager, "m1");
    assert_eq!(all[1].manager, "");
}
