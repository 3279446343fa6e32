use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::types::{NewThanks, ThankRecord};

/// Length of the trailing window the weekly counts are taken over.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Storage seam used by the mention pipeline and the listing page.
#[async_trait]
pub trait ThanksRepository: Send + Sync {
    /// Append one row per recipient and return every row created in the
    /// trailing week, the new rows included.
    async fn record_and_read_window(
        &self,
        thanks: NewThanks,
    ) -> Result<Vec<ThankRecord>, sqlx::Error>;

    /// Every stored row, newest first.
    async fn list_all(&self) -> Result<Vec<ThankRecord>, sqlx::Error>;
}

/// Postgres-backed `thanks` table.
#[derive(Clone)]
pub struct ThanksStore {
    pool: PgPool,
}

impl ThanksStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl ThanksRepository for ThanksStore {
    async fn record_and_read_window(
        &self,
        thanks: NewThanks,
    ) -> Result<Vec<ThankRecord>, sqlx::Error> {
        let (recipients, managers): (Vec<String>, Vec<String>) = thanks
            .recipients
            .into_iter()
            .map(|r| (r.id, r.manager))
            .unzip();

        // The outer scan runs on the statement's snapshot and cannot see the
        // CTE's rows, so the new rows are unioned in explicitly.
        let rows = sqlx::query_as::<_, ThankRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO thanks (create_date, permalink_url, recipient, manager, sender, message)
                SELECT now(), $1, r.recipient, r.manager, $2, $3
                FROM UNNEST($4::text[], $5::text[]) AS r(recipient, manager)
                RETURNING create_date, permalink_url, recipient, manager, sender, message
            )
            SELECT create_date, permalink_url, recipient, manager, sender, message
            FROM thanks
            WHERE create_date > now() - make_interval(days => $6::int)
            UNION ALL
            SELECT create_date, permalink_url, recipient, manager, sender, message
            FROM inserted
            "#,
        )
        .bind(&thanks.permalink_url)
        .bind(&thanks.sender)
        .bind(&thanks.message)
        .bind(&recipients)
        .bind(&managers)
        .bind(WEEKLY_WINDOW_DAYS)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            inserted = recipients.len(),
            window = rows.len(),
            "Recorded thanks"
        );
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<ThankRecord>, sqlx::Error> {
        sqlx::query_as::<_, ThankRecord>(
            r#"
            SELECT create_date, permalink_url, recipient, manager, sender, message
            FROM thanks
            ORDER BY create_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for ThankRecord
// ---------------------------------------------------------------------------

impl<'r> sqlx::FromRow<'r, PgRow> for ThankRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        // Tables that predate the NOT NULL constraints may hold NULL text.
        let text = |column: &str| -> Result<String, sqlx::Error> {
            Ok(row
                .try_get::<Option<String>, _>(column)?
                .unwrap_or_default())
        };

        Ok(ThankRecord {
            create_date: row.try_get("create_date")?,
            permalink_url: text("permalink_url")?,
            recipient: text("recipient")?,
            manager: text("manager")?,
            sender: text("sender")?,
            message: text("message")?,
        })
    }
}
