use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repo_types::ThoughtRow;

/// Thought store. `create` expects an already validated, trimmed message.
#[async_trait]
pub trait ThoughtStore: Send + Sync {
    /// Newest first; `limit: None` means no limit.
    async fn list(&self, limit: Option<i64>, offset: i64) -> anyhow::Result<Vec<ThoughtRow>>;
    async fn create(&self, message: &str) -> anyhow::Result<ThoughtRow>;
    /// Adds one heart; `None` when the id is unknown.
    async fn like(&self, id: Uuid) -> anyhow::Result<Option<ThoughtRow>>;
}

#[derive(Clone)]
pub struct PgThoughtStore {
    db: PgPool,
}

impl PgThoughtStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ThoughtStore for PgThoughtStore {
    async fn list(&self, limit: Option<i64>, offset: i64) -> anyhow::Result<Vec<ThoughtRow>> {
        // LIMIT NULL is LIMIT ALL in Postgres
        let rows = sqlx::query_as::<_, ThoughtRow>(
            r#"
            SELECT id, message, hearts, created_at
            FROM thoughts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list thoughts")?;
        Ok(rows)
    }

    async fn create(&self, message: &str) -> anyhow::Result<ThoughtRow> {
        let row = sqlx::query_as::<_, ThoughtRow>(
            r#"
            INSERT INTO thoughts (message)
            VALUES ($1)
            RETURNING id, message, hearts, created_at
            "#,
        )
        .bind(message)
        .fetch_one(&self.db)
        .await
        .context("insert thought")?;
        Ok(row)
    }

    async fn like(&self, id: Uuid) -> anyhow::Result<Option<ThoughtRow>> {
        let row = sqlx::query_as::<_, ThoughtRow>(
            r#"
            UPDATE thoughts
               SET hearts = hearts + 1
             WHERE id = $1
            RETURNING id, message, hearts, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("like thought")?;
        Ok(row)
    }
}

/// Rows kept oldest first, the order they were created in.
#[derive(Default)]
pub struct MemoryThoughtStore {
    rows: Mutex<Vec<ThoughtRow>>,
}

impl MemoryThoughtStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThoughtStore for MemoryThoughtStore {
    async fn list(&self, limit: Option<i64>, offset: i64) -> anyhow::Result<Vec<ThoughtRow>> {
        let rows = self.rows.lock().await;
        let take = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(rows
            .iter()
            .rev()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(take)
            .cloned()
            .collect())
    }

    async fn create(&self, message: &str) -> anyhow::Result<ThoughtRow> {
        let row = ThoughtRow {
            id: Uuid::new_v4(),
            message: message.to_string(),
            hearts: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.lock().await.push(row.clone());
        Ok(row)
    }

    async fn like(&self, id: Uuid) -> anyhow::Result<Option<ThoughtRow>> {
        let mut rows = self.rows.lock().await;
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            r.hearts = r.hearts.saturating_add(1);
            r.clone()
        }))
    }
}
