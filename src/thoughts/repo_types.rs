use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ThoughtRow {
    pub id: Uuid,
    pub message: String,
    pub hearts: i32, // CHECK (hearts >= 0) in the schema
    pub created_at: OffsetDateTime,
}
