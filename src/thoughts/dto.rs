use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::ThoughtRow;

/// A posted message as it travels over the wire and into local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    #[serde(alias = "_id")]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub hearts: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ThoughtRow> for Thought {
    fn from(r: ThoughtRow) -> Self {
        Self {
            id: r.id.to_string(),
            message: r.message,
            hearts: u32::try_from(r.hearts).unwrap_or(0),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateThoughtRequest {
    #[serde(default)]
    pub message: String,
}

/// Opt-in paging; without `limit` the whole feed is returned.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

pub const MAX_PAGE: i64 = 100;

impl Pagination {
    pub fn clamped(&self) -> (Option<i64>, i64) {
        (
            self.limit.map(|l| l.clamp(1, MAX_PAGE)),
            self.offset.max(0),
        )
    }
}
