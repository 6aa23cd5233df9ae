use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use dto::Thought;
pub use repo::{MemoryThoughtStore, PgThoughtStore, ThoughtStore};

pub fn router() -> Router<AppState> {
    handlers::thought_routes()
}
