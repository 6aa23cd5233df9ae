use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use crate::auth::{password::Passwords, MemoryUserStore, PgUserStore, UserStore};
use crate::config::{AppConfig, JwtConfig};
use crate::thoughts::{MemoryThoughtStore, PgThoughtStore, ThoughtStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub thoughts: Arc<dyn ThoughtStore>,
    pub passwords: Passwords,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Postgres-backed stores when a pool is given, in-memory otherwise.
    pub fn init(config: AppConfig, db: Option<PgPool>) -> Self {
        let (users, thoughts) = match db {
            Some(db) => (
                Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>,
                Arc::new(PgThoughtStore::new(db)) as Arc<dyn ThoughtStore>,
            ),
            None => {
                warn!("DATABASE_URL not set; using in-memory stores, data is lost on restart");
                (
                    Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>,
                    Arc::new(MemoryThoughtStore::new()) as Arc<dyn ThoughtStore>,
                )
            }
        };
        Self::from_parts(users, thoughts, Arc::new(config))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        thoughts: Arc<dyn ThoughtStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            thoughts,
            passwords: Passwords::default(),
            config,
        }
    }

    /// In-memory state with a fixed test secret.
    pub fn fake() -> Self {
        let config = AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                ttl_days: 30,
            },
            host: "127.0.0.1".into(),
            port: 0,
        };
        Self::from_parts(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryThoughtStore::new()),
            Arc::new(config),
        )
    }
}
