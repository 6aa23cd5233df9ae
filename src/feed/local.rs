use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::source::{SourceError, ThoughtSource};
use crate::{thoughts::Thought, validation::validate_message};

/// Well-known key the local feed is persisted under.
pub const STORAGE_KEY: &str = "happy-thoughts-mock-data";

/// Offline stand-in for the thoughts API: one JSON array, oldest first,
/// in `<dir>/happy-thoughts-mock-data.json`.
pub struct LocalThoughts {
    path: PathBuf,
    // serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl LocalThoughts {
    /// Opens the store in `dir`, writing a few sample thoughts first if
    /// `seed` is set and nothing is stored yet.
    pub async fn open(dir: impl AsRef<Path>, seed: bool) -> anyhow::Result<Self> {
        let store = Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
            lock: Mutex::new(()),
        };
        if seed && store.read().await?.is_empty() {
            store.write(&sample_thoughts()).await?;
            info!(path = %store.path.display(), "seeded local thoughts");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drops everything stored.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }

    async fn read(&self) -> anyhow::Result<Vec<Thought>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("read {}", self.path.display())),
        };
        serde_json::from_slice(&raw).with_context(|| format!("parse {}", self.path.display()))
    }

    async fn write(&self, thoughts: &[Thought]) -> anyhow::Result<()> {
        let raw = serde_json::to_vec(thoughts).context("serialize thoughts")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ThoughtSource for LocalThoughts {
    async fn load(&self) -> Result<Vec<Thought>, SourceError> {
        let _guard = self.lock.lock().await;
        let mut thoughts = self.read().await?;
        thoughts.reverse();
        Ok(thoughts)
    }

    async fn submit(&self, message: &str) -> Result<Thought, SourceError> {
        let message = validate_message(message)?;
        let _guard = self.lock.lock().await;
        let mut thoughts = self.read().await?;
        let thought = Thought {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            hearts: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        thoughts.push(thought.clone());
        self.write(&thoughts).await?;
        debug!(thought_id = %thought.id, "local thought stored");
        Ok(thought)
    }

    async fn like(&self, id: &str) -> Result<Thought, SourceError> {
        let _guard = self.lock.lock().await;
        let mut thoughts = self.read().await?;
        let thought = thoughts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        thought.hearts = thought.hearts.saturating_add(1);
        let updated = thought.clone();
        self.write(&thoughts).await?;
        Ok(updated)
    }
}

fn sample_thoughts() -> Vec<Thought> {
    let now = OffsetDateTime::now_utc();
    [
        (
            "Beautiful sunset today. Nature always finds a way to amaze me. 🌅",
            8,
            Duration::days(1),
        ),
        (
            "Had an amazing cup of coffee this morning. The little things that bring joy! ☕",
            5,
            Duration::hours(2),
        ),
        (
            "Just finished a great workout! Feeling energized and ready for the day. 💪",
            3,
            Duration::hours(1),
        ),
    ]
    .into_iter()
    .map(|(message, hearts, age)| Thought {
        id: Uuid::new_v4().to_string(),
        message: message.to_string(),
        hearts,
        created_at: now - age,
    })
    .collect()
}
