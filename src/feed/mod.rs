//! Client side of the thoughts feed.
//!
//! [`Feed`] keeps the newest-first list a reader is looking at plus the
//! draft being typed, and reconciles both with whatever [`ThoughtSource`]
//! was chosen at startup. The server is the authority on heart counts;
//! a freshly posted thought goes to the head of the list as soon as the
//! source acknowledges it, without refetching.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::{FeedBackend, FeedConfig},
    thoughts::Thought,
    validation::{validate_message, ValidationError},
};

pub mod local;
pub mod remote;
pub mod source;

pub use local::LocalThoughts;
pub use remote::RemoteThoughts;
pub use source::{SourceError, ThoughtSource};

pub const GENERIC_ERROR: &str = "Something went wrong. Please try again!";
pub const TRANSPORT_ERROR: &str =
    "Network error: Unable to connect to the server. Please check your internet connection.";

/// Errors worth showing to the person using the feed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Nothing came back; the caller may simply try again.
    #[error("{}", TRANSPORT_ERROR)]
    Transport,

    /// Anything else, already phrased for display.
    #[error("{0}")]
    Server(String),
}

impl From<SourceError> for FeedError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Transport(_) => FeedError::Transport,
            SourceError::Invalid(v) => FeedError::Validation(v),
            SourceError::Rejected {
                message: Some(message),
                ..
            } => FeedError::Server(message),
            SourceError::Rejected { message: None, .. }
            | SourceError::NotFound(_)
            | SourceError::Data(_) => FeedError::Server(GENERIC_ERROR.to_string()),
        }
    }
}

impl FeedError {
    /// Like `From<SourceError>`, but a rejected post is read as a
    /// validation failure when its message names one. Only submissions
    /// get this treatment; a rejected load is never a form error.
    fn from_submit(e: SourceError) -> Self {
        match FeedError::from(e) {
            FeedError::Server(message) => ValidationError::from_server_message(&message)
                .map_or(FeedError::Server(message), FeedError::Validation),
            other => other,
        }
    }
}

/// Builds the source named in the config.
pub async fn connect(config: &FeedConfig) -> anyhow::Result<Arc<dyn ThoughtSource>> {
    let source: Arc<dyn ThoughtSource> = match &config.backend {
        FeedBackend::Remote { api_url } => Arc::new(RemoteThoughts::new(api_url.as_str())?),
        FeedBackend::Local { data_dir, seed } => {
            Arc::new(LocalThoughts::open(data_dir, *seed).await?)
        }
    };
    Ok(source)
}

pub struct Feed {
    source: Arc<dyn ThoughtSource>,
    thoughts: Vec<Thought>,
    draft: String,
}

impl Feed {
    pub fn new(source: Arc<dyn ThoughtSource>) -> Self {
        Self {
            source,
            thoughts: Vec::new(),
            draft: String::new(),
        }
    }

    /// Newest first.
    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Replaces the in-memory list with the source's current feed.
    /// On failure the previous list is kept.
    pub async fn load_feed(&mut self) -> Result<&[Thought], FeedError> {
        match self.source.load().await {
            Ok(thoughts) => {
                debug!(count = thoughts.len(), "feed loaded");
                self.thoughts = thoughts;
                Ok(&self.thoughts)
            }
            Err(e) => {
                warn!(error = %e, "feed load failed");
                Err(e.into())
            }
        }
    }

    /// Validates locally, posts, then puts the stored thought at the head
    /// of the list and clears the draft. Nothing is sent when validation
    /// fails.
    pub async fn submit_thought(&mut self, message: &str) -> Result<Thought, FeedError> {
        let message = validate_message(message)?;
        let thought = self.source.submit(message).await.map_err(|e| {
            warn!(error = %e, "submit failed");
            FeedError::from_submit(e)
        })?;
        self.thoughts.insert(0, thought.clone());
        self.draft.clear();
        Ok(thought)
    }

    /// Submits whatever is in the draft buffer.
    pub async fn submit_draft(&mut self) -> Result<Thought, FeedError> {
        let draft = std::mem::take(&mut self.draft);
        let res = self.submit_thought(&draft).await;
        if res.is_err() {
            self.draft = draft;
        }
        res
    }

    /// Adds a heart. Failures are logged and otherwise ignored so reading
    /// is never interrupted; `None` means nothing changed.
    pub async fn like_thought(&mut self, id: &str) -> Option<Thought> {
        match self.source.like(id).await {
            Ok(updated) => {
                if let Some(slot) = self.thoughts.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated.clone();
                }
                Some(updated)
            }
            Err(e) => {
                warn!(error = %e, thought_id = %id, "like failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use tokio::sync::Mutex;

    use super::*;

    /// In-memory source that counts calls and can be told to fail.
    #[derive(Default)]
    struct ScriptedSource {
        stored: Mutex<Vec<Thought>>,
        submits: AtomicUsize,
        reject_with: Option<Option<String>>,
        load_rejection: Option<String>,
        offline: bool,
    }

    fn thought(id: &str, message: &str, hearts: u32) -> Thought {
        Thought {
            id: id.into(),
            message: message.into(),
            hearts,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[async_trait]
    impl ThoughtSource for ScriptedSource {
        async fn load(&self) -> Result<Vec<Thought>, SourceError> {
            if self.offline {
                return Err(SourceError::Data(anyhow::anyhow!("offline")));
            }
            if let Some(message) = &self.load_rejection {
                return Err(SourceError::Rejected {
                    status: 401,
                    message: Some(message.clone()),
                });
            }
            let mut all = self.stored.lock().await.clone();
            all.reverse();
            Ok(all)
        }

        async fn submit(&self, message: &str) -> Result<Thought, SourceError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.reject_with {
                return Err(SourceError::Rejected {
                    status: 400,
                    message: message.clone(),
                });
            }
            let mut stored = self.stored.lock().await;
            let t = thought(&format!("t{}", stored.len()), message, 0);
            stored.push(t.clone());
            Ok(t)
        }

        async fn like(&self, id: &str) -> Result<Thought, SourceError> {
            let mut stored = self.stored.lock().await;
            let t = stored
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| SourceError::NotFound(id.into()))?;
            t.hearts += 1;
            Ok(t.clone())
        }
    }

    async fn seeded(n: usize) -> (Arc<ScriptedSource>, Feed) {
        let source = Arc::new(ScriptedSource::default());
        {
            let mut stored = source.stored.lock().await;
            for i in 0..n {
                stored.push(thought(&format!("seed{i}"), &format!("seed thought {i}"), 0));
            }
        }
        let mut feed = Feed::new(source.clone());
        feed.load_feed().await.unwrap();
        (source, feed)
    }

    #[tokio::test]
    async fn load_is_newest_first() {
        let (_, feed) = seeded(3).await;
        let ids: Vec<_> = feed.thoughts().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["seed2", "seed1", "seed0"]);
    }

    #[tokio::test]
    async fn submit_prepends_and_keeps_order() {
        let (_, mut feed) = seeded(3).await;
        let before: Vec<_> = feed.thoughts().to_vec();
        feed.set_draft("  walking in the rain  ");

        let t = feed.submit_draft().await.unwrap();
        assert_eq!(t.message, "walking in the rain");
        assert_eq!(t.hearts, 0);
        assert_eq!(feed.thoughts()[0], t);
        assert_eq!(&feed.thoughts()[1..], before.as_slice());
        assert_eq!(feed.draft(), "");
    }

    #[tokio::test]
    async fn validation_short_circuits_before_network() {
        let (source, mut feed) = seeded(0).await;
        assert_eq!(
            feed.submit_thought("").await,
            Err(FeedError::Validation(ValidationError::EmptyMessage))
        );
        assert_eq!(
            feed.submit_thought("hi").await,
            Err(FeedError::Validation(ValidationError::TooShort))
        );
        assert_eq!(
            feed.submit_thought(&"y".repeat(141)).await,
            Err(FeedError::Validation(ValidationError::TooLong))
        );
        assert_eq!(source.submits.load(Ordering::SeqCst), 0);

        assert!(feed.submit_thought("fives").await.is_ok());
        assert!(feed.submit_thought(&"y".repeat(140)).await.is_ok());
        assert_eq!(source.submits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn server_rejection_maps_to_same_categories() {
        let source = Arc::new(ScriptedSource {
            reject_with: Some(Some("Message exceeds the maximum length".into())),
            ..Default::default()
        });
        let mut feed = Feed::new(source);
        feed.set_draft("perfectly fine text");
        assert_eq!(
            feed.submit_draft().await,
            Err(FeedError::Validation(ValidationError::TooLong))
        );
        assert_eq!(feed.draft(), "perfectly fine text");
        assert!(feed.thoughts().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_rejection_falls_back() {
        let source = Arc::new(ScriptedSource {
            reject_with: Some(Some("Rate limited".into())),
            ..Default::default()
        });
        let mut feed = Feed::new(source);
        assert_eq!(
            feed.submit_thought("hello world").await,
            Err(FeedError::Server("Rate limited".into()))
        );

        let source = Arc::new(ScriptedSource {
            reject_with: Some(None),
            ..Default::default()
        });
        let mut feed = Feed::new(source);
        assert_eq!(
            feed.submit_thought("hello world").await,
            Err(FeedError::Server(GENERIC_ERROR.into()))
        );
    }

    #[tokio::test]
    async fn like_replaces_with_server_version() {
        let (_, mut feed) = seeded(2).await;
        let target = feed.thoughts()[1].clone();
        let updated = feed.like_thought(&target.id).await.unwrap();
        assert_eq!(updated.hearts, 1);
        assert_eq!(feed.thoughts()[1].hearts, 1);
        assert_eq!(feed.thoughts()[1].message, target.message);
        assert_eq!(feed.thoughts()[1].created_at, target.created_at);
    }

    #[tokio::test]
    async fn like_failure_is_silent() {
        let (source, mut feed) = seeded(2).await;
        let before = feed.thoughts().to_vec();
        assert!(feed.like_thought("missing").await.is_none());
        assert_eq!(feed.thoughts(), before.as_slice());
        let stored = source.stored.lock().await;
        assert!(stored.iter().all(|t| t.hearts == 0));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_list() {
        let (_, mut feed) = seeded(1).await;
        feed.source = Arc::new(ScriptedSource {
            offline: true,
            ..Default::default()
        });
        assert_eq!(feed.load_feed().await, Err(FeedError::Server(GENERIC_ERROR.into())));
        assert_eq!(feed.thoughts().len(), 1);
    }

    #[test]
    fn source_errors_map_for_display() {
        assert_eq!(
            FeedError::from(SourceError::Invalid(ValidationError::EmptyMessage)),
            FeedError::Validation(ValidationError::EmptyMessage)
        );
        let rejected = || SourceError::Rejected {
            status: 422,
            message: Some("message is required".into()),
        };
        assert_eq!(
            FeedError::from(rejected()),
            FeedError::Server("message is required".into())
        );
        assert_eq!(
            FeedError::from_submit(rejected()),
            FeedError::Validation(ValidationError::EmptyMessage)
        );
        assert_eq!(FeedError::Transport.to_string(), TRANSPORT_ERROR);
    }

    #[tokio::test]
    async fn rejected_load_is_not_a_form_error() {
        for message in ["Authentication required", "Query too long", "Page too short"] {
            let source = Arc::new(ScriptedSource {
                load_rejection: Some(message.into()),
                ..Default::default()
            });
            let mut feed = Feed::new(source);
            assert_eq!(feed.load_feed().await, Err(FeedError::Server(message.into())));
        }
    }

    #[tokio::test]
    async fn connect_builds_local_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig {
            backend: FeedBackend::Local {
                data_dir: dir.path().to_path_buf(),
                seed: true,
            },
        };
        let mut feed = Feed::new(connect(&config).await.unwrap());
        assert_eq!(feed.load_feed().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn remote_feed_end_to_end() {
        use crate::{app::build_app, state::AppState};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::fake())).await.unwrap();
        });

        let config = FeedConfig {
            backend: FeedBackend::Remote {
                api_url: format!("http://{addr}/thoughts"),
            },
        };
        let mut feed = Feed::new(connect(&config).await.unwrap());
        assert!(feed.load_feed().await.unwrap().is_empty());
        let t = feed.submit_thought("remote hello there").await.unwrap();
        assert_eq!(feed.like_thought(&t.id).await.unwrap().hearts, 1);
        assert_eq!(feed.thoughts()[0].hearts, 1);
        assert!(feed.like_thought("not-a-uuid").await.is_none());
    }

    #[tokio::test]
    async fn remote_load_returns_the_whole_feed() {
        use crate::{app::build_app, state::AppState};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::fake())).await.unwrap();
        });

        let source = connect(&FeedConfig {
            backend: FeedBackend::Remote {
                api_url: format!("http://{addr}/thoughts"),
            },
        })
        .await
        .unwrap();
        let mut feed = Feed::new(source);
        for i in 0..25 {
            feed.submit_thought(&format!("thought number {i}")).await.unwrap();
        }
        let before = feed.thoughts().to_vec();

        let loaded = feed.load_feed().await.unwrap();
        assert_eq!(loaded.len(), 25);
        assert_eq!(loaded, before.as_slice());
    }
}
