use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::source::{SourceError, ThoughtSource};
use crate::thoughts::Thought;

/// Talks to a thoughts HTTP API rooted at `url` (e.g. `http://host/thoughts`).
#[derive(Clone)]
pub struct RemoteThoughts {
    client: Client,
    url: String,
}

impl RemoteThoughts {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Pulls a human message out of the error shapes seen in the wild:
/// `{errors: {message}}`, `{message}`, `{error}`.
fn error_message(body: &Value) -> Option<String> {
    body.pointer("/errors/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

async fn handle_response<T: DeserializeOwned>(res: Response) -> Result<T, SourceError> {
    let status = res.status();
    if !status.is_success() {
        let message = res.json::<Value>().await.ok().and_then(|v| error_message(&v));
        debug!(%status, ?message, "thoughts api rejected request");
        return Err(SourceError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    let body = res
        .json::<T>()
        .await
        .context("decode thoughts api response")?;
    Ok(body)
}

#[async_trait]
impl ThoughtSource for RemoteThoughts {
    async fn load(&self) -> Result<Vec<Thought>, SourceError> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(SourceError::Transport)?;
        handle_response(res).await
    }

    async fn submit(&self, message: &str) -> Result<Thought, SourceError> {
        let res = self
            .client
            .post(&self.url)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(SourceError::Transport)?;
        handle_response(res).await
    }

    async fn like(&self, id: &str) -> Result<Thought, SourceError> {
        let res = self
            .client
            .post(format!("{}/{}/like", self.url, id))
            .send()
            .await
            .map_err(SourceError::Transport)?;
        handle_response(res).await
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::{app::build_app, state::AppState};

    async fn spawn_server() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::fake())).await.unwrap();
        });
        addr
    }

    #[test]
    fn error_message_prefers_nested_errors() {
        let body = json!({"errors": {"message": "too short"}, "message": "outer"});
        assert_eq!(error_message(&body).as_deref(), Some("too short"));
        assert_eq!(error_message(&json!({"message": "m"})).as_deref(), Some("m"));
        assert_eq!(error_message(&json!({"error": "e"})).as_deref(), Some("e"));
        assert_eq!(error_message(&json!({"status": 500})), None);
    }

    #[tokio::test]
    async fn submit_load_like_against_server() {
        let addr = spawn_server().await;
        let source = RemoteThoughts::new(format!("http://{addr}/thoughts/")).unwrap();

        let a = source.submit("first remote thought").await.unwrap();
        let b = source.submit("second remote thought").await.unwrap();
        assert_eq!(a.hearts, 0);

        let feed = source.load().await.unwrap();
        assert_eq!(feed[0].id, b.id);
        assert_eq!(feed[1].id, a.id);

        let liked = source.like(&a.id).await.unwrap();
        assert_eq!(liked.hearts, 1);
        assert_eq!(liked.message, a.message);
    }

    #[tokio::test]
    async fn server_validation_comes_back_as_rejection() {
        let addr = spawn_server().await;
        let source = RemoteThoughts::new(format!("http://{addr}/thoughts")).unwrap();

        let err = source.submit("hi").await.unwrap_err();
        match err {
            SourceError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.unwrap().contains("short"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_port_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = RemoteThoughts::new(format!("http://{addr}/thoughts")).unwrap();
        assert!(matches!(source.load().await, Err(SourceError::Transport(_))));
    }
}
