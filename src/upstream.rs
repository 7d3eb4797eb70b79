use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::UpstreamConfig;

/// Identifying header required by every BadgerChat API request.
const BID_HEADER: &str = "X-CS571-ID";

/// A single chatroom post as returned by the messages list endpoint.
/// The API returns more fields than we render; serde ignores the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatroomMessage {
    pub id: u64,
    pub title: String,
    pub poster: String,
}

#[derive(Debug, Deserialize)]
struct NumUsersBody {
    users: u64,
}

#[derive(Debug, Deserialize)]
struct NumMessagesBody {
    messages: u64,
}

#[derive(Debug, Deserialize)]
struct MessageListBody {
    messages: Vec<ChatroomMessage>,
}

/// Client for the BadgerChat REST API. One GET per logical operation,
/// no retries; the request timeout bounds how long a handler can stall.
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// URL a "READ MORE" card button should open for a given post.
    pub fn postback_url(&self, chatroom: &str, message_id: u64) -> String {
        format!(
            "{}/chatrooms/{}/messages/{}",
            self.config.postback_base_url, chatroom, message_id
        )
    }

    pub async fn num_users(&self) -> Result<u64> {
        let body: NumUsersBody = self.get_json("/api/numUsers").await?;
        Ok(body.users)
    }

    pub async fn num_messages(&self) -> Result<u64> {
        let body: NumMessagesBody = self.get_json("/api/numMessages").await?;
        Ok(body.messages)
    }

    /// Message count for one chatroom. `chatroom` must already be in the
    /// canonical casing the API expects.
    pub async fn chatroom_num_messages(&self, chatroom: &str) -> Result<u64> {
        let path = format!("/api/chatroom/{chatroom}/numMessages");
        let body: NumMessagesBody = self.get_json(&path).await?;
        Ok(body.messages)
    }

    /// Posts in one chatroom, most recent first (ordering is the API's,
    /// we do not sort locally).
    pub async fn chatroom_messages(&self, chatroom: &str) -> Result<Vec<ChatroomMessage>> {
        let path = format!("/api/chatroom/{chatroom}/messages");
        let body: MessageListBody = self.get_json(&path).await?;
        Ok(body.messages)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);

        debug!("Fetching from BadgerChat API: {}", url);

        let response = self
            .client
            .get(&url)
            .header(BID_HEADER, &self.config.bid)
            .send()
            .await
            .with_context(|| format!("Failed to reach BadgerChat API at {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("BadgerChat API error ({}): {}", status, error_body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse BadgerChat API response from {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            postback_base_url: "https://cs571.org/s23/badgerchat".to_string(),
            bid: "bid_test".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_postback_url_shape() {
        let client = UpstreamClient::new(test_config("http://localhost:1")).unwrap();
        assert_eq!(
            client.postback_url("Wisconsin", 42),
            "https://cs571.org/s23/badgerchat/chatrooms/Wisconsin/messages/42"
        );
    }

    #[test]
    fn test_message_list_ignores_extra_fields() {
        let body: MessageListBody = serde_json::from_str(
            r#"{"messages":[{"id":7,"title":"Hi","poster":"bucky","content":"hello","created":"2023-04-01"}]}"#,
        )
        .unwrap();

        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].id, 7);
        assert_eq!(body.messages[0].title, "Hi");
        assert_eq!(body.messages[0].poster, "bucky");
    }
}
