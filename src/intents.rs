//! Intent dispatch and the three fulfillment handlers.

use anyhow::Result;
use tracing::{error, info};

use crate::fulfillment::{FulfillmentMessage, Parameters, WebhookResponse};
use crate::upstream::UpstreamClient;

/// Most cards we will ever render for one request.
pub const MAX_POSTS: usize = 5;

/// The fixed set of intents this webhook fulfills. Keeping the table as an
/// enum means an unknown display name is an explicit `None` at the edge,
/// not a missed lookup deep in a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GetNumUsers,
    GetNumMessages,
    GetChatroomMessages,
}

impl Intent {
    pub fn from_display_name(name: &str) -> Option<Self> {
        match name {
            "GetNumUsers" => Some(Intent::GetNumUsers),
            "GetNumMessages" => Some(Intent::GetNumMessages),
            "GetChatroomMessages" => Some(Intent::GetChatroomMessages),
            _ => None,
        }
    }
}

/// Runs the handler for an already-matched intent. Upstream failures are
/// absorbed here: the platform always gets a renderable response.
pub async fn handle(intent: Intent, upstream: &UpstreamClient, params: &Parameters) -> WebhookResponse {
    let result = match intent {
        Intent::GetNumUsers => num_users(upstream).await,
        Intent::GetNumMessages => num_messages(upstream, params).await,
        Intent::GetChatroomMessages => chatroom_messages(upstream, params).await,
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            error!("Handler for {:?} failed: {:#}", intent, e);
            WebhookResponse::text(
                "Sorry, I couldn't reach BadgerChat right now. Please try again in a moment.",
            )
        }
    }
}

async fn num_users(upstream: &UpstreamClient) -> Result<WebhookResponse> {
    let users = upstream.num_users().await?;
    Ok(WebhookResponse::text(format!(
        "There are {users} users registered for BadgerChat!"
    )))
}

async fn num_messages(upstream: &UpstreamClient, params: &Parameters) -> Result<WebhookResponse> {
    if params.chatroom_name.is_empty() {
        let messages = upstream.num_messages().await?;
        return Ok(WebhookResponse::text(format!(
            "There are {messages} messages on BadgerChat!"
        )));
    }

    let name = normalize_chatroom_name(&params.chatroom_name);
    let messages = upstream.chatroom_num_messages(&name).await?;
    Ok(WebhookResponse::text(format!(
        "There are {messages} messages in the {name} chatroom!"
    )))
}

async fn chatroom_messages(
    upstream: &UpstreamClient,
    params: &Parameters,
) -> Result<WebhookResponse> {
    if params.chat_room_name.is_empty() {
        return Ok(WebhookResponse::text(
            "Which chatroom would you like to see posts from?",
        ));
    }

    let requested = requested_posts(&params.number_of_posts);
    let name = normalize_chatroom_name(&params.chat_room_name);

    let all_messages = upstream.chatroom_messages(&name).await?;

    // The API already orders most-recent-first; never read past the end.
    let shown = requested.min(all_messages.len());
    if shown == 0 {
        return Ok(WebhookResponse::text(format!(
            "There are no posts in {name} to show yet!"
        )));
    }

    info!("Showing {} of {} posts from {}", shown, all_messages.len(), name);

    let intro = if shown == 1 {
        format!("Here is the most recent post from {name}!")
    } else {
        format!("Here are the {shown} most recent posts from {name}!")
    };

    let mut messages = vec![FulfillmentMessage::text(intro)];
    for message in &all_messages[..shown] {
        messages.push(FulfillmentMessage::card(
            &message.title,
            &message.poster,
            "READ MORE",
            upstream.postback_url(&name, message.id),
        ));
    }

    Ok(WebhookResponse::new(messages))
}

/// How many posts the user asked for. Accepts a JSON number or a numeric
/// string; anything unparseable falls back to 1. Clamped to [0, MAX_POSTS].
fn requested_posts(value: &serde_json::Value) -> usize {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) => (n.max(0.0) as usize).min(MAX_POSTS),
        None => 1,
    }
}

/// Canonical chatroom casing: first character uppercased, remainder
/// lowercased. The upstream API is case-sensitive and only accepts this
/// form.
pub fn normalize_chatroom_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
