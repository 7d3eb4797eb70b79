//! DialogFlow ES webhook wire types.
//!
//! The incoming body is the platform's webhook request; the outgoing body
//! is an ordered list of fulfillment messages. Order matters: the platform
//! renders messages in sequence, so intro text must precede any cards.

use serde::{Deserialize, Serialize};

// ── Incoming ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub query_result: QueryResult,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    pub intent: IntentInfo,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInfo {
    pub display_name: String,
}

/// Parameters DialogFlow extracted from the user utterance. The agent uses
/// two different spellings for the chatroom parameter depending on the
/// intent, so both are accepted here.
#[derive(Debug, Default, Deserialize)]
pub struct Parameters {
    #[serde(default, rename = "chatroomName")]
    pub chatroom_name: String,
    #[serde(default, rename = "chatRoomName")]
    pub chat_room_name: String,
    /// DialogFlow sends numbers as JSON floats, but free-form agents may
    /// send strings; kept raw and parsed at the handler.
    #[serde(default, rename = "numberOfPosts")]
    pub number_of_posts: serde_json::Value,
}

// ── Outgoing ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_messages: Vec<FulfillmentMessage>,
}

impl WebhookResponse {
    pub fn new(fulfillment_messages: Vec<FulfillmentMessage>) -> Self {
        Self {
            fulfillment_messages,
        }
    }

    /// A response consisting of a single text message.
    pub fn text(message: impl Into<String>) -> Self {
        Self::new(vec![FulfillmentMessage::text(message)])
    }
}

/// One fulfillment message. Untagged so the variant serializes directly as
/// `{"text": {...}}` or `{"card": {...}}`, which is the shape the platform
/// expects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FulfillmentMessage {
    Text { text: TextMessage },
    Card { card: CardMessage },
}

#[derive(Debug, Clone, Serialize)]
pub struct TextMessage {
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardMessage {
    pub title: String,
    pub subtitle: String,
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardButton {
    pub text: String,
    pub postback: String,
}

impl FulfillmentMessage {
    pub fn text(message: impl Into<String>) -> Self {
        FulfillmentMessage::Text {
            text: TextMessage {
                text: vec![message.into()],
            },
        }
    }

    pub fn card(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        button_text: impl Into<String>,
        postback: impl Into<String>,
    ) -> Self {
        FulfillmentMessage::Card {
            card: CardMessage {
                title: title.into(),
                subtitle: subtitle.into(),
                buttons: vec![CardButton {
                    text: button_text.into(),
                    postback: postback.into(),
                }],
            },
        }
    }
}
