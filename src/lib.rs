//! BadgerChat DialogFlow fulfillment webhook.
//!
//! Receives intent-classification results from DialogFlow, fetches
//! counts and posts from the BadgerChat REST API, and answers with
//! ordered fulfillment messages (text and cards).

pub mod config;
pub mod fulfillment;
pub mod intents;
pub mod server;
pub mod upstream;
