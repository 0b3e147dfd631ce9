use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STANDINGS_UPDATED: &str = "standings-updated";
pub const MATCH_UPDATED: &str = "match-updated";
/// Sent only to clients following that match.
pub const MATCH_LIVE: &str = "match-live";
pub const MATCH_DELETED: &str = "match-deleted";
pub const SUBSCRIBE_MATCH: &str = "subscribe-match";
pub const SUBSCRIBED: &str = "subscribed";
pub const SUBSCRIBE_FAILED: &str = "subscribe-failed";

/// Body of every event pushed to live clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message<T> {
    pub data: T,
    pub sent_at: NaiveDateTime,
}

impl<T> Message<T> {
    pub fn now(data: T) -> Self {
        Message {
            data,
            sent_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRemoved {
    pub id: i32,
}
