// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event id used when the top feed carries no usable `id`.
pub const UNKNOWN_EVENT: &str = "unknown_event";

/// One `{rank, score}` pair as served by either ranking feed.
/// Extra per-player fields upstream (name, user id, ...) are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankEntry {
    pub rank: u32,
    pub score: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopFeed {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub top_100_player_rankings: Vec<RankEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BorderFeed {
    pub border_player_rankings: Vec<RankEntry>,
}

/// Row of the `event_rankings` table. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankingRecord {
    pub rank: u32,
    pub score: u64,
    pub event_id: String,
    #[serde(rename = "created_at")]
    pub captured_at: DateTime<Utc>,
}

impl RankingRecord {
    pub fn stamp(entry: RankEntry, event_id: &str, captured_at: DateTime<Utc>) -> Self {
        Self {
            rank: entry.rank,
            score: entry.score,
            event_id: event_id.to_string(),
            captured_at,
        }
    }
}

/// Result of one successful fetch of both feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRankings {
    pub event_id: String,
    pub top: Vec<RankEntry>,
    pub border: Vec<RankEntry>,
}

/// Event id of the top feed. Upstream has served it both as a string and as a
/// number, so numbers are rendered in decimal. Zero, blank and non-scalar ids
/// count as missing.
pub fn event_id_from(raw: Option<&serde_json::Value>) -> Option<String> {
    match raw? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_id_accepts_strings_and_numbers() {
        assert_eq!(event_id_from(Some(&json!("evt42"))).as_deref(), Some("evt42"));
        assert_eq!(event_id_from(Some(&json!(137))).as_deref(), Some("137"));
    }

    #[test]
    fn event_id_rejects_blank_null_and_other_shapes() {
        assert_eq!(event_id_from(None), None);
        assert_eq!(event_id_from(Some(&json!(null))), None);
        assert_eq!(event_id_from(Some(&json!("  "))), None);
        assert_eq!(event_id_from(Some(&json!({"id": 1}))), None);
        assert_eq!(event_id_from(Some(&json!(false))), None);
    }

    #[test]
    fn zero_id_counts_as_missing() {
        assert_eq!(event_id_from(Some(&json!(0))), None);
        assert_eq!(event_id_from(Some(&json!(0.0))), None);
        assert_eq!(event_id_from(Some(&json!(10))).as_deref(), Some("10"));
    }

    #[test]
    fn record_serializes_with_store_column_names() {
        let at = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let rec = RankingRecord::stamp(RankEntry { rank: 1, score: 500_000 }, "evt42", at);
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["event_id"], "evt42");
        assert_eq!(v["created_at"], "2025-01-02T03:04:05Z");
        assert!(v.get("captured_at").is_none());
    }

    #[test]
    fn top_feed_ignores_extra_player_fields() {
        let body = r#"{"id":"e1","top_100_player_rankings":[{"rank":1,"score":9,"name":"a"}]}"#;
        let feed: TopFeed = serde_json::from_str(body).unwrap();
        assert_eq!(feed.top_100_player_rankings, vec![RankEntry { rank: 1, score: 9 }]);
    }
}
