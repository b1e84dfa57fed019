// src/fetch.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;

use crate::error::{Feed, FetchError};
use crate::types::{event_id_from, BorderFeed, FetchedRankings, TopFeed, UNKNOWN_EVENT};

/// Upstream live-ranking API.
#[async_trait]
pub trait RankingFeed: Send + Sync {
    async fn fetch_top(&self) -> Result<TopFeed, FetchError>;
    async fn fetch_border(&self) -> Result<BorderFeed, FetchError>;
}

pub fn parse_top(body: &str) -> Result<TopFeed, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        feed: Feed::Top,
        message: e.to_string(),
    })
}

pub fn parse_border(body: &str) -> Result<BorderFeed, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        feed: Feed::Border,
        message: e.to_string(),
    })
}

#[derive(Clone)]
pub struct HttpRankingFeed {
    client: Client,
    top_url: String,
    border_url: String,
    timeout: Option<Duration>,
}

impl HttpRankingFeed {
    pub fn new(client: Client, top_url: impl Into<String>, border_url: impl Into<String>) -> Self {
        Self {
            client,
            top_url: top_url.into(),
            border_url: border_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    async fn get_body(&self, feed: Feed, url: &str) -> Result<String, FetchError> {
        let mut req = self.client.get(url);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }
        let transport = |e: reqwest::Error| FetchError::Transport {
            feed,
            message: e.to_string(),
        };

        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                feed,
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(transport)
    }
}

#[async_trait]
impl RankingFeed for HttpRankingFeed {
    async fn fetch_top(&self) -> Result<TopFeed, FetchError> {
        let body = self.get_body(Feed::Top, &self.top_url).await?;
        parse_top(&body)
    }

    async fn fetch_border(&self) -> Result<BorderFeed, FetchError> {
        let body = self.get_body(Feed::Border, &self.border_url).await?;
        parse_border(&body)
    }
}

/// Fetches both feeds concurrently and yields `(event id, top, border)`.
/// Either feed failing fails the whole fetch; nothing partial is returned.
#[derive(Clone)]
pub struct RankingFetcher {
    feed: Arc<dyn RankingFeed>,
}

impl RankingFetcher {
    pub fn new(feed: Arc<dyn RankingFeed>) -> Self {
        Self { feed }
    }

    pub async fn fetch(&self) -> Result<FetchedRankings, FetchError> {
        let t0 = std::time::Instant::now();
        let (top, border) = tokio::try_join!(self.feed.fetch_top(), self.feed.fetch_border())?;
        histogram!("collector_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let event_id = match event_id_from(top.id.as_ref()) {
            Some(id) => id,
            None => {
                tracing::warn!(fallback = UNKNOWN_EVENT, "top feed carried no event id");
                UNKNOWN_EVENT.to_string()
            }
        };

        Ok(FetchedRankings {
            event_id,
            top: top.top_100_player_rankings,
            border: border.border_player_rankings,
        })
    }
}

// --- Test helper ---
/// Serves fixed JSON bodies through the same parsers as the HTTP feed.
/// A `None` body stands for a transport failure on that feed.
pub struct StaticFeed {
    pub top: Option<String>,
    pub border: Option<String>,
}

impl StaticFeed {
    pub fn new(top: impl Into<String>, border: impl Into<String>) -> Self {
        Self {
            top: Some(top.into()),
            border: Some(border.into()),
        }
    }

    pub fn failing_border(top: impl Into<String>) -> Self {
        Self {
            top: Some(top.into()),
            border: None,
        }
    }

    fn body(feed: Feed, body: &Option<String>) -> Result<&str, FetchError> {
        body.as_deref().ok_or_else(|| FetchError::Transport {
            feed,
            message: "connection refused".to_string(),
        })
    }
}

#[async_trait]
impl RankingFeed for StaticFeed {
    async fn fetch_top(&self) -> Result<TopFeed, FetchError> {
        parse_top(Self::body(Feed::Top, &self.top)?)
    }

    async fn fetch_border(&self) -> Result<BorderFeed, FetchError> {
        parse_border(Self::body(Feed::Border, &self.border)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankEntry;

    #[tokio::test]
    async fn fetch_extracts_id_and_both_lists() {
        let feed = StaticFeed::new(
            r#"{"id":"evt42","top_100_player_rankings":[{"rank":1,"score":500000}]}"#,
            r#"{"border_player_rankings":[{"rank":200,"score":9000}]}"#,
        );
        let out = RankingFetcher::new(Arc::new(feed)).fetch().await.unwrap();
        assert_eq!(out.event_id, "evt42");
        assert_eq!(out.top, vec![RankEntry { rank: 1, score: 500_000 }]);
        assert_eq!(out.border, vec![RankEntry { rank: 200, score: 9000 }]);
    }

    #[tokio::test]
    async fn missing_id_falls_back_to_sentinel() {
        let feed = StaticFeed::new(
            r#"{"top_100_player_rankings":[]}"#,
            r#"{"border_player_rankings":[]}"#,
        );
        let out = RankingFetcher::new(Arc::new(feed)).fetch().await.unwrap();
        assert_eq!(out.event_id, UNKNOWN_EVENT);
    }

    #[tokio::test]
    async fn malformed_border_is_a_parse_error() {
        let feed = StaticFeed::new(
            r#"{"id":"e","top_100_player_rankings":[]}"#,
            r#"{"unexpected":true}"#,
        );
        let err = RankingFetcher::new(Arc::new(feed)).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { feed: Feed::Border, .. }));
    }

    #[tokio::test]
    async fn border_transport_failure_fails_the_fetch() {
        let feed = StaticFeed::failing_border(r#"{"id":"e","top_100_player_rankings":[]}"#);
        let err = RankingFetcher::new(Arc::new(feed)).fetch().await.unwrap_err();
        assert_eq!(err.feed(), Feed::Border);
    }
}
