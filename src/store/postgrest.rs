// src/store/postgrest.rs
//! `RankingStore` over a PostgREST endpoint (Supabase `rest/v1`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::RankingStore;
use crate::error::StoreError;
use crate::types::RankingRecord;

#[derive(Debug, Deserialize)]
struct EventIdRow {
    event_id: String,
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
    timeout: Option<Duration>,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: &str, api_key: String, table: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key);
        match self.timeout {
            Some(t) => req.timeout(t),
            None => req,
        }
    }

    async fn check(resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), resp.text().await));
        }
        Ok(resp)
    }
}

/// Error for a non-2xx reply. An unreadable body keeps the read error as the message.
fn api_error(status: u16, body: reqwest::Result<String>) -> StoreError {
    StoreError::Api {
        status,
        message: body.unwrap_or_else(|e| e.to_string()),
    }
}

/// PostgREST filter selecting rows of any other event.
pub fn not_event_filter(event_id: &str) -> String {
    format!("neq.{event_id}")
}

#[async_trait]
impl RankingStore for PostgrestStore {
    async fn first_event_id(&self) -> Result<Option<String>, StoreError> {
        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "event_id"), ("limit", "1")])
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let rows: Vec<EventIdRow> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().next().map(|r| r.event_id))
    }

    async fn delete_other_events(&self, keep_event_id: &str) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.delete(self.table_url()))
            .query(&[("event_id", not_event_filter(keep_event_id))])
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn insert_many(&self, rows: &[RankingRecord]) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::debug!(rows = rows.len(), table = %self.table, "postgrest insert ok");
        Ok(())
    }
}
