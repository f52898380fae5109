//! Generic JSON-over-HTTP source.
//!
//! The feed is addressed with query parameters (`season`, plus one of `week`,
//! `round` or `game`) and answers with either a JSON array of records or an
//! object holding them under `records`.

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{FetchRequest, FetchScope, SourceAdapter, SourceError};
use crate::Result;

pub const USER_AGENT: &str = concat!("nfl-collect/", env!("CARGO_PKG_VERSION"));

pub struct HttpJsonSource<R> {
    name: String,
    base_url: String,
    client: Client,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpJsonSource<R> {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            client,
            _record: PhantomData,
        })
    }

    fn query(request: &FetchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("season", request.season.to_string())];
        match &request.scope {
            FetchScope::Season => {}
            FetchScope::Week(week) => params.push(("week", week.to_string())),
            FetchScope::Round(category) => params.push(("round", category.to_string())),
            FetchScope::Game(uid) => params.push(("game", uid.to_string())),
        }
        params
    }
}

impl<R: DeserializeOwned> SourceAdapter for HttpJsonSource<R> {
    type Record = R;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, request: &FetchRequest) -> std::result::Result<Vec<R>, SourceError> {
        let res = self
            .client
            .get(&self.base_url)
            .query(&Self::query(request))
            .send()
            .await
            .map_err(|e| SourceError::transient(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = res
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(SourceError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(SourceError::transient(format!("HTTP {}", status.as_u16())));
        }

        let body = res
            .json::<Value>()
            .await
            .map_err(|e| SourceError::transient(format!("invalid response body: {}", e)))?;

        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("records") {
                Some(Value::Array(items)) => items,
                _ => return Err(SourceError::transient("response has no records array")),
            },
            _ => return Err(SourceError::transient("response is not a record list")),
        };

        let total = items.len();
        let records: Vec<R> = items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(source = %self.name, index = i, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect();

        debug!(
            source = %self.name,
            scope = %request.scope,
            total,
            decoded = records.len(),
            "fetched records"
        );
        Ok(records)
    }
}
