pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod games;
pub(crate) mod images;
pub(crate) mod news;
pub(crate) mod plays;
pub(crate) mod query;
pub(crate) mod storage;

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{LudothekError, Result};
use crate::rest::query::Query;

/// Shared handle on the hosted service.
///
/// Cheap to clone: the HTTP client and configuration are reference counted.
#[derive(Debug, Clone)]
pub(crate) struct Service {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<Config>,
    pub(crate) access_token: Option<Arc<str>>,
}

impl Service {
    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.url)
    }

    /// A request carrying the API key and the caller's token (or the key
    /// itself when nobody is signed in).
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token
            .as_deref()
            .unwrap_or(self.config.anon_key.as_str());
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    /// Fetch rows from `table`.
    pub(crate) async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>> {
        let url = self.rest_url(table);
        let request = self.request(Method::GET, &url).query(&query.pairs());
        let response = send(&url, request).await?;
        decode(&url, response).await
    }

    /// Fetch rows together with the exact total count of the filter.
    pub(crate) async fn select_counted<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<(Vec<T>, Option<usize>)> {
        let url = self.rest_url(table);
        let request = self
            .request(Method::GET, &url)
            .header("Prefer", "count=exact")
            .query(&query.pairs());
        let response = send(&url, request).await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(parse_content_range);
        let rows = decode(&url, response).await?;
        Ok((rows, total))
    }

    /// Fetch at most one row.
    pub(crate) async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: Query,
    ) -> Result<Option<T>> {
        let rows = self.select(table, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert `body` (one row or an array of rows) and return what was stored.
    pub(crate) async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.rest_url(table);
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(body);
        let response = send(&url, request).await?;
        decode(&url, response).await
    }

    /// Run a write that returns no rows.
    pub(crate) async fn execute<B>(
        &self,
        method: Method,
        table: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.rest_url(table);
        let mut request = self
            .request(method, &url)
            .header("Prefer", "return=minimal")
            .query(&query.pairs());
        if let Some(body) = body {
            request = request.json(body);
        }
        send(&url, request).await?;
        Ok(())
    }

    /// Call a database function.
    pub(crate) async fn rpc<B: Serialize + ?Sized>(&self, function: &str, args: &B) -> Result<()> {
        let url = self.rest_url(&format!("rpc/{function}"));
        let request = self.request(Method::POST, &url).json(args);
        send(&url, request).await?;
        Ok(())
    }
}

/// Send a request and reject non-success statuses.
pub(crate) async fn send(url: &str, request: RequestBuilder) -> Result<Response> {
    debug!(url, "calling service");

    let response = request.send().await.map_err(|e| LudothekError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LudothekError::UnexpectedStatus {
            url: url.to_owned(),
            status,
            body,
        });
    }
    Ok(response)
}

/// Read a JSON body into `T`.
pub(crate) async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let body = response.text().await.map_err(|e| LudothekError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;
    serde_json::from_str(&body).map_err(|e| LudothekError::Decode {
        url: url.to_owned(),
        source: e,
    })
}

/// Total from a `Content-Range` header such as `0-11/57` or `*/0`.
pub(crate) fn parse_content_range(header: &str) -> Option<usize> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-11/57"), Some(57));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-11/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_rest_url() {
        let service = Service {
            http: reqwest::Client::new(),
            config: Arc::new(Config::new("https://example.supabase.co/", "anon")),
            access_token: None,
        };
        assert_eq!(
            service.rest_url("game_images"),
            "https://example.supabase.co/rest/v1/game_images"
        );
    }
}
