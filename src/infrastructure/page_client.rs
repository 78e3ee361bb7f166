// Paginated hosting API client
use crate::infrastructure::error::ApiError;
use crate::infrastructure::link_header::{LinkRelations, parse_link_header};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub type QueryParams = Vec<(String, String)>;

/// Status, body and Link header of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub link: Option<String>,
}

/// Transport boundary for all hosting API I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport against a GitHub-compatible API.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        // Unauthenticated requests are allowed, with a lower rate limit
        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::warn!("no hosting API token configured, sending unauthenticated requests");
        }

        Ok(Self {
            client,
            base_url,
            token,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let transport_error = |e: reqwest::Error| ApiError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        };

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse { status, body, link })
    }
}

/// Decoded body of a single response.
enum Payload {
    /// A JSON object; never paginated.
    Object(Vec<Value>),
    /// A JSON array holding one page of items.
    List(Vec<Value>),
}

impl Payload {
    fn into_items(self) -> Vec<Value> {
        match self {
            Payload::Object(items) | Payload::List(items) => items,
        }
    }
}

/// Issues request sequences that follow `next`/`last` link relations.
#[derive(Clone)]
pub struct PageClient {
    transport: Arc<dyn HttpTransport>,
}

impl PageClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Fetch every page of `path`, or at most `max_pages` pages, and return
    /// the items in server order. Any failed request aborts the whole call.
    pub async fn call_paginated(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        max_pages: Option<u32>,
    ) -> Result<Vec<Value>, ApiError> {
        let (payload, links) = self.fetch(path, query, body).await?;
        let mut items = match payload {
            Payload::Object(items) => return Ok(items),
            Payload::List(items) => items,
        };

        let next_page = links.next_page.unwrap_or(1);
        if next_page <= 1 {
            return Ok(items);
        }

        let mut query = query.to_vec();
        match links.last_page {
            Some(last_page) => {
                let last_page = max_pages.map_or(last_page, |max| last_page.min(max));
                for page in next_page..=last_page {
                    set_page(&mut query, page);
                    let (payload, _) = self.fetch(path, &query, body).await?;
                    items.extend(payload.into_items());
                }
            }
            None => {
                // No `last` relation: walk `next` links until they run out
                let mut next = Some(next_page);
                while let Some(page) = next {
                    if max_pages.is_some_and(|max| page > max) {
                        break;
                    }
                    set_page(&mut query, page);
                    let (payload, links) = self.fetch(path, &query, body).await?;
                    items.extend(payload.into_items());
                    next = links.next_page.filter(|n| *n > page);
                }
            }
        }

        Ok(items)
    }

    /// Like [`PageClient::call_paginated`], decoding each item into `T`.
    pub async fn call_paginated_as<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        max_pages: Option<u32>,
    ) -> Result<Vec<T>, ApiError> {
        self.call_paginated(path, query, body, max_pages)
            .await?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|source| ApiError::Decode {
                    path: path.to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<(Payload, LinkRelations), ApiError> {
        tracing::debug!(path, page = page_param(query).unwrap_or("1"), "requesting page");

        let response = self.transport.get(path, query, body).await?;
        let links = response
            .link
            .as_deref()
            .map(parse_link_header)
            .unwrap_or_default();

        match response.status {
            404 => Err(ApiError::NotFound {
                path: path.to_string(),
            }),
            status if !(200..300).contains(&status) => Err(ApiError::Status {
                path: path.to_string(),
                status,
                body: response.body,
            }),
            200 => {
                let value: Value =
                    serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
                        path: path.to_string(),
                        source,
                    })?;
                Ok((decode_payload(path, value)?, links))
            }
            // 2xx without content
            _ => Ok((Payload::Object(Vec::new()), links)),
        }
    }
}

fn decode_payload(path: &str, value: Value) -> Result<Payload, ApiError> {
    match value {
        Value::Array(items) => Ok(Payload::List(items)),
        Value::Object(map) if map.is_empty() => Ok(Payload::Object(Vec::new())),
        Value::Object(map) => Ok(Payload::Object(vec![Value::Object(map)])),
        other => Err(ApiError::UnexpectedShape {
            path: path.to_string(),
            reason: format!("expected a JSON object or array, got {}", other),
        }),
    }
}

fn page_param(query: &[(String, String)]) -> Option<&str> {
    query
        .iter()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str())
}

fn set_page(query: &mut QueryParams, page: u32) {
    match query.iter_mut().find(|(key, _)| key == "page") {
        Some((_, value)) => *value = page.to_string(),
        None => query.push(("page".to_string(), page.to_string())),
    }
}
