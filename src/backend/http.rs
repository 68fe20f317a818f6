use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use super::Backend;
use crate::config::ApiConfig;
use crate::model::work_item::{ItemPatch, NewItem, Status, WorkItem};

// Guards against a backend that keeps reporting more pages.
const MAX_PAGES: u32 = 100;

/// REST ticket API (`/tickets`, `/tickets/{id}`, `/tickets/{id}/move`, ...).
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    page_size: u32,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            page_size: config.page_size,
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}/{path}", self.base_url))
            .header("Content-Type", "application/json");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Value> {
        let resp = req.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                anyhow!("Server unreachable: {e}")
            } else {
                anyhow!("Ticket API request failed: {e}")
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("Failed to read ticket API response")?;

        if !status.is_success() {
            bail!(describe_failure(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).context("Failed to parse ticket API response")
    }

    fn item_path(id: &str) -> String {
        format!("tickets/{}", urlencoding::encode(id))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_items(&self) -> Result<Vec<WorkItem>> {
        let mut items = Vec::new();
        let mut page: u32 = 1;
        loop {
            let req = self.request(Method::GET, "tickets").query(&[
                ("page", page.to_string()),
                ("pageSize", self.page_size.to_string()),
            ]);
            let body = self.send(req).await?;
            let list = parse_list_page(body)?;
            tracing::debug!(page, count = list.items.len(), total_pages = ?list.total_pages, "fetched ticket page");
            items.extend(list.items);

            // Without paging metadata the first answer is the whole list.
            let more = list.total_pages.is_some_and(|total| page < total);
            if !more || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    async fn create_item(&self, item: &NewItem) -> Result<WorkItem> {
        let body = self
            .send(self.request(Method::POST, "tickets").json(item))
            .await?;
        unwrap_item(body).context("Unexpected create response")
    }

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<WorkItem> {
        let body = self
            .send(self.request(Method::PUT, &Self::item_path(id)).json(patch))
            .await?;
        unwrap_item(body).context("Unexpected update response")
    }

    async fn delete_item(&self, id: &str) -> Result<bool> {
        let body = self
            .send(self.request(Method::DELETE, &Self::item_path(id)))
            .await?;
        Ok(delete_acknowledged(&body))
    }

    async fn update_status(&self, id: &str, status: Status) -> Result<WorkItem> {
        let path = format!("{}/move", Self::item_path(id));
        let body = self
            .send(
                self.request(Method::PATCH, &path)
                    .json(&serde_json::json!({ "status": status })),
            )
            .await?;
        unwrap_item(body).context("Unexpected move response")
    }

    async fn assign_item(&self, id: &str, assignee: &str) -> Result<WorkItem> {
        let path = format!("{}/assign", Self::item_path(id));
        let body = self
            .send(
                self.request(Method::PATCH, &path)
                    .json(&serde_json::json!({ "assignedTo": assignee })),
            )
            .await?;
        unwrap_item(body).context("Unexpected assign response")
    }
}

#[derive(Debug)]
pub(crate) struct ListPage {
    pub items: Vec<WorkItem>,
    pub total_pages: Option<u32>,
}

/// Single-ticket answers come bare, under `data`, or under `ticket`.
pub(crate) fn unwrap_item(body: Value) -> Result<WorkItem> {
    let inner = match body {
        Value::Object(mut map) => {
            if let Some(data) = map.remove("data").filter(|v| !v.is_null()) {
                data
            } else if let Some(ticket) = map.remove("ticket").filter(|v| !v.is_null()) {
                ticket
            } else {
                Value::Object(map)
            }
        }
        other => other,
    };
    serde_json::from_value(inner).context("Failed to parse ticket")
}

/// List answers come as a bare array, or as `{tickets|items, totalPages, ...}`
/// optionally wrapped in `data`.
pub(crate) fn parse_list_page(body: Value) -> Result<ListPage> {
    let body = match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    match body {
        Value::Array(_) => Ok(ListPage {
            items: serde_json::from_value(body).context("Failed to parse ticket list")?,
            total_pages: None,
        }),
        Value::Object(mut map) => {
            let raw_items = map
                .remove("tickets")
                .or_else(|| map.remove("items"))
                .unwrap_or(Value::Array(Vec::new()));
            let items = serde_json::from_value(raw_items).context("Failed to parse ticket list")?;
            let total_pages = map
                .get("totalPages")
                .and_then(Value::as_u64)
                .or_else(|| {
                    let total = map.get("total").or_else(|| map.get("count"))?.as_u64()?;
                    let size = map.get("pageSize")?.as_u64().filter(|s| *s > 0)?;
                    Some(total.div_ceil(size))
                })
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
            Ok(ListPage { items, total_pages })
        }
        Value::Null => Ok(ListPage {
            items: Vec::new(),
            total_pages: None,
        }),
        other => bail!("Unexpected ticket list shape: {other}"),
    }
}

/// Delete answers are a boolean, `{success}`, or anything else meaning yes.
pub(crate) fn delete_acknowledged(body: &Value) -> bool {
    match body {
        Value::Bool(b) => *b,
        Value::Object(map) => match map.get("success") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Null) | None => true,
            Some(other) => !matches!(other, Value::Number(n) if n.as_i64() == Some(0)),
        },
        _ => true,
    }
}

pub(crate) fn describe_failure(status: u16, body: &str) -> String {
    let server_message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .filter(|m| !m.trim().is_empty());

    let fallback = match status {
        400 => "Bad request",
        401 => "Not authorized, sign in again",
        403 => "Access denied",
        404 => "Ticket not found",
        500 => "Internal server error",
        _ => "Request failed",
    };

    format!(
        "{} ({status})",
        server_message.as_deref().unwrap_or(fallback)
    )
}
