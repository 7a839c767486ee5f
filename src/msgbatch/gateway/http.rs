use super::{BatchGateway, NdjsonResults, ResultStream};
use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::model::{BatchHandle, BatchItem, BatchStatusSnapshot};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Blocking client for the Message Batches endpoints.
pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(config: &BatchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", header_value("x-api-key", &config.api_key)?);
        headers.insert(
            "anthropic-version",
            header_value("anthropic-version", &config.api_version)?,
        );
        headers.insert("anthropic-beta", header_value("anthropic-beta", &config.beta)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| BatchError::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BatchError::Config(format!(
                "Invalid base URL {}: not a hierarchical URL",
                config.base_url
            )));
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// `<base>/messages/batches/<segments...>`. Each segment is percent-encoded,
    /// so a `/`, `?` or `#` inside a batch id stays part of that id.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BatchError::Config(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["messages", "batches"])
            .extend(segments);
        Ok(url)
    }

    fn batches_url(&self) -> Result<Url> {
        self.endpoint(&[])
    }

    fn batch_url(&self, id: &str, action: Option<&str>) -> Result<Url> {
        check_batch_id(id)?;
        let mut segments = vec![id];
        segments.extend(action);
        self.endpoint(&segments)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "batch api response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        warn!(status = status.as_u16(), %body, "batch api request failed");
        Err(BatchError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

// Dot segments would be dropped from the path and retarget the request.
fn check_batch_id(id: &str) -> Result<()> {
    match id.trim() {
        "" | "." | ".." => Err(BatchError::validation(format!("Invalid batch ID '{}'", id))),
        _ => Ok(()),
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| BatchError::Config(format!("Invalid value for header {}", name)))
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| BatchError::MalformedResponse(e.to_string()))
}

#[derive(Serialize)]
struct CreateBatchBody<'a> {
    requests: Vec<WireRequest<'a>>,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    custom_id: &'a str,
    params: WireParams<'a>,
}

#[derive(Serialize)]
struct WireParams<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [WireMessage<'a>; 1],
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a BatchItem> for WireRequest<'a> {
    fn from(item: &'a BatchItem) -> Self {
        Self {
            custom_id: &item.custom_id,
            params: WireParams {
                model: &item.model,
                max_tokens: item.max_tokens,
                messages: [WireMessage {
                    role: "user",
                    content: &item.content,
                }],
            },
        }
    }
}

#[derive(Deserialize)]
struct CreatedBatch {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct BatchList {
    #[serde(default)]
    data: Vec<BatchStatusSnapshot>,
}

impl BatchGateway for HttpGateway {
    fn create_batch(&self, items: &[BatchItem]) -> Result<BatchHandle> {
        let body = CreateBatchBody {
            requests: items.iter().map(WireRequest::from).collect(),
        };
        debug!(count = items.len(), "creating batch");
        let response = self.send(self.http.post(self.batches_url()?).json(&body))?;
        let created: CreatedBatch = decode(response)?;
        match created.id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(BatchHandle {
                id,
                created_at: created.created_at.unwrap_or_else(Utc::now),
            }),
            None => Err(BatchError::MalformedResponse(
                "API response did not contain a batch ID".to_string(),
            )),
        }
    }

    fn get_batch_status(&self, id: &str) -> Result<BatchStatusSnapshot> {
        debug!(id, "fetching batch status");
        let response = self.send(self.http.get(self.batch_url(id, None)?))?;
        decode(response)
    }

    fn get_batch_results(&self, id: &str) -> Result<ResultStream> {
        debug!(id, "streaming batch results");
        let response = self.send(self.http.get(self.batch_url(id, Some("results"))?))?;
        Ok(Box::new(NdjsonResults::new(BufReader::new(response))))
    }

    fn list_batches(&self, limit: u32) -> Result<Vec<BatchStatusSnapshot>> {
        debug!(limit, "listing batches");
        let response = self.send(self.http.get(self.batches_url()?).query(&[("limit", limit)]))?;
        let list: BatchList = decode(response)?;
        Ok(list.data)
    }

    fn cancel_batch(&self, id: &str) -> Result<BatchStatusSnapshot> {
        debug!(id, "canceling batch");
        let response = self.send(self.http.post(self.batch_url(id, Some("cancel"))?))?;
        decode(response)
    }
}
