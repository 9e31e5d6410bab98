use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use typeahead_protocol::RawRecord;
use typeahead_search::SuggestionProvider;

/// Object keys that wrap the record list in enveloped responses.
const WRAPPER_KEYS: &[&str] = &["companies", "data", "results", "suggestions"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpProviderConfig {
    pub base_url: String,
    pub path: String,
    pub query_param: String,
    pub timeout_ms: u64,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            path: "/api/companies".to_string(),
            query_param: "search".to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl HttpProviderConfig {
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// `path` is appended below any prefix already in `base_url`.
    fn endpoint(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|err| ProviderError::InvalidEndpoint(format!("{}: {err}", self.base_url)))?;
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        base.join(self.path.trim_start_matches('/'))
            .map_err(|err| ProviderError::InvalidEndpoint(format!("{}: {err}", self.path)))
    }
}

/// Company lookups against a REST backend.
pub struct HttpProvider {
    client: Client,
    endpoint: Url,
    query_param: String,
}

impl HttpProvider {
    pub fn new(config: &HttpProviderConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("typeahead/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            query_param: config.query_param.clone(),
        })
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(&self.query_param, query);
        url
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>> {
        let url = self.request_url(query);
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        decode_records(&body)
    }
}

#[async_trait]
impl SuggestionProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn lookup(&self, query: &str) -> typeahead_search::Result<Vec<RawRecord>> {
        self.fetch(query).await.map_err(Into::into)
    }
}

/// Accepts a bare JSON array or an object wrapping one under a known key.
pub fn decode_records(body: &[u8]) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_slice(body)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.remove(*key))
            .ok_or_else(|| {
                ProviderError::Shape(format!(
                    "object without any of {}",
                    WRAPPER_KEYS.join("/")
                ))
            })?,
        other => return Err(ProviderError::Shape(format!("unexpected JSON value {other}"))),
    };
    Ok(serde_json::from_value(list)?)
}
