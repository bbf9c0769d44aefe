use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::debug;

use crate::error::{RelayError, Result};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// File bytes returned by the resolver, with the declared content type.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Turns a shared link into the file it points at.
#[async_trait]
pub trait FileResolver: Send + Sync {
    async fn fetch(&self, link: &str) -> Result<FetchedFile>;
}

/// Append the link as the percent-encoded `url` query parameter of `base`.
/// Spaces become `%20`, not the form-encoded `+`.
pub fn build_resolve_url(base: &str, link: &str) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| RelayError::InvalidUrl(format!("{base}: {e}")))?;
    let param = format!("url={}", urlencoding::encode(link));
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{param}"),
        _ => param,
    };
    url.set_query(Some(&query));
    Ok(url)
}

pub struct HttpResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResolver {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FileResolver for HttpResolver {
    async fn fetch(&self, link: &str) -> Result<FetchedFile> {
        let url = build_resolve_url(&self.base_url, link)?;

        debug!("Resolving link via {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!("Resolver response status: {}", status);
        if !status.is_success() {
            return Err(RelayError::ResolverStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = response.bytes().await?.to_vec();

        Ok(FetchedFile { content_type, data })
    }
}
