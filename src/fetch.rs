// src/fetch.rs

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fetched page body together with the URL it came from.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Issues a single GET per call. One instance per run.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> reqwest::Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua.to_string());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET `raw_url` and return the body. Non-2xx, connect failures and
    /// timeouts all come back as [`Error::Network`].
    pub fn fetch(&self, raw_url: &str) -> Result<Document> {
        let url = parse_url(raw_url)?;
        debug!(%url, "GET");

        let network = |source| Error::Network {
            url: url.to_string(),
            source,
        };
        let body = self
            .client
            .get(url.clone())
            .send()
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .text()
            .map_err(network)?;

        info!(%url, bytes = body.len(), "fetched document");
        Ok(Document::new(url, body))
    }
}

/// Accepts only absolute `http`/`https` URLs with a host.
pub fn parse_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
