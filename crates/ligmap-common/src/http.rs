use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::config::ExtractionConfig;
use crate::error::LigmapError;

/// An HTTP client that only issues requests to an approved set of hosts.
///
/// Built from the extraction endpoint, so a batch can only ever reach the
/// structure repository it was configured for.
#[derive(Debug, Clone)]
pub struct CappedClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl CappedClient {
    /// Client allowed to reach the host of `config.endpoint` only.
    pub fn for_extraction(config: &ExtractionConfig) -> Result<Self, LigmapError> {
        let sample_url = config.url_for("XXXX");
        let host = Url::parse(&sample_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| {
                LigmapError::Config(format!("endpoint has no host: {}", config.endpoint))
            })?;

        let mut builder = ClientBuilder::new();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LigmapError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        let mut allowlist = HashSet::new();
        allowlist.insert(host);
        Ok(Self { client, allowlist })
    }

    /// Exact host match or a subdomain of an allowed host.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, LigmapError> {
        if !self.is_allowed(url) {
            return Err(LigmapError::Fetch(format!(
                "refusing request outside the configured endpoint host: {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}
