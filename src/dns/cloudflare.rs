use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use super::provider::{Credentials, DnsProvider, DnsRecord, RecordUpdate};

pub struct CloudflareProvider {
    client: Client,
    credentials: Credentials,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Vec<CloudflareRecord>,
}

#[derive(Debug, Deserialize)]
struct CloudflareRecord {
    id: String,
    name: String,
    #[serde(default)]
    content: Option<String>,
}

impl CloudflareProvider {
    /// Build a client against `api_base`. Without `timeout` requests wait
    /// for the provider indefinitely.
    pub fn new(
        credentials: Credentials,
        api_base: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().default_headers(auth_headers(&credentials)?);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records",
            self.api_base, self.credentials.zone_id
        )
    }
}

fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-auth-email"),
        HeaderValue::from_str(&credentials.email).context("Invalid characters in email")?,
    );
    let mut key =
        HeaderValue::from_str(&credentials.api_key).context("Invalid characters in API key")?;
    key.set_sensitive(true);
    headers.insert(HeaderName::from_static("x-auth-key"), key);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(self.records_url())
            .send()
            .await
            .context("Failed to send request to Cloudflare API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Cloudflare API error ({}): {}", status, body));
        }

        let listing: ListResponse = response
            .json()
            .await
            .context("Failed to parse Cloudflare API response")?;

        Ok(listing
            .result
            .into_iter()
            .map(|record| DnsRecord {
                id: record.id,
                name: record.name,
                content: record.content,
            })
            .collect())
    }

    async fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<()> {
        let url = format!("{}/{}", self.records_url(), record_id);

        let response = self
            .client
            .put(&url)
            .json(update)
            .send()
            .await
            .context("Failed to send update request to Cloudflare API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Cloudflare API error ({}): {}", status, body));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
