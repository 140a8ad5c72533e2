use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
    pub zone_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// An existing record as listed by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: Option<String>,
}

/// Body of a record overwrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub proxied: bool,
}

impl RecordUpdate {
    /// Proxied A record pointing `name` at `address`.
    pub fn proxied_a(name: &str, address: &str) -> Self {
        Self {
            record_type: "A".to_string(),
            name: name.to_string(),
            content: address.to_string(),
            proxied: true,
        }
    }
}

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record in the configured zone
    async fn list_records(&self) -> Result<Vec<DnsRecord>>;

    /// Overwrite the record identified by `record_id`
    async fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<()>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
