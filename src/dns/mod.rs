mod cloudflare;
mod provider;

pub use cloudflare::CloudflareProvider;
pub use provider::{Credentials, DnsProvider, DnsRecord, RecordUpdate};

use anyhow::Result;
use std::sync::Arc;

use crate::config::Settings;

pub fn create_provider(settings: &Settings) -> Result<Arc<dyn DnsProvider>> {
    let credentials = settings.credentials()?;
    let provider = CloudflareProvider::new(
        credentials,
        &settings.cloudflare.api_base,
        settings.request_timeout(),
    )?;
    Ok(Arc::new(provider))
}
