use std::net::Ipv4Addr;
use std::path::Path;

use tracing::warn;

use super::ConfigError;
use crate::updater::AddressPool;

/// Trimmed, non-blank lines that are not `#` comments.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn read_lines(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lines(&content))
}

/// Hostnames to manage, one per line.
pub fn load_target_set(path: &Path) -> Result<Vec<String>, ConfigError> {
    let targets = read_lines(path)?;
    if targets.is_empty() {
        warn!("No hostnames found in {}", path.display());
    }
    Ok(targets)
}

/// Candidate addresses, one per line. The provider is the only validator,
/// so malformed entries are kept and only reported.
pub fn load_address_pool(path: &Path) -> Result<AddressPool, ConfigError> {
    let addresses = read_lines(path)?;

    for address in &addresses {
        if address.parse::<Ipv4Addr>().is_err() {
            warn!("{} is not an IPv4 address, the provider may reject it", address);
        }
    }

    AddressPool::new(addresses).ok_or_else(|| ConfigError::EmptyAddressPool(path.to_path_buf()))
}
