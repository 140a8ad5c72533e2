use std::collections::HashSet;

use crate::dns::DnsRecord;

/// Hostname to record id, in the order the provider listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordIndex {
    entries: Vec<(String, String)>,
}

impl RecordIndex {
    /// Keep only records whose name is one of `targets`. A name listed twice
    /// keeps its first position and takes the later id.
    pub fn build(records: Vec<DnsRecord>, targets: &[String]) -> Self {
        let wanted: HashSet<&str> = targets.iter().map(String::as_str).collect();
        let mut index = Self::default();

        for record in records {
            if !wanted.contains(record.name.as_str()) {
                continue;
            }
            match index.entries.iter_mut().find(|(name, _)| *name == record.name) {
                Some(entry) => entry.1 = record.id,
                None => index.entries.push((record.name, record.id)),
            }
        }

        index
    }

    pub fn get(&self, hostname: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == hostname)
            .map(|(_, id)| id.as_str())
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.get(hostname).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
