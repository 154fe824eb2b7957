//! Flat records and pages flowing from the source to the sink

use serde::Serialize;
use std::collections::HashMap;

/// One source item flattened to `field title -> value`
///
/// Field order is irrelevant and names are unique. A record lives for exactly
/// one write attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// Set a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of a field by exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Non-empty value of the business identifier field
    ///
    /// Field names are compared after trimming, since source titles sometimes
    /// carry stray whitespace. The value is returned untouched so the lookup
    /// key matches what gets written.
    pub fn business_id(&self, id_field: &str) -> Option<&str> {
        self.get(id_field)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(name, _)| name.trim() == id_field)
                    .map(|(_, value)| value.as_str())
            })
            .filter(|id| !id.trim().is_empty())
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One page of source records plus the paging metadata that came with it
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub page_num: u32,
    pub page_size: u32,
    /// Total number of items across all pages, as reported by the source
    pub total: u64,
    pub records: Vec<Record>,
}

impl Page {
    /// Number of pages needed to cover `total` items
    pub fn page_count(total: u64, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        total.div_ceil(u64::from(page_size)).min(u64::from(u32::MAX)) as u32
    }
}
