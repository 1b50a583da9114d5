//! In-memory source, for embedding callers and tests.

use crate::row::RawRow;
use crate::source::{Collection, SnapshotSource};
use async_trait::async_trait;
use pulse_core::{PulseError, PulseResult};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: HashMap<Collection, Vec<RawRow>>,
    failing: HashSet<Collection>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, collection: Collection, rows: Vec<RawRow>) -> Self {
        self.rows.insert(collection, rows);
        self
    }

    /// Make every fetch of `collection` fail.
    pub fn failing_on(mut self, collection: Collection) -> Self {
        self.failing.insert(collection);
        self
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn fetch(&self, collection: Collection) -> PulseResult<Vec<RawRow>> {
        if self.failing.contains(&collection) {
            return Err(PulseError::fetch(collection.table_name(), "collection unavailable"));
        }
        Ok(self.rows.get(&collection).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_configured_rows() {
        let row = RawRow::from_value(json!({"id": "c1"})).unwrap();
        let source = MemorySource::new().with_rows(Collection::Campaigns, vec![row.clone()]);

        assert_eq!(source.fetch(Collection::Campaigns).await.unwrap(), vec![row]);
        assert!(source.fetch(Collection::Ads).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_collection() {
        let source = MemorySource::new().failing_on(Collection::AdSets);
        let err = source.fetch(Collection::AdSets).await.unwrap_err();
        assert!(matches!(err, PulseError::Source { collection: "adsets", .. }));
        assert!(source.fetch(Collection::Campaigns).await.is_ok());
    }
}
