//! Source backed by JSON exports of the backend tables.

use crate::row::RawRow;
use crate::source::{Collection, SnapshotSource};
use async_trait::async_trait;
use pulse_core::config::SourceConfig;
use pulse_core::{PulseError, PulseResult};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Reads each collection from a JSON file holding either a top-level array
/// of row objects or a `{"data": [...]}` envelope.
pub struct JsonFileSource {
    campaigns: PathBuf,
    ad_sets: PathBuf,
    ads: PathBuf,
    row_limit: usize,
}

impl JsonFileSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            campaigns: PathBuf::from(&config.campaigns_path),
            ad_sets: PathBuf::from(&config.adsets_path),
            ads: PathBuf::from(&config.ads_path),
            row_limit: config.row_limit,
        }
    }

    fn path(&self, collection: Collection) -> &PathBuf {
        match collection {
            Collection::Campaigns => &self.campaigns,
            Collection::AdSets => &self.ad_sets,
            Collection::Ads => &self.ads,
        }
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    async fn fetch(&self, collection: Collection) -> PulseResult<Vec<RawRow>> {
        let table = collection.table_name();
        let path = self.path(collection);

        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PulseError::fetch(table, format!("{}: {e}", path.display())))?;

        let rows = parse_rows(table, &body, self.row_limit)?;
        debug!(table, path = %path.display(), rows = rows.len(), "Loaded source rows");
        Ok(rows)
    }
}

/// Parse an export body into at most `row_limit` rows. Non-object entries
/// are skipped.
pub fn parse_rows(table: &'static str, body: &str, row_limit: usize) -> PulseResult<Vec<RawRow>> {
    let value: Value = serde_json::from_str(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(PulseError::payload(table, "expected a `data` array")),
        },
        _ => return Err(PulseError::payload(table, "expected an array of rows")),
    };

    let total = items.len();
    let mut rows: Vec<RawRow> = items.into_iter().filter_map(RawRow::from_value).collect();

    let skipped = total - rows.len();
    if skipped > 0 {
        warn!(table, skipped, "Skipped non-object rows");
    }
    if rows.len() > row_limit {
        warn!(table, rows = rows.len(), row_limit, "Row cap reached, truncating");
        rows.truncate(row_limit);
    }

    Ok(rows)
}
