use crate::row::RawRow;
use async_trait::async_trait;
use pulse_core::types::EntityKind;
use pulse_core::PulseResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three backend collections an analysis pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Campaigns,
    AdSets,
    Ads,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Campaigns, Collection::AdSets, Collection::Ads];

    /// Backend table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::AdSets => "adsets",
            Self::Ads => "creative_performance",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Campaigns => EntityKind::Campaign,
            Self::AdSets => EntityKind::AdSet,
            Self::Ads => EntityKind::Ad,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Read-only access to pre-aggregated backend rows.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch every row of `collection`, up to the source's row cap.
    async fn fetch(&self, collection: Collection) -> PulseResult<Vec<RawRow>>;
}
