//! Conversion of raw rows into typed entity snapshots.

use crate::row::RawRow;
use pulse_core::types::{EntityKind, EntitySnapshot, EntityStatus, WindowMetrics};

const CURRENT_SUFFIX: &str = "_7d";
const PREVIOUS_SUFFIX: &str = "_prev";

const BUDGET_COLUMNS: &[&str] = &["budget", "daily_budget", "lifetime_budget"];
const STATUS_COLUMNS: &[&str] = &["status", "effective_status"];
const CREATED_COLUMNS: &[&str] = &["created_time", "created_at"];

fn window(row: &RawRow, suffix: &str) -> WindowMetrics {
    let metric = |name: &str| row.number(&format!("{name}{suffix}"));
    WindowMetrics {
        spend: metric("spend"),
        revenue: metric("revenue"),
        impressions: metric("impressions"),
        clicks: metric("clicks"),
        conversions: metric("conversions"),
        frequency: metric("frequency"),
    }
}

fn status(row: &RawRow) -> EntityStatus {
    row.text(STATUS_COLUMNS)
        .map(|s| EntityStatus::parse(&s))
        .unwrap_or_default()
}

fn base(row: &RawRow, kind: EntityKind, id_columns: &[&str], name_columns: &[&str]) -> EntitySnapshot {
    let id = row.text(id_columns).unwrap_or_default();
    let name = row.text(name_columns).unwrap_or_else(|| id.clone());
    EntitySnapshot {
        kind,
        id,
        name,
        campaign_id: None,
        ad_set_id: None,
        status: status(row),
        created_at: row.timestamp(CREATED_COLUMNS),
        budget: 0.0,
        current: window(row, CURRENT_SUFFIX),
        previous: window(row, PREVIOUS_SUFFIX),
    }
}

/// Row of the `campaigns` table.
pub fn campaign_snapshot(row: &RawRow) -> EntitySnapshot {
    let mut snapshot = base(
        row,
        EntityKind::Campaign,
        &["id", "campaign_id"],
        &["name", "campaign_name"],
    );
    snapshot.budget = row.first_number(BUDGET_COLUMNS);
    snapshot
}

/// Row of the `adsets` table.
pub fn ad_set_snapshot(row: &RawRow) -> EntitySnapshot {
    let mut snapshot = base(
        row,
        EntityKind::AdSet,
        &["id", "adset_id"],
        &["name", "adset_name"],
    );
    snapshot.campaign_id = row.text(&["campaign_id"]);
    snapshot.budget = row.first_number(BUDGET_COLUMNS);
    snapshot
}

/// Row of the `creative_performance` table. Ads carry no budget of their own.
pub fn ad_snapshot(row: &RawRow) -> EntitySnapshot {
    let mut snapshot = base(row, EntityKind::Ad, &["ad_id", "id"], &["ad_name", "name"]);
    snapshot.campaign_id = row.text(&["campaign_id"]);
    snapshot.ad_set_id = row.text(&["adset_id", "ad_set_id"]);
    snapshot
}

/// Convert a row of the given kind.
pub fn snapshot_for(kind: EntityKind, row: &RawRow) -> EntitySnapshot {
    match kind {
        EntityKind::Campaign => campaign_snapshot(row),
        EntityKind::AdSet => ad_set_snapshot(row),
        EntityKind::Ad => ad_snapshot(row),
    }
}
