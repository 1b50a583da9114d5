//! Derived performance values. Every ratio is guarded so that a zero
//! denominator yields `0.0`, never NaN or infinity.

use chrono::{DateTime, Utc};
use pulse_core::types::{EntityKind, EntitySnapshot};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Ads have no budget of their own; utilization is approximated from spend.
pub const AD_SPENDING_UTILIZATION_PCT: f64 = 85.0;
pub const AD_IDLE_UTILIZATION_PCT: f64 = 10.0;
/// Ad spend above which the ad counts as spending.
pub const AD_SPENDING_THRESHOLD: f64 = 10.0;

/// Whole days since creation, rounded up. Unknown or future creation → 0.
pub fn age_in_days(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(created_at) = created_at else {
        return 0;
    };
    let elapsed_ms = (now - created_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0;
    }
    (elapsed_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// `100 × spend / budget`, 0 when there is no budget.
pub fn budget_utilization_pct(spend: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        spend / budget * 100.0
    } else {
        0.0
    }
}

/// Return on ad spend, 0 without spend.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        revenue / spend
    } else {
        0.0
    }
}

/// Click-through rate as a fraction, 0 without impressions.
pub fn ctr(clicks: f64, impressions: f64) -> f64 {
    if impressions > 0.0 {
        clicks / impressions
    } else {
        0.0
    }
}

/// Percentage change from `previous` to `current`, 0 without a baseline.
pub fn change_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Everything the classifier needs, computed once per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub age_in_days: i64,
    pub budget_utilization_pct: f64,
    pub spend: f64,
    pub roas_current: f64,
    pub roas_previous: f64,
    pub ctr_current: f64,
    pub ctr_previous: f64,
    pub frequency: f64,
}

impl DerivedMetrics {
    pub fn for_snapshot(snapshot: &EntitySnapshot, now: DateTime<Utc>) -> Self {
        let current = &snapshot.current;
        let previous = &snapshot.previous;

        let budget_utilization_pct = match snapshot.kind {
            EntityKind::Ad if current.spend > AD_SPENDING_THRESHOLD => AD_SPENDING_UTILIZATION_PCT,
            EntityKind::Ad => AD_IDLE_UTILIZATION_PCT,
            EntityKind::Campaign | EntityKind::AdSet => {
                budget_utilization_pct(current.spend, snapshot.budget)
            }
        };

        Self {
            age_in_days: age_in_days(snapshot.created_at, now),
            budget_utilization_pct,
            spend: current.spend,
            roas_current: roas(current.revenue, current.spend),
            roas_previous: roas(previous.revenue, previous.spend),
            ctr_current: ctr(current.clicks, current.impressions),
            ctr_previous: ctr(previous.clicks, previous.impressions),
            frequency: current.frequency,
        }
    }

    pub fn roas_change_pct(&self) -> f64 {
        change_pct(self.roas_current, self.roas_previous)
    }

    pub fn ctr_change_pct(&self) -> f64 {
        change_pct(self.ctr_current, self.ctr_previous)
    }
}
