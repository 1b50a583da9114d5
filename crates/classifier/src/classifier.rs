//! Performance classification rules.
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//!
//! 1. utilization below 80% → [`Category::NotSpending`], at any age;
//! 2. younger than 14 days → [`Category::Contender`];
//! 3. otherwise [`Category::Fatigued`] when ROAS or CTR fell more than 10%
//!    against the prior window while frequency is above 3, else
//!    [`Category::Winner`].

use crate::metrics::{change_pct, DerivedMetrics};
use chrono::{DateTime, Utc};
use pulse_core::types::{Category, EntityKind, EntitySnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum share of budget an entity must spend to count as delivering.
pub const MIN_UTILIZATION_PCT: f64 = 80.0;
/// Entities younger than this are too new to judge for fatigue.
pub const MATURITY_DAYS: i64 = 14;
/// Period-over-period change (in percent) below which a metric is declining.
pub const DECLINE_THRESHOLD_PCT: f64 = -10.0;
/// Frequency above which the audience is saturated.
pub const HIGH_FREQUENCY: f64 = 3.0;

/// Ads below this 7-day spend are not classified.
pub const AD_MIN_SPEND: f64 = 5.0;

/// Assign a category from derived values.
pub fn classify(
    age_in_days: i64,
    budget_utilization_pct: f64,
    roas_current: f64,
    roas_previous: f64,
    ctr_current: f64,
    ctr_previous: f64,
    frequency_current: f64,
) -> Category {
    if budget_utilization_pct < MIN_UTILIZATION_PCT {
        return Category::NotSpending;
    }

    if age_in_days < MATURITY_DAYS && budget_utilization_pct >= MIN_UTILIZATION_PCT {
        return Category::Contender;
    }

    if age_in_days >= MATURITY_DAYS && budget_utilization_pct >= MIN_UTILIZATION_PCT {
        let roas_change = change_pct(roas_current, roas_previous);
        let ctr_change = change_pct(ctr_current, ctr_previous);
        let declining = roas_change < DECLINE_THRESHOLD_PCT || ctr_change < DECLINE_THRESHOLD_PCT;
        let high_frequency = frequency_current > HIGH_FREQUENCY;

        return if declining && high_frequency {
            Category::Fatigued
        } else {
            Category::Winner
        };
    }

    // Only reachable for a NaN utilization.
    Category::NotSpending
}

/// A snapshot together with its derived values and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntity {
    pub snapshot: EntitySnapshot,
    pub derived: DerivedMetrics,
    pub category: Category,
}

impl ClassifiedEntity {
    pub fn new(snapshot: EntitySnapshot, now: DateTime<Utc>) -> Self {
        let derived = DerivedMetrics::for_snapshot(&snapshot, now);
        let category = classify(
            derived.age_in_days,
            derived.budget_utilization_pct,
            derived.roas_current,
            derived.roas_previous,
            derived.ctr_current,
            derived.ctr_previous,
            derived.frequency,
        );
        Self {
            snapshot,
            derived,
            category,
        }
    }
}

/// Ads are only considered once they are active and have spent something.
pub fn is_classifiable(snapshot: &EntitySnapshot) -> bool {
    match snapshot.kind {
        EntityKind::Ad => snapshot.status.is_active() && snapshot.current.spend >= AD_MIN_SPEND,
        EntityKind::Campaign | EntityKind::AdSet => true,
    }
}

/// Classify every eligible snapshot, preserving input order.
pub fn classify_all(
    snapshots: impl IntoIterator<Item = EntitySnapshot>,
    now: DateTime<Utc>,
) -> Vec<ClassifiedEntity> {
    snapshots
        .into_iter()
        .filter(is_classifiable)
        .map(|snapshot| {
            let entity = ClassifiedEntity::new(snapshot, now);
            debug!(
                kind = %entity.snapshot.kind,
                id = %entity.snapshot.id,
                category = %entity.category,
                utilization = entity.derived.budget_utilization_pct,
                age_days = entity.derived.age_in_days,
                "Entity classified"
            );
            entity
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pulse_core::types::EntityStatus;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    /// Campaign with the given age, budget and 7-day spend.
    fn campaign(age_days: i64, budget: f64, spend: f64) -> EntitySnapshot {
        let mut snap = EntitySnapshot::new(EntityKind::Campaign, "c-1", "Prospecting");
        snap.created_at = Some(now() - Duration::days(age_days));
        snap.budget = budget;
        snap.current.spend = spend;
        snap
    }

    // Priority order -------------------------------------------------------

    #[test]
    fn test_low_utilization_is_not_spending_at_any_age() {
        for age in [0, 5, 13, 14, 30, 400] {
            for util in [0.0, 10.0, 79.99] {
                assert_eq!(
                    classify(age, util, 5.0, 1.0, 0.05, 0.01, 10.0),
                    Category::NotSpending,
                    "age={age} util={util}"
                );
            }
        }
    }

    #[test]
    fn test_young_spending_entity_is_contender() {
        for age in [0, 1, 13] {
            for util in [80.0, 95.0, 250.0] {
                assert_eq!(
                    classify(age, util, 0.1, 5.0, 0.001, 0.05, 9.0),
                    Category::Contender
                );
            }
        }
    }

    #[test]
    fn test_mature_entity_is_winner_or_fatigued() {
        // Declining ROAS, high frequency.
        assert_eq!(classify(14, 80.0, 1.0, 1.5, 0.02, 0.02, 3.5), Category::Fatigued);
        // Declining CTR only, high frequency.
        assert_eq!(classify(30, 90.0, 2.0, 2.0, 0.01, 0.02, 4.0), Category::Fatigued);
        // Declining, but frequency exactly 3 is not high.
        assert_eq!(classify(30, 90.0, 1.0, 1.5, 0.01, 0.02, 3.0), Category::Winner);
        // High frequency, decline of exactly 10% is not below the threshold.
        assert_eq!(classify(30, 90.0, 0.9, 1.0, 0.02, 0.02, 5.0), Category::Winner);
        // No prior window: change is 0.
        assert_eq!(classify(30, 90.0, 1.0, 0.0, 0.01, 0.0, 8.0), Category::Winner);
    }

    #[test]
    fn test_nan_utilization_falls_back_to_not_spending() {
        assert_eq!(
            classify(30, f64::NAN, 1.0, 1.0, 0.01, 0.01, 1.0),
            Category::NotSpending
        );
    }

    // Scenarios ------------------------------------------------------------

    #[test]
    fn test_scenario_fatigued() {
        assert_eq!(classify(20, 90.0, 1.0, 1.5, 0.01, 0.02, 4.0), Category::Fatigued);
    }

    #[test]
    fn test_scenario_winner_at_low_frequency() {
        assert_eq!(classify(20, 90.0, 1.0, 1.5, 0.01, 0.02, 2.0), Category::Winner);
    }

    #[test]
    fn test_scenario_contender_from_snapshot() {
        let entity = ClassifiedEntity::new(campaign(5, 500.0, 450.0), now());
        assert!((entity.derived.budget_utilization_pct - 90.0).abs() < 1e-9);
        assert_eq!(entity.category, Category::Contender);
    }

    #[test]
    fn test_scenario_not_spending_from_snapshot() {
        let mut snap = campaign(30, 1000.0, 300.0);
        snap.current.revenue = 3000.0;
        snap.current.frequency = 9.0;
        let entity = ClassifiedEntity::new(snap, now());
        assert_eq!(entity.category, Category::NotSpending);
    }

    #[test]
    fn test_scenario_fatigued_from_snapshot() {
        let mut snap = campaign(20, 1000.0, 900.0);
        snap.current.revenue = 900.0; // ROAS 1.0
        snap.current.clicks = 100.0;
        snap.current.impressions = 10_000.0; // CTR 0.01
        snap.current.frequency = 4.0;
        snap.previous.spend = 1000.0;
        snap.previous.revenue = 1500.0; // ROAS 1.5
        snap.previous.clicks = 200.0;
        snap.previous.impressions = 10_000.0; // CTR 0.02

        let entity = ClassifiedEntity::new(snap.clone(), now());
        assert_eq!(entity.category, Category::Fatigued);

        snap.current.frequency = 2.0;
        assert_eq!(ClassifiedEntity::new(snap, now()).category, Category::Winner);
    }

    #[test]
    fn test_zero_budget_campaign_is_not_spending() {
        let entity = ClassifiedEntity::new(campaign(40, 0.0, 5000.0), now());
        assert_eq!(entity.derived.budget_utilization_pct, 0.0);
        assert_eq!(entity.category, Category::NotSpending);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let snap = campaign(21, 1000.0, 850.0);
        let first = ClassifiedEntity::new(snap.clone(), now());
        let second = ClassifiedEntity::new(snap, now());
        assert_eq!(first, second);
    }

    // Ad eligibility -------------------------------------------------------

    #[test]
    fn test_ad_filter() {
        let mut ad = EntitySnapshot::new(EntityKind::Ad, "ad-1", "Static");
        ad.current.spend = 4.99;
        assert!(!is_classifiable(&ad));

        ad.current.spend = 5.0;
        assert!(is_classifiable(&ad));

        ad.status = EntityStatus::Paused;
        assert!(!is_classifiable(&ad));

        let campaign = EntitySnapshot::new(EntityKind::Campaign, "c-1", "Paused campaign");
        assert!(is_classifiable(&campaign));
    }

    #[test]
    fn test_classify_all_filters_ads_and_keeps_order() {
        let mut idle_ad = EntitySnapshot::new(EntityKind::Ad, "ad-idle", "Idle");
        idle_ad.current.spend = 1.0;
        let mut live_ad = EntitySnapshot::new(EntityKind::Ad, "ad-live", "Live");
        live_ad.current.spend = 50.0;

        let classified = classify_all(
            vec![campaign(3, 100.0, 90.0), idle_ad, live_ad],
            now(),
        );
        let ids: Vec<_> = classified.iter().map(|e| e.snapshot.id.as_str()).collect();
        assert_eq!(ids, vec!["c-1", "ad-live"]);
        // created_at unknown → age 0, spending ad → 85% → contender
        assert_eq!(classified[1].category, Category::Contender);
    }
}
