//! Alert synthesis: turns classified entities into a severity-ranked feed.

use crate::classifier::{ClassifiedEntity, MIN_UTILIZATION_PCT};
use pulse_core::types::{Alert, AlertMetrics, Category, EntityKind, Severity};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Contenders at or above this ROAS are worth watching rather than fixing.
pub const CONTENDER_HEALTHY_ROAS: f64 = 2.0;
/// Winners at or above this ROAS are scale candidates.
pub const SCALE_ROAS: f64 = 2.5;
/// Winners at or above this ROAS are top performers.
pub const TOP_PERFORMER_ROAS: f64 = 3.0;
/// Suggested spend multiplier for scale candidates.
pub const SCALE_MULTIPLIER: f64 = 1.75;

/// Hex characters kept from the SHA-256 digest for alert keys.
const KEY_LEN: usize = 16;

/// 7-day spend an entity needs before fatigue or scale alerts are raised.
pub fn min_spend(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::Campaign => 100.0,
        EntityKind::AdSet => 50.0,
        EntityKind::Ad => 20.0,
    }
}

/// Build the alert feed for one analysis pass.
///
/// Per-entity alerts come first, duplicates (same key) are dropped, the two
/// summary alerts are appended, and the result is stably sorted by severity
/// rank and then by descending `current_value`. Entities without an id are
/// never deduplicated since their keys cannot tell them apart.
pub fn synthesize(entities: &[ClassifiedEntity]) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for entity in entities {
        entity_alerts(entity, &mut alerts);
    }

    let mut seen = HashSet::new();
    alerts.retain(|alert: &Alert| {
        let anonymous = alert.entity.as_ref().map_or(true, |e| e.id.is_empty());
        anonymous || seen.insert(alert.key.clone())
    });

    append_summaries(&mut alerts);
    sort_alerts(&mut alerts);
    alerts
}

/// Stable sort: severity rank ascending, then `current_value` descending.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| b.metrics.current_value.total_cmp(&a.metrics.current_value))
    });
}

fn entity_alerts(entity: &ClassifiedEntity, out: &mut Vec<Alert>) {
    let snap = &entity.snapshot;
    let d = &entity.derived;
    let label = snap.kind.label();
    let above_min_spend = d.spend > min_spend(snap.kind);

    match entity.category {
        Category::Fatigued => {
            if above_min_spend {
                out.push(entity_alert(
                    entity,
                    Severity::Critical,
                    format!("{label} fatigued: {}", snap.name),
                    format!(
                        "ROAS {:+.1}% and CTR {:+.1}% versus the prior 7 days at frequency {:.1}.",
                        d.roas_change_pct(),
                        d.ctr_change_pct(),
                        d.frequency
                    ),
                    "Pause it or refresh the creative to reset audience fatigue.".to_string(),
                    d.frequency,
                ));
            }
        }
        Category::NotSpending => {
            let has_budget = match snap.kind {
                EntityKind::Campaign => snap.budget > 0.0,
                EntityKind::AdSet | EntityKind::Ad => true,
            };
            if snap.status.is_active() && has_budget {
                let message = if snap.budget > 0.0 {
                    format!(
                        "Spent {:.0}% of its budget (${:.2} of ${:.2}) over 7 days, below the {:.0}% delivery floor.",
                        d.budget_utilization_pct, d.spend, snap.budget, MIN_UTILIZATION_PCT
                    )
                } else {
                    format!("Only ${:.2} spent over 7 days.", d.spend)
                };
                out.push(entity_alert(
                    entity,
                    Severity::Critical,
                    format!("Deletion candidate: {}", snap.name),
                    message,
                    "Delete or restructure it; it is not delivering against its budget.".to_string(),
                    d.budget_utilization_pct,
                ));
            }
        }
        Category::Contender => {
            if d.roas_current >= CONTENDER_HEALTHY_ROAS {
                out.push(entity_alert(
                    entity,
                    Severity::Opportunity,
                    format!("Promising contender: {}", snap.name),
                    format!(
                        "{:.2}x ROAS after {} days on ${:.2} spend.",
                        d.roas_current, d.age_in_days, d.spend
                    ),
                    "Keep monitoring until it has two weeks of data.".to_string(),
                    d.roas_current,
                ));
            } else {
                out.push(entity_alert(
                    entity,
                    Severity::Warning,
                    format!("Contender needs optimization: {}", snap.name),
                    format!(
                        "{:.2}x ROAS after {} days, below {:.1}x.",
                        d.roas_current, d.age_in_days, CONTENDER_HEALTHY_ROAS
                    ),
                    "Optimize targeting or creative before it matures.".to_string(),
                    d.roas_current,
                ));
            }
        }
        Category::Winner => {
            if !above_min_spend {
                return;
            }
            if d.roas_current >= SCALE_ROAS {
                let suggested = d.spend * SCALE_MULTIPLIER;
                let mut alert = entity_alert(
                    entity,
                    Severity::Opportunity,
                    format!("Ready to scale: {}", snap.name),
                    format!("{:.2}x ROAS on ${:.2} spend over 7 days.", d.roas_current, d.spend),
                    format!("Increase spend to ${suggested:.2} ({SCALE_MULTIPLIER}x current)."),
                    d.roas_current,
                );
                alert.metrics.suggested_spend = Some(suggested);
                out.push(alert);
            }
            if d.roas_current >= TOP_PERFORMER_ROAS {
                out.push(entity_alert(
                    entity,
                    Severity::Success,
                    format!("Top performer: {}", snap.name),
                    format!(
                        "{:.2}x ROAS with {:.2}% CTR over 7 days.",
                        d.roas_current,
                        d.ctr_current * 100.0
                    ),
                    format!("Use this {} as a template for new launches.", label.to_lowercase()),
                    d.roas_current,
                ));
            }
        }
    }
}

fn entity_alert(
    entity: &ClassifiedEntity,
    severity: Severity,
    title: String,
    message: String,
    action: String,
    current_value: f64,
) -> Alert {
    let snap = &entity.snapshot;
    let d = &entity.derived;
    Alert {
        key: alert_key(snap.kind.as_str(), &snap.id, entity.category, severity),
        severity,
        category: entity.category,
        title,
        message,
        action,
        entity: Some(snap.entity_ref()),
        metrics: AlertMetrics {
            current_value,
            spend: d.spend,
            roas: d.roas_current,
            ctr: d.ctr_current,
            frequency: d.frequency,
            budget_utilization_pct: d.budget_utilization_pct,
            age_in_days: d.age_in_days,
            suggested_spend: None,
        },
    }
}

fn append_summaries(alerts: &mut Vec<Alert>) {
    let deletions = alerts
        .iter()
        .filter(|a| a.category == Category::NotSpending)
        .count();
    let scale = alerts
        .iter()
        .filter(|a| a.category == Category::Winner && a.severity == Severity::Opportunity)
        .count();

    if deletions > 0 {
        alerts.push(summary_alert(
            Severity::Critical,
            Category::NotSpending,
            format!("{deletions} {}", plural(deletions, "deletion candidate", "deletion candidates")),
            format!(
                "{deletions} active entities spent less than {MIN_UTILIZATION_PCT:.0}% of their budget."
            ),
            "Review the deletion candidates and clean up the account.".to_string(),
            deletions,
        ));
    }
    if scale > 0 {
        alerts.push(summary_alert(
            Severity::Opportunity,
            Category::Winner,
            format!("{scale} {}", plural(scale, "scale opportunity", "scale opportunities")),
            format!("{scale} winners are returning at least {SCALE_ROAS}x ROAS."),
            "Shift budget toward the scale candidates.".to_string(),
            scale,
        ));
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn summary_alert(
    severity: Severity,
    category: Category,
    title: String,
    message: String,
    action: String,
    count: usize,
) -> Alert {
    Alert {
        key: alert_key("summary", category.as_str(), category, severity),
        severity,
        category,
        title,
        message,
        action,
        entity: None,
        metrics: AlertMetrics {
            current_value: count as f64,
            ..AlertMetrics::default()
        },
    }
}

/// Content-derived key: truncated SHA-256 over the finding's identity.
fn alert_key(kind: &str, id: &str, category: Category, severity: Severity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(category.as_str().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(severity.as_str().as_bytes());
    let mut key = hex::encode(hasher.finalize());
    key.truncate(KEY_LEN);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DerivedMetrics;
    use pulse_core::types::{EntitySnapshot, EntityStatus};

    fn entity(kind: EntityKind, id: &str, category: Category, derived: DerivedMetrics) -> ClassifiedEntity {
        let mut snapshot = EntitySnapshot::new(kind, id, format!("{id} name"));
        snapshot.budget = 1000.0;
        snapshot.current.spend = derived.spend;
        ClassifiedEntity {
            snapshot,
            derived,
            category,
        }
    }

    fn derived(spend: f64, roas: f64) -> DerivedMetrics {
        DerivedMetrics {
            age_in_days: 20,
            budget_utilization_pct: 90.0,
            spend,
            roas_current: roas,
            roas_previous: roas,
            ctr_current: 0.02,
            ctr_previous: 0.02,
            frequency: 1.5,
        }
    }

    fn severities(alerts: &[Alert]) -> Vec<Severity> {
        alerts.iter().map(|a| a.severity).collect()
    }

    #[test]
    fn test_top_winner_gets_scale_and_success() {
        let e = entity(EntityKind::Campaign, "c-1", Category::Winner, derived(900.0, 3.2));
        let alerts = synthesize(&[e]);

        let own: Vec<_> = alerts.iter().filter(|a| a.entity.is_some()).collect();
        assert_eq!(own.len(), 2);
        assert!(own.iter().any(|a| a.severity == Severity::Opportunity));
        assert!(own.iter().any(|a| a.severity == Severity::Success));

        let scale = own.iter().find(|a| a.severity == Severity::Opportunity).unwrap();
        assert!((scale.metrics.suggested_spend.unwrap() - 1575.0).abs() < 1e-9);
        assert_eq!(scale.metrics.current_value, 3.2);

        // Plus the scale summary.
        let summary = alerts.iter().find(|a| a.entity.is_none()).unwrap();
        assert_eq!(summary.title, "1 scale opportunity");
        assert_eq!(summary.metrics.current_value, 1.0);
    }

    #[test]
    fn test_winner_between_thresholds_only_scales() {
        let e = entity(EntityKind::AdSet, "as-1", Category::Winner, derived(60.0, 2.7));
        let alerts = synthesize(&[e]);
        assert_eq!(
            severities(&alerts),
            vec![Severity::Opportunity, Severity::Opportunity]
        );
        assert!(alerts.iter().all(|a| a.severity != Severity::Success));
    }

    #[test]
    fn test_winner_below_min_spend_is_silent() {
        let e = entity(EntityKind::Campaign, "c-1", Category::Winner, derived(100.0, 4.0));
        assert!(synthesize(&[e]).is_empty());

        let ad = entity(EntityKind::Ad, "ad-1", Category::Winner, derived(20.5, 4.0));
        assert_eq!(synthesize(&[ad]).len(), 3);
    }

    #[test]
    fn test_fatigued_thresholds_per_kind() {
        let cases = [
            (EntityKind::Campaign, 100.0, 0),
            (EntityKind::Campaign, 100.01, 1),
            (EntityKind::AdSet, 50.0, 0),
            (EntityKind::AdSet, 51.0, 1),
            (EntityKind::Ad, 20.0, 0),
            (EntityKind::Ad, 25.0, 1),
        ];
        for (kind, spend, expected) in cases {
            let e = entity(kind, "x", Category::Fatigued, derived(spend, 1.0));
            let alerts = synthesize(&[e]);
            assert_eq!(alerts.len(), expected, "{kind} spend={spend}");
            if expected == 1 {
                assert_eq!(alerts[0].severity, Severity::Critical);
                assert_eq!(alerts[0].category, Category::Fatigued);
            }
        }
    }

    #[test]
    fn test_not_spending_requires_active_and_campaign_budget() {
        let mut active = entity(EntityKind::Campaign, "c-1", Category::NotSpending, derived(300.0, 1.0));
        active.derived.budget_utilization_pct = 30.0;
        let alerts = synthesize(&[active.clone()]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].metrics.current_value, 30.0);
        assert_eq!(alerts[1].title, "1 deletion candidate");

        let mut paused = active.clone();
        paused.snapshot.status = EntityStatus::Paused;
        assert!(synthesize(&[paused]).is_empty());

        let mut no_budget = active.clone();
        no_budget.snapshot.budget = 0.0;
        assert!(synthesize(&[no_budget]).is_empty());

        let mut ad_set = active;
        ad_set.snapshot.kind = EntityKind::AdSet;
        ad_set.snapshot.budget = 0.0;
        assert_eq!(synthesize(&[ad_set]).len(), 2);
    }

    #[test]
    fn test_contender_severity_by_roas() {
        let healthy = entity(EntityKind::Campaign, "c-1", Category::Contender, derived(10.0, 2.0));
        let weak = entity(EntityKind::Campaign, "c-2", Category::Contender, derived(10.0, 1.99));
        let alerts = synthesize(&[healthy, weak]);
        assert_eq!(severities(&alerts), vec![Severity::Warning, Severity::Opportunity]);
        assert!(alerts.iter().all(|a| a.category == Category::Contender));
    }

    #[test]
    fn test_ordering_by_severity_then_value() {
        let mut low_util = entity(EntityKind::Campaign, "c-low", Category::NotSpending, derived(100.0, 1.0));
        low_util.derived.budget_utilization_pct = 10.0;
        let mut mid_util = entity(EntityKind::Campaign, "c-mid", Category::NotSpending, derived(500.0, 1.0));
        mid_util.derived.budget_utilization_pct = 50.0;
        let winner = entity(EntityKind::Campaign, "c-win", Category::Winner, derived(900.0, 3.5));
        let weak = entity(EntityKind::AdSet, "as-weak", Category::Contender, derived(10.0, 0.5));

        let alerts = synthesize(&[winner, low_util, weak, mid_util]);
        let titles: Vec<_> = alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Deletion candidate: c-mid name",
                "Deletion candidate: c-low name",
                "2 deletion candidates",
                "Contender needs optimization: as-weak name",
                "Ready to scale: c-win name",
                "1 scale opportunity",
                "Top performer: c-win name",
            ]
        );
    }

    #[test]
    fn test_duplicate_rows_emit_one_alert() {
        let e = entity(EntityKind::Campaign, "c-1", Category::Contender, derived(10.0, 1.0));
        let alerts = synthesize(&[e.clone(), e]);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_entities_without_id_are_kept_apart() {
        let mut alpha = entity(EntityKind::Campaign, "", Category::NotSpending, derived(100.0, 1.0));
        alpha.snapshot.name = "Alpha".to_string();
        alpha.derived.budget_utilization_pct = 10.0;
        let mut beta = entity(EntityKind::Campaign, "", Category::NotSpending, derived(200.0, 1.0));
        beta.snapshot.name = "Beta".to_string();
        beta.derived.budget_utilization_pct = 20.0;

        let alerts = synthesize(&[alpha, beta]);
        let titles: Vec<_> = alerts.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Deletion candidate: Beta",
                "Deletion candidate: Alpha",
                "2 deletion candidates",
            ]
        );
        assert_eq!(alerts[2].metrics.current_value, 2.0);
    }

    #[test]
    fn test_summary_titles_pluralize() {
        let winners: Vec<_> = ["c-1", "c-2"]
            .iter()
            .map(|id| entity(EntityKind::Campaign, id, Category::Winner, derived(900.0, 2.6)))
            .collect();
        let alerts = synthesize(&winners);
        assert!(alerts.iter().any(|a| a.title == "2 scale opportunities"));

        let alerts = synthesize(&winners[..1]);
        assert!(alerts.iter().any(|a| a.title == "1 scale opportunity"));
    }

    #[test]
    fn test_keys_are_stable_and_distinct() {
        let e = entity(EntityKind::Campaign, "c-1", Category::Winner, derived(900.0, 3.2));
        let first = synthesize(std::slice::from_ref(&e));
        let second = synthesize(&[e]);
        let keys: Vec<_> = first.iter().map(|a| a.key.clone()).collect();
        assert_eq!(keys, second.iter().map(|a| a.key.clone()).collect::<Vec<_>>());

        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert!(keys.iter().all(|k| k.len() == KEY_LEN));
    }

    #[test]
    fn test_empty_input() {
        assert!(synthesize(&[]).is_empty());
    }
}
