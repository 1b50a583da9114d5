//! One analysis pass: fetch, convert, classify, synthesize.

use crate::summary::AlertSummary;
use chrono::{DateTime, Utc};
use pulse_classifier::{classify_all, synthesize, ClassifiedEntity};
use pulse_core::types::{Alert, EntitySnapshot};
use pulse_core::PulseResult;
use pulse_source::snapshot::snapshot_for;
use pulse_source::{Collection, SnapshotSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Request-scoped parameters of a pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Reference time for entity ages; defaults to now.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    /// Restrict the pass to one campaign and its ad sets and ads.
    #[serde(default)]
    pub campaign_id: Option<String>,
}

impl AnalysisOptions {
    pub fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// Output of a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub entities: Vec<ClassifiedEntity>,
    pub alerts: Vec<Alert>,
}

impl AnalysisReport {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            entities: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn summary(&self) -> AlertSummary {
        AlertSummary::from_report(self)
    }
}

/// Runs analysis passes against a snapshot source. Holds no state between
/// passes.
#[derive(Clone)]
pub struct AlertPipeline {
    source: Arc<dyn SnapshotSource>,
}

impl AlertPipeline {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Fetch all three collections concurrently. Any failure fails the whole
    /// load.
    pub async fn load_snapshots(&self) -> PulseResult<Vec<EntitySnapshot>> {
        let (campaigns, ad_sets, ads) = tokio::try_join!(
            self.source.fetch(Collection::Campaigns),
            self.source.fetch(Collection::AdSets),
            self.source.fetch(Collection::Ads),
        )?;

        let mut snapshots = Vec::with_capacity(campaigns.len() + ad_sets.len() + ads.len());
        for (collection, rows) in [
            (Collection::Campaigns, campaigns),
            (Collection::AdSets, ad_sets),
            (Collection::Ads, ads),
        ] {
            let kind = collection.entity_kind();
            snapshots.extend(rows.iter().map(|row| snapshot_for(kind, row)));
        }
        Ok(snapshots)
    }

    /// Run a pass, surfacing source errors.
    pub async fn try_analyze(&self, options: &AnalysisOptions) -> PulseResult<AnalysisReport> {
        let started = Instant::now();
        let now = options.now();

        let mut snapshots = self.load_snapshots().await?;
        if let Some(campaign_id) = options.campaign_id.as_deref() {
            snapshots.retain(|s| s.belongs_to_campaign(campaign_id));
        }

        let entities = classify_all(snapshots, now);
        let alerts = synthesize(&entities);

        metrics::counter!("pulse.passes").increment(1);
        metrics::counter!("pulse.entities_classified").increment(entities.len() as u64);
        metrics::counter!("pulse.alerts").increment(alerts.len() as u64);

        info!(
            entities = entities.len(),
            alerts = alerts.len(),
            campaign_filter = options.campaign_id.as_deref().unwrap_or("*"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis pass complete"
        );

        Ok(AnalysisReport {
            generated_at: now,
            entities,
            alerts,
        })
    }

    /// Run a pass. A source failure aborts the pass and yields an empty
    /// report; partial results are never returned.
    pub async fn analyze(&self, options: &AnalysisOptions) -> AnalysisReport {
        match self.try_analyze(options).await {
            Ok(report) => report,
            Err(e) => {
                metrics::counter!("pulse.pass_failures").increment(1);
                error!(error = %e, "Analysis pass aborted");
                AnalysisReport::empty(options.now())
            }
        }
    }

    /// The alert feed for one pass; empty when any fetch fails.
    pub async fn run(&self, options: &AnalysisOptions) -> Vec<Alert> {
        self.analyze(options).await.alerts
    }
}
