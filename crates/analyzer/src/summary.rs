use crate::pipeline::AnalysisReport;
use chrono::{DateTime, Utc};
use pulse_core::types::{Category, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub opportunity: usize,
    pub success: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub winner: usize,
    pub contender: usize,
    pub fatigued: usize,
    pub not_spending: usize,
}

/// Alert counts per severity and entity counts per category for one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub generated_at: DateTime<Utc>,
    pub entities_classified: usize,
    pub total_alerts: usize,
    pub alerts_by_severity: SeverityCounts,
    pub entities_by_category: CategoryCounts,
}

impl AlertSummary {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let mut alerts_by_severity = SeverityCounts::default();
        for alert in &report.alerts {
            match alert.severity {
                Severity::Critical => alerts_by_severity.critical += 1,
                Severity::Warning => alerts_by_severity.warning += 1,
                Severity::Opportunity => alerts_by_severity.opportunity += 1,
                Severity::Success => alerts_by_severity.success += 1,
            }
        }

        let mut entities_by_category = CategoryCounts::default();
        for entity in &report.entities {
            match entity.category {
                Category::Winner => entities_by_category.winner += 1,
                Category::Contender => entities_by_category.contender += 1,
                Category::Fatigued => entities_by_category.fatigued += 1,
                Category::NotSpending => entities_by_category.not_spending += 1,
            }
        }

        Self {
            generated_at: report.generated_at,
            entities_classified: report.entities.len(),
            total_alerts: report.alerts.len(),
            alerts_by_severity,
            entities_by_category,
        }
    }
}
