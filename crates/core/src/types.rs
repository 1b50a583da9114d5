use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level of the ad account hierarchy a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    AdSet,
    Ad,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::AdSet => "ad_set",
            Self::Ad => "ad",
        }
    }

    /// Human-readable label used in alert titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Campaign => "Campaign",
            Self::AdSet => "Ad set",
            Self::Ad => "Ad",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status as reported by the ad platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Paused,
    Other(String),
}

impl EntityStatus {
    /// Parse a platform status string. Matching is case-insensitive;
    /// anything other than ACTIVE / PAUSED is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("ACTIVE") {
            Self::Active
        } else if trimmed.eq_ignore_ascii_case("PAUSED") {
            Self::Paused
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Default for EntityStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// Aggregated delivery metrics for one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub spend: f64,
    pub revenue: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub frequency: f64,
}

/// Flat numeric snapshot of a campaign, ad set or ad for one analysis pass.
///
/// Every numeric field has already been coerced at the source boundary:
/// absent or unparsable values are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
    /// Owning campaign, for ad sets and ads.
    pub campaign_id: Option<String>,
    /// Owning ad set, for ads.
    pub ad_set_id: Option<String>,
    pub status: EntityStatus,
    pub created_at: Option<DateTime<Utc>>,
    /// Daily or lifetime budget; `0.0` when the entity has none.
    pub budget: f64,
    /// Trailing 7-day window.
    pub current: WindowMetrics,
    /// The 7-day window before `current`.
    pub previous: WindowMetrics,
}

impl EntitySnapshot {
    pub fn new(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            campaign_id: None,
            ad_set_id: None,
            status: EntityStatus::Active,
            created_at: None,
            budget: 0.0,
            current: WindowMetrics::default(),
            previous: WindowMetrics::default(),
        }
    }

    /// Whether this entity is, or belongs to, the given campaign.
    pub fn belongs_to_campaign(&self, campaign_id: &str) -> bool {
        match self.kind {
            EntityKind::Campaign => self.id == campaign_id,
            _ => self.campaign_id.as_deref() == Some(campaign_id),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: self.kind,
            id: self.id.clone(),
            name: self.name.clone(),
            campaign_id: self.campaign_id.clone(),
        }
    }
}

/// Performance category. Exactly one is assigned per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Winner,
    Contender,
    Fatigued,
    NotSpending,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winner => "winner",
            Self::Contender => "contender",
            Self::Fatigued => "fatigued",
            Self::NotSpending => "not-spending",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Opportunity,
    Success,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Warning,
        Severity::Opportunity,
        Severity::Success,
    ];

    /// Sort rank: critical(0) < warning(1) < opportunity(2) < success(3).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Opportunity => 2,
            Self::Success => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Opportunity => "opportunity",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference back to the entity an alert was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
    pub campaign_id: Option<String>,
}

/// Metric values an alert was derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertMetrics {
    /// The metric driving the alert; secondary sort key (descending).
    pub current_value: f64,
    pub spend: f64,
    pub roas: f64,
    pub ctr: f64,
    pub frequency: f64,
    pub budget_utilization_pct: f64,
    pub age_in_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_spend: Option<f64>,
}

/// One entry of the alert feed. Recomputed on every analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Content-derived key; stable across passes for the same finding.
    pub key: String,
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub action: String,
    /// `None` for summary alerts.
    pub entity: Option<EntityRef>,
    pub metrics: AlertMetrics,
}
