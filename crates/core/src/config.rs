use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_PULSE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Location of the exported `campaigns`, `adsets` and
/// `creative_performance` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_campaigns_path")]
    pub campaigns_path: String,
    #[serde(default = "default_adsets_path")]
    pub adsets_path: String,
    #[serde(default = "default_ads_path")]
    pub ads_path: String,
    /// Rows beyond this cap are dropped per collection.
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "pulse-01".to_string()
}
fn default_campaigns_path() -> String {
    "data/campaigns.json".to_string()
}
fn default_adsets_path() -> String {
    "data/adsets.json".to_string()
}
fn default_ads_path() -> String {
    "data/creative_performance.json".to_string()
}
fn default_row_limit() -> usize {
    10_000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            campaigns_path: default_campaigns_path(),
            adsets_path: default_adsets_path(),
            ads_path: default_ads_path(),
            row_limit: default_row_limit(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            source: SourceConfig::default(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_PULSE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
