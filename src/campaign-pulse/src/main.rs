//! Campaign Pulse — performance classification and alerting for ad accounts.
//!
//! Reads exported campaign, ad set and ad rows, classifies every entity and
//! prints or serves the resulting alert feed.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pulse_analyzer::{AlertPipeline, AnalysisOptions};
use pulse_api::ApiServer;
use pulse_core::config::AppConfig;
use pulse_source::JsonFileSource;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-pulse")]
#[command(about = "Performance classification and alerting for ad campaigns")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_PULSE__NODE_ID")]
    node_id: Option<String>,

    /// Campaigns export (overrides config)
    #[arg(long, env = "CAMPAIGN_PULSE__SOURCE__CAMPAIGNS_PATH")]
    campaigns: Option<String>,

    /// Ad sets export (overrides config)
    #[arg(long, env = "CAMPAIGN_PULSE__SOURCE__ADSETS_PATH")]
    adsets: Option<String>,

    /// Creative performance export (overrides config)
    #[arg(long, env = "CAMPAIGN_PULSE__SOURCE__ADS_PATH")]
    ads: Option<String>,

    /// Maximum rows read per collection (overrides config)
    #[arg(long, env = "CAMPAIGN_PULSE__SOURCE__ROW_LIMIT")]
    row_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one analysis pass and print the alert feed as JSON
    Analyze {
        /// Only analyze this campaign and its ad sets and ads
        #[arg(long)]
        campaign_id: Option<String>,

        /// Reference time for entity ages (RFC 3339), defaults to now
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,

        /// Print per-severity and per-category counts instead of alerts
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    /// Serve the alert feed over HTTP
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_PULSE__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Start the Prometheus exporter
        #[arg(long, default_value_t = false)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `analyze` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_pulse=info,pulse_analyzer=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(path) = cli.campaigns {
        config.source.campaigns_path = path;
    }
    if let Some(path) = cli.adsets {
        config.source.adsets_path = path;
    }
    if let Some(path) = cli.ads {
        config.source.ads_path = path;
    }
    if let Some(limit) = cli.row_limit {
        config.source.row_limit = limit;
    }

    info!(
        node_id = %config.node_id,
        campaigns = %config.source.campaigns_path,
        adsets = %config.source.adsets_path,
        ads = %config.source.ads_path,
        row_limit = config.source.row_limit,
        "Configuration loaded"
    );

    let pipeline = AlertPipeline::new(Arc::new(JsonFileSource::new(&config.source)));

    match cli.command {
        Command::Analyze {
            campaign_id,
            as_of,
            summary,
        } => {
            let options = AnalysisOptions { as_of, campaign_id };
            let report = pipeline.analyze(&options).await;
            let out = if summary {
                serde_json::to_string_pretty(&report.summary())?
            } else {
                serde_json::to_string_pretty(&report.alerts)?
            };
            println!("{out}");
        }
        Command::Serve { http_port, metrics } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            config.metrics.enabled |= metrics;

            let server = ApiServer::new(config.clone(), pipeline);
            if config.metrics.enabled {
                if let Err(e) = server.start_metrics() {
                    error!(error = %e, "Failed to start metrics exporter");
                }
            }

            info!(http_port = config.api.http_port, "Campaign Pulse is ready to serve traffic");
            server.start_http().await?;
        }
    }

    Ok(())
}
