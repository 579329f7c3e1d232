use anyhow::Result;
use clap::{Parser, ValueEnum};
use emrcost::aggregator::CostAggregator;
use emrcost::aws::{self, AwsPricingSource, EmrInventory};
use emrcost::config::{Config, PricingSourceKind};
use emrcost::error::CostError;
use emrcost::exit_codes::{codes, exit_code_for_error};
use emrcost::pricing::{PricingSource, StaticRateTable};
use emrcost::progress::{line_item_table, ConsolePrinter};
use emrcost::retry::ExponentialBackoffPolicy;
use emrcost::validation::{validate_cluster_id, validate_region};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emrcost")]
#[command(
    about = "Calculate what an EMR cluster cost",
    long_about = "emrcost adds up the cost of every terminated instance in an EMR cluster.\n\nEach instance is billed per started hour at its group's rate:\n  - spot groups: the group's bid price\n  - on-demand groups: EMR surcharge + EC2 on-demand rate\n\nInstances that are still running are listed but not billed."
)]
#[command(version)]
struct Cli {
    /// EMR cluster ID (e.g., j-2AXXXXXXGAPLF)
    #[arg(short = 'c', long = "cluster-id", value_name = "CLUSTER_ID")]
    cluster_id: String,

    /// AWS region of the cluster (default: config file, then us-east-1)
    #[arg(short, long, value_name = "REGION")]
    region: Option<String>,

    /// Where on-demand rates come from: aws (Price List API) or static (config file)
    #[arg(long, value_name = "SOURCE")]
    pricing_source: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a per-instance cost table after the summary
    #[arg(long)]
    detailed: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err);
        let code = err
            .downcast_ref::<CostError>()
            .map(exit_code_for_error)
            .unwrap_or(codes::SYSTEM_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    validate_cluster_id(&cli.cluster_id)?;

    let config = Config::load(cli.config.as_deref())?;
    let region = config.effective_region(cli.region.as_deref());
    validate_region(&region)?;

    let source = match cli.pricing_source.as_deref() {
        Some(s) => s.parse::<PricingSourceKind>().map_err(CostError::from)?,
        None => config.pricing.source,
    };

    let retry = ExponentialBackoffPolicy::new(config.retry.max_attempts);
    let sdk_config = aws::load_sdk_config(&region).await;

    let inventory = Arc::new(EmrInventory::new(&sdk_config, retry.clone()));
    let pricing: Arc<dyn PricingSource> = match source {
        PricingSourceKind::Aws => Arc::new(AwsPricingSource::new(&sdk_config, retry)),
        PricingSourceKind::Static => Arc::new(StaticRateTable::new(config.pricing.rates.clone())),
    };

    let mut aggregator = CostAggregator::new(inventory, pricing, region);
    if cli.output == OutputFormat::Text {
        aggregator = aggregator.with_observer(Arc::new(ConsolePrinter));
    }

    let report = aggregator.cluster_cost(&cli.cluster_id).await?;

    match cli.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(CostError::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if cli.detailed {
                println!("{}", line_item_table(&report));
            }
        }
    }

    Ok(())
}
