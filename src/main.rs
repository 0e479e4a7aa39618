use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use parcel_scout::apis::{CityParcelRegistry, CountyTaxAssessor, GoogleGeocoder, ZillowListingSource};
use parcel_scout::app::ports::HttpClientPort;
use parcel_scout::config::Config;
use parcel_scout::infra::{CsvReportAdapter, FixedIntervalLimiter, ReqwestHttp};
use parcel_scout::logging;
use parcel_scout::pipeline::{EnrichmentPipeline, PipelineSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "parcel_scout")]
#[command(about = "Find for-sale homes and enrich them with address and parcel data")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, enrich and write the listings report
    Run(RunArgs),
    /// Load and validate the configuration, then print it
    CheckConfig {
        /// Path to config file (defaults to ./config.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Path to config file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum listing price to keep
    #[arg(long)]
    max_price: Option<u64>,
    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Delay between parcel registry lookups, in milliseconds
    #[arg(long)]
    rate_limit_ms: Option<u64>,
    /// Retries for transient lookup failures
    #[arg(long)]
    max_retries: Option<u32>,
    /// Also look up the latest property tax per parcel
    #[arg(long)]
    with_tax: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(max_price) = self.max_price {
            config.search.max_price = max_price;
        }
        if let Some(rate_limit_ms) = self.rate_limit_ms {
            config.parcel_registry.rate_limit_ms = rate_limit_ms;
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if self.with_tax {
            config.tax_assessment.enabled = true;
        }
    }
}

fn build_pipeline(config: &Config, output: PathBuf) -> anyhow::Result<EnrichmentPipeline> {
    let http: Arc<dyn HttpClientPort> =
        Arc::new(ReqwestHttp::new(&config.http).context("building HTTP client")?);

    let pipeline = EnrichmentPipeline::new(
        Box::new(ZillowListingSource::new(http.clone(), &config.listing_source)),
        Box::new(GoogleGeocoder::new(http.clone(), &config.geocoder)),
        Box::new(CityParcelRegistry::new(http.clone(), &config.parcel_registry)),
        Box::new(FixedIntervalLimiter::from_millis(config.parcel_registry.rate_limit_ms)),
        Box::new(CsvReportAdapter::new(output)),
        PipelineSettings::from_config(config),
    );

    Ok(if config.tax_assessment.enabled {
        pipeline.with_tax_assessor(Box::new(CountyTaxAssessor::new(http, &config.tax_assessment)))
    } else {
        pipeline
    })
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);

    if config.geocoder.api_key().is_none() {
        info!(
            "{} is not set; geocoding without an API key",
            config.geocoder.api_key_env
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.resolve_path());
    let pipeline = build_pipeline(&config, output)?;

    println!("🚀 Running listing pipeline (max price ${})...", config.search.max_price);
    let result = pipeline.run().context("pipeline run failed")?;

    println!("\n📊 Pipeline Results for {}:", result.source);
    println!("   Fetched: {}", result.fetched);
    println!("   Removed by price: {}", result.removed_by_price);
    println!("   Dropped without address: {}", result.dropped_without_address);
    println!("   Parcels not found: {}", result.parcels_not_found);
    println!("   Square footage missing: {}", result.square_feet_missing);
    println!("   Retries: {}", result.retries);
    println!("   Written: {}", result.written);
    println!("   Output file: {}", result.output);
    Ok(())
}

fn check_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(path.as_deref()).context("loading configuration")?;
    println!("{}", config.to_toml()?);
    println!("✅ Configuration is valid");
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Run(args) => run(args),
        Commands::CheckConfig { config } => check_config(config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
