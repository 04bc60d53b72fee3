//! Command Line Interface for the XLMFISH market toolkit.
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use render::RunReport;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xlmfish_data::JsonCache;
use xlmfish_data::cache::FileStore;
use xlmfish_domain::chart::{ChartMetric, DEFAULT_MIN_OTHER_PCT, DatasetOptions, DisplaySize, TopN};
use xlmfish_domain::enums::RunState;
use xlmfish_domain::pool::PoolSort;
use xlmfish_market::{MarketConfig, MarketService, PoolQuery};

#[derive(Parser)]
#[command(name = "xlmfish")]
#[command(about = "XLMFISH market and liquidity pool data from Stellar Horizon", long_about = None)]
struct Cli {
    /// Horizon server URL
    #[arg(long, global = true)]
    horizon_url: Option<String>,

    /// CoinGecko API root
    #[arg(long, global = true)]
    coingecko_url: Option<String>,

    /// Cache file shared between runs
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,

    /// Keep the cache in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show price, 24h volume, supply and market cap
    Market {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// List liquidity pools and their distribution
    Pools {
        /// usd-desc, usd-asc, liquidity-desc, liquidity-asc, name-asc or name-desc
        #[arg(long, default_value = "usd-desc")]
        sort: PoolSort,

        /// Only show pools whose name contains TEXT
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// Categories kept before "Other"
        #[arg(long, conflicts_with = "width")]
        top_n: Option<usize>,

        /// Display width in pixels used to pick the category count
        #[arg(long, value_name = "PX")]
        width: Option<u32>,

        /// usd or liquidity; picked from the data when omitted
        #[arg(long)]
        metric: Option<ChartMetric>,

        /// Smallest share of the total (0.01 = 1%) shown as "Other"
        #[arg(long, default_value_t = DEFAULT_MIN_OTHER_PCT)]
        min_other_pct: Decimal,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = MarketConfig::from_env()?;
    if let Some(url) = &cli.horizon_url {
        config.horizon_url = url.clone();
    }
    if let Some(url) = &cli.coingecko_url {
        config.coingecko_url = url.clone();
    }
    if let Some(path) = &cli.cache_file {
        config.cache_path = path.clone();
    }

    let cache = if cli.no_persist {
        JsonCache::in_memory()
    } else {
        JsonCache::new(Arc::new(
            FileStore::new(&config.cache_path).with_quota(config.cache_quota),
        ))
    };
    let service = MarketService::connect(config, cache)?;

    match cli.command {
        Commands::Market { json, watch } => {
            watch_loop(watch, || run_market(&service, json)).await;
        }
        Commands::Pools {
            sort,
            search,
            top_n,
            width,
            metric,
            min_other_pct,
            json,
            watch,
        } => {
            let top_n = match (top_n, width) {
                (Some(n), _) => TopN::Explicit(n),
                (None, Some(px)) => TopN::Auto(DisplaySize::from_width(px)),
                (None, None) => TopN::default(),
            };
            let query = PoolQuery {
                sort,
                search,
                dataset: DatasetOptions {
                    metric,
                    top_n,
                    min_other_pct,
                },
            };
            watch_loop(watch, || run_pools(&service, &query, json)).await;
        }
    }

    service.settle().await;
    Ok(())
}

/// Runs `render` once, or every `watch` seconds until Ctrl-C.
async fn watch_loop<F, Fut>(watch: Option<u64>, mut render: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let Some(secs) = watch else {
        render().await;
        return;
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = interval.tick() => render().await,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }
}

async fn run_market(service: &MarketService, json: bool) {
    let mut state = RunState::default();
    state.start();

    let snapshot = service.market_overview().await;
    state.succeed();
    info!(state = ?state, "Market run finished");

    if json {
        print_json(&RunReport::new(&state, Some(&snapshot)));
        return;
    }
    let asset = &service.config().asset;
    println!("{} market", asset.short_code());
    render::market_table(asset, &snapshot).printstd();
}

async fn run_pools(service: &MarketService, query: &PoolQuery, json: bool) {
    let mut state = RunState::default();
    state.start();

    let overview = match service.pool_overview(query).await {
        Ok(overview) => {
            state.succeed();
            Some(overview)
        }
        Err(e) => {
            error!(error = %e, "Pool overview failed");
            state.fail(render::POOLS_ERROR);
            None
        }
    };
    info!(state = ?state, "Pools run finished");

    if json {
        print_json(&RunReport::new(&state, overview.as_ref()));
        return;
    }

    let asset = &service.config().asset;
    let Some(overview) = overview else {
        for line in render::pool_summary_placeholder() {
            println!("{line}");
        }
        render::pools_placeholder().printstd();
        return;
    };

    for line in render::pool_summary(asset, &overview) {
        println!("{line}");
    }
    if overview.pools.is_empty() {
        println!("No pools found");
    } else {
        render::pools_table(asset, &overview).printstd();
    }
    println!();
    println!("Distribution by {}", overview.metric);
    render::dataset_table(overview.metric, &overview.dataset).printstd();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => error!(error = %e, "Could not serialize output"),
    }
}
