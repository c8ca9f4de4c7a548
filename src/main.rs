use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{modifiers, presets, Attribute, Cell, Color, ContentArrangement, Table};
use futures::future::join_all;
use poolstats::config::{self, CONFIG_FILE_PATH};
use poolstats::hashrate::HashRateValue;
use poolstats::logger::{self, LogTag};
use poolstats::pools::{
    self, HttpClient, MemoryDifficultyStore, PoolAddressData, PoolClient, PoolConfig, PoolContext,
    PoolSource,
};
use poolstats::setup;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "poolstats")]
#[command(about = "Poll mining pools and show normalized worker stats", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    config: String,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Command,
}

/// Accepted here so clap does not reject them; the logger reads them from argv
#[derive(Args)]
#[allow(dead_code)]
struct LoggingArgs {
    /// Show raw upstream payloads
    #[arg(long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(long, global = true)]
    quiet: bool,

    #[arg(long = "debug-all", global = true)]
    debug_all: bool,

    #[arg(long = "debug-pool", global = true)]
    debug_pool: bool,

    #[arg(long = "debug-api", global = true)]
    debug_api: bool,

    #[arg(long = "debug-config", global = true)]
    debug_config: bool,

    #[arg(long = "debug-setup", global = true)]
    debug_setup: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Poll every configured pool until interrupted
    Poll {
        /// Seconds between polls, overrides monitor.poll_interval_secs
        #[arg(short, long, conflicts_with = "once")]
        interval: Option<u64>,

        /// Poll a single time and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate the configured pool entries against the live pools
    Validate {
        /// Write the completed entries back to the config file
        #[arg(long)]
        save: bool,
    },
    /// List supported pool sources and their coins
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Sources => {
            print_sources();
            Ok(())
        }
        Command::Poll { interval, once } => {
            config::load_config_from_path(&cli.config).map_err(|e| anyhow!(e))?;
            let configured = config::with_config(|cfg| cfg.monitor.poll_interval_secs);
            run_poll(poll_interval(once, interval, configured)).await
        }
        Command::Validate { save } => {
            config::load_config_from_path(&cli.config).map_err(|e| anyhow!(e))?;
            run_validate(save, &cli.config).await
        }
    }
}

fn http_client() -> Result<HttpClient> {
    let timeout = config::with_config(|cfg| cfg.monitor.request_timeout_secs);
    HttpClient::new(timeout).map_err(|e| anyhow!(e))
}

fn display_title(pool: &PoolConfig) -> String {
    if pool.title.is_empty() {
        format!("{} - {}", pool.pool_key, pool.address)
    } else {
        pool.title.clone()
    }
}

// ============================================================================
// POLL
// ============================================================================

/// Seconds between polls, `None` for a single poll
fn poll_interval(once: bool, flag: Option<u64>, configured: u64) -> Option<u64> {
    if once {
        return None;
    }
    Some(flag.unwrap_or(configured).max(1))
}

async fn run_poll(interval: Option<u64>) -> Result<()> {
    let settings = config::get_config_clone();
    if settings.pools.is_empty() {
        logger::warning(LogTag::System, "No pools configured");
        return Ok(());
    }

    let http = http_client()?;
    let store = Arc::new(MemoryDifficultyStore::new());

    // Clients live across rounds so per-client state survives between polls
    let mut clients: Vec<(PoolConfig, Box<dyn PoolClient>)> = Vec::new();
    for pool in settings.pools {
        let context = PoolContext::new(pool.clone())
            .with_http_client(http.clone())
            .with_difficulty_store(store.clone());

        match pools::select(&pool.pool_key, context) {
            Ok(client) => clients.push((pool, client)),
            Err(e) => logger::error(
                LogTag::Config,
                &format!("Skipping '{}': {}", display_title(&pool), e),
            ),
        }
    }

    logger::info(LogTag::System, &format!("Polling {} pools", clients.len()));

    let Some(seconds) = interval else {
        poll_once(&clients, &store).await;
        return Ok(());
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(seconds));
    loop {
        tokio::select! {
            _ = ticker.tick() => poll_once(&clients, &store).await,
            _ = tokio::signal::ctrl_c() => {
                logger::info(LogTag::System, "Stopping");
                return Ok(());
            }
        }
    }
}

async fn poll_once(clients: &[(PoolConfig, Box<dyn PoolClient>)], store: &MemoryDifficultyStore) {
    let results = join_all(clients.iter().map(|(pool, client)| async move {
        (pool, client.get_data().await)
    }))
    .await;

    for (pool, result) in results {
        let title = display_title(pool);
        match result {
            Ok(data) => {
                store.record_poll(&data);
                logger::log_poll_summary(&title, &data);
                println!("{}", worker_table(&data));
            }
            Err(e) if e.is_recoverable() => {
                logger::warning(LogTag::Pool, &format!("{}: {}", title, e));
            }
            Err(e) => {
                logger::error(LogTag::Pool, &format!("{}: {}", title, e));
            }
        }
    }
}

fn worker_table(data: &PoolAddressData) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Worker").add_attribute(Attribute::Bold),
        Cell::new("Hash rate").add_attribute(Attribute::Bold),
        Cell::new("Best difficulty").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
    ]);

    for worker in &data.workers {
        let hash_rate = worker
            .hash_rate
            .map(|gh| HashRateValue::from_magnitude(gh * 1e9).to_string())
            .unwrap_or_else(|| "-".to_string());
        let best = worker
            .best_difficulty
            .map(|d| format!("{}", d))
            .unwrap_or_else(|| "-".to_string());
        let status = if worker.is_online {
            Cell::new("online").fg(Color::Green)
        } else {
            Cell::new("offline").fg(Color::Red)
        };

        table.add_row(vec![Cell::new(&worker.name), Cell::new(hash_rate), Cell::new(best), status]);
    }

    table
}

// ============================================================================
// VALIDATE
// ============================================================================

async fn run_validate(save: bool, path: &str) -> Result<()> {
    let settings = config::get_config_clone();
    let http = http_client()?;

    let mut validated = Vec::with_capacity(settings.pools.len());
    let mut failures = 0;

    for pool in settings.pools {
        let context = PoolContext::new(pool.clone()).with_http_client(http.clone());
        match setup::validate_entry(context).await {
            Ok(entry) => {
                println!("{}  ({})", entry.title, entry.unique_id);
                validated.push(entry);
            }
            Err(e) => {
                failures += 1;
                println!("{}  [{}] {}", display_title(&pool), e.error_key(), e);
                validated.push(pool);
            }
        }
    }

    if save {
        config::update_config(|cfg| cfg.pools = validated).map_err(|e| anyhow!(e))?;
        config::save_config(Some(path)).map_err(|e| anyhow!(e))?;
        logger::info(LogTag::Config, &format!("Saved {}", path));
    }

    if failures > 0 {
        return Err(anyhow!("{} pool entries failed validation", failures));
    }
    Ok(())
}

// ============================================================================
// SOURCES
// ============================================================================

fn print_sources() {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);

    table.set_header(vec!["Key", "Name", "Coins", "Needs"]);

    for source in PoolSource::ALL {
        let coins = match source.fixed_coin() {
            Some(coin) => coin.name(),
            None if source.coins().is_empty() => "reported by pool".to_string(),
            None => source.coins().join(", "),
        };

        let mut needs = Vec::new();
        if source.requires_pool_url() {
            needs.push("pool_url");
        }
        if source.requires_api_key() {
            needs.push("api_key");
        }
        if source.requires_account_id() {
            needs.push("account_id");
        }

        table.add_row(vec![
            source.key().to_string(),
            source.name().to_string(),
            coins,
            needs.join(", "),
        ]);
    }

    println!("{}", table);
}
