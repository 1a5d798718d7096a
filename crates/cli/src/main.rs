//! Command line interface for the OHLCV indexer.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ohlcv_api::{ApiServer, AppState, ServerConfig};
use ohlcv_data::{DEFAULT_CANDLE_LIMIT, Database, MemoryStore, Store};
use ohlcv_domain::{ChainEvent, Interval, PairId};
use ohlcv_indexer::prelude::*;
use std::env;
use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "ohlcv")]
#[command(about = "Chain event indexer producing OHLCV candles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Migrate,
    /// Index a file of JSON events, one per line
    Index {
        /// Events file
        #[arg(short, long)]
        events: PathBuf,

        /// Indexer config file (defaults to OHLCV_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Index into memory instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the latest candles of a pair
    Candles {
        /// Pair id
        #[arg(short, long)]
        pair: String,

        /// Interval label (1m, 5m, 15m, 1h, 4h, 1d, 1w)
        #[arg(short, long, default_value = "1h")]
        interval: Interval,

        /// Number of candles
        #[arg(short, long, default_value_t = DEFAULT_CANDLE_LIMIT)]
        limit: usize,
    },
    /// Serve the HTTP API
    Serve {
        /// Bind address (defaults to OHLCV_BIND, then 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            let db = connect().await?;
            db.migrate().await.context("migration failed")?;
            println!("✅ Schema is up to date");
        }
        Commands::Index {
            events,
            config,
            dry_run,
        } => {
            let config = load_config(config)?;
            let events = read_events(&events)?;
            println!("📡 Indexing {} events on {}...", events.len(), config.network);

            let store: Arc<dyn Store> = if dry_run {
                Arc::new(MemoryStore::new())
            } else {
                Arc::new(connect().await?.store())
            };
            let indexer = Indexer::new(store.clone(), config)?;
            let stats = indexer.run(events).await?;

            println!("\n📊 Indexing Results");
            println!("════════════════════════════════════");
            println!("Trades applied:  {}", stats.applied);
            println!("Listings:        {}", stats.listings);
            println!("Candle writes:   {}", stats.candles);
            println!("Duplicates:      {}", stats.duplicates);
            println!("Skipped:         {}", stats.skipped);
            println!("Ignored:         {}", stats.ignored);
            println!("Late:            {}", stats.late);
            println!("════════════════════════════════════");

            if dry_run {
                for pair in store.pairs().await? {
                    println!("{}  {}/{}", pair.id, pair.token0, pair.token1);
                }
            }
        }
        Commands::Candles {
            pair,
            interval,
            limit,
        } => {
            let store = connect().await?.store();
            let pair = PairId::from(pair);
            let candles = store.latest_candles(&pair, interval, limit).await?;

            if candles.is_empty() {
                println!("❌ No {interval} candles for {pair}");
                return Ok(());
            }

            println!(
                "{:<20} | {:<14} | {:<14} | {:<14} | {:<14} | {:<14} | {:<6}",
                "Time", "Open", "High", "Low", "Close", "Volume", "Trades"
            );
            println!("{}", "-".repeat(114));
            for candle in candles {
                let datetime = chrono::DateTime::from_timestamp(candle.bucket_start as i64, 0)
                    .unwrap_or_default();
                println!(
                    "{:<20} | {:<14} | {:<14} | {:<14} | {:<14} | {:<14} | {:<6}",
                    datetime.format("%Y-%m-%d %H:%M"),
                    candle.open.round_dp(6),
                    candle.high.round_dp(6),
                    candle.low.round_dp(6),
                    candle.close.round_dp(6),
                    candle.volume.round_dp(6),
                    candle.trades
                );
            }
        }
        Commands::Serve { bind } => {
            let bind = match bind {
                Some(bind) => bind,
                None => match env::var("OHLCV_BIND") {
                    Ok(raw) => raw.parse().context("OHLCV_BIND is not a socket address")?,
                    Err(_) => ServerConfig::default().bind,
                },
            };
            let store = Arc::new(connect().await?.store());
            ApiServer::new(ServerConfig { bind }, AppState::new(store))
                .run()
                .await?;
        }
    }

    Ok(())
}

async fn connect() -> Result<Database> {
    let url = env::var("DATABASE_URL").context("DATABASE_URL must be set in .env or environment")?;
    let db = Database::connect(&url)
        .await
        .context("failed to connect to the database")?;
    info!("Connected to database");
    Ok(db)
}

/// Config from the given path, else `OHLCV_CONFIG`, else defaults.
fn load_config(path: Option<PathBuf>) -> Result<IndexerConfig> {
    let path = path.or_else(|| env::var("OHLCV_CONFIG").ok().map(PathBuf::from));
    match path {
        Some(path) => IndexerConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(IndexerConfig::default()),
    }
}

/// Reads one JSON event per line, skipping blank lines.
fn read_events(path: &Path) -> Result<Vec<ChainEvent>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    parse_events(BufReader::new(file))
}

fn parse_events(reader: impl BufRead) -> Result<Vec<ChainEvent>> {
    let mut events = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {}", number + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SWAP: &str = r#"{"kind":"swap","address":"0x00000000000000000000000000000000000000aa","block_number":1,"log_index":0,"timestamp":1700000000,"args":{"token_in":"0x0000000000000000000000000000000000000002","token_out":"0x0000000000000000000000000000000000000001","amount_in":"2000000000","amount_out":"1000000000000000000"}}"#;

    #[test]
    fn test_parse_events_skips_blank_lines() {
        let input = format!("{SWAP}\n\n  \n{SWAP}\n");
        let events = parse_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_events_reports_line() {
        let input = format!("{SWAP}\nnot json\n");
        let err = parse_events(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_dry_run_pipeline() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        config
            .write_all(
                br#"{"tokens": [
                    {"address": "0x0000000000000000000000000000000000000001", "decimals": 18},
                    {"address": "0x0000000000000000000000000000000000000002", "decimals": 6}
                ]}"#,
            )
            .unwrap();
        let mut events = tempfile::NamedTempFile::new().unwrap();
        writeln!(events, "{SWAP}").unwrap();

        let config = load_config(Some(config.path().to_path_buf())).unwrap();
        let events = read_events(events.path()).unwrap();
        let store = Arc::new(MemoryStore::new());
        let indexer = Indexer::new(store.clone(), config).unwrap();
        let stats = indexer.run(events).await.unwrap();

        assert_eq!(stats.applied, 1);
        assert_eq!(store.pairs().await.unwrap().len(), 1);
    }
}
