use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use serviceinfo::cache::{CacheConfig, CachedServiceStore};
use serviceinfo::domain::{ReadMode, ServiceSource};
use serviceinfo::filter::ServiceFilter;
use serviceinfo::ingest::ingest_message;
use serviceinfo::reference::StaticReferenceData;
use serviceinfo::store::{RedisBackend, ServiceStore, SharedBackend, StoreConfig};
use serviceinfo::web::{AppState, ServiceResult, create_router};

/// Transit service update ingestion and lookup
#[derive(Debug, Parser)]
#[command(name = "serviceinfo", version)]
struct Args {
    /// Redis connection URL
    #[arg(
        long,
        global = true,
        env = "SERVICEINFO_REDIS_URL",
        default_value = serviceinfo::store::DEFAULT_URL
    )]
    redis_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse ARNU message files and store their services
    Ingest {
        /// Partition to store under (scheduled or actual)
        #[arg(long)]
        source: ServiceSource,

        /// Reference data JSON file
        #[arg(long, value_name = "FILE")]
        reference: PathBuf,

        /// Only store services matching this filter JSON file
        #[arg(long, value_name = "FILE")]
        filter: Option<PathBuf>,

        /// Message files
        #[arg(required = true, value_name = "MESSAGE")]
        messages: Vec<PathBuf>,
    },

    /// Print the services with a number on a date as JSON
    Show {
        /// Service date (YYYY-MM-DD)
        date: NaiveDate,

        number: u32,

        /// merged, scheduled or actual
        #[arg(long, default_value = "merged")]
        source: ReadMode,
    },

    /// Serve the lookup API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: SocketAddr,

        /// Lifetime of cached lookups, and so the delay before services
        /// ingested by another process are served
        #[arg(long, default_value_t = 60)]
        cache_ttl_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = StoreConfig::new(args.redis_url);
    let backend: SharedBackend = Arc::new(RedisBackend::connect(&config).await?);

    match args.command {
        Command::Ingest {
            source,
            reference,
            filter,
            messages,
        } => {
            let reference = StaticReferenceData::from_file(&reference)?;
            let filter = filter.map(ServiceFilter::from_file).transpose()?;
            let store = ServiceStore::new(backend);

            let mut stored = 0;
            for path in &messages {
                let raw = match std::fs::read(path) {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable message");
                        continue;
                    }
                };
                match ingest_message(&raw, &reference, filter.as_ref(), &store, source).await {
                    Ok(Some(report)) => stored += report.stored,
                    Ok(None) => warn!(path = %path.display(), "skipping malformed message"),
                    Err(e) => error!(path = %path.display(), error = %e, "failed to ingest message"),
                }
            }
            info!(files = messages.len(), stored, "ingest finished");
        }

        Command::Show {
            date,
            number,
            source,
        } => {
            let store = ServiceStore::new(backend);
            match store.get_service(date, number, source).await? {
                Some(services) => {
                    let results: Vec<ServiceResult> = services.iter().map(ServiceResult::from).collect();
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                None => {
                    eprintln!("No service {number} on {date}");
                    std::process::exit(1);
                }
            }
        }

        Command::Serve {
            listen,
            cache_ttl_secs,
        } => {
            let cache_config = CacheConfig::default().with_ttl(Duration::from_secs(cache_ttl_secs));
            let store = CachedServiceStore::new(ServiceStore::new(backend), &cache_config);
            let app = create_router(AppState::new(store));

            let listener = tokio::net::TcpListener::bind(listen).await?;
            info!("listening on http://{listen}");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
