//! strictkv demo client
//!
//! Connects to a store, checks the handshake, writes a string with a TTL,
//! reads it back, waits for it to expire and reads it again.

use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use strictkv::{Facade, MemoryStore, Store, StoreConfig};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "strictkv")]
#[command(about = "Exercise a Redis-compatible store through the strictkv facade")]
struct Args {
    /// Store address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    addr: String,

    /// Store password
    #[arg(short, long, default_value = "")]
    password: String,

    /// Logical database index
    #[arg(long, default_value = "0")]
    db: i64,

    /// Maximum pooled connections
    #[arg(long, default_value = "10")]
    pool_size: usize,

    /// Key to write
    #[arg(short, long, default_value = "strictkv:demo")]
    key: String,

    /// Value to write
    #[arg(short, long, default_value = "hello")]
    value: String,

    /// TTL in milliseconds
    #[arg(short, long, default_value = "1000")]
    ttl_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Use an in-process store instead of connecting to a server
    #[arg(long, default_value = "false")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.in_memory {
        info!("Using in-memory store");
        run_demo(Facade::new(MemoryStore::new()), &args).await
    } else {
        let config = StoreConfig::new(args.addr.clone())
            .password(args.password.clone())
            .db(args.db)
            .pool_size(args.pool_size);
        info!("Connecting to {} (db {})", config.addr, config.db);
        let kv = Facade::from_config(&config).context("invalid store configuration")?;
        run_demo(kv, &args).await
    }
}

async fn run_demo<S: Store>(kv: Facade<S>, args: &Args) -> anyhow::Result<()> {
    let ttl = Duration::from_millis(args.ttl_ms);

    kv.ping().await.context("store handshake failed")?;
    info!("Store answered PONG");

    match kv.create_string_ttl(&args.key, &args.value, ttl).await {
        Ok(()) => info!("Created {} with TTL {:?}", args.key, ttl),
        Err(e) if e.is_already_exists() => {
            warn!("{} already exists, overwriting", args.key);
            kv.put_string_ttl(&args.key, &args.value, ttl).await?;
        }
        Err(e) => return Err(e.into()),
    }

    let value = kv.get_string(&args.key).await?;
    info!("Read {} = {:?}", args.key, value);

    info!("Waiting for expiry...");
    tokio::time::sleep(ttl + Duration::from_millis(100)).await;

    match kv.get_string(&args.key).await {
        Ok(value) => warn!("{} still present after TTL: {:?}", args.key, value),
        Err(e) if e.is_not_found() => info!("{} expired", args.key),
        Err(e) => return Err(e.into()),
    }

    kv.close().await?;
    info!("Closed store");
    Ok(())
}
