//! Account Feed CLI
//!
//! Reads an account change feed from CSV, applies it chunk by chunk to a
//! SQLite account table, and writes the resulting table to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- feed.csv --chunk-size 500 --db accounts.sqlite > accounts.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `ACCOUNT_FEED_CHUNK_SIZE`: Chunk size when `--chunk-size` is not given

use account_feed::config::CHUNK_SIZE_ENV;
use account_feed::{FeedConfig, FeedProcessor, LogSink, Result, SqliteAccountStore};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = FeedConfig::from_args(env::args().skip(1), env::var(CHUNK_SIZE_ENV).ok())?;

    let file = File::open(&config.input)?;
    let reader = BufReader::new(file);

    let store = match &config.database {
        Some(path) => SqliteAccountStore::open(path)?,
        None => SqliteAccountStore::open_in_memory()?,
    }
    .with_insert_mode(config.insert_mode);

    let mut processor = FeedProcessor::new(store, LogSink);
    processor.process_csv(reader, config.chunk_size)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    processor.write_output(handle)?;

    Ok(())
}
