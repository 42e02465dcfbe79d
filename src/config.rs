//! Run configuration for the CLI.
//!
//! # Sources
//!
//! - Positional argument: path to the feed CSV (required)
//! - `--chunk-size N`: records per transaction
//! - `--db PATH`: SQLite database file; in-memory when absent
//! - `--strict-inserts`: plain inserts with duplicate-key translation
//! - `ACCOUNT_FEED_CHUNK_SIZE`: chunk size when `--chunk-size` is absent

use crate::error::{FeedError, Result};
use crate::store::InsertMode;
use std::path::PathBuf;

/// Records per chunk when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Environment variable consulted for the chunk size.
pub const CHUNK_SIZE_ENV: &str = "ACCOUNT_FEED_CHUNK_SIZE";

/// Settings for one CLI run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub input: PathBuf,
    pub database: Option<PathBuf>,
    pub chunk_size: usize,
    pub insert_mode: InsertMode,
}

impl FeedConfig {
    /// Builds a config from arguments (excluding the program name) and an
    /// optional chunk size taken from the environment.
    pub fn from_args<I>(args: I, env_chunk_size: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut input = None;
        let mut database = None;
        let mut chunk_size = None;
        let mut insert_mode = InsertMode::Native;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--chunk-size" => {
                    let value = args.next().ok_or_else(|| missing_value("--chunk-size"))?;
                    chunk_size = Some(parse_chunk_size(&value)?);
                }
                "--db" => {
                    let value = args.next().ok_or_else(|| missing_value("--db"))?;
                    database = Some(PathBuf::from(value));
                }
                "--strict-inserts" => insert_mode = InsertMode::Strict,
                flag if flag.starts_with("--") => {
                    return Err(FeedError::InvalidConfiguration(format!(
                        "unknown flag {}",
                        flag
                    )));
                }
                _ if input.is_none() => input = Some(PathBuf::from(&arg)),
                _ => {
                    return Err(FeedError::InvalidConfiguration(format!(
                        "unexpected argument {}",
                        arg
                    )));
                }
            }
        }

        let chunk_size = match (chunk_size, env_chunk_size) {
            (Some(size), _) => size,
            (None, Some(value)) => parse_chunk_size(&value)?,
            (None, None) => DEFAULT_CHUNK_SIZE,
        };

        Ok(FeedConfig {
            input: input.ok_or(FeedError::MissingArgument)?,
            database,
            chunk_size,
            insert_mode,
        })
    }
}

fn missing_value(flag: &str) -> FeedError {
    FeedError::InvalidConfiguration(format!("{} requires a value", flag))
}

/// Parses a chunk size; zero and negative values are rejected.
pub fn parse_chunk_size(value: &str) -> Result<usize> {
    let parsed: i64 = value.trim().parse().map_err(|_| {
        FeedError::InvalidConfiguration(format!("chunk size '{}' is not an integer", value))
    })?;

    if parsed <= 0 {
        return Err(FeedError::InvalidConfiguration(format!(
            "chunk size must be greater than zero, got {}",
            parsed
        )));
    }

    usize::try_from(parsed).map_err(|_| {
        FeedError::InvalidConfiguration(format!("chunk size {} is too large", parsed))
    })
}
