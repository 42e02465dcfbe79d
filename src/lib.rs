//! # Account Feed
//!
//! Applies an ordered feed of account change records to a persistent account
//! table, one bounded chunk per transaction.
//!
//! ## Design Principles
//!
//! - **Chunk atomicity**: each chunk commits fully or not at all
//! - **Deterministic order**: records apply grouped by account in
//!   first-appearance order, each group in feed order
//! - **Local recovery**: duplicate inserts and missing targets are reported
//!   through an [`EventSink`] and never abort a chunk
//! - **Fail fast**: any other failure rolls back its chunk and stops the run;
//!   earlier chunks stay committed
//!
//! ## Example
//!
//! ```no_run
//! use account_feed::{FeedProcessor, LogSink, SqliteAccountStore};
//! use std::io::Cursor;
//!
//! let csv = "operation,account_id,name,phone\ninsert,A1,Alice,111\n";
//! let store = SqliteAccountStore::open_in_memory().unwrap();
//! let mut processor = FeedProcessor::new(store, LogSink);
//! processor.process_csv(Cursor::new(csv), 500).unwrap();
//! processor.write_output(std::io::stdout()).unwrap();
//! ```

pub mod account;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod feed;
pub mod grouping;
pub mod partition;
pub mod processor;
pub mod record;
pub mod store;

pub use account::Account;
pub use config::{FeedConfig, DEFAULT_CHUNK_SIZE};
pub use coordinator::{apply_chunk, ChunkReport};
pub use dispatch::{dispatch, Outcome};
pub use error::{FeedError, Result, StoreError, StoreResult};
pub use events::{EventSink, FeedEvent, LogSink, RecordingSink};
pub use feed::read_feed;
pub use grouping::{group_by_account, AccountGroups};
pub use partition::{partition, Chunk};
pub use processor::{FeedProcessor, RunStats};
pub use record::{FeedRecord, FeedRow, OperationKind};
pub use store::{
    AccountStore, InsertMode, InsertOutcome, MemoryAccountStore, SqliteAccountStore, StoreScope,
};
