//! Markov chain construction and sampling.
//!
//! This module provides:
//! - The rolling word window used as lookup key (`Prefix`)
//! - Two interchangeable concurrent successor tables (`ShardedTable`, `OptimisticTable`)
//! - Build strategies: sequential, one task per token, partitioned workers,
//!   each optionally feeding the table through a bounded channel
//! - Text generation from a finished chain

/// Build entry points and the finished, read-only `Chain`.
pub mod builder;

/// Random walk over a finished table.
pub mod generator;

/// Fixed-length rolling window of words.
pub mod prefix;

/// Table trait and backend selection.
pub mod table;

/// Mutex-sharded table.
pub mod sharded_table;

/// Compare-and-swap table over immutable snapshots.
pub mod optimistic_table;

/// Strategy and build configuration.
pub mod strategy;

/// Build timing and counters.
pub mod report;

/// Segments processed by fixed workers.
pub mod partitioned;

/// One unit of work per token, on a bounded task pool.
mod per_token;

/// Bounded channel between producers and inserters.
mod pipeline;

pub use builder::{Chain, ChainBuilder, build_chain, canonicalize};
pub use generator::generate;
pub use optimistic_table::OptimisticTable;
pub use partitioned::partition_bounds;
pub use prefix::Prefix;
pub use report::{BuildReport, CSV_HEADER};
pub use sharded_table::ShardedTable;
pub use strategy::{BuildConfig, BuildConfigBuilder, BuildMode, StrategyConfig};
pub use table::{ChainTable, TableBackend};
