//! Concurrent Markov chain builder.
//!
//! This crate builds a word-level Markov chain from a corpus with one of
//! several concurrent strategies and samples text from the result:
//! - Sequential scan, the reference every other strategy reproduces
//! - One unit of work per token on a bounded task pool
//! - Static partitioning across a fixed set of worker threads
//! - Direct inserts, or a bounded channel drained by one or many inserters
//! - Sharded-lock or optimistic compare-and-swap successor tables
//!
//! ```no_run
//! use rs_chain_core::chain::{BuildConfig, StrategyConfig, build_chain};
//! use rs_chain_core::io::tokenize;
//!
//! # fn main() -> rs_chain_core::error::Result<()> {
//! let tokens = tokenize("I am not a number! I am a free man!");
//! let config = BuildConfig::builder()
//! 	.strategy(StrategyConfig::partitioned(4, 2))
//! 	.build()?;
//! let chain = build_chain(&tokens, &config)?;
//! println!("{}", chain.generate(20).join(" "));
//! # Ok(())
//! # }
//! ```

/// Chain tables, build strategies and generation.
pub mod chain;

/// Error type and result alias.
pub mod error;

/// Corpus tokenizing and timing output.
pub mod io;

pub use error::{ChainError, Result};
