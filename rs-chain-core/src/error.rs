//! Error type shared by the chain builder and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ChainError> = std::result::Result<T, E>;

/// Failures that can stop a build before the table is complete.
///
/// A corpus shorter than the prefix length is not an error: it simply
/// produces a partially seeded table.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Build configuration failed validation.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Filesystem error with the path being processed, when known.
	#[error("io error while processing {path:?}: {source}")]
	Io {
		source: std::io::Error,
		path: Option<PathBuf>,
	},

	/// The bounded task pool could not be created.
	#[error("unable to configure task pool: {0}")]
	ThreadPool(String),

	/// An OS thread could not be spawned.
	#[error("unable to spawn {role} thread: {source}")]
	Spawn {
		role: &'static str,
		source: std::io::Error,
	},

	/// A worker or inserter panicked while the build was running.
	#[error("{0} thread panicked during build")]
	WorkerPanicked(&'static str),

	/// Producers found the work channel closed before they were done.
	#[error("work channel closed while producers were still publishing")]
	ChannelClosed,
}

impl ChainError {
	/// Wraps an IO error, attaching the path that caused it.
	pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
		Self::Io { source, path }
	}
}
