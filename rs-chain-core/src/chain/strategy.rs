use std::fmt;

use serde::{Deserialize, Serialize};

use super::table::TableBackend;
use crate::error::{ChainError, Result};

/// Default number of words in a prefix.
pub const DEFAULT_PREFIX_LEN: usize = 2;

/// Default depth of the work channel feeding inserters.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Default number of table shards (or optimistic buckets).
pub const DEFAULT_SHARDS: usize = 64;

/// How the token sequence is split into units of work.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
	/// One thread walks the whole sequence.
	Sequential,
	/// One unit of work per token position, run on a bounded task pool.
	PerToken,
	/// Contiguous segments, one per worker thread.
	Partitioned,
}

impl BuildMode {
	/// Returns the kebab-case label used in logs, CSV rows and JSON output.
	pub fn name(self) -> &'static str {
		match self {
			BuildMode::Sequential => "sequential",
			BuildMode::PerToken => "per-token",
			BuildMode::Partitioned => "partitioned",
		}
	}
}

/// Which build algorithm to run.
///
/// `inserters` selects how units of work reach the table:
/// - `0`: every unit inserts directly,
/// - `1`: units publish to a bounded channel drained by one inserter,
/// - `n > 1`: the same channel is drained by `n` competing inserters.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StrategyConfig {
	pub mode: BuildMode,
	/// Worker threads; only meaningful for `Partitioned`.
	pub workers: usize,
	/// Channel consumers; ignored by `Sequential`.
	pub inserters: usize,
}

impl StrategyConfig {
	/// The single-threaded reference scan.
	pub fn sequential() -> Self {
		Self { mode: BuildMode::Sequential, workers: 1, inserters: 0 }
	}

	/// One unit of work per token position.
	///
	/// # Parameters
	/// - `inserters`: channel consumers; `0` lets every unit insert directly.
	pub fn per_token(inserters: usize) -> Self {
		Self { mode: BuildMode::PerToken, workers: 0, inserters }
	}

	/// Contiguous segments scanned by `workers` threads.
	///
	/// # Parameters
	/// - `workers`: number of segments; must be at least 1 once validated.
	/// - `inserters`: channel consumers; `0` lets every worker insert directly.
	///
	/// # Notes
	/// Workers beyond the number of tokens get empty segments and are never
	/// spawned.
	pub fn partitioned(workers: usize, inserters: usize) -> Self {
		Self { mode: BuildMode::Partitioned, workers, inserters }
	}

	/// Maps a `(workers, inserters)` pair onto a strategy.
	///
	/// - `workers == 1` runs the sequential scan (inserters are ignored),
	/// - `workers == 0` runs one unit per token,
	/// - any other count partitions the sequence across that many workers.
	pub fn from_counts(workers: usize, inserters: usize) -> Self {
		match workers {
			1 => Self::sequential(),
			0 => Self::per_token(inserters),
			_ => Self::partitioned(workers, inserters),
		}
	}

	/// Returns `true` when units of work go through a channel.
	pub fn uses_channel(&self) -> bool {
		self.mode != BuildMode::Sequential && self.inserters > 0
	}

	fn validate(&self) -> Result<()> {
		if self.mode == BuildMode::Partitioned && self.workers == 0 {
			return Err(ChainError::InvalidConfig(
				"partitioned builds need at least one worker".into(),
			));
		}
		Ok(())
	}
}

impl Default for StrategyConfig {
	fn default() -> Self {
		Self::sequential()
	}
}

impl fmt::Display for StrategyConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mode = self.mode.name();
		match self.mode {
			BuildMode::Sequential => f.write_str(mode),
			BuildMode::PerToken => write!(f, "{mode}(inserters={})", self.inserters),
			BuildMode::Partitioned => write!(
				f,
				"{mode}(workers={}, inserters={})",
				self.workers, self.inserters
			),
		}
	}
}

/// Everything a build needs besides the tokens.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
	/// Words per prefix (`>= 1`).
	pub prefix_len: usize,
	pub strategy: StrategyConfig,
	pub backend: TableBackend,
	/// Shards of a sharded table, or buckets of an optimistic one.
	pub shards: usize,
	/// Depth of the bounded work channel.
	pub channel_capacity: usize,
	/// Threads of the task pool used by `PerToken` builds.
	pub task_threads: usize,
}

impl BuildConfig {
	/// Returns a builder initialised with [`BuildConfig::default`].
	pub fn builder() -> BuildConfigBuilder {
		BuildConfigBuilder::default()
	}

	/// Checks the invariants every strategy relies on.
	pub fn validate(&self) -> Result<()> {
		if self.prefix_len == 0 {
			return Err(ChainError::InvalidConfig("prefix_len must be at least 1".into()));
		}
		if self.shards == 0 {
			return Err(ChainError::InvalidConfig("shards must be at least 1".into()));
		}
		if self.channel_capacity == 0 {
			return Err(ChainError::InvalidConfig(
				"channel_capacity must be at least 1".into(),
			));
		}
		if self.task_threads == 0 {
			return Err(ChainError::InvalidConfig("task_threads must be at least 1".into()));
		}
		self.strategy.validate()
	}
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			prefix_len: DEFAULT_PREFIX_LEN,
			strategy: StrategyConfig::default(),
			backend: TableBackend::default(),
			shards: DEFAULT_SHARDS,
			channel_capacity: DEFAULT_CHANNEL_CAPACITY,
			task_threads: num_cpus::get(),
		}
	}
}

/// Builder for [`BuildConfig`].
#[derive(Debug, Default, Clone)]
pub struct BuildConfigBuilder {
	cfg: BuildConfig,
}

impl BuildConfigBuilder {
	/// Sets the number of words per prefix. `0` is rejected by [`build`](Self::build).
	pub fn prefix_len(mut self, prefix_len: usize) -> Self {
		self.cfg.prefix_len = prefix_len;
		self
	}

	/// Sets the build strategy.
	pub fn strategy(mut self, strategy: StrategyConfig) -> Self {
		self.cfg.strategy = strategy;
		self
	}

	/// Sets the successor table implementation.
	pub fn backend(mut self, backend: TableBackend) -> Self {
		self.cfg.backend = backend;
		self
	}

	/// Sets the shard (or bucket) count of the table.
	///
	/// # Parameters
	/// - `shards`: number of independently locked partitions, at least 1.
	///
	/// # Notes
	/// More shards lower lock contention between writers on unrelated keys.
	pub fn shards(mut self, shards: usize) -> Self {
		self.cfg.shards = shards;
		self
	}

	/// Sets how many pending units the work channel buffers before producers
	/// block. Only used when the strategy has inserters.
	pub fn channel_capacity(mut self, channel_capacity: usize) -> Self {
		self.cfg.channel_capacity = channel_capacity;
		self
	}

	/// Sets the size of the task pool that runs per-token units.
	pub fn task_threads(mut self, task_threads: usize) -> Self {
		self.cfg.task_threads = task_threads;
		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<BuildConfig> {
		self.cfg.validate()?;
		Ok(self.cfg)
	}
}
