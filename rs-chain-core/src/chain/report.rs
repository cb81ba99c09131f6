use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::strategy::StrategyConfig;
use super::table::TableBackend;

/// Column names matching [`BuildReport::to_csv_row`].
pub const CSV_HEADER: &str = "mode,workers,inserters,backend,prefix_len,tokens,insertions,keys,retries,elapsed_secs";

/// What a build did and how long it took.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BuildReport {
	pub strategy: StrategyConfig,
	pub backend: TableBackend,
	pub prefix_len: usize,
	/// Tokens in the input corpus.
	pub tokens: usize,
	/// Successors written to the table.
	pub insertions: usize,
	/// Distinct prefixes in the table.
	pub keys: usize,
	/// Optimistic publications that had to be retried.
	pub retries: usize,
	pub elapsed: Duration,
}

impl BuildReport {
	/// Formats the report as one CSV line (without newline).
	///
	/// Elapsed time is written in seconds with microsecond precision.
	pub fn to_csv_row(&self) -> String {
		format!(
			"{},{},{},{},{},{},{},{},{},{:.6}",
			self.strategy.mode.name(),
			self.strategy.workers,
			self.strategy.inserters,
			self.backend,
			self.prefix_len,
			self.tokens,
			self.insertions,
			self.keys,
			self.retries,
			self.elapsed.as_secs_f64()
		)
	}
}
