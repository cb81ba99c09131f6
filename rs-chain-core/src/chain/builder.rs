use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;

use super::generator::generate;
use super::prefix::Prefix;
use super::report::BuildReport;
use super::strategy::{BuildConfig, BuildMode};
use super::table::ChainTable;
use super::{partitioned, per_token};
use crate::error::Result;

/// Populates successor tables according to a [`BuildConfig`].
///
/// # Guarantees
/// Whatever the strategy, the finished table holds, for every key, exactly
/// the multiset of successors the sequential scan would record:
/// start from a blank prefix, and for each token insert it under the current
/// key, then shift the token into the prefix.
///
/// Every spawned thread (workers, inserters, pool tasks) has been joined by
/// the time `build` returns, so the table is complete and no longer written.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
	config: BuildConfig,
}

impl ChainBuilder {
	/// Validates `config` and wraps it.
	pub fn new(config: BuildConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config })
	}

	/// Returns the validated configuration every `build` call uses.
	pub fn config(&self) -> &BuildConfig {
		&self.config
	}

	/// Builds a chain from `tokens`.
	pub fn build(&self, tokens: &[String]) -> Result<Chain> {
		let config = &self.config;
		let table = config.backend.create(config.shards);
		debug!(
			"building {} over {} tokens (prefix {}, {} table)",
			config.strategy,
			tokens.len(),
			config.prefix_len,
			config.backend
		);

		let start = Instant::now();
		let insertions = match config.strategy.mode {
			BuildMode::Sequential => sequential(tokens, config.prefix_len, table.as_ref()),
			BuildMode::PerToken => per_token::build(tokens, config, table.as_ref())?,
			BuildMode::Partitioned => partitioned::build(tokens, config, table.as_ref())?,
		};
		let elapsed = start.elapsed();

		if insertions != tokens.len() {
			warn!("{} tokens but {insertions} insertions", tokens.len());
		}

		let report = BuildReport {
			strategy: config.strategy,
			backend: config.backend,
			prefix_len: config.prefix_len,
			tokens: tokens.len(),
			insertions,
			keys: table.len(),
			retries: table.contention(),
			elapsed,
		};
		info!(
			"built {} keys from {} tokens with {} in {:.6}s",
			report.keys,
			report.tokens,
			config.strategy,
			elapsed.as_secs_f64()
		);

		Ok(Chain {
			prefix_len: config.prefix_len,
			table,
			report,
		})
	}
}

/// Builds a chain from `tokens` with `config`.
pub fn build_chain(tokens: &[String], config: &BuildConfig) -> Result<Chain> {
	ChainBuilder::new(config.clone())?.build(tokens)
}

/// The literal scan every other strategy has to reproduce.
fn sequential(tokens: &[String], prefix_len: usize, table: &dyn ChainTable) -> usize {
	let mut prefix = Prefix::new(prefix_len);
	for token in tokens {
		table.insert(prefix.key(), token.clone());
		prefix.shift(token);
	}
	tokens.len()
}

/// A finished, read-only Markov chain.
///
/// The table is owned privately and only reachable through read
/// operations, so nothing can write to it once the build has returned:
///
/// ```compile_fail
/// use rs_chain_core::chain::{BuildConfig, build_chain};
///
/// let chain = build_chain(&["a".to_owned()], &BuildConfig::default()).unwrap();
/// chain.table().insert("a".to_owned(), "b".to_owned());
/// ```
#[derive(Debug)]
pub struct Chain {
	prefix_len: usize,
	table: Box<dyn ChainTable>,
	report: BuildReport,
}

impl Chain {
	/// Number of words in the prefixes this chain was built with.
	///
	/// Generation walks with this same length.
	pub fn prefix_len(&self) -> usize {
		self.prefix_len
	}

	/// Timing and counters of the build that produced this chain.
	pub fn report(&self) -> &BuildReport {
		&self.report
	}

	/// Successors recorded after `key`, in unspecified order.
	pub fn lookup(&self, key: &str) -> Option<Vec<String>> {
		self.table.lookup(key)
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	/// Returns `true` when the corpus was empty.
	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Total number of successors stored across all keys.
	pub fn total_successors(&self) -> usize {
		self.table.snapshot().values().map(Vec::len).sum()
	}

	/// Canonical view of the table: keys ordered, successors sorted.
	///
	/// Two chains with equal canonical views hold the same multisets.
	pub fn canonical(&self) -> BTreeMap<String, Vec<String>> {
		canonicalize(self.table.snapshot())
	}

	/// Generates at most `max_words` words with the thread-local RNG.
	pub fn generate(&self, max_words: usize) -> Vec<String> {
		self.generate_with(&mut rand::rng(), max_words)
	}

	/// Generates at most `max_words` words with a caller-provided RNG.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, max_words: usize) -> Vec<String> {
		generate(self.table.as_ref(), self.prefix_len, max_words, rng)
	}
}

/// Orders keys and sorts every successor list.
pub fn canonicalize(table: HashMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
	table
		.into_iter()
		.map(|(key, mut successors)| {
			successors.sort_unstable();
			(key, successors)
		})
		.collect()
}
