//! Static partitioning across a fixed set of worker threads.

use std::ops::Range;
use std::thread;

use log::debug;

use super::pipeline::{self, join_all, publish};
use super::prefix::Prefix;
use super::strategy::BuildConfig;
use super::table::ChainTable;
use crate::error::{ChainError, Result};

/// Splits `len` tokens into `workers` contiguous, non-overlapping segments.
///
/// Every segment but the last holds `ceil(len / workers)` tokens; the last
/// one is truncated, and when there are more workers than tokens the
/// trailing segments are empty. Bounds never exceed `len`.
pub fn partition_bounds(len: usize, workers: usize) -> Vec<Range<usize>> {
	let workers = workers.max(1);
	let per_worker = len.div_ceil(workers);
	(0..workers)
		.map(|i| {
			let start = (per_worker * i).min(len);
			let end = (per_worker * (i + 1)).min(len);
			start..end
		})
		.collect()
}

/// Scans one segment, starting from the window the sequential scan would
/// hold at its first offset.
fn scan_segment<E>(tokens: &[String], range: Range<usize>, len: usize, mut emit: E) -> Result<usize>
where
	E: FnMut(String, String) -> Result<()>,
{
	let mut prefix = Prefix::at(tokens, range.start, len);
	for token in &tokens[range.clone()] {
		emit(prefix.key(), token.clone())?;
		prefix.shift(token);
	}
	Ok(range.len())
}

/// Runs `work` once per non-empty segment, each on its own named thread, and
/// joins them.
///
/// `sink` is cloned into every worker: the table itself for direct inserts,
/// a channel sender otherwise. Empty segments get no thread.
fn run_workers<S, F>(bounds: &[Range<usize>], sink: S, work: F) -> Result<usize>
where
	S: Clone + Send,
	F: Fn(Range<usize>, S) -> Result<usize> + Sync,
{
	thread::scope(|scope| {
		let work = &work;
		let mut handles = Vec::new();
		for (i, range) in bounds.iter().enumerate().filter(|(_, range)| !range.is_empty()) {
			let range = range.clone();
			let sink = sink.clone();
			let handle = thread::Builder::new()
				.name(format!("chain-worker-{i}"))
				.spawn_scoped(scope, move || work(range, sink))
				.map_err(|source| ChainError::Spawn { role: "worker", source })?;
			handles.push(handle);
		}
		drop(sink);
		join_all(handles, "worker")
	})
}

pub(crate) fn build(tokens: &[String], config: &BuildConfig, table: &dyn ChainTable) -> Result<usize> {
	let len = config.prefix_len;
	let bounds = partition_bounds(tokens.len(), config.strategy.workers);
	debug!("partitioned {} tokens as {:?}", tokens.len(), bounds);

	match config.strategy.inserters {
		0 => run_workers(&bounds, table, |range, table| {
			scan_segment(tokens, range, len, |key, token| {
				table.insert(key, token);
				Ok(())
			})
		}),
		inserters => pipeline::run(table, inserters, config.channel_capacity, |tx| {
			run_workers(&bounds, tx, |range, tx| {
				scan_segment(tokens, range, len, |key, token| publish(&tx, key, token))
			})
		}),
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::chain::sharded_table::ShardedTable;
	use crate::chain::strategy::StrategyConfig;

	#[test]
	fn bounds_cover_sequence_without_overlap() {
		for len in 0..40 {
			for workers in 1..10 {
				let bounds = partition_bounds(len, workers);
				assert_eq!(bounds.len(), workers);
				let mut next = 0;
				for range in &bounds {
					assert_eq!(range.start, next.min(len));
					assert!(range.end <= len);
					next = range.end;
				}
				assert_eq!(next, len, "len {len} workers {workers}");
			}
		}
	}

	#[test]
	fn bounds_use_ceiling_segments() {
		assert_eq!(partition_bounds(15, 4), vec![0..4, 4..8, 8..12, 12..15]);
		assert_eq!(partition_bounds(10, 3), vec![0..4, 4..8, 8..10]);
		assert_eq!(partition_bounds(3, 5), vec![0..1, 1..2, 2..3, 3..3, 3..3]);
		assert_eq!(partition_bounds(0, 2), vec![0..0, 0..0]);
	}

	#[test]
	fn segment_scan_starts_from_preceding_words() {
		let tokens: Vec<String> = "I am a free man!".split(' ').map(str::to_owned).collect();
		let mut seen = Vec::new();
		let count = scan_segment(&tokens, 3..5, 2, |key, token| {
			seen.push((key, token));
			Ok(())
		})
		.unwrap();

		assert_eq!(count, 2);
		assert_eq!(
			seen,
			vec![
				("am a".to_owned(), "free".to_owned()),
				("a free".to_owned(), "man!".to_owned()),
			]
		);
	}

	#[test]
	fn empty_segments_spawn_no_worker() {
		let bounds = partition_bounds(3, 100_000);
		let runs = AtomicUsize::new(0);
		let total = run_workers(&bounds, (), |range, ()| {
			runs.fetch_add(1, Ordering::Relaxed);
			Ok(range.len())
		})
		.unwrap();

		assert_eq!(runs.load(Ordering::Relaxed), 3);
		assert_eq!(total, 3);
	}

	#[test]
	fn more_workers_than_tokens_still_builds_every_entry() {
		let tokens: Vec<String> = "one two three".split(' ').map(str::to_owned).collect();
		for inserters in [0, 2] {
			let config = BuildConfig {
				strategy: StrategyConfig::partitioned(100_000, inserters),
				..BuildConfig::default()
			};
			let table = ShardedTable::new(4);
			assert_eq!(build(&tokens, &config, &table).unwrap(), 3);
			assert_eq!(table.lookup(" "), Some(vec!["one".to_owned()]));
			assert_eq!(table.lookup(" one"), Some(vec!["two".to_owned()]));
			assert_eq!(table.lookup("one two"), Some(vec!["three".to_owned()]));
			assert_eq!(table.len(), 3);
		}
	}
}
