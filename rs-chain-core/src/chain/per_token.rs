//! One unit of work per token position.
//!
//! Units are scheduled on a bounded rayon pool instead of one thread each;
//! the pool join is the barrier that ends the fan-out.

use log::debug;
use rayon::prelude::*;

use super::pipeline::{self, publish};
use super::prefix::{Prefix, SEPARATOR};
use super::strategy::BuildConfig;
use super::table::ChainTable;
use crate::error::{ChainError, Result};

/// Key of the window ending right before `tokens[idx]`, for `idx >= len`.
fn window_key(tokens: &[String], idx: usize, len: usize) -> String {
	tokens[idx - len..idx].join(SEPARATOR)
}

pub(crate) fn build(tokens: &[String], config: &BuildConfig, table: &dyn ChainTable) -> Result<usize> {
	let len = config.prefix_len;
	// The first `len` positions see a window padded with empty words, which
	// cannot be sliced out of `tokens`; they are seeded in order instead.
	let seeded = len.min(tokens.len());

	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(config.task_threads)
		.thread_name(|i| format!("chain-task-{i}"))
		.build()
		.map_err(|e| ChainError::ThreadPool(e.to_string()))?;
	debug!(
		"fanning out {} positions over {} task threads",
		tokens.len() - seeded,
		pool.current_num_threads()
	);

	match config.strategy.inserters {
		0 => {
			let mut prefix = Prefix::new(len);
			for token in &tokens[..seeded] {
				table.insert(prefix.key(), token.clone());
				prefix.shift(token);
			}

			pool.install(|| {
				(seeded..tokens.len())
					.into_par_iter()
					.for_each(|idx| table.insert(window_key(tokens, idx, len), tokens[idx].clone()));
			});
			Ok(tokens.len())
		}
		inserters => pipeline::run(table, inserters, config.channel_capacity, |tx| {
			let mut prefix = Prefix::new(len);
			for token in &tokens[..seeded] {
				publish(&tx, prefix.key(), token.clone())?;
				prefix.shift(token);
			}

			pool.install(|| {
				(seeded..tokens.len())
					.into_par_iter()
					.try_for_each_with(tx, |tx, idx| publish(tx, window_key(tokens, idx, len), tokens[idx].clone()))
			})?;
			Ok(tokens.len())
		}),
	}
}
