use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ScopedJoinHandle};

use log::{debug, warn};

use super::table::ChainTable;
use crate::error::{ChainError, Result};

/// One pending insertion travelling from a producer to an inserter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkItem {
	pub key: String,
	pub token: String,
}

/// Publishes one item, failing if every inserter is gone.
pub(crate) fn publish(tx: &SyncSender<WorkItem>, key: String, token: String) -> Result<()> {
	tx.send(WorkItem { key, token }).map_err(|_| ChainError::ChannelClosed)
}

/// Runs `produce` against a bounded channel drained by `inserters` threads.
///
/// The ordering is what keeps the pipeline from dropping or stalling work:
/// 1. inserters are running before the first item is published, so a
///    producer blocked on a full channel always has someone to unblock it,
/// 2. `produce` owns the only sender handed out by this function; it must
///    join its own producers before returning, and returning drops the
///    sender, which closes the channel,
/// 3. inserters drain what is left and are joined before this returns.
///
/// Returns the number of items actually inserted.
pub(crate) fn run<F>(table: &dyn ChainTable, inserters: usize, capacity: usize, produce: F) -> Result<usize>
where
	F: FnOnce(SyncSender<WorkItem>) -> Result<usize>,
{
	thread::scope(|scope| {
		let (tx, rx) = sync_channel::<WorkItem>(capacity);
		// Only inserters hold the receiver: if they all die, it is dropped and
		// producers get a send error instead of blocking forever.
		let rx = Arc::new(Mutex::new(rx));

		let mut handles = Vec::with_capacity(inserters);
		for i in 0..inserters {
			let rx = Arc::clone(&rx);
			let handle = thread::Builder::new()
				.name(format!("chain-inserter-{i}"))
				.spawn_scoped(scope, move || drain(table, &rx))
				.map_err(|source| ChainError::Spawn { role: "inserter", source })?;
			handles.push(handle);
		}
		drop(rx);
		debug!("{inserters} inserter(s) draining a channel of depth {capacity}");

		let produced = produce(tx);
		let inserted = join_all(handles, "inserter")?;
		let produced = produced?;

		if produced != inserted {
			warn!("produced {produced} work items but inserted {inserted}");
		}
		Ok(inserted)
	})
}

/// Inserts items until the channel is closed and empty.
fn drain(table: &dyn ChainTable, rx: &Mutex<Receiver<WorkItem>>) -> Result<usize> {
	let mut inserted = 0;
	loop {
		// The guard is released at the end of this statement, so inserters
		// only serialize on `recv`, never on `insert`.
		let next = rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
		match next {
			Ok(item) => {
				table.insert(item.key, item.token);
				inserted += 1;
			}
			Err(_) => return Ok(inserted),
		}
	}
}

/// Joins every handle, then sums their counts.
///
/// All handles are joined before any error is reported so that no panicked
/// thread is left for the scope to re-raise.
pub(crate) fn join_all(handles: Vec<ScopedJoinHandle<'_, Result<usize>>>, role: &'static str) -> Result<usize> {
	let results: Vec<_> = handles.into_iter().map(ScopedJoinHandle::join).collect();
	let mut total = 0;
	for result in results {
		total += result.map_err(|_| ChainError::WorkerPanicked(role))??;
	}
	Ok(total)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain::sharded_table::ShardedTable;

	#[test]
	fn every_published_item_is_inserted() {
		let table = ShardedTable::new(4);
		let inserted = run(&table, 3, 2, |tx| {
			for i in 0..100 {
				publish(&tx, format!("k{}", i % 5), i.to_string())?;
			}
			Ok(100)
		})
		.unwrap();

		assert_eq!(inserted, 100);
		let total: usize = table.snapshot().values().map(Vec::len).sum();
		assert_eq!(total, 100);
	}

	#[test]
	fn single_slot_channel_with_many_producers_does_not_stall() {
		let table = ShardedTable::new(1);
		let inserted = run(&table, 1, 1, |tx| {
			thread::scope(|scope| {
				let handles: Vec<_> = (0..4)
					.map(|p| {
						let tx = tx.clone();
						scope.spawn(move || -> Result<usize> {
							for i in 0..50 {
								publish(&tx, p.to_string(), i.to_string())?;
							}
							Ok(50)
						})
					})
					.collect();
				join_all(handles, "worker")
			})
		})
		.unwrap();

		assert_eq!(inserted, 200);
		assert_eq!(table.len(), 4);
	}

	#[test]
	fn producers_see_closed_channel_without_inserters() {
		let table = ShardedTable::new(1);
		let result = run(&table, 0, 1, |tx| {
			publish(&tx, "k".to_owned(), "v".to_owned())?;
			Ok(1)
		});
		assert!(matches!(result, Err(ChainError::ChannelClosed)));
	}
}
