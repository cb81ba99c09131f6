use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::table::{ChainTable, partition_of};

/// Successor table split into independently locked shards.
///
/// Each key lives in exactly one shard, chosen by hash. An insert holds the
/// shard lock for the whole read-modify-write of its key, which makes the
/// append atomic; inserts that land on different shards run in parallel.
///
/// A single shard degrades to one global lock, which is still correct.
#[derive(Debug)]
pub struct ShardedTable {
	shards: Box<[Mutex<HashMap<String, Vec<String>>>]>,
	hasher: RandomState,
}

impl ShardedTable {
	/// Creates an empty table with `shards` locks (at least one).
	pub fn new(shards: usize) -> Self {
		let shards = (0..shards.max(1)).map(|_| Mutex::new(HashMap::new())).collect();
		Self { shards, hasher: RandomState::new() }
	}

	fn shard(&self, key: &str) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
		let index = partition_of(&self.hasher, key, self.shards.len());
		// A panicking writer cannot leave a half-applied push behind, so the
		// data behind a poisoned lock is still consistent.
		self.shards[index].lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl ChainTable for ShardedTable {
	fn insert(&self, key: String, token: String) {
		let mut shard = self.shard(&key);
		shard.entry(key).or_default().push(token);
	}

	fn lookup(&self, key: &str) -> Option<Vec<String>> {
		self.shard(key).get(key).cloned()
	}

	fn len(&self) -> usize {
		self.shards
			.iter()
			.map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len())
			.sum()
	}

	fn snapshot(&self) -> HashMap<String, Vec<String>> {
		let mut all = HashMap::new();
		for shard in self.shards.iter() {
			let shard = shard.lock().unwrap_or_else(PoisonError::into_inner);
			all.extend(shard.iter().map(|(key, successors)| (key.clone(), successors.clone())));
		}
		all
	}
}
