use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::optimistic_table::OptimisticTable;
use super::sharded_table::ShardedTable;

/// Shared successor table written concurrently during a build.
///
/// Maps a serialized prefix to the multiset of words observed right after
/// it. Order inside a successor collection carries no meaning.
///
/// # Contract
/// - `insert` is an atomic append-or-create: concurrent calls on the same key
///   never lose a token and never add one that was not requested.
/// - Calls on different keys do not wait on each other, except when the keys
///   share a shard or bucket.
/// - There is no removal.
pub trait ChainTable: Send + Sync + fmt::Debug {
	/// Appends `token` to the successors of `key`, creating the entry if needed.
	fn insert(&self, key: String, token: String);

	/// Returns a copy of the successors of `key`.
	fn lookup(&self, key: &str) -> Option<Vec<String>>;

	/// Number of distinct keys.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Copies the whole mapping out of the table.
	fn snapshot(&self) -> HashMap<String, Vec<String>>;

	/// Number of optimistic publications that had to be retried.
	///
	/// Always 0 for locking backends.
	fn contention(&self) -> usize {
		0
	}
}

/// Synchronization technique backing a [`ChainTable`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TableBackend {
	/// Hash-sharded `Mutex<HashMap>`; one critical section per insert.
	#[default]
	Sharded,
	/// Immutable per-key snapshots published with compare-and-swap.
	Optimistic,
}

impl TableBackend {
	/// Creates an empty table of this kind split into `shards` partitions.
	pub fn create(self, shards: usize) -> Box<dyn ChainTable> {
		match self {
			TableBackend::Sharded => Box::new(ShardedTable::new(shards)),
			TableBackend::Optimistic => Box::new(OptimisticTable::new(shards)),
		}
	}

	/// Returns the lowercase label the CLI accepts and reports.
	///
	/// # Returns
	/// `"sharded"` or `"optimistic"`.
	pub fn name(self) -> &'static str {
		match self {
			TableBackend::Sharded => "sharded",
			TableBackend::Optimistic => "optimistic",
		}
	}
}

impl fmt::Display for TableBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Picks the partition of `key` among `count` partitions.
pub(crate) fn partition_of<S: std::hash::BuildHasher>(hasher: &S, key: &str, count: usize) -> usize {
	(hasher.hash_one(key) % count as u64) as usize
}
