use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::table::{ChainTable, partition_of};

type Bucket = RwLock<HashMap<String, Arc<Vec<String>>>>;

/// Successor table published through compare-and-swap on immutable snapshots.
///
/// Every key maps to an `Arc<Vec<String>>` that is never modified once
/// stored. An insert:
/// 1. loads the current snapshot of the key (or notes it is absent),
/// 2. builds the successor list with the new token appended, outside any lock,
/// 3. publishes it only if the stored snapshot is still the one it loaded
///    (same allocation, or still absent),
/// 4. otherwise counts a retry and starts over from a fresh load.
///
/// The retry loop is unbounded. A writer only loses a round when another
/// writer published to the same key in between, so progress is guaranteed
/// for the table as a whole; fairness between writers is probabilistic.
///
/// This backend is not lock-free. Step 1 takes the bucket read lock, and the
/// compare-and-publish of step 3 runs under the bucket write lock; only the
/// copy of step 2 happens with no lock held. A writer that loses the
/// comparison releases the write lock before retrying.
#[derive(Debug)]
pub struct OptimisticTable {
	buckets: Box<[Bucket]>,
	hasher: RandomState,
	retries: AtomicUsize,
}

impl OptimisticTable {
	/// Creates an empty table with `buckets` partitions (at least one).
	pub fn new(buckets: usize) -> Self {
		let buckets = (0..buckets.max(1)).map(|_| RwLock::new(HashMap::new())).collect();
		Self {
			buckets,
			hasher: RandomState::new(),
			retries: AtomicUsize::new(0),
		}
	}

	fn bucket(&self, key: &str) -> &Bucket {
		&self.buckets[partition_of(&self.hasher, key, self.buckets.len())]
	}

	fn load(bucket: &Bucket, key: &str) -> Option<Arc<Vec<String>>> {
		bucket.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
	}

	/// The insert loop. `before_publish` runs after the new list is built and
	/// before the write lock is taken, once per round.
	fn insert_with<F: FnMut()>(&self, key: String, token: String, mut before_publish: F) {
		let bucket = self.bucket(&key);
		loop {
			let current = Self::load(bucket, &key);

			let mut next = Vec::with_capacity(current.as_ref().map_or(1, |c| c.len() + 1));
			if let Some(current) = &current {
				next.extend(current.iter().cloned());
			}
			next.push(token.clone());

			before_publish();
			let mut map = bucket.write().unwrap_or_else(PoisonError::into_inner);
			let unchanged = match (map.get(&key), &current) {
				(None, None) => true,
				(Some(stored), Some(loaded)) => Arc::ptr_eq(stored, loaded),
				_ => false,
			};
			if unchanged {
				map.insert(key, Arc::new(next));
				return;
			}
			drop(map);

			self.retries.fetch_add(1, Ordering::Relaxed);
			std::thread::yield_now();
		}
	}
}

impl ChainTable for OptimisticTable {
	fn insert(&self, key: String, token: String) {
		self.insert_with(key, token, || {});
	}

	fn lookup(&self, key: &str) -> Option<Vec<String>> {
		Self::load(self.bucket(key), key).map(|successors| successors.as_ref().clone())
	}

	fn len(&self) -> usize {
		self.buckets
			.iter()
			.map(|bucket| bucket.read().unwrap_or_else(PoisonError::into_inner).len())
			.sum()
	}

	fn snapshot(&self) -> HashMap<String, Vec<String>> {
		let mut all = HashMap::new();
		for bucket in self.buckets.iter() {
			let bucket = bucket.read().unwrap_or_else(PoisonError::into_inner);
			all.extend(bucket.iter().map(|(key, successors)| (key.clone(), successors.as_ref().clone())));
		}
		all
	}

	fn contention(&self) -> usize {
		self.retries.load(Ordering::Relaxed)
	}
}
