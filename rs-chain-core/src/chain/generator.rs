use rand::Rng;
use rand::seq::IndexedRandom;

use super::prefix::Prefix;
use super::table::ChainTable;

/// Walks the chain from the blank prefix and returns at most `max_words` words.
///
/// At each step the successors of the current prefix are looked up and one
/// of them is picked uniformly at random; since repeated successors are
/// stored once per occurrence, frequent continuations come up more often.
/// The walk stops early when the current prefix has no successors.
///
/// Successors are sorted before the draw: a concurrent build stores them in
/// whatever order its threads happened to insert, and the draw must depend
/// on the multiset only, so that a seeded `rng` gives the same text for
/// every build of the same corpus.
///
/// The table is only read, so this runs without any synchronization beyond
/// what `lookup` itself does.
pub fn generate<T, R>(table: &T, prefix_len: usize, max_words: usize, rng: &mut R) -> Vec<String>
where
	T: ChainTable + ?Sized,
	R: Rng + ?Sized,
{
	let mut prefix = Prefix::new(prefix_len);
	let mut words = Vec::new();

	while words.len() < max_words {
		let Some(mut successors) = table.lookup(&prefix.key()) else {
			break;
		};
		successors.sort_unstable();
		let Some(next) = successors.choose(rng) else {
			break;
		};
		prefix.shift(next);
		words.push(next.clone());
	}

	words
}
