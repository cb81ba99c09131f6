use std::fmt;

/// Separator placed between the words of a serialized prefix.
pub const SEPARATOR: &str = " ";

/// Rolling window over the last `len` words of a token sequence.
///
/// A `Prefix` is the cursor of the Markov chain: its serialized form
/// (`key`) indexes the successor table during a build, and drives lookups
/// during generation.
///
/// # Invariants
/// - The window always holds exactly `len` words.
/// - Positions that precede the start of the sequence hold empty strings,
///   so the first key of a 2-word prefix is `" "` and the second `" I"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
	words: Vec<String>,
}

impl Prefix {
	/// Creates an all-empty prefix of `len` words.
	pub fn new(len: usize) -> Self {
		Self { words: vec![String::new(); len] }
	}

	/// Rebuilds the window a sequential scan holds right before it consumes
	/// `tokens[offset]`.
	///
	/// Words that would fall before the start of `tokens` are empty. An
	/// `offset` past the end is clamped to `tokens.len()`.
	pub fn at(tokens: &[String], offset: usize, len: usize) -> Self {
		let offset = offset.min(tokens.len());
		let words = (0..len)
			.map(|i| {
				// Word i of the window is tokens[offset + i - len]; anything
				// before index 0 is padding.
				let position = offset + i;
				if position < len {
					String::new()
				} else {
					tokens[position - len].clone()
				}
			})
			.collect();
		Self { words }
	}

	/// Number of words in the window.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Serializes the window into its lookup key.
	pub fn key(&self) -> String {
		self.words.join(SEPARATOR)
	}

	/// Drops the oldest word and appends `word`, in place.
	pub fn shift(&mut self, word: &str) {
		if self.words.is_empty() {
			return;
		}
		self.words.rotate_left(1);
		if let Some(last) = self.words.last_mut() {
			last.clear();
			last.push_str(word);
		}
	}
}

impl fmt::Display for Prefix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.key())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(text: &str) -> Vec<String> {
		text.split_whitespace().map(str::to_owned).collect()
	}

	#[test]
	fn new_prefix_is_blank() {
		let prefix = Prefix::new(2);
		assert_eq!(prefix.len(), 2);
		assert_eq!(prefix.key(), " ");
		assert_eq!(Prefix::new(3).key(), "  ");
	}

	#[test]
	fn shift_keeps_length() {
		let mut prefix = Prefix::new(2);
		prefix.shift("I");
		assert_eq!(prefix.key(), " I");
		prefix.shift("am");
		assert_eq!(prefix.key(), "I am");
		prefix.shift("a");
		assert_eq!(prefix.key(), "am a");
		assert_eq!(prefix.len(), 2);
	}

	#[test]
	fn shift_on_zero_length_is_noop() {
		let mut prefix = Prefix::new(0);
		prefix.shift("word");
		assert!(prefix.is_empty());
		assert_eq!(prefix.key(), "");
	}

	#[test]
	fn at_matches_rolling_window() {
		let tokens = words("I am a free man! I am not a number!");
		for len in 1..=4 {
			let mut rolling = Prefix::new(len);
			for (offset, token) in tokens.iter().enumerate() {
				assert_eq!(Prefix::at(&tokens, offset, len), rolling, "len {len} offset {offset}");
				rolling.shift(token);
			}
			assert_eq!(Prefix::at(&tokens, tokens.len(), len), rolling);
		}
	}

	#[test]
	fn at_never_reads_out_of_range() {
		let tokens = words("solo");
		assert_eq!(Prefix::at(&tokens, 0, 3).key(), "  ");
		assert_eq!(Prefix::at(&tokens, 1, 3).key(), "  solo");
		assert_eq!(Prefix::at(&tokens, 10, 3).key(), "  solo");
		assert_eq!(Prefix::at(&[], 5, 2).key(), " ");
	}
}
