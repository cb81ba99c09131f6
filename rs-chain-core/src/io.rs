use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::chain::report::{BuildReport, CSV_HEADER};
use crate::error::{ChainError, Result};

/// Splits raw text into whitespace-delimited words.
///
/// Any run of Unicode whitespace (spaces, tabs, newlines) separates two
/// words; punctuation stays attached (`"man!"` is one word).
pub fn tokenize(text: &str) -> Vec<String> {
	text.split_whitespace().map(str::to_owned).collect()
}

/// Reads a whole text file and returns its words.
pub fn read_words<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let file = File::open(path).map_err(|e| ChainError::io(e, Some(path.to_path_buf())))?;
	read_words_from(file).map_err(|e| match e {
		ChainError::Io { source, .. } => ChainError::io(source, Some(path.to_path_buf())),
		other => other,
	})
}

/// Reads everything from `reader` (a file, stdin...) and returns its words.
pub fn read_words_from<R: Read>(mut reader: R) -> Result<Vec<String>> {
	let mut contents = String::new();
	reader
		.read_to_string(&mut contents)
		.map_err(|e| ChainError::io(e, None))?;
	Ok(tokenize(&contents))
}

/// Appends `report` as one CSV row to `filename`.
///
/// The header is written first when the file is new or empty.
pub fn append_report<P: AsRef<Path>>(filename: P, report: &BuildReport) -> Result<()> {
	let path = filename.as_ref();
	let wrap = |e: std::io::Error| ChainError::io(e, Some(path.to_path_buf()));

	let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(wrap)?;
	let empty = file.metadata().map_err(wrap)?.len() == 0;
	if empty {
		writeln!(file, "{CSV_HEADER}").map_err(wrap)?;
	}
	writeln!(file, "{}", report.to_csv_row()).map_err(wrap)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::time::Duration;

	use super::*;
	use crate::chain::strategy::StrategyConfig;
	use crate::chain::table::TableBackend;

	fn report() -> BuildReport {
		BuildReport {
			strategy: StrategyConfig::sequential(),
			backend: TableBackend::Sharded,
			prefix_len: 2,
			tokens: 4,
			insertions: 4,
			keys: 4,
			retries: 0,
			elapsed: Duration::from_millis(2),
		}
	}

	#[test]
	fn tokenize_splits_on_any_whitespace() {
		assert_eq!(tokenize("  I am\n\tnot a\r\nnumber!  "), vec!["I", "am", "not", "a", "number!"]);
		assert!(tokenize(" \n ").is_empty());
	}

	#[test]
	fn read_words_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.txt");
		fs::write(&path, "I am a\nfree man!\n").unwrap();
		assert_eq!(read_words(&path).unwrap(), vec!["I", "am", "a", "free", "man!"]);
	}

	#[test]
	fn missing_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.txt");
		match read_words(&path) {
			Err(ChainError::Io { path: Some(p), .. }) => assert_eq!(p, path),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn report_rows_share_one_header() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("timings.csv");
		append_report(&path, &report()).unwrap();
		append_report(&path, &report()).unwrap();

		let contents = fs::read_to_string(&path).unwrap();
		let lines: Vec<&str> = contents.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0], CSV_HEADER);
		assert!(lines[1].starts_with("sequential,1,0,sharded,2,4,4,4,0,"));
	}
}
