use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const CORPUS: &str = "I am a free man! I am not a number! I am a free man!";

fn workspace_with_corpus(text: &str) -> TempDir {
	let workspace = tempfile::tempdir().expect("create tempdir");
	fs::write(workspace.path().join("corpus.txt"), text).expect("write corpus");
	workspace
}

fn rs_chain(workspace: &TempDir) -> Command {
	let mut cmd = Command::cargo_bin("rs-chain").expect("binary exists");
	cmd.current_dir(workspace.path());
	cmd
}

fn stdout_of(cmd: &mut Command) -> String {
	let output = cmd.assert().success().get_output().stdout.clone();
	String::from_utf8(output).expect("utf-8 output")
}

#[test]
fn linear_corpus_is_reproduced_by_every_strategy() {
	let workspace = workspace_with_corpus("one two three four five six");
	for (workers, inserters) in [("1", "0"), ("0", "0"), ("0", "1"), ("0", "3"), ("3", "0"), ("3", "1"), ("4", "2")] {
		let text = stdout_of(rs_chain(&workspace).args([
			"-q",
			"--input",
			"corpus.txt",
			"--workers",
			workers,
			"--inserters",
			inserters,
		]));
		assert_eq!(text.trim(), "one two three four five six", "workers {workers} inserters {inserters}");
	}
}

#[test]
fn word_budget_and_seed_are_honoured() {
	let workspace = workspace_with_corpus(CORPUS);
	let run = || {
		stdout_of(rs_chain(&workspace).args([
			"-q", "--input", "corpus.txt", "--words", "7", "--seed", "42", "--workers", "4", "--inserters", "2",
		]))
	};

	let first = run();
	assert!(first.split_whitespace().count() <= 7);
	assert_eq!(first.split_whitespace().next(), Some("I"));
	assert_eq!(first, run(), "same seed, same text");
}

#[test]
fn reads_corpus_from_stdin() {
	let workspace = workspace_with_corpus("");
	let text = stdout_of(
		rs_chain(&workspace)
			.args(["-q", "--prefix", "1", "--backend", "optimistic"])
			.write_stdin("alpha beta gamma"),
	);
	assert_eq!(text.trim(), "alpha beta gamma");
}

#[test]
fn timings_are_appended_as_csv() {
	let workspace = workspace_with_corpus(CORPUS);
	for _ in 0..2 {
		rs_chain(&workspace)
			.args(["-q", "--input", "corpus.txt", "--workers", "0", "--inserters", "2", "--timings", "data.csv"])
			.assert()
			.success();
	}

	let csv = fs::read_to_string(workspace.path().join("data.csv")).expect("timings written");
	let lines: Vec<&str> = csv.lines().collect();
	assert_eq!(lines.len(), 3);
	assert!(lines[0].starts_with("mode,workers,inserters"));
	assert!(lines[1].starts_with("per-token,0,2,sharded,2,15,15,11,0,"));
}

#[test]
fn json_output_carries_report() {
	let workspace = workspace_with_corpus(CORPUS);
	let output = stdout_of(rs_chain(&workspace).args([
		"-q",
		"--input",
		"corpus.txt",
		"--workers",
		"3",
		"--inserters",
		"1",
		"--words",
		"5",
		"--json",
	]));

	let json: Value = serde_json::from_str(&output).expect("valid JSON");
	assert_eq!(json["report"]["tokens"], 15);
	assert_eq!(json["report"]["insertions"], 15);
	assert_eq!(json["report"]["keys"], 11);
	assert_eq!(json["report"]["strategy"]["mode"], "partitioned");
	let text = json["text"].as_str().expect("text field");
	assert!(text.split_whitespace().count() <= 5);
}

#[test]
fn invalid_settings_fail() {
	let workspace = workspace_with_corpus(CORPUS);
	rs_chain(&workspace)
		.args(["-q", "--input", "corpus.txt", "--prefix", "0"])
		.assert()
		.failure();
	rs_chain(&workspace)
		.args(["-q", "--input", "missing.txt"])
		.assert()
		.failure();
	rs_chain(&workspace)
		.args(["-q", "--input", "corpus.txt", "--channel-capacity", "0", "--inserters", "1", "--workers", "2"])
		.assert()
		.failure();
}
