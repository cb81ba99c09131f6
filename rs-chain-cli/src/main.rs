use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use env_logger::Env;
use log::{LevelFilter, debug};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use rs_chain_core::chain::{BuildConfig, BuildReport, StrategyConfig, TableBackend, build_chain};
use rs_chain_core::io::{append_report, read_words, read_words_from};

/// Builds a Markov chain from a corpus and prints generated text.
#[derive(Parser, Debug)]
#[command(author, version, about = "Concurrent Markov chain text generator", long_about = None)]
struct Cli {
	/// Corpus file (reads stdin when omitted)
	#[arg(short, long, value_name = "PATH")]
	input: Option<PathBuf>,

	/// Maximum number of words to print
	#[arg(long, default_value_t = 100)]
	words: usize,

	/// Prefix length in words
	#[arg(long, default_value_t = 2)]
	prefix: usize,

	/// Workers: 1 runs sequentially, 0 spawns one task per token, N partitions the corpus
	#[arg(long, default_value_t = 1)]
	workers: usize,

	/// Inserters: 0 inserts directly, N drains a shared channel with N threads
	#[arg(long, default_value_t = 0)]
	inserters: usize,

	/// Table synchronization technique
	#[arg(long, value_enum, default_value_t = Backend::Sharded)]
	backend: Backend,

	/// Number of table shards (or optimistic buckets)
	#[arg(long, value_name = "COUNT")]
	shards: Option<usize>,

	/// Depth of the bounded work channel
	#[arg(long, value_name = "DEPTH")]
	channel_capacity: Option<usize>,

	/// Threads of the per-token task pool (defaults to the CPU count)
	#[arg(long, value_name = "COUNT")]
	threads: Option<usize>,

	/// Seed for reproducible generation
	#[arg(long)]
	seed: Option<u64>,

	/// Append build timings as a CSV row to this file
	#[arg(long, value_name = "PATH")]
	timings: Option<PathBuf>,

	/// Print the build report and the text as JSON
	#[arg(long)]
	json: bool,

	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, action = ArgAction::Count)]
	verbose: u8,

	/// Silence warnings (-q)
	#[arg(short = 'q', long, action = ArgAction::Count)]
	quiet: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
	Sharded,
	Optimistic,
}

impl From<Backend> for TableBackend {
	fn from(backend: Backend) -> Self {
		match backend {
			Backend::Sharded => TableBackend::Sharded,
			Backend::Optimistic => TableBackend::Optimistic,
		}
	}
}

#[derive(Serialize)]
struct JsonOutput<'a> {
	report: &'a BuildReport,
	text: String,
}

fn init_logging(verbose: u8, quiet: u8) {
	let level = if quiet > 0 {
		LevelFilter::Error
	} else {
		match verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	};

	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
	builder.format_timestamp_millis();
	builder.filter_level(level);
	let _ = builder.try_init();
}

fn build_config(cli: &Cli) -> Result<BuildConfig> {
	let mut cfg = BuildConfig::builder()
		.prefix_len(cli.prefix)
		.strategy(StrategyConfig::from_counts(cli.workers, cli.inserters))
		.backend(cli.backend.into());
	if let Some(shards) = cli.shards {
		cfg = cfg.shards(shards);
	}
	if let Some(capacity) = cli.channel_capacity {
		cfg = cfg.channel_capacity(capacity);
	}
	if let Some(threads) = cli.threads {
		cfg = cfg.task_threads(threads);
	}
	cfg.build().context("invalid build configuration")
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	let config = build_config(&cli)?;
	debug!("configuration: {config:?}");

	let tokens = match &cli.input {
		Some(path) => read_words(path).with_context(|| format!("unable to read corpus {}", path.display()))?,
		None => read_words_from(io::stdin().lock()).context("unable to read corpus from stdin")?,
	};

	let chain = build_chain(&tokens, &config).context("chain build failed")?;

	if let Some(path) = &cli.timings {
		append_report(path, chain.report())
			.with_context(|| format!("unable to write timings to {}", path.display()))?;
	}

	let words = match cli.seed {
		Some(seed) => chain.generate_with(&mut StdRng::seed_from_u64(seed), cli.words),
		None => chain.generate(cli.words),
	};
	let text = words.join(" ");

	if cli.json {
		let output = JsonOutput { report: chain.report(), text };
		println!("{}", serde_json::to_string_pretty(&output)?);
	} else {
		println!("{text}");
	}

	Ok(())
}
