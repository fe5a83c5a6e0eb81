#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use evecache::cache::{DecodeOptions, Result, StringTable};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "evecache", about = "Game client .cache file inspection tools")]
struct Cli {
	/// Comma-separated string table resolving string-reference tags.
	#[arg(long, global = true)]
	strings: Option<PathBuf>,
	/// Maximum node nesting depth while decoding.
	#[arg(long, global = true)]
	max_depth: Option<u32>,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Stream framing and share map facts.
	Info(cmd::info::Args),
	/// Decode a file into its key and value.
	Decode(cmd::decode::Args),
	/// Write the node structure dump.
	Dump(cmd::dump::Args),
	/// Hex and ASCII view of the raw bytes.
	Hex(cmd::hex::Args),
	/// Find and decode every cache file in a directory.
	Scan(cmd::scan::Args),
}

fn main() {
	init_tracing();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run() -> Result<()> {
	let cli = Cli::parse();
	let opt = decode_options(cli.strings.as_deref(), cli.max_depth)?;

	match cli.command {
		Commands::Info(args) => cmd::info::run(args, &opt),
		Commands::Decode(args) => cmd::decode::run(args, &opt),
		Commands::Dump(args) => cmd::dump::run(args, &opt),
		Commands::Hex(args) => cmd::hex::run(args),
		Commands::Scan(args) => cmd::scan::run(args, &opt),
	}
}

fn decode_options(strings: Option<&std::path::Path>, max_depth: Option<u32>) -> Result<DecodeOptions> {
	let mut opt = DecodeOptions::default();
	if let Some(path) = strings {
		opt = opt.with_strings(Arc::new(StringTable::load(path)?));
	}
	if let Some(max_depth) = max_depth {
		opt.max_depth = max_depth;
	}
	Ok(opt)
}
