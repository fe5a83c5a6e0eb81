use std::fs;
use std::path::PathBuf;

use evecache::cache::{Result, hex_dump};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Only show the first N bytes.
	#[arg(long)]
	pub limit: Option<usize>,
}

pub fn run(args: Args) -> Result<()> {
	let bytes = fs::read(&args.path)?;
	let end = args.limit.map_or(bytes.len(), |limit| limit.min(bytes.len()));
	print!("{}", hex_dump(&bytes[..end]));
	Ok(())
}
