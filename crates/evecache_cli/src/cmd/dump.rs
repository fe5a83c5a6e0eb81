use std::fs;
use std::path::PathBuf;

use evecache::cache::{DecodeOptions, Result, dump_structure, write_structure_dump};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Write to this path instead of beside the input.
	#[arg(long, conflicts_with = "stdout")]
	pub out: Option<PathBuf>,
	#[arg(long)]
	pub stdout: bool,
}

/// Write the structure dump of one cache file.
pub fn run(args: Args, opt: &DecodeOptions) -> Result<()> {
	let Args { path, out, stdout } = args;

	if !stdout && out.is_none() {
		let written = write_structure_dump(&path, opt)?;
		println!("wrote: {}", written.display());
		return Ok(());
	}

	let bytes = fs::read(&path)?;
	let text = dump_structure(&bytes, opt)?;
	match out {
		Some(out) => {
			fs::write(&out, text)?;
			println!("wrote: {}", out.display());
		}
		None => print!("{text}"),
	}
	Ok(())
}
