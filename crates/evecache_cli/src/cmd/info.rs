use std::path::PathBuf;

use evecache::cache::{CacheFile, DecodeOptions, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print framing facts without decoding any nodes.
pub fn run(args: Args, opt: &DecodeOptions) -> Result<()> {
	let Args { path, json } = args;

	let file = CacheFile::open(&path)?;
	let info = file.info(opt)?;

	if json {
		emit_json(&InfoJson {
			path: path.display().to_string(),
			len: info.len,
			share_count: info.share_count,
			data_end: info.data_end,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("len: {}", info.len);
	println!("share_count: {}", info.share_count);
	println!("data_end: {}", info.data_end);
	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	len: usize,
	share_count: usize,
	data_end: usize,
}
