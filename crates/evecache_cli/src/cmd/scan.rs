use std::path::{Path, PathBuf};

use evecache::cache::{CacheFile, DecodeOptions, MethodFilter, Result, scan_dir};
use rayon::prelude::*;
use tracing::warn;

use crate::cmd::print::{PrintOptions, render_value};
use crate::cmd::util::{emit_json, value_to_json};

#[derive(clap::Args)]
pub struct Args {
	pub dir: PathBuf,
	/// Keep only files containing one of these method names.
	#[arg(long)]
	pub include: Vec<String>,
	/// Drop files containing any of these method names; ignored when `--include` is set.
	#[arg(long)]
	pub exclude: Vec<String>,
	/// Print a short value summary under each file.
	#[arg(long)]
	pub show: bool,
	#[arg(long)]
	pub json: bool,
}

struct Scanned {
	path: PathBuf,
	method: Option<String>,
	key: serde_json::Value,
	value: evecache::cache::Value,
}

/// Decode every matching cache file in a directory, skipping files that fail.
pub fn run(args: Args, opt: &DecodeOptions) -> Result<()> {
	let Args {
		dir,
		include,
		exclude,
		show,
		json,
	} = args;

	let filter = MethodFilter::new().include(include).exclude(exclude);
	let paths = scan_dir(&dir, &filter)?;

	let results: Vec<Option<Scanned>> = paths.par_iter().map(|path| decode_one(path, opt)).collect();
	let failed = results.iter().filter(|item| item.is_none()).count();
	let decoded: Vec<Scanned> = results.into_iter().flatten().collect();

	if json {
		let files: Vec<serde_json::Value> = decoded
			.iter()
			.map(|item| {
				serde_json::json!({
					"path": item.path.display().to_string(),
					"method": item.method,
					"key": item.key,
				})
			})
			.collect();
		emit_json(&serde_json::json!({
			"dir": dir.display().to_string(),
			"decoded": decoded.len(),
			"failed": failed,
			"files": files,
		}));
		return Ok(());
	}

	for item in &decoded {
		println!("{}\t{}", item.path.display(), item.method.as_deref().unwrap_or("-"));
		if show {
			for line in render_value(&item.value, PrintOptions::for_summary()).lines() {
				println!("  {line}");
			}
		}
	}
	println!("decoded: {} failed: {}", decoded.len(), failed);
	Ok(())
}

fn decode_one(path: &Path, opt: &DecodeOptions) -> Option<Scanned> {
	let entry = CacheFile::open(path).and_then(|file| file.entry(opt));
	match entry {
		Ok(entry) => Some(Scanned {
			path: path.to_path_buf(),
			method: entry.method().map(str::to_owned),
			key: value_to_json(&entry.key),
			value: entry.value,
		}),
		Err(err) => {
			warn!(path = %path.display(), error = %err, "skipping undecodable cache file");
			None
		}
	}
}
