use std::path::PathBuf;

use evecache::cache::{CacheFile, DecodeOptions, Result};
use serde_json::json;

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{emit_json, expand_cached, value_to_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Decode embedded cached-object payloads in place.
	#[arg(long)]
	pub cached: bool,
	#[arg(long)]
	pub max_items: Option<usize>,
	#[arg(long)]
	pub max_print_depth: Option<u32>,
}

/// Decode a cache file and print its key and value.
pub fn run(args: Args, opt: &DecodeOptions) -> Result<()> {
	let Args {
		path,
		json,
		cached,
		max_items,
		max_print_depth,
	} = args;

	let file = CacheFile::open(&path)?;
	let mut entry = file.entry(opt)?;
	if cached {
		entry.value = expand_cached(entry.value, opt)?;
	}

	if json {
		emit_json(&json!({
			"path": path.display().to_string(),
			"method": entry.method(),
			"key": value_to_json(&entry.key),
			"value": value_to_json(&entry.value),
		}));
		return Ok(());
	}

	let mut options = PrintOptions::default();
	if let Some(max_items) = max_items {
		options.max_list_items = max_items;
		options.max_map_entries = max_items;
	}
	if let Some(max_print_depth) = max_print_depth {
		options.max_print_depth = max_print_depth;
	}

	println!("path: {}", path.display());
	println!("method: {}", entry.method().unwrap_or("-"));
	println!("key:");
	print_value(&entry.key, options);
	println!("value:");
	print_value(&entry.value, options);
	Ok(())
}
