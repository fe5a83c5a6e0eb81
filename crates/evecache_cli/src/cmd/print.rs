use std::fmt::Write as _;

use evecache::cache::Value;

use crate::cmd::util::key_label;

/// Output truncation limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of entries printed for a single map.
	pub max_map_entries: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for lists.
	pub max_list_items: usize,
	/// Maximum recursive print depth for nested lists/maps.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_map_entries: 80,
			max_string_len: 200,
			max_list_items: 32,
			max_print_depth: 8,
		}
	}
}

impl PrintOptions {
	/// Preset for scanning many files where only the top of each tree matters.
	pub fn for_summary() -> Self {
		Self {
			max_map_entries: 8,
			max_string_len: 80,
			max_list_items: 4,
			max_print_depth: 2,
		}
	}
}

/// Print one projected value tree.
pub fn print_value(value: &Value, options: PrintOptions) {
	print!("{}", render_value(value, options));
}

/// Render a value tree as indented text.
pub fn render_value(value: &Value, options: PrintOptions) -> String {
	let mut out = String::new();
	render(value, 0, 0, options, &mut out);
	out
}

fn render(value: &Value, indent: usize, depth: u32, options: PrintOptions, out: &mut String) {
	let pad = " ".repeat(indent);
	match value {
		Value::List(items) => {
			if depth >= options.max_print_depth {
				let _ = writeln!(out, "{pad}[... {} items]", items.len());
				return;
			}
			let _ = writeln!(out, "{pad}[");
			for item in items.iter().take(options.max_list_items) {
				render(item, indent + 2, depth + 1, options, out);
			}
			if items.len() > options.max_list_items {
				let _ = writeln!(out, "{pad}  ... {} more", items.len() - options.max_list_items);
			}
			let _ = writeln!(out, "{pad}]");
		}
		Value::Map(map) => {
			if depth >= options.max_print_depth {
				let _ = writeln!(out, "{pad}{{... {} entries}}", map.len());
				return;
			}
			let _ = writeln!(out, "{pad}{{");
			for (key, item) in map.iter().take(options.max_map_entries) {
				if is_leaf(item) {
					let _ = writeln!(out, "{pad}  {}: {}", key_label(key), scalar(item, options));
				} else {
					let _ = writeln!(out, "{pad}  {}:", key_label(key));
					render(item, indent + 4, depth + 1, options, out);
				}
			}
			if map.len() > options.max_map_entries {
				let _ = writeln!(out, "{pad}  ... {} more", map.len() - options.max_map_entries);
			}
			let _ = writeln!(out, "{pad}}}");
		}
		leaf => {
			let _ = writeln!(out, "{pad}{}", scalar(leaf, options));
		}
	}
}

fn is_leaf(value: &Value) -> bool {
	!matches!(value, Value::List(_) | Value::Map(_))
}

fn scalar(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Bool(v) => v.to_string(),
		Value::Int(v) => v.to_string(),
		Value::Float(v) => v.to_string(),
		Value::String(v) => format!("\"{}\"", truncate(v, options.max_string_len)),
		Value::Bytes(v) => format!("bytes[{}]", v.len()),
		Value::StringRef(id) => format!("strref#{id}"),
		Value::Cached(cached) => match &cached.raw {
			Some(raw) => format!("cached[{} bytes{}]", raw.len(), if cached.compressed { ", zlib" } else { "" }),
			None => "cached[decoded]".to_owned(),
		},
		Value::List(items) => format!("[{} items]", items.len()),
		Value::Map(map) => format!("{{{} entries}}", map.len()),
	}
}

fn truncate(text: &str, max_chars: usize) -> String {
	let mut out: String = text.chars().take(max_chars).collect();
	if text.chars().count() > max_chars {
		out.push_str("...");
	}
	out
}
