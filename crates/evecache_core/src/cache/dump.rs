use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::decode::{DecodeOptions, decode_stream};
use crate::cache::node::Node;
use crate::cache::Result;

/// Extension given to structure dump files.
pub const STRUCTURE_EXTENSION: &str = "structure";

const HEX_LINE: usize = 16;

/// Render the decoded node tree, one node per line.
///
/// Sub-streams are expanded regardless of `opt.expand_substreams`. Each line
/// is the node label followed by a pre-order id, indented two spaces per
/// level.
pub fn dump_structure(bytes: &[u8], opt: &DecodeOptions) -> Result<String> {
	let opt = DecodeOptions {
		expand_substreams: true,
		..opt.clone()
	};
	let stream = decode_stream(bytes, &opt)?;

	let mut out = String::new();
	let mut next_id = 0;
	render(&stream, 0, &mut next_id, &mut out);
	Ok(out)
}

fn render(node: &Node, level: usize, next_id: &mut usize, out: &mut String) {
	let id = *next_id;
	*next_id += 1;
	let _ = writeln!(out, "{:indent$}{node}[{id:02}]", "", indent = level * 2);

	let children = match node {
		Node::CachedObject(cached) => cached.object.as_ref().map(std::slice::from_ref).unwrap_or_default(),
		_ => node.members(),
	};
	for child in children {
		render(child, level + 1, next_id, out);
	}
}

/// Decode `path` and write its structure dump beside it with the extension replaced.
pub fn write_structure_dump(path: impl AsRef<Path>, opt: &DecodeOptions) -> Result<PathBuf> {
	let path = path.as_ref();
	let bytes = fs::read(path)?;
	let text = dump_structure(&bytes, opt)?;
	let out = path.with_extension(STRUCTURE_EXTENSION);
	fs::write(&out, text)?;
	Ok(out)
}

/// Classic hex view: offset, dash-separated hex bytes, printable ASCII.
pub fn hex_dump(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len() * 4 + bytes.len() / HEX_LINE * 8);
	for (line, chunk) in bytes.chunks(HEX_LINE).enumerate() {
		let hex: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
		let ascii: String = chunk
			.iter()
			.map(|byte| if (0x20..=0x7F).contains(byte) { char::from(*byte) } else { '.' })
			.collect();
		let _ = writeln!(out, "{:06X} {} {ascii}", line * HEX_LINE, hex.join("-"));
	}
	out
}
