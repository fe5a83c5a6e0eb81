//! Shared test helpers for workspace crates.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Raw wire tag bytes.
pub mod tag {
	/// Shared flag.
	pub const SHARED: u8 = 0x40;
	/// Stream start.
	pub const STREAM_START: u8 = 0x7E;
	/// `None`.
	pub const NONE: u8 = 0x01;
	/// Global name string.
	pub const STRING_GLOBAL: u8 = 0x02;
	/// 64-bit integer.
	pub const LONG: u8 = 0x03;
	/// 32-bit integer.
	pub const INT: u8 = 0x04;
	/// 16-bit integer.
	pub const SHORT: u8 = 0x05;
	/// 8-bit integer.
	pub const BYTE: u8 = 0x06;
	/// `-1`.
	pub const INT_NEG_ONE: u8 = 0x07;
	/// `0`.
	pub const INT_ZERO: u8 = 0x08;
	/// `1`.
	pub const INT_ONE: u8 = 0x09;
	/// Double.
	pub const DOUBLE: u8 = 0x0A;
	/// Empty string.
	pub const STRING_EMPTY: u8 = 0x0E;
	/// One-byte string.
	pub const STRING_ONE: u8 = 0x0F;
	/// Codepage string.
	pub const STRING: u8 = 0x10;
	/// String table reference.
	pub const STRING_REF: u8 = 0x11;
	/// UTF-16 string.
	pub const STRING_UNICODE: u8 = 0x12;
	/// Identifier.
	pub const STRING_IDENT: u8 = 0x13;
	/// Tuple.
	pub const TUPLE: u8 = 0x14;
	/// List.
	pub const LIST: u8 = 0x15;
	/// Dictionary.
	pub const DICT: u8 = 0x16;
	/// Shared reference.
	pub const SHARED_OBJ: u8 = 0x1B;
	/// Checksum.
	pub const CHECKSUM: u8 = 0x1C;
	/// `True`.
	pub const BOOL_TRUE: u8 = 0x1F;
	/// `False`.
	pub const BOOL_FALSE: u8 = 0x20;
	/// Object.
	pub const OBJECT: u8 = 0x22;
	/// Empty tuple.
	pub const TUPLE_EMPTY: u8 = 0x24;
	/// One-element tuple.
	pub const TUPLE_ONE: u8 = 0x25;
	/// Empty list.
	pub const LIST_EMPTY: u8 = 0x26;
	/// One-element list.
	pub const LIST_ONE: u8 = 0x27;
	/// One-unit UTF-16 string.
	pub const STRING_UNICODE_ONE: u8 = 0x29;
	/// Compressed database row.
	pub const COMPRESSED_DB_ROW: u8 = 0x2A;
	/// Sub-stream.
	pub const SUB_STREAM: u8 = 0x2B;
	/// Two-element tuple.
	pub const TUPLE_TWO: u8 = 0x2C;
	/// Marker.
	pub const MARKER: u8 = 0x2D;
	/// UTF-8 string.
	pub const UTF8: u8 = 0x2E;
	/// Big integer.
	pub const BIG_INT: u8 = 0x2F;
}

/// Minimal writer for hand-built test streams.
///
/// Appends raw tags and payloads to a body; [`StreamBuilder::build`] frames
/// the body with the stream start byte, the share count and the trailing
/// share map.
#[derive(Debug, Clone, Default)]
pub struct StreamBuilder {
	body: Vec<u8>,
	share_map: Vec<i32>,
}

impl StreamBuilder {
	/// Create an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append one raw byte (usually a tag).
	pub fn tag(&mut self, tag: u8) -> &mut Self {
		self.body.push(tag);
		self
	}

	/// Append raw bytes.
	pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
		self.body.extend_from_slice(bytes);
		self
	}

	/// Append a variable-length count.
	pub fn count(&mut self, n: usize) -> &mut Self {
		if n < 0xFF {
			self.body.push(n as u8);
		} else {
			self.body.push(0xFF);
			self.body.extend_from_slice(&(n as i32).to_le_bytes());
		}
		self
	}

	/// Append a bare little-endian `i32`.
	pub fn i32_le(&mut self, value: i32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `Int` tag and value.
	pub fn int(&mut self, value: i32) -> &mut Self {
		self.tag(tag::INT).i32_le(value)
	}

	/// Append a `Long` tag and value.
	pub fn long(&mut self, value: i64) -> &mut Self {
		self.tag(tag::LONG).raw(&value.to_le_bytes())
	}

	/// Append a `Double` tag and value.
	pub fn double(&mut self, value: f64) -> &mut Self {
		self.tag(tag::DOUBLE).raw(&value.to_le_bytes())
	}

	/// Append a length-prefixed codepage string under `tag`.
	pub fn string_with(&mut self, tag: u8, text: &str) -> &mut Self {
		self.tag(tag).count(text.len()).raw(text.as_bytes())
	}

	/// Append a plain codepage string.
	pub fn string(&mut self, text: &str) -> &mut Self {
		self.string_with(tag::STRING, text)
	}

	/// Append a global name string.
	pub fn global(&mut self, text: &str) -> &mut Self {
		self.string_with(tag::STRING_GLOBAL, text)
	}

	/// Append a counted container header (`Tuple`, `List` or `Dict`).
	pub fn container(&mut self, tag: u8, count: usize) -> &mut Self {
		self.tag(tag).count(count)
	}

	/// Append an object header: object tag, then a `TupleOne` holding the class name.
	pub fn object(&mut self, class_name: &str) -> &mut Self {
		self.tag(tag::OBJECT).tag(tag::TUPLE_ONE).global(class_name)
	}

	/// Append a `blue.DBRowDescriptor` object listing `(name, type code)` columns.
	pub fn row_descriptor(&mut self, columns: &[(&str, i32)]) -> &mut Self {
		self.tag(tag::OBJECT)
			.tag(tag::TUPLE_TWO)
			.global("blue.DBRowDescriptor")
			.tag(tag::TUPLE_ONE)
			.container(tag::TUPLE, columns.len());
		for (name, code) in columns {
			self.tag(tag::TUPLE_TWO).string(name).int(*code);
		}
		self
	}

	/// Append a compressed row: descriptor, then `data` packed as literal runs.
	pub fn db_row(&mut self, columns: &[(&str, i32)], data: &[u8]) -> &mut Self {
		let packed = rle_literals(data);
		self.tag(tag::COMPRESSED_DB_ROW).row_descriptor(columns).count(packed.len()).raw(&packed)
	}

	/// Append a marker.
	pub fn marker(&mut self) -> &mut Self {
		self.tag(tag::MARKER)
	}

	/// Append a length-prefixed nested stream.
	pub fn sub_stream(&mut self, stream: &[u8]) -> &mut Self {
		self.tag(tag::SUB_STREAM).count(stream.len()).raw(stream)
	}

	/// Set the trailing share map (1-based slot per shared node, in wire order).
	pub fn share_map(&mut self, entries: &[i32]) -> &mut Self {
		self.share_map = entries.to_vec();
		self
	}

	/// Body bytes without framing.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Frame the body into a complete stream.
	pub fn build(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(5 + self.body.len() + self.share_map.len() * 4);
		out.push(tag::STREAM_START);
		out.extend_from_slice(&(self.share_map.len() as i32).to_le_bytes());
		out.extend_from_slice(&self.body);
		for entry in &self.share_map {
			out.extend_from_slice(&entry.to_le_bytes());
		}
		out
	}
}

/// Pack bytes into row RLE using literal runs only.
pub fn rle_literals(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len() + data.len() / 16 + 1);
	for chunk in data.chunks(16) {
		let (top, bottom) = chunk.split_at(chunk.len().min(8));
		let tlen = 8 - top.len();
		let blen = if bottom.is_empty() { 0 } else { 8 - bottom.len() };
		out.push(((blen << 4) | tlen) as u8);
		out.extend_from_slice(top);
		out.extend_from_slice(bottom);
	}
	out
}

/// Compress with a zlib header and Adler-32 trailer.
pub fn zlib(data: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data).expect("write to vec");
	encoder.finish().expect("finish zlib stream")
}

/// Create a fresh, empty scratch directory for one test.
pub fn scratch_dir(label: &str) -> PathBuf {
	static NEXT: AtomicUsize = AtomicUsize::new(0);
	let id = NEXT.fetch_add(1, Ordering::Relaxed);
	let dir = std::env::temp_dir().join(format!("evecache-{label}-{}-{id}", std::process::id()));
	let _ = std::fs::remove_dir_all(&dir);
	std::fs::create_dir_all(&dir).expect("create scratch dir");
	dir
}
