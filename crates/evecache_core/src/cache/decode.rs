use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::bytes::{Cursor, StringEncoding};
use crate::cache::cached::CachedObjectRef;
use crate::cache::node::{IntKind, Node, ObjectNode, StreamKind, StreamNode, StringKind, Text};
use crate::cache::share::ShareTable;
use crate::cache::strings::StringTable;
use crate::cache::tag::{SHARED_FLAG, Tag};
use crate::cache::value::Value;
use crate::cache::{CacheError, Result};

const BIG_INT_MAX_LEN: usize = 8;

/// Runtime limits and behavior switches for stream decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum node nesting depth.
	pub max_depth: u32,
	/// Maximum inflated size of one cached payload.
	pub max_decompressed_bytes: usize,
	/// Decode embedded sub-streams into their placeholders instead of skipping them.
	pub expand_substreams: bool,
	/// Table resolving string-reference tags; unresolved references stay indices.
	pub strings: Option<Arc<StringTable>>,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 256,
			max_decompressed_bytes: 256 << 20,
			expand_substreams: false,
			strings: None,
		}
	}
}

impl DecodeOptions {
	/// Preset used when rendering structure dumps.
	pub fn for_structure_dump() -> Self {
		Self {
			expand_substreams: true,
			..Self::default()
		}
	}

	/// Attach a string table.
	pub fn with_strings(mut self, strings: Arc<StringTable>) -> Self {
		self.strings = Some(strings);
		self
	}
}

/// One decode session over a single stream buffer.
///
/// Owns every piece of mutable decode state: the cursor, the share table,
/// the nesting depth and the raw sub-stream switch used while reading a
/// cached-object wrapper.
#[derive(Debug)]
pub struct StreamDecoder<'a> {
	cursor: Cursor<'a>,
	shares: ShareTable,
	opt: &'a DecodeOptions,
	depth: u32,
	raw_substreams: bool,
}

impl<'a> StreamDecoder<'a> {
	/// Validate the stream header and share map, positioning at the first node.
	pub fn open(bytes: &'a [u8], opt: &'a DecodeOptions) -> Result<Self> {
		Self::open_at_depth(bytes, opt, 0)
	}

	fn open_at_depth(bytes: &'a [u8], opt: &'a DecodeOptions, depth: u32) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);
		let shares = ShareTable::read(&mut cursor)?;
		debug!(len = bytes.len(), shares = shares.len(), data_end = cursor.end(), "opened stream");
		Ok(Self {
			cursor,
			shares,
			opt,
			depth,
			raw_substreams: false,
		})
	}

	/// Decoder over bytes without a stream header or share map.
	pub(crate) fn unframed(bytes: &'a [u8], opt: &'a DecodeOptions, depth: u32) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			shares: ShareTable::empty(),
			opt,
			depth,
			raw_substreams: false,
		}
	}

	/// Shared-object table of this session.
	pub fn shares(&self) -> &ShareTable {
		&self.shares
	}

	/// Current cursor.
	pub fn cursor(&self) -> &Cursor<'a> {
		&self.cursor
	}

	pub(crate) fn cursor_mut(&mut self) -> &mut Cursor<'a> {
		&mut self.cursor
	}

	pub(crate) fn options(&self) -> &'a DecodeOptions {
		self.opt
	}

	pub(crate) fn depth(&self) -> u32 {
		self.depth
	}

	/// Decode every remaining node into a top-level stream node.
	pub fn decode_all(mut self) -> Result<Node> {
		let members = self.decode_members()?;
		Ok(Node::Stream(StreamNode {
			kind: StreamKind::Top,
			length: self.cursor.len(),
			members,
		}))
	}

	fn decode_members(&mut self) -> Result<Vec<Node>> {
		let mut members = Vec::new();
		while !self.cursor.at_end() {
			if let Some(node) = self.decode_node()? {
				members.push(node);
			}
		}
		Ok(members)
	}

	/// Decode one tag; `Ok(None)` means a marker was read.
	pub fn decode_node(&mut self) -> Result<Option<Node>> {
		if self.depth >= self.opt.max_depth {
			return Err(CacheError::DepthExceeded { max_depth: self.opt.max_depth });
		}

		self.depth += 1;
		let node = self.dispatch();
		self.depth -= 1;
		node
	}

	/// Decode one node where a marker is not acceptable.
	pub(crate) fn decode_value(&mut self) -> Result<Node> {
		let at = self.cursor.pos();
		self.decode_node()?.ok_or(CacheError::UnexpectedMarker {
			tag: Tag::Marker as u8,
			at,
		})
	}

	/// Decode nodes until one is not a marker.
	fn decode_skipping_markers(&mut self) -> Result<Node> {
		loop {
			if let Some(node) = self.decode_node()? {
				return Ok(node);
			}
		}
	}

	/// Decode exactly `count` children; markers in between do not count.
	fn decode_children(&mut self, count: usize) -> Result<Vec<Node>> {
		let mut items = Vec::with_capacity(count.min(self.cursor.remaining()));
		while items.len() < count {
			items.push(self.decode_skipping_markers()?);
		}
		Ok(items)
	}

	fn dispatch(&mut self) -> Result<Option<Node>> {
		let at = self.cursor.pos();
		let byte = self.cursor.read_u8()?;
		let (tag, shared) = Tag::split(byte);
		let Some(tag) = tag else {
			if byte & !SHARED_FLAG == 0 {
				return Err(CacheError::UnexpectedMarker { tag: byte, at });
			}
			return Err(CacheError::UnknownTag { tag: byte, at });
		};

		if tag == Tag::Marker {
			if shared {
				return Err(CacheError::UnexpectedMarker { tag: byte, at });
			}
			return Ok(None);
		}

		let slot = if tag.is_shareable() { self.shares.reserve_slot(shared)? } else { 0 };
		let node = self.decode_tagged(tag, byte, at)?;
		self.shares.update_slot(slot, &node)?;
		Ok(Some(node))
	}

	fn decode_tagged(&mut self, tag: Tag, byte: u8, at: usize) -> Result<Node> {
		Ok(match tag {
			Tag::None => Node::None,
			Tag::StringGlobal => self.read_string(StringKind::Global)?,
			Tag::Long => int(IntKind::Long, self.cursor.read_i64()?),
			Tag::Int => int(IntKind::Int, i64::from(self.cursor.read_i32()?)),
			Tag::Short => int(IntKind::Short, i64::from(self.cursor.read_i16()?)),
			Tag::Byte => int(IntKind::Byte, i64::from(self.cursor.read_u8()?)),
			Tag::IntNegOne => Node::int(-1),
			Tag::IntZero => Node::int(0),
			Tag::IntOne => Node::int(1),
			Tag::Double => Node::Double(self.cursor.read_f64()?),
			Tag::DoubleZero => Node::Double(0.0),
			Tag::StringLong | Tag::String => self.read_string(StringKind::Codepage)?,
			Tag::StringEmpty => text_node(StringKind::Codepage, ""),
			Tag::StringOne => Node::String {
				kind: StringKind::Codepage,
				text: self.cursor.read_string(1, StringEncoding::Codepage)?,
			},
			Tag::StringRef => {
				let id = self.cursor.read_u8()?;
				self.resolve_string_ref(id)
			}
			Tag::StringUnicode => {
				let units = self.cursor.read_len()?;
				let len = units.checked_mul(2).ok_or(CacheError::OutOfData {
					at: self.cursor.pos(),
					need: usize::MAX,
					rem: self.cursor.remaining(),
				})?;
				Node::String {
					kind: StringKind::Utf16,
					text: self.cursor.read_string(len, StringEncoding::Utf16)?,
				}
			}
			Tag::StringIdent => self.read_string(StringKind::Ident)?,
			Tag::Tuple => {
				let count = self.cursor.read_len()?;
				Node::Tuple(self.decode_children(count)?)
			}
			Tag::List => {
				let count = self.cursor.read_len()?;
				Node::List(self.decode_children(count)?)
			}
			Tag::Dict => {
				let pairs = self.cursor.read_len()?;
				Node::Dict(self.decode_children(pairs.saturating_mul(2))?)
			}
			Tag::ClassObject | Tag::Object | Tag::NewObj => self.decode_object()?,
			Tag::SharedObj => {
				let index = self.cursor.read_count()?;
				self.shares.get_shared(i64::from(index) - 1)?
			}
			Tag::Checksum => {
				self.cursor.read_i32()?;
				text_node(StringKind::Checksum, "checksum")
			}
			Tag::BoolTrue => Node::Bool(true),
			Tag::BoolFalse => Node::Bool(false),
			Tag::TupleEmpty => Node::Tuple(Vec::new()),
			Tag::TupleOne => Node::Tuple(self.decode_children(1)?),
			Tag::ListEmpty => Node::List(Vec::new()),
			Tag::ListOne => Node::List(self.decode_children(1)?),
			Tag::StringUnicodeEmpty => text_node(StringKind::Utf16, ""),
			Tag::StringUnicodeOne => Node::String {
				kind: StringKind::Utf16,
				text: self.cursor.read_string(2, StringEncoding::Utf16)?,
			},
			Tag::CompressedDBRow => self.decode_dbrow()?,
			Tag::SubStream => self.decode_substream()?,
			Tag::TupleTwo => Node::Tuple(self.decode_children(2)?),
			Tag::Utf8 => {
				let len = self.cursor.read_len()?;
				Node::String {
					kind: StringKind::Utf8,
					text: self.cursor.read_string(len, StringEncoding::Utf8)?,
				}
			}
			Tag::BigInt => int(IntKind::BigInt, self.read_big_int()?),
			Tag::Marker | Tag::StreamStart => return Err(CacheError::UnknownTag { tag: byte, at }),
		})
	}

	fn read_string(&mut self, kind: StringKind) -> Result<Node> {
		let len = self.cursor.read_len()?;
		Ok(Node::String {
			kind,
			text: self.cursor.read_string(len, StringEncoding::Codepage)?,
		})
	}

	fn resolve_string_ref(&self, id: u8) -> Node {
		match self.opt.strings.as_deref().and_then(|strings| strings.get(id)) {
			Some(text) => text_node(StringKind::Table, text),
			None => Node::StringRef(id),
		}
	}

	/// Little-endian two's complement of up to eight bytes.
	fn read_big_int(&mut self) -> Result<i64> {
		let len = self.cursor.read_len()?;
		if len > BIG_INT_MAX_LEN {
			return Err(CacheError::BigIntTooWide { len });
		}

		let raw = self.cursor.read_exact(len)?;
		let fill = match raw.last() {
			Some(last) if last & 0x80 != 0 => 0xFF,
			_ => 0x00,
		};
		let mut buf = [fill; BIG_INT_MAX_LEN];
		buf[..len].copy_from_slice(raw);
		Ok(i64::from_le_bytes(buf))
	}

	fn decode_object(&mut self) -> Result<Node> {
		let outer_raw = self.raw_substreams;
		self.raw_substreams = false;

		let header = self.decode_skipping_markers()?;
		let mut object = ObjectNode::from_header(header);
		let shape = object.shape;
		trace!(class = object.class_name().unwrap_or_default(), shape = shape.as_str(), "object");

		if shape.has_payload_member() {
			let payload = self.decode_value()?;
			object.members.push(payload);
		}

		if shape.wraps_cached_object() {
			self.raw_substreams = true;
			let wrapped = self.decode_value()?;
			self.raw_substreams = false;
			let cached = CachedObjectRef::from_node(&wrapped)?;
			object.members.push(Node::CachedObject(Box::new(cached)));
		}

		if shape.is_row_list() {
			while let Some(row) = self.decode_node()? {
				object.members.push(row);
			}
			if self.decode_node()?.is_some() {
				return Err(CacheError::ExpectedMarkerNotFound { at: self.cursor.pos() });
			}
		}

		// A value right after the header is the single-marker short form and is dropped.
		if shape.is_row_dict() && self.decode_node()?.is_none() {
			while let Some(row) = self.decode_node()? {
				object.members.push(row);
			}
		}

		self.raw_substreams = outer_raw;
		Ok(Node::Object(object))
	}

	fn decode_substream(&mut self) -> Result<Node> {
		let length = self.cursor.read_len()?;
		let region = self.cursor.read_exact(length)?;

		if self.raw_substreams {
			return Ok(Node::String {
				kind: StringKind::Raw,
				text: Text::Raw(region.to_vec()),
			});
		}

		let members = if self.opt.expand_substreams {
			StreamDecoder::open_at_depth(region, self.opt, self.depth)?.decode_members()?
		} else {
			Vec::new()
		};

		Ok(Node::Stream(StreamNode {
			kind: StreamKind::Sub,
			length,
			members,
		}))
	}
}

fn int(kind: IntKind, value: i64) -> Node {
	Node::Int { kind, value }
}

fn text_node(kind: StringKind, text: &str) -> Node {
	Node::String {
		kind,
		text: Text::Str(text.into()),
	}
}

/// Decode a complete stream buffer into its top-level stream node.
pub fn decode_stream(bytes: &[u8], opt: &DecodeOptions) -> Result<Node> {
	StreamDecoder::open(bytes, opt)?.decode_all()
}

/// Decode a stream and project every top-level member.
pub fn decode_values(bytes: &[u8], opt: &DecodeOptions) -> Result<Vec<Value>> {
	let stream = decode_stream(bytes, opt)?;
	Ok(stream.members().iter().map(Node::to_value).collect())
}

/// Decode a cache file body into its `(key, value)` entry.
///
/// The first top-level member must be a tuple or list. Its first item is the
/// key; the value is the last item of a pair, otherwise the list of items
/// after the key.
pub fn decode_entry(bytes: &[u8], opt: &DecodeOptions) -> Result<(Value, Value)> {
	let stream = decode_stream(bytes, opt)?;
	entry_from_stream(&stream)
}

pub(crate) fn entry_from_stream(stream: &Node) -> Result<(Value, Value)> {
	let items = match stream.members().first() {
		Some(Node::Tuple(items) | Node::List(items)) => items,
		_ => return Err(CacheError::NotAnEntry),
	};

	let (key, rest) = items.split_first().ok_or(CacheError::NotAnEntry)?;
	let value = match rest {
		[value] => value.to_value(),
		_ => Value::List(rest.iter().map(Node::to_value).collect()),
	};
	Ok((key.to_value(), value))
}
