use std::fmt;

use crate::cache::cached::CachedObjectRef;
use crate::cache::shape::ObjectShape;

/// String payload: decoded text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
	/// Decoded text.
	Str(Box<str>),
	/// Undecoded bytes (embedded sub-stream payloads).
	Raw(Vec<u8>),
}

impl Text {
	/// Decode single-byte codepage text; each byte maps to the code point of the same value.
	pub fn from_codepage(raw: &[u8]) -> Self {
		match std::str::from_utf8(raw) {
			Ok(text) if text.is_ascii() => Self::Str(text.into()),
			_ => Self::Str(raw.iter().map(|byte| char::from(*byte)).collect::<String>().into_boxed_str()),
		}
	}

	/// Borrow decoded text, if this is not raw bytes.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(text) => Some(text),
			Self::Raw(_) => None,
		}
	}

	/// Byte view: raw bytes as-is, text re-encoded to its codepage bytes where possible.
	pub fn to_bytes(&self) -> Vec<u8> {
		match self {
			Self::Raw(bytes) => bytes.clone(),
			Self::Str(text) => text.chars().map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?')).collect(),
		}
	}
}

/// Integer tag the value was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
	/// 8-bit.
	Byte,
	/// 16-bit.
	Short,
	/// 32-bit, including the `-1`/`0`/`1` singletons.
	Int,
	/// 64-bit.
	Long,
	/// Variable-width little-endian.
	BigInt,
}

/// Origin of a string node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
	/// Default codepage string.
	Codepage,
	/// Global name (type, function or class).
	Global,
	/// Identifier.
	Ident,
	/// UTF-8 string.
	Utf8,
	/// UTF-16 string.
	Utf16,
	/// Resolved through the string table.
	Table,
	/// Checksum placeholder.
	Checksum,
	/// Raw embedded sub-stream bytes.
	Raw,
}

/// Top-level stream or embedded sub-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
	/// Whole decoded buffer.
	Top,
	/// Length-delimited region inside a parent stream.
	Sub,
}

/// Class object: header member first, payload members after.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
	/// Classification computed from the class name.
	pub shape: ObjectShape,
	/// Header followed by shape-specific payload.
	pub members: Vec<Node>,
}

impl ObjectNode {
	/// Build from a decoded header member, classifying it.
	pub fn from_header(header: Node) -> Self {
		let shape = header.class_name().map(ObjectShape::classify).unwrap_or(ObjectShape::Plain);
		Self { shape, members: vec![header] }
	}

	/// Class name found by following first members down to a string.
	pub fn class_name(&self) -> Option<&str> {
		self.members.first().and_then(Node::class_name)
	}

	/// Header member, if decoded.
	pub fn header(&self) -> Option<&Node> {
		self.members.first()
	}

	/// Members after the header.
	pub fn payload(&self) -> &[Node] {
		self.members.get(1..).unwrap_or(&[])
	}
}

/// Stream container.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamNode {
	/// Top-level or embedded.
	pub kind: StreamKind,
	/// Byte length of the region in the parent buffer.
	pub length: usize,
	/// Decoded members; empty for skipped sub-streams.
	pub members: Vec<Node>,
}

/// One decoded node of the stream tree.
///
/// `Clone` is a deep copy; nodes never share children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// `None`.
	None,
	/// Boolean.
	Bool(bool),
	/// Integer widened to 64 bits.
	Int {
		/// Wire width.
		kind: IntKind,
		/// Value.
		value: i64,
	},
	/// Double.
	Double(f64),
	/// String.
	String {
		/// Wire origin.
		kind: StringKind,
		/// Payload.
		text: Text,
	},
	/// String table index that no table resolved.
	StringRef(u8),
	/// Fixed-arity tuple.
	Tuple(Vec<Node>),
	/// List.
	List(Vec<Node>),
	/// Dictionary members in wire order: value, key, value, key, ...
	Dict(Vec<Node>),
	/// Class object.
	Object(ObjectNode),
	/// Cached object with a lazily decoded payload.
	CachedObject(Box<CachedObjectRef>),
	/// Stream or sub-stream.
	Stream(StreamNode),
}

impl Node {
	/// 32-bit integer node.
	pub fn int(value: i64) -> Self {
		Self::Int { kind: IntKind::Int, value }
	}

	/// Codepage string node.
	pub fn string(text: impl Into<Box<str>>) -> Self {
		Self::String {
			kind: StringKind::Codepage,
			text: Text::Str(text.into()),
		}
	}

	/// Child nodes; empty for scalars and cached objects.
	pub fn members(&self) -> &[Node] {
		match self {
			Self::Tuple(items) | Self::List(items) | Self::Dict(items) => items,
			Self::Object(object) => &object.members,
			Self::Stream(stream) => &stream.members,
			_ => &[],
		}
	}

	/// Borrow string text.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String { text, .. } => text.as_str(),
			_ => None,
		}
	}

	/// Integer payload, including booleans as 0/1.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int { value, .. } => Some(*value),
			Self::Bool(value) => Some(i64::from(*value)),
			_ => None,
		}
	}

	/// Truthiness of flag-like members.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::None => false,
			Self::Bool(value) => *value,
			Self::Int { value, .. } => *value != 0,
			Self::Double(value) => *value != 0.0,
			_ => true,
		}
	}

	/// Follow first members down to a leaf and return it if it is text.
	pub fn class_name(&self) -> Option<&str> {
		let mut current = self;
		while let Some(first) = current.members().first() {
			current = first;
		}
		current.as_str()
	}

	/// Short variant label used by the structure dump.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::None => "None",
			Self::Bool(_) => "Bool",
			Self::Int { kind, .. } => match kind {
				IntKind::Byte => "Byte",
				IntKind::Short => "Short",
				IntKind::Int => "Int",
				IntKind::Long => "Long",
				IntKind::BigInt => "BigInt",
			},
			Self::Double(_) => "Double",
			Self::String { .. } => "String",
			Self::StringRef(_) => "StringRef",
			Self::Tuple(_) => "Tuple",
			Self::List(_) => "List",
			Self::Dict(_) => "Dict",
			Self::Object(_) => "Object",
			Self::CachedObject(_) => "CachedObject",
			Self::Stream(stream) => match stream.kind {
				StreamKind::Top => "Stream",
				StreamKind::Sub => "SubStream",
			},
		}
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = self.kind_label();
		match self {
			Self::None => write!(f, "<{label}>"),
			Self::Bool(value) => write!(f, "<{label} {value}>"),
			Self::Int { value, .. } => write!(f, "<{label} {value}>"),
			Self::Double(value) => write!(f, "<{label} {value}>"),
			Self::String { text: Text::Str(text), .. } => write!(f, "<{label} '{text}'>"),
			Self::String { text: Text::Raw(bytes), .. } => write!(f, "<{label} raw[{}]>", bytes.len()),
			Self::StringRef(id) => write!(f, "<{label} {id}>"),
			Self::Tuple(items) | Self::List(items) | Self::Dict(items) => write!(f, "<{label} [{}]>", items.len()),
			Self::Object(object) => write!(f, "<{label} '{}' {}>", object.class_name().unwrap_or(""), object.shape.as_str()),
			Self::CachedObject(cached) => write!(f, "<{label} {}>", if cached.is_decoded() { "decoded" } else { "pending" }),
			Self::Stream(stream) => write!(f, "<{label} len={}>", stream.length),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{Node, ObjectNode, Text};
	use crate::cache::ObjectShape;

	#[test]
	fn class_name_follows_first_members() {
		let header = Node::Tuple(vec![Node::string("dbutil.RowList"), Node::Tuple(vec![])]);
		let object = ObjectNode::from_header(header);
		assert_eq!(object.class_name(), Some("dbutil.RowList"));
		assert_eq!(object.shape, ObjectShape::RowList);
		assert!(object.payload().is_empty());
	}

	#[test]
	fn non_text_leaf_has_no_class_name() {
		let object = ObjectNode::from_header(Node::Tuple(vec![Node::int(3)]));
		assert_eq!(object.class_name(), None);
		assert_eq!(object.shape, ObjectShape::Plain);
	}

	#[test]
	fn codepage_bytes_round_trip_through_text() {
		let raw = [0x00_u8, 0x7F, 0x80, 0xFF];
		let text = Text::from_codepage(&raw);
		assert_eq!(text.to_bytes(), raw);
	}

	#[test]
	fn display_names_the_variant() {
		assert_eq!(Node::int(5).to_string(), "<Int 5>");
		assert_eq!(Node::string("a").to_string(), "<String 'a'>");
		assert_eq!(Node::Dict(vec![Node::None, Node::None]).to_string(), "<Dict [2]>");
	}
}
