use crate::cache::cached::CachedObjectRef;
use crate::cache::node::{Node, ObjectNode, Text};
use crate::cache::shape::ObjectShape;

/// Caller-facing value projected from a node tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// No value.
	Null,
	/// Boolean.
	Bool(bool),
	/// Integer.
	Int(i64),
	/// Floating point.
	Float(f64),
	/// Text.
	String(Box<str>),
	/// Raw bytes.
	Bytes(Vec<u8>),
	/// Unresolved string table index.
	StringRef(u8),
	/// Ordered sequence (tuples, lists, streams, row lists).
	List(Vec<Value>),
	/// Unique-keyed map in insertion order.
	Map(ValueMap),
	/// Cached object whose payload the caller decodes on demand.
	Cached(Box<CachedObjectRef>),
}

impl Value {
	/// Borrow text.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Integer payload.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow list items.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow map entries.
	pub fn as_map(&self) -> Option<&ValueMap> {
		match self {
			Self::Map(map) => Some(map),
			_ => None,
		}
	}

	/// First string found by unwrapping leading list items.
	///
	/// Entry keys nest the method name inside tuples and lists.
	pub fn first_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			Self::List(items) => items.first().and_then(Value::first_str),
			_ => None,
		}
	}
}

/// Insertion-ordered map with unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
	entries: Vec<(Value, Value)>,
}

impl ValueMap {
	/// Create an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace in place, keeping the first insertion position.
	pub fn insert(&mut self, key: Value, value: Value) {
		if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
			entry.1 = value;
			return;
		}
		self.entries.push((key, value));
	}

	/// Look up by key.
	pub fn get(&self, key: &Value) -> Option<&Value> {
		self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
	}

	/// Look up by string key.
	pub fn get_str(&self, key: &str) -> Option<&Value> {
		self.entries.iter().find(|(existing, _)| existing.as_str() == Some(key)).map(|(_, value)| value)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the map is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
		self.entries.iter().map(|(key, value)| (key, value))
	}
}

impl Node {
	/// Project this node into a caller-facing value.
	///
	/// Pure: repeated calls give equal results and never decode cached payloads.
	pub fn to_value(&self) -> Value {
		match self {
			Self::None => Value::Null,
			Self::Bool(value) => Value::Bool(*value),
			Self::Int { value, .. } => Value::Int(*value),
			Self::Double(value) => Value::Float(*value),
			Self::String { text: Text::Str(text), .. } => Value::String(text.clone()),
			Self::String { text: Text::Raw(bytes), .. } => Value::Bytes(bytes.clone()),
			Self::StringRef(id) => Value::StringRef(*id),
			Self::Tuple(items) | Self::List(items) => Value::List(items.iter().map(Node::to_value).collect()),
			Self::Dict(items) => Value::Map(pairs_to_map(items, 1)),
			Self::Object(object) => object_value(object),
			Self::CachedObject(cached) => Value::Cached(cached.clone()),
			Self::Stream(stream) => Value::List(stream.members.iter().map(Node::to_value).collect()),
		}
	}
}

fn object_value(object: &ObjectNode) -> Value {
	let payload = object.payload();
	match object.shape {
		ObjectShape::RowList | ObjectShape::CRowset => Value::List(
			payload
				.iter()
				.flat_map(Node::members)
				.filter(|member| !matches!(member, Node::Object(_)))
				.map(Node::to_value)
				.collect(),
		),
		ObjectShape::RowDict | ObjectShape::CFilterRowset | ObjectShape::CIndexedRowset => Value::Map(pairs_to_map(payload, 0)),
		ObjectShape::KeyVal | ObjectShape::CachedObject | ObjectShape::CachedMethodCallResult | ObjectShape::ObjectCachingCachedObject => {
			Value::List(payload.iter().map(Node::to_value).collect())
		}
		ObjectShape::DBRowDescriptor | ObjectShape::Plain => Value::Null,
	}
}

/// Pair up members; `key_parity` is the index parity holding keys.
fn pairs_to_map(members: &[Node], key_parity: usize) -> ValueMap {
	let mut map = ValueMap::new();
	for pair in members.chunks_exact(2) {
		let (key, value) = if key_parity == 0 { (&pair[0], &pair[1]) } else { (&pair[1], &pair[0]) };
		let key = key.to_value();
		if key == Value::Null {
			continue;
		}
		map.insert(key, value.to_value());
	}
	map
}
