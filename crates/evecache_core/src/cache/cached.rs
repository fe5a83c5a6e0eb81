use tracing::debug;

use crate::cache::compression::inflate_zlib_body;
use crate::cache::decode::{DecodeOptions, decode_stream};
use crate::cache::node::{Node, StringKind, Text};
use crate::cache::value::Value;
use crate::cache::{CacheError, Result};

const MEMBER_COUNT: usize = 7;

/// Cached-object wrapper whose payload stream is decoded on demand.
///
/// Built from the seven members of the wrapped node: version, object, node
/// id, shared flag, raw data, compressed flag and object id.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedObjectRef {
	/// Version member.
	pub version: Node,
	/// Decoded payload, present once decoded or when the stream carried it inline.
	pub object: Option<Node>,
	/// Node id member.
	pub node_id: Node,
	/// Shared flag member.
	pub shared: bool,
	/// Raw payload bytes, dropped after decoding.
	pub raw: Option<Vec<u8>>,
	/// Whether `raw` is zlib compressed.
	pub compressed: bool,
	/// Object id member.
	pub object_id: Node,
}

impl CachedObjectRef {
	/// Build from the node wrapped by an `objectCaching` object.
	pub fn from_node(node: &Node) -> Result<Self> {
		let members = node.members();
		if members.len() < MEMBER_COUNT {
			return Err(CacheError::BadCachedObject { members: members.len() });
		}

		let object = match &members[1] {
			Node::None => None,
			other => Some(other.clone()),
		};
		let raw = match &members[4] {
			Node::String { kind, text } => Some(wire_bytes(*kind, text)),
			_ => None,
		};

		Ok(Self {
			version: members[0].clone(),
			object,
			node_id: members[2].clone(),
			shared: members[3].is_truthy(),
			raw,
			compressed: members[5].is_truthy(),
			object_id: members[6].clone(),
		})
	}

	/// Whether the payload is available without decoding.
	pub fn is_decoded(&self) -> bool {
		self.object.is_some()
	}

	/// Decode the payload stream once and return it.
	///
	/// Later calls return the stored node. Raw bytes are released after a
	/// successful decode.
	pub fn decode(&mut self, opt: &DecodeOptions) -> Result<&Node> {
		if self.object.is_none() {
			let raw = self.raw.as_deref().ok_or(CacheError::MissingPayload)?;
			let node = if self.compressed {
				let data = inflate_zlib_body(raw, opt.max_decompressed_bytes)?;
				debug!(packed = raw.len(), unpacked = data.len(), "inflated cached object payload");
				decode_stream(&data, opt)?
			} else {
				decode_stream(raw, opt)?
			};
			self.object = Some(node);
			self.raw = None;
		}

		self.object.as_ref().ok_or(CacheError::MissingPayload)
	}

	/// Project the decoded payload; `None` until [`Self::decode`] has run.
	pub fn value(&self) -> Option<Value> {
		self.object.as_ref().map(Node::to_value)
	}
}

/// Bytes of a raw-data string member in the encoding it was read with.
fn wire_bytes(kind: StringKind, text: &Text) -> Vec<u8> {
	match (kind, text) {
		(StringKind::Utf8, Text::Str(text)) => text.as_bytes().to_vec(),
		(StringKind::Utf16, Text::Str(text)) => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
		_ => text.to_bytes(),
	}
}
