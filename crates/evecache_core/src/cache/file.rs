use std::fs;
use std::path::Path;

use crate::cache::decode::{DecodeOptions, StreamDecoder, decode_stream, entry_from_stream};
use crate::cache::filter::looks_like_cache;
use crate::cache::node::Node;
use crate::cache::value::Value;
use crate::cache::{CacheError, Result};

/// Whole cache file held in memory.
pub struct CacheFile {
	bytes: Vec<u8>,
}

impl CacheFile {
	/// Read a file and check its stream start byte.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::from_bytes(fs::read(path)?)
	}

	/// Wrap an in-memory buffer.
	pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
		if !looks_like_cache(&bytes) {
			return Err(CacheError::NotACacheFile {
				first: bytes.first().copied(),
			});
		}
		Ok(Self { bytes })
	}

	/// Raw file bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Header facts from the share map check, without decoding nodes.
	pub fn info(&self, opt: &DecodeOptions) -> Result<CacheInfo> {
		let decoder = StreamDecoder::open(&self.bytes, opt)?;
		Ok(CacheInfo {
			len: self.bytes.len(),
			share_count: decoder.shares().len(),
			data_end: decoder.cursor().end(),
		})
	}

	/// Decode the full node tree.
	pub fn decode(&self, opt: &DecodeOptions) -> Result<Node> {
		decode_stream(&self.bytes, opt)
	}

	/// Decode and split into the method-call key and its result.
	pub fn entry(&self, opt: &DecodeOptions) -> Result<CacheEntry> {
		let stream = self.decode(opt)?;
		let (key, value) = entry_from_stream(&stream)?;
		Ok(CacheEntry { key, value })
	}
}

/// Decoded key and value of one cache file.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
	/// Call key, usually a tuple naming the remote method.
	pub key: Value,
	/// Cached result.
	pub value: Value,
}

impl CacheEntry {
	/// Method name found by unwrapping the key.
	pub fn method(&self) -> Option<&str> {
		self.key.first_str()
	}
}

/// Stream framing facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
	/// Total file length.
	pub len: usize,
	/// Entries in the trailing share map.
	pub share_count: usize,
	/// Offset where node data ends and the share map begins.
	pub data_end: usize,
}
