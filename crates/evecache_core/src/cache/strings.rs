use std::fs;
use std::path::Path;

use crate::cache::{CacheError, Result};

/// Lookup table for string-reference tags, indexed by the tag's byte.
///
/// Text form is comma separated; line breaks are ignored so long tables can
/// be wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
	entries: Vec<Box<str>>,
}

impl StringTable {
	/// Parse comma-separated text.
	pub fn parse(text: &str) -> Result<Self> {
		let joined: String = text.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect();
		if joined.is_empty() {
			return Err(CacheError::InvalidStringTable { reason: "no entries" });
		}

		let entries: Vec<Box<str>> = joined.split(',').map(Box::from).collect();
		if entries.len() > usize::from(u8::MAX) + 1 {
			return Err(CacheError::InvalidStringTable {
				reason: "more than 256 entries",
			});
		}
		Ok(Self { entries })
	}

	/// Read and parse a table file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let text = fs::read_to_string(path)?;
		Self::parse(&text)
	}

	/// Resolve an index.
	pub fn get(&self, id: u8) -> Option<&str> {
		self.entries.get(usize::from(id)).map(|entry| &**entry)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
