use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::Result;
use crate::cache::tag::Tag;

/// Whether a buffer starts with the stream start byte.
pub fn looks_like_cache(bytes: &[u8]) -> bool {
	bytes.first() == Some(&(Tag::StreamStart as u8))
}

/// Substring pre-filter over raw file bytes, matched before any decoding.
///
/// When any include pattern is set a file passes if it contains one of them
/// and the exclude list is ignored. Otherwise it passes unless it contains an
/// exclude pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodFilter {
	include: Vec<Vec<u8>>,
	exclude: Vec<Vec<u8>>,
}

impl MethodFilter {
	/// Filter that accepts everything.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add include patterns; blank patterns are dropped.
	pub fn include<I, S>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.include.extend(non_blank(methods));
		self
	}

	/// Add exclude patterns; blank patterns are dropped.
	pub fn exclude<I, S>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.exclude.extend(non_blank(methods));
		self
	}

	/// Apply the filter to raw file bytes.
	pub fn matches(&self, bytes: &[u8]) -> bool {
		if !self.include.is_empty() {
			return self.include.iter().any(|pattern| contains(bytes, pattern));
		}
		!self.exclude.iter().any(|pattern| contains(bytes, pattern))
	}
}

fn non_blank<I, S>(methods: I) -> impl Iterator<Item = Vec<u8>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	methods
		.into_iter()
		.filter(|method| !method.as_ref().trim().is_empty())
		.map(|method| method.as_ref().as_bytes().to_vec())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	haystack.windows(needle.len()).any(|window| window == needle)
}

/// Whether a file name carries a `.cache*` extension (`.cache`, `.cache2`, ...).
fn has_cache_extension(path: &Path) -> bool {
	path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.starts_with("cache"))
}

/// List cache files directly inside `dir` that start with the stream byte and pass `filter`.
///
/// Not recursive. Results are sorted by path.
pub fn scan_dir(dir: impl AsRef<Path>, filter: &MethodFilter) -> Result<Vec<PathBuf>> {
	let dir = dir.as_ref();
	let mut found = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() || !has_cache_extension(&path) {
			continue;
		}

		let bytes = fs::read(&path)?;
		if looks_like_cache(&bytes) && filter.matches(&bytes) {
			found.push(path);
		}
	}

	found.sort();
	debug!(dir = %dir.display(), files = found.len(), "scanned cache dir");
	Ok(found)
}
