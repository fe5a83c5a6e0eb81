use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors produced while reading and decoding cache streams.
///
/// Every variant is fatal to the stream being decoded; callers that process
/// many files skip the failing file and keep going.
#[derive(Debug, Error)]
pub enum CacheError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("out of data at offset {at}, need {need} bytes, remaining {rem}")]
	OutOfData {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available before the logical end.
		rem: usize,
	},
	/// Share map header claims more entries than the buffer can hold.
	#[error("not enough room in stream for share map: count={count}, at={at}, len={len}")]
	TruncatedShareTable {
		/// Declared number of share map entries.
		count: i32,
		/// Offset just after the share map header.
		at: usize,
		/// Total buffer length.
		len: usize,
	},
	/// Share map entry outside `[1, count]`.
	#[error("bogus share map entry {entry} at index {index} (count={count})")]
	CorruptShareTable {
		/// Entry position inside the map.
		index: usize,
		/// Offending slot number.
		entry: i32,
		/// Number of map entries.
		count: usize,
	},
	/// Shared slot access out of range or on an empty slot.
	#[error("share index error: {reason} (index={index}, size={size})")]
	ShareIndexError {
		/// What was wrong with the access.
		reason: &'static str,
		/// Offending index or map position.
		index: i64,
		/// Number of slots in the table.
		size: usize,
	},
	/// Tag byte has no dispatch entry.
	#[error("can't identify type {tag:#04x} at position {at:#x} [{at}]")]
	UnknownTag {
		/// Raw tag byte including the shared flag.
		tag: u8,
		/// Offset of the tag byte.
		at: usize,
	},
	/// Tag produced no node where a value was required.
	#[error("an object could not be created from tag {tag:#04x} at {at}")]
	UnexpectedMarker {
		/// Raw tag byte.
		tag: u8,
		/// Offset of the tag byte.
		at: usize,
	},
	/// Row list did not end with the expected second marker.
	#[error("marker was expected but not found at {at}")]
	ExpectedMarkerNotFound {
		/// Offset after the failed check.
		at: usize,
	},
	/// Compressed row descriptor is missing or malformed.
	#[error("bad DBRow descriptor: {reason}")]
	BadDescriptor {
		/// Which check failed.
		reason: &'static str,
	},
	/// Column type code outside the supported set.
	#[error("unhandled db column type: {code}")]
	UnhandledColumnType {
		/// Raw column type code.
		code: i64,
	},
	/// Cached object has neither a decoded object nor raw data.
	#[error("cached object has no object and no raw data")]
	MissingPayload,
	/// Cached object wrapper has too few members.
	#[error("cached object wrapper has {members} members, expected 7")]
	BadCachedObject {
		/// Members actually present.
		members: usize,
	},
	/// Length or count prefix decoded to a negative value.
	#[error("negative length {len} at offset {at}")]
	NegativeLength {
		/// Decoded length.
		len: i32,
		/// Offset after the length prefix.
		at: usize,
	},
	/// Big integer payload wider than 64 bits.
	#[error("big int of {len} bytes does not fit in 64 bits")]
	BigIntTooWide {
		/// Payload byte length.
		len: usize,
	},
	/// Nesting exceeded the configured decode depth.
	#[error("decode depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Decompressed output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Cached payload could not be inflated.
	#[error("inflate failed: {0}")]
	Inflate(std::io::Error),
	/// Stream does not start with a key/value tuple.
	#[error("stream does not hold a key/value entry")]
	NotAnEntry,
	/// File does not start with the stream start byte.
	#[error("not a cache file (first byte {first:?})")]
	NotACacheFile {
		/// First byte, if any.
		first: Option<u8>,
	},
	/// String table text could not be used.
	#[error("invalid string table: {reason}")]
	InvalidStringTable {
		/// Which check failed.
		reason: &'static str,
	},
}
