mod bytes;
mod cached;
mod compression;
mod dbrow;
mod decode;
mod dump;
mod error;
mod file;
mod filter;
mod node;
mod rle;
mod shape;
mod share;
mod strings;
mod tag;
mod value;

/// Bounded little-endian cursor and seek origins.
pub use bytes::{Cursor, SeekOrigin, StringEncoding};
/// Lazily decoded cached-object payload.
pub use cached::CachedObjectRef;
/// zlib-framed payload inflation.
pub use compression::inflate_zlib_body;
/// Compressed database-row column types and sizing.
pub use dbrow::{ColumnType, FieldSpec, unpacked_size};
/// Stream decoding entry points and options.
pub use decode::{DecodeOptions, StreamDecoder, decode_entry, decode_stream, decode_values};
/// Structure and hex dump rendering.
pub use dump::{STRUCTURE_EXTENSION, dump_structure, hex_dump, write_structure_dump};
/// Error and result aliases.
pub use error::{CacheError, Result};
/// File abstraction and whole-file decode output.
pub use file::{CacheEntry, CacheFile, CacheInfo};
/// Cheap file pre-filters and directory scan.
pub use filter::{MethodFilter, looks_like_cache, scan_dir};
/// Decoded node tree types.
pub use node::{IntKind, Node, ObjectNode, StreamKind, StreamNode, StringKind, Text};
/// RLE row unpacker.
pub use rle::rle_unpack;
/// Class-name driven object classification.
pub use shape::ObjectShape;
/// Shared-object table.
pub use share::ShareTable;
/// String-reference lookup table.
pub use strings::StringTable;
/// Wire tag enumeration.
pub use tag::{SHARED_FLAG, Tag};
/// Caller-facing projected values.
pub use value::{Value, ValueMap};
