use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::cache::{CacheError, Result};

/// zlib stream header length stripped before inflating.
const ZLIB_HEADER_LEN: usize = 2;
/// Adler-32 trailer length stripped before inflating.
const ZLIB_TRAILER_LEN: usize = 4;

/// Inflate a zlib stream by dropping its 2-byte header and 4-byte Adler-32
/// trailer and running raw deflate over the rest.
///
/// The checksum is not verified. Output beyond `limit` bytes fails.
pub fn inflate_zlib_body(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	let body = raw
		.len()
		.checked_sub(ZLIB_TRAILER_LEN)
		.and_then(|end| raw.get(ZLIB_HEADER_LEN..end))
		.unwrap_or(&[]);

	let mut decoder = DeflateDecoder::new(body);
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf).map_err(CacheError::Inflate)?;
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(CacheError::DecompressedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}
