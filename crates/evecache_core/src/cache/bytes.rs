use crate::cache::node::Text;
use crate::cache::{CacheError, Result};

/// Count byte value that escapes to a following 4-byte count.
const COUNT_ESCAPE: u8 = 0xFF;

/// Reference point for [`Cursor::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
	/// Absolute offset from the buffer start.
	Begin,
	/// Relative to the current position.
	Current,
	/// Measured backwards from the buffer end.
	End,
}

/// Character encoding of a string payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
	/// Single-byte default codepage text.
	Codepage,
	/// UTF-8 text.
	Utf8,
	/// Little-endian UTF-16 text.
	Utf16,
}

/// Bounded little-endian cursor over an immutable byte slice.
///
/// Reads stop at the logical end, which starts at the buffer length and is
/// pulled in by the share table check so the trailing map is never read as
/// stream data.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	end: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0 covering the whole slice.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes,
			pos: 0,
			end: bytes.len(),
		}
	}

	/// Return the full underlying buffer.
	pub fn bytes(&self) -> &'a [u8] {
		self.bytes
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return the logical end of readable data.
	pub fn end(&self) -> usize {
		self.end
	}

	/// Return total buffer length, ignoring the logical end.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether the underlying buffer is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Return remaining bytes before the logical end.
	pub fn remaining(&self) -> usize {
		self.end.saturating_sub(self.pos)
	}

	/// Whether the position has reached the logical end.
	pub fn at_end(&self) -> bool {
		self.pos >= self.end
	}

	pub(crate) fn set_end(&mut self, end: usize) {
		self.end = end.min(self.bytes.len());
	}

	/// Move the position; the target must lie inside the buffer.
	pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<()> {
		let base = match origin {
			SeekOrigin::Begin => 0,
			SeekOrigin::Current => self.pos as i64,
			SeekOrigin::End => self.bytes.len() as i64,
		};
		let target = match origin {
			SeekOrigin::End => base.checked_sub(offset),
			_ => base.checked_add(offset),
		};
		let Some(target) = target.filter(|target| *target >= 0 && *target as u64 <= self.bytes.len() as u64) else {
			return Err(CacheError::OutOfData {
				at: self.pos,
				need: usize::try_from(offset.unsigned_abs()).unwrap_or(usize::MAX),
				rem: self.remaining(),
			});
		};
		self.pos = target as usize;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(CacheError::OutOfData {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		self.read_exact(n).map(|_| ())
	}

	/// Return the next byte without advancing.
	pub fn peek_u8(&self) -> Result<u8> {
		if self.at_end() {
			return Err(CacheError::OutOfData {
				at: self.pos,
				need: 1,
				rem: 0,
			});
		}
		Ok(self.bytes[self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read a little-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i16`.
	pub fn read_i16(&mut self) -> Result<i16> {
		Ok(i16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian IEEE single.
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian IEEE double.
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read the variable-length count: one byte, or `0xFF` then an `i32`.
	pub fn read_count(&mut self) -> Result<i32> {
		let first = self.read_u8()?;
		if first != COUNT_ESCAPE {
			return Ok(i32::from(first));
		}
		self.read_i32()
	}

	/// Read a count and reject negative values.
	pub fn read_len(&mut self) -> Result<usize> {
		let len = self.read_count()?;
		usize::try_from(len).map_err(|_| CacheError::NegativeLength { len, at: self.pos })
	}

	/// Read `len` bytes as text in the given encoding.
	pub fn read_string(&mut self, len: usize, encoding: StringEncoding) -> Result<Text> {
		let raw = self.read_exact(len)?;
		Ok(match encoding {
			StringEncoding::Codepage => Text::from_codepage(raw),
			StringEncoding::Utf8 => Text::Str(String::from_utf8_lossy(raw).into_owned().into_boxed_str()),
			StringEncoding::Utf16 => {
				let units: Vec<u16> = raw.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
				Text::Str(String::from_utf16_lossy(&units).into_boxed_str())
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{Cursor, SeekOrigin, StringEncoding};
	use crate::cache::{CacheError, Text};

	#[test]
	fn count_below_escape_is_the_byte_itself() {
		for n in [0_u8, 1, 42, 254] {
			let bytes = [n];
			let mut cursor = Cursor::new(&bytes);
			assert_eq!(cursor.read_count().expect("count reads"), i32::from(n));
			assert!(cursor.at_end());
		}
	}

	#[test]
	fn count_escape_reads_following_i32() {
		let mut bytes = vec![0xFF];
		bytes.extend_from_slice(&70_000_i32.to_le_bytes());
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_count().expect("count reads"), 70_000);
		assert_eq!(cursor.pos(), 5);
	}

	#[test]
	fn negative_len_is_rejected() {
		let mut bytes = vec![0xFF];
		bytes.extend_from_slice(&(-3_i32).to_le_bytes());
		let mut cursor = Cursor::new(&bytes);
		let err = cursor.read_len().expect_err("negative length fails");
		assert!(matches!(err, CacheError::NegativeLength { len: -3, .. }));
	}

	#[test]
	fn reads_past_end_fail_with_out_of_data() {
		let bytes = [1_u8, 2, 3];
		let mut cursor = Cursor::new(&bytes);
		let err = cursor.read_u32().expect_err("short read fails");
		assert!(matches!(err, CacheError::OutOfData { at: 0, need: 4, rem: 3 }));
		assert_eq!(cursor.pos(), 0, "failed read must not advance");
	}

	#[test]
	fn logical_end_hides_trailing_bytes() {
		let bytes = [1_u8, 2, 3, 4];
		let mut cursor = Cursor::new(&bytes);
		cursor.set_end(2);
		assert_eq!(cursor.read_u16().expect("two bytes"), 0x0201);
		assert!(cursor.at_end());
		assert!(cursor.read_u8().is_err());
	}

	#[test]
	fn seek_from_end_counts_backwards() {
		let bytes = [0_u8; 10];
		let mut cursor = Cursor::new(&bytes);
		cursor.seek(4, SeekOrigin::End).expect("seek succeeds");
		assert_eq!(cursor.pos(), 6);
		cursor.seek(-2, SeekOrigin::Current).expect("seek back succeeds");
		assert_eq!(cursor.pos(), 4);
		assert!(cursor.seek(11, SeekOrigin::Begin).is_err());
	}

	#[test]
	fn seek_overflow_is_out_of_data() {
		let bytes = [0_u8; 10];
		let mut cursor = Cursor::new(&bytes);
		cursor.seek(2, SeekOrigin::Begin).expect("seek succeeds");

		assert!(matches!(cursor.seek(i64::MAX, SeekOrigin::Current), Err(CacheError::OutOfData { at: 2, .. })));
		assert!(matches!(cursor.seek(i64::MIN, SeekOrigin::Current), Err(CacheError::OutOfData { .. })));
		assert!(matches!(cursor.seek(i64::MIN, SeekOrigin::End), Err(CacheError::OutOfData { .. })));
		assert!(matches!(cursor.seek(i64::MAX, SeekOrigin::Begin), Err(CacheError::OutOfData { .. })));
		assert_eq!(cursor.pos(), 2, "failed seeks leave the position alone");
	}

	#[test]
	fn utf16_strings_decode_little_endian_units() {
		let bytes = [b'h', 0, b'i', 0];
		let mut cursor = Cursor::new(&bytes);
		let text = cursor.read_string(4, StringEncoding::Utf16).expect("string reads");
		assert_eq!(text, Text::Str("hi".into()));
	}

	#[test]
	fn codepage_strings_map_high_bytes() {
		let bytes = [b'a', 0xE9];
		let mut cursor = Cursor::new(&bytes);
		let text = cursor.read_string(2, StringEncoding::Codepage).expect("string reads");
		assert_eq!(text.as_str(), Some("a\u{e9}"));
	}
}
