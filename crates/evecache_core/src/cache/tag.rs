/// Bit set on a tag when the decoded node is also registered as shared.
pub const SHARED_FLAG: u8 = 0x40;

/// One-byte wire tags with the shared flag cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
	/// `None` singleton.
	None = 0x01,
	/// Length-prefixed codepage string naming a type, function or class.
	StringGlobal = 0x02,
	/// 64-bit signed integer.
	Long = 0x03,
	/// 32-bit signed integer.
	Int = 0x04,
	/// 16-bit signed integer.
	Short = 0x05,
	/// 8-bit integer.
	Byte = 0x06,
	/// Integer `-1`.
	IntNegOne = 0x07,
	/// Integer `0`.
	IntZero = 0x08,
	/// Integer `1`.
	IntOne = 0x09,
	/// IEEE double.
	Double = 0x0A,
	/// Double `0.0`.
	DoubleZero = 0x0B,
	/// Codepage string using the escaped count.
	StringLong = 0x0D,
	/// Empty string.
	StringEmpty = 0x0E,
	/// One-byte string.
	StringOne = 0x0F,
	/// Length-prefixed codepage string.
	String = 0x10,
	/// Index into the external string table.
	StringRef = 0x11,
	/// Length-prefixed UTF-16 string (count of code units).
	StringUnicode = 0x12,
	/// Identifier string.
	StringIdent = 0x13,
	/// Tuple with explicit count.
	Tuple = 0x14,
	/// List with explicit count.
	List = 0x15,
	/// Dictionary with explicit pair count.
	Dict = 0x16,
	/// Class object.
	ClassObject = 0x17,
	/// Reference to a previously shared node.
	SharedObj = 0x1B,
	/// Checksum of the rest of the stream.
	Checksum = 0x1C,
	/// Boolean true.
	BoolTrue = 0x1F,
	/// Boolean false.
	BoolFalse = 0x20,
	/// Object.
	Object = 0x22,
	/// New-style object.
	NewObj = 0x23,
	/// Empty tuple.
	TupleEmpty = 0x24,
	/// One-element tuple.
	TupleOne = 0x25,
	/// Empty list.
	ListEmpty = 0x26,
	/// One-element list.
	ListOne = 0x27,
	/// Empty UTF-16 string.
	StringUnicodeEmpty = 0x28,
	/// One-unit UTF-16 string.
	StringUnicodeOne = 0x29,
	/// RLE-compressed database row.
	CompressedDBRow = 0x2A,
	/// Length-delimited embedded stream.
	SubStream = 0x2B,
	/// Two-element tuple.
	TupleTwo = 0x2C,
	/// Sentinel terminating open-ended sequences.
	Marker = 0x2D,
	/// Length-prefixed UTF-8 string.
	Utf8 = 0x2E,
	/// Length-prefixed little-endian integer.
	BigInt = 0x2F,
	/// First byte of every stream.
	StreamStart = 0x7E,
}

impl Tag {
	/// Split a raw tag byte into its tag and shared flag.
	pub fn split(byte: u8) -> (Option<Self>, bool) {
		(Self::from_u8(byte & !SHARED_FLAG), byte & SHARED_FLAG != 0)
	}

	/// Map a flag-free tag value to its tag.
	pub fn from_u8(value: u8) -> Option<Self> {
		Some(match value {
			0x01 => Self::None,
			0x02 => Self::StringGlobal,
			0x03 => Self::Long,
			0x04 => Self::Int,
			0x05 => Self::Short,
			0x06 => Self::Byte,
			0x07 => Self::IntNegOne,
			0x08 => Self::IntZero,
			0x09 => Self::IntOne,
			0x0A => Self::Double,
			0x0B => Self::DoubleZero,
			0x0D => Self::StringLong,
			0x0E => Self::StringEmpty,
			0x0F => Self::StringOne,
			0x10 => Self::String,
			0x11 => Self::StringRef,
			0x12 => Self::StringUnicode,
			0x13 => Self::StringIdent,
			0x14 => Self::Tuple,
			0x15 => Self::List,
			0x16 => Self::Dict,
			0x17 => Self::ClassObject,
			0x1B => Self::SharedObj,
			0x1C => Self::Checksum,
			0x1F => Self::BoolTrue,
			0x20 => Self::BoolFalse,
			0x22 => Self::Object,
			0x23 => Self::NewObj,
			0x24 => Self::TupleEmpty,
			0x25 => Self::TupleOne,
			0x26 => Self::ListEmpty,
			0x27 => Self::ListOne,
			0x28 => Self::StringUnicodeEmpty,
			0x29 => Self::StringUnicodeOne,
			0x2A => Self::CompressedDBRow,
			0x2B => Self::SubStream,
			0x2C => Self::TupleTwo,
			0x2D => Self::Marker,
			0x2E => Self::Utf8,
			0x2F => Self::BigInt,
			0x7E => Self::StreamStart,
			_ => return None,
		})
	}

	/// Whether a shared-flagged instance of this tag claims a share slot.
	///
	/// Other tags ignore the flag and do not consume a share map position.
	pub fn is_shareable(self) -> bool {
		matches!(
			self,
			Self::StringGlobal
				| Self::StringIdent
				| Self::Tuple | Self::List
				| Self::Dict | Self::ClassObject
				| Self::Object | Self::NewObj
				| Self::TupleOne | Self::ListEmpty
				| Self::ListOne | Self::SubStream
				| Self::TupleTwo | Self::BigInt
		)
	}
}

#[cfg(test)]
mod tests {
	use super::Tag;

	#[test]
	fn shared_flag_is_split_off() {
		assert_eq!(Tag::split(0x54), (Some(Tag::Tuple), true));
		assert_eq!(Tag::split(0x14), (Some(Tag::Tuple), false));
		assert_eq!(Tag::split(0x6D), (Some(Tag::Marker), true));
		// The stream start byte carries the flag bit, so it never dispatches.
		assert_eq!(Tag::split(Tag::StreamStart as u8), (None, true));
	}

	#[test]
	fn gaps_in_the_table_are_unknown() {
		for byte in [0x00_u8, 0x0C, 0x18, 0x19, 0x1A, 0x1D, 0x1E, 0x21, 0x30, 0x3F] {
			assert_eq!(Tag::from_u8(byte), None, "byte {byte:#04x}");
		}
	}

	#[test]
	fn every_tag_round_trips_through_its_value() {
		for byte in 0_u8..0x80 {
			if let Some(tag) = Tag::from_u8(byte) {
				assert_eq!(tag as u8, byte);
			}
		}
	}
}
