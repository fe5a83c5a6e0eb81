use tracing::trace;

use crate::cache::bytes::Cursor;
use crate::cache::decode::{DecodeOptions, StreamDecoder};
use crate::cache::node::{IntKind, Node};
use crate::cache::rle::rle_unpack;
use crate::cache::shape::ObjectShape;
use crate::cache::tag::Tag;
use crate::cache::{CacheError, Result};

/// Column storage type of a compressed database row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
	/// No storage.
	Empty,
	/// Signed 16-bit.
	Short,
	/// Signed 32-bit.
	Int,
	/// 32-bit float.
	Float,
	/// 64-bit float.
	Double,
	/// Fixed-point 64-bit scaled by 10000.
	Currency,
	/// Bit-packed boolean.
	Bool,
	/// Signed 8-bit.
	Byte,
	/// Unsigned 8-bit.
	UByte,
	/// Unsigned 16-bit.
	UShort,
	/// Unsigned 32-bit.
	UInt,
	/// Signed 64-bit.
	Long,
	/// Unsigned 64-bit, kept as its two's complement bits.
	ULong,
	/// 64-bit file time.
	Filetime,
	/// Byte string, stored as a tagged node after the fixed data.
	Bytes,
	/// Codepage string, stored as a tagged node after the fixed data.
	String,
	/// Wide string, stored as a tagged node after the fixed data.
	WideString,
	/// 64-bit timestamp.
	DBTimestamp,
}

impl ColumnType {
	/// Map a descriptor type code.
	pub fn from_code(code: i64) -> Result<Self> {
		Ok(match code {
			0 => Self::Empty,
			2 => Self::Short,
			3 => Self::Int,
			4 => Self::Float,
			5 => Self::Double,
			6 => Self::Currency,
			11 => Self::Bool,
			16 => Self::Byte,
			17 => Self::UByte,
			18 => Self::UShort,
			19 => Self::UInt,
			20 => Self::Long,
			21 => Self::ULong,
			64 => Self::Filetime,
			128 => Self::Bytes,
			129 => Self::String,
			130 => Self::WideString,
			135 => Self::DBTimestamp,
			_ => return Err(CacheError::UnhandledColumnType { code }),
		})
	}

	/// Byte width inside the unpacked fixed area; `None` for booleans, strings and empty columns.
	pub fn width(self) -> Option<usize> {
		match self {
			Self::Double | Self::Currency | Self::Long | Self::ULong | Self::Filetime | Self::DBTimestamp => Some(8),
			Self::Int | Self::UInt | Self::Float => Some(4),
			Self::Short | Self::UShort => Some(2),
			Self::Byte | Self::UByte => Some(1),
			Self::Empty | Self::Bool | Self::Bytes | Self::String | Self::WideString => None,
		}
	}

	/// Read pass (1 to 6) that emits this column.
	fn pass(self) -> Option<u8> {
		match self.width() {
			Some(8) => Some(1),
			Some(4) => Some(2),
			Some(2) => Some(3),
			Some(1) => Some(4),
			Some(_) => None,
			None => match self {
				Self::Bool => Some(5),
				Self::Bytes | Self::String | Self::WideString => Some(6),
				_ => None,
			},
		}
	}
}

/// One `(name, type)` column of a row descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
	/// Column name node, cloned into every decoded row.
	pub name: Node,
	/// Storage type.
	pub column: ColumnType,
}

/// Size of the unpacked fixed area: all fixed-width columns plus one bit per boolean.
pub fn unpacked_size(fields: &[FieldSpec]) -> usize {
	let fixed: usize = fields.iter().filter_map(|field| field.column.width()).sum();
	let bools = fields.iter().filter(|field| field.column == ColumnType::Bool).count();
	fixed + bools.div_ceil(8)
}

impl StreamDecoder<'_> {
	/// Decode a compressed row: descriptor node, length, RLE payload.
	///
	/// Produces `Tuple(descriptor, Dict)`, or `None` when the descriptor lists
	/// no columns.
	pub(crate) fn decode_dbrow(&mut self) -> Result<Node> {
		let descriptor = match self.decode_node()? {
			Some(node @ Node::Object(_)) => node,
			_ => return Err(CacheError::BadDescriptor { reason: "row header is not an object" }),
		};
		let fields = descriptor_fields(&descriptor)?;
		if fields.is_empty() {
			return Ok(Node::None);
		}

		let cursor = self.cursor_mut();
		let mut len = cursor.read_len()?;
		// Files holding a single row repeat the marker byte before the real length.
		if len == usize::from(Tag::Marker as u8) && cursor.peek_u8().ok() == Some(Tag::Marker as u8) {
			cursor.skip(1)?;
			len = cursor.read_len()?;
		}
		let packed = cursor.read_exact(len)?;

		let data = rle_unpack(packed, unpacked_size(&fields));
		trace!(columns = fields.len(), packed = len, unpacked = data.len(), "db row");

		let members = read_columns(&fields, &data, self.options(), self.depth())?;
		Ok(Node::Tuple(vec![descriptor, Node::Dict(members)]))
	}
}

/// Column list of a `DBRowDescriptor` object.
///
/// The header tuple holds the class name and a tuple whose first member is
/// the tuple of `(name, type)` pairs.
fn descriptor_fields(descriptor: &Node) -> Result<Vec<FieldSpec>> {
	let Node::Object(object) = descriptor else {
		return Err(CacheError::BadDescriptor { reason: "row header is not an object" });
	};
	if object.shape != ObjectShape::DBRowDescriptor {
		return Err(CacheError::BadDescriptor {
			reason: "bad DBRow descriptor name",
		});
	}

	let header = object.header().ok_or(CacheError::BadDescriptor {
		reason: "descriptor has no header",
	})?;
	let columns = header
		.members()
		.iter()
		.find(|member| matches!(member, Node::Tuple(_)))
		.and_then(|tuple| tuple.members().first())
		.ok_or(CacheError::BadDescriptor {
			reason: "descriptor has no column tuple",
		})?;

	columns.members().iter().map(field_spec).collect()
}

fn field_spec(column: &Node) -> Result<FieldSpec> {
	let Node::Tuple(items) = column else {
		return Err(CacheError::BadDescriptor {
			reason: "column is not a (name, type) tuple",
		});
	};
	let (Some(name), Some(code)) = (items.first(), items.last().and_then(Node::as_i64)) else {
		return Err(CacheError::BadDescriptor {
			reason: "column is missing its name or type code",
		});
	};

	Ok(FieldSpec {
		name: name.clone(),
		column: ColumnType::from_code(code)?,
	})
}

/// Run the six column passes over the unpacked data, returning dict members
/// in wire order (value, then name).
fn read_columns(fields: &[FieldSpec], data: &[u8], opt: &DecodeOptions, depth: u32) -> Result<Vec<Node>> {
	let mut row = StreamDecoder::unframed(data, opt, depth);
	let mut members = Vec::with_capacity(fields.len() * 2);

	for pass in 1..=6 {
		let mut bools = BoolBits::default();

		for field in fields.iter().filter(|field| field.column.pass() == Some(pass)) {
			let value = match field.column {
				ColumnType::Bytes | ColumnType::String | ColumnType::WideString => row.decode_value()?,
				ColumnType::Bool => Node::Bool(bools.next(row.cursor_mut())?),
				column => read_fixed(row.cursor_mut(), column)?,
			};
			members.push(value);
			members.push(field.name.clone());
		}
	}

	Ok(members)
}

fn read_fixed(cursor: &mut Cursor<'_>, column: ColumnType) -> Result<Node> {
	Ok(match column {
		ColumnType::Double => Node::Double(cursor.read_f64()?),
		ColumnType::Currency => Node::Double(cursor.read_i64()? as f64 / 10000.0),
		ColumnType::Long | ColumnType::ULong | ColumnType::Filetime | ColumnType::DBTimestamp => int(IntKind::Long, cursor.read_i64()?),
		ColumnType::Int => int(IntKind::Int, i64::from(cursor.read_i32()?)),
		ColumnType::UInt => int(IntKind::Int, i64::from(cursor.read_u32()?)),
		ColumnType::Float => Node::Double(f64::from(cursor.read_f32()?)),
		ColumnType::Short => int(IntKind::Short, i64::from(cursor.read_i16()?)),
		ColumnType::UShort => int(IntKind::Short, i64::from(cursor.read_u16()?)),
		ColumnType::Byte => int(IntKind::Byte, i64::from(cursor.read_u8()? as i8)),
		ColumnType::UByte => int(IntKind::Byte, i64::from(cursor.read_u8()?)),
		ColumnType::Empty | ColumnType::Bool | ColumnType::Bytes | ColumnType::String | ColumnType::WideString => Node::None,
	})
}

/// Booleans packed least significant bit first; a new byte starts every eight.
#[derive(Default)]
struct BoolBits {
	byte: u8,
	used: u8,
}

impl BoolBits {
	fn next(&mut self, cursor: &mut Cursor<'_>) -> Result<bool> {
		if self.used % 8 == 0 {
			self.byte = cursor.read_u8()?;
			self.used = 0;
		}
		let set = (self.byte >> self.used) & 1 != 0;
		self.used += 1;
		Ok(set)
	}
}

fn int(kind: IntKind, value: i64) -> Node {
	Node::Int { kind, value }
}

#[cfg(test)]
mod tests;
