use evecache_testkit::{StreamBuilder, rle_literals, tag};

use crate::cache::{CacheError, ColumnType, DecodeOptions, FieldSpec, IntKind, Node, Value, decode_stream, unpacked_size};

fn field(name: &str, column: ColumnType) -> FieldSpec {
	FieldSpec {
		name: Node::string(name),
		column,
	}
}

fn decode_row(builder: &StreamBuilder) -> Node {
	let stream = decode_stream(&builder.build(), &DecodeOptions::default()).expect("stream decodes");
	stream.members().first().cloned().expect("one member")
}

#[test]
fn column_codes_map_to_types() {
	assert_eq!(ColumnType::from_code(3).expect("int"), ColumnType::Int);
	assert_eq!(ColumnType::from_code(6).expect("currency"), ColumnType::Currency);
	assert_eq!(ColumnType::from_code(64).expect("filetime"), ColumnType::Filetime);
	assert_eq!(ColumnType::from_code(130).expect("wide string"), ColumnType::WideString);
	assert!(matches!(ColumnType::from_code(1), Err(CacheError::UnhandledColumnType { code: 1 })));
	assert!(matches!(ColumnType::from_code(72), Err(CacheError::UnhandledColumnType { code: 72 })));
}

#[test]
fn unpacked_size_counts_widths_and_bool_bytes() {
	assert_eq!(unpacked_size(&[field("a", ColumnType::Bool), field("b", ColumnType::Int)]), 5);

	let mut fields = vec![
		field("d", ColumnType::Double),
		field("s", ColumnType::UShort),
		field("b", ColumnType::UByte),
		field("e", ColumnType::Empty),
		field("n", ColumnType::String),
	];
	assert_eq!(unpacked_size(&fields), 11);

	fields.extend((0..9).map(|i| field(&format!("flag{i}"), ColumnType::Bool)));
	assert_eq!(unpacked_size(&fields), 13, "nine booleans take two bytes");
}

#[test]
fn row_columns_come_out_in_pass_order() {
	let columns = [
		("id", 3),
		("flag", 11),
		("price", 6),
		("name", 129),
		("unused", 0),
		("small", 2),
		("up", 11),
		("tiny", 16),
	];

	let mut data = Vec::new();
	data.extend_from_slice(&1_234_500_i64.to_le_bytes());
	data.extend_from_slice(&77_i32.to_le_bytes());
	data.extend_from_slice(&(-3_i16).to_le_bytes());
	data.push(0xFF);
	data.push(0b10);
	data.extend_from_slice(&[tag::STRING, 3, b'b', b'o', b'b']);

	let mut stream = StreamBuilder::new();
	stream.db_row(&columns, &data);

	let row = decode_row(&stream);
	let Node::Tuple(parts) = &row else {
		panic!("row decodes to a tuple, got {row}");
	};
	assert_eq!(parts.len(), 2);
	assert_eq!(parts[0].class_name(), Some("blue.DBRowDescriptor"));

	let expected = vec![
		Node::Double(123.45),
		Node::string("price"),
		Node::int(77),
		Node::string("id"),
		Node::Int { kind: IntKind::Short, value: -3 },
		Node::string("small"),
		Node::Int { kind: IntKind::Byte, value: -1 },
		Node::string("tiny"),
		Node::Bool(false),
		Node::string("flag"),
		Node::Bool(true),
		Node::string("up"),
		Node::string("bob"),
		Node::string("name"),
	];
	assert_eq!(parts[1], Node::Dict(expected));

	let value = row.to_value();
	let items = value.as_list().expect("tuple projects to list");
	assert_eq!(items[0], Value::Null, "descriptor projects to null");
	let map = items[1].as_map().expect("row dict");
	assert_eq!(map.get_str("price"), Some(&Value::Float(123.45)));
	assert_eq!(map.get_str("name"), Some(&Value::String("bob".into())));
	assert_eq!(map.len(), 7);
}

#[test]
fn unsigned_columns_do_not_sign_extend() {
	let mut data = Vec::new();
	data.extend_from_slice(&u32::MAX.to_le_bytes());
	data.extend_from_slice(&u16::MAX.to_le_bytes());
	data.push(0xFF);

	let mut stream = StreamBuilder::new();
	stream.db_row(&[("a", 19), ("b", 18), ("c", 17)], &data);

	let row = decode_row(&stream);
	let values: Vec<_> = row.members()[1].members().iter().step_by(2).filter_map(Node::as_i64).collect();
	assert_eq!(values, vec![i64::from(u32::MAX), i64::from(u16::MAX), 255]);
}

#[test]
fn zero_runs_fill_the_fixed_area() {
	let mut stream = StreamBuilder::new();
	// One control byte: eight zeros from the top nibble, nothing after.
	stream.tag(tag::COMPRESSED_DB_ROW).row_descriptor(&[("when", 64)]).count(1).raw(&[0x0F]);

	let row = decode_row(&stream);
	assert_eq!(
		row.members()[1],
		Node::Dict(vec![Node::Int { kind: IntKind::Long, value: 0 }, Node::string("when")])
	);
}

#[test]
fn double_marker_before_length_is_skipped() {
	let packed = rle_literals(&5_i32.to_le_bytes());
	let mut stream = StreamBuilder::new();
	stream
		.tag(tag::COMPRESSED_DB_ROW)
		.row_descriptor(&[("n", 3)])
		.raw(&[tag::MARKER, tag::MARKER])
		.count(packed.len())
		.raw(&packed)
		.tag(tag::INT_ONE);

	let stream = decode_stream(&stream.build(), &DecodeOptions::default()).expect("stream decodes");
	assert_eq!(stream.members().len(), 2);
	assert_eq!(stream.members()[0].members()[1], Node::Dict(vec![Node::int(5), Node::string("n")]));
	assert_eq!(stream.members()[1], Node::int(1));
}

#[test]
fn descriptor_without_columns_yields_none() {
	let mut stream = StreamBuilder::new();
	stream.tag(tag::COMPRESSED_DB_ROW).row_descriptor(&[]).tag(tag::INT_ONE);

	let stream = decode_stream(&stream.build(), &DecodeOptions::default()).expect("stream decodes");
	assert_eq!(stream.members(), &[Node::None, Node::int(1)]);
}

#[test]
fn row_without_descriptor_fails() {
	let mut stream = StreamBuilder::new();
	stream.tag(tag::COMPRESSED_DB_ROW).tag(tag::INT_ONE);
	let err = decode_stream(&stream.build(), &DecodeOptions::default()).expect_err("no descriptor");
	assert!(matches!(err, CacheError::BadDescriptor { .. }));

	let mut stream = StreamBuilder::new();
	stream.tag(tag::COMPRESSED_DB_ROW).object("util.KeyVal").tag(tag::NONE);
	let err = decode_stream(&stream.build(), &DecodeOptions::default()).expect_err("wrong class");
	assert!(matches!(err, CacheError::BadDescriptor { .. }));
}

#[test]
fn unknown_column_type_fails_before_payload() {
	let mut stream = StreamBuilder::new();
	stream.tag(tag::COMPRESSED_DB_ROW).row_descriptor(&[("x", 7)]);
	let err = decode_stream(&stream.build(), &DecodeOptions::default()).expect_err("unhandled type");
	assert!(matches!(err, CacheError::UnhandledColumnType { code: 7 }));
}
