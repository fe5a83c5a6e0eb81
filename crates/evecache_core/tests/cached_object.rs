#![allow(missing_docs)]

use evecache::cache::{CacheError, CachedObjectRef, DecodeOptions, Node, StringKind, Text, Value, decode_stream, decode_values};
use evecache_testkit::{StreamBuilder, tag, zlib};

fn inner_stream() -> Vec<u8> {
	let mut inner = StreamBuilder::new();
	inner.tag(tag::TUPLE_TWO).string("total").int(42);
	inner.build()
}

/// Object-caching wrapper around `raw` written as a sub-stream (or `None`).
fn wrapper(raw: Option<&[u8]>, compressed: bool) -> Vec<u8> {
	let mut stream = StreamBuilder::new();
	stream
		.object("util.objectCaching.CachedObject")
		.string("payload")
		.container(tag::TUPLE, 7)
		.tag(tag::INT_ONE)
		.tag(tag::NONE)
		.int(2)
		.tag(tag::BOOL_FALSE);
	match raw {
		Some(raw) => stream.sub_stream(raw),
		None => stream.tag(tag::NONE),
	};
	stream
		.tag(if compressed { tag::BOOL_TRUE } else { tag::BOOL_FALSE })
		.int(3);
	stream.build()
}

fn cached_ref(bytes: &[u8]) -> CachedObjectRef {
	let stream = decode_stream(bytes, &DecodeOptions::default()).expect("wrapper decodes");
	let object = stream.members().first().expect("one member");
	match object.members() {
		[_, _, Node::CachedObject(cached)] => (**cached).clone(),
		other => panic!("expected header, payload and cached object, got {other:?}"),
	}
}

#[test]
fn raw_payload_is_kept_until_decoded() {
	let inner = inner_stream();
	let mut cached = cached_ref(&wrapper(Some(&inner), false));

	assert!(!cached.is_decoded());
	assert_eq!(cached.raw.as_deref(), Some(inner.as_slice()));
	assert!(!cached.compressed);
	assert_eq!(cached.version, Node::int(1));
	assert_eq!(cached.object_id, Node::int(3));

	let payload = cached.decode(&DecodeOptions::default()).expect("payload decodes").clone();
	assert_eq!(payload.members(), &[Node::Tuple(vec![Node::string("total"), Node::int(42)])]);
	assert!(cached.is_decoded());
	assert!(cached.raw.is_none(), "raw bytes are released");

	let again = cached.decode(&DecodeOptions::default()).expect("second call reuses payload");
	assert_eq!(*again, payload);
	assert_eq!(cached.value(), Some(Value::List(vec![Value::List(vec![Value::String("total".into()), Value::Int(42)])])));
}

#[test]
fn compressed_payload_is_inflated() {
	let inner = inner_stream();
	let mut cached = cached_ref(&wrapper(Some(&zlib(&inner)), true));
	assert!(cached.compressed);

	let payload = cached.decode(&DecodeOptions::default()).expect("payload inflates and decodes");
	assert_eq!(payload.members()[0].members()[1], Node::int(42));
}

#[test]
fn inflate_limit_applies_to_payloads() {
	let inner = inner_stream();
	let mut cached = cached_ref(&wrapper(Some(&zlib(&inner)), true));
	let opt = DecodeOptions {
		max_decompressed_bytes: 4,
		..DecodeOptions::default()
	};
	assert!(matches!(cached.decode(&opt), Err(CacheError::DecompressedTooLarge { limit: 4 })));
	assert!(!cached.is_decoded());
}

#[test]
fn projection_leaves_payload_pending() {
	let inner = inner_stream();
	let values = decode_values(&wrapper(Some(&inner), false), &DecodeOptions::default()).expect("wrapper decodes");
	let Value::List(items) = &values[0] else {
		panic!("cached object wrapper projects to a list");
	};
	assert_eq!(items[0], Value::String("payload".into()));
	let Value::Cached(cached) = &items[1] else {
		panic!("expected cached value, got {:?}", items[1]);
	};
	assert!(!cached.is_decoded());
}

#[test]
fn missing_raw_data_is_reported_on_decode() {
	let mut cached = cached_ref(&wrapper(None, false));
	assert!(matches!(cached.decode(&DecodeOptions::default()), Err(CacheError::MissingPayload)));
}

fn wrapped_raw_string(kind: StringKind, text: &str) -> Node {
	Node::Tuple(vec![
		Node::int(1),
		Node::None,
		Node::int(2),
		Node::Bool(false),
		Node::String {
			kind,
			text: Text::Str(text.into()),
		},
		Node::Bool(false),
		Node::int(3),
	])
}

#[test]
fn unicode_raw_data_keeps_its_encoded_bytes() {
	let text = "caf\u{e9} \u{2713}";

	let utf8 = CachedObjectRef::from_node(&wrapped_raw_string(StringKind::Utf8, text)).expect("wrapper reads");
	assert_eq!(utf8.raw.as_deref(), Some(text.as_bytes()));

	let utf16 = CachedObjectRef::from_node(&wrapped_raw_string(StringKind::Utf16, text)).expect("wrapper reads");
	let units: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
	assert_eq!(utf16.raw, Some(units));

	let latin = CachedObjectRef::from_node(&wrapped_raw_string(StringKind::Codepage, "caf\u{e9}")).expect("wrapper reads");
	assert_eq!(latin.raw, Some(vec![b'c', b'a', b'f', 0xE9]));
}

#[test]
fn short_wrapper_is_rejected() {
	let mut stream = StreamBuilder::new();
	stream
		.object("util.objectCaching.CachedObject")
		.string("payload")
		.container(tag::TUPLE, 3)
		.tag(tag::INT_ONE)
		.tag(tag::NONE)
		.int(2);
	let err = decode_stream(&stream.build(), &DecodeOptions::default()).expect_err("wrapper too short");
	assert!(matches!(err, CacheError::BadCachedObject { members: 3 }));
}

#[test]
fn sub_streams_after_the_wrapper_are_skipped_again() {
	let inner = inner_stream();
	let mut bytes = StreamBuilder::new();
	bytes.raw(&wrapper(Some(&inner), false)[5..]).sub_stream(&inner);

	let stream = decode_stream(&bytes.build(), &DecodeOptions::default()).expect("stream decodes");
	assert_eq!(stream.members().len(), 2);
	assert_eq!(stream.members()[1].kind_label(), "SubStream");
}
