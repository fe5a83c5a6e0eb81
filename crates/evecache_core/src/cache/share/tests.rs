use crate::cache::{CacheError, Cursor, Node, ShareTable};

fn stream_with_map(body: &[u8], map: &[i32]) -> Vec<u8> {
	let mut bytes = vec![0x7E];
	bytes.extend_from_slice(&(map.len() as i32).to_le_bytes());
	bytes.extend_from_slice(body);
	for entry in map {
		bytes.extend_from_slice(&entry.to_le_bytes());
	}
	bytes
}

#[test]
fn security_check_reads_map_from_tail() {
	let bytes = stream_with_map(&[0x09, 0x08], &[2, 1]);
	let mut cursor = Cursor::new(&bytes);
	let mut table = ShareTable::read(&mut cursor).expect("map parses");

	assert_eq!(table.len(), 2);
	assert_eq!(cursor.pos(), 5, "cursor returns to just after the header");
	assert_eq!(cursor.end(), 7, "logical end excludes the map");
	assert_eq!(table.reserve_slot(true).expect("first position"), 2);
	assert_eq!(table.reserve_slot(true).expect("second position"), 1);
	assert!(matches!(table.reserve_slot(true), Err(CacheError::ShareIndexError { .. })));
}

#[test]
fn oversized_map_count_is_truncated() {
	let mut bytes = vec![0x7E];
	bytes.extend_from_slice(&1_000_i32.to_le_bytes());
	bytes.extend_from_slice(&[0x09; 8]);
	let mut cursor = Cursor::new(&bytes);
	let err = ShareTable::read(&mut cursor).expect_err("map cannot fit");
	assert!(matches!(err, CacheError::TruncatedShareTable { count: 1_000, at: 5, len: 13 }));
	assert_eq!(cursor.pos(), 5, "no reads past the header");
}

#[test]
fn negative_map_count_is_truncated() {
	let mut bytes = vec![0x7E];
	bytes.extend_from_slice(&(-1_i32).to_le_bytes());
	let mut cursor = Cursor::new(&bytes);
	assert!(matches!(ShareTable::read(&mut cursor), Err(CacheError::TruncatedShareTable { count: -1, .. })));
}

#[test]
fn map_entries_outside_range_are_corrupt() {
	for bad in [0, 3, -7] {
		let bytes = stream_with_map(&[0x09], &[1, bad]);
		let mut cursor = Cursor::new(&bytes);
		let err = ShareTable::read(&mut cursor).expect_err("bogus entry rejected");
		assert!(matches!(err, CacheError::CorruptShareTable { index: 1, count: 2, .. }), "entry {bad}");
	}
}

#[test]
fn slots_hand_out_independent_copies() {
	let bytes = stream_with_map(&[], &[1]);
	let mut cursor = Cursor::new(&bytes);
	let mut table = ShareTable::read(&mut cursor).expect("map parses");

	let original = Node::List(vec![Node::int(1)]);
	table.add_shared(&original).expect("slot stored");

	let mut first = table.get_shared(0).expect("slot populated");
	if let Node::List(items) = &mut first {
		items.push(Node::int(2));
	}
	let second = table.get_shared(0).expect("slot populated");
	assert_eq!(second, original, "mutating a copy leaves the slot untouched");
	assert_ne!(first, second);
}

#[test]
fn unpopulated_and_out_of_range_slots_fail() {
	let bytes = stream_with_map(&[], &[1]);
	let mut cursor = Cursor::new(&bytes);
	let mut table = ShareTable::read(&mut cursor).expect("map parses");

	let id = table.reserve_slot(true).expect("reserve");
	assert_eq!(id, 1);
	assert!(matches!(table.get_shared(0), Err(CacheError::ShareIndexError { reason: "no shared object at position", .. })));
	assert!(matches!(table.get_shared(1), Err(CacheError::ShareIndexError { .. })));
	assert!(matches!(table.get_shared(-1), Err(CacheError::ShareIndexError { .. })));

	table.update_slot(id, &Node::None).expect("update reserved slot");
	assert_eq!(table.get_shared(0).expect("populated"), Node::None);
}

#[test]
fn slot_named_twice_is_rejected() {
	let bytes = stream_with_map(&[], &[1, 1]);
	let mut cursor = Cursor::new(&bytes);
	let mut table = ShareTable::read(&mut cursor).expect("map parses");

	let first = table.reserve_slot(true).expect("first position");
	table.update_slot(first, &Node::int(1)).expect("first write");
	let second = table.reserve_slot(true).expect("second position");
	assert_eq!(second, first);

	let err = table.update_slot(second, &Node::int(2)).expect_err("slot already written");
	assert!(matches!(err, CacheError::ShareIndexError { reason: "slot already populated", index: 0, size: 2 }));
	assert_eq!(table.get_shared(0).expect("first write kept"), Node::int(1));
}

#[test]
fn unshared_reservation_is_slot_zero() {
	let mut table = ShareTable::empty();
	assert_eq!(table.reserve_slot(false).expect("no-op"), 0);
	table.update_slot(0, &Node::None).expect("slot zero is ignored");
	assert_eq!(table.position(), 0);
}
