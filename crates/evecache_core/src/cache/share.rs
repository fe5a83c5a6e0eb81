use crate::cache::bytes::Cursor;
use crate::cache::node::Node;
use crate::cache::{CacheError, Result};

const ENTRY_SIZE: usize = 4;

/// Shared-object table of one decode session.
///
/// The map is stored at the tail of the stream: entry `i` names the 1-based
/// slot that the `i`-th shared node occupies. Slots are written once and
/// every read hands out a deep copy.
#[derive(Debug, Clone, Default)]
pub struct ShareTable {
	map: Vec<usize>,
	slots: Vec<Option<Node>>,
	position: usize,
}

impl ShareTable {
	/// Table for buffers without a share map (unpacked row data).
	pub fn empty() -> Self {
		Self::default()
	}

	/// Run the stream security check and load the share map.
	///
	/// Expects the cursor at the stream start byte. On success the cursor sits
	/// just after the header and its logical end excludes the map.
	pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
		cursor.skip(1)?;
		let count = cursor.read_i32()?;
		let at = cursor.pos();
		let len = cursor.len();

		let skip = usize::try_from(count)
			.ok()
			.and_then(|count| count.checked_mul(ENTRY_SIZE))
			.filter(|skip| at.checked_add(*skip).is_some_and(|end| end <= len))
			.ok_or(CacheError::TruncatedShareTable { count, at, len })?;
		let count = skip / ENTRY_SIZE;

		let mut tail = Cursor::new(&cursor.bytes()[len - skip..]);
		let mut map = Vec::with_capacity(count);
		for index in 0..count {
			let entry = tail.read_i32()?;
			if entry < 1 || entry as usize > count {
				return Err(CacheError::CorruptShareTable { index, entry, count });
			}
			map.push(entry as usize);
		}

		cursor.set_end(len - skip);
		Ok(Self {
			map,
			slots: vec![None; count],
			position: 0,
		})
	}

	/// Number of slots (and map entries).
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether the stream declared no shared nodes.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Map positions consumed so far.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Claim the next map position when `shared`; returns the 1-based slot or 0.
	pub fn reserve_slot(&mut self, shared: bool) -> Result<usize> {
		if !shared {
			return Ok(0);
		}

		let id = *self.map.get(self.position).ok_or(CacheError::ShareIndexError {
			reason: "share position out of range",
			index: self.position as i64,
			size: self.map.len(),
		})?;
		self.position += 1;
		Ok(id)
	}

	/// Store a deep copy of `node` in a slot returned by [`Self::reserve_slot`].
	///
	/// Each slot is written once; a map naming the same slot twice fails here.
	pub fn update_slot(&mut self, id: usize, node: &Node) -> Result<()> {
		if id == 0 {
			return Ok(());
		}

		let size = self.slots.len();
		let slot = self.slots.get_mut(id - 1).ok_or(CacheError::ShareIndexError {
			reason: "slot out of range",
			index: id as i64 - 1,
			size,
		})?;
		if slot.is_some() {
			return Err(CacheError::ShareIndexError {
				reason: "slot already populated",
				index: id as i64 - 1,
				size,
			});
		}
		*slot = Some(node.clone());
		Ok(())
	}

	/// Reserve the next position and store `node` in it.
	pub fn add_shared(&mut self, node: &Node) -> Result<()> {
		let id = self.reserve_slot(true)?;
		self.update_slot(id, node)
	}

	/// Return a deep copy of the node stored at 0-based `index`.
	pub fn get_shared(&self, index: i64) -> Result<Node> {
		let slot = usize::try_from(index).ok().and_then(|index| self.slots.get(index));
		match slot {
			Some(Some(node)) => Ok(node.clone()),
			Some(None) => Err(CacheError::ShareIndexError {
				reason: "no shared object at position",
				index,
				size: self.slots.len(),
			}),
			None => Err(CacheError::ShareIndexError {
				reason: "shared reference out of range",
				index,
				size: self.slots.len(),
			}),
		}
	}
}

#[cfg(test)]
mod tests;
