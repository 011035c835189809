use crate::{Chunk, ChunkRef};
use cheney_core::MAX_SPACE_CAPACITY;
use std::fmt::{Display, Formatter};

/// Names the two semi-spaces. The heap's active flag holds one of these.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SpaceId {
	From,
	To,
}

impl SpaceId {
	pub fn other(self) -> SpaceId {
		match self {
			SpaceId::From => SpaceId::To,
			SpaceId::To => SpaceId::From,
		}
	}
}

impl Display for SpaceId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			SpaceId::From => f.write_str("from"),
			SpaceId::To => f.write_str("to"),
		}
	}
}

/// A fixed array of chunk slots filled from the bottom by a bump cursor.
///
/// Slots below `cursor` are the live region; everything at or above it is free (or left
/// over from before the last flip, which is the same thing).
pub struct Space {
	id: SpaceId,
	chunks: Box<[Chunk]>,
	/// First free slot.
	cursor: usize,
}

impl Space {
	pub fn new(id: SpaceId, capacity: usize) -> Space {
		assert!(
			capacity <= MAX_SPACE_CAPACITY,
			"space capacity {capacity} does not fit a chunk reference"
		);

		Space {
			id,
			chunks: vec![Chunk::default(); capacity].into_boxed_slice(),
			cursor: 0,
		}
	}

	pub fn id(&self) -> SpaceId {
		self.id
	}

	pub fn capacity(&self) -> usize {
		self.chunks.len()
	}

	pub fn cursor(&self) -> usize {
		self.cursor
	}

	pub fn is_full(&self) -> bool {
		self.cursor == self.chunks.len()
	}

	pub fn free_slots(&self) -> usize {
		self.chunks.len() - self.cursor
	}

	/// Claims the slot at the cursor and resets it to a fresh chunk.
	pub(crate) fn bump(&mut self) -> Option<ChunkRef> {
		let slot = self.cursor;
		let chunk = self.chunks.get_mut(slot)?;
		*chunk = Chunk::default();
		self.cursor += 1;
		Some(ChunkRef::from_slot(slot))
	}

	/// Claims the slot at the cursor for `chunk` verbatim.
	pub(crate) fn push(&mut self, chunk: Chunk) -> Option<ChunkRef> {
		let reference = self.bump()?;
		self.chunks[reference.slot()] = chunk;
		Some(reference)
	}

	pub fn contains(&self, reference: ChunkRef) -> bool {
		reference.slot() < self.cursor
	}

	pub fn get(&self, reference: ChunkRef) -> Option<&Chunk> {
		self.live().get(reference.slot())
	}

	pub(crate) fn get_mut(&mut self, reference: ChunkRef) -> Option<&mut Chunk> {
		let cursor = self.cursor;
		self.chunks[..cursor].get_mut(reference.slot())
	}

	pub fn live(&self) -> &[Chunk] {
		&self.chunks[..self.cursor]
	}

	pub(crate) fn live_mut(&mut self) -> &mut [Chunk] {
		&mut self.chunks[..self.cursor]
	}

	/// Forgets every chunk. The slots keep their old contents until they are reused.
	pub(crate) fn reset(&mut self) {
		self.cursor = 0;
	}
}
