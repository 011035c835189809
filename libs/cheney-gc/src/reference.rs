use std::fmt::{Debug, Display, Formatter};

/// A reference to a chunk: the index of its slot in the active space.
///
/// A `ChunkRef` only means something relative to the space that was active when it was
/// obtained. After a collection every reference held outside the heap is stale unless it
/// was read back from the root set or from a relocated chunk.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ChunkRef(u32);

impl ChunkRef {
	pub const fn new(index: u32) -> ChunkRef {
		ChunkRef(index)
	}

	pub(crate) fn from_slot(slot: usize) -> ChunkRef {
		// Spaces never hold more than u32::MAX slots, see `Space::new`.
		ChunkRef(slot as u32)
	}

	pub const fn index(self) -> u32 {
		self.0
	}

	pub const fn slot(self) -> usize {
		self.0 as usize
	}
}

impl Debug for ChunkRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

impl Display for ChunkRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}
