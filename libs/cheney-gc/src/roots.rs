use crate::{ChunkRef, GcError};
use cheney_core::GC_TARGET;
use tracing::trace;

/// Something that owns references into the heap and lets the collector rewrite them.
pub trait RootProvider {
	/// Replace every root with the value given by `mapper`, in the order the collector
	/// should relocate them.
	fn remap_roots(&mut self, mapper: impl FnMut(ChunkRef) -> ChunkRef);
}

/// A bounded stack of root references.
///
/// Entries are never dereferenced or validated here; keeping them pointing at live
/// chunks is up to whoever pushes them.
pub struct RootSet {
	entries: Vec<ChunkRef>,
	capacity: usize,
}

impl RootSet {
	pub fn new(capacity: usize) -> RootSet {
		RootSet {
			entries: Vec::with_capacity(capacity),
			capacity,
		}
	}

	pub fn push(&mut self, reference: ChunkRef) -> Result<(), GcError> {
		if self.entries.len() >= self.capacity {
			return Err(GcError::StackOverflow {
				capacity: self.capacity,
			});
		}

		trace!(target: GC_TARGET, "Pushing root {reference} at depth {}", self.entries.len());
		self.entries.push(reference);
		Ok(())
	}

	pub fn pop(&mut self) -> Result<ChunkRef, GcError> {
		let reference = self.entries.pop().ok_or(GcError::StackUnderflow)?;
		trace!(target: GC_TARGET, "Popped root {reference}");
		Ok(reference)
	}

	pub fn peek(&self) -> Option<ChunkRef> {
		self.entries.last().copied()
	}

	pub fn get(&self, depth: usize) -> Option<ChunkRef> {
		self.entries.get(depth).copied()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn is_full(&self) -> bool {
		self.entries.len() == self.capacity
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Entries from the bottom of the stack (first pushed) to the top.
	pub fn as_slice(&self) -> &[ChunkRef] {
		&self.entries
	}

	pub fn iter(&self) -> impl Iterator<Item = ChunkRef> + '_ {
		self.entries.iter().copied()
	}
}

impl RootProvider for RootSet {
	// Bottom of the stack first, the order the roots were pushed in.
	fn remap_roots(&mut self, mut mapper: impl FnMut(ChunkRef) -> ChunkRef) {
		for reference in self.entries.iter_mut() {
			*reference = mapper(*reference);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn push_and_pop_follow_stack_order() {
		let mut roots = RootSet::new(4);
		roots.push(ChunkRef::new(1)).unwrap();
		roots.push(ChunkRef::new(2)).unwrap();

		assert_eq!(roots.len(), 2);
		assert_eq!(roots.peek(), Some(ChunkRef::new(2)));
		assert_eq!(roots.get(0), Some(ChunkRef::new(1)));

		assert_eq!(roots.pop(), Ok(ChunkRef::new(2)));
		assert_eq!(roots.pop(), Ok(ChunkRef::new(1)));
		assert!(roots.is_empty());
	}

	#[test]
	fn overflow_leaves_entries_untouched() {
		let mut roots = RootSet::new(2);
		roots.push(ChunkRef::new(0)).unwrap();
		roots.push(ChunkRef::new(0)).unwrap();
		assert!(roots.is_full());

		assert_eq!(
			roots.push(ChunkRef::new(5)),
			Err(GcError::StackOverflow { capacity: 2 })
		);
		assert_eq!(roots.as_slice(), &[ChunkRef::new(0), ChunkRef::new(0)]);
	}

	#[test]
	fn underflow_on_empty() {
		let mut roots = RootSet::new(1);
		assert_eq!(roots.pop(), Err(GcError::StackUnderflow));

		roots.push(ChunkRef::new(3)).unwrap();
		roots.pop().unwrap();
		assert_eq!(roots.pop(), Err(GcError::StackUnderflow));
	}

	#[test]
	fn remap_visits_bottom_to_top() {
		let mut roots = RootSet::new(3);
		for index in [4, 8, 15] {
			roots.push(ChunkRef::new(index)).unwrap();
		}

		let mut seen = vec![];
		roots.remap_roots(|reference| {
			seen.push(reference);
			ChunkRef::new(seen.len() as u32 - 1)
		});

		assert_eq!(
			seen,
			vec![ChunkRef::new(4), ChunkRef::new(8), ChunkRef::new(15)]
		);
		assert_eq!(
			roots.as_slice(),
			&[ChunkRef::new(0), ChunkRef::new(1), ChunkRef::new(2)]
		);
	}
}
