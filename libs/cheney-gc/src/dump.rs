use crate::Heap;
use std::fmt::{Display, Formatter};

/// Read-only snapshot printer for a [`Heap`], returned by [`Heap::dump`].
pub struct HeapDump<'a> {
	heap: &'a Heap,
}

impl<'a> HeapDump<'a> {
	pub(crate) fn new(heap: &'a Heap) -> HeapDump<'a> {
		HeapDump { heap }
	}
}

impl Display for HeapDump<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let heap = self.heap;
		writeln!(f, "*** heap dump")?;
		writeln!(
			f,
			"space = {} ({}/{} slots)",
			heap.active(),
			heap.live_count(),
			heap.capacity()
		)?;

		for (slot, chunk) in heap.live().iter().enumerate() {
			write!(f, "#{slot}: chunk tag={} data={} forward=", chunk.tag(), chunk.payload())?;
			match chunk.forward() {
				Some(forward) => writeln!(f, "{forward}")?,
				None => writeln!(f, "none")?,
			}
		}

		write!(f, "roots = {} chunk(s)", heap.roots().len())
	}
}
