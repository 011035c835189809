use cheney_core::{HeapConfig, GC_TARGET};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::collector::{self, GcStatistics};
use crate::{
	Chunk, ChunkRef, GcError, GcResult, HeapDump, Payload, RootSet, Space, SpaceId, Tag,
};

/// Two semi-spaces, the flag saying which one is active, and the root set.
///
/// Allocation bumps through the active space and never collects on its own; call
/// [`Heap::collect`] (and retry) when [`GcError::HeapExhausted`] comes back.
pub struct Heap {
	from: Space,
	to: Space,
	active: SpaceId,
	roots: RootSet,
	collections: usize,
}

impl Heap {
	pub fn new(config: HeapConfig) -> Heap {
		debug!(
			target: GC_TARGET,
			"Creating heap with {} chunks per space and {} roots",
			config.space_capacity,
			config.root_capacity
		);

		Heap {
			from: Space::new(SpaceId::From, config.space_capacity),
			to: Space::new(SpaceId::To, config.space_capacity),
			active: SpaceId::From,
			roots: RootSet::new(config.root_capacity),
			collections: 0,
		}
	}

	fn space(&self) -> &Space {
		match self.active {
			SpaceId::From => &self.from,
			SpaceId::To => &self.to,
		}
	}

	fn space_mut(&mut self) -> &mut Space {
		match self.active {
			SpaceId::From => &mut self.from,
			SpaceId::To => &mut self.to,
		}
	}

	// ========================================================================
	// Allocation and collection
	// ========================================================================

	/// Takes the next free slot of the active space. The chunk starts as `Scalar(0)`.
	pub fn allocate(&mut self) -> GcResult<ChunkRef> {
		let space = self.space_mut();
		let Some(reference) = space.bump() else {
			return Err(GcError::HeapExhausted {
				capacity: space.capacity(),
			});
		};

		trace!(
			target: GC_TARGET,
			"Allocated {reference} in the {} space ({}/{})",
			space.id(),
			space.cursor(),
			space.capacity()
		);
		Ok(reference)
	}

	/// Relocates everything reachable from the roots into the reserve space and makes
	/// it the active one. References held outside the heap are stale afterwards; read
	/// the roots back to get the new locations.
	pub fn collect(&mut self) -> GcStatistics {
		let (from, to) = match self.active {
			SpaceId::From => (&mut self.from, &mut self.to),
			SpaceId::To => (&mut self.to, &mut self.from),
		};

		let statistics = collector::collect(from, to, &mut self.roots);
		self.active = self.active.other();
		self.collections += 1;

		debug!(
			target: GC_TARGET,
			"Collection {} finished, {} space active with {} chunks",
			self.collections,
			self.active,
			statistics.chunks_remaining
		);
		statistics
	}

	// ========================================================================
	// Roots
	// ========================================================================

	pub fn push(&mut self, reference: ChunkRef) -> GcResult<()> {
		self.roots.push(reference)
	}

	pub fn pop(&mut self) -> GcResult<ChunkRef> {
		self.roots.pop()
	}

	pub fn roots(&self) -> &RootSet {
		&self.roots
	}

	/// The root at `depth` (0 is the first pushed), translated by every collection so far.
	pub fn root(&self, depth: usize) -> Option<ChunkRef> {
		self.roots.get(depth)
	}

	// ========================================================================
	// Mutator access
	// ========================================================================

	pub fn chunk(&self, reference: ChunkRef) -> GcResult<&Chunk> {
		self.space()
			.get(reference)
			.ok_or(GcError::DanglingReference(reference))
	}

	pub fn payload(&self, reference: ChunkRef) -> GcResult<Payload> {
		Ok(self.chunk(reference)?.payload)
	}

	pub fn set_payload(&mut self, reference: ChunkRef, payload: Payload) -> GcResult<()> {
		let space = self.space_mut();
		if let Payload::Reference(target) = payload {
			if !space.contains(target) {
				return Err(GcError::DanglingReference(target));
			}
		}

		let chunk = space
			.get_mut(reference)
			.ok_or(GcError::DanglingReference(reference))?;
		chunk.payload = payload;
		Ok(())
	}

	pub fn set_scalar(&mut self, reference: ChunkRef, value: u32) -> GcResult<()> {
		self.set_payload(reference, Payload::Scalar(value))
	}

	pub fn set_reference(&mut self, reference: ChunkRef, target: ChunkRef) -> GcResult<()> {
		self.set_payload(reference, Payload::Reference(target))
	}

	/// Untyped store: `word` is read as a scalar or as a chunk index depending on `tag`.
	pub fn store_raw(&mut self, reference: ChunkRef, tag: u8, word: u32) -> GcResult<()> {
		let payload = match Tag::from_raw(tag)? {
			Tag::Scalar => Payload::Scalar(word),
			Tag::Reference => Payload::Reference(ChunkRef::new(word)),
		};
		self.set_payload(reference, payload)
	}

	// ========================================================================
	// Inspection
	// ========================================================================

	/// Which semi-space currently serves allocations.
	pub fn active(&self) -> SpaceId {
		self.active
	}

	/// Chunks of the active space, in slot order.
	pub fn live(&self) -> &[Chunk] {
		self.space().live()
	}

	pub fn live_count(&self) -> usize {
		self.space().cursor()
	}

	pub fn capacity(&self) -> usize {
		self.space().capacity()
	}

	pub fn free_slots(&self) -> usize {
		self.space().free_slots()
	}

	pub fn collections(&self) -> usize {
		self.collections
	}

	pub fn dump(&self) -> HeapDump<'_> {
		HeapDump::new(self)
	}
}

impl Default for Heap {
	fn default() -> Self {
		Heap::new(HeapConfig::default())
	}
}

/// A heap that can be shared between threads.
///
/// Every call holds the lock for its whole duration, so a collection never overlaps a
/// mutation.
pub struct SharedHeap {
	inner: Mutex<Heap>,
}

impl SharedHeap {
	pub fn new(config: HeapConfig) -> SharedHeap {
		SharedHeap {
			inner: Mutex::new(Heap::new(config)),
		}
	}

	/// Holds the heap for a sequence of operations, e.g. allocating and rooting a chunk
	/// before anyone else can collect.
	pub fn lock(&self) -> MutexGuard<'_, Heap> {
		self.inner.lock()
	}

	pub fn allocate(&self) -> GcResult<ChunkRef> {
		self.inner.lock().allocate()
	}

	pub fn collect(&self) -> GcStatistics {
		self.inner.lock().collect()
	}

	pub fn push(&self, reference: ChunkRef) -> GcResult<()> {
		self.inner.lock().push(reference)
	}

	pub fn pop(&self) -> GcResult<ChunkRef> {
		self.inner.lock().pop()
	}

	pub fn live_count(&self) -> usize {
		self.inner.lock().live_count()
	}

	pub fn into_inner(self) -> Heap {
		self.inner.into_inner()
	}
}

impl From<Heap> for SharedHeap {
	fn from(heap: Heap) -> Self {
		SharedHeap {
			inner: Mutex::new(heap),
		}
	}
}
