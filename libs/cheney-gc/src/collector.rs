//! Cheney's two-phase copying collection.
//!
//! The reserve space doubles as the work queue: everything between the scan index and
//! the reserve's bump cursor has been copied but not yet had its payload rewritten. A
//! chunk's `forward` slot in the evacuated space is both the "already copied" flag and the
//! address translation, so no visited set or side table is needed.

use cheney_core::GC_TARGET;
use tracing::debug;

use crate::{ChunkRef, Payload, RootProvider, Space};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct GcStatistics {
	/// Chunks copied while relocating the roots.
	pub roots_copied: usize,
	/// Chunks copied while scanning, i.e. reached only through other chunks.
	pub chunks_copied: usize,
	/// Chunks left behind in the abandoned space.
	pub chunks_cleared: usize,
	/// Live chunks after the collection.
	pub chunks_remaining: usize,
}

/// Copies everything reachable from `roots` out of `from` into `to` and rewrites every
/// reference on the way. `to` is emptied first; `from` is left as garbage with its
/// forwarding markers set.
///
/// # Panics
/// If a root or a reference payload does not name a live chunk of `from`, or if `to` is
/// smaller than the live set. Neither can happen through `Heap`'s API.
pub(crate) fn collect(
	from: &mut Space,
	to: &mut Space,
	roots: &mut impl RootProvider,
) -> GcStatistics {
	debug!(
		target: GC_TARGET,
		"Starting garbage collection, evacuating {} chunks of the {} space",
		from.cursor(),
		from.id()
	);

	let live_before = from.cursor();
	to.reset();
	let mut evacuator = Evacuator {
		from,
		to,
		copied: 0,
	};

	debug!(target: GC_TARGET, "Copying roots");
	roots.remap_roots(|root| evacuator.forward(root));
	let roots_copied = evacuator.copied;

	debug!(target: GC_TARGET, "Scanning {roots_copied} root copies");
	// Terminates once scan catches up with the frontier: no copied chunk is left unprocessed.
	let mut scan = 0;
	while scan < evacuator.to.cursor() {
		if let Payload::Reference(target) = evacuator.to.live()[scan].payload {
			let forwarded = evacuator.forward(target);
			evacuator.to.live_mut()[scan].payload = Payload::Reference(forwarded);
		}
		scan += 1;
	}

	let statistics = GcStatistics {
		roots_copied,
		chunks_copied: evacuator.copied - roots_copied,
		chunks_cleared: live_before - evacuator.copied,
		chunks_remaining: evacuator.copied,
	};

	check_invariant(evacuator.to);
	debug!(
		target: GC_TARGET,
		"Copied roots = {}, copied chunks = {}, cleared = {}",
		statistics.roots_copied,
		statistics.chunks_copied,
		statistics.chunks_cleared
	);
	statistics
}

struct Evacuator<'a> {
	from: &'a mut Space,
	to: &'a mut Space,
	copied: usize,
}

impl Evacuator<'_> {
	/// Returns the new location of `reference`, copying it first if this collection has
	/// not reached it yet.
	fn forward(&mut self, reference: ChunkRef) -> ChunkRef {
		let from_id = self.from.id();
		let Some(chunk) = self.from.get_mut(reference) else {
			panic!("{reference} is not a live chunk of the {from_id} space");
		};

		if let Some(forwarded) = chunk.forward {
			return forwarded;
		}

		let Some(copy) = self.to.push(chunk.relocated()) else {
			panic!(
				"{} space overflowed while evacuating {reference}",
				self.to.id()
			);
		};
		// Leave a forwarding address so later paths to this chunk share the copy.
		chunk.forward = Some(copy);
		self.copied += 1;
		copy
	}
}

/// Every live chunk of a freshly collected space is unforwarded and only points inside
/// the live region.
fn check_invariant(space: &Space) {
	if cfg!(debug_assertions) {
		for (slot, chunk) in space.live().iter().enumerate() {
			debug_assert!(
				!chunk.is_forwarded(),
				"#{slot} kept a forwarding marker after collection"
			);
			if let Some(target) = chunk.payload.as_reference() {
				debug_assert!(
					space.contains(target),
					"#{slot} points past the live region at {target}"
				);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Chunk, RootSet, SpaceId};

	fn seed(space: &mut Space, payload: Payload) -> ChunkRef {
		space
			.push(Chunk {
				payload,
				forward: None,
			})
			.unwrap()
	}

	fn spaces(capacity: usize) -> (Space, Space) {
		cheney_core::init();
		(
			Space::new(SpaceId::From, capacity),
			Space::new(SpaceId::To, capacity),
		)
	}

	#[test]
	fn roots_are_copied_before_the_scan() {
		let (mut from, mut to) = spaces(8);
		let leaf = seed(&mut from, Payload::Scalar(1));
		let parent = seed(&mut from, Payload::Reference(leaf));

		let mut roots = RootSet::new(2);
		roots.push(parent).unwrap();

		let stats = collect(&mut from, &mut to, &mut roots);

		assert_eq!(stats.roots_copied, 1);
		assert_eq!(stats.chunks_copied, 1);
		assert_eq!(stats.chunks_remaining, 2);
		// The root lands in the first slot, its child right after it.
		assert_eq!(roots.as_slice(), &[ChunkRef::new(0)]);
		assert_eq!(to.live()[0].payload(), Payload::Reference(ChunkRef::new(1)));
		assert_eq!(to.live()[1].payload(), Payload::Scalar(1));
	}

	#[test]
	fn source_chunks_keep_forwarding_markers() {
		let (mut from, mut to) = spaces(4);
		let garbage = seed(&mut from, Payload::Scalar(0));
		let kept = seed(&mut from, Payload::Scalar(9));

		let mut roots = RootSet::new(1);
		roots.push(kept).unwrap();
		collect(&mut from, &mut to, &mut roots);

		assert_eq!(from.get(kept).unwrap().forward(), Some(ChunkRef::new(0)));
		assert_eq!(from.get(garbage).unwrap().forward(), None);
	}

	#[test]
	fn duplicate_roots_share_one_copy() {
		let (mut from, mut to) = spaces(4);
		let shared = seed(&mut from, Payload::Scalar(3));

		let mut roots = RootSet::new(3);
		roots.push(shared).unwrap();
		roots.push(shared).unwrap();
		roots.push(shared).unwrap();

		let stats = collect(&mut from, &mut to, &mut roots);

		assert_eq!(stats.roots_copied, 1);
		assert_eq!(to.cursor(), 1);
		assert!(roots.iter().all(|root| root == ChunkRef::new(0)));
	}

	#[test]
	fn breadth_first_order() {
		// a -> b -> c, d -> c, roots [a, d]
		let (mut from, mut to) = spaces(8);
		let c = seed(&mut from, Payload::Scalar(30));
		let b = seed(&mut from, Payload::Reference(c));
		let a = seed(&mut from, Payload::Reference(b));
		let d = seed(&mut from, Payload::Reference(c));

		let mut roots = RootSet::new(2);
		roots.push(a).unwrap();
		roots.push(d).unwrap();
		let stats = collect(&mut from, &mut to, &mut roots);

		// Roots occupy 0 and 1; scanning a copies b (2), scanning d copies c (3).
		assert_eq!(stats.roots_copied, 2);
		assert_eq!(stats.chunks_copied, 2);
		let payloads: Vec<Payload> = to.live().iter().map(Chunk::payload).collect();
		assert_eq!(
			payloads,
			vec![
				Payload::Reference(ChunkRef::new(2)),
				Payload::Reference(ChunkRef::new(3)),
				Payload::Reference(ChunkRef::new(3)),
				Payload::Scalar(30),
			]
		);
	}

	#[test]
	fn empty_roots_clear_everything() {
		let (mut from, mut to) = spaces(4);
		for value in 0..4 {
			seed(&mut from, Payload::Scalar(value));
		}

		let mut roots = RootSet::new(1);
		let stats = collect(&mut from, &mut to, &mut roots);

		assert_eq!(stats.chunks_cleared, 4);
		assert_eq!(stats.chunks_remaining, 0);
		assert_eq!(to.cursor(), 0);
	}

	#[test]
	#[should_panic(expected = "is not a live chunk")]
	fn stale_root_is_fatal() {
		let (mut from, mut to) = spaces(4);
		seed(&mut from, Payload::Scalar(0));

		let mut roots = RootSet::new(1);
		roots.push(ChunkRef::new(3)).unwrap();
		collect(&mut from, &mut to, &mut roots);
	}
}
