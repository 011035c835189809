//! A Cheney semi-space copying collector over fixed-size chunks.
//!
//! A [`Heap`] owns two equal [`Space`]s and a bounded [`RootSet`]. Chunks are allocated
//! by bumping through the active space; [`Heap::collect`] copies everything reachable
//! from the roots into the other space breadth-first and flips the two.

mod chunk;
mod collector;
mod dump;
mod error;
mod heap;
mod reference;
mod roots;
mod space;

pub use chunk::*;
pub use collector::GcStatistics;
pub use dump::*;
pub use error::*;
pub use heap::*;
pub use reference::*;
pub use roots::*;
pub use space::*;
