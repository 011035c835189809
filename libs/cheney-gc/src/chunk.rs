use crate::{ChunkRef, GcError};
use std::fmt::{Display, Formatter};

/// Discriminant of a chunk's payload, with the raw values used by `Heap::store_raw`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Tag {
	Scalar = 0,
	Reference = 1,
}

impl Tag {
	pub fn from_raw(raw: u8) -> Result<Tag, GcError> {
		match raw {
			0 => Ok(Tag::Scalar),
			1 => Ok(Tag::Reference),
			_ => Err(GcError::CorruptTag(raw)),
		}
	}

	pub fn raw(self) -> u8 {
		self as u8
	}
}

impl Display for Tag {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Tag::Scalar => f.write_str("scalar"),
			Tag::Reference => f.write_str("reference"),
		}
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Payload {
	Scalar(u32),
	Reference(ChunkRef),
}

impl Payload {
	pub fn tag(&self) -> Tag {
		match self {
			Payload::Scalar(_) => Tag::Scalar,
			Payload::Reference(_) => Tag::Reference,
		}
	}

	pub fn as_scalar(&self) -> Option<u32> {
		match self {
			Payload::Scalar(value) => Some(*value),
			Payload::Reference(_) => None,
		}
	}

	pub fn as_reference(&self) -> Option<ChunkRef> {
		match self {
			Payload::Scalar(_) => None,
			Payload::Reference(reference) => Some(*reference),
		}
	}
}

impl Default for Payload {
	fn default() -> Self {
		Payload::Scalar(0)
	}
}

impl Display for Payload {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Payload::Scalar(value) => write!(f, "{value}"),
			Payload::Reference(reference) => write!(f, "{reference}"),
		}
	}
}

/// One fixed-size heap record.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Chunk {
	pub(crate) payload: Payload,
	/// Where this chunk was copied to in the current collection.
	/// Only set on chunks of the space being evacuated.
	pub(crate) forward: Option<ChunkRef>,
}

impl Chunk {
	pub fn tag(&self) -> Tag {
		self.payload.tag()
	}

	pub fn payload(&self) -> Payload {
		self.payload
	}

	pub fn forward(&self) -> Option<ChunkRef> {
		self.forward
	}

	pub fn is_forwarded(&self) -> bool {
		self.forward.is_some()
	}

	/// The copy placed in the reserve space: same payload, no forwarding marker.
	pub(crate) fn relocated(&self) -> Chunk {
		Chunk {
			payload: self.payload,
			forward: None,
		}
	}
}
