use crate::ChunkRef;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcError {
	#[error("root stack overflow ({capacity} roots)")]
	StackOverflow { capacity: usize },
	#[error("root stack underflow")]
	StackUnderflow,
	#[error("heap exhausted ({capacity} chunks in use)")]
	HeapExhausted { capacity: usize },
	#[error("bad chunk tag {0}")]
	CorruptTag(u8),
	#[error("{0} is not a live chunk")]
	DanglingReference(ChunkRef),
}

pub type GcResult<V> = Result<V, GcError>;
