use std::collections::TryReserveError;

/// Fatal index construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
	/// The allocator refused to grow the table.
	#[error("allocation exhausted while growing index past {entries} entries")]
	AllocationExhausted { entries: usize },
}

impl IndexError {
	pub(crate) fn exhausted(entries: usize, _cause: TryReserveError) -> Self {
		Self::AllocationExhausted { entries }
	}
}
