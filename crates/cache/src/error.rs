use thiserror::Error;

use crate::{BuildError, SourceError};

/// Misuse of the refresher lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
	#[error("refresher already started")]
	AlreadyStarted,
	#[error("refresher is not running")]
	NotStarted,
	#[error("refresher must be started from within a tokio runtime")]
	NoRuntime,
	#[error("refresh interval must be non-zero")]
	ZeroInterval,
}

/// Failure of one rebuild. The published snapshot is untouched.
#[derive(Debug, Error)]
pub enum RefreshError {
	#[error(transparent)]
	Source(#[from] SourceError),
	#[error(transparent)]
	Build(#[from] BuildError),
	/// The rebuild task panicked or was cancelled on the blocking pool.
	#[error("refresh worker failed: {0}")]
	Worker(String),
}

impl RefreshError {
	/// Whether the refresher should stop cycling after this error.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Build(BuildError::AllocationExhausted(_)))
	}
}
