use parking_lot::RwLock;

use super::{IdentitySource, SourceError};
use crate::SourceRecords;

/// In-memory source whose record set can be swapped at runtime.
///
/// Reads return a copy of the current records, or the configured failure.
#[derive(Debug)]
pub struct StaticSource {
	state: RwLock<Result<SourceRecords, String>>,
}

impl Default for StaticSource {
	fn default() -> Self {
		Self::new(SourceRecords::default())
	}
}

impl StaticSource {
	pub fn new(records: SourceRecords) -> Self {
		Self {
			state: RwLock::new(Ok(records)),
		}
	}

	/// Replaces the records returned by subsequent reads.
	pub fn replace(&self, records: SourceRecords) {
		*self.state.write() = Ok(records);
	}

	/// Makes subsequent reads fail with [`SourceError::Unavailable`] until the next
	/// [`Self::replace`].
	pub fn fail_with(&self, reason: impl Into<String>) {
		*self.state.write() = Err(reason.into());
	}
}

impl IdentitySource for StaticSource {
	fn read(&self) -> Result<SourceRecords, SourceError> {
		match &*self.state.read() {
			Ok(records) => Ok(records.clone()),
			Err(reason) => Err(SourceError::Unavailable(reason.clone())),
		}
	}
}
