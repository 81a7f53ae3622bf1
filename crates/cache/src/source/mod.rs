//! The identity source boundary.
//!
//! A source returns the complete current record set on every call; there is no
//! incremental protocol. Sources are called from the refresher's blocking pool and
//! from [`crate::Refresher::refresh_now`], never from query paths.

mod file;
mod fixed;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use file::FileSource;
pub use fixed::StaticSource;

use crate::SourceRecords;

/// Failure to obtain a full record set.
#[derive(Debug, Error)]
pub enum SourceError {
	#[error("failed to read {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},

	#[error("{path}:{line}: {reason}")]
	Malformed { path: PathBuf, line: usize, reason: String },

	#[error("identity source unavailable: {0}")]
	Unavailable(String),
}

/// Provider of the authoritative user/group record set.
pub trait IdentitySource: Send + Sync + 'static {
	/// Reads every user, group, privilege and membership record.
	fn read(&self) -> Result<SourceRecords, SourceError>;
}

impl<S: IdentitySource + ?Sized> IdentitySource for Arc<S> {
	fn read(&self) -> Result<SourceRecords, SourceError> {
		(**self).read()
	}
}

impl<S: IdentitySource + ?Sized> IdentitySource for Box<S> {
	fn read(&self) -> Result<SourceRecords, SourceError> {
		(**self).read()
	}
}
