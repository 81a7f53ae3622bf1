use std::sync::Arc;

use crate::{GroupId, IdentitySnapshot, SnapshotStore, UserId};

/// A pinned uid/gid → name view for batch work.
///
/// The view holds one snapshot and the generation it was published under, so a
/// caller can keep it across many lookups and cheaply ask whether it has fallen
/// behind the store. Lookups against a stale view are coherent but old; call
/// [`Self::sync`] to move forward.
#[derive(Debug, Clone)]
pub struct NameView {
	snapshot: Arc<IdentitySnapshot>,
}

impl NameView {
	pub fn new(store: &SnapshotStore) -> Self {
		Self {
			snapshot: store.current(),
		}
	}

	/// Generation of the pinned snapshot.
	pub fn generation(&self) -> u64 {
		self.snapshot.generation()
	}

	/// True once the store has published past the pinned snapshot.
	pub fn is_stale(&self, store: &SnapshotStore) -> bool {
		store.update_count() > self.generation()
	}

	/// Re-pins the store's current snapshot if this view is stale.
	///
	/// Returns whether the view moved.
	pub fn sync(&mut self, store: &SnapshotStore) -> bool {
		if !self.is_stale(store) {
			return false;
		}
		self.set(store.current());
		true
	}

	/// Pins `snapshot` unconditionally.
	pub fn set(&mut self, snapshot: Arc<IdentitySnapshot>) {
		tracing::trace!(from = self.generation(), to = snapshot.generation(), "ugid.view.set");
		self.snapshot = snapshot;
	}

	pub fn user_name(&self, uid: UserId) -> Option<&str> {
		self.snapshot.user_name(uid)
	}

	pub fn group_name(&self, gid: GroupId) -> Option<&str> {
		self.snapshot.group_name(gid)
	}

	pub fn snapshot(&self) -> &Arc<IdentitySnapshot> {
		&self.snapshot
	}
}
