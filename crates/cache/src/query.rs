use std::sync::Arc;

use crate::{GroupId, IdentitySnapshot, NO_GROUP, NO_USER, NameView, SnapshotStore, UidAndGid, UserEntry, UserId};

/// Caller-facing lookups against the latest published snapshot.
///
/// Every call loads the store once, so each answer comes from a single snapshot.
/// Unknown identities yield sentinels instead of errors: an empty name, [`NO_USER`]
/// or [`NO_GROUP`].
#[derive(Debug, Clone)]
pub struct UserAndGroup {
	store: Arc<SnapshotStore>,
	empty: Arc<str>,
}

impl UserAndGroup {
	pub fn new(store: Arc<SnapshotStore>) -> Self {
		Self {
			store,
			empty: Arc::from(""),
		}
	}

	pub fn store(&self) -> &Arc<SnapshotStore> {
		&self.store
	}

	/// Name of `uid`, or the empty name.
	pub fn user_name(&self, uid: UserId) -> Arc<str> {
		match self.store.load().user(uid) {
			Some(entry) => Arc::clone(&entry.name),
			None => Arc::clone(&self.empty),
		}
	}

	/// Name and primary group of `uid`, or the empty name with [`NO_GROUP`].
	pub fn user_name_and_group(&self, uid: UserId) -> UserEntry {
		match self.store.load().user(uid) {
			Some(entry) => entry.clone(),
			None => UserEntry {
				name: Arc::clone(&self.empty),
				primary_gid: NO_GROUP,
			},
		}
	}

	/// Name of `gid`, or the empty name.
	pub fn group_name(&self, gid: GroupId) -> Arc<str> {
		match self.store.load().gid_map().find(&gid) {
			Some(name) => Arc::clone(name),
			None => Arc::clone(&self.empty),
		}
	}

	/// Uid named `name`, or [`NO_USER`].
	pub fn user_id(&self, name: &str) -> UserId {
		self.store.load().user_by_name(name).map_or(NO_USER, |u| u.uid)
	}

	/// Uid and primary gid of the user named `name`, or [`UidAndGid::NONE`].
	pub fn user_id_and_group(&self, name: &str) -> UidAndGid {
		self.store.load().user_by_name(name).unwrap_or(UidAndGid::NONE)
	}

	/// Gid named `name`, or [`NO_GROUP`].
	pub fn group_id(&self, name: &str) -> GroupId {
		self.store.load().group_id(name).unwrap_or(NO_GROUP)
	}

	/// False for an unknown group or a uid outside its member set.
	pub fn is_group_member(&self, uid: UserId, gid: GroupId) -> bool {
		self.store.load().is_group_member(uid, gid)
	}

	pub fn is_privileged(&self, uid: UserId) -> bool {
		self.store.load().is_privileged(uid)
	}

	/// Number of snapshots published so far.
	pub fn update_count(&self) -> u64 {
		self.store.update_count()
	}

	/// Pins the current snapshot for batch access to its indices.
	pub fn snapshot(&self) -> Arc<IdentitySnapshot> {
		self.store.current()
	}

	/// Name-only view over the current snapshot that can detect its own staleness.
	pub fn names(&self) -> NameView {
		NameView::new(&self.store)
	}
}
