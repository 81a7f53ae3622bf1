//! Immutable identity snapshots.
//!
//! # Role
//!
//! An [`IdentitySnapshot`] bundles the six lookup collections derived from one read
//! of the identity source. It has no mutating methods; a refresh replaces the whole
//! snapshot through [`crate::SnapshotStore::publish`].
//!
//! # Invariants
//!
//! - All collections of one snapshot come from the same source read.
//! - `by_user_name[n].uid` always resolves back to `n` through `by_uid`, and likewise
//!   for groups.
//! - Membership is only recorded for users and groups present in the snapshot.

mod build;
mod policy;

use std::sync::Arc;

use ugid_index::{IdSet, IdentityHash, Index, StringHash};

pub use build::{BuildError, SnapshotBuilder};
pub use policy::BuildPolicy;

use crate::{GroupId, UidAndGid, UserEntry, UserId};

pub type UidMap = Index<UserId, UserEntry, IdentityHash>;
pub type GidMap = Index<GroupId, Arc<str>, IdentityHash>;
pub type UserNameMap = Index<Arc<str>, UidAndGid, StringHash>;
pub type GroupNameMap = Index<Arc<str>, GroupId, StringHash>;
pub type MemberSet = IdSet<UserId, IdentityHash>;
pub type GroupMembersMap = Index<GroupId, MemberSet, IdentityHash>;
pub type PrivilegedSet = IdSet<UserId, IdentityHash>;

/// One coherent generation of the identity mapping set.
#[derive(Debug, Default)]
pub struct IdentitySnapshot {
	pub(crate) by_uid: UidMap,
	pub(crate) by_gid: GidMap,
	pub(crate) by_user_name: UserNameMap,
	pub(crate) by_group_name: GroupNameMap,
	pub(crate) members: GroupMembersMap,
	pub(crate) privileged: PrivilegedSet,
	/// Stamped by the store on publish; 0 until then.
	pub(crate) generation: u64,
}

impl IdentitySnapshot {
	/// Snapshot with no identities, served before the first publish.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Update-counter value this snapshot was published under.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	#[inline]
	pub fn user(&self, uid: UserId) -> Option<&UserEntry> {
		self.by_uid.find(&uid)
	}

	#[inline]
	pub fn user_name(&self, uid: UserId) -> Option<&str> {
		self.user(uid).map(|entry| &*entry.name)
	}

	#[inline]
	pub fn group_name(&self, gid: GroupId) -> Option<&str> {
		self.by_gid.find(&gid).map(|name| &**name)
	}

	#[inline]
	pub fn user_by_name(&self, name: &str) -> Option<UidAndGid> {
		self.by_user_name.find(name).copied()
	}

	#[inline]
	pub fn group_id(&self, name: &str) -> Option<GroupId> {
		self.by_group_name.find(name).copied()
	}

	#[inline]
	pub fn is_group_member(&self, uid: UserId, gid: GroupId) -> bool {
		self.members.find(&gid).is_some_and(|set| set.contains(&uid))
	}

	#[inline]
	pub fn is_privileged(&self, uid: UserId) -> bool {
		self.privileged.contains(&uid)
	}

	pub fn uid_map(&self) -> &UidMap {
		&self.by_uid
	}

	pub fn gid_map(&self) -> &GidMap {
		&self.by_gid
	}

	pub fn user_name_map(&self) -> &UserNameMap {
		&self.by_user_name
	}

	pub fn group_name_map(&self) -> &GroupNameMap {
		&self.by_group_name
	}

	pub fn group_members(&self) -> &GroupMembersMap {
		&self.members
	}

	pub fn privileged_users(&self) -> &PrivilegedSet {
		&self.privileged
	}
}

#[cfg(test)]
mod tests;
