//! Identity records as delivered by an [`crate::IdentitySource`].

use std::sync::Arc;

/// Numeric user identifier.
pub type UserId = u32;
/// Numeric group identifier.
pub type GroupId = u32;

/// Returned by name lookups that find no user.
pub const NO_USER: UserId = u32::MAX;
/// Returned by name lookups that find no group, and the primary group of an unknown user.
pub const NO_GROUP: GroupId = u32::MAX;
/// The superuser id, always reported privileged by [`crate::FileSource`].
pub const ROOT_USER: UserId = 0;

/// One user as read from the identity source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
	pub uid: UserId,
	pub name: String,
	pub primary_gid: GroupId,
}

impl UserRecord {
	pub fn new(uid: UserId, name: impl Into<String>, primary_gid: GroupId) -> Self {
		Self {
			uid,
			name: name.into(),
			primary_gid,
		}
	}
}

/// One group as read from the identity source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
	pub gid: GroupId,
	pub name: String,
}

impl GroupRecord {
	pub fn new(gid: GroupId, name: impl Into<String>) -> Self {
		Self { gid, name: name.into() }
	}
}

/// Everything one read of the identity source returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecords {
	pub users: Vec<UserRecord>,
	pub groups: Vec<GroupRecord>,
	/// Uids granted superuser treatment by the source itself.
	pub privileged: Vec<UserId>,
	/// Group membership beyond each user's primary group.
	pub supplementary: Vec<(GroupId, Vec<UserId>)>,
}

/// Indexed value for a uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
	pub name: Arc<str>,
	pub primary_gid: GroupId,
}

/// Indexed value for a user name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidAndGid {
	pub uid: UserId,
	pub gid: GroupId,
}

impl UidAndGid {
	pub const NONE: Self = Self {
		uid: NO_USER,
		gid: NO_GROUP,
	};
}
