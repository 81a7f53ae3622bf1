use std::ops::RangeInclusive;

use rustc_hash::FxHashSet;

use crate::{GroupId, GroupRecord, NO_GROUP, NO_USER, UserId, UserRecord};

/// Record filters applied while building a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPolicy {
	pub uid_range: RangeInclusive<UserId>,
	pub gid_range: RangeInclusive<GroupId>,
	pub omit_user_prefixes: Vec<String>,
	pub omit_group_prefixes: Vec<String>,
	pub exclude_users: FxHashSet<String>,
	pub exclude_groups: FxHashSet<String>,
	/// User names added to the privileged set when present in the snapshot.
	pub root_users: Vec<String>,
}

impl Default for BuildPolicy {
	fn default() -> Self {
		Self {
			uid_range: 0..=NO_USER - 1,
			gid_range: 0..=NO_GROUP - 1,
			omit_user_prefixes: Vec::new(),
			omit_group_prefixes: Vec::new(),
			exclude_users: FxHashSet::default(),
			exclude_groups: FxHashSet::default(),
			root_users: Vec::new(),
		}
	}
}

/// Why a record was left out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Skip {
	Sentinel,
	EmptyName,
	OutOfRange,
	Prefix,
	Excluded,
}

impl Skip {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Sentinel => "sentinel_id",
			Self::EmptyName => "empty_name",
			Self::OutOfRange => "out_of_range",
			Self::Prefix => "omitted_prefix",
			Self::Excluded => "excluded",
		}
	}
}

impl BuildPolicy {
	pub(crate) fn check_user(&self, user: &UserRecord) -> Result<(), Skip> {
		check(
			user.uid == NO_USER,
			&user.name,
			self.uid_range.contains(&user.uid),
			&self.omit_user_prefixes,
			&self.exclude_users,
		)
	}

	pub(crate) fn check_group(&self, group: &GroupRecord) -> Result<(), Skip> {
		check(
			group.gid == NO_GROUP,
			&group.name,
			self.gid_range.contains(&group.gid),
			&self.omit_group_prefixes,
			&self.exclude_groups,
		)
	}
}

fn check(sentinel: bool, name: &str, in_range: bool, prefixes: &[String], excluded: &FxHashSet<String>) -> Result<(), Skip> {
	if sentinel {
		Err(Skip::Sentinel)
	} else if name.is_empty() {
		Err(Skip::EmptyName)
	} else if !in_range {
		Err(Skip::OutOfRange)
	} else if prefixes.iter().any(|p| !p.is_empty() && name.starts_with(p.as_str())) {
		Err(Skip::Prefix)
	} else if excluded.contains(name) {
		Err(Skip::Excluded)
	} else {
		Ok(())
	}
}
