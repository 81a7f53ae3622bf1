use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use ugid_index::{IdSet, IdentityHash, Index, IndexBuilder, IndexError, StringHash};

use super::{BuildPolicy, IdentitySnapshot};
use crate::{GroupId, SourceRecords, UidAndGid, UserEntry, UserId};

/// Fatal snapshot construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("snapshot build aborted: {0}")]
	AllocationExhausted(#[from] IndexError),
}

/// Turns one source read into an [`IdentitySnapshot`].
///
/// Duplicate uids or gids resolve last-write-wins in input order, before the
/// policy filters run: when the last record for an id is filtered out, the id is
/// absent rather than served from a record it superseded. Name maps are derived
/// from the surviving id records, so a superseded name never resolves.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder<'a> {
	policy: &'a BuildPolicy,
}

impl<'a> SnapshotBuilder<'a> {
	pub fn new(policy: &'a BuildPolicy) -> Self {
		Self { policy }
	}

	pub fn build(&self, records: SourceRecords) -> Result<IdentitySnapshot, BuildError> {
		let SourceRecords {
			users,
			groups,
			privileged,
			supplementary,
		} = records;

		let users: Vec<_> = last_wins(users, |u| u.uid)
			.into_iter()
			.filter(|user| match self.policy.check_user(user) {
				Ok(()) => true,
				Err(skip) => {
					tracing::trace!(uid = user.uid, name = %user.name, reason = skip.as_str(), "ugid.snapshot.skip_user");
					false
				}
			})
			.collect();

		let groups: Vec<_> = last_wins(groups, |g| g.gid)
			.into_iter()
			.filter(|group| match self.policy.check_group(group) {
				Ok(()) => true,
				Err(skip) => {
					tracing::trace!(gid = group.gid, name = %group.name, reason = skip.as_str(), "ugid.snapshot.skip_group");
					false
				}
			})
			.collect();

		let named_users: Vec<(Arc<str>, UserId, GroupId)> = users
			.into_iter()
			.map(|u| (Arc::from(u.name), u.uid, u.primary_gid))
			.collect();
		let named_groups: Vec<(Arc<str>, GroupId)> = groups
			.into_iter()
			.map(|g| (Arc::from(g.name), g.gid))
			.collect();

		let by_uid = Index::from_entries_with(
			IdentityHash,
			named_users.iter().map(|(name, uid, gid)| {
				(
					*uid,
					UserEntry {
						name: name.clone(),
						primary_gid: *gid,
					},
				)
			}),
		)?;
		let by_user_name = Index::from_entries_with(
			StringHash,
			named_users
				.iter()
				.map(|(name, uid, gid)| (name.clone(), UidAndGid { uid: *uid, gid: *gid })),
		)?;
		let by_gid = Index::from_entries_with(IdentityHash, named_groups.iter().map(|(name, gid)| (*gid, name.clone())))?;
		let by_group_name = Index::from_entries_with(StringHash, named_groups.iter().map(|(name, gid)| (name.clone(), *gid)))?;

		let mut member_lists: FxHashMap<GroupId, Vec<UserId>> = FxHashMap::default();
		for (_, uid, gid) in &named_users {
			if by_gid.contains(gid) {
				member_lists.entry(*gid).or_default().push(*uid);
			}
		}
		for (gid, uids) in supplementary {
			if !by_gid.contains(&gid) {
				continue;
			}
			let list = member_lists.entry(gid).or_default();
			list.extend(uids.into_iter().filter(|uid| by_uid.contains(uid)));
		}
		let mut members = IndexBuilder::with_hasher(IdentityHash);
		for (gid, uids) in member_lists {
			members.insert(gid, IdSet::from_keys_with(IdentityHash, uids)?)?;
		}
		let members = members.build();

		let root_uids = self
			.policy
			.root_users
			.iter()
			.filter_map(|name| by_user_name.find(name.as_str()).map(|u| u.uid));
		let privileged = IdSet::from_keys_with(IdentityHash, privileged.into_iter().chain(root_uids))?;

		tracing::debug!(
			users = by_uid.len(),
			groups = by_gid.len(),
			memberships = members.len(),
			privileged = privileged.len(),
			"ugid.snapshot.build"
		);
		Ok(IdentitySnapshot {
			by_uid,
			by_gid,
			by_user_name,
			by_group_name,
			members,
			privileged,
			generation: 0,
		})
	}
}

/// Keeps the last record for each id, preserving input order of the survivors.
fn last_wins<T>(records: Vec<T>, id: impl Fn(&T) -> u32) -> Vec<T> {
	let mut last: FxHashMap<u32, usize> = FxHashMap::default();
	for (pos, record) in records.iter().enumerate() {
		last.insert(id(record), pos);
	}
	if last.len() == records.len() {
		return records;
	}
	records
		.into_iter()
		.enumerate()
		.filter(|(pos, record)| last.get(&id(record)) == Some(pos))
		.map(|(_, record)| record)
		.collect()
}
