use super::*;
use crate::{GroupRecord, SourceRecords, UserRecord};

fn build(records: SourceRecords) -> IdentitySnapshot {
	SnapshotBuilder::new(&BuildPolicy::default()).build(records).unwrap()
}

fn sample() -> SourceRecords {
	SourceRecords {
		users: vec![
			UserRecord::new(0, "root", 0),
			UserRecord::new(1, "alice", 100),
			UserRecord::new(2, "bob", 100),
			UserRecord::new(3, "carol", 100),
			UserRecord::new(4, "dave", 200),
		],
		groups: vec![
			GroupRecord::new(0, "root"),
			GroupRecord::new(100, "staff"),
			GroupRecord::new(200, "ops"),
			GroupRecord::new(300, "audit"),
		],
		privileged: vec![0],
		supplementary: vec![(300, vec![4, 99]), (200, vec![1]), (999, vec![2])],
	}
}

#[test]
fn test_empty_snapshot_resolves_nothing() {
	let snap = IdentitySnapshot::empty();
	assert_eq!(snap.user_name(999), None);
	assert_eq!(snap.group_name(0), None);
	assert!(!snap.is_group_member(0, 0));
	assert!(!snap.is_privileged(0));
	assert_eq!(snap.generation(), 0);
}

#[test]
fn test_last_write_wins_for_duplicate_uid() {
	let snap = build(SourceRecords {
		users: vec![UserRecord::new(7, "alice", 1), UserRecord::new(7, "alice2", 2)],
		..SourceRecords::default()
	});
	assert_eq!(snap.user_name(7), Some("alice2"));
	assert_eq!(snap.user(7).unwrap().primary_gid, 2);
	assert_eq!(snap.user_by_name("alice2"), Some(UidAndGid { uid: 7, gid: 2 }));
	// The superseded name must not resolve to the uid that dropped it.
	assert_eq!(snap.user_by_name("alice"), None);
}

#[test]
fn test_last_write_wins_for_duplicate_gid() {
	let snap = build(SourceRecords {
		groups: vec![GroupRecord::new(5, "old"), GroupRecord::new(6, "other"), GroupRecord::new(5, "new")],
		..SourceRecords::default()
	});
	assert_eq!(snap.group_name(5), Some("new"));
	assert_eq!(snap.group_id("new"), Some(5));
	assert_eq!(snap.group_id("old"), None);
	assert_eq!(snap.group_id("other"), Some(6));
}

/// Two uids sharing one name: the later record owns the name, and the inverse map
/// still points at a uid carrying that name.
#[test]
fn test_shared_name_resolves_to_later_record() {
	let snap = build(SourceRecords {
		users: vec![UserRecord::new(10, "svc", 1), UserRecord::new(11, "svc", 1)],
		..SourceRecords::default()
	});
	let owner = snap.user_by_name("svc").unwrap();
	assert_eq!(owner.uid, 11);
	assert_eq!(snap.user_name(owner.uid), Some("svc"));
}

#[test]
fn test_result_is_independent_of_input_order() {
	let forward = build(sample());
	let mut reversed = sample();
	reversed.users.reverse();
	reversed.groups.reverse();
	reversed.supplementary.reverse();
	let reversed = build(reversed);

	for uid in 0..5 {
		assert_eq!(forward.user(uid), reversed.user(uid));
		for gid in [0, 100, 200, 300] {
			assert_eq!(forward.is_group_member(uid, gid), reversed.is_group_member(uid, gid));
		}
	}
	assert_eq!(forward.group_members().len(), reversed.group_members().len());
}

#[test]
fn test_membership_from_primary_and_supplementary() {
	let snap = build(sample());
	assert!(snap.is_group_member(1, 100));
	assert!(snap.is_group_member(2, 100));
	assert!(snap.is_group_member(3, 100));
	assert!(!snap.is_group_member(4, 100));

	assert!(snap.is_group_member(1, 200), "supplementary member");
	assert!(snap.is_group_member(4, 300));
	// Unknown users and unknown groups are never members.
	assert!(!snap.is_group_member(99, 300));
	assert!(!snap.is_group_member(2, 999));
	assert!(snap.group_members().find(&999).is_none());
}

#[test]
fn test_name_maps_invert_id_maps() {
	let snap = build(sample());
	for (name, ids) in snap.user_name_map().iter() {
		assert_eq!(snap.user_name(ids.uid), Some(&**name));
	}
	for (name, gid) in snap.group_name_map().iter() {
		assert_eq!(snap.group_name(*gid), Some(&**name));
	}
	assert_eq!(snap.uid_map().len(), 5);
	assert_eq!(snap.gid_map().len(), 4);
}

#[test]
fn test_policy_filters_records() {
	let policy = BuildPolicy {
		uid_range: 1..=3,
		gid_range: 100..=200,
		omit_user_prefixes: vec!["car".into()],
		exclude_groups: ["ops".to_string()].into_iter().collect(),
		root_users: vec!["alice".into(), "nobody".into()],
		..BuildPolicy::default()
	};
	let snap = SnapshotBuilder::new(&policy).build(sample()).unwrap();

	assert_eq!(snap.user_name(0), None, "below uid range");
	assert_eq!(snap.user_name(4), None, "above uid range");
	assert_eq!(snap.user_name(3), None, "omitted prefix");
	assert_eq!(snap.user_name(1), Some("alice"));
	assert_eq!(snap.group_name(200), None, "excluded group");
	assert_eq!(snap.group_name(100), Some("staff"));

	assert!(snap.is_privileged(0), "source privilege survives uid filtering");
	assert!(snap.is_privileged(1), "configured root user");
	assert!(!snap.is_privileged(2));
	assert!(!snap.is_group_member(1, 200));
}

/// A filtered final record hides the id instead of reviving the one it replaced.
#[test]
fn test_filtered_last_duplicate_does_not_revive_older_record() {
	let policy = BuildPolicy {
		omit_user_prefixes: vec!["svc-".into()],
		exclude_groups: ["legacy".to_string()].into_iter().collect(),
		..BuildPolicy::default()
	};
	let snap = SnapshotBuilder::new(&policy)
		.build(SourceRecords {
			users: vec![UserRecord::new(7, "alice", 100), UserRecord::new(7, "svc-alice", 100)],
			groups: vec![GroupRecord::new(100, "staff"), GroupRecord::new(100, "legacy")],
			..SourceRecords::default()
		})
		.unwrap();

	assert_eq!(snap.user_name(7), None);
	assert_eq!(snap.user_by_name("alice"), None);
	assert_eq!(snap.group_name(100), None);
	assert_eq!(snap.group_id("staff"), None);
	assert!(!snap.is_group_member(7, 100));
}

#[test]
fn test_sentinel_and_nameless_records_are_dropped() {
	let snap = build(SourceRecords {
		users: vec![UserRecord::new(crate::NO_USER, "ghost", 1), UserRecord::new(5, "", 1)],
		groups: vec![GroupRecord::new(crate::NO_GROUP, "ghosts")],
		..SourceRecords::default()
	});
	assert!(snap.uid_map().is_empty());
	assert!(snap.gid_map().is_empty());
	assert_eq!(snap.user_by_name("ghost"), None);
}
