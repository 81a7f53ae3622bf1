use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use crate::{INITIAL_BUCKETS, IdSet, IdentityHash, Index, IndexBuilder, MAX_LOAD, StringHash};

type UidIndex = Index<u32, &'static str, IdentityHash>;
type NameIndex = Index<Arc<str>, u32, StringHash>;

#[test]
fn test_empty_index_finds_nothing() {
	let index = UidIndex::default();
	assert!(index.is_empty());
	assert_eq!(index.find(&0), None);
	assert_eq!(index.stats().buckets, INITIAL_BUCKETS);
}

/// A repeated key keeps the last value and hands the old one back to the builder.
#[test]
fn test_last_write_wins() {
	let mut builder = IndexBuilder::with_hasher(IdentityHash);
	assert_eq!(builder.insert(7u32, "alice").unwrap(), None);
	assert_eq!(builder.insert(7u32, "alice2").unwrap(), Some("alice"));
	assert_eq!(builder.find(&7), Some(&"alice2"));

	let index = builder.build();
	assert_eq!(index.len(), 1);
	assert_eq!(index.find(&7), Some(&"alice2"));
}

#[test]
fn test_string_keys_probe_by_str() {
	let index = NameIndex::from_entries([(Arc::from("root"), 0), (Arc::from("daemon"), 1), (Arc::from("bin"), 2)]).unwrap();
	assert_eq!(index.find("daemon"), Some(&1));
	assert_eq!(index.find("root"), Some(&0));
	assert!(!index.contains("nobody"));
}

/// Growth adds exactly one bucket per overflow, never doubling.
#[test]
fn test_buckets_grow_one_at_a_time() {
	for len in [0usize, 1, 16, 17, 18, 19, 100, 997, 5_000] {
		let stats = IdSet::<u32, IdentityHash>::from_keys(0..len as u32).unwrap().stats();
		assert_eq!(stats.len, len);
		assert_eq!(stats.buckets, INITIAL_BUCKETS.max(len.div_ceil(MAX_LOAD)), "after {len} inserts");
	}
}

#[test]
fn test_sequential_ids_keep_chains_short() {
	let index = Index::<u32, u32, IdentityHash>::from_entries((0..10_000).map(|uid| (uid, uid))).unwrap();
	let stats = index.stats();
	assert!(stats.longest_chain <= 2 * MAX_LOAD, "longest chain {}", stats.longest_chain);
	for uid in 0..10_000 {
		assert_eq!(index.find(&uid), Some(&uid));
	}
	assert_eq!(index.find(&10_000), None);
}

#[test]
fn test_id_set_membership() {
	let set = IdSet::<u32, IdentityHash>::from_keys([1, 2, 3, 2, 1]).unwrap();
	assert_eq!(set.len(), 3);
	assert!(set.contains(&2));
	assert!(!set.contains(&4));
	let mut members: Vec<_> = set.iter().copied().collect();
	members.sort_unstable();
	assert_eq!(members, vec![1, 2, 3]);
}

proptest! {
	/// The frozen index answers exactly like a std map fed the same entries in order.
	#[test]
	fn prop_matches_hashmap_model(entries in prop::collection::vec((0u32..512, any::<u16>()), 0..2_000), probes in prop::collection::vec(0u32..600, 0..64)) {
		let mut model = HashMap::new();
		for (k, v) in &entries {
			model.insert(*k, *v);
		}
		let index = Index::<u32, u16, IdentityHash>::from_entries(entries).unwrap();

		prop_assert_eq!(index.len(), model.len());
		for (k, v) in &model {
			prop_assert_eq!(index.find(k), Some(v));
		}
		for probe in probes {
			prop_assert_eq!(index.find(&probe), model.get(&probe));
		}
		prop_assert_eq!(index.iter().count(), model.len());
	}

	#[test]
	fn prop_string_keys_match_model(names in prop::collection::vec("[a-z]{1,8}", 0..400)) {
		let mut model = HashMap::new();
		for (i, name) in names.iter().enumerate() {
			model.insert(name.clone(), i);
		}
		let index = Index::<String, usize, StringHash>::from_entries(names.into_iter().enumerate().map(|(i, n)| (n, i))).unwrap();

		prop_assert_eq!(index.len(), model.len());
		for (name, i) in &model {
			prop_assert_eq!(index.find(name.as_str()), Some(i));
		}
	}
}
