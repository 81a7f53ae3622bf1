//! The single swappable slot holding the current snapshot.
//!
//! # Concurrency
//!
//! - **Reads:** wait-free `ArcSwap` load; a reader keeps whatever snapshot it loaded
//!   for as long as it holds the `Arc`, regardless of later publishes.
//! - **Writes:** serialized by a publish lock that readers never touch.
//!
//! # Invariants
//!
//! - The update counter equals the generation of the last published snapshot and
//!   only grows.
//! - The counter is advanced after the swap, so an observer that sees count `n`
//!   can load a snapshot of generation `>= n`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;

use crate::IdentitySnapshot;

/// Holder of the currently published [`IdentitySnapshot`].
pub struct SnapshotStore {
	current: ArcSwap<IdentitySnapshot>,
	update_count: AtomicU64,
	publish_lock: Mutex<()>,
}

impl Default for SnapshotStore {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for SnapshotStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SnapshotStore")
			.field("update_count", &self.update_count())
			.finish_non_exhaustive()
	}
}

impl SnapshotStore {
	/// Creates a store serving an empty, generation-0 snapshot.
	pub fn new() -> Self {
		Self {
			current: ArcSwap::from_pointee(IdentitySnapshot::empty()),
			update_count: AtomicU64::new(0),
			publish_lock: Mutex::new(()),
		}
	}

	/// Makes `snapshot` current and returns the generation it was published under.
	///
	/// Readers holding the previous snapshot keep it; it is freed when the last of
	/// them lets go.
	pub fn publish(&self, mut snapshot: IdentitySnapshot) -> u64 {
		let _guard = self.publish_lock.lock();
		let generation = self.update_count.load(Ordering::Acquire) + 1;
		snapshot.generation = generation;
		self.current.store(Arc::new(snapshot));
		self.update_count.store(generation, Ordering::Release);
		tracing::debug!(generation, "ugid.store.publish");
		generation
	}

	/// Returns the latest published snapshot.
	#[inline]
	pub fn current(&self) -> Arc<IdentitySnapshot> {
		self.current.load_full()
	}

	/// Borrows the latest published snapshot without touching its refcount.
	///
	/// Meant for short lookups; hold [`Self::current`] instead when the snapshot
	/// must outlive the call.
	#[inline]
	pub fn load(&self) -> Guard<Arc<IdentitySnapshot>> {
		self.current.load()
	}

	/// Number of successful publishes so far.
	#[inline]
	pub fn update_count(&self) -> u64 {
		self.update_count.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;
	use std::thread;

	use super::*;
	use crate::{BuildPolicy, GroupRecord, SnapshotBuilder, SourceRecords, UserRecord};

	/// Generation `n` maps uid `u` to `"u{u}-g{n}"` and group `u` to the same suffix.
	fn generation_snapshot(n: u32) -> IdentitySnapshot {
		let records = SourceRecords {
			users: (0..32).map(|u| UserRecord::new(u, format!("u{u}-g{n}"), u)).collect(),
			groups: (0..32).map(|g| GroupRecord::new(g, format!("g{g}-g{n}"))).collect(),
			..SourceRecords::default()
		};
		SnapshotBuilder::new(&BuildPolicy::default()).build(records).unwrap()
	}

	#[test]
	fn test_publish_advances_counter_and_stamps_generation() {
		let store = SnapshotStore::new();
		assert_eq!(store.update_count(), 0);
		assert_eq!(store.current().generation(), 0);

		assert_eq!(store.publish(generation_snapshot(1)), 1);
		assert_eq!(store.publish(generation_snapshot(2)), 2);
		assert_eq!(store.update_count(), 2);
		assert_eq!(store.current().generation(), 2);
		assert_eq!(store.load().user_name(3), Some("u3-g2"));
	}

	/// A reader holding a snapshot across a publish keeps seeing the old one.
	#[test]
	fn test_held_snapshot_survives_publish() {
		let store = SnapshotStore::new();
		store.publish(generation_snapshot(1));
		let held = store.current();

		store.publish(generation_snapshot(2));
		assert_eq!(held.user_name(5), Some("u5-g1"));
		assert_eq!(held.group_name(5), Some("g5-g1"));
		assert_eq!(store.current().user_name(5), Some("u5-g2"));

		let weak = Arc::downgrade(&held);
		drop(held);
		assert!(weak.upgrade().is_none(), "superseded snapshot freed after last reader");
	}

	/// Readers racing a publisher never see collections from two generations.
	#[test]
	fn test_readers_observe_coherent_snapshots() {
		let store = Arc::new(SnapshotStore::new());
		store.publish(generation_snapshot(0));
		let done = Arc::new(AtomicBool::new(false));

		let readers: Vec<_> = (0..4)
			.map(|_| {
				let store = Arc::clone(&store);
				let done = Arc::clone(&done);
				thread::spawn(move || {
					let mut last_generation = 0;
					while !done.load(Ordering::Acquire) {
						let snap = store.current();
						assert!(snap.generation() >= last_generation, "generation went backwards");
						last_generation = snap.generation();
						for id in [0u32, 7, 31] {
							let user = snap.user_name(id).unwrap();
							let group = snap.group_name(id).unwrap();
							let user_gen = user.rsplit('-').next().unwrap();
							let group_gen = group.rsplit('-').next().unwrap();
							assert_eq!(user_gen, group_gen, "torn read: {user} / {group}");
							let by_name = snap.user_by_name(user).unwrap();
							assert_eq!(by_name.uid, id);
						}
					}
				})
			})
			.collect();

		for n in 1..200 {
			store.publish(generation_snapshot(n));
		}
		done.store(true, Ordering::Release);
		for reader in readers {
			reader.join().unwrap();
		}
		assert_eq!(store.update_count(), 200);
	}
}
