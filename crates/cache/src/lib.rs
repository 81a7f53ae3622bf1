//! Concurrent, read-mostly user and group identity cache.
//!
//! # Purpose
//!
//! Translate numeric uids/gids carried in requests into names (and back) and answer
//! superuser and group-membership questions on hot paths, while the identity
//! source is re-read in the background.
//!
//! # Mental Model
//!
//! 1. **Read:** an [`IdentitySource`] returns the complete record set.
//! 2. **Build:** [`SnapshotBuilder`] filters the records through a [`BuildPolicy`]
//!    and produces an immutable [`IdentitySnapshot`] of six indices.
//! 3. **Publish:** [`SnapshotStore::publish`] swaps the snapshot in atomically and
//!    bumps the update counter.
//! 4. **Query:** [`UserAndGroup`] answers each call from whichever snapshot is
//!    current at that moment; [`NameView`] pins one for batch work.
//!
//! [`Refresher`] drives steps 1–3 on a timer and on request.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`IdentitySnapshot`] | One immutable generation of every index. |
//! | [`SnapshotStore`] | Atomic slot for the current snapshot plus the update counter. |
//! | [`Refresher`] | Background rebuild cycle with `start`/`shutdown`. |
//! | [`UserAndGroup`] | Sentinel-returning lookup façade. |
//! | [`NameView`] | Pinned name view that knows when it is stale. |
//! | [`CacheConfig`] | TOML configuration. |
//!
//! # Concurrency
//!
//! - **Reads:** wait-free snapshot loads; no reader ever waits on a rebuild.
//! - **Writes:** one publisher at a time; superseded snapshots are freed when their
//!   last reader drops them.
//!
//! # Invariants
//!
//! - A query observes exactly one snapshot.
//!   - Enforced in: [`SnapshotStore`] (single `ArcSwap` slot).
//!   - Tested by: `store::tests::test_readers_observe_coherent_snapshots`.
//! - The update counter grows by one per successful publish and never on failure.
//!   - Enforced in: [`SnapshotStore::publish`], [`Refresher`].
//!   - Tested by: `refresh::tests::test_failed_rebuild_keeps_previous_snapshot`.
//! - Duplicate ids resolve last-write-wins.
//!   - Enforced in: [`SnapshotBuilder::build`].
//!   - Tested by: `snapshot::tests::test_last_write_wins_for_duplicate_uid`.

pub mod config;
mod error;
mod query;
mod record;
mod refresh;
mod snapshot;
mod source;
mod store;
mod view;

pub use config::{CacheConfig, ConfigError};
pub use error::{LifecycleError, RefreshError};
pub use query::UserAndGroup;
pub use record::{
	GroupId, GroupRecord, NO_GROUP, NO_USER, ROOT_USER, SourceRecords, UidAndGid, UserEntry, UserId, UserRecord,
};
pub use refresh::{RefreshState, RefreshStats, Refresher};
pub use snapshot::{
	BuildError, BuildPolicy, GidMap, GroupMembersMap, GroupNameMap, IdentitySnapshot, MemberSet, PrivilegedSet,
	SnapshotBuilder, UidMap, UserNameMap,
};
pub use source::{FileSource, IdentitySource, SourceError, StaticSource};
pub use store::SnapshotStore;
pub use view::NameView;
