//! Immutable associative index used for identity lookups.
//!
//! # Purpose
//!
//! Provide O(1)-average key→value lookup over a table that is built once and then
//! frozen. The table is a linear hash: buckets are added one at a time as the load
//! grows instead of doubling, which keeps the cost of any single insert during a
//! build bounded.
//!
//! # Mental Model
//!
//! 1. **Build Phase:** [`IndexBuilder`] accepts entries; a repeated key replaces the
//!    previous value (last write wins) and the old value is handed back.
//! 2. **Freeze:** [`IndexBuilder::build`] produces an [`Index`], which has no mutating
//!    methods at all.
//! 3. **Lookup:** [`Index::find`] hashes the probe with the [`KeyHash`] strategy chosen
//!    at construction and walks a single bucket chain.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Index`] | Frozen key→value table. |
//! | [`IndexBuilder`] | Mutable construction phase. |
//! | [`IdSet`] | Frozen key set (`Index<K, ()>`). |
//! | [`KeyHash`] | Hash strategy value ([`IdentityHash`], [`StringHash`]). |
//!
//! # Invariants
//!
//! - A key appears in at most one slot of a built index.
//! - Every slot lives in the bucket its stored hash addresses under the final layout.
//! - Lookups never allocate and never mutate.

mod builder;
mod error;
mod hash;
mod layout;
mod set;
mod table;

pub use builder::IndexBuilder;
pub use error::IndexError;
pub use hash::{IdentityHash, KeyHash, StringHash};
pub use set::IdSet;
pub use table::{Index, IndexStats};

/// Average chain length that triggers a bucket split.
pub const MAX_LOAD: usize = 2;

/// Bucket count of an empty index. Must be a power of two.
pub const INITIAL_BUCKETS: usize = 8;

#[cfg(test)]
mod tests;
