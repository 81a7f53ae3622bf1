use std::borrow::Borrow;
use std::fmt;

use crate::layout::Layout;
use crate::{IndexBuilder, IndexError, KeyHash};

pub(crate) struct Slot<K, V> {
	pub(crate) hash: u64,
	pub(crate) key: K,
	pub(crate) value: V,
}

#[inline]
pub(crate) fn probe<'a, K, V, Q>(chain: &'a [Slot<K, V>], hash: u64, key: &Q) -> Option<&'a Slot<K, V>>
where
	K: Borrow<Q>,
	Q: Eq + ?Sized,
{
	chain
		.iter()
		.find(|slot| slot.hash == hash && slot.key.borrow() == key)
}

/// Frozen key→value table with O(1) average lookup.
pub struct Index<K, V, H> {
	buckets: Box<[Box<[Slot<K, V>]>]>,
	layout: Layout,
	len: usize,
	hasher: H,
}

/// Shape of a built index, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
	pub len: usize,
	pub buckets: usize,
	pub longest_chain: usize,
}

impl<K, V, H: Default> Default for Index<K, V, H> {
	fn default() -> Self {
		IndexBuilder::default().build()
	}
}

impl<K, V, H> Index<K, V, H> {
	pub(crate) fn from_parts(buckets: Box<[Box<[Slot<K, V>]>]>, layout: Layout, len: usize, hasher: H) -> Self {
		Self {
			buckets,
			layout,
			len,
			hasher,
		}
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Iterates entries in bucket order. The order is unspecified.
	pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
		self.buckets
			.iter()
			.flat_map(|chain| chain.iter())
			.map(|slot| (&slot.key, &slot.value))
	}

	pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
		self.iter().map(|(k, _)| k)
	}

	pub fn stats(&self) -> IndexStats {
		IndexStats {
			len: self.len,
			buckets: self.buckets.len(),
			longest_chain: self.buckets.iter().map(|c| c.len()).max().unwrap_or(0),
		}
	}
}

impl<K: Eq, V, H: KeyHash<K>> Index<K, V, H> {
	/// Builds an index from `entries`; later duplicates replace earlier ones.
	pub fn from_entries_with<I>(hasher: H, entries: I) -> Result<Self, IndexError>
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut builder = IndexBuilder::with_hasher(hasher);
		for (key, value) in entries {
			builder.insert(key, value)?;
		}
		Ok(builder.build())
	}

	/// Builds an index from `entries` with the default hasher.
	pub fn from_entries<I>(entries: I) -> Result<Self, IndexError>
	where
		I: IntoIterator<Item = (K, V)>,
		H: Default,
	{
		Self::from_entries_with(H::default(), entries)
	}
}

impl<K, V, H> Index<K, V, H> {
	/// Looks up `key`. Never allocates.
	#[inline]
	pub fn find<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Eq + ?Sized,
		H: KeyHash<Q>,
	{
		let hash = self.hasher.hash_key(key);
		probe(&self.buckets[self.layout.bucket_of(hash)], hash, key).map(|slot| &slot.value)
	}

	#[inline]
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Eq + ?Sized,
		H: KeyHash<Q>,
	{
		self.find(key).is_some()
	}
}

impl<K, V, H> fmt::Debug for Index<K, V, H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stats = self.stats();
		f.debug_struct("Index")
			.field("len", &stats.len)
			.field("buckets", &stats.buckets)
			.field("longest_chain", &stats.longest_chain)
			.finish()
	}
}
