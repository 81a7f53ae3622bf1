use std::borrow::Borrow;
use std::fmt;

use crate::{Index, IndexError, IndexStats, KeyHash};

/// Frozen set of keys backed by an [`Index`] with unit values.
pub struct IdSet<K, H> {
	inner: Index<K, (), H>,
}

impl<K, H: Default> Default for IdSet<K, H> {
	fn default() -> Self {
		Self { inner: Index::default() }
	}
}

impl<K: Eq, H: KeyHash<K>> IdSet<K, H> {
	/// Builds a set from `keys`; duplicates collapse.
	pub fn from_keys_with<I>(hasher: H, keys: I) -> Result<Self, IndexError>
	where
		I: IntoIterator<Item = K>,
	{
		let inner = Index::from_entries_with(hasher, keys.into_iter().map(|k| (k, ())))?;
		Ok(Self { inner })
	}

	pub fn from_keys<I>(keys: I) -> Result<Self, IndexError>
	where
		I: IntoIterator<Item = K>,
		H: Default,
	{
		Self::from_keys_with(H::default(), keys)
	}
}

impl<K, H> IdSet<K, H> {
	#[inline]
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Eq + ?Sized,
		H: KeyHash<Q>,
	{
		self.inner.contains(key)
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
		self.inner.keys()
	}

	pub fn stats(&self) -> IndexStats {
		self.inner.stats()
	}
}

impl<K, H> fmt::Debug for IdSet<K, H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IdSet").field("len", &self.len()).finish()
	}
}
