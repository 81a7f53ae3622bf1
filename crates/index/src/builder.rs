use std::borrow::Borrow;

use crate::layout::Layout;
use crate::table::{Index, Slot, probe};
use crate::{INITIAL_BUCKETS, IndexError, KeyHash, MAX_LOAD};

/// Construction phase of an [`Index`].
///
/// Entries are chained per bucket. Whenever the average chain exceeds
/// [`MAX_LOAD`], exactly one bucket is split, so growth never rehashes the whole
/// table at once.
pub struct IndexBuilder<K, V, H> {
	buckets: Vec<Vec<Slot<K, V>>>,
	layout: Layout,
	len: usize,
	hasher: H,
}

impl<K, V, H: Default> Default for IndexBuilder<K, V, H> {
	fn default() -> Self {
		Self::with_hasher(H::default())
	}
}

impl<K, V, H> IndexBuilder<K, V, H> {
	/// Creates an empty builder using `hasher` for every key.
	pub fn with_hasher(hasher: H) -> Self {
		let mut buckets = Vec::with_capacity(INITIAL_BUCKETS);
		buckets.resize_with(INITIAL_BUCKETS, Vec::new);
		Self {
			buckets,
			layout: Layout::new(),
			len: 0,
			hasher,
		}
	}

	/// Number of distinct keys inserted so far.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Freezes the builder. Chains are shrunk to their exact length.
	pub fn build(self) -> Index<K, V, H> {
		debug_assert_eq!(self.buckets.len(), self.layout.bucket_count());
		let buckets = self
			.buckets
			.into_iter()
			.map(Vec::into_boxed_slice)
			.collect();
		Index::from_parts(buckets, self.layout, self.len, self.hasher)
	}
}

impl<K: Eq, V, H: KeyHash<K>> IndexBuilder<K, V, H> {
	/// Inserts `value` under `key`, returning the value it replaced.
	pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, IndexError> {
		let hash = self.hasher.hash_key(&key);
		let bucket = self.layout.bucket_of(hash);
		let entries = self.len;
		let chain = &mut self.buckets[bucket];
		if let Some(slot) = chain.iter_mut().find(|slot| slot.hash == hash && slot.key == key) {
			return Ok(Some(std::mem::replace(&mut slot.value, value)));
		}
		chain
			.try_reserve(1)
			.map_err(|e| IndexError::exhausted(entries + 1, e))?;
		chain.push(Slot { hash, key, value });
		self.len += 1;

		if self.len > self.buckets.len() * MAX_LOAD {
			self.split_one()?;
		}
		Ok(None)
	}

	/// Looks up a key inserted earlier in this build.
	pub fn find<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Eq + ?Sized,
		H: KeyHash<Q>,
	{
		let hash = self.hasher.hash_key(key);
		probe(&self.buckets[self.layout.bucket_of(hash)], hash, key).map(|slot| &slot.value)
	}

	fn split_one(&mut self) -> Result<(), IndexError> {
		let entries = self.len;
		self.buckets
			.try_reserve(1)
			.map_err(|e| IndexError::exhausted(entries, e))?;
		self.buckets.push(Vec::new());
		let victim = self.layout.advance();
		let sibling = self.buckets.len() - 1;

		let chain = std::mem::take(&mut self.buckets[victim]);
		for slot in chain {
			let target = self.layout.bucket_of(slot.hash);
			debug_assert!(target == victim || target == sibling);
			let dest = &mut self.buckets[target];
			dest.try_reserve(1)
				.map_err(|e| IndexError::exhausted(entries, e))?;
			dest.push(slot);
		}
		Ok(())
	}
}
