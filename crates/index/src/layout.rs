use crate::INITIAL_BUCKETS;

/// Linear hashing address state.
///
/// The table holds `(INITIAL_BUCKETS << level) + split` buckets. Buckets below
/// `split` have already been split in the current round and are addressed with one
/// more hash bit than the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
	level: u32,
	split: usize,
}

impl Layout {
	pub(crate) const fn new() -> Self {
		Self { level: 0, split: 0 }
	}

	/// Bucket count at the start of the current round.
	#[inline]
	fn round_base(self) -> usize {
		INITIAL_BUCKETS << self.level
	}

	#[inline]
	pub(crate) fn bucket_count(self) -> usize {
		self.round_base() + self.split
	}

	#[inline]
	pub(crate) fn bucket_of(self, hash: u64) -> usize {
		let base = self.round_base();
		let idx = (hash as usize) & (base - 1);
		if idx < self.split {
			(hash as usize) & ((base << 1) - 1)
		} else {
			idx
		}
	}

	/// Returns the bucket to split next and advances to the post-split layout.
	pub(crate) fn advance(&mut self) -> usize {
		let victim = self.split;
		self.split += 1;
		if self.split == self.round_base() {
			self.level += 1;
			self.split = 0;
		}
		victim
	}
}
