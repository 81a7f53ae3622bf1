//! Hash strategies selected per index at construction time.

use std::hash::Hasher;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHasher;

/// Maps a key to the 64-bit hash used for bucket addressing.
///
/// Implementations for an owned key type and its borrowed form must agree, since
/// entries are hashed through `K` at build time and probes through `Q` at lookup.
pub trait KeyHash<Q: ?Sized> {
	fn hash_key(&self, key: &Q) -> u64;
}

/// Uses an integer key as its own hash.
///
/// Numeric ids are dense and roughly sequential, so the low bits already spread
/// evenly across buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityHash;

macro_rules! identity_hash {
	($($ty:ty),* $(,)?) => {
		$(
			impl KeyHash<$ty> for IdentityHash {
				#[inline]
				fn hash_key(&self, key: &$ty) -> u64 {
					*key as u64
				}
			}
		)*
	};
}

identity_hash!(u8, u16, u32, u64, usize);

/// Fast general-purpose hash for string keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringHash;

impl KeyHash<str> for StringHash {
	#[inline]
	fn hash_key(&self, key: &str) -> u64 {
		let mut hasher = FxHasher::default();
		hasher.write(key.as_bytes());
		hasher.write_u8(0xff);
		hasher.finish()
	}
}

macro_rules! string_hash_via_str {
	($($ty:ty),* $(,)?) => {
		$(
			impl KeyHash<$ty> for StringHash {
				#[inline]
				fn hash_key(&self, key: &$ty) -> u64 {
					<Self as KeyHash<str>>::hash_key(self, key)
				}
			}
		)*
	};
}

string_hash_via_str!(String, Box<str>, Arc<str>, Rc<str>);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn owned_and_borrowed_strings_hash_alike() {
		let h = StringHash;
		let owned = String::from("daemon");
		let shared: Arc<str> = Arc::from("daemon");
		assert_eq!(h.hash_key(owned.as_str()), h.hash_key(&owned));
		assert_eq!(h.hash_key("daemon"), h.hash_key(&shared));
		assert_ne!(h.hash_key("daemon"), h.hash_key("daemons"));
	}

	#[test]
	fn identity_hash_is_the_key() {
		assert_eq!(IdentityHash.hash_key(&42u32), 42);
		assert_eq!(IdentityHash.hash_key(&u32::MAX), u32::MAX as u64);
	}
}
