//! # Separate Chaining Hash Table
//!
//! String-keyed hash table resolving collisions with **separate chaining**: each bucket holds a
//! small vector of `(key, value)` entries. It is the baseline the open addressing table is
//! measured against, so it carries the same instrumentation:
//! - a cumulative `collisions` counter, bumped whenever an insert lands in a non-empty bucket
//!   (rehash reinsertions included),
//! - growth to `capacity * 2 + 1` buckets once the load factor goes *above* the threshold, checked
//!   after each insert.

use log::debug;

use super::open_addressing::{HashFn, DEFAULT_INITIAL_CAPACITY, MIN_CAPACITY};
use super::string_hash::{djb2, StringHasher};
use crate::cs::error::{Error, Result};

/// Default maximum load factor before resizing.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// A single entry in a chain.
#[derive(Debug, Clone)]
struct Entry<V> {
    key: String,
    value: V,
}

/// A "bucket" is a vector of entries for separate chaining.
type Bucket<V> = Vec<Entry<V>>;

fn empty_buckets<V>(count: usize) -> Vec<Bucket<V>> {
    std::iter::repeat_with(Vec::new).take(count).collect()
}

/// A separate-chaining hash table with string keys and a pluggable hash function.
#[derive(Debug, Clone)]
pub struct ChainingTable<V, H = HashFn> {
    buckets: Vec<Bucket<V>>,
    /// The number of stored key-value pairs.
    size: usize,
    collisions: usize,
    /// The maximum load factor (ratio = size / bucket count).
    max_load_factor: f64,
    hash: H,
}

impl<V> ChainingTable<V> {
    /// Creates a table with `capacity` buckets (at least 3).
    ///
    /// Fails with [`Error::InvalidLoadFactor`] unless `max_load_factor > 0`.
    pub fn new(capacity: usize, hash: HashFn, max_load_factor: f64) -> Result<Self> {
        Self::with_hash(capacity, hash, max_load_factor)
    }
}

impl<V> Default for ChainingTable<V> {
    fn default() -> Self {
        Self::assemble(DEFAULT_INITIAL_CAPACITY, djb2, DEFAULT_MAX_LOAD_FACTOR)
    }
}

impl<V, H: StringHasher> ChainingTable<V, H> {
    /// Creates a table using any [`StringHasher`], closures included.
    pub fn with_hash(capacity: usize, hash: H, max_load_factor: f64) -> Result<Self> {
        // Chains never fill up, so only the lower bound matters here.
        if !(max_load_factor > 0.0 && max_load_factor.is_finite()) {
            return Err(Error::InvalidLoadFactor(max_load_factor));
        }
        Ok(Self::assemble(capacity, hash, max_load_factor))
    }

    fn assemble(capacity: usize, hash: H, max_load_factor: f64) -> Self {
        Self {
            buckets: empty_buckets(capacity.max(MIN_CAPACITY)),
            size: 0,
            collisions: 0,
            max_load_factor,
            hash,
        }
    }

    /// Returns the number of key-value pairs in the table.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// `size / capacity`, computed on demand.
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Inserts that landed in a non-empty bucket, rehash reinsertions included.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Inserts a key-value pair into the table.
    /// If the key already exists, its value is replaced and the old value returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let idx = self.bucket_index(&key);
        let bucket = &mut self.buckets[idx];
        if !bucket.is_empty() {
            self.collisions += 1;
        }

        if let Some(entry) = bucket.iter_mut().find(|entry| entry.key == key) {
            return Some(std::mem::replace(&mut entry.value, value));
        }
        bucket.push(Entry { key, value });
        self.size += 1;

        if self.load_factor() > self.max_load_factor {
            self.rehash(self.capacity() * 2 + 1);
        }
        None
    }

    /// Returns a reference to the value corresponding to the key, if present.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes the key. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let idx = self.bucket_index(key);
        let bucket = &mut self.buckets[idx];
        match bucket.iter().position(|entry| entry.key == key) {
            Some(pos) => {
                bucket.remove(pos);
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Returns an iterator over the key-value pairs in the table.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets.iter().flat_map(|bucket| {
            bucket
                .iter()
                .map(|entry| (entry.key.as_str(), &entry.value))
        })
    }

    /// Rebuilds the table with `new_capacity` buckets (at least 3). Collisions met while
    /// re-inserting are added to the running count.
    pub fn rehash(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        debug!(
            "rehashing chaining table: {} -> {new_capacity} buckets",
            self.capacity()
        );
        let old = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        self.size = 0;
        for entry in old.into_iter().flatten() {
            self.insert(entry.key, entry.value);
        }
    }

    fn bucket_index(&self, key: &str) -> usize {
        (self.hash.hash_str(key) % self.capacity() as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::hashing::string_hash::simple_hash;

    #[test]
    fn basic_insert_get_remove() {
        let mut t = ChainingTable::new(7, simple_hash, DEFAULT_MAX_LOAD_FACTOR).unwrap();
        assert!(t.is_empty());

        assert_eq!(t.insert("a", 1), None);
        assert_eq!(t.insert("b", 2), None);
        assert_eq!(t.size(), 2);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("b"), Some(&2));
        assert!(t.contains("a"));

        assert!(t.remove("a"));
        assert!(!t.contains("a"));
        assert!(!t.remove("a"));
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn overwrite() {
        let mut t: ChainingTable<i32> = ChainingTable::default();
        t.insert("k", 1);
        assert_eq!(t.insert("k", 2), Some(1));
        assert_eq!(t.get("k"), Some(&2));
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn counts_collisions_in_shared_bucket() {
        let mut t = ChainingTable::new(7, simple_hash, DEFAULT_MAX_LOAD_FACTOR).unwrap();
        // 97, 104, 111 are all 6 mod 7
        t.insert("a", 1);
        assert_eq!(t.collisions(), 0);
        t.insert("h", 2);
        t.insert("o", 3);
        assert_eq!(t.collisions(), 2);
        // an update in a non-empty bucket still counts
        t.insert("h", 20);
        assert_eq!(t.collisions(), 3);
        assert_eq!(t.get("o"), Some(&3));
    }

    #[test]
    fn reinsertion_collisions_add_to_the_count() {
        let mut t = ChainingTable::new(7, simple_hash, 0.25).unwrap();
        // 97 and 202 share bucket 6 of 7 and bucket 7 of 15
        t.insert("a", 1);
        t.insert("\u{ca}", 2);
        // 2 / 7 > 0.25 grew the table right after the second insert: one collision before
        // the rehash, one more while re-inserting
        assert_eq!(t.capacity(), 15);
        assert_eq!(t.collisions(), 2);

        t.rehash(15);
        assert_eq!(t.collisions(), 3);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("\u{ca}"), Some(&2));
    }

    #[test]
    fn grows_after_passing_threshold() {
        let mut t = ChainingTable::new(3, djb2, 0.75).unwrap();
        t.insert("x", 0);
        t.insert("y", 1);
        assert_eq!(t.capacity(), 3);
        // 3 / 3 > 0.75
        t.insert("z", 2);
        assert_eq!(t.capacity(), 7);
        for (i, key) in ["x", "y", "z"].into_iter().enumerate() {
            assert_eq!(t.get(key), Some(&i));
        }
    }

    #[test]
    fn many_keys_survive_resizes() {
        let mut t = ChainingTable::with_hash(3, |s: &str| djb2(s) >> 3, 0.75).unwrap();
        for i in 0..500 {
            t.insert(format!("key{i}"), i);
        }
        assert_eq!(t.size(), 500);
        assert!(t.load_factor() <= 0.75);
        assert_eq!(t.iter().count(), 500);
        for i in 0..500 {
            assert_eq!(t.get(&format!("key{i}")), Some(&i));
        }
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert!(matches!(
            ChainingTable::<i32>::new(7, djb2, 0.0),
            Err(Error::InvalidLoadFactor(_))
        ));
    }
}
