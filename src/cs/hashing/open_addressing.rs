//! # Open Addressing Hash Table
//!
//! This module provides a string-keyed hash table using *open addressing*: every entry lives
//! directly in a single slot array and collisions are resolved by probing other slots.
//!
//! ## Key Features
//! - **Pluggable hashing**: any [`StringHasher`] (including plain `fn(&str) -> u64` and closures)
//!   can serve as the primary hash, and optionally as a second hash for double hashing.
//! - **Configurable probing** via [`ProbingMode`]: linear (`h1 + i`) or double hashing
//!   (`h1 + i * step`).
//! - **Tombstones**: removal leaves a tombstone so later probes keep walking past it; the first
//!   tombstone on a probe path is reused by the next insertion that does not find its key.
//! - **Automatic growth**: before each insert, if `size / capacity >= load_factor_threshold`, the
//!   table is rebuilt with `capacity * 2 + 1` slots.
//! - **Instrumentation**: a cumulative `collisions` counter (never reset, not even by rehashing)
//!   and a `rehashes` counter, for benchmarking different hash functions and probing modes.
//!
//! Requested capacities below 3 are clamped to 3 rather than rejected, so that small tables used
//! in tests always behave the same way.
//!
//! **Note**: the table is single-threaded; mutation needs `&mut self`, so share it behind a lock
//! if several threads must write to it.

use std::fmt;
use std::str::FromStr;

use log::debug;

use super::string_hash::{djb2, StringHasher};
use crate::cs::error::{Error, Result};

/// Default initial capacity if unspecified.
pub const DEFAULT_INITIAL_CAPACITY: usize = 53;
/// Default load factor at which the table grows.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.6;
/// Smallest capacity a table can have.
pub const MIN_CAPACITY: usize = 3;

/// Plain function pointer hash, the default hasher type of the tables.
pub type HashFn = fn(&str) -> u64;

/// A slot can be `Empty`, `Tombstone` (used to be occupied but removed), or `Occupied(key, value)`.
#[derive(Debug, Clone)]
enum Slot<V> {
    Empty,
    Tombstone,
    Occupied(String, V),
}

fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    std::iter::repeat_with(|| Slot::Empty)
        .take(capacity)
        .collect()
}

/// The strategy used for collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbingMode {
    /// Linear probing: `(h1 + i) mod capacity`
    #[default]
    Linear,
    /// Double hashing: `(h1 + i * step) mod capacity`, with `step` derived from a second hash.
    Double,
}

impl FromStr for ProbingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(ProbingMode::Linear),
            "double" => Ok(ProbingMode::Double),
            other => Err(Error::InvalidProbingMode(other.to_string())),
        }
    }
}

impl fmt::Display for ProbingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbingMode::Linear => f.write_str("linear"),
            ProbingMode::Double => f.write_str("double"),
        }
    }
}

/// The bounded sequence of slot indices visited for one key.
///
/// Yields `(start + i * step) mod capacity` for `i` in `0..capacity`, then stops. With a step
/// coprime to `capacity` every slot is visited exactly once.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    current: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl ProbeSequence {
    fn new(start: usize, step: usize, capacity: usize) -> Self {
        Self {
            current: start,
            step,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let idx = self.current;
        self.current = (self.current + self.step) % self.capacity;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Reduces a raw second hash to a usable step: non-zero and coprime with `capacity`.
fn double_hash_step(raw: u64, capacity: usize) -> usize {
    let mut step = (raw % capacity as u64) as usize;
    if step == 0 {
        step = 1;
    }
    // capacity - 1 is always coprime with capacity, so this stops below capacity
    while gcd(step, capacity) != 1 {
        step += 1;
    }
    step
}

fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(threshold)
    } else {
        Err(Error::InvalidLoadFactor(threshold))
    }
}

/// A builder for [`OpenAddressingTable`], allowing you to specify capacity, load factor threshold,
/// probing mode and hash functions.
///
/// ```
/// use labhash::hashing::{simple_hash, OpenAddressingBuilder, ProbingMode};
///
/// let mut table = OpenAddressingBuilder::new()
///     .with_capacity(7)
///     .with_hash(simple_hash)
///     .with_mode(ProbingMode::Double)
///     .build::<i32>()
///     .unwrap();
/// table.insert("a", 1);
/// assert_eq!(table.get("a"), Some(&1));
/// ```
#[derive(Debug, Clone)]
pub struct OpenAddressingBuilder<H = HashFn, G = HashFn> {
    capacity: usize,
    mode: ProbingMode,
    load_factor_threshold: f64,
    hash: H,
    second_hash: Option<G>,
}

impl Default for OpenAddressingBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INITIAL_CAPACITY,
            mode: ProbingMode::Linear,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            hash: djb2,
            second_hash: None,
        }
    }
}

impl OpenAddressingBuilder {
    /// Create a new builder with default parameters and the `djb2` hash.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: StringHasher, G: StringHasher> OpenAddressingBuilder<H, G> {
    /// Sets the initial capacity (clamped to at least 3 when building).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the probing mode.
    pub fn with_mode(mut self, mode: ProbingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the load factor threshold. Checked when building; must be in (0, 1).
    pub fn with_load_factor_threshold(mut self, threshold: f64) -> Self {
        self.load_factor_threshold = threshold;
        self
    }

    /// Replaces the primary hash function.
    pub fn with_hash<H2: StringHasher>(self, hash: H2) -> OpenAddressingBuilder<H2, G> {
        OpenAddressingBuilder {
            capacity: self.capacity,
            mode: self.mode,
            load_factor_threshold: self.load_factor_threshold,
            hash,
            second_hash: self.second_hash,
        }
    }

    /// Sets the second hash used for the double hashing step. Without one, the step is derived
    /// from the primary hash as `1 + h(key) % (capacity - 1)`.
    pub fn with_second_hash<G2: StringHasher>(self, second: G2) -> OpenAddressingBuilder<H, G2> {
        OpenAddressingBuilder {
            capacity: self.capacity,
            mode: self.mode,
            load_factor_threshold: self.load_factor_threshold,
            hash: self.hash,
            second_hash: Some(second),
        }
    }

    /// Finalize building the table.
    pub fn build<V>(self) -> Result<OpenAddressingTable<V, H, G>> {
        OpenAddressingTable::from_parts(
            self.capacity,
            self.hash,
            self.second_hash,
            self.mode,
            self.load_factor_threshold,
        )
    }
}

/// The open addressing hash table, mapping string keys to values of type `V`.
pub struct OpenAddressingTable<V, H = HashFn, G = HashFn> {
    slots: Vec<Slot<V>>,
    size: usize,
    collisions: usize,
    rehashes: usize,

    mode: ProbingMode,
    hash: H,
    second_hash: Option<G>,

    load_factor_threshold: f64,
}

impl<V> OpenAddressingTable<V> {
    /// Creates a table with `capacity` slots (at least 3).
    ///
    /// Fails with [`Error::InvalidLoadFactor`] if `load_factor_threshold` is not in (0, 1).
    pub fn new(
        capacity: usize,
        hash: HashFn,
        second_hash: Option<HashFn>,
        mode: ProbingMode,
        load_factor_threshold: f64,
    ) -> Result<Self> {
        Self::from_parts(capacity, hash, second_hash, mode, load_factor_threshold)
    }
}

impl<V> Default for OpenAddressingTable<V> {
    fn default() -> Self {
        Self::assemble(
            DEFAULT_INITIAL_CAPACITY,
            djb2,
            None,
            ProbingMode::Linear,
            DEFAULT_LOAD_FACTOR_THRESHOLD,
        )
    }
}

impl<V, H: StringHasher, G: StringHasher> OpenAddressingTable<V, H, G> {
    fn from_parts(
        capacity: usize,
        hash: H,
        second_hash: Option<G>,
        mode: ProbingMode,
        load_factor_threshold: f64,
    ) -> Result<Self> {
        let load_factor_threshold = validate_threshold(load_factor_threshold)?;
        Ok(Self::assemble(
            capacity,
            hash,
            second_hash,
            mode,
            load_factor_threshold,
        ))
    }

    /// Builds an empty table from an already validated threshold.
    fn assemble(
        capacity: usize,
        hash: H,
        second_hash: Option<G>,
        mode: ProbingMode,
        load_factor_threshold: f64,
    ) -> Self {
        if capacity < MIN_CAPACITY {
            debug!("requested capacity {capacity} clamped to {MIN_CAPACITY}");
        }
        Self {
            slots: empty_slots(capacity.max(MIN_CAPACITY)),
            size: 0,
            collisions: 0,
            rehashes: 0,
            mode,
            hash,
            second_hash,
            load_factor_threshold,
        }
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `size / capacity`, computed on demand.
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Total collisions seen over the table's lifetime, rehash reinsertions included.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Number of rehashes performed so far.
    pub fn rehashes(&self) -> usize {
        self.rehashes
    }

    /// The probing mode chosen at construction.
    pub fn mode(&self) -> ProbingMode {
        self.mode
    }

    /// Load factor at which the next insert grows the table.
    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor_threshold
    }

    /// Returns the probe sequence for `key` against the current capacity.
    pub fn probe_sequence(&self, key: &str) -> ProbeSequence {
        let capacity = self.capacity();
        let primary = self.hash.hash_str(key);
        let start = (primary % capacity as u64) as usize;
        let step = match self.mode {
            ProbingMode::Linear => 1,
            ProbingMode::Double => {
                let raw = match &self.second_hash {
                    Some(second) => second.hash_str(key),
                    None => 1 + primary % (capacity as u64 - 1),
                };
                double_hash_step(raw, capacity)
            }
        };
        ProbeSequence::new(start, step, capacity)
    }

    /// Insert a key-value pair. Returns the old value if the key existed.
    ///
    /// Grows the table first if the load factor has reached the threshold.
    ///
    /// # Panics
    ///
    /// Panics if every slot is occupied by other keys. The load factor check makes this
    /// unreachable for any valid threshold.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if self.load_factor() >= self.load_factor_threshold {
            self.rehash(self.capacity() * 2 + 1);
        }

        let mut first_tombstone = None;
        for idx in self.probe_sequence(&key) {
            match &mut self.slots[idx] {
                Slot::Empty => {
                    let target = first_tombstone.unwrap_or(idx);
                    if target != idx {
                        self.collisions += 1;
                    }
                    self.slots[target] = Slot::Occupied(key, value);
                    self.size += 1;
                    return None;
                }
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(idx);
                }
                Slot::Occupied(k, v) => {
                    if *k == key {
                        return Some(std::mem::replace(v, value));
                    }
                    self.collisions += 1;
                }
            }
        }

        // Every slot was probed, so the key is absent and any tombstone may take it.
        match first_tombstone {
            Some(target) => {
                self.collisions += 1;
                self.slots[target] = Slot::Occupied(key, value);
                self.size += 1;
                None
            }
            None => panic!(
                "{}",
                Error::TableFull {
                    capacity: self.capacity()
                }
            ),
        }
    }

    fn find_index(&self, key: &str) -> Option<usize> {
        for idx in self.probe_sequence(key) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(k, _) if k.as_str() == key => return Some(idx),
                Slot::Occupied(..) | Slot::Tombstone => {}
            }
        }
        None
    }

    /// Retrieve a reference to the value for `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        match &self.slots[self.find_index(key)?] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.find_index(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if `key` has a live entry.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, leaving a tombstone, and returns its value if it was present.
    pub fn take(&mut self, key: &str) -> Option<V> {
        let idx = self.find_index(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(_, v) => {
                self.size -= 1;
                Some(v)
            }
            _ => unreachable!("find_index only returns occupied slots"),
        }
    }

    /// Removes `key`. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Returns an iterator over all live `(key, value)` pairs, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(k, v) => Some((k.as_str(), v)),
            _ => None,
        })
    }

    /// Rebuild the table with `new_capacity` slots (at least 3), re-inserting all live entries.
    ///
    /// Tombstones are dropped. The collision counter is kept and keeps counting during the
    /// reinsertion.
    pub fn rehash(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        let old_capacity = self.capacity();
        let old_slots = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.size = 0;
        self.rehashes += 1;
        debug!(
            "rehashing {} table: {old_capacity} -> {new_capacity} slots",
            self.mode
        );

        for slot in old_slots {
            if let Slot::Occupied(k, v) = slot {
                self.insert(k, v);
            }
        }
        debug!(
            "rehash done: {} entries, {} collisions so far",
            self.size, self.collisions
        );
    }
}

impl<V: fmt::Debug, H, G> fmt::Debug for OpenAddressingTable<V, H, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAddressingTable")
            .field("slots", &self.slots)
            .field("size", &self.size)
            .field("collisions", &self.collisions)
            .field("rehashes", &self.rehashes)
            .field("mode", &self.mode)
            .field("load_factor_threshold", &self.load_factor_threshold)
            .finish_non_exhaustive()
    }
}
