//! Hash tables over string keys.
//!
//! This module provides:
//! - An open addressing table with linear probing or double hashing, tombstone deletion and
//!   automatic growth ([`OpenAddressingTable`])
//! - A separate chaining table used as a baseline ([`ChainingTable`])
//! - Simple string hash functions to plug into either of them
//!
//! # Examples
//!
//! ```rust
//! use labhash::hashing::{djb2, OpenAddressingTable, ProbingMode};
//!
//! let mut table = OpenAddressingTable::new(7, djb2, None, ProbingMode::Linear, 0.6).unwrap();
//! table.insert("apple", 10);
//! table.insert("banana", 20);
//! assert!(table.remove("apple"));
//! assert_eq!(table.get("banana"), Some(&20));
//! assert_eq!(table.size(), 1);
//! ```

pub mod chaining;
pub mod open_addressing;
pub mod string_hash;

pub use chaining::ChainingTable;
pub use open_addressing::{
    HashFn, OpenAddressingBuilder, OpenAddressingTable, ProbeSequence, ProbingMode,
};
pub use string_hash::{djb2, polynomial_hash, polynomial_hash_with, simple_hash, StringHasher};
