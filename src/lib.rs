//! slot-dict: an insertion-ordered dictionary built directly on a slot
//! array, plus a `DefaultDict` variant that fills missing keys from a
//! factory.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a dictionary whose placement, growth and ordering rules are
//!   explicit and small enough to reason about in one sitting.
//! - Layers:
//!   - Dictionary<K, V>: slot array with exactly one candidate slot per
//!     key (`hash % capacity`), an ordered sequence index for iteration,
//!     and growth as the only collision resolution.
//!   - DefaultDict<K, V, F>: wraps Dictionary and adds a `ValueFactory`
//!     consulted only when `get_or_create` misses.
//!
//! Placement and growth
//! - No probing. A write that lands on a slot held by a different key
//!   rebuilds the table at `capacity * growth_multiplier` and retries; a
//!   write into a full table (`len >= capacity`) rebuilds first.
//! - Entries that occupy distinct slots stay distinct after multiplying the
//!   capacity, so a rebuild never collides with itself.
//! - Two distinct keys with the same 64-bit hash can never be separated;
//!   such a write fails with `DictError::UnplaceableKey`.
//!
//! Ordering
//! - Every write, including an overwrite, takes the next sequence number.
//!   Iteration, `items`/`keys`/`values` and `pop_item` follow ascending
//!   sequence, so an overwrite moves its key to the end.
//! - Sequence numbers survive rebuilds and are never reused.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its precomputed `u64` hash and rebuilds use the
//!   stored hash; `K: Hash` is never invoked after insertion.
//! - The hasher is SipHash with fixed keys and is not configurable, so a
//!   key's slot at a given capacity is stable across runs.
//!
//! Notes and non-goals
//! - Single owner, single thread. Iteration cursors borrow the dictionary,
//!   so writes during iteration are compile errors rather than runtime
//!   hazards; any number of read cursors may be live at once.
//! - Capacity never shrinks; deletion only clears slots.
//! - `Dictionary` is mutable and deliberately does not implement `Hash`:
//!
//! ```compile_fail
//! use slot_dict::Dictionary;
//! use std::collections::HashSet;
//!
//! let mut set = HashSet::new();
//! set.insert(Dictionary::<u8, u8>::new());
//! ```

mod config;
mod default_dict;
mod dictionary;
mod dictionary_proptest;
mod error;
pub mod iter;
#[cfg(feature = "serde")]
mod serde_impl;

// Public surface
pub use config::{DictConfig, DEFAULT_CAPACITY, DEFAULT_GROWTH_MULTIPLIER};
pub use default_dict::{DefaultDict, DefaultDictBuilder, ValueFactory};
pub use dictionary::Dictionary;
pub use error::DictError;
