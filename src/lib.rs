//! prime-dict: a single-threaded, string-keyed dictionary with chained
//! buckets, prime-sized growth and a value destructor.
//!
//! Internal Design:
//!
//! Summary
//! - `Dictionary<V, S>` owns a boxed slice of bucket heads. Each bucket is
//!   an intrusive singly linked chain of boxed entries; an entry owns its
//!   key copy, its value and the hash computed when it was inserted.
//! - Bucket counts follow a fixed ladder of primes (`size_class`). The
//!   ladder index only moves up, one step per `set`, when the live count
//!   has reached the threshold of the current class.
//! - Growth relinks the existing entry boxes into the new table using
//!   their stored hashes. No entry is reallocated and the hasher is not
//!   called.
//!
//! Ownership
//! - Values are owned by the dictionary. A value leaves only through the
//!   destructor given at construction, exactly once: when it is
//!   overwritten by a different value, when its key is deleted, or when the
//!   dictionary is dropped. Without a destructor the value is dropped.
//! - `set(key, None)` deletes. Setting a value equal to the stored one is a
//!   no-op and the destructor does not run.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (shared `Rc` destructor, no atomics).
//! - Allocation failure aborts the process (`alloc`); no operation returns
//!   an error.
//! - Teardown unlinks chains iteratively. If the destructor panics while
//!   the dictionary is dropped, the remaining values are still drained
//!   through it before the panic continues.
//!
//! Capacity ceiling
//! - The last size class has 1610612741 buckets and an unreachable
//!   threshold. Growth silently stops there.
//!
//! Non-goals
//! - No iteration, no shrinking, no non-string keys, no persistence.

pub mod alloc;
pub mod dictionary;
#[cfg(test)]
mod dictionary_proptest;
pub mod hash;
pub mod size_class;

// Public surface
pub use dictionary::{Destructor, Dictionary};
pub use hash::{Bkdr, BkdrHasher};
pub use hashbrown::hash_map::DefaultHashBuilder;
pub use size_class::{SizeClass, SIZE_CLASSES};
