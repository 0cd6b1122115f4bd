//! Dictionary: string keys, owned values, chained buckets, prime growth.

use crate::alloc;
use crate::hash::hash_key;
use crate::size_class::{next_class, SIZE_CLASSES};
use core::fmt;
use core::hash::BuildHasher;
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;

/// Callback that receives every value the dictionary gives up: on
/// overwrite, on deletion and when the dictionary is dropped.
pub type Destructor<V> = Rc<dyn Fn(V)>;

/// Head of a singly linked chain. Dropping it unlinks entries one at a
/// time, so a long chain never drops recursively.
#[derive(Debug)]
struct Link<V>(Option<Box<Entry<V>>>);

impl<V> Link<V> {
    const EMPTY: Self = Link(None);

    #[inline]
    fn take(&mut self) -> Self {
        Link(self.0.take())
    }
}

impl<V> Default for Link<V> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<V> Drop for Link<V> {
    fn drop(&mut self) {
        let mut head = self.0.take();
        while let Some(mut entry) = head {
            head = entry.next.0.take();
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    next: Link<V>,
    hash: u64,
    value: V,
    key: Box<str>,
}

impl<V> Entry<V> {
    fn new(hash: u64, key: &str, value: V, next: Link<V>) -> Box<Self> {
        alloc::allocate(Entry {
            next,
            hash,
            value,
            key: alloc::duplicate_str(key),
        })
    }

    #[inline]
    fn matches(&self, hash: u64, key: &str) -> bool {
        self.hash == hash && &*self.key == key
    }
}

/// Shared walk over one bucket's chain.
struct Chain<'a, V> {
    link: &'a Link<V>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = &'a Entry<V>;

    #[inline]
    fn next(&mut self) -> Option<&'a Entry<V>> {
        let entry = self.link.0.as_deref()?;
        self.link = &entry.next;
        Some(entry)
    }
}

/// Follow `steps` links down a chain.
fn link_at<V>(mut link: &mut Link<V>, steps: usize) -> &mut Link<V> {
    for _ in 0..steps {
        match link.0 {
            Some(ref mut entry) => link = &mut entry.next,
            None => break,
        }
    }
    link
}

/// String-keyed hash dictionary with separate chaining.
///
/// The bucket count walks up [`SIZE_CLASSES`]: whenever a `set` starts with
/// the live count at or above the current class threshold, every entry is
/// relinked into a table of the next prime size. Entries are never copied.
///
/// Values belong to the dictionary. A value leaves it only through the
/// destructor (when overwritten, deleted or at drop), or is dropped in
/// place when no destructor was given.
pub struct Dictionary<V, S = DefaultHashBuilder> {
    hasher: S,
    table: Box<[Link<V>]>,
    class: usize,
    len: usize,
    destructor: Option<Destructor<V>>,
}

impl<V> Dictionary<V> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Empty dictionary handing displaced values to `destructor`.
    pub fn with_destructor<F>(destructor: F) -> Self
    where
        F: Fn(V) + 'static,
    {
        let destructor: Destructor<V> = Rc::new(destructor);
        Self::with_hasher_and_destructor(DefaultHashBuilder::default(), Some(destructor))
    }
}

impl<V> Default for Dictionary<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> Dictionary<V, S> {
    /// Hand a value the dictionary no longer holds to the destructor.
    fn release(&self, value: V) {
        match &self.destructor {
            Some(destructor) => destructor(value),
            None => drop(value),
        }
    }

    /// Unlink every entry, releasing values as they come off the table.
    /// The table stays consistent between releases, so a panicking
    /// destructor leaves the rest for the next call.
    fn drain(&mut self) {
        for index in 0..self.table.len() {
            while let Some(mut entry) = self.table[index].0.take() {
                self.table[index] = entry.next.take();
                self.len -= 1;
                let Entry { value, .. } = *entry;
                self.release(value);
            }
        }
    }
}

impl<V, S> Dictionary<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_hasher_and_destructor(hasher, None)
    }

    pub fn with_hasher_and_destructor(hasher: S, destructor: Option<Destructor<V>>) -> Self {
        Self {
            hasher,
            table: alloc::allocate_zeroed(SIZE_CLASSES[0].capacity),
            class: 0,
            len: 0,
            destructor,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// Index of the current size class in [`SIZE_CLASSES`].
    pub fn size_class(&self) -> usize {
        self.class
    }

    #[inline]
    fn make_hash(&self, key: &str) -> u64 {
        hash_key(&self.hasher, key)
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.table.len() as u64) as usize
    }

    fn chain(&self, index: usize) -> Chain<'_, V> {
        Chain {
            link: &self.table[index],
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let hash = self.make_hash(key);
        self.chain(self.bucket_of(hash))
            .find(|e| e.matches(hash, key))
            .map(|e| &e.value)
    }

    /// Mutable access to a stored value. The destructor is not involved.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let hash = self.make_hash(key);
        let index = self.bucket_of(hash);
        let position = self.chain(index).position(|e| e.matches(hash, key))?;
        link_at(&mut self.table[index], position)
            .0
            .as_deref_mut()
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let hash = self.make_hash(key);
        self.chain(self.bucket_of(hash)).any(|e| e.matches(hash, key))
    }

    /// Move to the next size class if the live count has reached the
    /// current threshold. Relinks entries using their stored hashes, so the
    /// hasher is never called here; each chain comes out reversed.
    fn grow(&mut self) {
        let Some(class) = next_class(self.class, self.len) else {
            return;
        };
        let capacity = SIZE_CLASSES[class].capacity;
        let mut table: Box<[Link<V>]> = alloc::allocate_zeroed(capacity);

        let old = mem::take(&mut self.table);
        log::debug!(
            "dictionary grow: {} -> {} buckets at {} live entries",
            old.len(),
            capacity,
            self.len
        );
        for mut head in old.into_vec() {
            let mut link = head.0.take();
            while let Some(mut entry) = link {
                link = entry.next.0.take();
                let slot = &mut table[(entry.hash % capacity as u64) as usize];
                entry.next = slot.take();
                slot.0 = Some(entry);
            }
        }

        self.table = table;
        self.class = class;
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.table.len(), SIZE_CLASSES[self.class].capacity);
        let mut live = 0;
        for index in 0..self.table.len() {
            for entry in self.chain(index) {
                assert_eq!(entry.hash, self.make_hash(&entry.key), "stale hash");
                assert_eq!(self.bucket_of(entry.hash), index, "entry in wrong bucket");
                live += 1;
            }
        }
        assert_eq!(live, self.len, "live count out of sync");
    }
}

impl<V, S> Dictionary<V, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    /// Associate `key` with `value`, or delete `key` when `value` is `None`.
    ///
    /// - Setting a value equal to the stored one changes nothing. The stored
    ///   value stays, the destructor is not called, and the incoming value
    ///   is dropped in place: a destructor that recycles values never sees
    ///   it. Check with [`get`](Self::get) first to keep such a value.
    /// - Overwriting or deleting passes the previous value to the destructor.
    /// - Deleting an absent key is a no-op.
    ///
    /// The growth check runs first on every call, deletions included.
    pub fn set(&mut self, key: &str, value: Option<V>) {
        // Run the destructor only once the table is consistent again.
        if let Some(displaced) = self.store(key, value) {
            self.release(displaced);
        }
    }

    /// Shorthand for `set(key, None)`.
    pub fn remove(&mut self, key: &str) {
        self.set(key, None);
    }

    fn store(&mut self, key: &str, value: Option<V>) -> Option<V> {
        self.grow();
        debug_assert_eq!(self.table.len(), SIZE_CLASSES[self.class].capacity);

        let hash = self.make_hash(key);
        let index = self.bucket_of(hash);
        let Some(position) = self.chain(index).position(|e| e.matches(hash, key)) else {
            if let Some(value) = value {
                let head = self.table[index].take();
                self.table[index] = Link(Some(Entry::new(hash, key, value, head)));
                self.len += 1;
                log::trace!("dictionary insert {key:?} into bucket {index}");
            }
            return None;
        };

        let link = link_at(&mut self.table[index], position);
        match value {
            Some(value) => {
                let entry = link.0.as_deref_mut()?;
                if entry.value == value {
                    return None;
                }
                Some(mem::replace(&mut entry.value, value))
            }
            None => {
                let mut removed = link.0.take()?;
                *link = removed.next.take();
                self.len -= 1;
                log::trace!("dictionary delete {key:?} from bucket {index}");
                let Entry { value, .. } = *removed;
                Some(value)
            }
        }
    }
}

impl<V, S> Drop for Dictionary<V, S> {
    fn drop(&mut self) {
        // If a destructor call panics, keep draining while unwinding so the
        // remaining values still reach the destructor.
        struct DrainOnUnwind<'a, V, S>(&'a mut Dictionary<V, S>);
        impl<V, S> Drop for DrainOnUnwind<'_, V, S> {
            fn drop(&mut self) {
                self.0.drain();
            }
        }

        let mut guard = DrainOnUnwind(self);
        guard.0.drain();
        mem::forget(guard);
    }
}

impl<V, S> fmt::Debug for Dictionary<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("len", &self.len)
            .field("capacity", &self.table.len())
            .field("size_class", &self.class)
            .finish_non_exhaustive()
    }
}
