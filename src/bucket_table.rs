use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use log::debug;
use log::trace;
use log::warn;

use crate::error::TableError;
use crate::hash::Fnv1a;
use crate::hash::KeyHasher;
use crate::value::Value;

/// Slot count used by [`BucketTable::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// The table grows before an insert once `populated / capacity` reaches
/// `MAX_LOAD_NUMERATOR / MAX_LOAD_DENOMINATOR`.
const MAX_LOAD_NUMERATOR: usize = 1;
const MAX_LOAD_DENOMINATOR: usize = 4;

#[inline(always)]
fn at_max_load(populated: usize, capacity: usize) -> bool {
    populated.saturating_mul(MAX_LOAD_DENOMINATOR) >= capacity.saturating_mul(MAX_LOAD_NUMERATOR)
}

/// An occupied slot: the table's own copy of the key, the key's cached hash,
/// and the ownership-tagged value.
#[derive(Clone)]
pub(crate) struct Slot<'a, V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) hash: u64,
    pub(crate) value: Value<'a, V>,
}

/// Outcome of walking a probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The key lives at this index.
    Found(usize),
    /// The key is absent; this is the first empty slot on its probe path.
    Vacant(usize),
    /// The probe wrapped back to the home index without finding either.
    Full,
}

/// A string-keyed hash table using open addressing with linear probing.
///
/// Every entry lives directly in one flat array of optional slots. A key's
/// home is `hash(key) % capacity`; collisions are resolved by scanning
/// forward with wraparound. The table doubles before an insert whenever a
/// quarter of its slots are in use, extending the array in place and then
/// relaying out existing entries until none of them needs to move. Removal
/// leaves no tombstone: entries later in the same probe chain are shifted
/// back into the gap immediately.
///
/// Values are stored as [`Value`]s: either a reference borrowed from the
/// caller for `'a`, or a value the table owns. Owned values are dropped
/// exactly once, and overwritten or removed values are handed back to the
/// caller.
///
/// ## Example
///
/// ```rust
/// use bucket_table::BucketTable;
/// use bucket_table::Value;
///
/// let config = String::from("caller owned");
/// let mut table = BucketTable::new();
///
/// assert!(table.set("config", &config).unwrap().is_none());
/// table.set_owned("scratch", String::from("table owned")).unwrap();
///
/// assert_eq!(table.get("config"), Some(&config));
/// assert_eq!(
///     table.remove("scratch"),
///     Some(Value::Owned(String::from("table owned")))
/// );
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Clone)]
pub struct BucketTable<'a, V, H = Fnv1a> {
    pub(crate) slots: Vec<Option<Slot<'a, V>>>,
    pub(crate) populated: usize,
    hasher: H,
}

impl<V, H> Debug for BucketTable<'_, V, H>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BucketTable")
            .field("capacity", &self.slots.len())
            .field("populated", &self.populated)
            .field(
                "slots",
                &self
                    .slots
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| {
                        slot.as_ref().map(|slot| {
                            (
                                index,
                                String::from_utf8_lossy(&slot.key),
                                slot.hash,
                                &slot.value,
                            )
                        })
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> Default for BucketTable<'_, V, Fnv1a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> BucketTable<'a, V, Fnv1a> {
    /// Creates a table with [`DEFAULT_CAPACITY`] slots hashing keys with
    /// FNV-1a.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// #
    /// let table: BucketTable<'_, u32> = BucketTable::new();
    /// assert_eq!(table.capacity(), 1024);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table with `capacity` slots hashing keys with FNV-1a.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Fnv1a)
    }
}

impl<'a, V, H> BucketTable<'a, V, H>
where
    H: KeyHasher,
{
    /// Creates a table with [`DEFAULT_CAPACITY`] slots and the given hash
    /// function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// #
    /// fn djb2(key: &[u8]) -> u64 {
    ///     key.iter()
    ///         .fold(5381u64, |h, &b| h.wrapping_mul(33).wrapping_add(b as u64))
    /// }
    ///
    /// let mut table = BucketTable::with_hasher(djb2);
    /// table.set_owned("k", 1u8).unwrap();
    /// assert_eq!(table.get("k"), Some(&1));
    /// ```
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Creates a table with `capacity` empty slots and the given hash
    /// function.
    ///
    /// Aborts on allocation failure, like [`Vec::with_capacity`]. Use
    /// [`try_with_capacity_and_hasher`](Self::try_with_capacity_and_hasher)
    /// to observe the failure instead.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        let slots = core::iter::repeat_with(|| None)
            .take(capacity.max(1))
            .collect();

        Self {
            slots,
            populated: 0,
            hasher,
        }
    }

    /// Creates a table with `capacity` empty slots, reporting allocation
    /// failure as an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// # use bucket_table::TableError;
    /// # use bucket_table::hash::Fnv1a;
    /// #
    /// let table = BucketTable::<'_, u64>::try_with_capacity_and_hasher(64, Fnv1a).unwrap();
    /// assert_eq!(table.capacity(), 64);
    ///
    /// let huge = BucketTable::<'_, u64>::try_with_capacity_and_hasher(usize::MAX, Fnv1a);
    /// assert!(matches!(huge, Err(TableError::Alloc(_))));
    /// ```
    pub fn try_with_capacity_and_hasher(capacity: usize, hasher: H) -> Result<Self, TableError> {
        let capacity = capacity.max(1);
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots,
            populated: 0,
            hasher,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the total number of slots.
    ///
    /// This is the modulus used for home indices, not the number of entries
    /// the table can take before growing (which is a quarter of it).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the hash function in use.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the fraction of slots in use, from `0.0` to `1.0`.
    pub fn fullness(&self) -> f32 {
        self.populated as f32 / self.slots.len() as f32
    }

    /// Returns the fullness as a percentage, from `0.0` to `100.0`.
    pub fn fullness_percent(&self) -> f32 {
        self.fullness() * 100.0
    }

    /// Inserts or updates `key` with a value borrowed from the caller.
    ///
    /// The table copies the key but never takes ownership of `value`.
    /// Returns the value previously stored under `key`, or `None` if the key
    /// was new. A previously table-owned value is handed back as
    /// [`Value::Owned`] and released when the caller drops it.
    ///
    /// # Errors
    ///
    /// Fails if growing the table fails, or if no empty slot can be found. In
    /// either case nothing is inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// # use bucket_table::Value;
    /// #
    /// let (first, second) = (1, 2);
    /// let mut table = BucketTable::new();
    ///
    /// assert_eq!(table.set("n", &first).unwrap(), None);
    /// assert_eq!(table.set("n", &second).unwrap(), Some(Value::Borrowed(&1)));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: &'a V,
    ) -> Result<Option<Value<'a, V>>, TableError> {
        self.set_value(key, Value::Borrowed(value))
    }

    /// Inserts or updates `key` with a value the table takes ownership of.
    ///
    /// The value is dropped when it is cleared or the table is dropped;
    /// overwriting or removing it hands it back instead.
    ///
    /// # Errors
    ///
    /// As for [`set`](Self::set).
    pub fn set_owned(
        &mut self,
        key: impl AsRef<[u8]>,
        value: V,
    ) -> Result<Option<Value<'a, V>>, TableError> {
        self.set_value(key, Value::Owned(value))
    }

    /// Inserts or updates `key` with an already-tagged value.
    ///
    /// # Errors
    ///
    /// As for [`set`](Self::set).
    pub fn set_value(
        &mut self,
        key: impl AsRef<[u8]>,
        value: Value<'a, V>,
    ) -> Result<Option<Value<'a, V>>, TableError> {
        self.store(key.as_ref(), value)
            .map(|(_, previous)| previous)
    }

    /// Stores an owned `i32` under `key` and returns the stored copy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// #
    /// let mut table: BucketTable<'_, i64> = BucketTable::new();
    /// *table.set_int("hits", 1).unwrap() += 1;
    /// assert_eq!(table.get("hits"), Some(&2));
    /// ```
    pub fn set_int(&mut self, key: impl AsRef<[u8]>, value: i32) -> Result<&mut V, TableError>
    where
        V: From<i32>,
    {
        self.store_boxed(key.as_ref(), V::from(value))
    }

    /// Stores an owned `i64` under `key` and returns the stored copy.
    pub fn set_long(&mut self, key: impl AsRef<[u8]>, value: i64) -> Result<&mut V, TableError>
    where
        V: From<i64>,
    {
        self.store_boxed(key.as_ref(), V::from(value))
    }

    /// Stores an owned `f32` under `key` and returns the stored copy.
    pub fn set_float(&mut self, key: impl AsRef<[u8]>, value: f32) -> Result<&mut V, TableError>
    where
        V: From<f32>,
    {
        self.store_boxed(key.as_ref(), V::from(value))
    }

    /// Stores an owned `f64` under `key` and returns the stored copy.
    pub fn set_double(&mut self, key: impl AsRef<[u8]>, value: f64) -> Result<&mut V, TableError>
    where
        V: From<f64>,
    {
        self.store_boxed(key.as_ref(), V::from(value))
    }

    /// Stores an owned copy of `value` under `key` and returns the stored
    /// copy.
    pub fn set_string(&mut self, key: impl AsRef<[u8]>, value: &str) -> Result<&mut V, TableError>
    where
        V: for<'s> From<&'s str>,
    {
        self.store_boxed(key.as_ref(), V::from(value))
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// #
    /// let mut table = BucketTable::new();
    /// table.set_owned("a", 'x').unwrap();
    ///
    /// assert_eq!(table.get("a"), Some(&'x'));
    /// assert_eq!(table.get("b"), None);
    /// ```
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        self.get_value(key).map(Value::get)
    }

    /// Returns the ownership-tagged value stored under `key`.
    pub fn get_value(&self, key: impl AsRef<[u8]>) -> Option<&Value<'a, V>> {
        let index = self.find_index(key.as_ref())?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    /// Returns the ownership-tagged value stored under `key` for in-place
    /// modification.
    ///
    /// Use [`Value::as_mut`] to reach a table-owned payload.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut Value<'a, V>> {
        let index = self.find_index(key.as_ref())?;
        self.slots[index].as_mut().map(|slot| &mut slot.value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.find_index(key.as_ref()).is_some()
    }

    /// Removes `key`, returning the value it held.
    ///
    /// Returns `None` if the key was absent, in which case the table is
    /// unchanged. Entries further along the same probe chain are shifted
    /// back so that every remaining key stays reachable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// # use bucket_table::Value;
    /// #
    /// let mut table = BucketTable::new();
    /// table.set_owned("gone", 9u8).unwrap();
    ///
    /// assert_eq!(table.remove("gone"), Some(Value::Owned(9)));
    /// assert_eq!(table.remove("gone"), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Value<'a, V>> {
        let index = self.find_index(key.as_ref())?;
        let slot = self.slots[index].take()?;
        self.populated -= 1;
        self.relayout_after_removal(index);

        Some(slot.value)
    }

    /// Returns owned copies of every key, in slot order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.iter().map(|(key, _)| key.to_vec()).collect()
    }

    /// Iterates over `(key, value)` pairs in slot order.
    ///
    /// The order changes as the table grows and entries are removed.
    pub fn iter(&self) -> Iter<'_, 'a, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Removes every entry, keeping the slot array and its capacity.
    ///
    /// Table-owned values are dropped; borrowed values are left alone.
    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
        self.populated = 0;
    }

    /// Grows the table until `additional` more entries fit without
    /// triggering another grow.
    ///
    /// # Errors
    ///
    /// The target capacity is computed before anything is allocated, so a
    /// request that cannot fit in `usize` fails with
    /// [`TableError::CapacityOverflow`] and leaves the table untouched. An
    /// allocation failure also leaves the table untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// # use bucket_table::TableError;
    /// #
    /// let mut table: BucketTable<'_, u8> = BucketTable::with_capacity(8);
    /// table.reserve(100).unwrap();
    /// assert_eq!(table.capacity(), 512);
    ///
    /// assert_eq!(table.reserve(usize::MAX), Err(TableError::CapacityOverflow));
    /// assert_eq!(table.capacity(), 512);
    /// ```
    pub fn reserve(&mut self, additional: usize) -> Result<(), TableError> {
        let required = self
            .populated
            .checked_add(additional)
            .and_then(|required| required.checked_mul(MAX_LOAD_DENOMINATOR))
            .ok_or(TableError::CapacityOverflow)?;

        let mut target = self.slots.len();
        while required >= target.saturating_mul(MAX_LOAD_NUMERATOR) {
            target = target
                .checked_mul(2)
                .ok_or(TableError::CapacityOverflow)?;
        }

        if target > self.slots.len() {
            self.grow_to(target)?;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn home_index(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    fn next_index(&self, index: usize) -> usize {
        if index + 1 == self.slots.len() {
            0
        } else {
            index + 1
        }
    }

    /// Walks the probe sequence for `key` starting at its home index.
    ///
    /// The cached hash is compared before the key length and bytes; equal
    /// hashes alone never count as a match.
    pub(crate) fn locate(&self, key: &[u8], hash: u64) -> Probe {
        let home = self.home_index(hash);
        let mut index = home;
        loop {
            match &self.slots[index] {
                None => return Probe::Vacant(index),
                Some(slot)
                    if slot.hash == hash && slot.key.len() == key.len() && *slot.key == *key =>
                {
                    return Probe::Found(index);
                }
                Some(_) => {
                    index = self.next_index(index);
                    if index == home {
                        return Probe::Full;
                    }
                }
            }
        }
    }

    fn find_index(&self, key: &[u8]) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        match self.locate(key, self.hasher.hash_key(key)) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Inserts or updates `key`, returning the slot index used and the
    /// displaced value.
    fn store(
        &mut self,
        key: &[u8],
        value: Value<'a, V>,
    ) -> Result<(usize, Option<Value<'a, V>>), TableError> {
        while at_max_load(self.populated, self.slots.len()) {
            self.grow()?;
        }

        let hash = self.hasher.hash_key(key);
        let index = match self.locate(key, hash) {
            Probe::Found(index) | Probe::Vacant(index) => index,
            Probe::Full => {
                warn!(
                    "unable to insert key of {} bytes: all {} slots are occupied",
                    key.len(),
                    self.slots.len()
                );
                return Err(TableError::Full {
                    capacity: self.slots.len(),
                });
            }
        };

        let previous = match &mut self.slots[index] {
            Some(slot) => {
                slot.hash = hash;
                Some(core::mem::replace(&mut slot.value, value))
            }
            empty @ None => {
                *empty = Some(Slot {
                    key: key.into(),
                    hash,
                    value,
                });
                self.populated += 1;
                None
            }
        };

        Ok((index, previous))
    }

    fn store_boxed(&mut self, key: &[u8], value: V) -> Result<&mut V, TableError> {
        let (index, _previous) = self.store(key, Value::Owned(value))?;
        let capacity = self.slots.len();
        self.slots[index]
            .as_mut()
            .and_then(|slot| slot.value.as_mut())
            .ok_or(TableError::Full { capacity })
    }

    /// Doubles the slot array in place and restores the probing invariant.
    ///
    /// If the array cannot be extended the table is left untouched.
    #[cold]
    fn grow(&mut self) -> Result<(), TableError> {
        let new_capacity = self
            .slots
            .len()
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow)?;

        self.grow_to(new_capacity)
    }

    /// Extends the slot array to `new_capacity` slots, then relays out
    /// every entry.
    fn grow_to(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let old_capacity = self.slots.len();
        debug_assert!(new_capacity > old_capacity);

        self.slots.try_reserve_exact(new_capacity - old_capacity)?;
        self.slots.resize_with(new_capacity, || None);

        let passes = self.relayout_all();
        debug!(
            "grew bucket table from {old_capacity} to {new_capacity} slots ({} entries, {passes} relayout passes)",
            self.populated
        );

        Ok(())
    }

    /// Repeats full relayout passes until one of them moves nothing.
    ///
    /// Returns the number of passes run, including the final quiet one.
    pub(crate) fn relayout_all(&mut self) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let moved = self.relayout_pass();
            trace!("relayout pass {passes} moved {moved} entries");
            if moved == 0 {
                return passes;
            }
        }
    }

    /// Moves every entry that `locate` would not find at its current index
    /// into the empty slot `locate` stops at instead.
    ///
    /// Each move strictly shortens the moved entry's probe distance, so
    /// repeated passes reach a fixed point.
    pub(crate) fn relayout_pass(&mut self) -> usize {
        let mut moved = 0;
        for index in 0..self.slots.len() {
            if self.relocate(index) {
                moved += 1;
            }
        }
        moved
    }

    /// Closes the gap left at `freed` by walking the rest of its cluster.
    ///
    /// Stops at the first empty slot, wrapping past the end of the array.
    fn relayout_after_removal(&mut self, freed: usize) {
        let mut moved = 0;
        let mut index = self.next_index(freed);
        while index != freed && self.slots[index].is_some() {
            if self.relocate(index) {
                moved += 1;
            }
            index = self.next_index(index);
        }
        trace!("removal at slot {freed} shifted {moved} entries");
    }

    /// Moves the entry at `index`, if any, to where `locate` would look for
    /// it. Returns `true` if it moved.
    fn relocate(&mut self, index: usize) -> bool {
        let target = match &self.slots[index] {
            Some(slot) => match self.locate(&slot.key, slot.hash) {
                Probe::Vacant(target) => target,
                Probe::Found(_) | Probe::Full => return false,
            },
            None => return false,
        };

        self.slots.swap(index, target);
        true
    }
}

/// An iterator over the entries of a [`BucketTable`].
///
/// Created by [`BucketTable::iter`].
pub struct Iter<'t, 'a, V> {
    slots: core::slice::Iter<'t, Option<Slot<'a, V>>>,
    remaining: usize,
}

impl<'t, 'a, V> Iterator for Iter<'t, 'a, V> {
    type Item = (&'t [u8], &'t V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(slot) = slot {
                self.remaining -= 1;
                return Some((&slot.key[..], slot.value.get()));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, '_, V> {}
