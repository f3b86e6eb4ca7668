//! Diagnostic statistics for [`BucketTable`].
//!
//! Everything here is a read-only pass over the slot array. The results come
//! back as plain values; [`TableStats`] implements `Display` for callers who
//! just want the report.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::bucket_table::BucketTable;
use crate::bucket_table::Slot;
use crate::hash::KeyHasher;

/// A snapshot of a table's layout quality.
///
/// Probe lengths are counted the way a lookup pays for them: an entry sitting
/// on its home slot has a probe length of 1, the next slot over 2, and so on,
/// wrapping past the end of the array.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Total number of slots.
    pub capacity: usize,
    /// Number of occupied slots.
    pub populated: usize,
    /// `populated / capacity`.
    pub fullness: f64,
    /// Mean probe length over every slot, counting each empty slot as 1.
    pub avg_probe: f64,
    /// Mean probe length over occupied slots only.
    pub avg_used_probe: f64,
    /// Longest probe length of any entry.
    pub max_probe: u64,
    /// Longest run of consecutive occupied slots.
    pub max_run: u64,
    /// Number of adjacent equal pairs among the sorted cached hashes.
    pub hash_collisions: u64,
    /// Number of adjacent equal pairs among the sorted home indices.
    pub index_collisions: u64,
    /// Table header plus slot array plus key bytes, excluding value payloads.
    pub footprint_bytes: usize,
}

impl TableStats {
    /// Pretty-prints the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Bucket Table Statistics ===")?;
        writeln!(f, "Slots: {}", self.capacity)?;
        writeln!(
            f,
            "Entries: {} ({:.2}% full)",
            self.populated,
            self.fullness * 100.0
        )?;
        writeln!(
            f,
            "Average probe length: {:.4} (all slots), {:.4} (used slots)",
            self.avg_probe, self.avg_used_probe
        )?;
        writeln!(f, "Max probe length: {}", self.max_probe)?;
        writeln!(f, "Max consecutive slots used: {}", self.max_run)?;
        writeln!(f, "Hash collisions: {}", self.hash_collisions)?;
        writeln!(f, "Index collisions: {}", self.index_collisions)?;
        write!(f, "Estimated footprint: {} bytes", self.footprint_bytes)
    }
}

/// Probe length of an entry at `index` whose home slot is `home`.
#[inline]
pub(crate) fn probe_length(capacity: usize, index: usize, home: usize) -> u64 {
    if index < home {
        (index + capacity - home + 1) as u64
    } else {
        (index - home + 1) as u64
    }
}

/// Stable top-down merge sort.
///
/// The scratch buffer is allocated once per call and shared by every merge.
pub(crate) fn merge_sort<T: Copy + Ord>(values: &mut [T]) {
    if values.len() < 2 {
        return;
    }

    let mut scratch = values.to_vec();
    sort_with(values, &mut scratch);
}

fn sort_with<T: Copy + Ord>(values: &mut [T], scratch: &mut [T]) {
    let len = values.len();
    if len < 2 {
        return;
    }

    let mid = len / 2;
    {
        let (left, right) = values.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        sort_with(left, left_scratch);
        sort_with(right, right_scratch);
    }

    merge(values, mid, scratch);
    values.copy_from_slice(&scratch[..len]);
}

/// Merges the sorted halves `values[..mid]` and `values[mid..]` into `out`.
/// Ties take from the left half.
fn merge<T: Copy + Ord>(values: &[T], mid: usize, out: &mut [T]) {
    let (mut left, mut right) = (0, mid);
    for slot in out.iter_mut().take(values.len()) {
        if left < mid && (right == values.len() || values[left] <= values[right]) {
            *slot = values[left];
            left += 1;
        } else {
            *slot = values[right];
            right += 1;
        }
    }
}

fn adjacent_duplicates(sorted: &[u64]) -> u64 {
    sorted.windows(2).filter(|pair| pair[0] == pair[1]).count() as u64
}

impl<'a, V, H> BucketTable<'a, V, H>
where
    H: KeyHasher,
{
    /// Computes layout statistics for the current table state.
    ///
    /// Runs in `O(capacity + n log n)`; the collision counts sort the cached
    /// hashes and home indices of the `n` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bucket_table::BucketTable;
    /// #
    /// let mut table = BucketTable::with_capacity(64);
    /// for i in 0..10u32 {
    ///     table.set_owned(i.to_string(), i).unwrap();
    /// }
    ///
    /// let stats = table.stats();
    /// assert_eq!(stats.populated, 10);
    /// assert!(stats.max_probe >= 1);
    /// println!("{stats}");
    /// ```
    pub fn stats(&self) -> TableStats {
        let capacity = self.slots.len();
        let mut hashes = Vec::with_capacity(self.populated);
        let mut homes = Vec::with_capacity(self.populated);

        let (mut sum, mut sum_used, mut max_probe) = (0u64, 0u64, 0u64);
        let (mut run, mut max_run) = (0u64, 0u64);
        let mut key_bytes = 0usize;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(slot) => {
                    run += 1;
                    let home = self.home_index(slot.hash);
                    let probe = probe_length(capacity, index, home);
                    sum += probe;
                    sum_used += probe;
                    max_probe = max_probe.max(probe);
                    key_bytes += slot.key.len();
                    hashes.push(slot.hash);
                    homes.push(home as u64);
                }
                None => {
                    sum += 1;
                    max_run = max_run.max(run);
                    run = 0;
                }
            }
        }
        max_run = max_run.max(run);

        merge_sort(&mut hashes);
        merge_sort(&mut homes);

        TableStats {
            capacity,
            populated: self.populated,
            fullness: self.populated as f64 / capacity as f64,
            avg_probe: sum as f64 / capacity as f64,
            avg_used_probe: if self.populated == 0 {
                0.0
            } else {
                sum_used as f64 / self.populated as f64
            },
            max_probe,
            max_run,
            hash_collisions: adjacent_duplicates(&hashes),
            index_collisions: adjacent_duplicates(&homes),
            footprint_bytes: core::mem::size_of::<Self>()
                + capacity * core::mem::size_of::<Option<Slot<'a, V>>>()
                + key_bytes,
        }
    }

    /// Counts entries by probe length.
    ///
    /// Bin `i` holds the number of entries with probe length `i + 1`; the
    /// vector is as long as the longest probe.
    pub fn probe_histogram(&self) -> Vec<usize> {
        let capacity = self.slots.len();
        let mut histogram = vec![];

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            let probe = probe_length(capacity, index, self.home_index(slot.hash)) as usize;
            if histogram.len() < probe {
                histogram.resize(probe, 0);
            }
            histogram[probe - 1] += 1;
        }

        histogram
    }
}
