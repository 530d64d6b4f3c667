//! Bounded selector that keeps the `k` smallest-keyed entries.
//!
//! Drives the k-nearest-neighbor search of the kd-tree: `kth_key` is the
//! pruning radius, and stays at the configured sentinel until `k` entries
//! have been seen so that no region is pruned early.

use std::cmp::Ordering;

/// Fixed-capacity max-heap of `(key, value)` pairs.
///
/// # Examples
///
/// ```rust
/// use capcluster::min_k::MinK;
///
/// let mut best = MinK::new(2, f64::MAX);
/// best.add(5.0, "e");
/// assert_eq!(best.kth_key(), f64::MAX);
///
/// best.add(1.0, "a");
/// best.add(3.0, "c");
/// assert_eq!(best.kth_key(), 3.0);
/// assert_eq!(best.into_sorted_values(), vec!["a", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct MinK<K, V> {
    k: usize,
    max_key: K,
    // heap[0] holds the largest retained key
    heap: Vec<(K, V)>,
}

impl<K: PartialOrd + Copy, V> MinK<K, V> {
    /// Create a selector for the `k` smallest keys; `max_key` is reported by
    /// [`kth_key`](Self::kth_key) until `k` entries are held.
    pub fn new(k: usize, max_key: K) -> Self {
        Self {
            k,
            max_key,
            heap: Vec::with_capacity(k),
        }
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The `k` this selector was created with.
    pub fn capacity(&self) -> usize {
        self.k
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Largest retained key once `k` entries are held, otherwise the sentinel.
    pub fn kth_key(&self) -> K {
        if self.k > 0 && self.heap.len() == self.k {
            self.heap[0].0
        } else {
            self.max_key
        }
    }

    /// Offer an entry.
    ///
    /// Accepted unconditionally while fewer than `k` entries are held; after
    /// that it replaces the current maximum only if `key` is strictly smaller.
    pub fn add(&mut self, key: K, value: V) {
        if self.heap.len() < self.k {
            self.heap.push((key, value));
            self.sift_up(self.heap.len() - 1);
        } else if self.k > 0 && key < self.heap[0].0 {
            self.heap[0] = (key, value);
            self.sift_down(0);
        }
    }

    /// Retained values in ascending key order.
    pub fn into_sorted_values(self) -> Vec<V> {
        let mut entries = self.heap;
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        entries.into_iter().map(|(_, value)| value).collect()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].0 > self.heap[parent].0 {
                self.heap.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.heap[right].0 > self.heap[left].0 {
                child = right;
            }
            if self.heap[child].0 > self.heap[i].0 {
                self.heap.swap(i, child);
                i = child;
            } else {
                break;
            }
        }
    }
}
