//! Leftist heap: a mergeable min-priority queue.
//!
//! Every node keeps its null path length (npl) and children are swapped so
//! that `npl(left) >= npl(right)`. The right spine therefore has O(log n)
//! nodes, and `merge`, `insert` and `extract_min` only walk right spines.

use crate::error::{ClusterError, Result};
use std::fmt;
use std::mem;

type Link<K, V> = Option<Box<HeapNode<K, V>>>;

#[derive(Debug)]
struct HeapNode<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    npl: i32,
}

impl<K, V> HeapNode<K, V> {
    fn singleton(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            npl: 0,
        })
    }
}

#[inline]
fn npl<K, V>(link: &Link<K, V>) -> i32 {
    link.as_ref().map_or(-1, |node| node.npl)
}

fn merge<K: PartialOrd, V>(a: Link<K, V>, b: Link<K, V>) -> Link<K, V> {
    match (a, b) {
        (None, other) | (other, None) => other,
        (Some(mut u), Some(mut v)) => {
            if u.key > v.key {
                mem::swap(&mut u, &mut v);
            }
            let right = u.right.take();
            u.right = merge(right, Some(v));
            if npl(&u.left) < npl(&u.right) {
                mem::swap(&mut u.left, &mut u.right);
            }
            u.npl = npl(&u.right) + 1;
            Some(u)
        }
    }
}

/// A min-heap of `(key, value)` pairs supporting O(log n) merge.
///
/// Ties between equal keys are resolved arbitrarily.
///
/// # Examples
///
/// ```rust
/// use capcluster::leftist_heap::LeftistHeap;
///
/// let mut heap = LeftistHeap::new();
/// heap.insert(3.0, "c");
/// heap.insert(1.0, "a");
///
/// let mut other = LeftistHeap::new();
/// other.insert(2.0, "b");
/// heap.merge_with(&mut other);
///
/// assert!(other.is_empty());
/// assert_eq!(heap.peek_min_key(), Some(1.0));
/// assert_eq!(heap.extract_min().unwrap(), "a");
/// assert_eq!(heap.extract_min().unwrap(), "b");
/// ```
pub struct LeftistHeap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: PartialOrd, V> LeftistHeap<K, V> {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Check if the heap has no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Insert `value` with priority `key`.
    pub fn insert(&mut self, key: K, value: V) {
        let root = self.root.take();
        self.root = merge(root, Some(HeapNode::singleton(key, value)));
        self.len += 1;
    }

    /// Move every entry of `other` into this heap, leaving `other` empty.
    pub fn merge_with(&mut self, other: &mut LeftistHeap<K, V>) {
        let root = self.root.take();
        self.root = merge(root, other.root.take());
        self.len += mem::take(&mut other.len);
    }

    /// Smallest key, or `None` when the heap is empty.
    pub fn peek_min_key(&self) -> Option<K>
    where
        K: Copy,
    {
        self.root.as_ref().map(|node| node.key)
    }

    /// Remove the minimum entry and return its key and value.
    pub fn extract_min_entry(&mut self) -> Result<(K, V)> {
        let node = self.root.take().ok_or(ClusterError::EmptyHeap)?;
        let HeapNode {
            key,
            value,
            left,
            right,
            ..
        } = *node;
        self.root = merge(left, right);
        self.len -= 1;
        Ok((key, value))
    }

    /// Remove the minimum entry and return its value.
    pub fn extract_min(&mut self) -> Result<V> {
        self.extract_min_entry().map(|(_, value)| value)
    }

    /// Preorder dump, right child before left child.
    ///
    /// Each node renders as `(<key>, <value>) [<npl>]` and each missing child
    /// as `[]`.
    pub fn list(&self) -> Vec<String>
    where
        K: fmt::Debug,
        V: fmt::Display,
    {
        self.list_with(|value| value.to_string())
    }

    /// Like [`list`](Self::list) with a caller-supplied value formatter.
    pub fn list_with<F>(&self, mut fmt_value: F) -> Vec<String>
    where
        K: fmt::Debug,
        F: FnMut(&V) -> String,
    {
        let mut out = Vec::with_capacity(2 * self.len + 1);
        let mut stack = vec![self.root.as_deref()];
        while let Some(link) = stack.pop() {
            match link {
                None => out.push("[]".to_string()),
                Some(node) => {
                    out.push(format!(
                        "({:?}, {}) [{}]",
                        node.key,
                        fmt_value(&node.value),
                        node.npl
                    ));
                    stack.push(node.left.as_deref());
                    stack.push(node.right.as_deref());
                }
            }
        }
        out
    }
}

impl<K: PartialOrd, V> Default for LeftistHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LeftistHeap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeftistHeap")
            .field("len", &self.len)
            .field("min_key", &self.root.as_ref().map(|node| &node.key))
            .finish()
    }
}

// Left spines can grow linearly with the number of entries; unlink them
// iteratively instead of through the default recursive drop.
impl<K, V> Drop for LeftistHeap<K, V> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<HeapNode<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}
