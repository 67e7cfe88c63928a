//! Order-statistic index: an AVL tree keyed by record key, where every
//! node also carries the byte offset of its record in the log and the
//! size of the subtree rooted at it.
//!
//! The size augmentation is what lets [`Index::at`] and [`Index::range`]
//! answer "the k-th key in ascending order" in O(log N) without a
//! separate sorted array.

mod node;

use node::{Link, Node};

use crate::error::{Error, Result};

pub struct Index<K> {
    root: Link<K>,
}

impl<K> Default for Index<K> {
    fn default() -> Self {
        Index { root: None }
    }
}

impl<K: Ord + Clone> Index<K> {
    pub fn new() -> Index<K> {
        Index::default()
    }

    /// Number of live keys in the index.
    pub fn len(&self) -> usize {
        node::size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `key` if absent, otherwise overwrites its stored offset.
    /// Returns whether the key was newly added.
    pub fn insert(&mut self, key: K, offset: u64) -> bool {
        let (root, added) = node::insert(self.root.take(), key, offset);
        self.root = root;
        added
    }

    pub fn lookup(&self, key: &K) -> Option<u64> {
        node::lookup(&self.root, key)
    }

    /// Removes `key` if present. Returns whether a removal occurred.
    pub fn delete(&mut self, key: &K) -> bool {
        let (root, removed) = node::delete(self.root.take(), key);
        self.root = root;
        removed
    }

    /// The `i`-th (0-indexed) entry in ascending key order.
    pub fn at(&self, i: usize) -> Result<(K, u64)> {
        let size = self.len();
        InOrder::from_rank(&self.root, i)
            .next()
            .map(|(k, o)| (k.clone(), o))
            .ok_or(Error::OutOfRange { index: i, size })
    }

    /// Up to `limit` consecutive entries starting at positional index
    /// `offset`, in ascending key order. Fewer if the tail is reached;
    /// empty if `offset` is at or past the end.
    pub fn range(&self, offset: usize, limit: usize) -> Vec<(K, u64)> {
        InOrder::from_rank(&self.root, offset)
            .take(limit)
            .map(|(k, o)| (k.clone(), o))
            .collect()
    }

    /// A finite, ascending, non-restartable iterator over every live
    /// `(key, offset)` pair.
    pub fn in_order(&self) -> impl Iterator<Item = (&K, u64)> {
        InOrder::full(&self.root)
    }

    /// Replaces the index's contents with `pairs`, which must already be
    /// sorted ascending by key with no duplicates. Builds a perfectly
    /// balanced tree in O(n) rather than paying for n sequential inserts.
    pub fn bulk_load(&mut self, pairs: Vec<(K, u64)>) {
        self.root = build_balanced(&pairs);
    }
}

fn build_balanced<K: Clone>(pairs: &[(K, u64)]) -> Link<K> {
    if pairs.is_empty() {
        return None;
    }
    let mid = pairs.len() / 2;
    let (key, offset) = pairs[mid].clone();
    let mut node = Box::new(Node::leaf_for_bulk_load(key, offset));
    node.left = build_balanced(&pairs[..mid]);
    node.right = build_balanced(&pairs[mid + 1..]);
    node::finish_bulk_load(&mut node);
    Some(node)
}

/// Explicit-stack in-order cursor; no parent pointers, no recursion during
/// iteration. Can be seeded either at the very first key (`full`) or at an
/// arbitrary rank (`from_rank`), the latter in O(log N) by skipping whole
/// subtrees that fall entirely before the requested rank.
struct InOrder<'a, K> {
    stack: Vec<&'a Node<K>>,
    current: Option<&'a Node<K>>,
}

impl<'a, K> InOrder<'a, K> {
    fn full(root: &'a Link<K>) -> Self {
        InOrder {
            stack: Vec::new(),
            current: root.as_deref(),
        }
    }

    fn from_rank(root: &'a Link<K>, rank: usize) -> Self {
        if rank >= node::size(root) {
            return InOrder {
                stack: Vec::new(),
                current: None,
            };
        }
        let mut stack = Vec::new();
        let mut cur = root.as_deref();
        let mut remaining = rank;
        loop {
            let node = cur.expect("rank < size guarantees a matching node exists");
            let left_size = node::size(&node.left);
            match remaining.cmp(&left_size) {
                std::cmp::Ordering::Less => {
                    stack.push(node);
                    cur = node.left.as_deref();
                }
                std::cmp::Ordering::Equal => {
                    stack.push(node);
                    break;
                }
                std::cmp::Ordering::Greater => {
                    remaining -= left_size + 1;
                    cur = node.right.as_deref();
                }
            }
        }
        InOrder {
            stack,
            current: None,
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = (&'a K, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.stack.push(node);
            self.current = node.left.as_deref();
        }
        let node = self.stack.pop()?;
        self.current = node.right.as_deref();
        Some((&node.key, node.offset))
    }
}
