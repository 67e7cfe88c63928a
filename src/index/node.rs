//! AVL node and the free functions that mutate a subtree rooted at one.
//!
//! No parent pointers: every mutation takes a subtree by value and hands
//! back a (possibly different) root, rebalancing on the way back up the
//! recursive call.

use std::cmp::Ordering;

/// A child link. `None` is an empty subtree.
pub(crate) type Link<K> = Option<Box<Node<K>>>;

pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) offset: u64,
    height: i32,
    size: usize,
    pub(crate) left: Link<K>,
    pub(crate) right: Link<K>,
}

impl<K> Node<K> {
    fn leaf(key: K, offset: u64) -> Box<Node<K>> {
        Box::new(Node {
            key,
            offset,
            height: 1,
            size: 1,
            left: None,
            right: None,
        })
    }

    /// A detached, size-1 node for [`crate::index::build_balanced`] to
    /// hang children off of before the final bottom-up `update`.
    pub(crate) fn leaf_for_bulk_load(key: K, offset: u64) -> Node<K> {
        Node {
            key,
            offset,
            height: 1,
            size: 1,
            left: None,
            right: None,
        }
    }
}

/// Recomputes height/size for a node assembled by bulk-load, after its
/// children have been attached.
pub(crate) fn finish_bulk_load<K>(node: &mut Node<K>) {
    update(node);
}

pub(crate) fn height<K>(link: &Link<K>) -> i32 {
    link.as_deref().map_or(0, |n| n.height)
}

pub(crate) fn size<K>(link: &Link<K>) -> usize {
    link.as_deref().map_or(0, |n| n.size)
}

fn balance_factor<K>(node: &Node<K>) -> i32 {
    height(&node.left) - height(&node.right)
}

/// Recomputes `height` and `size` from the (already up to date) children.
/// Every structural mutation must call this on every node whose subtree
/// changed, bottom-up, before returning.
fn update<K>(node: &mut Node<K>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    node.size = 1 + size(&node.left) + size(&node.right);
}

fn rotate_right<K>(mut y: Box<Node<K>>) -> Box<Node<K>> {
    let mut x = y.left.take().expect("LL/LR rotation requires a left child");
    y.left = x.right.take();
    update(&mut y);
    x.right = Some(y);
    update(&mut x);
    x
}

fn rotate_left<K>(mut x: Box<Node<K>>) -> Box<Node<K>> {
    let mut y = x.right.take().expect("RR/RL rotation requires a right child");
    x.right = y.left.take();
    update(&mut x);
    y.left = Some(x);
    update(&mut y);
    y
}

/// Restores the balance invariant at `node`, assuming both children are
/// already balanced. Applies exactly one of LL / RR / LR / RL.
fn rebalance<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    update(&mut node);
    match balance_factor(&node) {
        bf if bf > 1 => {
            // Left heavy. LR needs the inner rotation first; the child's
            // own balance factor (not the deleted/inserted key) decides.
            if balance_factor(node.left.as_deref().unwrap()) < 0 {
                node.left = Some(rotate_left(node.left.take().unwrap()));
            }
            rotate_right(node)
        }
        bf if bf < -1 => {
            if balance_factor(node.right.as_deref().unwrap()) > 0 {
                node.right = Some(rotate_right(node.right.take().unwrap()));
            }
            rotate_left(node)
        }
        _ => node,
    }
}

/// Inserts `key` if absent, otherwise overwrites its offset. Returns the
/// new subtree root and whether the key was newly added.
pub(crate) fn insert<K: Ord>(link: Link<K>, key: K, offset: u64) -> (Link<K>, bool) {
    let mut node = match link {
        None => return (Some(Node::leaf(key, offset)), true),
        Some(node) => node,
    };
    let added = match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, added) = insert(node.left.take(), key, offset);
            node.left = left;
            added
        }
        Ordering::Greater => {
            let (right, added) = insert(node.right.take(), key, offset);
            node.right = right;
            added
        }
        Ordering::Equal => {
            node.offset = offset;
            false
        }
    };
    (Some(rebalance(node)), added)
}

/// Removes `key` if present. Returns the new subtree root and whether a
/// removal occurred.
pub(crate) fn delete<K: Ord>(link: Link<K>, key: &K) -> (Link<K>, bool) {
    let mut node = match link {
        None => return (None, false),
        Some(node) => node,
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, removed) = delete(node.left.take(), key);
            node.left = left;
            (Some(if removed { rebalance(node) } else { node }), removed)
        }
        Ordering::Greater => {
            let (right, removed) = delete(node.right.take(), key);
            node.right = right;
            (Some(if removed { rebalance(node) } else { node }), removed)
        }
        Ordering::Equal => (delete_root(node), true),
    }
}

/// Removes a node with no remaining interest in its own key/offset: either
/// child replaces it directly, or the in-order successor is spliced in.
fn delete_root<K: Ord>(mut node: Box<Node<K>>) -> Link<K> {
    match (node.left.take(), node.right.take()) {
        (None, None) => None,
        (Some(left), None) => Some(left),
        (None, Some(right)) => Some(right),
        (Some(left), Some(right)) => {
            let (new_right, succ_key, succ_offset) = take_min(right);
            node.key = succ_key;
            node.offset = succ_offset;
            node.left = Some(left);
            node.right = new_right;
            Some(rebalance(node))
        }
    }
}

/// Removes and returns the leftmost node of `node`, by value: its key and
/// offset are moved out together so the relocation in `delete_root` copies
/// both fields atomically.
fn take_min<K>(mut node: Box<Node<K>>) -> (Link<K>, K, u64) {
    match node.left.take() {
        None => {
            let Node { key, offset, right, .. } = *node;
            (right, key, offset)
        }
        Some(left) => {
            let (new_left, key, offset) = take_min(left);
            node.left = new_left;
            (Some(rebalance(node)), key, offset)
        }
    }
}

pub(crate) fn lookup<K: Ord>(link: &Link<K>, key: &K) -> Option<u64> {
    let node = link.as_deref()?;
    match key.cmp(&node.key) {
        Ordering::Less => lookup(&node.left, key),
        Ordering::Greater => lookup(&node.right, key),
        Ordering::Equal => Some(node.offset),
    }
}

#[cfg(test)]
pub(crate) fn height_of<K>(link: &Link<K>) -> i32 {
    height(link)
}

#[cfg(test)]
mod node_test;
