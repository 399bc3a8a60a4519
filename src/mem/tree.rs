use crate::api::error::{Error, Result};
use crate::api::tree::Tree;
use crate::mem::node::Node;
use crate::util::bsearch::partition;
use log::debug;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Write};
use std::mem::{self, size_of};

/// Default per-node storage budget in bytes.
pub const BLOCK: usize = 128;

pub const MIN_DEGREE: usize = 2;

// Child slots hold a thin `Box` pointer.
const REF: usize = size_of::<usize>();

/// Derive the degree from a per-node budget so that two arrays of the largest
/// element (key, value or child reference) still fit into `block` bytes.
pub fn degree(block: usize, key_size: usize, val_size: usize) -> usize {
    let max = key_size.max(val_size).max(REF);
    (block / (max * 2)).max(MIN_DEGREE)
}

/// In-memory B-tree of minimum degree `t`.
///
/// Insertion splits full nodes on the way down and deletion tops up thin
/// nodes on the way down, so each operation is a single root-to-leaf pass.
/// Only the root ever changes height: it is wrapped under a new root when
/// full, and replaced by its only child when a merge empties it.
pub struct BTree<K, V> {
    root: Box<Node<K, V>>,
    t: usize,
    len: usize,
}

impl<K, V> BTree<K, V> {
    pub fn new() -> Self {
        Self::with_block(BLOCK)
    }

    pub fn with_block(block: usize) -> Self {
        Self::with_degree(degree(block, size_of::<K>(), size_of::<V>()))
    }

    pub fn with_degree(t: usize) -> Self {
        assert!(
            t >= MIN_DEGREE,
            "degree {} is below minimum {}",
            t,
            MIN_DEGREE
        );
        Self {
            root: Box::new(Node::create(t)),
            t,
            len: 0,
        }
    }

    /// Total number of nodes currently allocated by the tree.
    pub fn nodes(&self) -> usize {
        fn count<K, V>(node: &Node<K, V>) -> usize {
            1 + node.children.iter().map(|c| count::<K, V>(c)).sum::<usize>()
        }
        count::<K, V>(&self.root)
    }

    pub fn clear(&mut self) {
        self.root = Box::new(Node::create(self.t));
        self.len = 0;
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node: &Node<K, V> = &self.root;
        while !node.is_leaf() {
            node = node.child(0);
        }
        node.keys.first().zip(node.vals.first())
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        let mut node: &Node<K, V> = &self.root;
        while !node.is_leaf() {
            node = node.child(node.len());
        }
        node.keys.last().zip(node.vals.last())
    }

    /// Entry with the smallest key strictly greater than `key`.
    pub fn above_by<Q, F>(&self, key: &Q, cmp: F) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        let mut node: &Node<K, V> = &self.root;
        let mut found = None;
        loop {
            let i = partition(node.len(), |j| cmp(key, node.keys.at(j)) != Ordering::Less);
            if i < node.len() {
                found = Some((node.keys.at(i), node.vals.at(i)));
            }
            if node.is_leaf() {
                return found;
            }
            node = node.child(i);
        }
    }

    /// Entry with the largest key strictly lesser than `key`.
    pub fn below_by<Q, F>(&self, key: &Q, cmp: F) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        let mut node: &Node<K, V> = &self.root;
        let mut found = None;
        loop {
            let i = node.find(key, &cmp);
            if i > 0 {
                found = Some((node.keys.at(i - 1), node.vals.at(i - 1)));
            }
            if node.is_leaf() {
                return found;
            }
            node = node.child(i);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Verify every structural invariant: occupancy bounds, child counts,
    /// key order within and across nodes, equal leaf depth and entry count.
    pub fn check_by<F>(&self, cmp: F) -> Result<()>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let mut leaves = None;
        let count = Self::check_node(&self.root, self.t, 0, None, None, &cmp, &mut leaves)?;
        if count != self.len {
            return Err(Error::Tree(
                0,
                format!("found {} entries, expected {}", count, self.len),
            ));
        }
        Ok(())
    }

    fn check_node<'a, F>(
        node: &'a Node<K, V>,
        t: usize,
        depth: usize,
        lo: Option<&'a K>,
        hi: Option<&'a K>,
        cmp: &F,
        leaves: &mut Option<usize>,
    ) -> Result<usize>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let n = node.len();
        if node.vals.len() != n {
            return Err(Error::Tree(
                depth,
                format!("{} keys but {} values", n, node.vals.len()),
            ));
        }
        if n > 2 * t - 1 {
            return Err(Error::Tree(depth, format!("overfull: {} keys", n)));
        }
        if depth > 0 && n < t - 1 {
            return Err(Error::Tree(depth, format!("underfull: {} keys", n)));
        }
        if !node.is_leaf() && n == 0 {
            return Err(Error::Tree(depth, "internal node without keys".to_string()));
        }
        if !node.is_leaf() && node.children.len() != n + 1 {
            return Err(Error::Tree(
                depth,
                format!("{} keys but {} children", n, node.children.len()),
            ));
        }
        for i in 1..n {
            if cmp(node.keys.at(i - 1), node.keys.at(i)) != Ordering::Less {
                return Err(Error::Tree(depth, format!("keys out of order at {}", i)));
            }
        }
        if let (Some(lo), Some(min)) = (lo, node.keys.first()) {
            if cmp(lo, min) != Ordering::Less {
                return Err(Error::Tree(depth, "key below lower separator".to_string()));
            }
        }
        if let (Some(hi), Some(max)) = (hi, node.keys.last()) {
            if cmp(max, hi) != Ordering::Less {
                return Err(Error::Tree(depth, "key above upper separator".to_string()));
            }
        }

        if node.is_leaf() {
            let expected = *leaves.get_or_insert(depth);
            if expected != depth {
                return Err(Error::Tree(
                    depth,
                    format!("leaf at depth {}, expected {}", depth, expected),
                ));
            }
            return Ok(n);
        }

        let mut count = n;
        for j in 0..=n {
            let lo = if j == 0 { lo } else { Some(node.keys.at(j - 1)) };
            let hi = if j == n { hi } else { Some(node.keys.at(j)) };
            count += Self::check_node(node.child(j), t, depth + 1, lo, hi, cmp, leaves)?;
        }
        Ok(count)
    }

    /// Render the tree in Graphviz dot format.
    pub fn dot(&self) -> String
    where
        K: Display,
        V: Display,
    {
        let mut out = String::new();
        self.write_dot(&mut out)
            .map(|_| out)
            .unwrap_or_default()
    }

    pub fn write_dot<W: Write>(&self, out: &mut W) -> fmt::Result
    where
        K: Display,
        V: Display,
    {
        writeln!(out, "digraph btree {{")?;
        writeln!(out, " node [shape=record];")?;
        let mut next = 0;
        Self::dot_node(&self.root, out, &mut next)?;
        writeln!(out, "}}")
    }

    fn dot_node<W: Write>(node: &Node<K, V>, out: &mut W, next: &mut usize) -> fmt::Result
    where
        K: Display,
        V: Display,
    {
        let id = *next;
        *next += 1;

        if node.is_leaf() {
            if node.len() == 0 {
                return Ok(());
            }
            let label = node
                .keys
                .iter()
                .zip(node.vals.iter())
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join("|");
            return writeln!(out, " n{}[label=\"{}\"]", id, label);
        }

        let mut label = "<c0>".to_string();
        for (i, (k, v)) in node.keys.iter().zip(node.vals.iter()).enumerate() {
            write!(label, "|{}:{}|<c{}>", k, v, i + 1)?;
        }
        writeln!(out, " n{}[label=\"{}\"]", id, label)?;

        for (j, child) in node.children.iter().enumerate() {
            let child_id = *next;
            Self::dot_node(child, out, next)?;
            writeln!(out, " n{}:c{} -> n{}", id, j, child_id)?;
        }
        Ok(())
    }

    fn split_root(&mut self) {
        let root = mem::replace(&mut self.root, Box::new(Node::create(self.t)));
        self.root.children.append(root);
        self.root.split_child(0, self.t);
        debug!("root split: height={}", self.height());
    }

    fn insert_non_full<F>(node: &mut Node<K, V>, key: K, val: V, cmp: &F, t: usize) -> Option<V>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let mut i = node.find(&key, cmp);
        if node.holds(i, &key, cmp) {
            return Some(node.vals.replace_at(i, val));
        }

        if node.is_leaf() {
            node.keys.insert_at(i, key);
            node.vals.insert_at(i, val);
            return None;
        }

        if node.child(i).is_full(t) {
            node.split_child(i, t);
            // The promoted median decides which half the key belongs to.
            match cmp(&key, node.keys.at(i)) {
                Ordering::Greater => i += 1,
                Ordering::Equal => return Some(node.vals.replace_at(i, val)),
                Ordering::Less => {}
            }
        }
        Self::insert_non_full(node.child_mut(i), key, val, cmp, t)
    }

    fn remove_from<Q, F>(
        slot: &mut Box<Node<K, V>>,
        key: &Q,
        cmp: &F,
        t: usize,
    ) -> Option<(K, V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        let i = slot.find(key, cmp);
        if slot.holds(i, key, cmp) {
            if slot.is_leaf() {
                return Some(Self::delete_from_leaf(slot, i));
            }
            return Self::delete_from_internal(slot, key, i, cmp, t);
        }
        if slot.is_leaf() {
            return None;
        }
        Self::delete_from_subtree(slot, key, i, cmp, t)
    }

    fn delete_from_leaf(node: &mut Node<K, V>, i: usize) -> (K, V) {
        (node.keys.delete_at(i), node.vals.delete_at(i))
    }

    /// The key sits at `i` of an internal node: swap in the predecessor or the
    /// successor if the child it comes from can spare an entry, otherwise
    /// merge both children around the key and continue in the merged node.
    fn delete_from_internal<Q, F>(
        slot: &mut Box<Node<K, V>>,
        key: &Q,
        i: usize,
        cmp: &F,
        t: usize,
    ) -> Option<(K, V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        if slot.child(i).len() >= t {
            let (k, v) = Self::remove_last(slot.child_mut(i), t);
            return Some(Self::substitute(slot, i, k, v));
        }
        if slot.child(i + 1).len() >= t {
            let (k, v) = Self::remove_first(slot.child_mut(i + 1), t);
            return Some(Self::substitute(slot, i, k, v));
        }
        slot.merge(i);
        let next = Self::descend(slot, i);
        Self::remove_from(next, key, cmp, t)
    }

    /// The key is not in this internal node: make sure child `i` can lose an
    /// entry before recursing into it.
    fn delete_from_subtree<Q, F>(
        slot: &mut Box<Node<K, V>>,
        key: &Q,
        i: usize,
        cmp: &F,
        t: usize,
    ) -> Option<(K, V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        let i = Self::fill(slot, i, t);
        let next = Self::descend(slot, i);
        Self::remove_from(next, key, cmp, t)
    }

    /// Remove the in-order predecessor: the rightmost entry of the subtree.
    fn remove_last(slot: &mut Box<Node<K, V>>, t: usize) -> (K, V) {
        let n = slot.len();
        if slot.is_leaf() {
            return Self::delete_from_leaf(slot, n - 1);
        }
        let i = Self::fill(slot, n, t);
        let next = Self::descend(slot, i);
        Self::remove_last(next, t)
    }

    /// Remove the in-order successor: the leftmost entry of the subtree.
    fn remove_first(slot: &mut Box<Node<K, V>>, t: usize) -> (K, V) {
        if slot.is_leaf() {
            return Self::delete_from_leaf(slot, 0);
        }
        let i = Self::fill(slot, 0, t);
        let next = Self::descend(slot, i);
        Self::remove_first(next, t)
    }

    fn substitute(node: &mut Node<K, V>, i: usize, key: K, val: V) -> (K, V) {
        (node.keys.replace_at(i, key), node.vals.replace_at(i, val))
    }

    /// Top up child `i` to at least `t` keys, stealing from the left sibling,
    /// then the right one, and merging (left preferred) when neither can
    /// spare an entry. Returns the index of the child holding the range
    /// that `i` covered.
    fn fill(node: &mut Node<K, V>, i: usize, t: usize) -> usize {
        if node.child(i).len() >= t {
            return i;
        }
        if i > 0 && node.child(i - 1).len() >= t {
            node.steal_prev(i);
            return i;
        }
        if i < node.len() && node.child(i + 1).len() >= t {
            node.steal_next(i);
            return i;
        }
        if i > 0 {
            node.merge(i - 1);
            i - 1
        } else {
            node.merge(i);
            i
        }
    }

    /// Step into child `i`, or, when a merge just drained the (root) node,
    /// promote its only child into the slot and stay there.
    fn descend(slot: &mut Box<Node<K, V>>, i: usize) -> &mut Box<Node<K, V>> {
        if slot.len() == 0 {
            let child = slot.children.delete_at(0);
            *slot = child;
            debug!("root collapse: len={}", slot.len());
            slot
        } else {
            slot.child_mut(i)
        }
    }
}

impl<K, V> Tree<K, V> for BTree<K, V> {
    fn search_by<Q, F>(&self, key: &Q, cmp: F) -> Option<&V>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        let mut node: &Node<K, V> = &self.root;
        loop {
            let i = node.find(key, &cmp);
            if node.holds(i, key, &cmp) {
                return Some(node.vals.at(i));
            }
            if node.is_leaf() {
                return None;
            }
            node = node.child(i);
        }
    }

    fn insert_by<F>(&mut self, key: K, val: V, cmp: F) -> Option<V>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        if self.root.is_full(self.t) {
            self.split_root();
        }
        let old = Self::insert_non_full(&mut self.root, key, val, &cmp, self.t);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    fn remove_by<Q, F>(&mut self, key: &Q, cmp: F) -> Option<(K, V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        // Absent keys must not trigger rebalancing on the way down.
        if self.search_by(key, &cmp).is_none() {
            return None;
        }
        let removed = Self::remove_from(&mut self.root, key, &cmp, self.t);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn degree(&self) -> usize {
        self.t
    }

    fn height(&self) -> usize {
        let mut node: &Node<K, V> = &self.root;
        let mut height = 1;
        while !node.is_leaf() {
            node = node.child(0);
            height += 1;
        }
        height
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord, V> BTree<K, V> {
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search_by(key, |a, b| a.cmp(b.borrow()))
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        self.insert_by(key, val, Ord::cmp)
    }

    /// Remove a key, telling whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Remove a key, handing back its value.
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_by(key, |a, b| a.cmp(b.borrow()))
            .map(|(_, v)| v)
    }

    pub fn above<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.above_by(key, |a, b| a.cmp(b.borrow()))
    }

    pub fn below<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.below_by(key, |a, b| a.cmp(b.borrow()))
    }

    pub fn check(&self) -> Result<()> {
        self.check_by(Ord::cmp)
    }
}

impl<K, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> Debug for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a BTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over the entries of a `BTree`.
pub struct Iter<'a, K, V> {
    stack: Vec<(&'a Node<K, V>, usize)>,
    left: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: &'a Node<K, V>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(8),
            left: len,
        };
        iter.descend(root);
        iter
    }

    fn descend(&mut self, mut node: &'a Node<K, V>) {
        loop {
            self.stack.push((node, 0));
            if node.is_leaf() {
                break;
            }
            node = node.child(0);
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let (node, idx) = *top;
            if idx < node.len() {
                top.1 += 1;
                if !node.is_leaf() {
                    self.descend(node.child(idx + 1));
                }
                self.left -= 1;
                return Some((node.keys.at(idx), node.vals.at(idx)));
            }
            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
