use crate::mem::slice::Slice;
use crate::util::bsearch::partition;
use log::trace;
use std::cmp::Ordering;

/// A single B-tree node: sorted keys, their values, and (for internal nodes)
/// one more child than keys.
pub(crate) struct Node<K, V> {
    pub(crate) keys: Slice<K>,
    pub(crate) vals: Slice<V>,
    pub(crate) children: Slice<Box<Node<K, V>>>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(t: usize) -> Self {
        Self {
            keys: Slice::make(2 * t - 1),
            vals: Slice::make(2 * t - 1),
            children: Slice::make(2 * t),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of keys held by the node.
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_full(&self, t: usize) -> bool {
        self.len() == 2 * t - 1
    }

    /// Smallest index `i` such that `key <= keys[i]`, or `len()` if `key` is
    /// greater than every key in the node.
    pub(crate) fn find<Q, F>(&self, key: &Q, cmp: &F) -> usize
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        partition(self.len(), |i| cmp(key, self.keys.at(i)) == Ordering::Greater)
    }

    /// Whether `keys[i]` exists and equals `key`.
    pub(crate) fn holds<Q, F>(&self, i: usize, key: &Q, cmp: &F) -> bool
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering,
    {
        i < self.len() && cmp(key, self.keys.at(i)) == Ordering::Equal
    }

    pub(crate) fn child(&self, i: usize) -> &Node<K, V> {
        self.children.at(i)
    }

    pub(crate) fn child_mut(&mut self, i: usize) -> &mut Box<Node<K, V>> {
        self.children.at_mut(i)
    }

    /// Split the full child `i` in two around its median, which moves up
    /// into this node at position `i`. The upper half lands in a new
    /// sibling at child position `i + 1`.
    pub(crate) fn split_child(&mut self, i: usize, t: usize) {
        let mut sibling = Box::new(Node::create(t));

        let child = self.children.at_mut(i);
        assert!(
            child.is_full(t),
            "split of non-full child: len={} t={}",
            child.len(),
            t
        );

        sibling.keys.extend(child.keys.rewind(t - 1));
        sibling.vals.extend(child.vals.rewind(t - 1));
        if !child.is_leaf() {
            sibling.children.extend(child.children.rewind(t));
        }

        // After the upper half is gone, the median is the last entry left.
        let key = child.keys.take_last();
        let val = child.vals.take_last();

        self.keys.insert_at(i, key);
        self.vals.insert_at(i, val);
        self.children.insert_at(i + 1, sibling);
        trace!("split: child={} len={}", i, self.len());
    }

    /// Merge child `i + 1` and the separator entry `i` into child `i`.
    /// The absorbed child is dropped.
    pub(crate) fn merge(&mut self, i: usize) {
        let victim = self.children.delete_at(i + 1);
        let key = self.keys.delete_at(i);
        let val = self.vals.delete_at(i);

        let Node {
            keys,
            vals,
            children,
        } = *victim;

        let target = self.children.at_mut(i);
        target.keys.append(key);
        target.vals.append(val);
        target.keys.extend(keys);
        target.vals.extend(vals);
        target.children.extend(children);
        trace!("merge: child={} len={}", i, target.len());
    }

    /// Rotate one entry from child `i - 1` through the separator into the
    /// front of child `i`.
    pub(crate) fn steal_prev(&mut self, i: usize) {
        let prev = self.children.at_mut(i - 1);
        let key = prev.keys.take_last();
        let val = prev.vals.take_last();
        let child = if prev.is_leaf() {
            None
        } else {
            Some(prev.children.take_last())
        };

        let key = self.keys.replace_at(i - 1, key);
        let val = self.vals.replace_at(i - 1, val);

        let curr = self.children.at_mut(i);
        curr.keys.insert_at(0, key);
        curr.vals.insert_at(0, val);
        if let Some(child) = child {
            curr.children.insert_at(0, child);
        }
        trace!("steal prev: child={}", i);
    }

    /// Rotate one entry from child `i + 1` through the separator onto the
    /// back of child `i`.
    pub(crate) fn steal_next(&mut self, i: usize) {
        let next = self.children.at_mut(i + 1);
        let key = next.keys.delete_at(0);
        let val = next.vals.delete_at(0);
        let child = if next.is_leaf() {
            None
        } else {
            Some(next.children.delete_at(0))
        };

        let key = self.keys.replace_at(i, key);
        let val = self.vals.replace_at(i, val);

        let curr = self.children.at_mut(i);
        curr.keys.append(key);
        curr.vals.append(val);
        if let Some(child) = child {
            curr.children.append(child);
        }
        trace!("steal next: child={}", i);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn leaf(t: usize, keys: &[i32]) -> Box<Node<i32, i32>> {
        let mut node = Box::new(Node::create(t));
        node.keys.extend(keys.iter().copied());
        node.vals.extend(keys.iter().map(|k| k * 10));
        node
    }

    pub(crate) fn internal(
        t: usize,
        keys: &[i32],
        children: Vec<Box<Node<i32, i32>>>,
    ) -> Box<Node<i32, i32>> {
        let mut node = leaf(t, keys);
        node.children.extend(children);
        node
    }

    fn keys(node: &Node<i32, i32>) -> Vec<i32> {
        node.keys.iter().copied().collect()
    }

    fn vals(node: &Node<i32, i32>) -> Vec<i32> {
        node.vals.iter().copied().collect()
    }

    #[test]
    fn test_find() {
        let node = leaf(3, &[10, 20, 30, 40]);
        let cmp = |a: &i32, b: &i32| a.cmp(b);
        assert_eq!(node.find(&5, &cmp), 0);
        assert_eq!(node.find(&10, &cmp), 0);
        assert_eq!(node.find(&11, &cmp), 1);
        assert_eq!(node.find(&30, &cmp), 2);
        assert_eq!(node.find(&45, &cmp), 4);

        assert!(node.holds(2, &30, &cmp));
        assert!(!node.holds(1, &30, &cmp));
        assert!(!node.holds(4, &45, &cmp));

        let empty: Node<i32, i32> = Node::create(2);
        assert_eq!(empty.find(&1, &cmp), 0);
        assert!(empty.is_leaf());
    }

    #[test]
    fn test_find_matches_linear_scan() {
        let node = leaf(4, &[1, 3, 5, 7, 9, 11, 13]);
        let cmp = |a: &i32, b: &i32| a.cmp(b);
        for key in 0..15 {
            let scan = node.keys.iter().take_while(|k| key > **k).count();
            assert_eq!(node.find(&key, &cmp), scan, "key={}", key);
        }
    }

    #[test]
    fn test_split_leaf_child() {
        let t = 3;
        let mut parent = internal(t, &[100], vec![leaf(t, &[1, 2, 3, 4, 5]), leaf(t, &[200])]);

        parent.split_child(0, t);

        assert_eq!(keys(&parent), vec![3, 100]);
        assert_eq!(vals(&parent), vec![30, 1000]);
        assert_eq!(parent.children.len(), 3);
        assert_eq!(keys(parent.child(0)), vec![1, 2]);
        assert_eq!(keys(parent.child(1)), vec![4, 5]);
        assert_eq!(vals(parent.child(1)), vec![40, 50]);
        assert_eq!(keys(parent.child(2)), vec![200]);
        assert!(parent.child(1).is_leaf());
        assert_eq!(parent.child(1).keys.cap(), 2 * t - 1);
    }

    #[test]
    fn test_split_internal_child() {
        let t = 2;
        let full = internal(
            t,
            &[10, 20, 30],
            vec![leaf(t, &[5]), leaf(t, &[15]), leaf(t, &[25]), leaf(t, &[35])],
        );
        let mut root = internal(t, &[], vec![full]);

        root.split_child(0, t);

        assert_eq!(keys(&root), vec![20]);
        let left = root.child(0);
        let right = root.child(1);
        assert_eq!(keys(left), vec![10]);
        assert_eq!(keys(right), vec![30]);
        assert_eq!(left.children.len(), 2);
        assert_eq!(right.children.len(), 2);
        assert_eq!(keys(left.child(1)), vec![15]);
        assert_eq!(keys(right.child(0)), vec![25]);
    }

    #[test]
    #[should_panic(expected = "split of non-full child")]
    fn test_split_not_full() {
        let t = 3;
        let mut parent = internal(t, &[], vec![leaf(t, &[1, 2])]);
        parent.split_child(0, t);
    }

    #[test]
    fn test_merge() {
        let t = 2;
        let mut parent = internal(
            t,
            &[10, 20],
            vec![leaf(t, &[5]), leaf(t, &[15]), leaf(t, &[25])],
        );

        parent.merge(0);

        assert_eq!(keys(&parent), vec![20]);
        assert_eq!(parent.children.len(), 2);
        assert_eq!(keys(parent.child(0)), vec![5, 10, 15]);
        assert_eq!(vals(parent.child(0)), vec![50, 100, 150]);
        assert_eq!(keys(parent.child(1)), vec![25]);
    }

    #[test]
    fn test_merge_internal() {
        let t = 2;
        let left = internal(t, &[5], vec![leaf(t, &[1]), leaf(t, &[7])]);
        let right = internal(t, &[15], vec![leaf(t, &[12]), leaf(t, &[17])]);
        let mut parent = internal(t, &[10], vec![left, right]);

        parent.merge(0);

        assert_eq!(parent.len(), 0);
        assert_eq!(parent.children.len(), 1);
        let merged = parent.child(0);
        assert_eq!(keys(merged), vec![5, 10, 15]);
        assert_eq!(
            merged.children.iter().map(|c| keys(c)).collect::<Vec<_>>(),
            vec![vec![1], vec![7], vec![12], vec![17]]
        );
    }

    #[test]
    fn test_steal_prev() {
        let t = 2;
        let mut parent = internal(t, &[10], vec![leaf(t, &[1, 5]), leaf(t, &[15])]);

        parent.steal_prev(1);

        assert_eq!(keys(&parent), vec![5]);
        assert_eq!(vals(&parent), vec![50]);
        assert_eq!(keys(parent.child(0)), vec![1]);
        assert_eq!(keys(parent.child(1)), vec![10, 15]);
        assert_eq!(vals(parent.child(1)), vec![100, 150]);
    }

    #[test]
    fn test_steal_prev_internal() {
        let t = 2;
        let prev = internal(
            t,
            &[3, 6],
            vec![leaf(t, &[1]), leaf(t, &[4]), leaf(t, &[8])],
        );
        let curr = internal(t, &[15], vec![leaf(t, &[12]), leaf(t, &[17])]);
        let mut parent = internal(t, &[10], vec![prev, curr]);

        parent.steal_prev(1);

        assert_eq!(keys(&parent), vec![6]);
        assert_eq!(keys(parent.child(0)), vec![3]);
        assert_eq!(parent.child(0).children.len(), 2);
        let curr = parent.child(1);
        assert_eq!(keys(curr), vec![10, 15]);
        assert_eq!(
            curr.children.iter().map(|c| keys(c)).collect::<Vec<_>>(),
            vec![vec![8], vec![12], vec![17]]
        );
    }

    #[test]
    fn test_steal_next() {
        let t = 2;
        let mut parent = internal(t, &[10], vec![leaf(t, &[5]), leaf(t, &[15, 20])]);

        parent.steal_next(0);

        assert_eq!(keys(&parent), vec![15]);
        assert_eq!(keys(parent.child(0)), vec![5, 10]);
        assert_eq!(keys(parent.child(1)), vec![20]);
    }

    #[test]
    fn test_steal_next_internal() {
        let t = 2;
        let curr = internal(t, &[5], vec![leaf(t, &[1]), leaf(t, &[7])]);
        let next = internal(
            t,
            &[15, 20],
            vec![leaf(t, &[12]), leaf(t, &[17]), leaf(t, &[25])],
        );
        let mut parent = internal(t, &[10], vec![curr, next]);

        parent.steal_next(0);

        assert_eq!(keys(&parent), vec![15]);
        let curr = parent.child(0);
        assert_eq!(keys(curr), vec![5, 10]);
        assert_eq!(
            curr.children.iter().map(|c| keys(c)).collect::<Vec<_>>(),
            vec![vec![1], vec![7], vec![12]]
        );
        assert_eq!(keys(parent.child(1)), vec![20]);
        assert_eq!(parent.child(1).children.len(), 2);
    }
}
