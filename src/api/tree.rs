use std::cmp::Ordering;

/// Comparator-driven ordered map operations.
///
/// The comparator receives the given key first and the stored key second, and
/// must return a consistent three-way ordering; the tree itself embeds no
/// ordering logic.
pub trait Tree<K, V> {
    fn search_by<Q, F>(&self, key: &Q, cmp: F) -> Option<&V>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering;

    /// Insert a key-value pair, returning the previous value if the key was present.
    fn insert_by<F>(&mut self, key: K, val: V, cmp: F) -> Option<V>
    where
        F: Fn(&K, &K) -> Ordering;

    /// Remove a key, returning the stored entry if the key was present.
    fn remove_by<Q, F>(&mut self, key: &Q, cmp: F) -> Option<(K, V)>
    where
        Q: ?Sized,
        F: Fn(&Q, &K) -> Ordering;

    /// Minimum degree `t`: every non-root node holds between `t-1` and `2t-1` keys.
    fn degree(&self) -> usize;

    /// Number of levels, a lone root counts as one.
    fn height(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
