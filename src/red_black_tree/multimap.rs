use crate::error::Result;
use crate::red_black_tree::compare::{Compare, Natural};
use crate::red_black_tree::iter::{IntoIter, Iter};
use crate::red_black_tree::tree::RedBlackTree;

/// An ordered multimap implemented using a red black tree.
///
/// Every insertion adds a new entry. Entries with equivalent keys are kept in insertion order.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackMultimap;
///
/// let mut map = RedBlackMultimap::new();
/// map.insert("a", 1).unwrap();
/// map.insert("b", 2).unwrap();
/// map.insert("a", 3).unwrap();
///
/// assert_eq!(map.count(&"a"), 2);
/// assert_eq!(map.get_all(&"a").map(|pair| *pair.1).collect::<Vec<_>>(), vec![1, 3]);
///
/// assert_eq!(map.remove_all(&"a"), 2);
/// assert_eq!(map.len(), 1);
/// ```
pub struct RedBlackMultimap<K, V, C = Natural> {
    tree: RedBlackTree<K, V, C>,
}

impl<K, V> RedBlackMultimap<K, V, Natural> {
    /// Constructs a new, empty `RedBlackMultimap<K, V>`.
    pub fn new() -> Self {
        RedBlackMultimap {
            tree: RedBlackTree::new(),
        }
    }
}

impl<K, V, C> RedBlackMultimap<K, V, C> {
    /// Constructs a new, empty multimap ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        RedBlackMultimap {
            tree: RedBlackTree::with_comparator(compare),
        }
    }

    /// Returns the number of entries in the multimap.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multimap is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the multimap, removing all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns an iterator over the multimap in key order.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        self.tree.iter()
    }

    /// Returns the underlying tree.
    pub fn tree(&self) -> &RedBlackTree<K, V, C> {
        &self.tree
    }
}

impl<K, V, C> RedBlackMultimap<K, V, C>
where
    C: Compare<K>,
{
    /// Inserts a key-value pair after every entry with an equivalent key.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.tree.insert_equal(key, value).map(|_| ())
    }

    /// Returns the number of entries with a key equivalent to `key`.
    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    /// Checks if a key exists in the multimap.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Returns an iterator over the entries with a key equivalent to `key`, in insertion order.
    pub fn get_all(&self, key: &K) -> Iter<'_, K, V, C> {
        let (first, last) = self.tree.equal_range(key);
        self.tree.range(first, last)
    }

    /// Removes every entry with a key equivalent to `key` and returns how many were removed.
    pub fn remove_all(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
    }
}

impl<K, V> Default for RedBlackMultimap<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> IntoIterator for RedBlackMultimap<K, V, C> {
    type IntoIter = IntoIter<K, V, C>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RedBlackMultimap<K, V, C>
where
    K: 'a,
    V: 'a,
{
    type IntoIter = Iter<'a, K, V, C>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
