use crate::error::Result;
use crate::red_black_tree::compare::{Compare, Natural};
use crate::red_black_tree::iter::{IntoIter, Iter};
use crate::red_black_tree::tree::{InsertOutcome, RedBlackTree};

/// An ordered map implemented using a red black tree.
///
/// Keys are unique: `insert` only inserts absent keys, while `set` replaces the value of a
/// present key.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackMap;
///
/// let mut map = RedBlackMap::new();
/// map.insert(0, 1).unwrap();
/// map.insert(3, 4).unwrap();
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// *map.get_mut(&0).unwrap() = 2;
/// assert_eq!(map.remove(&0), Some((0, 2)));
/// assert_eq!(map.remove(&1), None);
/// ```
pub struct RedBlackMap<K, V, C = Natural> {
    tree: RedBlackTree<K, V, C>,
}

impl<K, V> RedBlackMap<K, V, Natural> {
    /// Constructs a new, empty `RedBlackMap<K, V>`.
    pub fn new() -> Self {
        RedBlackMap {
            tree: RedBlackTree::new(),
        }
    }
}

impl<K, V, C> RedBlackMap<K, V, C> {
    /// Constructs a new, empty map ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        RedBlackMap {
            tree: RedBlackTree::with_comparator(compare),
        }
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the map, removing all values.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    pub fn min(&self) -> Option<&K> {
        self.tree.first().map(|pair| pair.0)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    pub fn max(&self) -> Option<&K> {
        self.tree.last().map(|pair| pair.0)
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs in key order.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        self.tree.iter()
    }

    /// Returns the underlying tree.
    pub fn tree(&self) -> &RedBlackTree<K, V, C> {
        &self.tree
    }
}

impl<K, V, C> RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    /// Inserts a key-value pair if the key is absent. If the key is present, the map is
    /// unchanged and the pair is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// assert_eq!(map.insert(1, 1).unwrap(), None);
    /// assert_eq!(map.insert(1, 2).unwrap(), Some((1, 2)));
    /// assert_eq!(map[&1], 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<(K, V)>> {
        match self.tree.insert_unique(key, value)? {
            InsertOutcome::Inserted(_) => Ok(None),
            InsertOutcome::Present { key, value, .. } => Ok(Some((key, value))),
        }
    }

    /// Sets the value of a key, inserting the key if it is absent. Returns the previous value if
    /// the key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// assert_eq!(map.set(1, 1).unwrap(), None);
    /// assert_eq!(map.set(1, 2).unwrap(), Some(1));
    /// assert_eq!(map[&1], 2);
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.tree.insert_unique(key, value)? {
            InsertOutcome::Inserted(_) => Ok(None),
            InsertOutcome::Present {
                position, value, ..
            } => Ok(Some(self.tree.assign(position, value))),
        }
    }

    /// Removes a key from the map. If the key exists in the map, it will return the associated
    /// key and value. Otherwise it will return `None`.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let position = self.tree.find(key);
        if position.is_end() {
            None
        } else {
            Some(self.tree.remove(position))
        }
    }

    /// Checks if a key exists in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(self.tree.find(key)).map(|pair| pair.1)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let position = self.tree.find(key);
        self.tree.get_mut(position).map(|pair| pair.1)
    }

    /// Returns a key in the map that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    pub fn ceil(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.lower_bound(key)).map(|pair| pair.0)
    }

    /// Returns a key in the map that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    pub fn floor(&self, key: &K) -> Option<&K> {
        let position = self.tree.prev(self.tree.upper_bound(key));
        self.tree.get(position).map(|pair| pair.0)
    }
}

impl<K, V> Default for RedBlackMap<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> IntoIterator for RedBlackMap<K, V, C> {
    type IntoIter = IntoIter<K, V, C>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RedBlackMap<K, V, C>
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

impl<'a, K, V, C> std::ops::Index<&'a K> for RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    type Output = V;

    fn index(&self, key: &K) -> &Self::Output {
        self.get(key).expect("Error: key does not exist.")
    }
}
