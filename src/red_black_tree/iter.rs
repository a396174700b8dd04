use crate::red_black_tree::tree::{Position, RedBlackTree};

/// An iterator over a span of positions of a `RedBlackTree<K, V, C>`.
///
/// This iterator traverses `[front, back)` in key order and yields immutable references.
pub struct Iter<'a, K, V, C> {
    tree: &'a RedBlackTree<K, V, C>,
    front: Position,
    back: Position,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    pub(crate) fn new(tree: &'a RedBlackTree<K, V, C>, front: Position, back: Position) -> Self {
        Iter { tree, front, back }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C>
where
    K: 'a,
    V: 'a,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let tree: &'a RedBlackTree<K, V, C> = self.tree;
        let entry = self.front.0?;
        self.front = tree.next(self.front);
        let node = tree.node(entry);
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C>
where
    K: 'a,
    V: 'a,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let tree: &'a RedBlackTree<K, V, C> = self.tree;
        self.back = tree.prev(self.back);
        let node = tree.node(self.back.0?);
        Some((&node.key, &node.value))
    }
}

/// An owning iterator for `RedBlackTree<K, V, C>`.
///
/// This iterator traverses the elements of the tree in key order and yields owned pairs. The
/// configured destructors do not run on yielded pairs; pairs left in the iterator when it is
/// dropped are destroyed as if the tree were cleared.
pub struct IntoIter<K, V, C> {
    tree: RedBlackTree<K, V, C>,
}

impl<K, V, C> Iterator for IntoIter<K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.tree.begin();
        if position.is_end() {
            None
        } else {
            Some(self.tree.remove(position))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V, C> DoubleEndedIterator for IntoIter<K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let position = self.tree.prev(self.tree.end());
        if position.is_end() {
            None
        } else {
            Some(self.tree.remove(position))
        }
    }
}

impl<K, V, C> ExactSizeIterator for IntoIter<K, V, C> {}

impl<K, V, C> IntoIterator for RedBlackTree<K, V, C> {
    type IntoIter = IntoIter<K, V, C>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RedBlackTree<K, V, C>
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

#[cfg(test)]
mod tests {
    use crate::red_black_tree::{Builder, RedBlackTree};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_iter_both_ends() {
        let mut tree = RedBlackTree::new();
        for key in &[3, 1, 2, 5, 4] {
            tree.insert_unique(*key, *key * 2).unwrap();
        }

        let mut iterator = tree.iter();
        assert_eq!(iterator.next(), Some((&1, &2)));
        assert_eq!(iterator.next_back(), Some((&5, &10)));
        assert_eq!(iterator.next(), Some((&2, &4)));
        assert_eq!(iterator.next_back(), Some((&4, &8)));
        assert_eq!(iterator.next(), Some((&3, &6)));
        assert_eq!(iterator.next(), None);
        assert_eq!(iterator.next_back(), None);
    }

    #[test]
    fn test_range() {
        let mut tree = RedBlackTree::new();
        for key in 0..10 {
            tree.insert_unique(key, ()).unwrap();
        }
        let first = tree.lower_bound(&3);
        let last = tree.upper_bound(&6);
        let keys: Vec<&u32> = tree.range(first, last).map(|(key, _)| key).collect();
        assert_eq!(keys, vec![&3, &4, &5, &6]);
        assert_eq!(tree.range(first, first).count(), 0);
        assert_eq!(tree.range(first, tree.end()).rev().count(), 7);
    }

    #[test]
    fn test_into_iter() {
        let mut tree = RedBlackTree::new();
        for key in &[2, 3, 1] {
            tree.insert_unique(*key, ()).unwrap();
        }
        let mut iterator = tree.into_iter();
        assert_eq!(iterator.len(), 3);
        assert_eq!(iterator.next_back(), Some((3, ())));
        assert_eq!(iterator.collect::<Vec<(u32, ())>>(), vec![(1, ()), (2, ())]);
    }

    #[test]
    fn test_into_iter_drop_destroys_rest() {
        let destroyed = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&destroyed);
        let mut tree = Builder::new()
            .key_destroy(move |key: u32| log.borrow_mut().push(key))
            .build();
        for key in 0..4 {
            tree.insert_unique(key, ()).unwrap();
        }

        let mut iterator = tree.into_iter();
        assert_eq!(iterator.next(), Some((0, ())));
        drop(iterator);

        let mut destroyed = destroyed.borrow().clone();
        destroyed.sort();
        assert_eq!(destroyed, vec![1, 2, 3]);
    }

    #[test]
    fn test_ref_into_iter() {
        let mut tree = RedBlackTree::new();
        tree.insert_equal(1, 'a').unwrap();
        tree.insert_equal(1, 'b').unwrap();
        let mut values = Vec::new();
        for (_, value) in &tree {
            values.push(*value);
        }
        assert_eq!(values, vec!['a', 'b']);
    }
}
