use crate::arena::{Entry, TypedArena};
use crate::error::{Result, Violation};
use crate::red_black_tree::compare::{Compare, Natural};
use crate::red_black_tree::iter::Iter;
use crate::red_black_tree::node::{Color, Node};
use log::{debug, trace};
use std::fmt;
use std::mem;
use std::result;

const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A callback that takes ownership of a key or value when its node is destroyed.
pub type Destructor<T> = Box<dyn FnMut(T)>;

/// An opaque handle to a node of a `RedBlackTree`, or to the end of the tree.
///
/// A position stays valid until the node it refers to is erased. Insertions and the erasure of
/// other nodes never move a node, so positions to surviving nodes keep referring to the same
/// key and value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Position(pub(crate) Option<Entry>);

impl Position {
    /// Returns `true` if this is the past-the-end position.
    pub fn is_end(&self) -> bool {
        self.0.is_none()
    }
}

/// The result of `RedBlackTree::insert_unique`.
#[derive(Debug)]
pub enum InsertOutcome<K, V> {
    /// The pair was inserted at the given position.
    Inserted(Position),
    /// An equivalent key is already present at `position`. The rejected key and value are
    /// handed back to the caller.
    Present { position: Position, key: K, value: V },
}

impl<K, V> InsertOutcome<K, V> {
    /// Returns the position of the new node, or of the equivalent node that blocked insertion.
    pub fn position(&self) -> Position {
        match self {
            InsertOutcome::Inserted(position) => *position,
            InsertOutcome::Present { position, .. } => *position,
        }
    }

    /// Returns `true` if a new node was inserted.
    pub fn is_inserted(&self) -> bool {
        match self {
            InsertOutcome::Inserted(_) => true,
            InsertOutcome::Present { .. } => false,
        }
    }
}

/// Configures and constructs a `RedBlackTree`.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::Builder;
///
/// let mut tree = Builder::new()
///     .comparator(|a: &u32, b: &u32| a > b)
///     .chunk_size(64)
///     .build();
/// tree.insert_equal(1, "a").unwrap();
/// tree.insert_equal(2, "b").unwrap();
///
/// assert_eq!(tree.key(tree.begin()), &2);
/// ```
pub struct Builder<K, V, C = Natural> {
    compare: C,
    key_destroy: Option<Destructor<K>>,
    value_destroy: Option<Destructor<V>>,
    chunk_size: usize,
}

impl<K, V> Builder<K, V, Natural> {
    /// Constructs a builder for a tree ordered by `PartialOrd` with no destructors.
    pub fn new() -> Self {
        Builder {
            compare: Natural,
            key_destroy: None,
            value_destroy: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl<K, V> Default for Builder<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Builder<K, V, C> {
    /// Sets the less-than predicate that orders keys.
    pub fn comparator<D>(self, compare: D) -> Builder<K, V, D> {
        Builder {
            compare,
            key_destroy: self.key_destroy,
            value_destroy: self.value_destroy,
            chunk_size: self.chunk_size,
        }
    }

    /// Sets a callback that receives every key whose node is erased or cleared.
    pub fn key_destroy<F>(mut self, destroy: F) -> Self
    where
        F: FnMut(K) + 'static,
    {
        self.key_destroy = Some(Box::new(destroy));
        self
    }

    /// Sets a callback that receives every value whose node is erased or cleared.
    pub fn value_destroy<F>(mut self, destroy: F) -> Self
    where
        F: FnMut(V) + 'static,
    {
        self.value_destroy = Some(Box::new(destroy));
        self
    }

    /// Sets the number of nodes allocated per arena chunk.
    ///
    /// # Panics
    ///
    /// `build` panics if `chunk_size` is zero.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Constructs an empty tree with this configuration.
    pub fn build(self) -> RedBlackTree<K, V, C> {
        RedBlackTree {
            arena: TypedArena::new(self.chunk_size),
            root: None,
            leftmost: None,
            rightmost: None,
            len: 0,
            compare: self.compare,
            key_destroy: self.key_destroy,
            value_destroy: self.value_destroy,
        }
    }
}

/// A red black tree whose nodes are addressed by stable positions.
///
/// The tree orders keys with a strict less-than predicate and can hold either unique keys
/// (`insert_unique`) or duplicate keys (`insert_equal`), in which case equal keys iterate in
/// insertion order. Nodes live in a typed arena; `root`, `leftmost` and `rightmost` are cached so
/// both ends of the tree are reachable in constant time.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// tree.insert_unique(3, "c").unwrap();
/// tree.insert_unique(1, "a").unwrap();
/// assert!(!tree.insert_unique(1, "z").unwrap().is_inserted());
///
/// let position = tree.find(&1);
/// assert_eq!(tree.value(position), &"a");
/// assert_eq!(tree.next(position), tree.find(&3));
///
/// tree.erase(position);
/// assert_eq!(tree.len(), 1);
/// assert!(tree.verify());
/// ```
pub struct RedBlackTree<K, V, C = Natural> {
    arena: TypedArena<Node<K, V>>,
    root: Option<Entry>,
    leftmost: Option<Entry>,
    rightmost: Option<Entry>,
    len: usize,
    compare: C,
    key_destroy: Option<Destructor<K>>,
    value_destroy: Option<Destructor<V>>,
}

impl<K, V> RedBlackTree<K, V, Natural> {
    /// Constructs a new, empty `RedBlackTree<K, V>` ordered by `PartialOrd`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32, u32> = RedBlackTree::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new() -> Self {
        Builder::new().build()
    }
}

impl<K, V> Default for RedBlackTree<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RedBlackTree<K, V, C> {
    /// Constructs a new, empty tree ordered by `compare`.
    pub fn with_comparator(compare: C) -> Self {
        Builder::new().comparator(compare).build()
    }

    pub(crate) fn node(&self, entry: Entry) -> &Node<K, V> {
        &self.arena[entry]
    }

    fn node_mut(&mut self, entry: Entry) -> &mut Node<K, V> {
        &mut self.arena[entry]
    }

    fn is_red(&self, link: Option<Entry>) -> bool {
        link.map_or(false, |entry| self.node(entry).is_red())
    }

    fn set_color(&mut self, entry: Entry, color: Color) {
        self.node_mut(entry).color = color;
    }

    fn minimum(&self, mut entry: Entry) -> Entry {
        while let Some(left) = self.node(entry).left {
            entry = left;
        }
        entry
    }

    fn maximum(&self, mut entry: Entry) -> Entry {
        while let Some(right) = self.node(entry).right {
            entry = right;
        }
        entry
    }

    fn successor(&self, entry: Entry) -> Option<Entry> {
        if let Some(right) = self.node(entry).right {
            return Some(self.minimum(right));
        }
        let mut curr = entry;
        let mut parent = self.node(curr).parent;
        while let Some(parent_entry) = parent {
            if self.node(parent_entry).right != Some(curr) {
                break;
            }
            curr = parent_entry;
            parent = self.node(parent_entry).parent;
        }
        parent
    }

    fn predecessor(&self, entry: Entry) -> Option<Entry> {
        if let Some(left) = self.node(entry).left {
            return Some(self.maximum(left));
        }
        let mut curr = entry;
        let mut parent = self.node(curr).parent;
        while let Some(parent_entry) = parent {
            if self.node(parent_entry).left != Some(curr) {
                break;
            }
            curr = parent_entry;
            parent = self.node(parent_entry).parent;
        }
        parent
    }

    // Resolves a position that must refer to a live node of this tree.
    fn live(&self, position: Position) -> Entry {
        match position.0 {
            Some(entry) => {
                debug_assert!(
                    self.arena.contains(&entry),
                    "Error: position does not refer to a node of this tree.",
                );
                entry
            }
            None => panic!("Error: the end position does not refer to a node."),
        }
    }

    fn replace_child(&mut self, parent: Option<Entry>, old: Entry, new: Option<Entry>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.node_mut(parent);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, entry: Entry) {
        let child = self
            .node(entry)
            .right
            .expect("Expected right child node to be `Some`.");
        let inner = self.node(child).left;
        self.node_mut(entry).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(entry);
        }
        let parent = self.node(entry).parent;
        self.node_mut(child).parent = parent;
        self.replace_child(parent, entry, Some(child));
        self.node_mut(child).left = Some(entry);
        self.node_mut(entry).parent = Some(child);
    }

    fn rotate_right(&mut self, entry: Entry) {
        let child = self
            .node(entry)
            .left
            .expect("Expected left child node to be `Some`.");
        let inner = self.node(child).right;
        self.node_mut(entry).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(entry);
        }
        let parent = self.node(entry).parent;
        self.node_mut(child).parent = parent;
        self.replace_child(parent, entry, Some(child));
        self.node_mut(child).right = Some(entry);
        self.node_mut(entry).parent = Some(child);
    }

    fn insert_fixup(&mut self, mut curr: Entry) {
        while Some(curr) != self.root {
            let mut parent = match self.node(curr).parent {
                Some(parent) if self.node(parent).is_red() => parent,
                _ => break,
            };
            // a red parent is never the root, so the grandparent exists
            let grandparent = self
                .node(parent)
                .parent
                .expect("Expected red node to have a parent.");

            if self.node(grandparent).left == Some(parent) {
                let uncle = self.node(grandparent).right;
                match uncle {
                    Some(uncle) if self.node(uncle).is_red() => {
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(grandparent, Color::Red);
                        curr = grandparent;
                    }
                    _ => {
                        if self.node(parent).right == Some(curr) {
                            curr = parent;
                            self.rotate_left(curr);
                            parent = self
                                .node(curr)
                                .parent
                                .expect("Expected rotated node to have a parent.");
                        }
                        self.set_color(parent, Color::Black);
                        self.set_color(grandparent, Color::Red);
                        self.rotate_right(grandparent);
                    }
                }
            } else {
                let uncle = self.node(grandparent).left;
                match uncle {
                    Some(uncle) if self.node(uncle).is_red() => {
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(grandparent, Color::Red);
                        curr = grandparent;
                    }
                    _ => {
                        if self.node(parent).left == Some(curr) {
                            curr = parent;
                            self.rotate_right(curr);
                            parent = self
                                .node(curr)
                                .parent
                                .expect("Expected rotated node to have a parent.");
                        }
                        self.set_color(parent, Color::Black);
                        self.set_color(grandparent, Color::Red);
                        self.rotate_left(grandparent);
                    }
                }
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // Detaches `victim` from the tree and restores the red black invariants. A victim with two
    // children is replaced by its successor node, which keeps its identity and takes over the
    // victim's color.
    fn unlink(&mut self, victim: Entry) {
        let (left, right, parent) = {
            let node = self.node(victim);
            (node.left, node.right, node.parent)
        };
        let child;
        let child_parent;
        let removed_color;

        match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.minimum(right);
                child = self.node(successor).right;
                self.node_mut(left).parent = Some(successor);
                self.node_mut(successor).left = Some(left);
                if successor != right {
                    let successor_parent = self
                        .node(successor)
                        .parent
                        .expect("Expected successor to have a parent.");
                    if let Some(child) = child {
                        self.node_mut(child).parent = Some(successor_parent);
                    }
                    self.node_mut(successor_parent).left = child;
                    self.node_mut(successor).right = Some(right);
                    self.node_mut(right).parent = Some(successor);
                    child_parent = Some(successor_parent);
                } else {
                    child_parent = Some(successor);
                }
                self.replace_child(parent, victim, Some(successor));
                self.node_mut(successor).parent = parent;
                removed_color = self.node(successor).color;
                let victim_color = self.node(victim).color;
                self.set_color(successor, victim_color);
            }
            (left, right) => {
                child = left.or(right);
                child_parent = parent;
                if let Some(child) = child {
                    self.node_mut(child).parent = parent;
                }
                self.replace_child(parent, victim, child);
                if self.leftmost == Some(victim) {
                    self.leftmost = match child {
                        Some(child) => Some(self.minimum(child)),
                        None => parent,
                    };
                }
                if self.rightmost == Some(victim) {
                    self.rightmost = match child {
                        Some(child) => Some(self.maximum(child)),
                        None => parent,
                    };
                }
                removed_color = self.node(victim).color;
            }
        }

        if removed_color == Color::Black {
            self.erase_fixup(child, child_parent);
        }
    }

    // Resolves the missing black on the path through `curr`, whose parent is `parent` even
    // when `curr` is an empty link.
    fn erase_fixup(&mut self, mut curr: Option<Entry>, mut parent: Option<Entry>) {
        while curr != self.root && !self.is_red(curr) {
            let parent_entry = match parent {
                Some(parent_entry) => parent_entry,
                None => break,
            };

            if self.node(parent_entry).left == curr {
                let mut sibling = self.sibling(parent_entry, false);
                if self.node(sibling).is_red() {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent_entry, Color::Red);
                    self.rotate_left(parent_entry);
                    sibling = self.sibling(parent_entry, false);
                }
                let (near, far) = (self.node(sibling).left, self.node(sibling).right);
                if !self.is_red(near) && !self.is_red(far) {
                    self.set_color(sibling, Color::Red);
                    curr = Some(parent_entry);
                    parent = self.node(parent_entry).parent;
                } else {
                    if !self.is_red(far) {
                        if let Some(near) = near {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.sibling(parent_entry, false);
                    }
                    let parent_color = self.node(parent_entry).color;
                    self.set_color(sibling, parent_color);
                    self.set_color(parent_entry, Color::Black);
                    if let Some(far) = self.node(sibling).right {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_left(parent_entry);
                    break;
                }
            } else {
                let mut sibling = self.sibling(parent_entry, true);
                if self.node(sibling).is_red() {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent_entry, Color::Red);
                    self.rotate_right(parent_entry);
                    sibling = self.sibling(parent_entry, true);
                }
                let (near, far) = (self.node(sibling).right, self.node(sibling).left);
                if !self.is_red(near) && !self.is_red(far) {
                    self.set_color(sibling, Color::Red);
                    curr = Some(parent_entry);
                    parent = self.node(parent_entry).parent;
                } else {
                    if !self.is_red(far) {
                        if let Some(near) = near {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.sibling(parent_entry, true);
                    }
                    let parent_color = self.node(parent_entry).color;
                    self.set_color(sibling, parent_color);
                    self.set_color(parent_entry, Color::Black);
                    if let Some(far) = self.node(sibling).left {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_right(parent_entry);
                    break;
                }
            }
        }

        if let Some(curr) = curr {
            self.set_color(curr, Color::Black);
        }
    }

    // The sibling of a doubly black link always exists: its subtree holds at least one black.
    fn sibling(&self, parent: Entry, left: bool) -> Entry {
        let node = self.node(parent);
        let sibling = if left { node.left } else { node.right };
        sibling.expect("Expected doubly black node to have a sibling.")
    }

    fn destroy(&mut self, key: K, value: V) {
        match self.key_destroy.as_mut() {
            Some(destroy) => destroy(key),
            None => drop(key),
        }
        match self.value_destroy.as_mut() {
            Some(destroy) => destroy(value),
            None => drop(value),
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of nodes the tree can hold before its arena needs to grow.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the position of the minimum element, or `end()` if the tree is empty.
    pub fn begin(&self) -> Position {
        Position(self.leftmost)
    }

    /// Returns the past-the-end position.
    pub fn end(&self) -> Position {
        Position(None)
    }

    /// Returns the position after `position` in key order. The position after the maximum is
    /// `end()`, and `next(end())` is `end()`.
    pub fn next(&self, position: Position) -> Position {
        match position.0 {
            None => position,
            Some(_) => Position(self.successor(self.live(position))),
        }
    }

    /// Returns the position before `position` in key order. `prev(end())` is the maximum, and the
    /// position before the minimum is `end()`.
    pub fn prev(&self, position: Position) -> Position {
        match position.0 {
            None => Position(self.rightmost),
            Some(_) => Position(self.predecessor(self.live(position))),
        }
    }

    /// Returns the key at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is `end()` or its node has been erased.
    pub fn key(&self, position: Position) -> &K {
        &self.node(self.live(position)).key
    }

    /// Returns the value at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is `end()` or its node has been erased.
    pub fn value(&self, position: Position) -> &V {
        &self.node(self.live(position)).value
    }

    /// Returns a mutable reference to the value at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is `end()` or its node has been erased.
    pub fn value_mut(&mut self, position: Position) -> &mut V {
        let entry = self.live(position);
        &mut self.node_mut(entry).value
    }

    /// Returns the key-value pair at `position`, or `None` if the position is `end()` or no
    /// longer refers to a node of this tree.
    pub fn get(&self, position: Position) -> Option<(&K, &V)> {
        position
            .0
            .and_then(|entry| self.arena.get(&entry))
            .map(|node| (&node.key, &node.value))
    }

    /// Mutable counterpart of `get`.
    pub fn get_mut(&mut self, position: Position) -> Option<(&K, &mut V)> {
        match position.0 {
            Some(entry) => self
                .arena
                .get_mut(&entry)
                .map(|node| (&node.key, &mut node.value)),
            None => None,
        }
    }

    /// Returns the minimum key-value pair. Returns `None` if the tree is empty.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.get(self.begin())
    }

    /// Returns the maximum key-value pair. Returns `None` if the tree is empty.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.get(Position(self.rightmost))
    }

    /// Replaces the value at `position` and returns the previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// let position = tree.insert_equal(1, 10).unwrap();
    /// assert_eq!(tree.assign(position, 20), 10);
    /// assert_eq!(tree.value(position), &20);
    /// ```
    pub fn assign(&mut self, position: Position, value: V) -> V {
        mem::replace(self.value_mut(position), value)
    }

    /// Erases the node at `position`, running the configured destructors on its key and value,
    /// and returns the position that followed it.
    ///
    /// # Panics
    ///
    /// Panics if `position` is `end()` or its node has already been erased.
    pub fn erase(&mut self, position: Position) -> Position {
        let entry = self.live(position);
        let next = self.successor(entry);
        let Node { key, value, .. } = self.detach(entry);
        self.destroy(key, value);
        Position(next)
    }

    /// Removes the node at `position` and returns its key and value without running the
    /// configured destructors.
    ///
    /// # Panics
    ///
    /// Panics if `position` is `end()` or its node has already been erased.
    pub fn remove(&mut self, position: Position) -> (K, V) {
        let entry = self.live(position);
        let Node { key, value, .. } = self.detach(entry);
        (key, value)
    }

    fn detach(&mut self, entry: Entry) -> Node<K, V> {
        self.unlink(entry);
        self.len -= 1;
        trace!("erased node, len = {}", self.len);
        self.arena.free(&entry)
    }

    /// Erases every node in `[first, last)` in ascending order and returns how many were erased.
    pub fn erase_range(&mut self, mut first: Position, last: Position) -> usize {
        let mut count = 0;
        while first != last {
            first = self.erase(first);
            count += 1;
        }
        count
    }

    /// Removes every element, running the configured destructors on each key and value. Parents
    /// are destroyed before their children, left subtrees before right subtrees.
    pub fn clear(&mut self) {
        let mut stack: Vec<Entry> = self.root.into_iter().collect();
        while let Some(entry) = stack.pop() {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = self.arena.free(&entry);
            stack.extend(right);
            stack.extend(left);
            self.destroy(key, value);
        }
        debug!("cleared tree of {} nodes", self.len);
        self.root = None;
        self.leftmost = None;
        self.rightmost = None;
        self.len = 0;
    }

    /// Exchanges the contents of two trees, including their comparators and destructors, without
    /// touching any node. Positions keep referring to their nodes in the other tree.
    pub fn swap(&mut self, other: &mut Self) {
        debug!("swapping trees of {} and {} nodes", self.len, other.len);
        mem::swap(self, other);
    }

    /// Returns an iterator over the tree in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert_equal(2, 'b').unwrap();
    /// tree.insert_equal(1, 'a').unwrap();
    ///
    /// let mut iterator = tree.iter();
    /// assert_eq!(iterator.next(), Some((&1, &'a')));
    /// assert_eq!(iterator.next(), Some((&2, &'b')));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(self, self.begin(), self.end())
    }

    /// Returns an iterator over `[first, last)`.
    pub fn range(&self, first: Position, last: Position) -> Iter<'_, K, V, C> {
        Iter::new(self, first, last)
    }
}

impl<K, V, C> RedBlackTree<K, V, C>
where
    C: Compare<K>,
{
    fn insert_position(&self, key: &K) -> (Option<Entry>, bool) {
        let mut parent = None;
        let mut go_left = true;
        let mut curr = self.root;
        while let Some(entry) = curr {
            let node = self.node(entry);
            parent = Some(entry);
            go_left = self.compare.less(key, &node.key);
            curr = if go_left { node.left } else { node.right };
        }
        (parent, go_left)
    }

    fn insert_at(
        &mut self,
        parent: Option<Entry>,
        go_left: bool,
        key: K,
        value: V,
    ) -> Result<Entry> {
        let entry = self.arena.allocate(Node::new(key, value, parent))?;
        match parent {
            None => {
                self.root = Some(entry);
                self.leftmost = Some(entry);
                self.rightmost = Some(entry);
            }
            Some(parent) if go_left => {
                self.node_mut(parent).left = Some(entry);
                if self.leftmost == Some(parent) {
                    self.leftmost = Some(entry);
                }
            }
            Some(parent) => {
                self.node_mut(parent).right = Some(entry);
                if self.rightmost == Some(parent) {
                    self.rightmost = Some(entry);
                }
            }
        }
        self.insert_fixup(entry);
        self.len += 1;
        trace!("inserted node, len = {}", self.len);
        Ok(entry)
    }

    /// Inserts a key-value pair, placing it after every equivalent key already in the tree, and
    /// returns its position. Returns an error if the node cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert_equal("a", 1).unwrap();
    /// tree.insert_equal("a", 2).unwrap();
    /// assert_eq!(tree.count(&"a"), 2);
    /// ```
    pub fn insert_equal(&mut self, key: K, value: V) -> Result<Position> {
        let (parent, go_left) = self.insert_position(&key);
        self.insert_at(parent, go_left, key, value)
            .map(|entry| Position(Some(entry)))
    }

    /// Inserts a key-value pair if no equivalent key is present. Otherwise nothing is modified
    /// and the key and value are handed back in `InsertOutcome::Present` along with the position
    /// of the existing key. Returns an error if the node cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::{InsertOutcome, RedBlackTree};
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert!(tree.insert_unique(1, 'a').unwrap().is_inserted());
    /// match tree.insert_unique(1, 'b').unwrap() {
    ///     InsertOutcome::Present { position, value, .. } => {
    ///         assert_eq!(tree.value(position), &'a');
    ///         assert_eq!(value, 'b');
    ///     }
    ///     InsertOutcome::Inserted(_) => unreachable!(),
    /// }
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert_unique(&mut self, key: K, value: V) -> Result<InsertOutcome<K, V>> {
        let (parent, go_left) = self.insert_position(&key);
        let predecessor = match parent {
            Some(parent) if go_left => {
                if self.leftmost == Some(parent) {
                    None
                } else {
                    self.predecessor(parent)
                }
            }
            parent => parent,
        };

        if let Some(predecessor) = predecessor {
            if !self.compare.less(&self.node(predecessor).key, &key) {
                return Ok(InsertOutcome::Present {
                    position: Position(Some(predecessor)),
                    key,
                    value,
                });
            }
        }

        let entry = self.insert_at(parent, go_left, key, value)?;
        Ok(InsertOutcome::Inserted(Position(Some(entry))))
    }

    /// Returns the position of the first key that is not less than `key`.
    pub fn lower_bound(&self, key: &K) -> Position {
        let mut result = None;
        let mut curr = self.root;
        while let Some(entry) = curr {
            let node = self.node(entry);
            if !self.compare.less(&node.key, key) {
                result = Some(entry);
                curr = node.left;
            } else {
                curr = node.right;
            }
        }
        Position(result)
    }

    /// Returns the position of the first key that is greater than `key`.
    pub fn upper_bound(&self, key: &K) -> Position {
        let mut result = None;
        let mut curr = self.root;
        while let Some(entry) = curr {
            let node = self.node(entry);
            if self.compare.less(key, &node.key) {
                result = Some(entry);
                curr = node.left;
            } else {
                curr = node.right;
            }
        }
        Position(result)
    }

    /// Returns `(lower_bound(key), upper_bound(key))`, the span of keys equivalent to `key`.
    pub fn equal_range(&self, key: &K) -> (Position, Position) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns the position of the first key equivalent to `key`, or `end()` if there is none.
    pub fn find(&self, key: &K) -> Position {
        let position = self.lower_bound(key);
        match position.0 {
            Some(entry) if !self.compare.less(key, &self.node(entry).key) => position,
            _ => self.end(),
        }
    }

    /// Returns `true` if the tree contains a key equivalent to `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        !self.find(key).is_end()
    }

    /// Returns the number of keys equivalent to `key`.
    pub fn count(&self, key: &K) -> usize {
        let (mut first, last) = self.equal_range(key);
        let mut count = 0;
        while first != last {
            first = self.next(first);
            count += 1;
        }
        count
    }

    /// Erases every key equivalent to `key` and returns how many were erased.
    pub fn erase_key(&mut self, key: &K) -> usize {
        let (first, last) = self.equal_range(key);
        self.erase_range(first, last)
    }

    /// Checks the red black invariants and the cached extremes, returning the black-height of
    /// the tree.
    ///
    /// This walks every node and is meant for tests and diagnostics.
    pub fn validate(&self) -> result::Result<usize, Violation> {
        let result = self.check();
        if let Err(ref violation) = result {
            debug!("tree validation failed: {}", violation);
        }
        result
    }

    /// Returns `true` if `validate` finds no violation.
    pub fn verify(&self) -> bool {
        self.validate().is_ok()
    }

    fn check(&self) -> result::Result<usize, Violation> {
        let root = match self.root {
            Some(root) => root,
            None => {
                if self.leftmost.is_some() || self.rightmost.is_some() {
                    return Err(Violation::CacheMismatch);
                }
                if self.len != 0 {
                    return Err(Violation::CountMismatch {
                        expected: self.len,
                        actual: 0,
                    });
                }
                return Ok(0);
            }
        };

        if self.node(root).is_red() {
            return Err(Violation::RootNotBlack);
        }
        if self.node(root).parent.is_some() {
            return Err(Violation::BrokenParentLink);
        }
        if self.leftmost != Some(self.minimum(root)) || self.rightmost != Some(self.maximum(root)) {
            return Err(Violation::CacheMismatch);
        }

        let mut count = 0;
        let blacks = self.check_subtree(root, &mut count)?;
        if count != self.len {
            return Err(Violation::CountMismatch {
                expected: self.len,
                actual: count,
            });
        }

        let mut prev = self.minimum(root);
        let mut curr = self.successor(prev);
        while let Some(entry) = curr {
            if self.compare.less(&self.node(entry).key, &self.node(prev).key) {
                return Err(Violation::SortError);
            }
            prev = entry;
            curr = self.successor(entry);
        }

        Ok(blacks)
    }

    fn check_subtree(&self, entry: Entry, count: &mut usize) -> result::Result<usize, Violation> {
        *count += 1;
        let node = self.node(entry);

        let left_blacks = match node.left {
            None => 0,
            Some(left) => {
                let child = self.node(left);
                if child.parent != Some(entry) {
                    return Err(Violation::BrokenParentLink);
                }
                if node.is_red() && child.is_red() {
                    return Err(Violation::ConsecutiveReds);
                }
                if self.compare.less(&node.key, &child.key) {
                    return Err(Violation::SortError);
                }
                self.check_subtree(left, count)?
            }
        };

        let right_blacks = match node.right {
            None => 0,
            Some(right) => {
                let child = self.node(right);
                if child.parent != Some(entry) {
                    return Err(Violation::BrokenParentLink);
                }
                if node.is_red() && child.is_red() {
                    return Err(Violation::ConsecutiveReds);
                }
                if self.compare.less(&child.key, &node.key) {
                    return Err(Violation::SortError);
                }
                self.check_subtree(right, count)?
            }
        };

        if left_blacks != right_blacks {
            return Err(Violation::UnbalancedBlacks {
                left: left_blacks,
                right: right_blacks,
            });
        }
        Ok(left_blacks + if node.is_red() { 0 } else { 1 })
    }
}

impl<K, V, C> Drop for RedBlackTree<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, C> fmt::Debug for RedBlackTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
