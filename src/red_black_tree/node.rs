use crate::arena::Entry;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// A struct representing an internal node of a red black tree.
///
/// Links are handles into the tree's node arena. A missing child counts as black.
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub color: Color,
    pub left: Option<Entry>,
    pub right: Option<Entry>,
    pub parent: Option<Entry>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<Entry>) -> Self {
        Node {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        }
    }

    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}
