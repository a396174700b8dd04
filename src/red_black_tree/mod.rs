//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.
//!
//! `RedBlackTree` is the engine: nodes are addressed by `Position` handles and keys are ordered
//! by a strict less-than predicate. `RedBlackMap` and `RedBlackMultimap` forward to it with
//! unique and duplicate key semantics respectively.

mod compare;
mod iter;
mod map;
mod multimap;
mod node;
mod tree;

pub use self::compare::{Compare, Natural, Ordered};
pub use self::iter::{IntoIter, Iter};
pub use self::map::RedBlackMap;
pub use self::multimap::RedBlackMultimap;
pub use self::tree::{Builder, Destructor, InsertOutcome, Position, RedBlackTree};
