use std::collections::TryReserveError;
use std::error;
use std::fmt;
use std::result;

/// Errors returned by fallible tree operations.
#[derive(Debug)]
pub enum Error {
    /// The node arena could not reserve storage for a new node.
    AllocError(TryReserveError),
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Error {
        Error::AllocError(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::AllocError(error) => Some(error),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AllocError(error) => write!(f, "failed to allocate tree node: {}", error),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// A broken red-black tree invariant reported by `RedBlackTree::validate`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Violation {
    /// The root of a non-empty tree is red.
    RootNotBlack,
    /// A red node has a red child.
    ConsecutiveReds,
    /// Two sibling subtrees have different black-heights.
    UnbalancedBlacks { left: usize, right: usize },
    /// A child is out of order with respect to its parent.
    SortError,
    /// A child's parent link does not name its parent.
    BrokenParentLink,
    /// The cached leftmost or rightmost node is not the true extreme.
    CacheMismatch,
    /// The node counter disagrees with the number of reachable nodes.
    CountMismatch { expected: usize, actual: usize },
}

impl error::Error for Violation {}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::RootNotBlack => write!(f, "root is red"),
            Violation::ConsecutiveReds => write!(f, "red node has a red child"),
            Violation::UnbalancedBlacks { left, right } => {
                write!(f, "unbalanced blacks, left: {} right: {}", left, right)
            }
            Violation::SortError => write!(f, "keys are not in sort order"),
            Violation::BrokenParentLink => write!(f, "child does not link back to its parent"),
            Violation::CacheMismatch => write!(f, "cached leftmost or rightmost is stale"),
            Violation::CountMismatch { expected, actual } => {
                write!(f, "node count is {} but {} nodes are reachable", expected, actual)
            }
        }
    }
}
