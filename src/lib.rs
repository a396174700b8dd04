//! Red black tree engine backing ordered map and multimap containers.

pub mod arena;
mod error;
pub mod red_black_tree;

pub use crate::error::{Error, Result, Violation};
