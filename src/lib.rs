mod arena;
mod depth;
mod error;
mod rbtree;

pub mod demo;

pub use crate::arena::{Color, NodeId};
pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::rbtree::{Iter, LevelOrder, RbTree, Stats};
