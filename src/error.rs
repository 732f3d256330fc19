use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K>
where
    K: Clone + Ord,
{
    /// Returned by create() API when key is already present.
    DuplicateKey,
    /// Fatal case, a red node has a red child.
    ConsecutiveReds,
    /// Fatal case, root node is colored red.
    RedRoot,
    /// Fatal case, black count differs between the left and right
    /// child of some node. The String component can be used for
    /// debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    SortError(K, K),
    /// Fatal case, a child does not point back to its parent.
    BrokenLink(String),
}

impl<K> fmt::Display for Error<K>
where
    K: Clone + Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateKey => write!(f, "key already present"),
            Error::ConsecutiveReds => write!(f, "consecutive red nodes"),
            Error::RedRoot => write!(f, "root node is red"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            Error::SortError(a, b) => write!(f, "keys out of order {:?} {:?}", a, b),
            Error::BrokenLink(msg) => write!(f, "broken parent link, {}", msg),
        }
    }
}

impl<K> error::Error for Error<K> where K: Clone + Ord + fmt::Debug {}
