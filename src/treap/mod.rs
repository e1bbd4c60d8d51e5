//! Persistent ordered collections backed by treaps whose priorities are derived by hashing
//! keys. Every operation returns a new collection and shares all untouched subtrees with its
//! inputs, and because the shape of a tree is a pure function of its key set, independently
//! built collections over overlapping keys share physically identical subtrees. The set-algebra
//! operations and [`FoldCache`] exploit that sharing to skip whole subtrees by identity.
//!
//! Collections are immutable after construction, so any number of threads may read, iterate,
//! and combine the same collections concurrently without synchronization. The one exception is
//! [`FoldCache`], which is a plain mutable value and must be confined to one thread or
//! externally synchronized.

mod fold;
mod map;
mod node;
mod ser;
mod set;
mod tree;

pub use self::fold::FoldCache;
pub use self::map::{TreapMap, TreapMapIntoIter, TreapMapIter};
pub use self::node::NodeView;
pub use self::set::{TreapSet, TreapSetIntoIter, TreapSetIter};
