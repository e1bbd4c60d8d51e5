use crate::entry::Entry;
use crate::treap::node::Node;
use crate::treap::tree::Tree;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Identity key for cached subtrees. Hashing and equality go through the node's address, and
// holding the `Arc` keeps the address from being reused while the cache is alive.
struct NodeKey<T, U>(Arc<Node<T, U>>);

impl<T, U> PartialEq for NodeKey<T, U> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T, U> Eq for NodeKey<T, U> {}

impl<T, U> Hash for NodeKey<T, U> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        (Arc::as_ptr(&self.0) as usize).hash(state)
    }
}

/// A cache of partial fold results, keyed by subtree identity.
///
/// Collections built from overlapping key sets share physically identical subtrees, so an
/// associative fold evaluated over many related collections keeps revisiting the same nodes. A
/// `FoldCache` memoizes the result for each distinct subtree, letting
/// [`TreapSet::fold_cached`](crate::treap::TreapSet::fold_cached) and
/// [`TreapMap::fold_cached`](crate::treap::TreapMap::fold_cached) reuse work across calls.
/// Caching never changes the observable result, only the amount of recomputation.
///
/// A cache is only valid for a single `(lift, combine)` pair: mixing results from different
/// fold functions in one cache is a caller contract violation. Create a fresh cache per
/// distinct fold. The cache is a plain mutable value; confine it to one thread for the
/// duration of a batch of folds or synchronize it externally.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::{FoldCache, TreapSet};
///
/// let a: TreapSet<u32> = (1..100).collect();
/// let b = a.insert(100);
///
/// let mut cache = FoldCache::new();
/// let sum_a = a.fold_cached(&mut cache, 0, |key| u64::from(*key), |x, y| x + y);
/// // `b` shares almost all of its nodes with `a`, so this fold is mostly cache hits.
/// let sum_b = b.fold_cached(&mut cache, 0, |key| u64::from(*key), |x, y| x + y);
///
/// assert_eq!(sum_b, sum_a + 100);
/// ```
pub struct FoldCache<T, U, R> {
    results: HashMap<NodeKey<T, U>, R>,
}

impl<T, U, R> FoldCache<T, U, R> {
    /// Constructs a new, empty `FoldCache<T, U, R>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::FoldCache;
    ///
    /// let cache: FoldCache<u32, (), u64> = FoldCache::new();
    /// ```
    pub fn new() -> Self {
        FoldCache {
            results: HashMap::new(),
        }
    }

    /// Returns the number of subtrees with a cached result.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if no results have been cached yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Discards all cached results, releasing the cache's references to shared subtrees.
    pub fn clear(&mut self) {
        self.results.clear();
    }
}

impl<T, U, R> FoldCache<T, U, R>
where
    R: Clone,
{
    pub(crate) fn fold<L, C>(&mut self, tree: &Tree<T, U>, empty: &R, lift: &L, combine: &C) -> R
    where
        L: Fn(&Entry<T, U>) -> R,
        C: Fn(R, R) -> R,
    {
        match tree {
            Some(node) => {
                let key = NodeKey(Arc::clone(node));
                if let Some(result) = self.results.get(&key) {
                    return result.clone();
                }
                let left = self.fold(&node.left, empty, lift, combine);
                let right = self.fold(&node.right, empty, lift, combine);
                let result = combine(combine(left, lift(&node.entry)), right);
                self.results.insert(key, result.clone());
                result
            },
            None => empty.clone(),
        }
    }
}

impl<T, U, R> Default for FoldCache<T, U, R> {
    fn default() -> Self {
        Self::new()
    }
}
