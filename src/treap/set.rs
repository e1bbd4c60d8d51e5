use crate::treap::fold::FoldCache;
use crate::treap::map::{TreapMap, TreapMapIntoIter, TreapMapIter};
use crate::treap::node::NodeView;
use crate::treap::tree;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::{Add, Sub};

/// A persistent ordered set implemented by a treap with key-derived priorities.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property:
/// the key of any node is greater than all keys in its left subtree and less than all keys in
/// its right subtree, and the priority of a node is greater than the priority of all nodes in
/// its subtrees. Priorities are derived by hashing keys, so the expected height of the tree is
/// proportional to the logarithm of the number of keys, and two sets holding the same keys
/// always have the same shape.
///
/// The set is immutable: operations that change the set return a new set that shares all
/// untouched subtrees with the original, and cloning a set is a constant-time root copy.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::TreapSet;
///
/// let set = TreapSet::new();
/// let set = set.insert(0);
/// let set = set.insert(3);
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.ceil(&2), Some(&3));
///
/// let removed = set.remove(&0);
/// assert!(!removed.contains(&0));
/// assert!(set.contains(&0));
/// ```
pub struct TreapSet<T> {
    map: TreapMap<T, ()>,
}

impl<T> TreapSet<T> {
    /// Constructs a new, empty `TreapSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set: TreapSet<u32> = TreapSet::new();
    /// ```
    pub fn new() -> Self {
        TreapSet {
            map: TreapMap::new(),
        }
    }

    /// Returns a new set with a key inserted. If the key is already present, the returned set
    /// shares its root with `self`, so the no-op is detectable through
    /// [`ptr_eq`](TreapSet::ptr_eq).
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert!(set.contains(&1));
    /// assert!(set.insert(1).ptr_eq(&set));
    /// ```
    pub fn insert(&self, key: T) -> Self
    where
        T: Ord + Clone + Hash,
    {
        if self.contains(&key) {
            self.clone()
        } else {
            TreapSet {
                map: self.map.insert(key, ()),
            }
        }
    }

    /// Returns a new set with a key removed. If the key is absent, the returned set shares its
    /// root with `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert!(!set.remove(&1).contains(&1));
    /// assert!(set.remove(&2).ptr_eq(&set));
    /// ```
    pub fn remove<V>(&self, key: &V) -> Self
    where
        T: Ord + Clone + Borrow<V>,
        V: Ord + ?Sized,
    {
        TreapSet {
            map: self.map.remove(key),
        }
    }

    /// Checks if a key exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Returns the number of keys in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set: TreapSet<u32> = TreapSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the height of the set: the number of nodes on the longest root-to-leaf path.
    /// The expected height is logarithmic in the number of keys because priorities are
    /// well-distributed hashes of the keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set: TreapSet<u32> = TreapSet::new();
    /// assert_eq!(set.height(), 0);
    /// assert_eq!(set.insert(1).height(), 1);
    /// ```
    pub fn height(&self) -> usize {
        self.map.height()
    }

    /// Returns the smallest key in the set that is greater than or equal to a particular key.
    /// Returns `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.map.ceil(key)
    }

    /// Returns the largest key in the set that is less than or equal to a particular key.
    /// Returns `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.map.floor(key)
    }

    /// Returns the minimum key of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1).insert(3);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.map.min()
    }

    /// Returns the maximum key of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1).insert(3);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.map.max()
    }

    /// Returns the union of two sets. The `+` operator is implemented to take the union of two
    /// sets.
    ///
    /// Subtrees shared between the two sets are reused in constant time; in particular,
    /// `a.union(&a)` returns a set that shares its root with `a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(2).insert(3);
    ///
    /// let union = n.union(&m);
    /// assert_eq!(union.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3]);
    /// ```
    pub fn union(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
    {
        TreapSet {
            map: self.map.union(&other.map),
        }
    }

    /// Returns the intersection of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(2).insert(3);
    ///
    /// let inter = n.inter(&m);
    /// assert_eq!(inter.iter().collect::<Vec<&u32>>(), vec![&2]);
    /// ```
    pub fn inter(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
    {
        TreapSet {
            map: self.map.inter(&other.map),
        }
    }

    /// Returns `self` with every key of `other` removed. The `-` operator is implemented to
    /// take the difference of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(2).insert(3);
    ///
    /// let subtract = n.subtract(&m);
    /// assert_eq!(subtract.iter().collect::<Vec<&u32>>(), vec![&1]);
    /// ```
    pub fn subtract(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
    {
        TreapSet {
            map: self.map.subtract(&other.map),
        }
    }

    /// Returns the set of keys present in exactly one of the two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(2).insert(3);
    ///
    /// let difference = n.symmetric_difference(&m);
    /// assert_eq!(difference.iter().collect::<Vec<&u32>>(), vec![&1, &3]);
    /// ```
    pub fn symmetric_difference(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
    {
        TreapSet {
            map: TreapMap {
                root: tree::symmetric_difference(self.map.root.clone(), other.map.root.clone()),
            },
        }
    }

    /// Checks whether every key of `self` is present in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(1).insert(2).insert(3);
    ///
    /// assert!(n.is_subset(&m));
    /// assert!(!m.is_subset(&n));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool
    where
        T: Ord + Clone,
    {
        tree::is_subset(&self.map.root, &other.map.root)
    }

    /// Checks whether two sets have no key in common.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let n = TreapSet::new().insert(1).insert(2);
    /// let m = TreapSet::new().insert(3);
    ///
    /// assert!(n.is_disjoint(&m));
    /// assert!(!n.is_disjoint(&n));
    /// ```
    pub fn is_disjoint(&self, other: &Self) -> bool
    where
        T: Ord + Clone,
    {
        tree::is_disjoint(&self.map.root, &other.map.root)
    }

    /// Folds the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1).insert(2).insert(3);
    /// let sum = set.fold(0, |acc, key| acc + key);
    /// assert_eq!(sum, 6);
    /// ```
    pub fn fold<B, F>(&self, seed: B, mut step: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.map.fold(seed, |acc, key, _| step(acc, key))
    }

    /// Folds the keys as `combine(combine(left_subtree, lift(key)), right_subtree)`, memoizing
    /// the result for every subtree in `cache`. `combine` must be associative and `empty` must
    /// be its identity; under that contract the result equals an ordered fold and is
    /// independent of the cache contents.
    ///
    /// See [`FoldCache`] for the cache's reuse and single-fold-function contract.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::{FoldCache, TreapSet};
    ///
    /// let set = TreapSet::new().insert(1).insert(2).insert(3);
    /// let mut cache = FoldCache::new();
    /// let sum = set.fold_cached(&mut cache, 0, |key| *key, |x, y| x + y);
    /// assert_eq!(sum, 6);
    /// ```
    pub fn fold_cached<R, L, C>(
        &self,
        cache: &mut FoldCache<T, (), R>,
        empty: R,
        lift: L,
        combine: C,
    ) -> R
    where
        R: Clone,
        L: Fn(&T) -> R,
        C: Fn(R, R) -> R,
    {
        self.map
            .fold_cached(cache, empty, |key, _| lift(key), combine)
    }

    /// Checks whether two sets share the same root node. This is constant-time and implies
    /// equality; operations document when they guarantee root sharing.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1);
    /// assert!(set.union(&set).ptr_eq(&set));
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Returns a read-only view of the root node for structural introspection, or `None` if
    /// the set is empty. Diagnostic tooling uses this to render tree shapes; see
    /// [`viz`](crate::viz).
    pub fn root(&self) -> Option<NodeView<'_, T, ()>> {
        self.map.root()
    }

    /// Returns an iterator over the set. The iterator will yield keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapSet;
    ///
    /// let set = TreapSet::new().insert(1).insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> TreapSetIter<'_, T> {
        TreapSetIter {
            map_iter: self.map.iter(),
        }
    }
}

impl<T> Clone for TreapSet<T> {
    fn clone(&self) -> Self {
        TreapSet {
            map: self.map.clone(),
        }
    }
}

impl<T> IntoIterator for TreapSet<T>
where
    T: Clone,
{
    type IntoIter = TreapSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        TreapSetIntoIter {
            map_iter: self.map.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a TreapSet<T> {
    type IntoIter = TreapSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `TreapSet<T>`.
///
/// This iterator traverses the keys of the set in-order and yields owned keys, cloning keys
/// out of subtrees that are still shared with other sets.
pub struct TreapSetIntoIter<T> {
    map_iter: TreapMapIntoIter<T, ()>,
}

impl<T> Iterator for TreapSetIntoIter<T>
where
    T: Clone,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.map_iter.next().map(|pair| pair.0)
    }
}

/// An iterator for `TreapSet<T>`.
///
/// This iterator traverses the keys of the set in-order and yields immutable references.
pub struct TreapSetIter<'a, T> {
    map_iter: TreapMapIter<'a, T, ()>,
}

impl<'a, T> Iterator for TreapSetIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.map_iter.next().map(|pair| pair.0)
    }
}

impl<T> FromIterator<T> for TreapSet<T>
where
    T: Ord + Clone + Hash,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().fold(TreapSet::new(), |set, key| set.insert(key))
    }
}

impl<T> Default for TreapSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Add for TreapSet<T>
where
    T: Ord + Clone,
{
    type Output = TreapSet<T>;

    fn add(self, other: TreapSet<T>) -> TreapSet<T> {
        self.union(&other)
    }
}

impl<T> Sub for TreapSet<T>
where
    T: Ord + Clone,
{
    type Output = TreapSet<T>;

    fn sub(self, other: TreapSet<T>) -> TreapSet<T> {
        self.subtract(&other)
    }
}

impl<T> PartialEq for TreapSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T> Eq for TreapSet<T> where T: Eq {}

impl<T> Hash for TreapSet<T>
where
    T: Hash,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.map.hash(state)
    }
}

impl<T> fmt::Debug for TreapSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::TreapSet;

    #[test]
    fn test_len_empty() {
        let set: TreapSet<u32> = TreapSet::new();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: TreapSet<u32> = TreapSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn test_insert() {
        let set = TreapSet::new().insert(1);
        assert!(set.contains(&1));
    }

    #[test]
    fn test_insert_present_shares_root() {
        let set = TreapSet::new().insert(1);
        assert!(set.insert(1).ptr_eq(&set));
    }

    #[test]
    fn test_remove() {
        let set = TreapSet::new().insert(1);
        let removed = set.remove(&1);
        assert!(!removed.contains(&1));
        assert!(set.contains(&1));
    }

    #[test]
    fn test_remove_absent_shares_root() {
        let set = TreapSet::new().insert(1);
        assert!(set.remove(&2).ptr_eq(&set));
    }

    #[test]
    fn test_remove_idempotent() {
        let set: TreapSet<u32> = (1..10).collect();
        let removed = set.remove(&5);
        assert!(removed.remove(&5).ptr_eq(&removed));
    }

    #[test]
    fn test_min_max() {
        let set = TreapSet::new().insert(1).insert(3).insert(5);
        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_height() {
        let set: TreapSet<u32> = TreapSet::new();
        assert_eq!(set.height(), 0);
        assert_eq!(set.insert(1).height(), 1);

        let set: TreapSet<u32> = (0..100).collect();
        assert!(set.height() >= 7);
        assert!(set.height() <= set.len());
    }

    #[test]
    fn test_floor_ceil() {
        let set = TreapSet::new().insert(1).insert(3).insert(5);

        assert_eq!(set.floor(&0), None);
        assert_eq!(set.floor(&2), Some(&1));
        assert_eq!(set.floor(&4), Some(&3));
        assert_eq!(set.floor(&6), Some(&5));

        assert_eq!(set.ceil(&0), Some(&1));
        assert_eq!(set.ceil(&2), Some(&3));
        assert_eq!(set.ceil(&4), Some(&5));
        assert_eq!(set.ceil(&6), None);
    }

    #[test]
    fn test_union() {
        let n = TreapSet::new().insert(1).insert(2).insert(3);
        let m = TreapSet::new().insert(3).insert(4).insert(5);

        let union = n + m;

        assert_eq!(union.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3, &4, &5]);
        assert_eq!(union.len(), 5);
    }

    #[test]
    fn test_inter() {
        let n = TreapSet::new().insert(1).insert(2).insert(3);
        let m = TreapSet::new().insert(3).insert(4).insert(5);

        let inter = n.inter(&m);

        assert_eq!(inter.iter().collect::<Vec<&u32>>(), vec![&3]);
        assert_eq!(inter.len(), 1);
    }

    #[test]
    fn test_subtract() {
        let n = TreapSet::new().insert(1).insert(2).insert(3);
        let m = TreapSet::new().insert(3).insert(4).insert(5);

        let subtract = n - m;

        assert_eq!(subtract.iter().collect::<Vec<&u32>>(), vec![&1, &2]);
        assert_eq!(subtract.len(), 2);
    }

    #[test]
    fn test_symmetric_difference() {
        let n = TreapSet::new().insert(1).insert(2).insert(3);
        let m = TreapSet::new().insert(3).insert(4).insert(5);

        let difference = n.symmetric_difference(&m);

        assert_eq!(difference.iter().collect::<Vec<&u32>>(), vec![&1, &2, &4, &5]);
    }

    #[test]
    fn test_symmetric_difference_self_is_empty() {
        let set: TreapSet<u32> = (1..10).collect();
        assert!(set.symmetric_difference(&set).is_empty());
    }

    #[test]
    fn test_subset_disjoint() {
        let n: TreapSet<u32> = (1..10).collect();
        let m: TreapSet<u32> = (1..20).collect();
        let k: TreapSet<u32> = (30..40).collect();

        assert!(n.is_subset(&m));
        assert!(!m.is_subset(&n));
        assert!(n.is_subset(&n));
        assert!(n.is_disjoint(&k));
        assert!(!n.is_disjoint(&m));
    }

    #[test]
    fn test_sharing_after_union() {
        let a: TreapSet<u32> = (1..20).collect();
        let b: TreapSet<u32> = (10..30).collect();
        let union = a.union(&b);

        assert!(union.union(&union).ptr_eq(&union));
        assert!(a.subtract(&a).is_empty());
    }

    #[test]
    fn test_eq_ignores_construction_order() {
        let a: TreapSet<u32> = (1..100).collect();
        let b: TreapSet<u32> = (1..100).rev().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_into_iter() {
        let set = TreapSet::new().insert(1).insert(5).insert(3);
        assert_eq!(set.into_iter().collect::<Vec<u32>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_iter() {
        let set = TreapSet::new().insert(1).insert(5).insert(3);
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
    }

    #[test]
    fn test_from_iterator() {
        let set: TreapSet<u32> = vec![5, 1, 3].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
    }
}
