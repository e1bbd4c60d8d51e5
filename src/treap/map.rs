use crate::entry::Entry;
use crate::treap::fold::FoldCache;
use crate::treap::node::{self, Node, NodeView};
use crate::treap::tree;
use siphasher::sip::SipHasher13;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::{Add, Index, Sub};

// Fixed SipHash-1-3 keys for per-entry digests, distinct from the priority keys so that a
// collection's hash is not correlated with its shape.
const ELEMENT_KEY_0: u64 = 0x6c62_272e_07bb_0142;
const ELEMENT_KEY_1: u64 = 0x62b8_2175_6295_c58d;

/// A persistent ordered map implemented by a treap with key-derived priorities.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property:
/// the key of any node is greater than all keys in its left subtree and less than all keys in
/// its right subtree, and the priority of a node is greater than the priority of all nodes in
/// its subtrees. Priorities are derived by hashing keys, so the expected height of the tree is
/// proportional to the logarithm of the number of keys, and the shape of a tree is a pure
/// function of its key set.
///
/// The map is immutable: operations that change the map return a new map that shares all
/// untouched subtrees with the original, and cloning a map is a constant-time root copy.
/// Because two maps built from overlapping key sets share physically identical subtrees, the
/// set-algebra operations can short-circuit whole shared subtrees in constant time.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::TreapMap;
///
/// let map = TreapMap::new();
/// let map = map.insert(0, 1);
/// let map = map.insert(3, 4);
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// let removed = map.remove(&0);
/// assert_eq!(removed.get(&0), None);
/// assert_eq!(map.get(&0), Some(&1));
/// ```
pub struct TreapMap<T, U> {
    pub(crate) root: tree::Tree<T, U>,
}

impl<T, U> TreapMap<T, U> {
    /// Constructs a new, empty `TreapMap<T, U>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::new();
    /// ```
    pub fn new() -> Self {
        TreapMap { root: None }
    }

    /// Returns a new map with a key-value pair inserted. If the key already exists in the map,
    /// the new value replaces the old one.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2).get(&1), Some(&2));
    /// ```
    pub fn insert(&self, key: T, value: U) -> Self
    where
        T: Ord + Clone + Hash,
        U: Clone,
    {
        self.insert_with(key, value, |_, new| new)
    }

    /// Returns a new map with a key-value pair inserted, resolving duplicate keys with
    /// `combine(old_value, new_value)`. The existing key is kept on duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// let map = map.insert_with(1, 2, |old, new| old + new);
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    pub fn insert_with<F>(&self, key: T, value: U, combine: F) -> Self
    where
        T: Ord + Clone + Hash,
        U: Clone,
        F: FnOnce(U, U) -> U,
    {
        let priority = node::priority(&key);
        TreapMap {
            root: tree::insert_with(self.root.clone(), key, value, priority, combine),
        }
    }

    /// Returns a new map with a key removed. If the key is absent, the returned map shares its
    /// root with `self`, so the no-op is detectable through [`ptr_eq`](TreapMap::ptr_eq).
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.remove(&1).get(&1), None);
    /// assert!(map.remove(&2).ptr_eq(&map));
    /// ```
    pub fn remove<V>(&self, key: &V) -> Self
    where
        T: Ord + Clone + Borrow<V>,
        U: Clone,
        V: Ord + ?Sized,
    {
        match tree::remove(&self.root, key) {
            Some(root) => TreapMap { root },
            None => self.clone(),
        }
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::get(&self.root, key).map(|entry| &entry.value)
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        tree::len(&self.root)
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the map: the number of nodes on the longest root-to-leaf path.
    /// The expected height is logarithmic in the number of entries because priorities are
    /// well-distributed hashes of the keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::new();
    /// assert_eq!(map.height(), 0);
    /// assert_eq!(map.insert(1, 1).height(), 1);
    /// ```
    pub fn height(&self) -> usize {
        tree::height(&self.root)
    }

    /// Returns the smallest key in the map that is greater than or equal to a particular key.
    /// Returns `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.ceil(&0), Some(&1));
    /// assert_eq!(map.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::ceil(&self.root, key).map(|entry| &entry.key)
    }

    /// Returns the largest key in the map that is less than or equal to a particular key.
    /// Returns `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert_eq!(map.floor(&0), None);
    /// assert_eq!(map.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::floor(&self.root, key).map(|entry| &entry.key)
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1).insert(3, 3);
    /// assert_eq!(map.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        tree::min(&self.root).map(|entry| &entry.key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1).insert(3, 3);
    /// assert_eq!(map.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        tree::max(&self.root).map(|entry| &entry.key)
    }

    /// Returns the union of two maps. If there is a key that is found in both maps, the union
    /// will contain the value associated with the key in `self`. The `+` operator is
    /// implemented to take the union of two maps.
    ///
    /// Subtrees shared between the two maps are reused in constant time; in particular,
    /// `a.union(&a)` returns a map that shares its root with `a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let union = n.union(&m);
    /// assert_eq!(
    ///     union.iter().collect::<Vec<(&u32, &u32)>>(),
    ///     vec![(&1, &1), (&2, &2), (&3, &3)],
    /// );
    /// ```
    pub fn union(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
        U: Clone,
    {
        self.union_with(other, |_, left, _| left)
    }

    /// Returns the union of two maps, resolving duplicate keys with
    /// `combine(key, self_value, other_value)`.
    ///
    /// The combiner is not consulted for subtrees that are physically shared between the two
    /// maps; such subtrees are returned as-is from `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let union = n.union_with(&m, |_, left, right| left + right);
    /// assert_eq!(union.get(&2), Some(&5));
    /// ```
    pub fn union_with<F>(&self, other: &Self, mut combine: F) -> Self
    where
        T: Ord + Clone,
        U: Clone,
        F: FnMut(&T, U, U) -> U,
    {
        TreapMap {
            root: tree::union_with(self.root.clone(), other.root.clone(), false, &mut combine),
        }
    }

    /// Returns the intersection of two maps. If there is a key that is found in both maps, the
    /// intersection will contain the value associated with the key in `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let inter = n.inter(&m);
    /// assert_eq!(
    ///     inter.iter().collect::<Vec<(&u32, &u32)>>(),
    ///     vec![(&2, &2)],
    /// );
    /// ```
    pub fn inter(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
        U: Clone,
    {
        self.inter_with(other, |_, left, _| left)
    }

    /// Returns the intersection of two maps, resolving common keys with
    /// `combine(key, self_value, other_value)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let inter = n.inter_with(&m, |_, left, right| left + right);
    /// assert_eq!(inter.get(&2), Some(&5));
    /// assert_eq!(inter.len(), 1);
    /// ```
    pub fn inter_with<F>(&self, other: &Self, mut combine: F) -> Self
    where
        T: Ord + Clone,
        U: Clone,
        F: FnMut(&T, U, U) -> U,
    {
        TreapMap {
            root: tree::inter_with(self.root.clone(), other.root.clone(), false, &mut combine),
        }
    }

    /// Returns `self` with every key of `other` removed. The `-` operator is implemented to
    /// take the difference of two maps.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let subtract = n.subtract(&m);
    /// assert_eq!(
    ///     subtract.iter().collect::<Vec<(&u32, &u32)>>(),
    ///     vec![(&1, &1)],
    /// );
    /// ```
    pub fn subtract(&self, other: &Self) -> Self
    where
        T: Ord + Clone,
        U: Clone,
    {
        TreapMap {
            root: tree::subtract(self.root.clone(), other.root.clone(), false),
        }
    }

    /// Key-wise outer merge of two maps. The resolver is consulted once for every key present
    /// in either map as `resolve(key, self_value, other_value)`, and returning `None` drops the
    /// key from the result. Union, intersection, and subtraction are all special cases of the
    /// resolver's behavior on one-sided and two-sided keys.
    ///
    /// Unlike the other set-algebra operations, `merge` has no identity short-circuit, so the
    /// resolver observes every key even in shared subtrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let n = TreapMap::new().insert(1, 1).insert(2, 2);
    /// let m = TreapMap::new().insert(2, 3).insert(3, 3);
    ///
    /// let merged = n.merge(&m, |_, left, right| match (left, right) {
    ///     (Some(left), Some(right)) => Some(left + right),
    ///     (Some(one), None) | (None, Some(one)) => Some(*one),
    ///     (None, None) => None,
    /// });
    /// assert_eq!(
    ///     merged.iter().collect::<Vec<(&u32, &u32)>>(),
    ///     vec![(&1, &1), (&2, &5), (&3, &3)],
    /// );
    /// ```
    pub fn merge<F>(&self, other: &Self, mut resolve: F) -> Self
    where
        T: Ord + Clone,
        U: Clone,
        F: FnMut(&T, Option<&U>, Option<&U>) -> Option<U>,
    {
        TreapMap {
            root: tree::merge(self.root.clone(), other.root.clone(), false, &mut resolve),
        }
    }

    /// Folds the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 10).insert(2, 20);
    /// let sum = map.fold(0, |acc, _, value| acc + value);
    /// assert_eq!(sum, 30);
    /// ```
    pub fn fold<B, F>(&self, seed: B, mut step: F) -> B
    where
        F: FnMut(B, &T, &U) -> B,
    {
        tree::fold(&self.root, seed, &mut |acc, entry: &Entry<T, U>| {
            step(acc, &entry.key, &entry.value)
        })
    }

    /// Folds the entries as `combine(combine(left_subtree, lift(key, value)), right_subtree)`,
    /// memoizing the result for every subtree in `cache`. `combine` must be associative and
    /// `empty` must be its identity; under that contract the result equals an ordered fold and
    /// is independent of the cache contents.
    ///
    /// See [`FoldCache`] for the cache's reuse and single-fold-function contract.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::{FoldCache, TreapMap};
    ///
    /// let map = TreapMap::new().insert(1, 10).insert(2, 20);
    /// let mut cache = FoldCache::new();
    /// let sum = map.fold_cached(&mut cache, 0, |_, value| *value, |x, y| x + y);
    /// assert_eq!(sum, 30);
    /// ```
    pub fn fold_cached<R, L, C>(
        &self,
        cache: &mut FoldCache<T, U, R>,
        empty: R,
        lift: L,
        combine: C,
    ) -> R
    where
        R: Clone,
        L: Fn(&T, &U) -> R,
        C: Fn(R, R) -> R,
    {
        cache.fold(
            &self.root,
            &empty,
            &|entry: &Entry<T, U>| lift(&entry.key, &entry.value),
            &combine,
        )
    }

    /// Checks whether two maps share the same root node. This is constant-time and implies
    /// equality; operations document when they guarantee root sharing.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1);
    /// assert!(map.union(&map).ptr_eq(&map));
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(l), Some(r)) => std::sync::Arc::ptr_eq(l, r),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns a read-only view of the root node for structural introspection, or `None` if
    /// the map is empty. Diagnostic tooling uses this to render tree shapes; see
    /// [`viz`](crate::viz).
    pub fn root(&self) -> Option<NodeView<'_, T, U>> {
        NodeView::new(&self.root)
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs in ascending
    /// key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_collections::treap::TreapMap;
    ///
    /// let map = TreapMap::new().insert(1, 1).insert(3, 3);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&3, &3)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> TreapMapIter<'_, T, U> {
        TreapMapIter {
            current: &self.root,
            stack: Vec::new(),
        }
    }
}

impl<T, U> Clone for TreapMap<T, U> {
    fn clone(&self) -> Self {
        TreapMap {
            root: self.root.clone(),
        }
    }
}

impl<T, U> IntoIterator for TreapMap<T, U>
where
    T: Clone,
    U: Clone,
{
    type IntoIter = TreapMapIntoIter<T, U>;
    type Item = (T, U);

    fn into_iter(self) -> Self::IntoIter {
        TreapMapIntoIter {
            current: self.root,
            stack: Vec::new(),
        }
    }
}

impl<'a, T, U> IntoIterator for &'a TreapMap<T, U> {
    type IntoIter = TreapMapIter<'a, T, U>;
    type Item = (&'a T, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `TreapMap<T, U>`.
///
/// This iterator traverses the entries of the map in-order and yields owned pairs, cloning
/// entries out of subtrees that are still shared with other maps.
pub struct TreapMapIntoIter<T, U> {
    current: tree::Tree<T, U>,
    stack: Vec<Node<T, U>>,
}

impl<T, U> Iterator for TreapMapIntoIter<T, U>
where
    T: Clone,
    U: Clone,
{
    type Item = (T, U);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(arc) = self.current.take() {
            let mut node = Node::unpack(arc);
            self.current = node.left.take();
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            let Node {
                entry: Entry { key, value },
                right,
                ..
            } = node;
            self.current = right;
            (key, value)
        })
    }
}

/// An iterator for `TreapMap<T, U>`.
///
/// This iterator traverses the entries of the map in-order and yields immutable references.
pub struct TreapMapIter<'a, T, U> {
    current: &'a tree::Tree<T, U>,
    stack: Vec<&'a Node<T, U>>,
}

impl<'a, T, U> Iterator for TreapMapIter<'a, T, U> {
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ref node) = *self.current {
            self.current = &node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            self.current = &node.right;
            (&node.entry.key, &node.entry.value)
        })
    }
}

impl<T, U> FromIterator<(T, U)> for TreapMap<T, U>
where
    T: Ord + Clone + Hash,
    U: Clone,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
    {
        iter.into_iter()
            .fold(TreapMap::new(), |map, (key, value)| map.insert(key, value))
    }
}

impl<T, U> Default for TreapMap<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, U, V> Index<&'a V> for TreapMap<T, U>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    type Output = U;

    fn index(&self, key: &V) -> &Self::Output {
        self.get(key).expect("Expected key to exist in map")
    }
}

impl<T, U> Add for TreapMap<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    type Output = TreapMap<T, U>;

    fn add(self, other: TreapMap<T, U>) -> TreapMap<T, U> {
        self.union(&other)
    }
}

impl<T, U> Sub for TreapMap<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    type Output = TreapMap<T, U>;

    fn sub(self, other: TreapMap<T, U>) -> TreapMap<T, U> {
        self.subtract(&other)
    }
}

impl<T, U> PartialEq for TreapMap<T, U>
where
    T: PartialEq,
    U: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        tree::eq(&self.root, &other.root)
    }
}

impl<T, U> Eq for TreapMap<T, U>
where
    T: Eq,
    U: Eq,
{
}

impl<T, U> Hash for TreapMap<T, U>
where
    T: Hash,
    U: Hash,
{
    // Per-entry digests are combined with a wrapping sum, so the hash is independent of entry
    // order and consistent with equality.
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        let mut digest: u64 = 0;
        for (key, value) in self {
            let mut hasher = SipHasher13::new_with_keys(ELEMENT_KEY_0, ELEMENT_KEY_1);
            key.hash(&mut hasher);
            value.hash(&mut hasher);
            digest = digest.wrapping_add(hasher.finish());
        }
        state.write_u64(digest);
        state.write_usize(self.len());
    }
}

impl<T, U> fmt::Debug for TreapMap<T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
