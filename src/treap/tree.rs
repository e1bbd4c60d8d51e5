use crate::entry::Entry;
use crate::treap::node::Node;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;

/// A possibly empty, shareable treap. Subtrees may be referenced from any number of trees at
/// once; nodes are never mutated after construction, so shared reads need no synchronization.
pub type Tree<T, U> = Option<Arc<Node<T, U>>>;

/// Returns the number of entries in the tree, reading the size cached at the root.
pub fn len<T, U>(tree: &Tree<T, U>) -> usize {
    tree.as_ref().map_or(0, |node| node.len)
}

/// Returns the number of nodes on the longest root-to-leaf path. Computed by traversal rather
/// than cached, since only diagnostics ask for it.
pub fn height<T, U>(tree: &Tree<T, U>) -> usize {
    tree.as_ref()
        .map_or(0, |node| 1 + height(&node.left).max(height(&node.right)))
}

pub fn get<'a, T, U, V>(tree: &'a Tree<T, U>, key: &V) -> Option<&'a Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => get(&node.left, key),
            Ordering::Greater => get(&node.right, key),
            Ordering::Equal => Some(&node.entry),
        }
    })
}

pub fn ceil<'a, T, U, V>(tree: &'a Tree<T, U>, key: &V) -> Option<&'a Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Greater => ceil(&node.right, key),
            Ordering::Less => match ceil(&node.left, key) {
                None => Some(&node.entry),
                res => res,
            },
            Ordering::Equal => Some(&node.entry),
        }
    })
}

pub fn floor<'a, T, U, V>(tree: &'a Tree<T, U>, key: &V) -> Option<&'a Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => floor(&node.left, key),
            Ordering::Greater => match floor(&node.right, key) {
                None => Some(&node.entry),
                res => res,
            },
            Ordering::Equal => Some(&node.entry),
        }
    })
}

pub fn min<T, U>(tree: &Tree<T, U>) -> Option<&Entry<T, U>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.entry
    })
}

pub fn max<T, U>(tree: &Tree<T, U>) -> Option<&Entry<T, U>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.entry
    })
}

/// Partitions a tree into entries with keys less than, equal to, and greater than `key`.
///
/// Only the nodes on the search path are rebuilt; every subtree that falls entirely on one side
/// of `key` is shared with the input tree.
pub fn split<T, U>(tree: Tree<T, U>, key: &T) -> (Tree<T, U>, Option<Entry<T, U>>, Tree<T, U>)
where
    T: Ord + Clone,
    U: Clone,
{
    match tree {
        Some(arc) => {
            let mut node = Node::unpack(arc);
            match key.cmp(&node.entry.key) {
                Ordering::Less => {
                    let (less, mid, greater) = split(node.left.take(), key);
                    node.left = greater;
                    node.update();
                    (less, mid, Some(Arc::new(node)))
                },
                Ordering::Greater => {
                    let (less, mid, greater) = split(node.right.take(), key);
                    node.right = less;
                    node.update();
                    (Some(Arc::new(node)), mid, greater)
                },
                Ordering::Equal => {
                    let Node {
                        entry, left, right, ..
                    } = node;
                    (left, Some(entry), right)
                },
            }
        },
        None => (None, None, None),
    }
}

/// Joins two trees where every key in `left` is less than every key in `right`.
///
/// The higher-ranked root becomes the root of the result; no keys are compared across the two
/// trees because the range precondition already fixes their relative order.
pub fn join<T, U>(left: Tree<T, U>, right: Tree<T, U>) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    match (left, right) {
        (Some(l), Some(r)) => {
            if l.outranks(r.priority, &r.entry.key) {
                let mut node = Node::unpack(l);
                node.right = join(node.right.take(), Some(r));
                node.update();
                Some(Arc::new(node))
            } else {
                let mut node = Node::unpack(r);
                node.left = join(Some(l), node.left.take());
                node.update();
                Some(Arc::new(node))
            }
        },
        (tree, None) | (None, tree) => tree,
    }
}

/// Joins two trees around a connecting entry whose key orders between them, sinking the entry
/// to the depth its priority demands. This is the priority-aware join `insert_with` is built on.
pub fn join_with<T, U>(
    left: Tree<T, U>,
    entry: Entry<T, U>,
    priority: u64,
    right: Tree<T, U>,
) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    match (left, right) {
        (Some(l), right_tree)
            if l.outranks(priority, &entry.key)
                && right_tree
                    .as_ref()
                    .map_or(true, |r| l.outranks(r.priority, &r.entry.key)) =>
        {
            let mut node = Node::unpack(l);
            node.right = join_with(node.right.take(), entry, priority, right_tree);
            node.update();
            Some(Arc::new(node))
        },
        (left_tree, Some(r)) if r.outranks(priority, &entry.key) => {
            let mut node = Node::unpack(r);
            node.left = join_with(left_tree, entry, priority, node.left.take());
            node.update();
            Some(Arc::new(node))
        },
        (left_tree, right_tree) => Node::branch(entry, priority, left_tree, right_tree),
    }
}

/// Inserts an entry, combining values with `combine(old, new)` when the key is already present.
/// The existing key is kept on duplicates, so its priority is unchanged.
pub fn insert_with<T, U, F>(
    tree: Tree<T, U>,
    key: T,
    value: U,
    priority: u64,
    combine: F,
) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
    F: FnOnce(U, U) -> U,
{
    let (less, mid, greater) = split(tree, &key);
    let entry = match mid {
        Some(old) => Entry {
            key: old.key,
            value: combine(old.value, value),
        },
        None => Entry { key, value },
    };
    join_with(less, entry, priority, greater)
}

/// Removes a key, returning the new tree, or `None` if the key was absent so that callers can
/// hand back the original root unchanged.
pub fn remove<T, U, V>(tree: &Tree<T, U>, key: &V) -> Option<Tree<T, U>>
where
    T: Ord + Clone + Borrow<V>,
    U: Clone,
    V: Ord + ?Sized,
{
    let node = tree.as_ref()?;
    match key.cmp(node.entry.key.borrow()) {
        Ordering::Less => {
            let left = remove(&node.left, key)?;
            Some(Node::branch(
                node.entry.clone(),
                node.priority,
                left,
                node.right.clone(),
            ))
        },
        Ordering::Greater => {
            let right = remove(&node.right, key)?;
            Some(Node::branch(
                node.entry.clone(),
                node.priority,
                node.left.clone(),
                right,
            ))
        },
        Ordering::Equal => Some(join(node.left.clone(), node.right.clone())),
    }
}

/// Returns the union of two trees, combining values of duplicate keys with
/// `combine(key, left_value, right_value)` in the orientation of the original operands.
///
/// Physically identical subtrees short-circuit to the left operand without consulting the
/// combiner, and either operand being empty returns the other unchanged.
pub fn union_with<T, U, F>(
    left: Tree<T, U>,
    right: Tree<T, U>,
    swapped: bool,
    combine: &mut F,
) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
    F: FnMut(&T, U, U) -> U,
{
    if let (Some(l), Some(r)) = (&left, &right) {
        if Arc::ptr_eq(l, r) {
            return left;
        }
    }
    match (left, right) {
        (Some(mut l), Some(mut r)) => {
            let mut swapped = swapped;
            if !l.outranks(r.priority, &r.entry.key) {
                mem::swap(&mut l, &mut r);
                swapped = !swapped;
            }
            let Node {
                entry,
                priority,
                left: left_subtree,
                right: right_subtree,
                ..
            } = Node::unpack(l);
            let (r_less, duplicate, r_greater) = split(Some(r), &entry.key);
            let left_subtree = union_with(left_subtree, r_less, swapped, combine);
            let right_subtree = union_with(right_subtree, r_greater, swapped, combine);
            let entry = match duplicate {
                Some(other) => {
                    let Entry { key, value } = entry;
                    let value = if swapped {
                        combine(&key, other.value, value)
                    } else {
                        combine(&key, value, other.value)
                    };
                    Entry { key, value }
                },
                None => entry,
            };
            Node::branch(entry, priority, left_subtree, right_subtree)
        },
        (tree, None) | (None, tree) => tree,
    }
}

/// Returns the intersection of two trees, combining values of common keys with
/// `combine(key, left_value, right_value)` in the orientation of the original operands.
pub fn inter_with<T, U, F>(
    left: Tree<T, U>,
    right: Tree<T, U>,
    swapped: bool,
    combine: &mut F,
) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
    F: FnMut(&T, U, U) -> U,
{
    if let (Some(l), Some(r)) = (&left, &right) {
        if Arc::ptr_eq(l, r) {
            return left;
        }
    }
    match (left, right) {
        (Some(mut l), Some(mut r)) => {
            let mut swapped = swapped;
            if !l.outranks(r.priority, &r.entry.key) {
                mem::swap(&mut l, &mut r);
                swapped = !swapped;
            }
            let Node {
                entry,
                priority,
                left: left_subtree,
                right: right_subtree,
                ..
            } = Node::unpack(l);
            let (r_less, duplicate, r_greater) = split(Some(r), &entry.key);
            let left_subtree = inter_with(left_subtree, r_less, swapped, combine);
            let right_subtree = inter_with(right_subtree, r_greater, swapped, combine);
            match duplicate {
                Some(other) => {
                    let Entry { key, value } = entry;
                    let value = if swapped {
                        combine(&key, other.value, value)
                    } else {
                        combine(&key, value, other.value)
                    };
                    Node::branch(Entry { key, value }, priority, left_subtree, right_subtree)
                },
                None => join(left_subtree, right_subtree),
            }
        },
        _ => None,
    }
}

/// Returns `left` with every key of `right` removed. Subtracting a tree from itself, or any
/// shared subtree from itself, short-circuits to an empty result.
pub fn subtract<T, U>(left: Tree<T, U>, right: Tree<T, U>, swapped: bool) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    if let (Some(l), Some(r)) = (&left, &right) {
        if Arc::ptr_eq(l, r) {
            return None;
        }
    }
    match (left, right) {
        (Some(mut l), Some(mut r)) => {
            let mut swapped = swapped;
            if !l.outranks(r.priority, &r.entry.key) {
                mem::swap(&mut l, &mut r);
                swapped = !swapped;
            }
            let Node {
                entry,
                priority,
                left: left_subtree,
                right: right_subtree,
                ..
            } = Node::unpack(l);
            let (r_less, duplicate, r_greater) = split(Some(r), &entry.key);
            let left_subtree = subtract(left_subtree, r_less, swapped);
            let right_subtree = subtract(right_subtree, r_greater, swapped);
            if duplicate.is_some() || swapped {
                join(left_subtree, right_subtree)
            } else {
                Node::branch(entry, priority, left_subtree, right_subtree)
            }
        },
        (left_tree, right_tree) => {
            if swapped {
                right_tree
            } else {
                left_tree
            }
        },
    }
}

/// Returns the tree of keys present in exactly one of the two trees.
pub fn symmetric_difference<T, U>(left: Tree<T, U>, right: Tree<T, U>) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
{
    if let (Some(l), Some(r)) = (&left, &right) {
        if Arc::ptr_eq(l, r) {
            return None;
        }
    }
    match (left, right) {
        (Some(mut l), Some(mut r)) => {
            if !l.outranks(r.priority, &r.entry.key) {
                mem::swap(&mut l, &mut r);
            }
            let Node {
                entry,
                priority,
                left: left_subtree,
                right: right_subtree,
                ..
            } = Node::unpack(l);
            let (r_less, duplicate, r_greater) = split(Some(r), &entry.key);
            let left_subtree = symmetric_difference(left_subtree, r_less);
            let right_subtree = symmetric_difference(right_subtree, r_greater);
            match duplicate {
                Some(_) => join(left_subtree, right_subtree),
                None => Node::branch(entry, priority, left_subtree, right_subtree),
            }
        },
        (tree, None) | (None, tree) => tree,
    }
}

/// Key-wise outer merge of two trees. The resolver is consulted once for every key present in
/// either tree, in the orientation of the original operands, and returning `None` drops the
/// key from the result. There is no identity short-circuit: the resolver sees shared keys too.
pub fn merge<T, U, F>(
    left: Tree<T, U>,
    right: Tree<T, U>,
    swapped: bool,
    resolve: &mut F,
) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
    F: FnMut(&T, Option<&U>, Option<&U>) -> Option<U>,
{
    match (left, right) {
        (Some(mut l), Some(mut r)) => {
            let mut swapped = swapped;
            if !l.outranks(r.priority, &r.entry.key) {
                mem::swap(&mut l, &mut r);
                swapped = !swapped;
            }
            let Node {
                entry,
                priority,
                left: left_subtree,
                right: right_subtree,
                ..
            } = Node::unpack(l);
            let (r_less, duplicate, r_greater) = split(Some(r), &entry.key);
            let left_subtree = merge(left_subtree, r_less, swapped, resolve);
            let right_subtree = merge(right_subtree, r_greater, swapped, resolve);
            let resolved = match &duplicate {
                Some(other) => {
                    if swapped {
                        resolve(&entry.key, Some(&other.value), Some(&entry.value))
                    } else {
                        resolve(&entry.key, Some(&entry.value), Some(&other.value))
                    }
                },
                None => {
                    if swapped {
                        resolve(&entry.key, None, Some(&entry.value))
                    } else {
                        resolve(&entry.key, Some(&entry.value), None)
                    }
                },
            };
            match resolved {
                Some(value) => Node::branch(
                    Entry {
                        key: entry.key,
                        value,
                    },
                    priority,
                    left_subtree,
                    right_subtree,
                ),
                None => join(left_subtree, right_subtree),
            }
        },
        (Some(l), None) => resolve_one_sided(Some(l), swapped, resolve),
        (None, Some(r)) => resolve_one_sided(Some(r), !swapped, resolve),
        (None, None) => None,
    }
}

// Filters a subtree whose keys are present in only one merge operand through the resolver.
// `swapped` is true when the subtree came from the right operand.
fn resolve_one_sided<T, U, F>(tree: Tree<T, U>, swapped: bool, resolve: &mut F) -> Tree<T, U>
where
    T: Ord + Clone,
    U: Clone,
    F: FnMut(&T, Option<&U>, Option<&U>) -> Option<U>,
{
    match tree {
        Some(arc) => {
            let Node {
                entry,
                priority,
                left,
                right,
                ..
            } = Node::unpack(arc);
            let left = resolve_one_sided(left, swapped, resolve);
            let right = resolve_one_sided(right, swapped, resolve);
            let resolved = if swapped {
                resolve(&entry.key, None, Some(&entry.value))
            } else {
                resolve(&entry.key, Some(&entry.value), None)
            };
            match resolved {
                Some(value) => Node::branch(
                    Entry {
                        key: entry.key,
                        value,
                    },
                    priority,
                    left,
                    right,
                ),
                None => join(left, right),
            }
        },
        None => None,
    }
}

/// Checks whether every key of `left` is present in `right`.
pub fn is_subset<T, U>(left: &Tree<T, U>, right: &Tree<T, U>) -> bool
where
    T: Ord + Clone,
    U: Clone,
{
    match (left, right) {
        (None, _) => true,
        (_, None) => false,
        (Some(l), Some(r)) => {
            if Arc::ptr_eq(l, r) {
                return true;
            }
            if l.len > r.len {
                return false;
            }
            let (r_less, duplicate, r_greater) = split(right.clone(), &l.entry.key);
            duplicate.is_some() && is_subset(&l.left, &r_less) && is_subset(&l.right, &r_greater)
        },
    }
}

/// Checks whether two trees have no key in common.
pub fn is_disjoint<T, U>(left: &Tree<T, U>, right: &Tree<T, U>) -> bool
where
    T: Ord + Clone,
    U: Clone,
{
    match (left, right) {
        (None, _) | (_, None) => true,
        (Some(l), Some(r)) => {
            if Arc::ptr_eq(l, r) {
                return false;
            }
            let (r_less, duplicate, r_greater) = split(right.clone(), &l.entry.key);
            duplicate.is_none()
                && is_disjoint(&l.left, &r_less)
                && is_disjoint(&l.right, &r_greater)
        },
    }
}

/// Folds the entries in ascending key order.
pub fn fold<T, U, B, F>(tree: &Tree<T, U>, acc: B, step: &mut F) -> B
where
    F: FnMut(B, &Entry<T, U>) -> B,
{
    match tree {
        Some(node) => {
            let acc = fold(&node.left, acc, step);
            let acc = step(acc, &node.entry);
            fold(&node.right, acc, step)
        },
        None => acc,
    }
}

/// Structural equality with identity short-circuits. Because the shape of a tree is a pure
/// function of its key set, two trees are equal if and only if they hold the same entries.
pub fn eq<T, U>(left: &Tree<T, U>, right: &Tree<T, U>) -> bool
where
    T: PartialEq,
    U: PartialEq,
{
    match (left, right) {
        (Some(l), Some(r)) => {
            Arc::ptr_eq(l, r)
                || (l.len == r.len
                    && l.entry == r.entry
                    && eq(&l.left, &r.left)
                    && eq(&l.right, &r.right))
        },
        (None, None) => true,
        _ => false,
    }
}
