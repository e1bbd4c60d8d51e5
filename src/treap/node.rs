use crate::entry::Entry;
use crate::treap::tree;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Fixed SipHash-1-3 keys for deriving priorities. Changing these changes the
// shape of every tree, so they are part of the crate's compatibility contract.
const PRIORITY_KEY_0: u64 = 0x51c0_2a10_73a2_5d8e;
const PRIORITY_KEY_1: u64 = 0x9e37_79b9_7f4a_7c15;

/// Returns the priority of a key.
///
/// The priority is a pure function of the key, so the same key receives the same priority in
/// every tree in the process. Combined with the binary search tree and heap invariants, this
/// makes the shape of a tree a pure function of its key set, which is what lets independently
/// built trees over overlapping key sets share physically identical subtrees.
pub fn priority<T>(key: &T) -> u64
where
    T: Hash,
{
    let mut hasher = SipHasher13::new_with_keys(PRIORITY_KEY_0, PRIORITY_KEY_1);
    key.hash(&mut hasher);
    hasher.finish()
}

/// A struct representing an internal node of a treap.
///
/// Nodes are immutable once wrapped in an `Arc`; every mutating operation rebuilds the nodes on
/// one root-to-target path and shares the rest with the original tree.
#[derive(Clone)]
pub struct Node<T, U> {
    pub entry: Entry<T, U>,
    pub priority: u64,
    pub len: usize,
    pub left: tree::Tree<T, U>,
    pub right: tree::Tree<T, U>,
}

impl<T, U> Node<T, U> {
    /// Builds a shared node from an entry, its priority, and two subtrees. The entry must
    /// outrank both subtree roots and its key must order between them.
    pub fn branch(
        entry: Entry<T, U>,
        priority: u64,
        left: tree::Tree<T, U>,
        right: tree::Tree<T, U>,
    ) -> tree::Tree<T, U> {
        let len = 1 + tree::len(&left) + tree::len(&right);
        Some(Arc::new(Node {
            entry,
            priority,
            len,
            left,
            right,
        }))
    }

    /// Recomputes the cached subtree size from the children.
    pub fn update(&mut self) {
        self.len = 1 + tree::len(&self.left) + tree::len(&self.right);
    }

    /// Returns `true` if this node must sit above the given rank in heap order. Priority ties
    /// are broken by key, so the rank order is total and the tree shape is deterministic.
    pub fn outranks(&self, priority: u64, key: &T) -> bool
    where
        T: Ord,
    {
        (self.priority, &self.entry.key) > (priority, key)
    }

    /// Takes ownership of a shared node, reusing the allocation when this was the only
    /// reference and cloning the entry otherwise. The children are shared either way.
    pub fn unpack(node: Arc<Node<T, U>>) -> Node<T, U>
    where
        T: Clone,
        U: Clone,
    {
        Arc::try_unwrap(node).unwrap_or_else(|node| (*node).clone())
    }
}

/// A read-only view of a tree node, exposing its key, value, children, and identity.
///
/// Views are consumed by diagnostic tooling such as [`viz`](crate::viz) to render tree shapes;
/// they provide no way to mutate the tree and algorithmic code never depends on them.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::TreapSet;
///
/// let set: TreapSet<u32> = (1..100).collect();
/// let root = set.root().unwrap();
/// assert!(root.left().map_or(true, |child| child.key() < root.key()));
/// assert!(root.right().map_or(true, |child| child.key() > root.key()));
/// ```
pub struct NodeView<'a, T, U> {
    node: &'a Arc<Node<T, U>>,
}

impl<'a, T, U> NodeView<'a, T, U> {
    pub(crate) fn new(tree: &'a tree::Tree<T, U>) -> Option<Self> {
        tree.as_ref().map(|node| NodeView { node })
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &'a T {
        &self.node.entry.key
    }

    /// Returns the value stored in this node.
    pub fn value(&self) -> &'a U {
        &self.node.entry.value
    }

    /// Returns the priority of this node.
    pub fn priority(&self) -> u64 {
        self.node.priority
    }

    /// Returns the number of entries in the subtree rooted at this node.
    pub fn len(&self) -> usize {
        self.node.len
    }

    /// Returns a view of the left child, if any.
    pub fn left(&self) -> Option<NodeView<'a, T, U>> {
        NodeView::new(&self.node.left)
    }

    /// Returns a view of the right child, if any.
    pub fn right(&self) -> Option<NodeView<'a, T, U>> {
        NodeView::new(&self.node.right)
    }

    /// Returns the identity of this node. Two views return the same pointer if and only if they
    /// view the same shared node.
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(self.node) as *const ()
    }

    /// Checks whether two views refer to the same shared node.
    pub fn ptr_eq(&self, other: &NodeView<'_, T, U>) -> bool {
        Arc::ptr_eq(self.node, other.node)
    }
}

impl<'a, T, U> Clone for NodeView<'a, T, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, U> Copy for NodeView<'a, T, U> {}
