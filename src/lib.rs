//! Persistent ordered sets and maps backed by structurally-shared treaps.
//!
//! The collections in this crate are designed for workloads that build, compare, and combine
//! very large numbers of overlapping collections, such as program-analysis tools tracking sets
//! of facts across many program points. Updating a collection rebuilds one root-to-target path
//! and shares everything else, set algebra short-circuits on physically shared subtrees, and
//! folds can be memoized by subtree identity across related collections.

mod entry;
pub mod treap;
pub mod viz;
