use persistent_collections::treap::{FoldCache, NodeView, TreapMap, TreapSet};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

fn seeded_rng() -> rand::XorShiftRng {
    rand::SeedableRng::from_seed([1, 1, 1, 1])
}

fn random_set(rng: &mut rand::XorShiftRng, max: u32, len: usize) -> TreapSet<u32> {
    (0..len).map(|_| rng.gen::<u32>() % max).collect()
}

// Walks a tree checking the search order, the heap order on (priority, key) ranks, and the
// cached subtree sizes.
fn check_invariants<T>(node: NodeView<'_, T, ()>, lower: Option<&T>, upper: Option<&T>) -> usize
where
    T: Ord,
{
    if let Some(lower) = lower {
        assert!(node.key() > lower);
    }
    if let Some(upper) = upper {
        assert!(node.key() < upper);
    }
    let mut len = 1;
    if let Some(child) = node.left() {
        assert!((node.priority(), node.key()) > (child.priority(), child.key()));
        len += check_invariants(child, lower, Some(node.key()));
    }
    if let Some(child) = node.right() {
        assert!((node.priority(), node.key()) > (child.priority(), child.key()));
        len += check_invariants(child, Some(node.key()), upper);
    }
    assert_eq!(node.len(), len);
    len
}

fn walked_height(node: Option<NodeView<'_, u32, ()>>) -> usize {
    node.map_or(0, |node| {
        1 + walked_height(node.left()).max(walked_height(node.right()))
    })
}

fn check_set(set: &TreapSet<u32>) {
    match set.root() {
        Some(root) => assert_eq!(check_invariants(root, None, None), set.len()),
        None => assert_eq!(set.len(), 0),
    }
    assert_eq!(set.height(), walked_height(set.root()));
}

#[test]
fn int_test_treap_map() {
    let mut rng = seeded_rng();
    let mut map = TreapMap::new();
    let mut expected = BTreeMap::new();
    for _ in 0..10_000 {
        let key = rng.gen::<u32>() % 2_000;
        let val = rng.gen::<u32>();

        map = map.insert(key, val);
        expected.insert(key, val);
    }

    assert_eq!(map.len(), expected.len());
    assert_eq!(map.min(), expected.keys().next());
    assert_eq!(map.max(), expected.keys().next_back());

    for (key, value) in &expected {
        assert!(map.contains_key(key));
        assert_eq!(map.get(key), Some(value));
        assert_eq!(map.ceil(key), Some(key));
        assert_eq!(map.floor(key), Some(key));
    }

    assert_eq!(
        map.iter().collect::<Vec<_>>(),
        expected.iter().collect::<Vec<_>>(),
    );

    let mut expected_len = expected.len();
    for key in expected.keys() {
        map = map.remove(key);
        expected_len -= 1;
        assert!(!map.contains_key(key));
        assert_eq!(map.len(), expected_len);
    }
    assert!(map.is_empty());
}

#[test]
fn int_test_invariants_after_set_algebra() {
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let a = random_set(&mut rng, 500, 200);
        let b = random_set(&mut rng, 500, 200);

        check_set(&a);
        check_set(&b);
        check_set(&a.union(&b));
        check_set(&a.inter(&b));
        check_set(&a.subtract(&b));
        check_set(&a.symmetric_difference(&b));
        check_set(&a.insert(rng.gen::<u32>() % 1_000));
        check_set(&a.remove(&(rng.gen::<u32>() % 1_000)));
    }
}

#[test]
fn int_test_set_algebra_laws() {
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let a = random_set(&mut rng, 500, 200);
        let b = random_set(&mut rng, 500, 200);

        let union = a.union(&b);
        let inter = a.inter(&b);
        let diff = a.subtract(&b);
        let sym = a.symmetric_difference(&b);

        assert!(a.is_subset(&union));
        assert!(b.is_subset(&union));
        assert!(inter.is_subset(&a));
        assert!(inter.is_subset(&b));
        assert!(diff.is_disjoint(&b));
        assert_eq!(union.inter(&b), b);
        assert_eq!(diff.union(&inter), a);
        assert_eq!(diff.union(&b), union);
        assert_eq!(sym, diff.union(&b.subtract(&a)));
        assert_eq!(union.subtract(&inter), sym);

        let model_a: BTreeSet<u32> = a.iter().cloned().collect();
        let model_b: BTreeSet<u32> = b.iter().cloned().collect();
        assert_eq!(
            union.iter().cloned().collect::<Vec<_>>(),
            model_a.union(&model_b).cloned().collect::<Vec<_>>(),
        );
        assert_eq!(
            inter.iter().cloned().collect::<Vec<_>>(),
            model_a.intersection(&model_b).cloned().collect::<Vec<_>>(),
        );
        assert_eq!(
            diff.iter().cloned().collect::<Vec<_>>(),
            model_a.difference(&model_b).cloned().collect::<Vec<_>>(),
        );
        assert_eq!(
            sym.iter().cloned().collect::<Vec<_>>(),
            model_a.symmetric_difference(&model_b).cloned().collect::<Vec<_>>(),
        );
    }
}

#[test]
fn int_test_overlapping_ranges() {
    let a: TreapSet<u32> = (1..=20).collect();
    let b: TreapSet<u32> = (10..=30).collect();

    let union = a.union(&b);
    assert_eq!(union.len(), 30);
    assert_eq!(
        union.iter().cloned().collect::<Vec<_>>(),
        (1..=30).collect::<Vec<_>>(),
    );

    let inter = a.inter(&b);
    assert_eq!(inter.len(), 11);
    assert_eq!(
        inter.iter().cloned().collect::<Vec<_>>(),
        (10..=20).collect::<Vec<_>>(),
    );

    let diff = a.subtract(&b);
    assert_eq!(
        diff.iter().cloned().collect::<Vec<_>>(),
        (1..=9).collect::<Vec<_>>(),
    );
}

#[test]
fn int_test_sharing_short_circuits() {
    let a: TreapSet<u32> = (1..1_000).collect();

    assert!(a.union(&a).ptr_eq(&a));
    assert!(a.inter(&a).ptr_eq(&a));
    assert!(a.subtract(&a).is_empty());
    assert!(a.symmetric_difference(&a).is_empty());

    let removed = a.remove(&500);
    assert_eq!(removed.remove(&500), removed);
    assert!(removed.remove(&500).ptr_eq(&removed));
    assert!(a.remove(&5_000).ptr_eq(&a));
    assert!(a.insert(500).ptr_eq(&a));
}

#[test]
fn int_test_same_keys_same_shape() {
    // Trees over the same keys have identical shapes no matter how they were built, so
    // equality can short-circuit structurally.
    let mut rng = seeded_rng();
    let mut keys: Vec<u32> = (0..500).map(|_| rng.gen::<u32>() % 300).collect();
    let forward: TreapSet<u32> = keys.iter().cloned().collect();
    keys.reverse();
    let backward: TreapSet<u32> = keys.iter().cloned().collect();

    assert_eq!(forward, backward);
    fn shapes_match(a: Option<NodeView<'_, u32, ()>>, b: Option<NodeView<'_, u32, ()>>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => {
                a.key() == b.key()
                    && shapes_match(a.left(), b.left())
                    && shapes_match(a.right(), b.right())
            },
            (None, None) => true,
            _ => false,
        }
    }
    assert!(shapes_match(forward.root(), backward.root()));
}

fn resolve(key: &u32, left: Option<&u32>, right: Option<&u32>) -> Option<u32> {
    if key % 5 == 0 {
        None
    } else {
        Some(left.cloned().unwrap_or(0) + right.cloned().unwrap_or(0))
    }
}

#[test]
fn int_test_merge_matches_resolver() {
    let mut rng = seeded_rng();
    let a: TreapMap<u32, u32> = (0..300)
        .map(|_| (rng.gen::<u32>() % 400, rng.gen::<u32>() % 100))
        .collect();
    let b: TreapMap<u32, u32> = (0..300)
        .map(|_| (rng.gen::<u32>() % 400, rng.gen::<u32>() % 100))
        .collect();

    let merged = a.merge(&b, resolve);

    for key in 0..400u32 {
        let expected = match (a.get(&key), b.get(&key)) {
            (None, None) => None,
            (left, right) => resolve(&key, left, right),
        };
        assert_eq!(merged.get(&key).cloned(), expected);
    }
}

#[test]
fn int_test_fold_cache_transparent() {
    let mut rng = seeded_rng();
    let base: TreapSet<u32> = (1..500).collect();
    let mut cache = FoldCache::new();

    for _ in 0..50 {
        let set = base
            .insert(rng.gen::<u32>() % 2_000)
            .remove(&(rng.gen::<u32>() % 500))
            .union(&random_set(&mut rng, 1_000, 20));

        let plain = set.fold(0u64, |acc, key| acc + u64::from(*key));
        let cached = set.fold_cached(&mut cache, 0, |key| u64::from(*key), |x, y| x + y);
        assert_eq!(plain, cached);
    }
}
