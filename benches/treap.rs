use criterion::{black_box, criterion_group, criterion_main, Criterion};
use persistent_collections::treap::{TreapMap, TreapSet};
use rand::Rng;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 100;

fn bench_btreemap_insert(c: &mut Criterion) {
    c.bench_function("bench btreemap insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut map = BTreeMap::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                map.insert(key, val);
            }
        })
    });
}

fn bench_btreemap_get(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = BTreeMap::new();
    let mut values = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        let val = rng.next_u32();

        map.insert(key, val);
        values.push(key);
    }

    c.bench_function("bench btreemap get", move |b| {
        b.iter(|| {
            for key in &values {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_treap_map_insert(c: &mut Criterion) {
    c.bench_function("bench treap map insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut map = TreapMap::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                map = map.insert(key, val);
            }
        })
    });
}

fn bench_treap_map_get(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = TreapMap::new();
    let mut values = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        let val = rng.next_u32();

        map = map.insert(key, val);
        values.push(key);
    }

    c.bench_function("bench treap map get", move |b| {
        b.iter(|| {
            for key in &values {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_treap_set_union_disjoint(c: &mut Criterion) {
    let a: TreapSet<u32> = (0..1_000).collect();
    let b: TreapSet<u32> = (1_000..2_000).collect();

    c.bench_function("bench treap set union disjoint", move |b_| {
        b_.iter(|| black_box(a.union(&b)))
    });
}

fn bench_treap_set_union_shared(c: &mut Criterion) {
    // `b` shares all but one root-to-leaf path with `a`, so the union is mostly identity
    // short-circuits.
    let a: TreapSet<u32> = (0..1_000).collect();
    let b = a.insert(1_000);

    c.bench_function("bench treap set union shared", move |b_| {
        b_.iter(|| black_box(a.union(&b)))
    });
}

criterion_group!(
    benches,
    bench_btreemap_insert,
    bench_btreemap_get,
    bench_treap_map_insert,
    bench_treap_map_get,
    bench_treap_set_union_disjoint,
    bench_treap_set_union_shared,
);

criterion_main!(benches);
