use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use rb_collections::red_black_tree::{RedBlackMap, RedBlackMultimap, RedBlackTree};
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

fn bench_red_black_map_insert(c: &mut Criterion) {
    c.bench_function("bench red black map insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut map = RedBlackMap::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                map.set(key, val).unwrap();
            }
        })
    });
}

fn bench_red_black_map_get(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = RedBlackMap::new();
    let mut values = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        let val = rng.next_u32();

        map.set(key, val).unwrap();
        values.push(key);
    }

    c.bench_function("bench red black map get", move |b| {
        b.iter(|| {
            for key in &values {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_red_black_multimap_insert(c: &mut Criterion) {
    c.bench_function("bench red black multimap insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut map = RedBlackMultimap::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.gen_range(0, 16);
                let val = rng.next_u32();

                map.insert(key, val).unwrap();
            }
        })
    });
}

fn bench_red_black_tree_erase(c: &mut Criterion) {
    c.bench_function("bench red black tree erase", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut tree = RedBlackTree::new();
            for _ in 0..NUM_OF_OPERATIONS {
                tree.insert_equal(rng.next_u32(), ()).unwrap();
            }
            while !tree.is_empty() {
                let position = tree.begin();
                tree.erase(position);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_btreemap_get,
    bench_btreemap_insert,
    bench_red_black_map_get,
    bench_red_black_map_insert,
    bench_red_black_multimap_insert,
    bench_red_black_tree_erase,
);
criterion_main!(benches);
