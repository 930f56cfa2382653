use balanced_trees::{AvlTree, BPlusTreeSet, BTree, RedBlackTree, SearchTree, TwoThreeFourTree};
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, Bencher, BenchmarkId, Criterion,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

const SIZES: [usize; 2] = [1_000, 10_000];

fn shuffled(size: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..size as u64).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(42));
    keys
}

fn build<T: SearchTree<u64>>(mut tree: T, keys: &[u64]) -> T {
    for &key in keys {
        tree.insert(key);
    }
    tree
}

fn insert_all<T: SearchTree<u64>>(b: &mut Bencher, make: impl Fn() -> T, keys: &[u64]) {
    b.iter(|| black_box(build(make(), keys).len()))
}

fn search_all<T: SearchTree<u64>>(b: &mut Bencher, make: impl Fn() -> T, keys: &[u64]) {
    let tree = build(make(), keys);
    b.iter(|| keys.iter().filter(|k| tree.search(k).is_some()).count())
}

fn delete_all<T: SearchTree<u64>>(b: &mut Bencher, make: impl Fn() -> T, keys: &[u64]) {
    b.iter_batched(
        || build(make(), keys),
        |mut tree| {
            for key in keys.iter().rev() {
                tree.delete(key);
            }
            tree.len()
        },
        BatchSize::LargeInput,
    )
}

/// Run `$bench` once per tree variant.
macro_rules! bench_each_tree {
    ($group:expr, $size:expr, $keys:expr, $bench:ident) => {{
        let keys = $keys;
        $group.bench_with_input(BenchmarkId::new("avl", $size), keys, |b, keys| {
            $bench(b, AvlTree::new, keys)
        });
        $group.bench_with_input(BenchmarkId::new("red_black", $size), keys, |b, keys| {
            $bench(b, RedBlackTree::new, keys)
        });
        $group.bench_with_input(BenchmarkId::new("btree_t8", $size), keys, |b, keys| {
            $bench(b, || BTree::new(8).unwrap(), keys)
        });
        $group.bench_with_input(BenchmarkId::new("two_three_four", $size), keys, |b, keys| {
            $bench(b, TwoThreeFourTree::new, keys)
        });
        $group.bench_with_input(BenchmarkId::new("bplus_t8", $size), keys, |b, keys| {
            $bench(b, || BPlusTreeSet::new(8).unwrap(), keys)
        });
    }};
}

fn insertion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    for size in SIZES {
        let keys = shuffled(size);
        group.bench_with_input(BenchmarkId::new("std_btreeset", size), &keys, |b, keys| {
            b.iter(|| black_box(keys.iter().copied().collect::<BTreeSet<_>>()))
        });
        bench_each_tree!(group, size, keys.as_slice(), insert_all);
    }
    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_random");
    for size in SIZES {
        let keys = shuffled(size);
        bench_each_tree!(group, size, keys.as_slice(), search_all);
    }
    group.finish();
}

fn deletion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_all");
    let keys = shuffled(10_000);
    bench_each_tree!(group, 10_000, keys.as_slice(), delete_all);
    group.finish();
}

criterion_group!(
    benches,
    insertion_benchmark,
    lookup_benchmark,
    deletion_benchmark
);
criterion_main!(benches);
