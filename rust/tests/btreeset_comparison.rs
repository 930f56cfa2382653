//! Differential tests against the standard library's ordered collections.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use balanced_trees::{BPlusTreeMap, BTree, TwoThreeFourTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_log::test;

const OPERATIONS: usize = 5_000;

fn random_bound(rng: &mut StdRng, max: i32) -> Bound<i32> {
    match rng.gen_range(0..3) {
        0 => Bound::Included(rng.gen_range(0..max)),
        1 => Bound::Excluded(rng.gen_range(0..max)),
        _ => Bound::Unbounded,
    }
}

/// std panics on inverted or empty-excluded ranges; skip those.
fn valid_range(start: Bound<i32>, end: Bound<i32>) -> bool {
    match (start, end) {
        (Bound::Included(s), Bound::Included(e)) => s <= e,
        (Bound::Included(s), Bound::Excluded(e)) | (Bound::Excluded(s), Bound::Included(e)) => {
            s <= e
        }
        (Bound::Excluded(s), Bound::Excluded(e)) => s < e,
        _ => true,
    }
}

#[test]
fn bplus_map_matches_btreemap() {
    for (min_degree, seed) in [(2, 1), (3, 2), (8, 3)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ours = BPlusTreeMap::new(min_degree).unwrap();
        let mut std_map = BTreeMap::new();

        for step in 0..OPERATIONS {
            let key = rng.gen_range(0..500);
            match rng.gen_range(0..10) {
                0..=4 => {
                    let value = format!("v{}", step);
                    assert_eq!(ours.insert(key, value.clone()), std_map.insert(key, value));
                }
                5..=7 => assert_eq!(ours.remove(&key), std_map.remove(&key)),
                8 => assert_eq!(ours.get(&key), std_map.get(&key)),
                _ => {
                    if let (Some(a), Some(b)) = (ours.get_mut(&key), std_map.get_mut(&key)) {
                        a.push('!');
                        b.push('!');
                    }
                }
            }
            if step % 250 == 0 {
                ours.validate().unwrap();
                assert!(ours.items().eq(std_map.iter()));
            }
        }

        assert_eq!(ours.len(), std_map.len());
        assert_eq!(ours.first(), std_map.first_key_value());
        assert_eq!(ours.last(), std_map.last_key_value());
        assert!(ours.keys().eq(std_map.keys()));
        assert!(ours.values().eq(std_map.values()));
    }
}

#[test]
fn bplus_ranges_match_btreemap() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ours = BPlusTreeMap::new(2).unwrap();
    let mut std_map = BTreeMap::new();
    for _ in 0..400 {
        let key = rng.gen_range(0..1_000);
        ours.insert(key, key * 3);
        std_map.insert(key, key * 3);
    }

    let mut checked = 0;
    while checked < 500 {
        let start = random_bound(&mut rng, 1_000);
        let end = random_bound(&mut rng, 1_000);
        if !valid_range(start, end) {
            continue;
        }
        assert!(
            ours.range((start, end)).eq(std_map.range((start, end))),
            "range {:?}..{:?}",
            start,
            end
        );
        checked += 1;
    }

    let lo = 100;
    let hi = 300;
    let expected: Vec<_> = std_map.range(lo..=hi).map(|(_, v)| v).collect();
    assert_eq!(ours.range_query(&lo, &hi), expected);
    assert!(ours.range_query(&hi, &lo).is_empty());
}

#[test]
fn btree_matches_btreeset() {
    for min_degree in [2, 3, 6] {
        let mut rng = StdRng::seed_from_u64(min_degree as u64);
        let mut ours = BTree::new(min_degree).unwrap();
        let mut std_set = BTreeSet::new();

        for step in 0..OPERATIONS {
            let key = rng.gen_range(0..400);
            if rng.gen_bool(0.55) {
                assert_eq!(ours.insert(key), std_set.insert(key));
            } else {
                assert_eq!(ours.delete(&key), std_set.take(&key));
            }
            if step % 250 == 0 {
                ours.validate().unwrap();
            }
        }

        assert!(ours.iter().eq(std_set.iter()));
        assert_eq!(ours.min(), std_set.first());
        assert_eq!(ours.max(), std_set.last());
    }
}

#[test]
fn two_three_four_matches_btreeset() {
    let mut rng = StdRng::seed_from_u64(234);
    let mut ours = TwoThreeFourTree::new();
    let mut std_set = BTreeSet::new();

    for _ in 0..OPERATIONS {
        let key: u16 = rng.gen_range(0..300);
        if rng.gen_bool(0.5) {
            assert_eq!(ours.insert(key), std_set.insert(key));
        } else {
            assert_eq!(ours.contains(&key), std_set.contains(&key));
            assert_eq!(ours.delete(&key), std_set.take(&key));
        }
    }

    ours.as_btree().validate().unwrap();
    assert!(ours.iter().eq(std_set.iter()));
    assert_eq!(ours.len(), std_set.len());
}
