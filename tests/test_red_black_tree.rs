use rand::Rng;
use rb_collections::red_black_tree::{Position, RedBlackMultimap, RedBlackTree};
use std::collections::{BTreeMap, HashMap};

const NUM_OF_OPERATIONS: usize = 5_000;
const KEY_RANGE: u32 = 500;

fn init_logger() {
    let _ = simplelog::SimpleLogger::init(
        simplelog::LevelFilter::Warn,
        simplelog::Config::default(),
    );
}

fn assert_extremes<V, C>(tree: &RedBlackTree<u32, V, C>) {
    let keys: Vec<&u32> = tree.iter().map(|(key, _)| key).collect();
    match (keys.first(), keys.last()) {
        (Some(min), Some(max)) => {
            assert_eq!(tree.key(tree.begin()), *min);
            assert_eq!(tree.key(tree.prev(tree.end())), *max);
        }
        _ => {
            assert_eq!(tree.begin(), tree.end());
            assert_eq!(tree.prev(tree.end()), tree.end());
        }
    }
}

#[test]
fn int_test_unique_tree() {
    init_logger();
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut tree = RedBlackTree::new();
    let mut expected = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE);
        let val = rng.next_u32();

        if rng.gen_range(0, 3) == 0 {
            let erased = tree.erase_key(&key);
            assert_eq!(erased, expected.remove(&key).map_or(0, |_| 1));
            assert_eq!(tree.find(&key), tree.end());
        } else {
            let inserted = tree.insert_unique(key, val).unwrap().is_inserted();
            assert_eq!(inserted, !expected.contains_key(&key));
            expected.entry(key).or_insert(val);
        }

        assert_eq!(tree.len(), expected.len());
        assert!(tree.verify());
    }

    assert_extremes(&tree);
    assert_eq!(
        tree.iter().collect::<Vec<(&u32, &u32)>>(),
        expected.iter().collect::<Vec<(&u32, &u32)>>(),
    );

    for key in 0..KEY_RANGE {
        let position = tree.find(&key);
        match expected.get(&key) {
            Some(val) => assert_eq!(tree.get(position), Some((&key, val))),
            None => assert!(position.is_end()),
        }
    }
}

#[test]
fn int_test_equal_tree() {
    init_logger();
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([2, 2, 2, 2]);
    let mut map = RedBlackMultimap::new();
    let mut expected: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE / 10);
        let val = rng.next_u32();

        if rng.gen_range(0, 5) == 0 {
            let count = map.count(&key);
            assert_eq!(map.remove_all(&key), count);
            assert_eq!(count, expected.remove(&key).map_or(0, |vals| vals.len()));
            assert!(!map.contains_key(&key));
        } else {
            map.insert(key, val).unwrap();
            expected.entry(key).or_insert_with(Vec::new).push(val);
        }

        assert!(map.tree().verify());
    }

    assert_extremes(map.tree());
    for (key, vals) in &expected {
        assert_eq!(map.count(key), vals.len());
        assert_eq!(
            map.get_all(key).map(|(_, val)| *val).collect::<Vec<u32>>(),
            *vals,
        );
    }
    assert_eq!(map.len(), expected.values().map(Vec::len).sum::<usize>());
}

#[test]
fn int_test_positions_are_stable() {
    init_logger();
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([3, 3, 3, 3]);
    let mut tree = RedBlackTree::new();
    let mut positions: HashMap<u32, Position> = HashMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE);

        match positions.remove(&key) {
            Some(position) => {
                assert_eq!(tree.key(position), &key);
                tree.erase(position);
                assert_eq!(tree.get(position), None);
            }
            None => {
                let position = tree.insert_unique(key, key * 2).unwrap().position();
                positions.insert(key, position);
            }
        }
    }

    assert!(tree.verify());
    assert_eq!(tree.len(), positions.len());
    for (key, position) in &positions {
        assert_eq!(tree.get(*position), Some((key, &(key * 2))));
    }
}

#[test]
fn int_test_erase_range_in_order() {
    init_logger();
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([4, 4, 4, 4]);
    let mut tree = RedBlackTree::new();
    let mut expected = Vec::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE);
        tree.insert_equal(key, ()).unwrap();
        expected.push(key);
    }
    expected.sort();

    while !tree.is_empty() {
        let low = rng.gen_range(0, KEY_RANGE);
        let high = rng.gen_range(low, KEY_RANGE + 1);
        let first = tree.lower_bound(&low);
        let last = tree.lower_bound(&high);

        let erased = tree.erase_range(first, last);
        let before = expected.len();
        expected.retain(|key| *key < low || *key >= high);
        assert_eq!(erased, before - expected.len());

        assert!(tree.verify());
        assert_eq!(
            tree.iter().map(|(key, _)| *key).collect::<Vec<u32>>(),
            expected,
        );

        if erased == 0 && !tree.is_empty() {
            let position = tree.begin();
            tree.erase(position);
            expected.remove(0);
        }
    }
}

#[test]
fn int_test_concrete_scenario() {
    init_logger();
    let mut tree = RedBlackTree::new();
    for key in &[5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
        tree.insert_unique(*key, ()).unwrap();
        assert!(tree.verify());
    }
    assert_eq!(
        tree.iter().map(|(key, _)| *key).collect::<Vec<u32>>(),
        (0..10).collect::<Vec<u32>>(),
    );

    let position = tree.find(&5);
    tree.erase(position);
    assert_eq!(tree.find(&5), tree.end());
    assert_eq!(tree.len(), 9);
    assert!(tree.verify());
}
