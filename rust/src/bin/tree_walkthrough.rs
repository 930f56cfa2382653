use balanced_trees::{
    AvlTree, BPlusTreeMap, BTree, RedBlackTree, SearchTree, TraversalOrder, TreeResultExt,
};

fn main() {
    println!("=== AVL tree ===");
    let mut avl = AvlTree::new();
    for key in [10, 20, 30, 40, 50, 25] {
        avl.insert(key);
    }
    print_avl(&avl);
    avl.delete(&10);
    println!("after delete 10:");
    print_avl(&avl);

    println!("\n=== Red-black tree ===");
    let mut rb: RedBlackTree<i32> = [20, 15, 25, 10, 5, 1].into_iter().collect();
    println!("in-order: {:?}", rb.iter().collect::<Vec<_>>());
    for key in [10, 20] {
        rb.delete(&key);
        println!(
            "after delete {}: {:?} (black height {:?})",
            key,
            rb.iter().collect::<Vec<_>>(),
            rb.black_height()
        );
    }

    println!("\n=== B-tree (t = 3) ===");
    let mut btree = BTree::new(3).unwrap_or_default();
    for key in [10, 20, 5, 6, 12, 30, 7, 17] {
        btree.insert(key);
    }
    print_btree(&btree);
    for key in [6, 13, 7] {
        let removed = btree.delete(&key);
        println!("delete {} -> {:?}", key, removed);
    }
    print_btree(&btree);

    println!("\n=== B+ tree (t = 3) ===");
    let mut bplus = BPlusTreeMap::new(3).unwrap_or_default();
    for (key, value) in (2..=20).step_by(2).zip('A'..='J') {
        bplus.insert(key, value);
    }
    print!("{}", bplus.structure());
    for key in [10, 5] {
        println!("search {} -> {:?}", key, bplus.get(&key));
    }
    println!("range [8, 16] -> {:?}", bplus.range_query(&8, &16));
    println!("range [15, 20] -> {:?}", bplus.range_query(&15, &20));

    let all_valid = [
        avl.check_invariants(),
        rb.check_invariants(),
        btree.check_invariants(),
        bplus.validate(),
    ]
    .into_iter()
    .all(|check| check.map(|()| true).or_default_with_log());
    println!("\ninvariants hold: {}", all_valid);
}

fn print_avl(tree: &AvlTree<i32>) {
    for order in [
        TraversalOrder::PreOrder,
        TraversalOrder::InOrder,
        TraversalOrder::PostOrder,
    ] {
        println!("  {:?}: {:?}", order, tree.traverse(order).collect::<Vec<_>>());
    }
    println!("  height {}", tree.height());
}

fn print_btree(tree: &BTree<i32>) {
    let root = tree.root();
    println!("  root {:?}", root.keys());
    for child in root.children() {
        println!("    child {:?}", child.keys());
    }
}
