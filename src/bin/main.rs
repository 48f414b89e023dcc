use arena_avl::AvlTree;

fn main() {
    let mut tree: AvlTree<u32> = AvlTree::default();

    for item in [20, 8, 22, 4, 12, 24, 10, 14] {
        tree.insert(item).expect("items are distinct");
        tree.assert_invariants();
        println!("insert {item:>2}:{tree}");
    }

    println!("height: {:?}", tree.height());

    for item in [12, 8, 20] {
        let removed = tree.delete(&item);
        tree.assert_invariants();
        println!("delete {item:>2} -> {removed:?}:{tree}");
    }

    let mut dot = String::new();
    tree.dotgraph("demo", &mut dot).expect("writing to a String cannot fail");
    println!("{dot}");

    println!("sorted: {tree:?}");
}
