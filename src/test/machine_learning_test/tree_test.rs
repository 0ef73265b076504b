use super::*;

/// A tree holding only a root with the given real rows and statistics computed.
fn rooted_tree(attributes: Vec<Attribute>, real: LabeledRows) -> TrepanTree {
    let mut tree = TrepanTree::new(attributes, binary_class());
    let index = tree.push(TreeNode::new(real, None, NodeType::Root, 1.0));
    tree.nodes[index].compute_statistics(2);
    tree
}

#[test]
fn test_compute_statistics() {
    let mut node = TreeNode::new(
        rows(array![[0.0], [1.0], [1.0], [1.0]], vec![0, 1, 1, 1]),
        None,
        NodeType::Root,
        0.5,
    );
    node.synthetic = rows(array![[0.0], [0.0], [0.0], [0.0]], vec![0, 0, 0, 0]);
    node.compute_statistics(2);

    assert_eq!(node.total_examples(), 8);
    assert_eq!(node.class_distribution(), &vec![0.625, 0.375]);
    assert_eq!(node.class_label(), 0);
    assert_relative_eq!(node.fidelity(), 0.625);
    assert_relative_eq!(node.best_first(), 0.5 * 0.375);
}

#[test]
fn test_majority_tie_takes_first_class() {
    let tree = rooted_tree(
        vec![Attribute::numeric("x")],
        rows(array![[1.0], [2.0]], vec![1, 0]),
    );
    let root = tree.root().unwrap();
    assert_eq!(root.class_label(), 0);
    assert_relative_eq!(root.fidelity(), 0.5);
}

#[test]
fn test_split_creates_one_child_per_branch() {
    let attributes = vec![Attribute::nominal("a", vec!["p", "q", "r"])];
    let mut tree = rooted_tree(
        attributes,
        rows(array![[0.0], [0.0], [1.0], [1.0]], vec![0, 0, 1, 1]),
    );

    let test = SplitTest::Nominal {
        attribute: 0,
        arity: 3,
    };
    let children = tree.split_node(ROOT, test).unwrap();
    assert_eq!(children, vec![1, 2, 3]);
    assert_eq!(tree.len(), 4);

    let root = tree.root().unwrap();
    assert_eq!(root.split(), Some(test));
    assert_eq!(root.children(), &vec![1, 2, 3]);

    let first = tree.node(1).unwrap();
    assert_eq!(first.parent(), Some(ROOT));
    assert_eq!(first.node_type(), NodeType::Internal);
    assert_eq!(first.real().len(), 2);
    assert!(first.synthetic().is_empty());
    assert_relative_eq!(first.reach(), 0.5);

    // no real example has value r
    let degenerate = tree.node(3).unwrap();
    assert!(degenerate.is_leaf());
    assert_eq!(degenerate.class_label(), root.class_label());
    assert_eq!(degenerate.class_distribution(), &vec![1.0, 0.0]);
    assert_eq!(degenerate.reach(), 0.0);
    assert_eq!(degenerate.fidelity(), 0.0);
    assert_eq!(degenerate.best_first(), 0.0);
}

#[test]
fn test_reach_counts_synthetic_examples() {
    let mut tree = rooted_tree(
        vec![Attribute::numeric("x")],
        rows(array![[1.0], [9.0]], vec![0, 1]),
    );
    tree.nodes[ROOT].synthetic = rows(array![[2.0], [3.0]], vec![0, 0]);
    tree.nodes[ROOT].compute_statistics(2);

    let test = SplitTest::Numeric {
        attribute: 0,
        threshold: 5.0,
    };
    let children = tree.split_node(ROOT, test).unwrap();

    // left: 1 real + 2 synthetic of 4, right: 1 real of 4
    assert_relative_eq!(tree.nodes[children[0]].reach(), 0.75);
    assert_relative_eq!(tree.nodes[children[1]].reach(), 0.25);
    // children start from their real partition only
    assert_eq!(tree.nodes[children[0]].total_examples(), 1);
}

#[test]
fn test_split_abandoned_with_single_populated_branch() {
    let attributes = vec![Attribute::nominal("a", vec!["p", "q"])];
    let mut tree = rooted_tree(attributes, rows(array![[1.0], [1.0]], vec![0, 1]));

    let children = tree
        .split_node(
            ROOT,
            SplitTest::Nominal {
                attribute: 0,
                arity: 2,
            },
        )
        .unwrap();

    assert!(children.is_empty());
    assert_eq!(tree.len(), 1);
    assert!(tree.root().unwrap().is_leaf());
    assert_eq!(tree.root().unwrap().split(), None);
}

#[test]
fn test_classify_and_distribution() {
    let mut tree = rooted_tree(
        vec![Attribute::numeric("x")],
        rows(array![[1.0], [2.0], [8.0], [9.0]], vec![0, 0, 1, 1]),
    );
    let children = tree
        .split_node(
            ROOT,
            SplitTest::Numeric {
                attribute: 0,
                threshold: 5.0,
            },
        )
        .unwrap();
    for &child in &children {
        tree.nodes[child].compute_statistics(2);
        tree.nodes[child].make_leaf();
    }

    assert_eq!(tree.classify(array![4.0].view()).unwrap(), 0);
    assert_eq!(tree.classify(array![5.0].view()).unwrap(), 0);
    assert_eq!(tree.classify(array![7.0].view()).unwrap(), 1);
    assert_eq!(
        tree.distribution_for(array![7.0].view()).unwrap(),
        vec![0.0, 1.0]
    );
    assert!(matches!(
        tree.classify(array![1.0, 2.0].view()),
        Err(ModelError::TreeError(_))
    ));

    let counts = tree.count_nodes();
    assert_eq!(
        counts,
        TreeCounts {
            nodes: 3,
            internal: 1,
            leaves: 2
        }
    );
}

#[test]
fn test_unknown_nominal_value_is_rejected() {
    let attributes = vec![Attribute::nominal("a", vec!["p", "q"])];
    let mut tree = rooted_tree(attributes, rows(array![[0.0], [1.0]], vec![0, 1]));
    tree.split_node(
        ROOT,
        SplitTest::Nominal {
            attribute: 0,
            arity: 2,
        },
    )
    .unwrap();

    assert!(matches!(
        tree.classify(array![4.0].view()),
        Err(ModelError::TreeError(_))
    ));
}

#[test]
fn test_compact_drops_unreachable_nodes() {
    let attributes = vec![Attribute::nominal("a", vec!["p", "q"])];
    let mut tree = rooted_tree(attributes, rows(array![[0.0], [1.0]], vec![0, 1]));
    tree.split_node(
        ROOT,
        SplitTest::Nominal {
            attribute: 0,
            arity: 2,
        },
    )
    .unwrap();
    tree.nodes[ROOT].make_leaf();
    assert_eq!(tree.len(), 3);

    tree.compact();
    assert_eq!(tree.len(), 1);
    assert!(tree.root().unwrap().children().is_empty());
    assert_eq!(tree.count_nodes().nodes, 1);
}

#[test]
fn test_compact_renumbers_breadth_first() {
    let attributes = vec![
        Attribute::nominal("a", vec!["p", "q"]),
        Attribute::nominal("b", vec!["p", "q"]),
    ];
    let mut tree = rooted_tree(
        attributes,
        rows(
            array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
            vec![0, 1, 0, 1],
        ),
    );
    let top = tree
        .split_node(
            ROOT,
            SplitTest::Nominal {
                attribute: 0,
                arity: 2,
            },
        )
        .unwrap();
    for &child in &top {
        tree.split_node(
            child,
            SplitTest::Nominal {
                attribute: 1,
                arity: 2,
            },
        )
        .unwrap();
    }
    assert_eq!(tree.len(), 7);

    // the subtree below the first child becomes unreachable
    tree.nodes[top[0]].make_leaf();
    tree.compact();

    assert_eq!(tree.len(), 5);
    assert_eq!(tree.node(2).unwrap().children(), &vec![3, 4]);
    for (index, node) in tree.nodes().iter().enumerate() {
        for &child in node.children() {
            assert_eq!(tree.node(child).unwrap().parent(), Some(index));
        }
    }
}

#[test]
fn test_display_format() {
    let attributes = vec![Attribute::nominal("a", vec!["p", "q"])];
    let mut tree = rooted_tree(attributes, rows(array![[0.0], [1.0]], vec![0, 1]));
    let children = tree
        .split_node(
            ROOT,
            SplitTest::Nominal {
                attribute: 0,
                arity: 2,
            },
        )
        .unwrap();
    for &child in &children {
        tree.nodes[child].compute_statistics(2);
        tree.nodes[child].make_leaf();
    }

    let text = tree.to_string();
    assert!(text.starts_with("Trepan\n\n"));
    assert!(text.contains("a = p (R= 0.5, F= 1, B= 0): neg"));
    assert!(text.contains("a = q (R= 0.5, F= 1, B= 0): pos"));
    assert!(text.contains("Number of Leaves: \t2"));
    assert!(text.contains("Size of the tree: \t3"));

    let empty = TrepanTree::new(vec![], binary_class());
    assert_eq!(empty.to_string(), "Trepan: No model built yet.");
}
