use narwhal_dag::decycle::{feedback_links, greedy_order};
use narwhal_dag::{Connect, Dag, Error, NodeIx};
use proptest::prelude::*;

fn pairs_of(g: &Dag<(), ()>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = g
        .links()
        .map(|l| {
            let (s, t) = (g.id(l.source).to_string(), g.id(l.target).to_string());
            if l.link.reversed() { (t, s) } else { (s, t) }
        })
        .collect();
    out.sort();
    out
}

#[test]
fn acyclic_graphs_have_no_feedback_links() {
    let g = Connect::new()
        .build_pairs([("a", "b"), ("b", "c"), ("b", "d"), ("a", "e")])
        .unwrap();
    assert!(feedback_links(&g).is_empty());
    assert_eq!(greedy_order(&g).len(), 5);
}

#[test]
fn a_two_cycle_reverses_one_link() {
    let mut g = Connect::new().build_pairs([("a", "b")]).unwrap();
    let a = g.node_ix("a").unwrap();
    let b = g.node_ix("b").unwrap();
    g.add_link(b, a, ()).unwrap();
    assert_eq!(g.decycle(), 1);
    assert!(g.verify().is_ok());
    assert_eq!(g.link_count(), 2);
    assert_eq!(g.links().filter(|l| l.link.reversed()).count(), 1);
}

#[test]
fn cyclic_input_is_rejected_without_decycle() {
    let err = Connect::new()
        .build_pairs([("a", "b"), ("b", "c"), ("c", "a")])
        .unwrap_err();
    assert!(matches!(err, Error::Cycle { .. }));
    assert!(err.to_string().starts_with("graph contained a cycle: "));
}

#[test]
fn decycled_construction_keeps_every_pair() {
    let input = [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "b")];
    let g = Connect::new().decycle(true).build_pairs(input).unwrap();
    assert!(g.verify().is_ok());
    assert!(!g.roots().is_empty());
    let mut expected: Vec<(String, String)> = input
        .iter()
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect();
    expected.sort();
    assert_eq!(pairs_of(&g), expected);
}

proptest! {
    #[test]
    fn decycle_always_yields_an_acyclic_dag(
        n in 2usize..16,
        raw in proptest::collection::vec((0usize..16, 0usize..16), 1..48),
    ) {
        let mut g: Dag<(), ()> = Dag::new();
        let nodes: Vec<NodeIx> = (0..n).map(|i| g.add_node(i.to_string(), ()).unwrap()).collect();
        for (a, b) in raw {
            let (a, b) = (a % n, b % n);
            if a != b {
                g.add_link(nodes[a], nodes[b], ()).unwrap();
            }
        }
        let before = pairs_of(&g);
        let links = g.link_count();
        g.decycle();
        prop_assert!(g.verify().is_ok());
        prop_assert!(!g.roots().is_empty());
        prop_assert_eq!(g.link_count(), links);
        prop_assert_eq!(pairs_of(&g), before);
    }
}

#[test]
fn heavily_rebucketed_nodes_are_ordered_once() {
    // Every node sits on several cycles, so removals move its neighbours between buckets
    // many times before it is picked.
    let n = 400;
    let mut g: Dag<(), ()> = Dag::new();
    let nodes: Vec<NodeIx> = (0..n)
        .map(|i| g.add_node(format!("n{i}"), ()).unwrap())
        .collect();
    let mut expected: Vec<(String, String)> = Vec::new();
    for i in 0..n {
        for step in [1, 7, 31] {
            let j = (i + step) % n;
            g.add_link(nodes[i], nodes[j], ()).unwrap();
            expected.push((format!("n{i}"), format!("n{j}")));
        }
    }

    let mut order = greedy_order(&g);
    assert_eq!(order.len(), n);
    order.sort();
    order.dedup();
    assert_eq!(order.len(), n);

    assert!(g.decycle() > 0);
    assert!(g.verify().is_ok());
    assert!(feedback_links(&g).is_empty());
    expected.sort();
    assert_eq!(pairs_of(&g), expected);
}
