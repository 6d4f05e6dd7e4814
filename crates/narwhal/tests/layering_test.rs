use narwhal::dag::{Connect, Dag, NodeIx};
use narwhal::layering::{CoffmanGraham, LongestPath, Simplex, Topological, height, unit_separation};
use narwhal::{Error, Layering, Materialize, SugiGraph};
use proptest::prelude::*;

fn square() -> Dag<(), ()> {
    Connect::new()
        .build_pairs([("0", "1"), ("0", "2"), ("1", "3"), ("2", "3")])
        .unwrap()
}

fn layer_ids(dag: &Dag<(), ()>) -> Vec<Vec<String>> {
    let rows = dag.nodes().filter_map(|v| dag.layer(v)).max().map_or(0, |m| m + 1);
    let mut out: Vec<Vec<String>> = vec![Vec::new(); rows];
    for v in dag.nodes() {
        out[dag.layer(v).unwrap()].push(dag.id(v).to_string());
    }
    for row in &mut out {
        row.sort();
    }
    out
}

fn layer_of(dag: &Dag<(), ()>, id: &str) -> usize {
    dag.layer(dag.node_ix(id).unwrap()).unwrap()
}

#[test]
fn unit_separation_is_zero_at_the_boundaries() {
    let dag = square();
    let a = dag.node_ix("0");
    let b = dag.node_ix("1");
    assert_eq!(unit_separation(a, b), 1);
    assert_eq!(unit_separation(None, b), 0);
    assert_eq!(unit_separation(a, None), 0);
}

#[test]
fn simplex_layers_the_square() {
    let mut dag = square();
    let height = Layering::from(Simplex::default())
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(height, 3);
    assert_eq!(layer_ids(&dag), [vec!["0"], vec!["1", "2"], vec!["3"]]);
}

#[test]
fn coffman_graham_layers_the_square() {
    let mut dag = square();
    let height = Layering::from(CoffmanGraham::default())
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(height, 3);
    assert_eq!(layer_ids(&dag), [vec!["0"], vec!["1", "2"], vec!["3"]]);
}

#[test]
fn coffman_graham_bounds_the_layer_width() {
    let mut dag = Connect::new()
        .build_pairs([("r", "a"), ("r", "b"), ("r", "c"), ("r", "d"), ("r", "e")])
        .unwrap();
    Layering::from(CoffmanGraham::default().max_width(2))
        .layer(&mut dag, unit_separation)
        .unwrap();
    for row in layer_ids(&dag) {
        assert!(row.len() <= 2, "{row:?}");
    }
    assert_eq!(layer_of(&dag, "r"), 0);
}

#[test]
fn longest_path_top_down_and_bottom_up() {
    let pairs = [("a", "b"), ("b", "c"), ("a", "d")];

    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    let h = Layering::from(LongestPath::default())
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(h, 3);
    assert_eq!(layer_of(&dag, "d"), 1);

    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    let h = Layering::from(LongestPath::default().top_down(false))
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(h, 3);
    assert_eq!(layer_of(&dag, "a"), 0);
    assert_eq!(layer_of(&dag, "d"), 2);
}

#[test]
fn topological_gives_every_node_its_own_layer() {
    let mut dag = square();
    let h = Layering::from(Topological::default())
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(h, 4);
    let mut layers: Vec<usize> = dag.nodes().map(|v| dag.layer(v).unwrap()).collect();
    layers.sort();
    assert_eq!(layers, vec![0, 1, 2, 3]);
}

#[test]
fn simplex_rejects_disconnected_graphs() {
    let mut dag = Connect::new().build_pairs([("a", "b"), ("c", "d")]).unwrap();
    let err = Layering::default()
        .layer(&mut dag, unit_separation)
        .unwrap_err();
    assert!(matches!(err, Error::Disconnected));
    assert!(err.to_string().contains("disconnected"));
}

#[test]
fn simplex_honours_ranks_and_groups() {
    let pairs = [("a", "b"), ("a", "c"), ("c", "d")];

    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    Layering::from(Simplex::default().group("b", "g").group("d", "g"))
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert_eq!(layer_of(&dag, "b"), layer_of(&dag, "d"));

    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    Layering::from(Simplex::default().rank("c", 0).rank("b", 1))
        .layer(&mut dag, unit_separation)
        .unwrap();
    assert!(layer_of(&dag, "c") < layer_of(&dag, "b"));
    assert_eq!(layer_of(&dag, "a"), 0);
}

#[test]
fn simplex_rejects_unknown_constraint_ids() {
    let mut dag = square();
    let err = Layering::from(Simplex::default().rank("nope", 0))
        .layer(&mut dag, unit_separation)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn height_follows_the_separation() {
    let mut dag = square();
    let sep = |a: Option<NodeIx>, b: Option<NodeIx>| match (a, b) {
        (Some(_), Some(_)) => 2,
        _ => 1,
    };
    let h = Layering::from(LongestPath::default()).layer(&mut dag, sep).unwrap();
    assert_eq!(layer_of(&dag, "0"), 1);
    assert_eq!(layer_of(&dag, "3"), 5);
    assert_eq!(h, 7);
    assert_eq!(height(&dag, &sep), 7);
}

/// Connected dags: every node after the first links from some earlier node.
fn connected_dag() -> impl Strategy<Value = Dag<(), ()>> {
    (2usize..10).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<prop::sample::Index>(), n - 1),
            proptest::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..n),
        )
            .prop_map(move |(spine, extra)| {
                let mut dag: Dag<(), ()> = Dag::new();
                let nodes: Vec<NodeIx> = (0..n).map(|i| dag.add_node(i.to_string(), ()).unwrap()).collect();
                for (j, parent) in spine.iter().enumerate() {
                    let child = j + 1;
                    dag.add_link(nodes[parent.index(child)], nodes[child], ()).unwrap();
                }
                for (a, b) in extra {
                    let (a, b) = (a.index(n), b.index(n));
                    if a < b {
                        dag.add_link(nodes[a], nodes[b], ()).unwrap();
                    }
                }
                dag
            })
    })
}

fn all_layerings() -> Vec<Layering> {
    vec![
        LongestPath::default().into(),
        LongestPath::default().top_down(false).into(),
        Topological::default().into(),
        Simplex::default().into(),
        CoffmanGraham::default().into(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_layering_produces_adjacent_layer_edges(dag in connected_dag()) {
        for layering in all_layerings() {
            let mut dag = dag.clone();
            let h = layering.layer(&mut dag, unit_separation).unwrap();
            for link in dag.links() {
                prop_assert!(dag.layer(link.target).unwrap() > dag.layer(link.source).unwrap());
            }
            prop_assert!(dag.nodes().all(|v| dag.layer(v).unwrap() < h));

            for materialize in [Materialize::Layered, Materialize::Compact] {
                let sugi = SugiGraph::build(&dag, h, materialize).unwrap();
                for (from, to) in sugi.edges() {
                    prop_assert_eq!(sugi.node(to).layer, sugi.node(from).layer + 1);
                }
            }
        }
    }
}
