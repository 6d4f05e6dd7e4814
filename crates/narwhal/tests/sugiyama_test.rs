use narwhal::coord::{Center, Greedy, MinCurve, Simplex as SimplexCoord};
use narwhal::dag::{Connect, Dag, NodeIx, Stratify};
use narwhal::decross::{BaseOrder, Optimal, TwoLayer, TwoLayerOrder};
use narwhal::layering::{CoffmanGraham, LongestPath, Topological};
use narwhal::{Coord, Error, LayoutInfo, Materialize, Sugiyama};

fn square() -> Dag<(), ()> {
    Connect::new()
        .build_pairs([("0", "1"), ("0", "2"), ("1", "3"), ("2", "3")])
        .unwrap()
}

fn assert_points_follow_links<N, L>(dag: &Dag<N, L>) {
    for link in dag.links() {
        let points = &link.link.points;
        assert!(points.len() >= 2);
        let first = points[0];
        let last = points[points.len() - 1];
        assert_eq!(Some(first.x), dag.x(link.source));
        assert_eq!(Some(first.y), dag.y(link.source));
        assert_eq!(Some(last.x), dag.x(link.target));
        assert_eq!(Some(last.y), dag.y(link.target));
        for pair in points.windows(2) {
            assert!(pair[1].y > pair[0].y);
        }
    }
}

#[test]
fn single_node_lands_in_the_middle_of_the_box() {
    let mut dag: Dag<(), ()> = Dag::new();
    let v = dag.add_node("only", ()).unwrap();
    let info = Sugiyama::new().size(Some((2.0, 2.0))).layout(&mut dag).unwrap();
    assert_eq!(info, LayoutInfo { width: 2.0, height: 2.0 });
    assert_eq!(dag.x(v), Some(1.0));
    assert_eq!(dag.y(v), Some(1.0));
}

#[test]
fn default_layout_of_the_square() {
    let mut dag = square();
    let info = Sugiyama::default().layout(&mut dag).unwrap();
    assert!(info.width >= 3.0 - 1e-6);
    assert_eq!(info.height, 5.0);

    let y = |id: &str| dag.y(dag.node_ix(id).unwrap()).unwrap();
    assert_eq!(y("0"), 0.5);
    assert_eq!(y("1"), 2.5);
    assert_eq!(y("2"), 2.5);
    assert_eq!(y("3"), 4.5);

    let x = |id: &str| dag.x(dag.node_ix(id).unwrap()).unwrap();
    assert!((x("1") - x("2")).abs() >= 2.0 - 1e-6);
    assert_points_follow_links(&dag);
}

#[test]
fn long_links_bend_through_their_dummies() {
    let mut dag = Connect::new()
        .build_pairs([("a", "b"), ("b", "c"), ("a", "c")])
        .unwrap();
    Sugiyama::new()
        .layering(LongestPath::default())
        .coord(Greedy::default())
        .layout(&mut dag)
        .unwrap();
    let a = dag.node_ix("a").unwrap();
    let long = dag
        .links()
        .find(|l| l.source == a && dag.id(l.target) == "c")
        .unwrap();
    assert_eq!(long.link.points.len(), 3);
    assert_points_follow_links(&dag);
}

#[test]
fn every_configuration_lays_out_a_sample() {
    let configs = [
        Sugiyama::new(),
        Sugiyama::new().layering(LongestPath::default().top_down(false)),
        Sugiyama::new().layering(CoffmanGraham::default().max_width(2)),
        Sugiyama::new().materialize(Materialize::Compact),
        Sugiyama::new().decross(Optimal::default()),
        Sugiyama::new().decross(TwoLayer::default().order(TwoLayerOrder::Optimal)),
        Sugiyama::new().coord(Center::default()),
        Sugiyama::new().coord(MinCurve::default()),
        Sugiyama::new().coord(SimplexCoord::default()),
        Sugiyama::new().coord(Coord::vert()),
        Sugiyama::new().gap(2.0, 3.0).dummy_size(0.5, 0.5),
    ];
    for config in configs {
        let mut dag = Stratify::new()
            .build([
                ("a", vec![], ()),
                ("b", vec!["a"], ()),
                ("c", vec!["a"], ()),
                ("d", vec!["b", "c"], ()),
                ("e", vec!["a", "d"], ()),
                ("f", vec!["c"], ()),
            ])
            .unwrap();
        let info = config.layout(&mut dag).unwrap();
        assert!(info.width > 0.0 && info.height > 0.0, "{config:?}");
        assert!(dag.nodes().all(|v| dag.x(v).is_some() && dag.y(v).is_some()));
        assert_points_follow_links(&dag);
    }
}

#[test]
fn topological_pipeline_stacks_nodes_in_one_column() {
    let mut dag = Connect::new()
        .build_pairs([("a", "b"), ("b", "c"), ("a", "c")])
        .unwrap();
    Sugiyama::new()
        .layering(Topological::default())
        .coord(narwhal::coord::Topological::default())
        .layout(&mut dag)
        .unwrap();
    let xs: Vec<f64> = dag.nodes().map(|v| dag.x(v).unwrap()).collect();
    assert!(xs.iter().all(|x| (x - xs[0]).abs() < 1e-3), "{xs:?}");
}

#[test]
fn tall_nodes_push_their_children_down() {
    let mut dag = Connect::new().build_pairs([("a", "b")]).unwrap();
    let tall_root = |v: NodeIx, _: &()| if v.index() == 0 { (2.0, 4.0) } else { (1.0, 1.0) };
    Sugiyama::new()
        .layering(LongestPath::default())
        .layout_with_sizes(&mut dag, tall_root)
        .unwrap();
    let a = dag.node_ix("a").unwrap();
    let b = dag.node_ix("b").unwrap();
    // (2 + 0.5 + 1) / (1 + 1) rounds up to two layers, leaving an empty dummy row in between.
    assert_eq!(dag.layer(b), Some(2));
    assert_eq!(dag.y(a), Some(2.0));
    assert_eq!(dag.y(b), Some(4.0 + 1.0 + 0.0 + 1.0 + 0.5));
    let link = dag.links().next().unwrap();
    assert_eq!(link.link.points.len(), 3);
}

#[test]
fn compact_squeezes_rows_left_by_tall_nodes() {
    let tall_root = |v: NodeIx, _: &()| if v.index() == 0 { (2.0, 4.0) } else { (1.0, 1.0) };
    let run = |materialize: Materialize| {
        let mut dag = Connect::new()
            .build_pairs([("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")])
            .unwrap();
        let info = Sugiyama::new()
            .materialize(materialize)
            .layout_with_sizes(&mut dag, tall_root)
            .unwrap();
        (info, dag)
    };

    let (layered, layered_dag) = run(Materialize::Layered);
    let (compact, compact_dag) = run(Materialize::Compact);
    // rows: a (4), empty spacer (0), b c (1), d (1) with unit gaps
    assert_eq!(layered.height, 4.0 + 1.0 + 0.0 + 1.0 + 1.0 + 1.0 + 1.0);
    assert_eq!(compact.height, 4.0 + 1.0 + 1.0 + 1.0 + 1.0);
    assert!(compact.height < layered.height);

    let d = compact_dag.node_ix("d").unwrap();
    assert_eq!(layered_dag.y(d), Some(8.5));
    assert_eq!(compact_dag.y(d), Some(7.5));
    assert!(layered_dag.links().any(|l| l.link.points.len() == 3));
    assert!(compact_dag.links().all(|l| l.link.points.len() == 2));
    assert_points_follow_links(&layered_dag);
    assert_points_follow_links(&compact_dag);
}

#[test]
fn decycled_links_point_from_their_new_source() {
    let mut dag = Connect::new()
        .decycle(true)
        .build_pairs([("a", "b"), ("b", "c"), ("c", "a")])
        .unwrap();
    Sugiyama::new().layout(&mut dag).unwrap();
    assert_eq!(dag.links().filter(|l| l.link.reversed()).count(), 1);
    assert_points_follow_links(&dag);
}

#[test]
fn disconnected_graphs_need_a_different_layering() {
    let pairs = [("a", "b"), ("c", "d")];
    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    let err = Sugiyama::new().layout(&mut dag).unwrap_err();
    assert!(err.to_string().contains("disconnected"));

    let mut dag = Connect::new().build_pairs(pairs).unwrap();
    Sugiyama::new()
        .layering(LongestPath::default())
        .layout(&mut dag)
        .unwrap();
    assert_points_follow_links(&dag);
}

#[test]
fn empty_dags_have_an_empty_layout() {
    let mut dag: Dag<(), ()> = Dag::new();
    assert_eq!(Sugiyama::new().layout(&mut dag).unwrap(), LayoutInfo::default());
}

#[test]
fn configuration_loads_from_json() {
    let layout = Sugiyama::from_json(
        r#"{
            "layering": { "kind": "longest-path", "topDown": false },
            "decross": {
                "kind": "two-layer",
                "order": { "kind": "greedy", "base": "mean" },
                "passes": 2
            },
            "coord": { "kind": "center" },
            "gap": [2.0, 1.0],
            "size": [10.0, 10.0]
        }"#,
    )
    .unwrap();
    let expected = Sugiyama::new()
        .layering(LongestPath::default().top_down(false))
        .decross(
            TwoLayer::default()
                .order(TwoLayerOrder::Greedy {
                    base: Some(BaseOrder::Mean),
                })
                .passes(2),
        )
        .coord(Center::default())
        .gap(2.0, 1.0)
        .size(Some((10.0, 10.0)));
    assert_eq!(layout, expected);

    let mut dag = square();
    let info = layout.layout(&mut dag).unwrap();
    assert_eq!(info, LayoutInfo { width: 10.0, height: 10.0 });
    for v in dag.nodes() {
        let (x, y) = (dag.x(v).unwrap(), dag.y(v).unwrap());
        assert!((0.0..=10.0).contains(&x) && (0.0..=10.0).contains(&y));
    }
}

#[test]
fn bad_configuration_is_rejected() {
    let err = Sugiyama::from_json(r#"{ "coord": { "kind": "min-curve", "weight": 1.5 } }"#)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));

    let err = Sugiyama::from_json(r#"{ "layering": { "kind": "nope" } }"#).unwrap_err();
    assert!(matches!(err, Error::Json(_)));

    let err = Sugiyama::new()
        .node_size(-1.0, 1.0)
        .layout(&mut square())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}
