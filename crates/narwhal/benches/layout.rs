use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::coord::Greedy;
use narwhal::dag::{Connect, Dag};
use narwhal::decross::TwoLayer;
use narwhal::layering::LongestPath;
use narwhal::{Coord, Layering, Sugiyama};
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug, Clone)]
struct DagShape {
    links: Vec<(String, String)>,
}

impl DagShape {
    fn build(&self) -> Dag<(), ()> {
        Connect::new()
            .build_pairs(self.links.iter().map(|(s, t)| (s.as_str(), t.as_str())))
            .expect("bench graphs are acyclic")
    }
}

fn build_dag_shape(name: &str, node_count: usize, fanout: usize) -> DagShape {
    let id = |i: usize| format!("{name}_n{i}");
    let mut links: Vec<(String, String)> = Vec::new();

    // A spine keeps the graph connected.
    for i in 0..node_count.saturating_sub(1) {
        links.push((id(i), id(i + 1)));
    }

    // Forward skips create long links and crossing pressure.
    for i in 0..node_count {
        for k in 2..=(fanout + 1) {
            let to = i.saturating_add(k * 3);
            if to >= node_count {
                break;
            }
            links.push((id(i), id(to)));
        }
    }

    DagShape { links }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("sugiyama");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("dag_30_f2", 30usize, 2usize),
        ("dag_100_f2", 100usize, 2usize),
        ("dag_200_f3", 200usize, 3usize),
    ];

    let configs: [(&str, Sugiyama); 2] = [
        (
            "longest_path+two_layer+greedy",
            Sugiyama::new()
                .layering(LongestPath::default())
                .decross(TwoLayer::default().passes(2))
                .coord(Greedy::default()),
        ),
        (
            "longest_path+two_layer+quad",
            Sugiyama::new()
                .layering(Layering::LongestPath(LongestPath::default()))
                .coord(Coord::default()),
        ),
    ];

    for (name, nodes, fanout) in cases {
        let shape = build_dag_shape(name, nodes, fanout);
        for (label, layout) in &configs {
            group.bench_with_input(BenchmarkId::new(*label, name), &shape, |b, shape| {
                b.iter_batched(
                    || shape.build(),
                    |mut dag| {
                        let info = layout.layout(black_box(&mut dag));
                        black_box(info.map(|i| i.width).unwrap_or_default());
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
