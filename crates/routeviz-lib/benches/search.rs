use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use routeviz_lib::{
    Algorithm, AnimationClock, Coordinate, Graph, GraphBuilder, NodeId, RouteTracer,
    SearchEngine, WaypointTimeline,
};
use std::hint::black_box;

const SIDE: i64 = 60;

/// Square street grid with every other block crossed by a diagonal.
static GRID: Lazy<Graph> = Lazy::new(|| {
    let id = |row: i64, col: i64| row * SIDE + col;
    let mut builder = GraphBuilder::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            builder.add_node(
                id(row, col),
                Coordinate::new(30.0 + row as f64 * 0.001, 78.0 + col as f64 * 0.001),
            );
        }
    }
    for row in 0..SIDE {
        for col in 0..SIDE {
            if col + 1 < SIDE {
                builder.add_connection(id(row, col), id(row, col + 1), false);
            }
            if row + 1 < SIDE {
                builder.add_connection(id(row, col), id(row + 1, col), false);
            }
            if row + 1 < SIDE && col + 1 < SIDE && (row + col) % 2 == 0 {
                builder.add_connection(id(row, col), id(row + 1, col + 1), false);
            }
        }
    }
    builder.build().expect("grid is valid")
});

const START: NodeId = 0;
const GOAL: NodeId = SIDE * SIDE - 1;

fn full_run(graph: &Graph, algorithm: Algorithm) -> usize {
    let mut engine = SearchEngine::new(graph.clone());
    engine.start(algorithm, START, GOAL).expect("endpoints exist");
    engine.run_to_end();
    engine.visited_count()
}

fn benchmark_search(c: &mut Criterion) {
    let graph = &*GRID;

    c.bench_function("dijkstra_grid_corner_to_corner", |b| {
        b.iter(|| black_box(full_run(graph, Algorithm::Dijkstra)));
    });

    c.bench_function("astar_grid_corner_to_corner", |b| {
        b.iter(|| black_box(full_run(graph, Algorithm::AStar)));
    });

    c.bench_function("animated_astar_speed_10", |b| {
        let tracer = RouteTracer::new();
        b.iter(|| {
            let mut engine = SearchEngine::new(graph.clone());
            let mut timeline = WaypointTimeline::default();
            let mut clock = AnimationClock::new(10, 16.0);
            engine
                .start(Algorithm::AStar, START, GOAL)
                .expect("endpoints exist");
            clock.start();
            while clock.wants_frame() {
                clock
                    .tick(&mut engine, &mut timeline, &tracer, 16.0)
                    .expect("frame");
            }
            black_box(timeline.len())
        });
    });
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
