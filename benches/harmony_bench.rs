//! Criterion benchmarks for u-harmony.
//!
//! Uses a synthetic plant: `lines` production orders, each a chain of
//! cut, sew and pack operations, staffed from shared worker and machine
//! pools.

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_harmony::hs::{HsConfig, HsRunner};
use u_harmony::models::{Machine, Operation, Problem, ProductionOrder, Worker, SHIFTS_PER_DAY};
use u_harmony::random::create_rng;
use u_harmony::simulator::{SimulationConfig, Simulator};
use u_harmony::solution::SolutionBuilder;

const STAGES: [(&str, &str); 3] = [("cutter", "knife"), ("sewer", "needle"), ("packer", "sealer")];

fn synthetic_plant(lines: usize) -> Problem {
    let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let mut rng = create_rng(42);

    let mut workers = Vec::new();
    let mut machines = Vec::new();
    for (stage, (position, machine_type)) in STAGES.iter().enumerate() {
        for i in 0..lines * 2 {
            let mut worker = Worker::new(format!("W{stage}-{i}"), *position)
                .with_productivity(rng.random_range(0.7..1.3))
                .with_quality(rng.random_range(0.8..1.0))
                .with_hourly_cost(rng.random_range(8.0..15.0));
            for d in 0..60 {
                let roster = std::array::from_fn::<bool, SHIFTS_PER_DAY, _>(|_| rng.random_bool(0.7));
                worker = worker.with_available_shifts(start + Days::new(d), roster);
            }
            workers.push(worker);
        }
        for i in 0..lines {
            machines.push(
                Machine::new(format!("M{stage}-{i}"), *machine_type)
                    .with_productivity(rng.random_range(0.8..1.2))
                    .with_hourly_cost(rng.random_range(1.0..4.0)),
            );
        }
    }

    let mut operations = Vec::new();
    let mut orders = Vec::new();
    for line in 0..lines {
        let order_id = format!("PO{line}");
        let mut order = ProductionOrder::new(
            order_id.clone(),
            start,
            start + Days::new(rng.random_range(5..20)),
        );
        for (stage, (position, machine_type)) in STAGES.iter().enumerate() {
            let id = format!("OP{line}-{stage}");
            let target = rng.random_range(20.0..80.0);
            let mut op = Operation::new(id.clone(), order_id.clone(), *position, *machine_type)
                .with_targets(target, target * 0.8);
            if stage > 0 {
                op = op.with_prerequisite(format!("OP{line}-{}", stage - 1));
            }
            operations.push(op);
            order = order.with_operation(id);
        }
        orders.push(order);
    }

    Problem::new(workers, machines, operations, orders).unwrap()
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    let config = SimulationConfig::default();

    for &lines in &[5, 20, 50] {
        let problem = synthetic_plant(lines);
        let solution = SolutionBuilder::new(&problem).random(&mut create_rng(7));
        let simulator = Simulator::new(&problem, &config);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &solution, |b, s| {
            b.iter(|| black_box(simulator.simulate(black_box(s))))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("harmony_search");
    group.sample_size(10);

    for &lines in &[5, 20] {
        let problem = synthetic_plant(lines);
        let config = HsConfig::default().with_max_iterations(20).with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(lines),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let result = HsRunner::run(black_box(p), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_simulate, bench_search);
criterion_main!(benches);
