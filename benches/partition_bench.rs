//! Criterion benchmarks for team partitioning.
//!
//! Rosters are synthetic with ratings drawn from a fixed seed, so runs are
//! comparable across machines and commits.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_numflow::random::create_rng;
use u_teams::constraints::{ConstraintSet, TogetherRule};
use u_teams::exact::{EnumerationBackend, ExactSolver};
use u_teams::init::PartitionInitializer;
use u_teams::model::{EntityId, Roster};
use u_teams::sa::{AnnealConfig, AnnealRunner, BalanceProblem};

fn synthetic_roster(n: usize, seed: u64) -> Roster {
    let mut rng = create_rng(seed);
    let pairs: Vec<(String, i64)> = (0..n)
        .map(|i| (format!("p{i}"), rng.random_range(1..=100)))
        .collect();
    Roster::from_pairs(pairs).expect("synthetic names are unique")
}

fn synthetic_constraints(n: usize) -> ConstraintSet {
    let mut cs = ConstraintSet::new();
    cs.add_together([EntityId(0), EntityId(1)]);
    cs.add_apart(EntityId(2), EntityId(n - 1));
    cs
}

fn bench_initializer(c: &mut Criterion) {
    let mut group = c.benchmark_group("initializer");
    group.sample_size(20);

    for &n in &[40, 200, 1000] {
        let roster = synthetic_roster(n, 1);
        let cs = synthetic_constraints(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(roster, cs), |b, (r, cs)| {
            let mut rng = create_rng(42);
            b.iter(|| {
                let p = PartitionInitializer::new(black_box(r), black_box(cs), 10).build(&mut rng);
                black_box(p)
            })
        });
    }
    group.finish();
}

fn bench_anneal(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal");
    group.sample_size(10);

    for &n in &[40, 200, 1000] {
        let roster = synthetic_roster(n, 2);
        let cs = synthetic_constraints(n);
        let initial = PartitionInitializer::new(&roster, &cs, 10)
            .build(&mut create_rng(3))
            .expect("synthetic instance is feasible");
        let config = AnnealConfig::default()
            .with_initial_temperature(100.0)
            .with_min_temperature(0.01)
            .with_max_iterations(5000)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &initial, |b, initial| {
            let problem = BalanceProblem::new(&roster, &cs, TogetherRule::MemberAware);
            b.iter(|| {
                let result = AnnealRunner::run(black_box(&problem), initial.clone(), &config);
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_exact_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_enumeration");
    group.sample_size(10);

    for &n in &[6, 8, 10] {
        let roster = synthetic_roster(n, 4);
        let cs = ConstraintSet::new();
        let solver = ExactSolver::new(EnumerationBackend::new());
        group.bench_with_input(BenchmarkId::from_parameter(n), &roster, |b, r| {
            b.iter(|| {
                let outcome = solver.solve(black_box(r), &cs, 2);
                black_box(outcome)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_initializer, bench_anneal, bench_exact_enumeration);
criterion_main!(benches);
