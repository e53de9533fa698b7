use criterion::*;
use std::hint::black_box;

use entity_pool::Pool;

mod common;
use common::*;

fn churn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    group.bench_function("spawn_two_components_100k", |b| {
        b.iter_batched(
            Pool::new,
            |mut pool| {
                populate(&mut pool, AGENTS_MED);
                black_box(pool);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("detach_velocity_100k", |b| {
        b.iter_batched(
            || {
                let mut pool = Pool::new();
                let entities = populate(&mut pool, AGENTS_MED);
                (pool, entities)
            },
            |(mut pool, entities)| {
                for entity in entities {
                    pool.remove_component::<Velocity>(entity).unwrap();
                }
                black_box(pool);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("attach_flag_100k", |b| {
        b.iter_batched(
            || {
                let mut pool = Pool::new();
                let entities = populate(&mut pool, AGENTS_MED);
                (pool, entities)
            },
            |(mut pool, entities)| {
                for entity in entities {
                    pool.add_component(entity, Flag { raised: true }).unwrap();
                }
                black_box(pool);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("view_iterate_100k", |b| {
        let mut pool = Pool::new();
        populate(&mut pool, AGENTS_MED);

        b.iter(|| {
            let mut sum = 0.0f32;
            for (_, position, velocity) in pool.view::<(Position, Velocity)>() {
                sum += position.x + velocity.dx;
            }
            black_box(sum);
        });
    });

    group.finish();
}

criterion_group!(benches, churn_benchmark);
criterion_main!(benches);
