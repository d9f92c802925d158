use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use hookbus::{Callback, Dispatcher, ListenOptions, Observable, Value};

fn make_bus(listeners: i64) -> Dispatcher {
    let bus = Dispatcher::new();
    // Spread priorities so inserts exercise the ordered path.
    for i in 0..listeners {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        bus.on_with(
            &format!("tick.{tag}"),
            Callback::new(move |inv| Ok(Value::Int(inv.arg(0).as_int().unwrap_or(0) + i))),
            ListenOptions::new().priority(i % 7),
        );
    }
    bus
}

fn bench_trigger(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger");
    group.throughput(Throughput::Elements(1));

    let bus = make_bus(64);
    group.bench_function("each_64", |b| {
        b.iter(|| bus.each(black_box("tick"), vec![Value::Int(1)]).unwrap());
    });
    group.bench_function("reduce_64", |b| {
        b.iter(|| bus.reduce(black_box("tick"), vec![Value::Int(1)]).unwrap());
    });
    group.bench_function("reduce_namespaced_32", |b| {
        b.iter(|| bus.reduce(black_box("tick.odd"), vec![Value::Int(1)]).unwrap());
    });
    group.finish();
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");
    group.throughput(Throughput::Elements(1));

    group.bench_function("on_off_cycle", |b| {
        b.iter_custom(|iters| {
            // Fresh dispatcher per sample so registries do not grow across samples.
            let bus = make_bus(16);
            let cb = Callback::action(|_| {});
            let start = Instant::now();
            for _ in 0..iters {
                bus.on("tick.bench", cb.clone());
                bus.off_callback("tick.bench", &cb);
            }
            start.elapsed()
        })
    });

    group.bench_function("once_fire", |b| {
        b.iter_custom(|iters| {
            let bus = Dispatcher::new();
            let start = Instant::now();
            for _ in 0..iters {
                bus.once("boot", Callback::action(|_| {}));
                bus.each("boot", Vec::new()).unwrap();
            }
            start.elapsed()
        })
    });
    group.finish();
}

fn bench_observable(c: &mut Criterion) {
    let mut group = c.benchmark_group("observable");
    group.throughput(Throughput::Elements(1));

    group.bench_function("synced_pair_set", |b| {
        let left = Observable::new(0);
        let right = Observable::empty();
        left.sync([&right]);
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            left.set(n).unwrap();
        });
    });
    group.finish();
}

criterion_group!(dispatch, bench_trigger, bench_registration, bench_observable);
criterion_main!(dispatch);
