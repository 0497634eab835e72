use criterion::{black_box, criterion_group, criterion_main, Criterion};
use model_factory::{ModelConfig, ModelFactory, Record};
use serde_json::json;

fn bench_identity_map(c: &mut Criterion) {
    let class = ModelFactory::define(
        ModelConfig::named("Bench")
            .cache_key("id")
            .fetch(|class, key, callback| {
                let mut record = Record::new();
                record.insert("id".to_string(), key.clone());
                callback(class.instantiate(record)?);
                Ok(())
            }),
    )
    .unwrap();

    for i in 0..1000 {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(i));
        record.insert("name".to_string(), json!(format!("item_{}", i)));
        class.instantiate(record).unwrap().save(None).unwrap();
    }

    let mut group = c.benchmark_group("identity_map");

    group.bench_function("lookup_hit", |b| {
        b.iter(|| class.lookup(black_box(500)).unwrap())
    });

    group.bench_function("fetch_with_hit", |b| {
        b.iter(|| class.fetch_with(black_box(500), |instance| {
            black_box(instance);
        }))
    });

    group.bench_function("fetch_with_miss", |b| {
        b.iter(|| class.fetch_with(black_box(5000), |instance| {
            black_box(instance);
        }))
    });

    group.bench_function("instantiate_and_save", |b| {
        b.iter(|| {
            let mut record = Record::new();
            record.insert("id".to_string(), json!(black_box(42)));
            class.instantiate(record).unwrap().save(None).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_identity_map);
criterion_main!(benches);
