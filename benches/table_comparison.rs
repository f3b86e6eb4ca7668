use core::hash::BuildHasherDefault;
use core::hash::Hasher;
use core::hint::black_box;

use bucket_table::BucketTable;
use bucket_table::hash::fnv1a;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;

/// FNV-1a as a `Hasher`, so hashbrown is measured with the same hash function.
#[derive(Default)]
struct FnvHasher(Vec<u8>);

impl Hasher for FnvHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        fnv1a(&self.0)
    }
}

type HashbrownMap = hashbrown::HashMap<Vec<u8>, u64, BuildHasherDefault<FnvHasher>>;

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn make_keys(count: usize) -> Vec<(Vec<u8>, u64)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let key = rng.try_next_u64().unwrap();
            (format!("key_{:016X}", key).into_bytes(), key)
        })
        .collect()
}

fn filled_table(keys: &[(Vec<u8>, u64)]) -> BucketTable<'static, u64> {
    let mut table = BucketTable::new();
    for (key, value) in keys {
        table.set_owned(key, *value).unwrap();
    }
    table
}

fn bench_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = make_keys(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("bucket_table/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut table = BucketTable::new();
                    for (key, value) in keys {
                        black_box(table.set_owned(key, value).unwrap());
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut table = HashbrownMap::with_capacity_and_hasher(1024, Default::default());
                    for (key, value) in keys {
                        black_box(table.insert(key, value));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_hit_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = make_keys(size);
        let misses = make_keys(size);
        let table = filled_table(&keys);
        let hashbrown: HashbrownMap = keys.iter().cloned().collect();

        let mut probes = keys
            .iter()
            .chain(misses.iter())
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        probes.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_function(format!("bucket_table/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(table.get(key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &probes {
                    black_box(hashbrown.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = make_keys(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("bucket_table/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut order = keys.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (filled_table(&keys), order)
                },
                |(mut table, order)| {
                    for (key, _) in &order {
                        black_box(table.remove(key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut order = keys.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (keys.iter().cloned().collect::<HashbrownMap>(), order)
                },
                |(mut table, order)| {
                    for (key, _) in &order {
                        black_box(table.remove(key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

fn bench_mixed_zipf(c: &mut Criterion) {
    const KEY_SPACE_MULTIPLIER: usize = 2;

    let mut group = c.benchmark_group("mixed_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let mut rng = SmallRng::from_os_rng();
        let op_distr = Zipf::new(3.0, 1.0).unwrap();
        let key_distr = Zipf::new((size * KEY_SPACE_MULTIPLIER) as f64 - 1.0, 1.0).unwrap();

        let operations = (0..size * 3)
            .map(|_| {
                let op_choice: f64 = rng.sample(op_distr);
                let operation = if op_choice <= 1.0 {
                    Operation::Find
                } else if op_choice <= 2.0 {
                    Operation::Insert
                } else {
                    Operation::Remove
                };
                let key = rng.sample(key_distr) as u64;
                (operation, format!("key_{:016X}", key).into_bytes(), key)
            })
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function(format!("bucket_table/{size}"), |b| {
            b.iter(|| {
                let mut table = BucketTable::new();
                for (operation, key, value) in &operations {
                    match operation {
                        Operation::Insert => {
                            black_box(table.set_owned(key, *value).unwrap());
                        }
                        Operation::Find => {
                            black_box(table.get(key));
                        }
                        Operation::Remove => {
                            black_box(table.remove(key));
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut table = HashbrownMap::with_capacity_and_hasher(1024, Default::default());
                for (operation, key, value) in &operations {
                    match operation {
                        Operation::Insert => {
                            black_box(table.insert(key.clone(), *value));
                        }
                        Operation::Find => {
                            black_box(table.get(key));
                        }
                        Operation::Remove => {
                            black_box(table.remove(key));
                        }
                    }
                }
                black_box(table)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random,
    bench_find_hit_miss,
    bench_remove,
    bench_mixed_zipf,
);

criterion_main!(benches);
