use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use labhash::hashing::{
    djb2, polynomial_hash, simple_hash, ChainingTable, HashFn, OpenAddressingTable, ProbingMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 101;
const LOAD_FACTORS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];
const KEY_LEN: usize = 8;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const HASHES: [(&str, HashFn); 3] = [
    ("simple_hash", simple_hash),
    ("polynomial_hash", polynomial_hash),
    ("djb2", djb2),
];

fn random_keys(rng: &mut StdRng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            (0..KEY_LEN)
                .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
                .collect()
        })
        .collect()
}

fn fill_open(keys: &[String], hash: HashFn, mode: ProbingMode) -> OpenAddressingTable<u32> {
    let mut table = OpenAddressingTable::new(CAPACITY, hash, None, mode, 0.6)
        .expect("valid load factor threshold");
    for (i, key) in keys.iter().enumerate() {
        table.insert(key.as_str(), i as u32);
    }
    table
}

fn fill_chaining(keys: &[String], hash: HashFn) -> ChainingTable<u32> {
    let mut table =
        ChainingTable::new(CAPACITY, hash, 0.75).expect("valid load factor threshold");
    for (i, key) in keys.iter().enumerate() {
        table.insert(key.as_str(), i as u32);
    }
    table
}

fn bench_insert_by_load_factor(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);

    for (hash_name, hash) in HASHES {
        let mut group = c.benchmark_group(format!("insert/{hash_name}"));
        for lf in LOAD_FACTORS {
            let keys = random_keys(&mut rng, (CAPACITY as f64 * lf) as usize);

            // Collision counts are what the experiment compares; report them once per setup.
            let linear = fill_open(&keys, hash, ProbingMode::Linear).collisions();
            let double = fill_open(&keys, hash, ProbingMode::Double).collisions();
            let chaining = fill_chaining(&keys, hash).collisions();
            println!(
                "{hash_name} lf={lf}: collisions chaining={chaining} linear={linear} double={double}"
            );

            group.bench_with_input(BenchmarkId::new("chaining", lf), &keys, |b, keys| {
                b.iter(|| black_box(fill_chaining(keys, hash)))
            });
            group.bench_with_input(BenchmarkId::new("linear", lf), &keys, |b, keys| {
                b.iter(|| black_box(fill_open(keys, hash, ProbingMode::Linear)))
            });
            group.bench_with_input(BenchmarkId::new("double", lf), &keys, |b, keys| {
                b.iter(|| black_box(fill_open(keys, hash, ProbingMode::Double)))
            });
        }
        group.finish();
    }
}

fn bench_lookup_after_removals(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let keys = random_keys(&mut rng, 2000);

    let mut group = c.benchmark_group("lookup_with_tombstones");
    for mode in [ProbingMode::Linear, ProbingMode::Double] {
        let mut table = fill_open(&keys, djb2, mode);
        for key in keys.iter().step_by(2) {
            table.remove(key);
        }
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                keys.iter()
                    .filter(|key| table.contains(black_box(key.as_str())))
                    .count()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert_by_load_factor, bench_lookup_after_removals);
criterion_main!(benches);
