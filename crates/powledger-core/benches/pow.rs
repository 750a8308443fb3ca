use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use powledger_core::{digest, Block, Miner};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_digest(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..4096).map(|_| rng.gen()).collect();

    let mut group = c.benchmark_group("sha256");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("digest_4k", |b| b.iter(|| digest(&data)));
    group.finish();
}

fn bench_pow(c: &mut Criterion) {
    let block = Block::with_timestamp(0, 1_600_000_000, "Alice pays Bob 5 BTC", "0");

    c.bench_function("mine_block_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            Miner::new(3).mine(&mut candidate).unwrap();
        });
    });

    c.bench_function("mine_block_parallel_difficulty_4", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            Miner::new(4).parallel(true).mine(&mut candidate).unwrap();
        });
    });
}

criterion_group!(benches, bench_digest, bench_pow);
criterion_main!(benches);
