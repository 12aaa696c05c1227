use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pqc_initiator::{protocol::transport::read_fixed_length, KemProvider, MlKem, ParameterSet};

const SEED_D: [u8; 32] = [0x00; 32];
const SEED_Z: [u8; 32] = [0x11; 32];

fn benchmark_key_gen(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_gen");

    for parameter_set in ParameterSet::ALL {
        let kem = MlKem::new(parameter_set);
        group.bench_with_input(BenchmarkId::from_parameter(parameter_set), &kem, |b, kem| {
            b.iter(|| black_box(kem.key_gen(&SEED_D, &SEED_Z).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_decaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("decaps");

    for parameter_set in ParameterSet::ALL {
        let kem = MlKem::new(parameter_set);
        let key_pair = kem.key_gen(&SEED_D, &SEED_Z).unwrap();
        let (_, ciphertext) = kem.encaps(key_pair.encapsulation_key.as_bytes()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(parameter_set), &ciphertext, |b, ciphertext| {
            b.iter(|| black_box(kem.decaps(&key_pair.decapsulation_key, ciphertext).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_receive_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_fixed_length");

    for parameter_set in ParameterSet::ALL {
        let size = parameter_set.ciphertext_size();
        let data = vec![0xA5u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut reader = &data[..];
                black_box(read_fixed_length(&mut reader, size).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_key_gen,
    benchmark_decaps,
    benchmark_receive_framing
);
criterion_main!(benches);
