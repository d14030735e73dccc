use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use math::modulus::WordOps;
use math::poly::Poly;
use math::ring::Ring;

fn runner<'a, const FORWARD: bool, const LAZY: bool>(ring: &'a Ring<u64>) -> Box<dyn FnMut() + 'a> {
    let mut a: Poly<u64> = ring.new_poly();
    a.0.iter_mut()
        .enumerate()
        .for_each(|(i, x)| *x = i as u64);
    if FORWARD {
        Box::new(move || ring.ntt_inplace::<LAZY>(&mut a))
    } else {
        Box::new(move || ring.intt_inplace::<LAZY>(&mut a))
    }
}

fn ntt(c: &mut Criterion) {
    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("ntt");

    for log_n in 10..17 {
        let n: usize = 1 << log_n;
        let q: u64 = match NTTFriendlyPrimesGenerator::new(60, 2 * n as u64).next_downstream_prime() {
            Ok(q) => q,
            Err(_) => continue,
        };
        let ring: Ring<u64> = Ring::new(n, q).unwrap();

        let runners: [(String, Box<dyn FnMut()>); 4] = [
            (format!("forward/LAZY=true/q={}", q.bit_count()), runner::<true, true>(&ring)),
            (format!("forward/LAZY=false/q={}", q.bit_count()), runner::<true, false>(&ring)),
            (format!("backward/LAZY=true/q={}", q.bit_count()), runner::<false, true>(&ring)),
            (format!("backward/LAZY=false/q={}", q.bit_count()), runner::<false, false>(&ring)),
        ];

        for (name, mut runner) in runners {
            let id: BenchmarkId = BenchmarkId::new(name, format!("n={}", n));
            b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| b.iter(&mut runner));
        }
    }
}

criterion_group!(benches, ntt);
criterion_main!(benches);
