use itertools::izip;
use math::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use math::poly::PolyRNS;
use math::ring::{Ring, RingRNS};
use num_bigint::{BigInt, BigUint};
use sampling::source::Source;
use std::sync::Arc;

#[test]
fn crt_round_trip_u64() {
    let n: usize = 1 << 8;
    let mut moduli: Vec<u64> = NTTFriendlyPrimesGenerator::new(60, 2 * n as u64)
        .next_downstream_primes(2)
        .unwrap();
    moduli.push(12289);
    let ring_rns: RingRNS<u64> = RingRNS::new(
        moduli
            .iter()
            .map(|q| Arc::new(Ring::new(n, *q).unwrap()))
            .collect(),
    );

    let q_big: BigUint = moduli.iter().fold(BigUint::from(1u64), |acc, q| acc * *q);
    assert_eq!(ring_rns.modulus(), &q_big);

    let mut source: Source = Source::new([2u8; 32]);
    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.fill_uniform(&mut source, &mut a);

    let mut unsigned: Vec<BigUint> = vec![BigUint::default(); n];
    ring_rns.to_biguint_inplace(&a, &mut unsigned);
    unsigned.iter().enumerate().for_each(|(j, c)| {
        assert!(c < &q_big);
        izip!(moduli.iter(), a.0.iter()).for_each(|(q, ai)| {
            assert_eq!(c % *q, BigUint::from(ai.0[j]));
        });
    });

    let mut signed: Vec<BigInt> = vec![BigInt::default(); n];
    ring_rns.to_bigint_inplace(&a, &mut signed);
    let half: BigInt = BigInt::from(q_big.clone()) >> 1;
    assert!(signed.iter().all(|c| c <= &half && c >= &-&half));

    let mut b: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.from_bigint_inplace(&signed, &mut b);
    assert_eq!(a, b);
}
