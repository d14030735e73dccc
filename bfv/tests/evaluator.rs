mod common;

use bfv::{
    Ciphertext, CoeffModulus, Context, Error, ParameterSet, Plaintext, RelinKeys, SchemeType, SecurityLevel,
};
use common::{coeffs, negacyclic_mul, parms, sub_test, toy_context, Setup, N, T};
use std::sync::Arc;

#[test]
fn evaluator() {
    let mut setup: Setup = Setup::new(toy_context(), 7);
    let relin_keys: RelinKeys = setup.keygen.create_relin_keys().unwrap();

    sub_test("test_encrypt_decrypt", || test_encrypt_decrypt(&mut setup));
    sub_test("test_add_sub_negate", || test_add_sub_negate(&mut setup));
    sub_test("test_plain_operations", || test_plain_operations(&mut setup));
    sub_test("test_multiply", || test_multiply(&mut setup, &relin_keys));
    sub_test("test_multiply_many", || test_multiply_many(&mut setup, &relin_keys));
    sub_test("test_exponentiate", || test_exponentiate(&mut setup, &relin_keys));
    sub_test("test_relinearize_errors", || test_relinearize_errors(&mut setup, &relin_keys));
    sub_test("test_relinearize_last_level", || test_relinearize_last_level(&mut setup, &relin_keys));
}

fn encrypt(setup: &mut Setup, coeffs: &[u64]) -> Ciphertext {
    setup
        .encryptor
        .encrypt(&Plaintext::new(coeffs.to_vec()))
        .unwrap()
}

fn decrypt(setup: &Setup, ct: &Ciphertext) -> Vec<u64> {
    let pt: Plaintext = setup.decryptor.decrypt_checked(ct).unwrap();
    let mut coeffs: Vec<u64> = pt.coeffs().to_vec();
    coeffs.resize(N, 0);
    coeffs
}

fn test_encrypt_decrypt(setup: &mut Setup) {
    let m: Vec<u64> = coeffs(1, N, T);
    let ct: Ciphertext = encrypt(setup, &m);
    assert_eq!(ct.size(), 2);
    assert_eq!(ct.parms_id(), setup.context.first_parms_id());
    assert_eq!(decrypt(setup, &ct), m);
    assert!(setup.decryptor.invariant_noise_budget(&ct).unwrap() > 100);

    let mut symmetric = bfv::Encryptor::with_secret_key(&setup.context, setup.keygen.secret_key()).unwrap();
    let ct: Ciphertext = symmetric.encrypt_symmetric(&Plaintext::new(m.clone())).unwrap();
    assert_eq!(decrypt(setup, &ct), m);

    let zero: Ciphertext = setup.encryptor.encrypt_zero().unwrap();
    assert!(setup.decryptor.decrypt(&zero).unwrap().is_zero());
    assert!(!zero.is_transparent());

    assert!(matches!(
        setup.encryptor.encrypt(&Plaintext::new(vec![T])),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        setup.encryptor.encrypt(&Plaintext::new(vec![1; N + 1])),
        Err(Error::InvalidArgument(_))
    ));
}

fn test_add_sub_negate(setup: &mut Setup) {
    let (a, b) = (coeffs(2, N, T), coeffs(3, N, T));
    let (ct_a, ct_b) = (encrypt(setup, &a), encrypt(setup, &b));

    let sum: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| (x + y) % T).collect();
    let diff: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| (x + T - y) % T).collect();
    let neg: Vec<u64> = a.iter().map(|x| (T - x) % T).collect();

    let ev = &setup.evaluator;
    assert_eq!(decrypt(setup, &ev.add(&ct_a, &ct_b).unwrap()), sum);
    assert_eq!(decrypt(setup, &ev.sub(&ct_a, &ct_b).unwrap()), diff);
    assert_eq!(decrypt(setup, &ev.negate(&ct_a).unwrap()), neg);

    let many: Ciphertext = ev.add_many(&[ct_a.clone(), ct_b.clone(), ct_a.clone()]).unwrap();
    let expected: Vec<u64> = sum.iter().zip(a.iter()).map(|(x, y)| (x + y) % T).collect();
    assert_eq!(decrypt(setup, &many), expected);
    assert!(matches!(ev.add_many(&[]), Err(Error::InvalidArgument(_))));

    // Operands of different sizes: the sum takes the larger size.
    let squared: Ciphertext = ev.square(&ct_a).unwrap();
    let mixed: Ciphertext = ev.add(&ct_b, &squared).unwrap();
    assert_eq!(mixed.size(), 3);
    let a2: Vec<u64> = negacyclic_mul(&a, &a, N, T);
    let expected: Vec<u64> = a2.iter().zip(b.iter()).map(|(x, y)| (x + y) % T).collect();
    assert_eq!(decrypt(setup, &mixed), expected);
    let mixed: Ciphertext = ev.sub(&ct_b, &squared).unwrap();
    let expected: Vec<u64> = a2.iter().zip(b.iter()).map(|(x, y)| (y + T - x) % T).collect();
    assert_eq!(decrypt(setup, &mixed), expected);
}

fn test_plain_operations(setup: &mut Setup) {
    let (a, b) = (coeffs(4, N, T), coeffs(5, N, T));
    let ct_a: Ciphertext = encrypt(setup, &a);
    let pt_b: Plaintext = Plaintext::new(b.clone());

    let ev = &setup.evaluator;
    let sum: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| (x + y) % T).collect();
    assert_eq!(decrypt(setup, &ev.add_plain(&ct_a, &pt_b).unwrap()), sum);
    let diff: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| (x + T - y) % T).collect();
    assert_eq!(decrypt(setup, &ev.sub_plain(&ct_a, &pt_b).unwrap()), diff);

    let ct: Ciphertext = ev.multiply_plain(&ct_a, &pt_b).unwrap();
    assert_eq!(ct.size(), 2);
    assert_eq!(decrypt(setup, &ct), negacyclic_mul(&a, &b, N, T));

    // T - 1 is read as -1.
    let ct: Ciphertext = ev.multiply_plain(&ct_a, &Plaintext::from_value(T - 1)).unwrap();
    let neg: Vec<u64> = a.iter().map(|x| (T - x) % T).collect();
    assert_eq!(decrypt(setup, &ct), neg);

    assert!(matches!(
        ev.multiply_plain(&ct_a, &Plaintext::zero(N)),
        Err(Error::TransparentCiphertext)
    ));
}

fn test_multiply(setup: &mut Setup, relin_keys: &RelinKeys) {
    let (a, b, c) = (coeffs(6, N, T), coeffs(7, N, T), coeffs(8, N, T));
    let (ct_a, ct_b, ct_c) = (encrypt(setup, &a), encrypt(setup, &b), encrypt(setup, &c));
    let fresh: u32 = setup.decryptor.invariant_noise_budget(&ct_a).unwrap();

    let ev = &setup.evaluator;
    let ab: Vec<u64> = negacyclic_mul(&a, &b, N, T);
    let ct_ab: Ciphertext = ev.multiply(&ct_a, &ct_b).unwrap();
    assert_eq!(ct_ab.size(), 3);
    assert_eq!(decrypt(setup, &ct_ab), ab);
    let budget: u32 = setup.decryptor.invariant_noise_budget(&ct_ab).unwrap();
    assert!(budget < fresh);

    // Sizes 3 and 2 give size 4.
    let abc: Vec<u64> = negacyclic_mul(&ab, &c, N, T);
    let ct_abc: Ciphertext = ev.multiply(&ct_ab, &ct_c).unwrap();
    assert_eq!(ct_abc.size(), 4);
    assert_eq!(decrypt(setup, &ct_abc), abc);
    assert!(setup.decryptor.invariant_noise_budget(&ct_abc).unwrap() < budget);

    let ct_ab: Ciphertext = ev.relinearize(&ct_ab, relin_keys).unwrap();
    assert_eq!(ct_ab.size(), 2);
    assert_eq!(decrypt(setup, &ct_ab), ab);

    let squared: Ciphertext = ev.square(&ct_a).unwrap();
    assert_eq!(squared, ev.multiply(&ct_a, &ct_a).unwrap());
    assert_eq!(decrypt(setup, &squared), negacyclic_mul(&a, &a, N, T));
}

fn test_multiply_many(setup: &mut Setup, relin_keys: &RelinKeys) {
    let values: [u64; 5] = [2, 3, 5, 7, 11];
    let cts: Vec<Ciphertext> = values
        .iter()
        .map(|&v| setup.encryptor.encrypt(&Plaintext::from_value(v)).unwrap())
        .collect();
    let ct: Ciphertext = setup.evaluator.multiply_many(&cts, relin_keys).unwrap();
    assert_eq!(ct.size(), 2);
    let expected: u64 = values.iter().product::<u64>() % T;
    assert_eq!(setup.decryptor.decrypt(&ct).unwrap(), Plaintext::from_value(expected));
    assert!(matches!(
        setup.evaluator.multiply_many(&[], relin_keys),
        Err(Error::InvalidArgument(_))
    ));
}

fn test_exponentiate(setup: &mut Setup, relin_keys: &RelinKeys) {
    let ct: Ciphertext = setup.encryptor.encrypt(&Plaintext::from_value(3)).unwrap();
    let ev = &setup.evaluator;
    for exponent in [1u64, 2, 5, 8] {
        let res: Ciphertext = ev.exponentiate(&ct, exponent, relin_keys).unwrap();
        assert_eq!(res.size(), 2);
        let expected: u64 = (0..exponent).fold(1u64, |acc, _| acc * 3 % T);
        assert_eq!(
            setup.decryptor.decrypt(&res).unwrap(),
            Plaintext::from_value(expected),
            "exponent={}",
            exponent
        );
    }
    assert!(matches!(
        ev.exponentiate(&ct, 0, relin_keys),
        Err(Error::InvalidArgument(_))
    ));
}

fn test_relinearize_errors(setup: &mut Setup, relin_keys: &RelinKeys) {
    let ct: Ciphertext = setup.encryptor.encrypt(&Plaintext::from_value(1)).unwrap();
    let ev = &setup.evaluator;
    assert!(matches!(
        ev.relinearize(&ct, relin_keys),
        Err(Error::InvalidArgument(_))
    ));
    let ct4: Ciphertext = ev.multiply(&ev.square(&ct).unwrap(), &ct).unwrap();
    assert_eq!(ct4.size(), 4);
    assert!(matches!(
        ev.relinearize(&ct4, relin_keys),
        Err(Error::InvalidArgument(_))
    ));

    let other: Arc<Context> = toy_context();
    let mut other_keygen = bfv::KeyGenerator::new(&other).unwrap();
    let other_relin_keys: RelinKeys = other_keygen.create_relin_keys().unwrap();
    // Same parameters, same fingerprint: only the secret differs.
    assert_eq!(other_relin_keys.parms_id(), relin_keys.parms_id());

    let ct3: Ciphertext = ev.square(&ct).unwrap();
    let mut wrong = bfv::KeyGenerator::new(&Context::create(parms(&[50, 50, 60], T), true, SecurityLevel::None).unwrap())
        .unwrap();
    assert!(matches!(
        ev.relinearize(&ct3, &wrong.create_relin_keys().unwrap()),
        Err(Error::FingerprintMismatch { .. })
    ));
}

fn test_relinearize_last_level(setup: &mut Setup, relin_keys: &RelinKeys) {
    let (a, b) = (coeffs(11, N, T), coeffs(12, N, T));
    let last: bfv::ParmsId = *setup.context.last_parms_id();
    let ct_a: Ciphertext = encrypt(setup, &a);
    let ct_b: Ciphertext = encrypt(setup, &b);
    let ct_a: Ciphertext = setup.evaluator.mod_switch_to(&ct_a, &last).unwrap();
    let ct_b: Ciphertext = setup.evaluator.mod_switch_to(&ct_b, &last).unwrap();
    assert_eq!(ct_a.coeff_modulus_count(), 1);

    // Keys live at the key level and still apply with a single data prime.
    let mut ct: Ciphertext = setup.evaluator.multiply(&ct_a, &ct_b).unwrap();
    setup.evaluator.relinearize_inplace(&mut ct, relin_keys).unwrap();
    assert_eq!(ct.size(), 2);
    assert_eq!(ct.parms_id(), &last);
    assert!(setup.decryptor.invariant_noise_budget(&ct).unwrap() > 0);
    assert_eq!(decrypt(setup, &ct), negacyclic_mul(&a, &b, N, T));
}

#[test]
fn noise_exhaustion() {
    let context: Arc<Context> = Context::create(parms(&[30, 30], T), true, SecurityLevel::None).unwrap();
    let mut setup: Setup = Setup::new(context, 17);
    let relin_keys: RelinKeys = setup.keygen.create_relin_keys().unwrap();

    let mut ct: Ciphertext = setup.encryptor.encrypt(&Plaintext::from_value(2)).unwrap();
    let mut budget: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();
    assert!(budget > 0);
    for _ in 0..8 {
        if budget == 0 {
            break;
        }
        setup.evaluator.square_inplace(&mut ct).unwrap();
        setup.evaluator.relinearize_inplace(&mut ct, &relin_keys).unwrap();
        let next: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();
        assert!(next < budget, "budget {} -> {}", budget, next);
        budget = next;
    }
    assert_eq!(budget, 0);

    assert!(matches!(
        setup.decryptor.decrypt_checked(&ct),
        Err(Error::NoiseExhausted)
    ));
    // Unchecked decryption still yields a plaintext, with a warning.
    assert!(setup.decryptor.decrypt(&ct).is_ok());
}

#[test]
fn square_then_add_plain() {
    let n: usize = 4096;
    let parms: ParameterSet = ParameterSet::new(SchemeType::Bfv)
        .with_poly_modulus_degree(n)
        .with_coeff_modulus(CoeffModulus::bfv_default(n, SecurityLevel::Tc128).unwrap())
        .with_plain_modulus(1024);
    let context: Arc<Context> = Context::create(parms, true, SecurityLevel::Tc128).unwrap();
    assert!(context.using_keyswitching());
    assert!(!context.using_batching());

    let mut setup: Setup = Setup::new(context, 42);
    let relin_keys: RelinKeys = setup.keygen.create_relin_keys().unwrap();

    let x: Plaintext = "6".parse().unwrap();
    let ct: Ciphertext = setup.encryptor.encrypt(&x).unwrap();
    let fresh: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();

    let mut ct: Ciphertext = setup.evaluator.square(&ct).unwrap();
    assert_eq!(ct.size(), 3);
    setup
        .evaluator
        .add_plain_inplace(&mut ct, &"1".parse().unwrap())
        .unwrap();
    setup.evaluator.relinearize_inplace(&mut ct, &relin_keys).unwrap();
    assert_eq!(ct.size(), 2);

    let budget: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();
    assert!(budget > 0 && budget < fresh, "fresh={} budget={}", fresh, budget);
    let res: Plaintext = setup.decryptor.decrypt(&ct).unwrap();
    assert_eq!(res, Plaintext::from_value(37));
    assert_eq!(res.to_string(), "25");
}

#[test]
fn mod_switch_chain() {
    let mut setup: Setup = Setup::new(toy_context(), 11);
    let m: Vec<u64> = coeffs(9, N, T);
    let mut ct: Ciphertext = encrypt(&mut setup, &m);
    let first: usize = setup.context.first_context_data().chain_index();
    assert_eq!(first, 2);

    let mut budget: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();
    for index in (0..first).rev() {
        setup.evaluator.mod_switch_to_next_inplace(&mut ct).unwrap();
        let data = setup.context.get_context_data(ct.parms_id()).unwrap();
        assert_eq!(data.chain_index(), index);
        assert_eq!(ct.coeff_modulus_count(), index + 1);
        assert_eq!(decrypt(&setup, &ct), m);
        let next: u32 = setup.decryptor.invariant_noise_budget(&ct).unwrap();
        assert!(next <= budget, "index={} budget {} -> {}", index, budget, next);
        budget = next;
    }
    assert_eq!(ct.parms_id(), setup.context.last_parms_id());
    assert!(matches!(
        setup.evaluator.mod_switch_to_next(&ct),
        Err(Error::InvalidLevel(_))
    ));

    let fresh: Ciphertext = encrypt(&mut setup, &m);
    let last: bfv::ParmsId = *setup.context.last_parms_id();
    let switched: Ciphertext = setup.evaluator.mod_switch_to(&fresh, &last).unwrap();
    assert_eq!(switched.parms_id(), &last);
    assert_eq!(decrypt(&setup, &switched), m);
    assert_eq!(
        setup.evaluator.mod_switch_to(&fresh, fresh.parms_id()).unwrap(),
        fresh
    );
    assert!(matches!(
        setup
            .evaluator
            .mod_switch_to(&switched, setup.context.first_parms_id()),
        Err(Error::InvalidLevel(_))
    ));
    assert!(matches!(
        setup.evaluator.mod_switch_to(&fresh, &bfv::ParmsId::ZERO),
        Err(Error::ParmsMismatch(_))
    ));

    // Operands at different levels do not mix.
    assert!(matches!(
        setup.evaluator.add(&fresh, &switched),
        Err(Error::FingerprintMismatch { .. })
    ));
}

#[test]
fn fingerprints_across_contexts() {
    let mut setup: Setup = Setup::new(toy_context(), 13);
    let m: Vec<u64> = coeffs(10, N, T);
    let ct: Ciphertext = encrypt(&mut setup, &m);

    // Identical parameters in another context are interchangeable.
    let twin: Arc<Context> = toy_context();
    assert_eq!(twin.first_parms_id(), setup.context.first_parms_id());
    let evaluator = bfv::Evaluator::new(&twin);
    let doubled: Ciphertext = evaluator.add(&ct, &ct).unwrap();
    let expected: Vec<u64> = m.iter().map(|x| 2 * x % T).collect();
    assert_eq!(decrypt(&setup, &doubled), expected);

    // A different plaintext modulus changes every fingerprint.
    let other: Arc<Context> = Context::create(parms(&[50, 50, 50, 60], 193), true, SecurityLevel::None).unwrap();
    assert_ne!(other.first_parms_id(), setup.context.first_parms_id());
    let mut other_setup: Setup = Setup::new(other.clone(), 14);
    let other_ct: Ciphertext = other_setup
        .encryptor
        .encrypt(&Plaintext::from_value(1))
        .unwrap();
    assert!(matches!(
        setup.evaluator.add(&ct, &other_ct),
        Err(Error::FingerprintMismatch { .. })
    ));
    assert!(matches!(
        setup.evaluator.negate(&other_ct),
        Err(Error::ParmsMismatch(_))
    ));
    assert!(matches!(
        bfv::Decryptor::new(&other, setup.keygen.secret_key()),
        Err(Error::FingerprintMismatch { .. })
    ));
}
