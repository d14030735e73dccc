mod common;

use bfv::{BatchEncoder, Ciphertext, Context, Error, GaloisKeys, Plaintext, SecurityLevel};
use common::{parms, sub_test, toy_context, Setup, N, T};
use math::automorphism::galois_element_from_step;
use std::sync::Arc;

#[test]
fn batching() {
    let mut setup: Setup = Setup::new(toy_context(), 21);
    let encoder: BatchEncoder = BatchEncoder::new(&setup.context).unwrap();
    let galois_keys: GaloisKeys = setup.keygen.create_galois_keys().unwrap();

    sub_test("test_encode_decode", || test_encode_decode(&encoder));
    sub_test("test_slot_arithmetic", || test_slot_arithmetic(&mut setup, &encoder));
    sub_test("test_rotate_rows", || test_rotate_rows(&mut setup, &encoder, &galois_keys));
    sub_test("test_rotate_columns", || test_rotate_columns(&mut setup, &encoder, &galois_keys));
    sub_test("test_rotation_errors", || test_rotation_errors(&mut setup, &encoder));
    sub_test("test_rotate_last_level", || test_rotate_last_level(&mut setup, &encoder, &galois_keys));
}

fn slots(seed: u64) -> Vec<u64> {
    (0..N as u64).map(|i| (i * 31 + seed * 17 + 5) % T).collect()
}

/// Rotates both rows of a 2 x N/2 matrix left by steps.
fn rotate_rows_plain(values: &[u64], steps: i32) -> Vec<u64> {
    let row: usize = N / 2;
    let shift: usize = steps.rem_euclid(row as i32) as usize;
    values
        .chunks(row)
        .flat_map(|r| r[shift..].iter().chain(r[..shift].iter()).copied())
        .collect()
}

fn test_encode_decode(encoder: &BatchEncoder) {
    assert_eq!(encoder.slot_count(), N);
    assert_eq!(encoder.row_size(), N / 2);

    let values: Vec<u64> = slots(1);
    let pt: Plaintext = encoder.encode(&values).unwrap();
    assert_eq!(encoder.decode(&pt).unwrap(), values);

    // A constant vector encodes to a constant polynomial.
    let pt: Plaintext = encoder.encode(&vec![7; N]).unwrap();
    assert_eq!(pt, Plaintext::from_value(7));

    let short: Vec<u64> = vec![1, 2, 3];
    let mut expected: Vec<u64> = short.clone();
    expected.resize(N, 0);
    assert_eq!(encoder.decode(&encoder.encode(&short).unwrap()).unwrap(), expected);

    let signed: Vec<i64> = (0..N as i64).map(|i| i - 32).collect();
    let pt: Plaintext = encoder.encode_signed(&signed).unwrap();
    assert_eq!(encoder.decode_signed(&pt).unwrap(), signed);

    assert!(matches!(encoder.encode(&vec![0; N + 1]), Err(Error::InvalidArgument(_))));
    assert!(matches!(encoder.encode(&[T]), Err(Error::InvalidArgument(_))));
    assert!(matches!(encoder.encode_signed(&[T as i64]), Err(Error::InvalidArgument(_))));
}

fn test_slot_arithmetic(setup: &mut Setup, encoder: &BatchEncoder) {
    let (a, b) = (slots(2), slots(3));
    let ct_a: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&a).unwrap()).unwrap();
    let ct_b: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&b).unwrap()).unwrap();

    let ct: Ciphertext = setup.evaluator.multiply(&ct_a, &ct_b).unwrap();
    let expected: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| x * y % T).collect();
    let res: Vec<u64> = encoder
        .decode(&setup.decryptor.decrypt(&ct).unwrap())
        .unwrap();
    assert_eq!(res, expected);

    let ct: Ciphertext = setup
        .evaluator
        .multiply_plain(&ct_a, &encoder.encode(&b).unwrap())
        .unwrap();
    let res: Vec<u64> = encoder
        .decode(&setup.decryptor.decrypt(&ct).unwrap())
        .unwrap();
    assert_eq!(res, expected);
}

fn test_rotate_rows(setup: &mut Setup, encoder: &BatchEncoder, galois_keys: &GaloisKeys) {
    let values: Vec<u64> = slots(4);
    let ct: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&values).unwrap()).unwrap();

    // 3 and -5 have no key of their own and go through their non-adjacent form.
    for steps in [1, -1, 2, 3, -5, 16, 31] {
        let rotated: Ciphertext = setup.evaluator.rotate_rows(&ct, steps, galois_keys).unwrap();
        assert_eq!(rotated.size(), 2);
        let res: Vec<u64> = encoder
            .decode(&setup.decryptor.decrypt(&rotated).unwrap())
            .unwrap();
        assert_eq!(res, rotate_rows_plain(&values, steps), "steps={}", steps);

        let back: Ciphertext = setup.evaluator.rotate_rows(&rotated, -steps, galois_keys).unwrap();
        let res: Vec<u64> = encoder
            .decode(&setup.decryptor.decrypt(&back).unwrap())
            .unwrap();
        assert_eq!(res, values, "steps={} round trip", steps);
    }

    assert_eq!(setup.evaluator.rotate_rows(&ct, 0, galois_keys).unwrap(), ct);
}

fn test_rotate_columns(setup: &mut Setup, encoder: &BatchEncoder, galois_keys: &GaloisKeys) {
    let values: Vec<u64> = slots(5);
    let ct: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&values).unwrap()).unwrap();
    let swapped: Ciphertext = setup.evaluator.rotate_columns(&ct, galois_keys).unwrap();
    let res: Vec<u64> = encoder
        .decode(&setup.decryptor.decrypt(&swapped).unwrap())
        .unwrap();
    let expected: Vec<u64> = values[N / 2..]
        .iter()
        .chain(values[..N / 2].iter())
        .copied()
        .collect();
    assert_eq!(res, expected);
}

fn test_rotation_errors(setup: &mut Setup, encoder: &BatchEncoder) {
    let ct: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&slots(6)).unwrap()).unwrap();
    let only_one: GaloisKeys = setup.keygen.create_galois_keys_from_steps(&[1]).unwrap();
    let ev = &setup.evaluator;

    assert!(ev.rotate_rows(&ct, 1, &only_one).is_ok());
    assert!(matches!(
        ev.rotate_rows(&ct, 2, &only_one),
        Err(Error::MissingGaloisElement(_))
    ));
    assert!(matches!(
        ev.rotate_rows(&ct, 3, &only_one),
        Err(Error::MissingGaloisElement(_))
    ));

    // 5 = 1 + 4: the key for 1 exists, the one for 4 does not.
    let mut partial: Ciphertext = ct.clone();
    let four: usize = galois_element_from_step(N, 4).unwrap();
    assert!(matches!(
        ev.rotate_rows_inplace(&mut partial, 5, &only_one),
        Err(Error::MissingGaloisElement(elt)) if elt == four
    ));
    assert_eq!(partial, ct);

    assert!(matches!(
        ev.rotate_columns(&ct, &only_one),
        Err(Error::MissingGaloisElement(_))
    ));
    assert!(matches!(
        ev.rotate_rows(&ct, (N / 2) as i32, &only_one),
        Err(Error::InvalidArgument(_))
    ));

    let squared: Ciphertext = ev.square(&ct).unwrap();
    assert!(matches!(
        ev.rotate_rows(&squared, 1, &only_one),
        Err(Error::InvalidArgument(_))
    ));
}

fn test_rotate_last_level(setup: &mut Setup, encoder: &BatchEncoder, galois_keys: &GaloisKeys) {
    let values: Vec<u64> = slots(7);
    let ct: Ciphertext = setup.encryptor.encrypt(&encoder.encode(&values).unwrap()).unwrap();
    let ct: Ciphertext = setup
        .evaluator
        .mod_switch_to(&ct, setup.context.last_parms_id())
        .unwrap();
    assert_eq!(ct.coeff_modulus_count(), 1);

    for steps in [1, 3, -3] {
        let rotated: Ciphertext = setup.evaluator.rotate_rows(&ct, steps, galois_keys).unwrap();
        assert_eq!(rotated.parms_id(), setup.context.last_parms_id());
        let res: Vec<u64> = encoder
            .decode(&setup.decryptor.decrypt_checked(&rotated).unwrap())
            .unwrap();
        assert_eq!(res, rotate_rows_plain(&values, steps), "steps={}", steps);
    }

    let back: Ciphertext = setup.evaluator.rotate_rows(&ct, 3, galois_keys).unwrap();
    let back: Ciphertext = setup.evaluator.rotate_rows(&back, -3, galois_keys).unwrap();
    let res: Vec<u64> = encoder
        .decode(&setup.decryptor.decrypt_checked(&back).unwrap())
        .unwrap();
    assert_eq!(res, values);

    let swapped: Ciphertext = setup.evaluator.rotate_columns(&ct, galois_keys).unwrap();
    let res: Vec<u64> = encoder
        .decode(&setup.decryptor.decrypt_checked(&swapped).unwrap())
        .unwrap();
    assert_eq!(&res[..N / 2], &values[N / 2..]);
}

#[test]
fn batching_requires_prime_plain_modulus() {
    let context: Arc<Context> = Context::create(parms(&[50, 50, 60], 1024), true, SecurityLevel::None).unwrap();
    assert!(!context.using_batching());
    assert!(matches!(BatchEncoder::new(&context), Err(Error::UnsupportedOperation(_))));

    let mut setup: Setup = Setup::new(context, 31);
    let galois_keys: GaloisKeys = setup.keygen.create_galois_keys().unwrap();
    let ct: Ciphertext = setup.encryptor.encrypt(&Plaintext::from_value(1)).unwrap();
    assert!(matches!(
        setup.evaluator.rotate_rows(&ct, 1, &galois_keys),
        Err(Error::UnsupportedOperation(_))
    ));
}
