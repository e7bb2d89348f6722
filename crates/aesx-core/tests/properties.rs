//! Property-based tests for the block transform and the chaining modes.

use aesx_core::{
    cbc_transform, cfb128_transform, schedule_decrypt, schedule_encrypt, Context, Direction, Error,
};
use proptest::prelude::*;

/// Keys of every supported length.
fn any_key() -> impl Strategy<Value = Vec<u8>> {
    prop::sample::select(vec![16usize, 24, 32])
        .prop_flat_map(|len| prop::collection::vec(any::<u8>(), len))
}

/// Data that's a multiple of 16 bytes.
fn block_aligned_data() -> impl Strategy<Value = Vec<u8>> {
    (0usize..=16).prop_flat_map(|blocks| prop::collection::vec(any::<u8>(), blocks * 16))
}

fn cbc(ctx: &Context, direction: Direction, iv: [u8; 16], data: &[u8]) -> Vec<u8> {
    let mut iv = iv;
    let mut out = vec![0u8; data.len()];
    cbc_transform(ctx, direction, &mut iv, data, &mut out).unwrap();
    out
}

fn cfb(ctx: &Context, direction: Direction, iv: [u8; 16], data: &[u8]) -> Vec<u8> {
    let (mut iv, mut offset) = (iv, 0usize);
    let mut out = vec![0u8; data.len()];
    cfb128_transform(ctx, direction, &mut offset, &mut iv, data, &mut out).unwrap();
    out
}

proptest! {
    #[test]
    fn block_round_trip(key in any_key(), block in any::<[u8; 16]>()) {
        let enc = schedule_encrypt(&key).unwrap();
        let dec = schedule_decrypt(&key).unwrap();
        prop_assert_eq!(dec.decrypt_block(&enc.encrypt_block(&block)), block);
    }

    #[test]
    fn cbc_round_trip(
        key in any_key(),
        iv in any::<[u8; 16]>(),
        data in block_aligned_data()
    ) {
        let enc = schedule_encrypt(&key).unwrap();
        let dec = schedule_decrypt(&key).unwrap();
        let ciphertext = cbc(&enc, Direction::Encrypt, iv, &data);
        prop_assert_eq!(cbc(&dec, Direction::Decrypt, iv, &ciphertext), data);
    }

    #[test]
    fn cfb128_round_trip(
        key in any_key(),
        iv in any::<[u8; 16]>(),
        data in prop::collection::vec(any::<u8>(), 0..300)
    ) {
        let ctx = schedule_encrypt(&key).unwrap();
        let ciphertext = cfb(&ctx, Direction::Encrypt, iv, &data);
        prop_assert_eq!(ciphertext.len(), data.len());
        prop_assert_eq!(cfb(&ctx, Direction::Decrypt, iv, &ciphertext), data);
    }

    #[test]
    fn cbc_split_matches_whole(
        key in any_key(),
        iv in any::<[u8; 16]>(),
        data in block_aligned_data(),
        split in 0usize..=16,
        decrypt in any::<bool>()
    ) {
        let direction = if decrypt { Direction::Decrypt } else { Direction::Encrypt };
        let ctx = Context::new(direction, &key).unwrap();
        let at = (split * 16).min(data.len());

        let mut whole = vec![0u8; data.len()];
        let mut iv_whole = iv;
        cbc_transform(&ctx, direction, &mut iv_whole, &data, &mut whole).unwrap();

        let mut parts = vec![0u8; data.len()];
        let mut iv_parts = iv;
        let (head_out, tail_out) = parts.split_at_mut(at);
        cbc_transform(&ctx, direction, &mut iv_parts, &data[..at], head_out).unwrap();
        cbc_transform(&ctx, direction, &mut iv_parts, &data[at..], tail_out).unwrap();

        prop_assert_eq!(parts, whole);
        prop_assert_eq!(iv_parts, iv_whole);
    }

    #[test]
    fn cfb128_split_matches_whole(
        key in any_key(),
        iv in any::<[u8; 16]>(),
        data in prop::collection::vec(any::<u8>(), 0..200),
        split in any::<prop::sample::Index>(),
        decrypt in any::<bool>()
    ) {
        let direction = if decrypt { Direction::Decrypt } else { Direction::Encrypt };
        let ctx = schedule_encrypt(&key).unwrap();
        let at = split.index(data.len() + 1);

        let mut whole = vec![0u8; data.len()];
        let (mut iv_whole, mut off_whole) = (iv, 0usize);
        cfb128_transform(&ctx, direction, &mut off_whole, &mut iv_whole, &data, &mut whole)
            .unwrap();

        let mut parts = vec![0u8; data.len()];
        let (mut iv_parts, mut off_parts) = (iv, 0usize);
        let (head_out, tail_out) = parts.split_at_mut(at);
        cfb128_transform(&ctx, direction, &mut off_parts, &mut iv_parts, &data[..at], head_out)
            .unwrap();
        cfb128_transform(&ctx, direction, &mut off_parts, &mut iv_parts, &data[at..], tail_out)
            .unwrap();

        prop_assert_eq!(parts, whole);
        prop_assert_eq!(off_parts, off_whole);
        prop_assert_eq!(iv_parts, iv_whole);
    }

    #[test]
    fn cbc_rejects_unaligned_lengths(len in 1usize..200) {
        prop_assume!(len % 16 != 0);
        let ctx = schedule_encrypt(&[0u8; 16]).unwrap();
        let input = vec![0u8; len];
        let mut output = vec![0u8; len];
        let mut iv = [0u8; 16];
        let err = cbc_transform(&ctx, Direction::Encrypt, &mut iv, &input, &mut output);
        let rejected = matches!(err, Err(Error::InvalidInputLength { .. }));
        prop_assert!(rejected);
        prop_assert_eq!(iv, [0u8; 16]);
    }

    #[test]
    fn schedule_rejects_other_key_lengths(len in 0usize..64) {
        prop_assume!(len != 16 && len != 24 && len != 32);
        let key = vec![0u8; len];
        prop_assert_eq!(schedule_encrypt(&key).unwrap_err(), Error::InvalidKeyLength { len });
        prop_assert_eq!(schedule_decrypt(&key).unwrap_err(), Error::InvalidKeyLength { len });
    }
}

#[test]
fn self_test_passes() {
    let report = aesx_core::self_test(false).expect("self-test");
    assert_eq!(report.failed(), 0);
    assert!(report.passed() > 0);
}
