//! AES round transformations.
//!
//! The state is stored column-major: byte `4 * c + r` holds row `r` of
//! column `c`, which is also the order of the input block.

use crate::block::{xor_in_place, Block};
use crate::sbox::{gmul, inv_sbox, sbox, xtime};

/// Applies SubBytes to the state in place.
#[inline]
pub fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = sbox(*byte);
    }
}

/// Applies the inverse SubBytes transformation.
#[inline]
pub fn inv_sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = inv_sbox(*byte);
    }
}

/// Performs ShiftRows in place.
#[inline]
pub fn shift_rows(state: &mut Block) {
    let s = *state;
    *state = [
        s[0], s[5], s[10], s[15], //
        s[4], s[9], s[14], s[3], //
        s[8], s[13], s[2], s[7], //
        s[12], s[1], s[6], s[11],
    ];
}

/// Performs the inverse of ShiftRows in place.
#[inline]
pub fn inv_shift_rows(state: &mut Block) {
    let s = *state;
    *state = [
        s[0], s[13], s[10], s[7], //
        s[4], s[1], s[14], s[11], //
        s[8], s[5], s[2], s[15], //
        s[12], s[9], s[6], s[3],
    ];
}

fn mix_single_column(col: &mut [u8]) {
    let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
    col[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
    col[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
    col[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
    col[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
}

fn inv_mix_single_column(col: &mut [u8]) {
    let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
    col[0] = gmul(a0, 0x0e) ^ gmul(a1, 0x0b) ^ gmul(a2, 0x0d) ^ gmul(a3, 0x09);
    col[1] = gmul(a0, 0x09) ^ gmul(a1, 0x0e) ^ gmul(a2, 0x0b) ^ gmul(a3, 0x0d);
    col[2] = gmul(a0, 0x0d) ^ gmul(a1, 0x09) ^ gmul(a2, 0x0e) ^ gmul(a3, 0x0b);
    col[3] = gmul(a0, 0x0b) ^ gmul(a1, 0x0d) ^ gmul(a2, 0x09) ^ gmul(a3, 0x0e);
}

/// MixColumns over all four columns.
#[inline]
pub fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        mix_single_column(column);
    }
}

/// Inverse MixColumns over all four columns.
///
/// Also used by the key schedule to derive the decryption round keys.
#[inline]
pub fn inv_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        inv_mix_single_column(column);
    }
}

/// Adds (XORs) a round key into the state.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}
