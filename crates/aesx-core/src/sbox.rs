//! GF(2^8) arithmetic and the AES S-box.
//!
//! The substitution is computed rather than looked up: the multiplicative
//! inverse is taken as `x^254` and followed by the affine map. Every helper is
//! branchless and touches no secret-indexed memory, so timing and cache
//! behaviour do not depend on the bytes being substituted.

/// Multiplies by `x` modulo the AES polynomial `x^8 + x^4 + x^3 + x + 1`.
#[inline(always)]
pub fn xtime(byte: u8) -> u8 {
    let reduce = (byte >> 7).wrapping_neg() & 0x1b;
    (byte << 1) ^ reduce
}

/// Multiplies two field elements.
#[inline(always)]
pub fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        product ^= a & (b & 1).wrapping_neg();
        a = xtime(a);
        b >>= 1;
    }
    product
}

/// Multiplicative inverse, with `0` mapping to `0`.
#[inline(always)]
fn gf_inv(x: u8) -> u8 {
    let x2 = gmul(x, x);
    let x4 = gmul(x2, x2);
    let x8 = gmul(x4, x4);
    let x16 = gmul(x8, x8);
    let x32 = gmul(x16, x16);
    let x64 = gmul(x32, x32);
    let x128 = gmul(x64, x64);

    // x^254 = x^128 * x^64 * x^32 * x^16 * x^8 * x^4 * x^2
    let mut y = gmul(x128, x64);
    y = gmul(y, x32);
    y = gmul(y, x16);
    y = gmul(y, x8);
    y = gmul(y, x4);
    gmul(y, x2)
}

/// Forward S-box.
#[inline]
pub fn sbox(byte: u8) -> u8 {
    let inv = gf_inv(byte);
    let rotated = inv.rotate_left(1) ^ inv.rotate_left(2) ^ inv.rotate_left(3) ^ inv.rotate_left(4);
    let out = inv ^ rotated ^ 0x63;
    #[cfg(test)]
    let out = crate::fault::sbox(byte, out);
    out
}

/// Inverse S-box.
#[inline]
pub fn inv_sbox(byte: u8) -> u8 {
    let y = byte ^ 0x63;
    gf_inv(y.rotate_left(1) ^ y.rotate_left(3) ^ y.rotate_left(6))
}
