//! AES block cipher with ECB, CBC and CFB128 modes of operation.
//!
//! This crate follows FIPS-197 and NIST SP 800-38A and provides:
//! - Key schedules for AES-128, AES-192 and AES-256, one per direction.
//! - Single-block encryption and decryption.
//! - CBC and CFB128 over caller-owned IV and stream-offset state.
//! - A known-answer self-test.
//!
//! The S-box is computed with branchless field arithmetic instead of lookup
//! tables, so memory access patterns do not depend on key or data. Padding,
//! IV generation and authentication are left to the caller.
//!
//! ```
//! use aesx_core::{cbc_transform, Context, Direction};
//!
//! let key = [0x2bu8; 16];
//! let enc = Context::schedule_encrypt(&key)?;
//! let dec = Context::schedule_decrypt(&key)?;
//!
//! let plain = *b"two blocks of plaintext, 32 byte";
//! let mut ct = [0u8; 32];
//! let mut iv = [0u8; 16];
//! cbc_transform(&enc, Direction::Encrypt, &mut iv, &plain, &mut ct)?;
//!
//! let mut pt = [0u8; 32];
//! let mut iv = [0u8; 16];
//! cbc_transform(&dec, Direction::Decrypt, &mut iv, &ct, &mut pt)?;
//! assert_eq!(pt, plain);
//! # Ok::<(), aesx_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
#[cfg(test)]
mod fault;
mod key;
mod modes;
mod round;
mod sbox;
pub mod selftest;

pub use crate::block::{xor_in_place, Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, schedule_decrypt, schedule_encrypt};
pub use crate::error::{Error, Result};
pub use crate::key::{Context, Direction, KeySize};
pub use crate::modes::{
    cbc_transform, cbc_transform_in_place, cfb128_transform, cfb128_transform_in_place,
    ecb_transform, Cfb128Stream,
};
pub use crate::selftest::{run_vectors, self_test, SelfTestReport};
