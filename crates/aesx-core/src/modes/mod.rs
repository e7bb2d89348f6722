//! Modes of operation built on the block transform.
//!
//! Chaining state (IV and, for CFB128, the stream offset) is owned by the
//! caller and updated in place, so splitting a buffer across several calls
//! gives the same output as one call over the whole buffer.

mod cbc;
mod cfb;

pub use cbc::{cbc_transform, cbc_transform_in_place};
pub use cfb::{cfb128_transform, cfb128_transform_in_place, Cfb128Stream};

use crate::block::Block;
use crate::key::{Context, Direction};

/// Transforms a single block in Electronic Codebook mode.
///
/// Blocks are processed independently, so equal plaintext blocks give equal
/// ciphertext blocks. Prefer CBC or CFB128 for anything longer than one
/// block. `ctx` must be scheduled for `direction`.
pub fn ecb_transform(ctx: &Context, direction: Direction, block: &Block) -> Block {
    match direction {
        Direction::Encrypt => ctx.encrypt_block(block),
        Direction::Decrypt => ctx.decrypt_block(block),
    }
}
