//! Cipher Block Chaining mode (NIST SP 800-38A §6.2).

use crate::block::{load, xor_in_place, Block, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::key::{Context, Direction};

fn check_aligned(len: usize) -> Result<()> {
    if len % BLOCK_SIZE != 0 {
        return Err(Error::InvalidInputLength {
            len,
            expected: "a multiple of 16 bytes",
        });
    }
    Ok(())
}

/// Encrypts or decrypts `input` into `output` in CBC mode.
///
/// `input.len()` must be a multiple of 16 and `output` must be the same
/// length. Padding is the caller's concern. On success `iv` holds the last
/// ciphertext block, ready for a follow-up call that continues the stream.
/// On error nothing is written and `iv` is untouched.
///
/// `ctx` must be scheduled for `direction`.
pub fn cbc_transform(
    ctx: &Context,
    direction: Direction,
    iv: &mut Block,
    input: &[u8],
    output: &mut [u8],
) -> Result<()> {
    check_aligned(input.len())?;
    if output.len() != input.len() {
        return Err(Error::InvalidInputLength {
            len: output.len(),
            expected: "output as long as input",
        });
    }
    output.copy_from_slice(input);
    process(ctx, direction, iv, output);
    Ok(())
}

/// In-place variant of [`cbc_transform`].
pub fn cbc_transform_in_place(
    ctx: &Context,
    direction: Direction,
    iv: &mut Block,
    buf: &mut [u8],
) -> Result<()> {
    check_aligned(buf.len())?;
    process(ctx, direction, iv, buf);
    Ok(())
}

fn process(ctx: &Context, direction: Direction, iv: &mut Block, buf: &mut [u8]) {
    match direction {
        Direction::Encrypt => {
            for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
                let mut block = load(chunk);
                xor_in_place(&mut block, iv);
                *iv = ctx.encrypt_block(&block);
                chunk.copy_from_slice(iv);
            }
        }
        Direction::Decrypt => {
            for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
                let ciphertext = load(chunk);
                let mut block = ctx.decrypt_block(&ciphertext);
                xor_in_place(&mut block, iv);
                chunk.copy_from_slice(&block);
                // Chain on the ciphertext, not the recovered plaintext.
                *iv = ciphertext;
            }
        }
    }
}
