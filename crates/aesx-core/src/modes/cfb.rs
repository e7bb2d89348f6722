//! Cipher Feedback mode with a 128-bit segment (NIST SP 800-38A §6.3).
//!
//! The IV buffer doubles as the keystream block: when the offset wraps to 0
//! the IV is replaced by its own encryption, and each processed byte then
//! overwrites the keystream byte it consumed with the ciphertext byte. Once
//! 16 bytes have gone through, the IV holds the previous ciphertext block,
//! which is exactly the next CFB input. Mid-block, the bytes from `offset`
//! onwards are unused keystream, so `(iv, offset)` is the complete state.

use crate::block::{Block, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::key::{Context, Direction};

fn check_offset(offset: usize) -> Result<()> {
    if offset >= BLOCK_SIZE {
        return Err(Error::InvalidStreamOffset { offset });
    }
    Ok(())
}

/// Encrypts or decrypts `input` into `output` in CFB128 mode.
///
/// `ctx` must be scheduled for encryption in both directions; CFB only ever
/// runs the forward cipher. Any length is accepted. `offset` must be in
/// `0..16` and, together with `iv`, is advanced so a later call continues
/// the stream byte for byte. On error nothing is written and the state is
/// untouched.
pub fn cfb128_transform(
    ctx: &Context,
    direction: Direction,
    offset: &mut usize,
    iv: &mut Block,
    input: &[u8],
    output: &mut [u8],
) -> Result<()> {
    check_offset(*offset)?;
    if output.len() != input.len() {
        return Err(Error::InvalidInputLength {
            len: output.len(),
            expected: "output as long as input",
        });
    }
    output.copy_from_slice(input);
    process(ctx, direction, offset, iv, output);
    Ok(())
}

/// In-place variant of [`cfb128_transform`].
pub fn cfb128_transform_in_place(
    ctx: &Context,
    direction: Direction,
    offset: &mut usize,
    iv: &mut Block,
    buf: &mut [u8],
) -> Result<()> {
    check_offset(*offset)?;
    process(ctx, direction, offset, iv, buf);
    Ok(())
}

fn process(
    ctx: &Context,
    direction: Direction,
    offset: &mut usize,
    iv: &mut Block,
    buf: &mut [u8],
) {
    let mut n = *offset;
    for byte in buf.iter_mut() {
        if n == 0 {
            *iv = ctx.encrypt_block(iv);
        }
        let input = *byte;
        *byte = input ^ iv[n];
        // The feedback register always collects ciphertext: the input when
        // decrypting, the output when encrypting.
        iv[n] = match direction {
            Direction::Encrypt => *byte,
            Direction::Decrypt => input,
        };
        n = (n + 1) % BLOCK_SIZE;
    }
    *offset = n;
}

/// CFB128 stream holding its own IV and offset.
///
/// Useful when the chaining state should live next to the data source, for
/// example when feeding a socket or file in arbitrarily sized pieces.
#[derive(Clone, Debug)]
pub struct Cfb128Stream<'a> {
    ctx: &'a Context,
    iv: Block,
    offset: usize,
}

impl<'a> Cfb128Stream<'a> {
    /// Starts a stream at the beginning of a keystream block.
    ///
    /// `ctx` must be scheduled for encryption.
    pub fn new(ctx: &'a Context, iv: Block) -> Self {
        Self { ctx, iv, offset: 0 }
    }

    /// Resumes a stream from a previously saved `(iv, offset)` pair.
    pub fn resume(ctx: &'a Context, iv: Block, offset: usize) -> Result<Self> {
        check_offset(offset)?;
        Ok(Self { ctx, iv, offset })
    }

    /// Encrypts `buf` in place.
    pub fn encrypt(&mut self, buf: &mut [u8]) {
        process(self.ctx, Direction::Encrypt, &mut self.offset, &mut self.iv, buf);
    }

    /// Decrypts `buf` in place.
    pub fn decrypt(&mut self, buf: &mut [u8]) {
        process(self.ctx, Direction::Decrypt, &mut self.offset, &mut self.iv, buf);
    }

    /// Current feedback register.
    pub fn iv(&self) -> &Block {
        &self.iv
    }

    /// Bytes of the current keystream block already consumed.
    pub fn offset(&self) -> usize {
        self.offset
    }
}
