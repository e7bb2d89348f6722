//! AES key schedule and block encryption/decryption.

use crate::block::Block;
use crate::error::Result;
use crate::key::{Context, Direction, KeySize};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::sbox;

/// Round constants, enough for the longest schedule (AES-128 needs all ten).
const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

fn sub_word(word: u32) -> u32 {
    let [b0, b1, b2, b3] = word.to_be_bytes();
    u32::from_be_bytes([sbox(b0), sbox(b1), sbox(b2), sbox(b3)])
}

/// Expands a raw key into the encryption round keys (`rounds + 1` blocks).
fn expand_key(key: &[u8], key_size: KeySize) -> Vec<Block> {
    let nk = key_size.words();
    let total = 4 * (key_size.rounds() + 1);

    let mut w = Vec::with_capacity(total);
    for chunk in key.chunks_exact(4) {
        w.push(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    for i in nk..total {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            let rcon = RCON[i / nk - 1];
            #[cfg(test)]
            let rcon = crate::fault::rcon(i / nk - 1, rcon);
            temp = sub_word(rot_word(temp)) ^ (u32::from(rcon) << 24);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w.push(w[i - nk] ^ temp);
    }

    let round_keys = w
        .chunks_exact(4)
        .map(|words| {
            let mut round_key = [0u8; 16];
            for (dst, word) in round_key.chunks_exact_mut(4).zip(words) {
                dst.copy_from_slice(&word.to_be_bytes());
            }
            round_key
        })
        .collect();

    // Key words are as sensitive as the round keys.
    zeroize::Zeroize::zeroize(&mut w);
    round_keys
}

impl Context {
    /// Builds an encryption schedule from a 16, 24 or 32 byte key.
    pub fn schedule_encrypt(key: &[u8]) -> Result<Self> {
        let key_size = KeySize::from_len(key.len())?;
        Ok(Self::from_parts(Direction::Encrypt, key_size, expand_key(key, key_size)))
    }

    /// Builds a decryption schedule from a 16, 24 or 32 byte key.
    ///
    /// The encryption round keys are reversed and every key except the first
    /// and last goes through InvMixColumns, so decryption can run the inverse
    /// rounds in the same shape as encryption.
    pub fn schedule_decrypt(key: &[u8]) -> Result<Self> {
        let key_size = KeySize::from_len(key.len())?;
        let mut round_keys = expand_key(key, key_size);
        round_keys.reverse();
        let last = round_keys.len() - 1;
        for round_key in &mut round_keys[1..last] {
            inv_mix_columns(round_key);
        }
        Ok(Self::from_parts(Direction::Decrypt, key_size, round_keys))
    }

    /// Builds a schedule for the given direction.
    pub fn new(direction: Direction, key: &[u8]) -> Result<Self> {
        match direction {
            Direction::Encrypt => Self::schedule_encrypt(key),
            Direction::Decrypt => Self::schedule_decrypt(key),
        }
    }

    /// Encrypts one block. The context must be scheduled for encryption.
    pub fn encrypt_block(&self, block: &Block) -> Block {
        debug_assert_eq!(self.direction(), Direction::Encrypt);
        let rounds = self.rounds();
        let mut state = *block;

        add_round_key(&mut state, self.round_key(0));
        for round in 1..rounds {
            sub_bytes(&mut state);
            shift_rows(&mut state);
            mix_columns(&mut state);
            add_round_key(&mut state, self.round_key(round));
        }
        sub_bytes(&mut state);
        shift_rows(&mut state);
        add_round_key(&mut state, self.round_key(rounds));

        state
    }

    /// Decrypts one block. The context must be scheduled for decryption.
    pub fn decrypt_block(&self, block: &Block) -> Block {
        debug_assert_eq!(self.direction(), Direction::Decrypt);
        let rounds = self.rounds();
        let mut state = *block;

        add_round_key(&mut state, self.round_key(0));
        for round in 1..rounds {
            inv_sub_bytes(&mut state);
            inv_shift_rows(&mut state);
            inv_mix_columns(&mut state);
            add_round_key(&mut state, self.round_key(round));
        }
        inv_sub_bytes(&mut state);
        inv_shift_rows(&mut state);
        add_round_key(&mut state, self.round_key(rounds));

        state
    }
}

/// Builds an encryption schedule. See [`Context::schedule_encrypt`].
pub fn schedule_encrypt(key: &[u8]) -> Result<Context> {
    Context::schedule_encrypt(key)
}

/// Builds a decryption schedule. See [`Context::schedule_decrypt`].
pub fn schedule_decrypt(key: &[u8]) -> Result<Context> {
    Context::schedule_decrypt(key)
}

/// Encrypts a single 16-byte block with an encryption context.
pub fn encrypt_block(ctx: &Context, block: &Block) -> Block {
    ctx.encrypt_block(block)
}

/// Decrypts a single 16-byte block with a decryption context.
pub fn decrypt_block(ctx: &Context, block: &Block) -> Block {
    ctx.decrypt_block(block)
}
