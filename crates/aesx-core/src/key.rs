//! Key sizes, cipher direction and the expanded key context.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::Block;
use crate::error::{Error, Result};

/// Supported AES key sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key, 10 rounds.
    Aes128,
    /// 192-bit key, 12 rounds.
    Aes192,
    /// 256-bit key, 14 rounds.
    Aes256,
}

impl KeySize {
    /// Maps a raw key length in bytes to a key size.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            _ => Err(Error::InvalidKeyLength { len }),
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Key length in bits.
    pub fn bits(self) -> usize {
        self.key_len() * 8
    }

    /// Number of rounds (`nr`).
    pub fn rounds(self) -> usize {
        match self {
            Self::Aes128 => 10,
            Self::Aes192 => 12,
            Self::Aes256 => 14,
        }
    }

    /// Key length in 32-bit words (`nk`).
    pub(crate) fn words(self) -> usize {
        self.key_len() / 4
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.bits())
    }
}

/// Direction a context is scheduled for, or a mode is asked to run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Plaintext to ciphertext.
    Encrypt,
    /// Ciphertext to plaintext.
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => f.write_str("encrypt"),
            Self::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Expanded key schedule for one direction.
///
/// Holds exactly `rounds + 1` round keys. A context scheduled for encryption
/// must not be used to decrypt blocks and vice versa; the decryption round
/// keys carry an extra InvMixColumns step. Round keys are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Context {
    #[zeroize(skip)]
    direction: Direction,
    #[zeroize(skip)]
    key_size: KeySize,
    round_keys: Vec<Block>,
}

impl Context {
    pub(crate) fn from_parts(
        direction: Direction,
        key_size: KeySize,
        round_keys: Vec<Block>,
    ) -> Self {
        debug_assert_eq!(round_keys.len(), key_size.rounds() + 1);
        Self {
            direction,
            key_size,
            round_keys,
        }
    }

    /// Direction this context was scheduled for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Key size the context was built from.
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// Number of rounds (10, 12 or 14).
    pub fn rounds(&self) -> usize {
        self.key_size.rounds()
    }

    /// All round keys in the order the block transform consumes them.
    pub fn round_keys(&self) -> &[Block] {
        &self.round_keys
    }

    /// Returns the round key at the requested index (`0..=rounds`).
    ///
    /// # Panics
    ///
    /// Panics if `round` is greater than [`Context::rounds`].
    #[inline]
    pub fn round_key(&self, round: usize) -> &Block {
        &self.round_keys[round]
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("direction", &self.direction)
            .field("key_size", &self.key_size)
            .field("round_keys", &"<redacted>")
            .finish()
    }
}
