//! Test-only corruption of the round constants and the S-box.
//!
//! Overrides are thread-local, so a test that corrupts a table only affects
//! the schedules and blocks it computes itself.

use std::cell::Cell;

thread_local! {
    static RCON: Cell<Option<(usize, u8)>> = const { Cell::new(None) };
    static SBOX: Cell<Option<(u8, u8)>> = const { Cell::new(None) };
}

/// Applies an active round-constant override to `RCON[index]`.
pub(crate) fn rcon(index: usize, value: u8) -> u8 {
    match RCON.with(Cell::get) {
        Some((i, replacement)) if i == index => replacement,
        _ => value,
    }
}

/// Applies an active S-box override to the entry for `input`.
pub(crate) fn sbox(input: u8, value: u8) -> u8 {
    match SBOX.with(Cell::get) {
        Some((i, replacement)) if i == input => replacement,
        _ => value,
    }
}

/// Restores the unmodified tables when dropped.
pub(crate) struct Corruption(());

impl Corruption {
    /// Replaces `RCON[index]` with `value` until the guard is dropped.
    pub(crate) fn rcon(index: usize, value: u8) -> Self {
        RCON.with(|c| c.set(Some((index, value))));
        Self(())
    }

    /// Replaces the forward S-box entry for `input` with `value`.
    pub(crate) fn sbox(input: u8, value: u8) -> Self {
        SBOX.with(|c| c.set(Some((input, value))));
        Self(())
    }
}

impl Drop for Corruption {
    fn drop(&mut self) {
        RCON.with(|c| c.set(None));
        SBOX.with(|c| c.set(None));
    }
}
