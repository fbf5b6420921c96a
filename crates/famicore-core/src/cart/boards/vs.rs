//! VS-Unisystem mainboard behaviour.
//!
//! The plain VS board has no mapper of its own, but the mainboard latches
//! the CHR bank (and VS. Gumshoe's spare PRG bank) from bit 2 of `$4016`
//! writes. The I/O hub forwards those writes here.

use crate::{
    cart::board::Board,
    cart::bank::Perms,
    memory::sizes::{SIZE_8K, SIZE_32K},
    reset::ResetKind,
};

pub fn reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        // Map up to four 8 KiB banks with the last at $E000, leaving any
        // unpopulated windows open-bus.
        let mut banks = (board.prg_rom.len() / SIZE_8K).min(4) as i32;
        for slot in (1..=4usize).rev() {
            if banks > 0 {
                board.prg_banks[slot].bank = banks - 1;
                board.prg_banks[slot].perms = Perms::Read;
                banks -= 1;
            } else {
                board.prg_banks[slot].perms = Perms::None;
            }
        }
        board.sync_prg();
    }
}

/// `$4016` bit 2 drives the mainboard CHR (and Gumshoe PRG) select.
pub fn bankswitch(board: &mut Board, value: u8) {
    board.chr_banks0[0].bank = i32::from(value >> 2);
    board.sync_chr(0);
    if board.prg_rom.len() > SIZE_32K {
        board.prg_banks[1].bank = i32::from(value & 0x04);
        board.sync_prg();
    }
}
