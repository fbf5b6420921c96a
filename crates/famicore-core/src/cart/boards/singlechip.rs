//! nocash's single-chip board: CIRAM doubles as CHR memory.
//!
//! The pattern tables are mapped straight onto the two CIRAM pages, which
//! is only possible because the cartridge, not the PPU, owns CIRAM.

use crate::{
    cart::bank::{Bank, BankKind, Mirroring, Perms, bank},
    cart::board::Board,
    memory::sizes::SIZE_1K,
};

fn ciram_chr(page: i32) -> Bank {
    bank(page, 0, SIZE_1K, 0, Perms::ReadWrite, BankKind::Ciram)
}

pub fn init(board: &mut Board) {
    // Each 4 KiB pattern half repeats one CIRAM page; which page depends on
    // the wired mirroring.
    let (low, high) = match board.mirroring() {
        Mirroring::SingleB => (0, 0),
        _ => (0, 1),
    };
    for slot in 0..8 {
        let page = if slot < 4 { low } else { high };
        let mut b = ciram_chr(page);
        b.address = (slot as u16) * 0x400;
        board.chr_banks0[slot] = b;
    }
    board.sync_chr(0);
}
