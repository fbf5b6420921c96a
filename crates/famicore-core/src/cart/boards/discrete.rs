//! Discrete 74-logic boards from Jaleco and friends.

use crate::cart::{bank::Mirroring, board::Board, registry::BoardType};

/// Jaleco JF-16: PRG low bits, CHR high nibble, single-screen select.
pub fn jaleco_jf16(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value & 0x07));
    board.update_chr0_bank(0, i32::from((value & 0xF0) >> 4));
    board.standard_mirroring(value.into());
}

/// 74*139/74: CHR select with the two low bits swapped.
pub fn d74x139(board: &mut Board, value: u8) {
    let bank = ((value & 0x02) >> 1) | ((value & 0x01) << 1);
    board.update_chr0_bank(0, i32::from(bank));
}

/// 74*161/161/32: PRG in the high nibble, CHR in the low. The mirrored
/// variant steals the top PRG bit for single-screen select.
pub fn d74x161(board: &mut Board, value: u8) {
    if board.kind() == BoardType::Discrete74x161Mirror {
        board.update_prg_bank(1, i32::from((value & 0x70) >> 4));
        board.set_mirroring(if value & 0x80 != 0 {
            Mirroring::SingleB
        } else {
            Mirroring::SingleA
        });
    } else {
        board.update_prg_bank(1, i32::from((value & 0xF0) >> 4));
    }
    board.update_chr0_bank(0, i32::from(value & 0x0F));
}
