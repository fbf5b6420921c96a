//! The synthetic NSF player board.
//!
//! The NSF payload lives in a large PRG-RAM chip banked in 4 KiB windows
//! across `$6000-$FFFF` through registers at `$5FF6-$5FFF`; the 4 KiB
//! player ROM sits on top at `$E000` and reads the header copy the loader
//! placed at its `$180` offset.

use crate::{
    cart::board::Board,
    cart::boards::BoardState,
    reset::ResetKind,
    rom::{RomImage, nsf},
};

#[derive(Debug, Clone, Copy)]
pub struct NsfState {
    /// Initial 4 KiB bank table for `$8000-$FFFF` from the header.
    pub bankswitch_init: [u8; 8],
}

impl NsfState {
    pub fn from_rom(rom: &RomImage) -> Self {
        let header_start = nsf::payload_offset() - nsf::NSF_HEADER_LEN;
        let table = rom
            .buffer
            .get(header_start + 0x70..header_start + 0x78)
            .and_then(|s| <[u8; 8]>::try_from(s).ok())
            .unwrap_or([0; 8]);
        Self {
            bankswitch_init: table,
        }
    }
}

pub fn init(board: &mut Board) {
    // Copy the payload into the banked PRG RAM chip.
    let payload_start = nsf::payload_offset();
    let payload: Vec<u8> = board.rom.buffer[payload_start..].to_vec();
    let chip = &mut board.wram[1];
    chip.ensure_size(payload.len());
    chip.data_mut()[..payload.len()].copy_from_slice(&payload);
}

pub fn reset(board: &mut Board, kind: ResetKind) {
    if !kind.is_hard() {
        return;
    }
    let table = match &board.state {
        BoardState::Nsf(state) => state.bankswitch_init,
        _ => return,
    };
    // $6000/$7000 default to the two banks below the load area; the eight
    // $8000+ windows come from the header table.
    for (slot, &bank) in table.iter().enumerate() {
        board.prg_banks[2 + slot].bank = i32::from(bank);
    }
    board.prg_banks[0].bank = 0;
    board.prg_banks[1].bank = 1;
    board.sync_prg();
}

/// Banking registers: `$5FF6/$5FF7` control `$6000/$7000`, `$5FF8-$5FFF`
/// control `$8000-$F000`.
pub fn write(board: &mut Board, addr: u16, value: u8) {
    let slot = match addr {
        0x5FF6 => 0,
        0x5FF7 => 1,
        0x5FF8..=0x5FFF => 2 + usize::from(addr - 0x5FF8),
        _ => return,
    };
    board.update_prg_bank(slot, i32::from(value));
}
