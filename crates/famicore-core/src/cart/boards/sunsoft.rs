//! Sunsoft discrete boards: Sunsoft-1, Sunsoft-2 and Sunsoft-4.

use crate::{
    cart::bank::{Mirroring, NmtKind, Perms},
    cart::board::Board,
    cart::boards::BoardState,
    reset::ResetKind,
};

/// Sunsoft-1: both 4 KiB CHR windows from one WRAM-space register.
pub fn sunsoft1(board: &mut Board, value: u8) {
    let low = i32::from(value & 0x0F);
    let high = i32::from((value & 0xF0) >> 4);
    if board.chr_banks0[0].bank != low || board.chr_banks0[1].bank != high {
        board.chr_banks0[0].bank = low;
        board.chr_banks0[1].bank = high;
        board.sync_chr(0);
    }
}

/// Sunsoft-2: PRG in bits 4-6, CHR in bits 0-2 + 7, mirroring on bit 3.
pub fn sunsoft2(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from((value & 0x70) >> 4));
    board.update_chr0_bank(0, i32::from((value & 0x07) | ((value & 0x80) >> 4)));
    board.standard_mirroring(value.into());
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sunsoft4State {
    nametable_bank0: u8,
    nametable_bank1: u8,
    mirroring_reg: u8,
}

/// Sunsoft-4: four 2 KiB CHR windows plus CHR-ROM nametables.
pub fn sunsoft4(board: &mut Board, addr: u16, value: u8) {
    match addr & 0xF000 {
        0x8000 | 0x9000 | 0xA000 | 0xB000 => {
            let slot = usize::from((addr & 0x3000) >> 12);
            board.chr_banks0[slot].bank = i32::from(value);
            board.sync_chr(0);
        }
        0xC000 => {
            let BoardState::Sunsoft4(state) = &mut board.state else {
                return;
            };
            state.nametable_bank0 = value | 0x80;
            let snapshot = *state;
            apply_rom_nametables(board, snapshot);
        }
        0xD000 => {
            let BoardState::Sunsoft4(state) = &mut board.state else {
                return;
            };
            state.nametable_bank1 = value | 0x80;
            let snapshot = *state;
            apply_rom_nametables(board, snapshot);
        }
        0xE000 => {
            let BoardState::Sunsoft4(state) = &mut board.state else {
                return;
            };
            state.mirroring_reg = value;
            let snapshot = *state;
            match value & 0x11 {
                0x00 => board.set_mirroring(Mirroring::Vertical),
                0x01 => board.set_mirroring(Mirroring::Horizontal),
                _ => apply_rom_nametables(board, snapshot),
            }
        }
        0xF000 => {
            board.prg_banks[1].bank = i32::from(value);
            board.sync_prg();
        }
        _ => {}
    }
}

/// With bit 4 of the control register set, the nametables come from CHR
/// ROM; bit 0 picks the vertical or horizontal arrangement of the two
/// selected pages.
fn apply_rom_nametables(board: &mut Board, state: Sunsoft4State) {
    if state.mirroring_reg & 0x10 == 0 {
        return;
    }
    let (a, b) = (state.nametable_bank0, state.nametable_bank1);
    let pattern: [u8; 4] = if state.mirroring_reg & 0x01 != 0 {
        [a, a, b, b]
    } else {
        [a, b, a, b]
    };
    for (slot, bank) in pattern.into_iter().enumerate() {
        board.nmt_banks[slot].kind = NmtKind::Rom;
        board.nmt_banks[slot].bank = u16::from(bank);
        board.nmt_banks[slot].perms = Perms::Read;
    }
    board.sync_nmt();
}

pub fn sunsoft4_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard()
        && let BoardState::Sunsoft4(state) = &mut board.state
    {
        *state = Sunsoft4State::default();
    }
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn sunsoft4() -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 8, 16, 0x40, 0x40, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        bytes.extend(vec![0x11; 128 * 1024]);
        for bank in 0..128u8 {
            bytes.extend(vec![bank; 1024]);
        }
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn rom_nametables_replace_ciram() {
        let mut b = sunsoft4();
        let mut host = NullHost::default();
        b.cpu_write(0xC000, 0x02, 0, &mut host); // NT bank 0 -> page 0x82
        b.cpu_write(0xD000, 0x03, 0, &mut host); // NT bank 1 -> page 0x83
        b.cpu_write(0xE000, 0x10, 0, &mut host); // ROM nametables, vertical
        let page = b.ppu_read(0x2000, 0);
        assert_eq!(page, (0x82 % 128) as u8);
        // ROM nametables ignore writes.
        b.ppu_write(0x2000, 0x55, 0);
        assert_eq!(b.ppu_read(0x2000, 0), page);
    }
}
