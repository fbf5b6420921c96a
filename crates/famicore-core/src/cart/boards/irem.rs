//! Irem boards: G-101, TAM-S1 and the 74*161/161/21/138 discrete board.

use crate::{
    cart::bank::{Mirroring, NmtBank, NmtKind, Perms},
    cart::board::Board,
    cart::registry::BoardType,
    reset::ResetKind,
};

/// G-101 register file (aliases collapsed to `$F007` by the bus layer).
pub fn g101(board: &mut Board, addr: u16, value: u8) {
    match addr & 0xF000 {
        0x8000 => board.update_prg_bank(1, i32::from(value)),
        0xA000 => board.update_prg_bank(2, i32::from(value)),
        0xB000 => board.update_chr0_bank(usize::from(addr & 0x07), i32::from(value)),
        0x9000 => {
            let prg_mode = value & 0x02;
            if prg_mode != board.prg_mode {
                board.prg_mode = prg_mode;
                g101_switch_prg_mode(board);
            }
            if board.kind() != BoardType::IremG101B {
                board.standard_mirroring(value.into());
            }
        }
        _ => {}
    }
}

fn g101_switch_prg_mode(board: &mut Board) {
    if board.prg_mode != 0 {
        board.prg_banks[1].address = 0xC000;
        board.prg_banks[3].address = 0x8000;
    } else {
        board.prg_banks[1].address = 0x8000;
        board.prg_banks[3].address = 0xC000;
    }
    board.sync_prg();
}

pub fn g101_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        board.prg_mode = 0;
        board.prg_banks[3].bank = -2;
        if board.kind() == BoardType::IremG101B {
            board.set_mirroring(Mirroring::SingleB);
        }
        g101_switch_prg_mode(board);
    }
}

/// TAM-S1: bank select in the low nibble, two-bit mirroring field on top.
pub fn tam_s1(board: &mut Board, value: u8) {
    board.update_prg_bank(2, i32::from(value & 0x0F));
    let mirroring = match value & 0xC0 {
        0x00 => Mirroring::SingleA,
        0x40 => Mirroring::Horizontal,
        0x80 => Mirroring::Vertical,
        _ => Mirroring::SingleB,
    };
    board.set_mirroring(mirroring);
}

/// 74*161/161/21/138: PRG/CHR latch; VRAM provides two of the four
/// nametables, so the fixed setup routes NT0/NT1 into VRAM pages 0/1.
pub fn irem_74x161(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value & 0x0F));
    board.update_chr0_bank(0, i32::from((value & 0xF0) >> 4));
}

pub fn irem_74x161_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        board.nmt_banks[0] = NmtBank {
            bank: 0,
            kind: NmtKind::Vram0,
            perms: Perms::ReadWrite,
        };
        board.nmt_banks[1] = NmtBank {
            bank: 1,
            kind: NmtKind::Vram0,
            perms: Perms::ReadWrite,
        };
        board.nmt_banks[2] = NmtBank {
            bank: 0,
            kind: NmtKind::Ciram,
            perms: Perms::ReadWrite,
        };
        board.nmt_banks[3] = NmtBank {
            bank: 1,
            kind: NmtKind::Ciram,
            perms: Perms::ReadWrite,
        };
        board.sync_nmt();
    }
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn g101() -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 16, 8, 0x00, 0x20, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..32u8 {
            bytes.extend(vec![bank; 8 * 1024]);
        }
        bytes.extend(vec![0x55; 64 * 1024]);
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn prg_mode_swaps_the_switchable_and_fixed_windows() {
        let mut b = g101();
        let mut host = NullHost::default();
        b.cpu_write(0x8000, 5, 0, &mut host);
        assert_eq!(b.peek_cpu(0x8000), Some(5));
        assert_eq!(b.peek_cpu(0xC000), Some(30)); // second-to-last fixed

        b.cpu_write(0x9000, 0x02, 0, &mut host);
        assert_eq!(b.peek_cpu(0xC000), Some(5));
        assert_eq!(b.peek_cpu(0x8000), Some(30));
    }
}
