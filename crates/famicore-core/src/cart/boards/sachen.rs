//! Sachen boards: the 8259 ASIC family, the SA-72007/72008 latches and the
//! 74LS374N register file.
//!
//! All of them decode registers in the `$4100` region with heavy aliasing;
//! the bus layer collapses the aliases through the range masks before the
//! handlers below run.

use crate::{
    cart::bank::{Mirroring, NmtBank, NmtKind, Perms},
    cart::board::Board,
    cart::boards::BoardState,
    cart::registry::BoardType,
    memory::sizes::SIZE_2K,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Sachen8259State {
    register_select: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sachen374State {
    register_select: u8,
}

/// The 8259's "simple" mirroring values include a three-quarters
/// arrangement that has no fixed-enum equivalent.
fn sachen_set_mirroring(board: &mut Board, value: u8) {
    match value & 0x03 {
        0x00 => board.set_mirroring(Mirroring::Vertical),
        0x01 => board.set_mirroring(Mirroring::Horizontal),
        0x02 => {
            // NT0 alone on CIRAM page 0, the rest on page 1.
            for (slot, page) in [0u16, 1, 1, 1].into_iter().enumerate() {
                board.nmt_banks[slot] = NmtBank {
                    bank: page,
                    kind: NmtKind::Ciram,
                    perms: Perms::ReadWrite,
                };
            }
            board.sync_nmt();
        }
        _ => board.set_mirroring(Mirroring::SingleA),
    }
}

pub fn sachen_8259(board: &mut Board, addr: u16, value: u8) {
    let (mask, shift, or) = match board.kind() {
        BoardType::Sachen8259A => (0x0F, 1, 0x01),
        BoardType::Sachen8259C => (0x1F, 2, 0x03),
        _ => (0x07, 0, 0x00),
    };
    let is_d = board.kind() == BoardType::Sachen8259D;

    if addr & 0x0101 == 0x0100 {
        let BoardState::Sachen8259(state) = &mut board.state else {
            return;
        };
        state.register_select = value & 0x07;
        return;
    }

    let select = {
        let BoardState::Sachen8259(state) = &board.state else {
            return;
        };
        state.register_select
    };
    let value = i32::from(value & 0x07);

    match select {
        0..=3 => {
            let slot = usize::from(select);
            board.chr_banks0[slot].bank &= !mask;
            board.chr_banks0[slot].bank |= value << shift;
            board.chr_banks0[slot].bank |= i32::from(select) & or;
            if select == 0 && !is_d {
                // The 2 KiB "simple mode" shadow windows follow bank 0.
                let bank = board.chr_banks0[0].bank & !or;
                board.chr_banks0[4].bank = bank | (1 & or);
                board.chr_banks0[5].bank = bank | (2 & or);
                board.chr_banks0[6].bank = bank | (3 & or);
            }
            board.sync_chr(0);
        }
        4 => {
            // CHR high bits for every window at once.
            if is_d {
                let mut v = value << 2;
                board.chr_banks0[1].bank &= mask;
                board.chr_banks0[1].bank |= v & 0x10;
                v <<= 1;
                board.chr_banks0[2].bank &= mask | 0x10;
                board.chr_banks0[2].bank |= v & 0x10;
                v <<= 1;
                board.chr_banks0[3].bank &= mask | 0x18;
                board.chr_banks0[3].bank |= v & 0x10;
            } else {
                let v = value << (3 + shift);
                for slot in 0..4 {
                    board.chr_banks0[slot].bank &= mask;
                    board.chr_banks0[slot].bank |= v;
                }
                let bank = board.chr_banks0[0].bank & !or;
                board.chr_banks0[4].bank = bank | (1 & or);
                board.chr_banks0[5].bank = bank | (2 & or);
                board.chr_banks0[6].bank = bank | (3 & or);
            }
            board.sync_chr(0);
        }
        5 => {
            board.prg_banks[1].bank = value;
            board.sync_prg();
        }
        6 if is_d => {
            board.chr_banks0[3].bank &= 0x17;
            board.chr_banks0[3].bank |= (value & 0x01) << 3;
            board.sync_chr(0);
        }
        7 => {
            if !is_d {
                board.chr_mode = (value & 0x01) as u8;
                let simple = board.chr_mode != 0;
                for slot in 1..=3 {
                    board.chr_banks0[slot].size = if simple { 0 } else { SIZE_2K };
                }
                for slot in 4..=6 {
                    board.chr_banks0[slot].size = if simple { SIZE_2K } else { 0 };
                }
                board.sync_chr(0);
            }
            sachen_set_mirroring(board, ((value >> 1) & 0x03) as u8);
        }
        _ => {}
    }
}

pub fn sachen_72007(board: &mut Board, value: u8) {
    board.update_chr0_bank(0, i32::from(value >> 7));
}

pub fn sachen_72008(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value >> 2));
    board.update_chr0_bank(0, i32::from(value & 0x03));
}

/// 74LS374N register reads return the inverted register select.
pub fn sachen_374_read(board: &mut Board, _addr: u16, _value: u8) -> u8 {
    let BoardState::Sachen374(state) = &board.state else {
        return 0;
    };
    (!(state.register_select & 0x07) & 0x3F) ^ 0x01
}

pub fn sachen_374_write(board: &mut Board, addr: u16, value: u8) {
    if addr & 0xC101 == 0x4100 {
        let BoardState::Sachen374(state) = &mut board.state else {
            return;
        };
        state.register_select = value;
        return;
    }

    let select = {
        let BoardState::Sachen374(state) = &board.state else {
            return;
        };
        state.register_select
    };
    let value = value & 0x07;

    match select {
        2 => {
            board.chr_banks0[0].bank &= 0x07;
            board.chr_banks0[0].bank |= i32::from(value & 0x01) << 3;
            board.sync_chr(0);
            board.prg_banks[1].bank = i32::from(value & 0x01);
            board.sync_prg();
        }
        4 => {
            board.chr_banks0[0].bank &= 0x0B;
            board.chr_banks0[0].bank |= i32::from(value & 0x01) << 2;
            board.sync_chr(0);
        }
        5 => {
            board.prg_banks[1].bank = i32::from(value);
            board.sync_prg();
        }
        6 => {
            board.chr_banks0[0].bank &= 0x0C;
            board.chr_banks0[0].bank |= i32::from(value & 0x03);
            board.sync_chr(0);
        }
        7 => sachen_set_mirroring(board, (value >> 1) & 0x03),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn sachen_8259a() -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 4, 16, 0xD0, 0x80, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        bytes.extend(vec![0x24; 64 * 1024]);
        for bank in 0..64u8 {
            bytes.extend(vec![bank; 2 * 1024]);
        }
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn chr_windows_get_the_hardwired_low_bits() {
        let mut b = sachen_8259a();
        let mut host = NullHost::default();
        // Select register 1 (window at $0800), write bank 2: the A variant
        // shifts the value left once and ORs the window index's low bit.
        b.cpu_write(0x4100, 1, 0, &mut host);
        b.cpu_write(0x4101, 2, 0, &mut host);
        assert_eq!(b.ppu_read(0x0800, 0), (2 << 1) | 1);
    }
}
