//! Latch-register boards: one write anywhere in ROM space selects a bank.
//!
//! Bus-conflict behaviour is applied by the dispatch layer before these run,
//! so the `-NO-CONFLICT` registry variants share the same decoders.

use crate::cart::board::Board;

/// UxROM-style PRG select into slot 1.
pub fn prg_latch(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value));
}

/// CNROM-style CHR select into slot 0.
pub fn chr_latch(board: &mut Board, value: u8) {
    board.update_chr0_bank(0, i32::from(value));
}

/// The PlayChoice Pro Wrestling cart wires the bank lines oddly: banks 0-3
/// collapse to 0/1 and the upper banks sit two positions down.
pub fn prowrestling(board: &mut Board, value: u8) {
    let bank = if value & 0x07 < 4 {
        value & 0x01
    } else {
        value - 2
    };
    board.update_prg_bank(1, i32::from(bank));
}

/// NINA-001: registers overlaid on the top of WRAM; the write lands in RAM
/// as well as the latch.
pub fn nina001(board: &mut Board, addr: u16, value: u8) {
    match addr {
        0x7FFD => board.update_prg_bank(1, i32::from(value)),
        0x7FFE => board.update_chr0_bank(0, i32::from(value)),
        0x7FFF => board.update_chr0_bank(1, i32::from(value)),
        _ => {}
    }
    board.write_mapped(addr, value);
}

/// CPROM: the upper 4 KiB CHR window selects one of two VRAM chips.
pub fn cprom(board: &mut Board, value: u8) {
    use crate::cart::bank::BankKind;

    let old = &board.chr_banks0[1];
    let kind = if value & 0x2 != 0 {
        BankKind::Vram1
    } else {
        BankKind::Vram0
    };
    if old.bank != i32::from(value & 0x01) || old.kind != kind {
        board.chr_banks0[1].bank = i32::from(value & 0x01);
        board.chr_banks0[1].kind = kind;
        board.sync_chr(0);
    }
}

/// INL-NSF: eight 4 KiB PRG windows selected through `$5FF8-$5FFF`.
pub fn inlnsf(board: &mut Board, addr: u16, value: u8) {
    board.update_prg_bank(usize::from(addr & 7) + 1, i32::from(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cart::registry::BoardType, config::Config, emu::tests::NullHost, rom::ines,
    };

    /// Banks carry their index except at offset 0, which reads $FF so a
    /// register write from there survives the bus-conflict AND.
    fn board(mapper: u16, prg_banks: u8) -> Board {
        let mut bytes = vec![
            b'N',
            b'E',
            b'S',
            0x1A,
            prg_banks,
            1,
            ((mapper & 0x0F) << 4) as u8,
            (mapper & 0xF0) as u8,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
        ];
        for bank in 0..prg_banks {
            let mut data = vec![bank; 16 * 1024];
            data[0] = 0xFF;
            bytes.extend(data);
        }
        bytes.extend(vec![0x99; 8 * 1024]);
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn uxrom_banks_the_lower_window_only() {
        let mut b = board(2, 4);
        assert_eq!(b.kind(), BoardType::Uxrom);
        let mut host = NullHost::default();
        b.cpu_write(0x8000, 2, 0, &mut host);
        assert_eq!(b.peek_cpu(0x8001), Some(2));
        // Upper window stays fixed on the last bank.
        assert_eq!(b.peek_cpu(0xC001), Some(3));
    }

    #[test]
    fn uxrom_write_sees_bus_conflict() {
        let mut b = board(2, 4);
        let mut host = NullHost::default();
        // The ROM byte away from offset 0 is the bank number 0; the AND
        // forces bank 0 regardless of the written value.
        b.cpu_write(0x8001, 3, 0, &mut host);
        assert_eq!(b.peek_cpu(0x8001), Some(0));
    }
}
