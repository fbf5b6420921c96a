//! Namco 108 family and the VS-Unisystem protection chips that ride on it.
//!
//! The 108 is the MMC3's ancestor: the same bank-select/bank-data register
//! pair, without IRQs or mirroring control. Board variants differ in how
//! many CHR lines are wired (the split-CHR boards force A16 high for the
//! upper windows) and in the 3425's use of CHR A15 as a nametable select.

use crate::{
    cart::board::Board,
    cart::boards::BoardState,
    cart::registry::BoardType,
    reset::ResetKind,
};

/// TKO Boxing's answer stream, indexed by the protection counter.
static VS_TKO_SECURITY_DATA: [u8; 32] = [
    0xFF, 0xBF, 0xB7, 0x97, 0x97, 0x17, 0x57, 0x4F, 0x6F, 0x6B, 0xEB, 0xA9, 0xB1, 0x90, 0x94,
    0x14, 0x56, 0x4E, 0x6F, 0x6B, 0xEB, 0xA9, 0xB1, 0x90, 0xD4, 0x5C, 0x3E, 0x26, 0x87, 0x83,
    0x13, 0x00,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Namco108State {
    bank_select: u8,
    split_chr: bool,
    security_counter: u8,
}

pub fn reset(board: &mut Board, kind: ResetKind) {
    let split = matches!(board.kind(), BoardType::Namco88 | BoardType::Namco154);
    let BoardState::Namco108(state) = &mut board.state else {
        return;
    };
    if kind.is_hard() {
        state.bank_select = 0;
    }
    state.split_chr = split;
    state.security_counter = 0;
}

pub fn write(board: &mut Board, addr: u16, value: u8) {
    if board.kind() == BoardType::Namco154 {
        board.standard_mirroring(value.into());
    }

    let BoardState::Namco108(state) = &mut board.state else {
        return;
    };
    if addr & 0x01 == 0 {
        state.bank_select = value & 0x07;
        return;
    }

    let select = usize::from(state.bank_select);
    let split_chr = state.split_chr;
    if select < 6 {
        let mut bank = value;
        if split_chr {
            bank &= 0x3F;
            if select > 1 {
                bank |= 0x40;
            }
        }
        board.update_chr0_bank(select, i32::from(bank));
        if board.kind() == BoardType::Namco95 && select < 2 {
            // CHR A15 doubles as the nametable select line.
            let nmt = select << 1;
            let page = u16::from((value & 0x20) >> 5);
            board.nmt_banks[nmt].bank = page;
            board.nmt_banks[nmt + 1].bank = page;
            board.sync_nmt();
        }
    } else {
        board.update_prg_bank(select - 6 + 1, i32::from(value));
    }
}

/// VS protection reads at `$5E00-$5E01` (RBI Baseball, TKO Boxing) and the
/// scattered Super Xevious addresses.
pub fn vs_security_read(board: &mut Board, addr: u16, value: u8) -> u8 {
    let kind = board.kind();
    let BoardState::Namco108(state) = &mut board.state else {
        return value;
    };
    match kind {
        BoardType::VsRbiBaseball => match addr {
            0x5E00 => {
                state.security_counter = 0;
                0
            }
            0x5E01 => {
                let counter = state.security_counter;
                state.security_counter = state.security_counter.wrapping_add(1);
                if counter == 0x09 { 0x6F } else { 0xB4 }
            }
            _ => value,
        },
        BoardType::VsTkoBoxing => match addr {
            0x5E00 => {
                state.security_counter = 0;
                0
            }
            0x5E01 => {
                let data = VS_TKO_SECURITY_DATA[usize::from(state.security_counter)];
                state.security_counter = (state.security_counter + 1) & 0x1F;
                data
            }
            _ => value,
        },
        BoardType::VsSuperXevious => match addr {
            0x54FF => 0x05,
            0x5567 => {
                state.security_counter ^= 1;
                if state.security_counter != 0 { 0x37 } else { 0x3E }
            }
            0x5678 => {
                if state.security_counter != 0 { 0x00 } else { 0x01 }
            }
            0x578F => {
                if state.security_counter != 0 { 0xD1 } else { 0x89 }
            }
            _ => value,
        },
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn namco108() -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 8, 8, 0xE0, 0xC0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..16u8 {
            bytes.extend(vec![bank; 8 * 1024]);
        }
        for bank in 0..64u8 {
            bytes.extend(vec![bank; 1024]);
        }
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn bank_data_routes_by_selected_register() {
        let mut b = namco108();
        let mut host = NullHost::default();
        // CHR register 0: 2 KiB window, bank counted in 1 KiB units.
        b.cpu_write(0x8000, 0, 0, &mut host);
        b.cpu_write(0x8001, 6, 0, &mut host);
        assert_eq!(b.ppu_read(0x0000, 0), 6);
        assert_eq!(b.ppu_read(0x0400, 0), 7);
        // PRG register 6 swaps the $8000 window.
        b.cpu_write(0x8000, 6, 0, &mut host);
        b.cpu_write(0x8001, 3, 0, &mut host);
        assert_eq!(b.peek_cpu(0x8000), Some(3));
        assert_eq!(b.peek_cpu(0xE000), Some(15));
    }
}
