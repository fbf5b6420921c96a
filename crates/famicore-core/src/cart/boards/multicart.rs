//! Multicart boards.
//!
//! Nearly all of these decode the *address* rather than the data bus; the
//! written value only matters where noted. Menu behaviour at reset varies
//! per cart and is handled in the reset hooks.

use crate::{
    cart::bank::{BankKind, Mirroring},
    cart::board::Board,
    cart::boards::BoardState,
    emu::CpuHost,
    memory::sizes::{SIZE_16K, SIZE_32K},
    reset::ResetKind,
};

/// Shared one-byte register file for the multicarts that need state across
/// writes (22-in-1 menu mode, N625092 bank latch, Maxi 15 outer lock).
#[derive(Debug, Clone, Copy, Default)]
pub struct MulticartState {
    pub cart_mode: u8,
    pub bank_latch: u8,
    pub outer_bank_set: bool,
}

fn state(board: &mut Board) -> &mut MulticartState {
    match &mut board.state {
        BoardState::Multicart(state) => state,
        _ => unreachable!("multicart state missing"),
    }
}

// Caltron 6-in-1 ------------------------------------------------------------

pub fn caltron(board: &mut Board, addr: u16, value: u8) {
    if addr >= 0x8000 {
        // CHR select only unlocks for the games in the upper banks.
        if board.prg_banks[1].bank >= 4 && i32::from(value & 0x03) != board.chr_banks0[0].bank {
            board.chr_banks0[0].bank = i32::from(value & 0x03);
            board.sync_chr(0);
        }
        return;
    }

    let prg_bank = i32::from(addr & 0x07);
    let chr_or = i32::from((addr & 0x18) >> 1);
    if prg_bank != board.prg_banks[1].bank {
        board.prg_banks[1].bank = prg_bank;
        board.sync_prg();
    }
    if chr_or != board.chr_or {
        board.chr_or = chr_or;
        board.sync_chr(0);
    }
    board.standard_mirroring(value.into());
}

pub fn caltron_reset(board: &mut Board) {
    board.chr_or = 0;
    board.prg_banks[1].bank = 0;
    board.chr_banks0[0].bank = 0;
    board.sync_prg();
    board.sync_chr(0);
}

// RCM GS2015 ----------------------------------------------------------------

pub fn rcm_gs2015(board: &mut Board, addr: u16) {
    board.update_prg_bank(1, i32::from(addr));
    board.update_chr0_bank(0, i32::from(addr >> 1));
}

// TXC/BMC 20-in-1 (and the RCM Tetris Family clones) ------------------------

pub fn bmc20in1(board: &mut Board, addr: u16, value: u8) {
    let bank = i32::from(((addr & 0x0F) << 1) | ((addr & 0x20) >> 5));
    board.prg_banks[1].bank = bank;
    board.prg_banks[2].bank = bank;
    if addr & 0x10 != 0 {
        board.prg_banks[1].size = SIZE_16K;
        board.prg_banks[2].size = SIZE_16K;
        board.prg_banks[1].shift = 0;
    } else {
        board.prg_banks[1].size = SIZE_32K;
        board.prg_banks[2].size = 0;
        board.prg_banks[1].shift = 1;
    }
    board.standard_mirroring(value.into());
    board.sync_prg();
}

// BMC Super 22 Games / 20-in-1 ----------------------------------------------

pub fn bmc22in1(board: &mut Board, value: u8) {
    board.prg_mode = value & 0x20;
    board.prg_banks[1].bank = i32::from(value & 0x07);
    let outer = i32::from(value & 0x1F) + 0x08;
    board.prg_banks[3].bank = outer;
    board.prg_banks[4].bank = outer;
    board.prg_banks[5].bank = outer;
    if state(board).cart_mode != 0 {
        board.set_mirroring(if value & 0x40 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        });
        if board.prg_mode == 0 {
            board.prg_banks[3].size = SIZE_32K;
            board.prg_banks[4].size = 0;
            board.prg_banks[5].size = 0;
        } else {
            board.prg_banks[3].size = 0;
            board.prg_banks[4].size = SIZE_16K;
            board.prg_banks[5].size = SIZE_16K;
        }
    }
    board.sync_prg();
}

/// Soft reset toggles between the Contra game and the multicart menu.
pub fn bmc22in1_reset(board: &mut Board, kind: ResetKind) {
    let mode = {
        let s = state(board);
        if kind.is_hard() {
            s.cart_mode = 0;
        } else {
            s.cart_mode ^= 1;
        }
        s.cart_mode
    };

    let mirroring;
    if mode == 0 {
        board.prg_banks[1].size = SIZE_16K;
        board.prg_banks[2].size = SIZE_16K;
        board.prg_banks[3].size = 0;
        board.prg_banks[4].size = 0;
        board.prg_banks[5].size = 0;
        mirroring = Mirroring::Vertical;
    } else {
        mirroring = if board.prg_banks[1].bank & 0x40 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        board.prg_banks[1].size = 0;
        board.prg_banks[2].size = 0;
        if board.prg_mode == 0 {
            board.prg_banks[3].size = SIZE_32K;
            board.prg_banks[4].size = 0;
            board.prg_banks[5].size = 0;
        } else {
            board.prg_banks[3].size = 0;
            board.prg_banks[4].size = SIZE_16K;
            board.prg_banks[5].size = SIZE_16K;
        }
    }
    board.sync_prg();
    board.set_mirroring(mirroring);
}

// BMC 35-in-1 ---------------------------------------------------------------

pub fn bmc35in1(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value >> 2));
    board.update_prg_bank(2, i32::from(value >> 2));
    board.update_chr0_bank(0, i32::from(value & 0x03));
}

// BMC 76-in-1 / Super 42-in-1 -----------------------------------------------

pub fn bmc76in1(board: &mut Board, addr: u16, value: u8) {
    match addr & 0x8001 {
        0x8000 => {
            let mut low = i32::from(((value & 0x80) >> 2) | (value & 0x1F));
            let mut high = low;
            if value & 0x20 == 0 {
                low &= !0x01;
                high |= 0x01;
            }
            board.prg_banks[1].bank = low;
            board.prg_banks[2].bank = high;
            board.standard_mirroring(value.into());
        }
        0x8001 => {
            board.prg_or = i32::from(value & 0x01) << 6;
        }
        _ => {}
    }
    board.sync_prg();
}

// BMC 150-in-1 --------------------------------------------------------------

pub fn bmc150in1(board: &mut Board, addr: u16) {
    let bank = i32::from((addr >> 1) & 0x07);
    board.prg_banks[1].bank = bank;
    board.prg_banks[2].bank = bank;
    if addr & 0x0C == 0x0C {
        board.prg_banks[1].bank &= !0x01;
        board.prg_banks[2].bank |= 0x01;
    }
    board.sync_prg();
    board.update_chr0_bank(0, bank);
    board.standard_mirroring(addr);
}

pub fn bmc150in1_reset(board: &mut Board, kind: ResetKind, _host: &mut dyn CpuHost) {
    if kind.is_hard() {
        bmc150in1(board, 0x8000);
    }
}

// BMC 58/64/72/110-in-1 and the iNES 225 variant -----------------------------

pub fn bmc110in1(board: &mut Board, addr: u16) {
    let chr_bank = i32::from(addr & 0x3F) | i32::from((addr & 0x4000) >> 8);
    board.chr_banks0[0].bank = chr_bank;
    board.standard_mirroring((addr >> 13) & 1);

    let prg_bank = i32::from((addr & 0x0FC0) >> 6) | i32::from((addr & 0x4000) >> 8);
    let mode = i32::from((!addr >> 12) & 0x01);
    board.prg_banks[1].bank = prg_bank & !mode;
    board.prg_banks[2].bank = prg_bank | mode;
    board.sync_prg();
    board.sync_chr(0);
}

pub fn bmc110in1_reset(board: &mut Board, kind: ResetKind, host: &mut dyn CpuHost) {
    if kind.is_hard() {
        let _ = host;
        bmc110in1(board, 0x8000);
    }
}

pub fn ines225(board: &mut Board, addr: u16) {
    let chr_bank = i32::from(addr & 0x3F) | i32::from((addr & 0x4000) >> 8);
    board.chr_banks0[0].bank = chr_bank;
    board.set_mirroring(if addr & 0x2000 != 0 {
        Mirroring::Horizontal
    } else {
        Mirroring::Vertical
    });

    let prg_bank = i32::from((addr & 0x0FC0) >> 6) | i32::from((addr & 0x4000) >> 8);
    if addr & 0x1000 == 0 {
        board.prg_banks[1].bank = prg_bank & 0x1E;
        board.prg_banks[2].bank = prg_bank | 0x01;
    } else {
        board.prg_banks[1].bank = prg_bank;
        board.prg_banks[2].bank = prg_bank;
    }
    board.sync_prg();
    board.sync_chr(0);
}

// BMC N625092 ---------------------------------------------------------------

pub fn n625092(board: &mut Board, addr: u16) {
    match addr & 0xC000 {
        0x8000 => {
            board.standard_mirroring(addr & 0x01);
            board.prg_mode = ((addr & 0x102) >> 1) as u8;
            board.prg_or = i32::from((addr & 0xE0) >> 2);
        }
        0xC000 => {
            state(board).bank_latch = (addr & 0x07) as u8;
        }
        _ => {}
    }

    let latch = i32::from(state(board).bank_latch);
    let (b0, b1) = if board.prg_mode & 0x01 != 0 {
        if board.prg_mode & 0x80 != 0 {
            (latch, 0x07)
        } else {
            (latch & 0x06, (latch & 0x06) | 0x01)
        }
    } else {
        (latch, latch)
    };
    board.update_prg_bank(1, b0);
    board.update_prg_bank(2, b1);
}

pub fn n625092_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        board.prg_mode = 0;
        board.prg_or = 0;
        board.prg_and = 0x07;
        state(board).bank_latch = 0;
    }
}

// Contra 100-in-1 -----------------------------------------------------------

pub fn contra100in1(board: &mut Board, addr: u16, value: u8) {
    let bank = i32::from(value & 0x3F) << 1;
    let half = i32::from(value >> 7);
    match addr & 0xFFF {
        0 => {
            board.prg_banks[1].bank = bank ^ half;
            board.prg_banks[2].bank = (bank + 1) ^ half;
            board.prg_banks[3].bank = (bank + 2) ^ half;
            board.prg_banks[4].bank = (bank + 3) ^ half;
        }
        1 => {
            let bank = bank | half;
            board.prg_banks[1].bank = bank;
            board.prg_banks[2].bank = bank + 1;
            board.prg_banks[3].bank = 0xFE;
            board.prg_banks[4].bank = 0xFF;
        }
        2 => {
            let bank = bank | half;
            for slot in 1..=4 {
                board.prg_banks[slot].bank = bank;
            }
        }
        3 => {
            let bank = bank | half;
            board.prg_banks[1].bank = bank;
            board.prg_banks[2].bank = bank + 1;
            board.prg_banks[3].bank = bank;
            board.prg_banks[4].bank = bank + 1;
        }
        _ => {}
    }
    board.sync_prg();
    board.standard_mirroring(value.into());
}

// BMC Super 700-in-1 --------------------------------------------------------

pub fn super700in1(board: &mut Board, addr: u16, value: u8) {
    let prg = i32::from(addr & 0x40) | i32::from((addr >> 8) & 0x3F);
    let chr = i32::from((addr & 0x1F) << 2) | i32::from(value & 0x03);
    board.prg_banks[1].bank = prg;
    board.prg_banks[2].bank = prg;
    if addr & 0x20 == 0 {
        board.prg_banks[1].bank &= !0x01;
        board.prg_banks[2].bank |= 0x01;
    }
    board.sync_prg();
    board.update_chr0_bank(0, chr);
    board.standard_mirroring(addr);
}

pub fn super700in1_reset(board: &mut Board, kind: ResetKind, _host: &mut dyn CpuHost) {
    if kind.is_hard() {
        super700in1(board, 0x8000, 0);
    }
}

// iNES 201 ------------------------------------------------------------------

pub fn ines201(board: &mut Board, addr: u16) {
    board.update_prg_bank(1, i32::from(addr & 0xFF));
    board.update_chr0_bank(0, i32::from(addr & 0xFF));
}

// Action 52 -----------------------------------------------------------------

pub fn action52(board: &mut Board, addr: u16, value: u8) {
    let chr_bank = i32::from(value & 0x03) | (i32::from(addr & 0x0F) << 2);
    board.chr_banks0[0].bank = chr_bank;
    board.set_mirroring(if addr & 0x2000 != 0 {
        Mirroring::Horizontal
    } else {
        Mirroring::Vertical
    });

    let prg_bank = i32::from((addr & 0x07C0) >> 6);
    if addr & 0x0020 == 0 {
        board.prg_banks[1].bank = prg_bank & 0x1E;
        board.prg_banks[2].bank = prg_bank | 0x01;
    } else {
        board.prg_banks[1].bank = prg_bank;
        board.prg_banks[2].bank = prg_bank;
    }

    board.prg_or = i32::from((addr & 0x1800) >> 6);
    // Chip 2 of the Action 52 PRG is absent and reads open bus; swapping
    // banks keeps standard iNES dumps working.
    let kind = if board.prg_or == 0x40 {
        BankKind::None
    } else {
        BankKind::Rom
    };
    board.prg_banks[1].kind = kind;
    board.prg_banks[2].kind = kind;
    if board.prg_or & 0x40 != 0 {
        board.prg_or ^= 0x20;
    }
    board.sync_prg();
    board.sync_chr(0);
}

pub fn action52_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        board.prg_and = 0x1F;
        board.prg_or = 0x00;
        board.prg_banks[1].bank = 0;
        board.prg_banks[2].bank = 1;
        board.chr_banks0[0].bank = 0;
    }
}

// AVE Maxi 15 ---------------------------------------------------------------

/// Maxi 15 is driven by *reads* of the vector area: `$FFE8-$FFF7` selects
/// inner banks freely, and the first `$FF80-$FF9F` read after reset locks
/// the outer bank.
pub fn maxi15_read(board: &mut Board, addr: u16, value: u8) -> u8 {
    if addr >= 0xFFE8 {
        board.update_prg_bank(1, i32::from(value));
        board.update_chr0_bank(0, i32::from(value >> 4));
    } else if addr >= 0xFF80 && !state(board).outer_bank_set {
        state(board).outer_bank_set = true;
        let mut bank = i32::from(value & 0x0F);
        bank |= i32::from(value & 0x20) >> 1;
        board.prg_and = 0x00;
        board.chr_and = 0x03;
        board.set_mirroring(if value & 0x80 != 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        });
        if value & 0x40 != 0 {
            bank &= 0x1E;
            board.prg_and |= 0x01;
            board.chr_and |= 0x04;
        }
        board.prg_or = bank;
        board.chr_or = bank << 2;
        board.sync_prg();
        board.sync_chr(0);
    }
    value
}

pub fn maxi15_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        state(board).outer_bank_set = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        cart::board::Board, config::Config, emu::tests::NullHost, reset::ResetKind, rom::ines,
    };

    fn bmc22in1() -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 40, 0, 0x60, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..40u8 {
            bytes.extend(vec![bank; 16 * 1024]);
        }
        let mut board =
            Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board");
        let mut host = NullHost::default();
        board.reset(ResetKind::PowerOn, &mut host);
        board
    }

    #[test]
    fn soft_reset_toggles_between_game_and_menu() {
        let mut b = bmc22in1();
        let mut host = NullHost::default();
        // Hard reset: Contra mode, bank 0 + fixed bank 7.
        assert_eq!(b.peek_cpu(0x8000), Some(0));
        assert_eq!(b.peek_cpu(0xC000), Some(7));

        // Any in-game write keeps the multicart-half banks pointed at the
        // menu block starting 128 KiB in.
        b.cpu_write(0x8000, 0, 0, &mut host);
        b.reset(ResetKind::Soft, &mut host);
        assert_eq!(b.peek_cpu(0x8000), Some(8));

        b.reset(ResetKind::Soft, &mut host);
        assert_eq!(b.peek_cpu(0x8000), Some(0));
        assert_eq!(b.peek_cpu(0xC000), Some(7));
    }
}
