//! MMC1 (SxROM family, NES-EVENT).
//!
//! A serial 5-bit shift register programmed one bit per write anywhere in
//! `$8000-$FFFF`; bit 7 resets the register and forces 16+16 PRG mode with
//! the last bank fixed. Writes landing on adjacent CPU cycles are ignored,
//! which is how read-modify-write instructions get only one write through.
//! The SNROM/SOROM/SUROM/SXROM wiring quirks all live in the CHR-0
//! register's upper bits.

use crate::{
    cart::bank::{BankKind, Perms},
    cart::board::Board,
    cart::boards::BoardState,
    cart::registry::BoardType,
    emu::{CpuHost, IrqSource},
    memory::sizes::{SIZE_4K, SIZE_8K, SIZE_16K, SIZE_32K, SIZE_512K},
    reset::ResetKind,
};

/// Don't schedule the NES-EVENT IRQ until it fits comfortably in a 32-bit
/// cycle timestamp; anything longer waits for a later frame.
const EVENT_IRQ_SCHEDULE_WINDOW: i32 = 35_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct Mmc1State {
    load_data: u8,
    load_count: u8,
    wram_disable: u8,
    wram_always_enabled: bool,
    wram_banks_used: u8,
    last_write_cycle: u32,
}

fn state(board: &mut Board) -> &mut Mmc1State {
    match &mut board.state {
        BoardState::Mmc1(state) => state,
        _ => unreachable!("MMC1 handler on a non-MMC1 board"),
    }
}

pub fn write(board: &mut Board, addr: u16, value: u8, cycles: u32, host: &mut dyn CpuHost) {
    let divider = board.cfg.cpu_clock_divider;
    {
        let s = state(board);
        // Only writes on strictly adjacent CPU cycles are suppressed.
        if cycles.wrapping_sub(s.last_write_cycle) == divider {
            return;
        }
        s.last_write_cycle = cycles;
    }

    if value & 0x80 != 0 {
        let s = state(board);
        s.load_data = 0;
        s.load_count = 0;
        set_prg_mode(board, 0x0C);
        board.sync_prg();
        return;
    }

    let data = {
        let s = state(board);
        s.load_data |= (value & 1) << s.load_count;
        s.load_count += 1;
        if s.load_count < 5 {
            return;
        }
        s.load_count = 0;
        s.last_write_cycle = 0;
        let data = s.load_data;
        s.load_data = 0;
        data
    };

    match addr & 0xE000 {
        0x8000 => write_control(board, data),
        0xA000 => write_chr(board, 0, data, cycles, host),
        0xC000 => write_chr(board, 1, data, cycles, host),
        0xE000 => write_prg(board, data),
        _ => {}
    }
}

fn set_prg_mode(board: &mut Board, mode: u8) {
    board.prg_mode = mode;
    match mode {
        0x00 | 0x04 => {
            board.prg_banks[1].size = SIZE_32K;
            board.prg_banks[1].shift = 1;
            board.prg_banks[1].address = 0x8000;
            board.prg_banks[2].size = 0;
        }
        0x08 => {
            board.prg_banks[1].size = SIZE_16K;
            board.prg_banks[1].shift = 0;
            board.prg_banks[1].address = 0xC000;
            board.prg_banks[2].size = SIZE_16K;
            board.prg_banks[2].bank = 0;
            board.prg_banks[2].address = 0x8000;
        }
        _ => {
            board.prg_banks[1].size = SIZE_16K;
            board.prg_banks[1].shift = 0;
            board.prg_banks[1].address = 0x8000;
            board.prg_banks[2].size = SIZE_16K;
            board.prg_banks[2].bank = 0xF;
            board.prg_banks[2].address = 0xC000;
        }
    }
}

fn write_control(board: &mut Board, value: u8) {
    set_prg_mode(board, value & 0x0C);

    board.chr_mode = value & 0x10;
    if board.chr_mode != 0 {
        board.chr_banks0[0].size = SIZE_4K;
        board.chr_banks0[0].shift = 0;
        board.chr_banks0[1].size = SIZE_4K;
        board.chr_banks0[1].address = 0x1000;
        board.chr_banks0[1].perms = Perms::ReadWrite;
        board.chr_banks0[1].kind = BankKind::Auto;
    } else {
        board.chr_banks0[0].size = SIZE_8K;
        board.chr_banks0[0].shift = 1;
        board.chr_banks0[1].size = 0;
        board.chr_banks0[1].address = 0x1000;
    }

    board.sync_prg();
    board.sync_chr(0);
    board.standard_mirroring(value.into());
}

fn write_prg(board: &mut Board, value: u8) {
    board.prg_banks[1].bank = i32::from(value);

    let always_enabled = state(board).wram_always_enabled;
    if !always_enabled {
        let disable = {
            let s = state(board);
            s.wram_disable = (s.wram_disable & 0x02) | ((value & 0x10) >> 4);
            s.wram_disable
        };
        board.prg_banks[0].perms = if disable != 0 {
            Perms::None
        } else {
            Perms::ReadWrite
        };
    }
    board.sync_prg();
}

fn write_chr(board: &mut Board, slot: usize, value: u8, cycles: u32, host: &mut dyn CpuHost) {
    board.chr_banks0[slot].bank = i32::from(value);

    if board.chr_mode == 0 && slot == 0 {
        let mut do_prg_sync = false;

        // WRAM banking from CHR A13/A14 (SOROM/SXROM).
        let wram_bank = i32::from((value >> 2) & 0x03);
        if wram_bank != board.prg_banks[0].bank {
            let kind = if !board.wram[1].is_empty() && wram_bank & 0x02 != 0 {
                BankKind::Wram1
            } else {
                BankKind::Wram0
            };
            board.prg_banks[0].bank = wram_bank;
            board.prg_banks[0].kind = kind;
            state(board).wram_banks_used |= 1 << wram_bank;
            do_prg_sync = true;
        }

        // CHR A16 selects the 256 KiB half on SUROM/SXROM.
        if board.prg_rom.len() == SIZE_512K {
            let or = i32::from(value & 0x10);
            if board.prg_or != or {
                board.prg_or = or;
                do_prg_sync = true;
            }
        }

        match board.kind() {
            BoardType::Snrom => {
                let disable = {
                    let s = state(board);
                    s.wram_disable = (s.wram_disable & 0x01) | ((value & 0x10) >> 3);
                    s.wram_disable
                };
                board.prg_banks[0].perms = if disable != 0 {
                    Perms::None
                } else {
                    Perms::ReadWrite
                };
                do_prg_sync = true;
            }
            BoardType::Event => {
                event_outer_bank(board, value >> 1, cycles, host);
                do_prg_sync = true;
            }
            _ => {}
        }

        if do_prg_sync {
            board.sync_prg();
        }
    }

    board.sync_chr(0);
}

/// NES-EVENT outer banking and the dip-switch-seeded countdown IRQ.
fn event_outer_bank(board: &mut Board, data: u8, cycles: u32, host: &mut dyn CpuHost) {
    board.prg_banks[3].bank = i32::from(data & 0x03);
    if data & 0x04 != 0 {
        board.prg_banks[3].size = 0;
        board.prg_or = 0x08;
        board.prg_and = 0x07;
    } else {
        board.prg_banks[3].size = SIZE_32K;
        board.prg_and = 0x03;
        board.prg_or = 0x00;
    }

    if data & 0x08 != 0 {
        host.ack_irq(IrqSource::M2Timer);
        host.cancel_irq(IrqSource::M2Timer);
        board.irq_counter = 0;
        board.irq_counter_timestamp = 0;
    } else if board.irq_counter == 0 {
        board.irq_counter = (0x10 | i32::from(board.dip_switches & 0x0F)) << 25;
        board.irq_counter_timestamp = cycles;
    }
}

pub fn reset(board: &mut Board, kind: ResetKind, host: &mut dyn CpuHost) {
    let always_enabled = board.kind() == BoardType::SxromMmc1a || board.is_vs_system();
    state(board).wram_always_enabled = always_enabled;

    if kind.is_hard() {
        state(board).last_write_cycle = 0;
        write_control(board, 0x0C);
        write_prg(board, 0);
        write_chr(board, 0, 0, 0, host);
        write_chr(board, 1, 0, 0, host);
        board.prg_or = 0;
        board.prg_and = 0x0F;
        board.chr_and = 0x1F;
        board.chr_or = 0;
    }

    board.irq_counter_timestamp = 0;
    board.irq_counter = 0;
    host.cancel_irq(IrqSource::M2Timer);
    state(board).wram_banks_used |= 1;

    if matches!(board.kind(), BoardType::Event | BoardType::SeromShrom) {
        // The first 32 KiB of ROM are hard-mapped until the lockout clears.
        board.prg_banks[3].size = SIZE_32K;
        board.prg_banks[3].bank = 0;
        board.sync_prg();
    }
}

pub fn end_frame(board: &mut Board, cycles: u32, host: &mut dyn CpuHost) {
    state(board).last_write_cycle = 0;
    if board.irq_counter != 0 {
        let divider = board.cfg.cpu_clock_divider;
        let elapsed =
            (cycles.saturating_sub(board.irq_counter_timestamp) / divider) as i32;
        board.irq_counter -= elapsed.min(board.irq_counter);
        board.irq_counter_timestamp = 0;

        // Scheduling waits until the deadline fits well inside a 32-bit
        // cycle timestamp; the window is a bit longer than one PAL frame.
        if board.irq_counter != 0 && board.irq_counter < EVENT_IRQ_SCHEDULE_WINDOW {
            host.schedule_irq(
                IrqSource::M2Timer,
                (board.irq_counter as u32).saturating_mul(divider),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, emu::tests::NullHost, rom::ines};

    fn sxrom(prg_16k_banks: u8) -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, prg_16k_banks, 0, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..prg_16k_banks {
            bytes.extend(vec![bank; 16 * 1024]);
        }
        let mut board =
            Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board");
        let mut host = NullHost::default();
        board.reset(ResetKind::PowerOn, &mut host);
        board
    }

    fn serial_write(board: &mut Board, addr: u16, value: u8) {
        let mut host = NullHost::default();
        let mut cycle = 0;
        for bit in 0..5 {
            board.cpu_write(addr, (value >> bit) & 1, cycle, &mut host);
            cycle += 24; // widely spaced, never adjacent
        }
    }

    #[test]
    fn power_on_fixes_the_last_bank_high() {
        let mut board = sxrom(8);
        assert_eq!(board.peek_cpu(0x8000), Some(0));
        assert_eq!(board.peek_cpu(0xC000), Some(7));
    }

    #[test]
    fn mode_0c_bank_select_matches_the_serial_protocol() {
        let mut board = sxrom(8);
        let mut host = NullHost::default();
        // Reset bit, then mode 0x0C through the serial port, then bank 1.
        board.cpu_write(0x8000, 0x80, 0, &mut host);
        serial_write(&mut board, 0x8000, 0x0C);
        serial_write(&mut board, 0xE000, 0x01);
        assert_eq!(board.peek_cpu(0x8000), Some(1));
        assert_eq!(board.peek_cpu(0xC000), Some(7));
    }

    #[test]
    fn bank_select_reaches_the_upper_window_in_mode_08() {
        let mut board = sxrom(8);
        serial_write(&mut board, 0x8000, 0x08);
        serial_write(&mut board, 0xE000, 0x05);
        assert_eq!(board.peek_cpu(0x8000), Some(0));
        assert_eq!(board.peek_cpu(0xC000), Some(5));
    }

    #[test]
    fn adjacent_cycle_writes_are_ignored() {
        let mut board = sxrom(8);
        let mut host = NullHost::default();
        let divider = Config::default().cpu_clock_divider;
        // Five spaced writes of bank 3, with an adjacent-cycle write of a
        // one bit injected after the first; the injected write must not
        // advance the shift register.
        let mut cycle = 1000;
        for bit in 0..5 {
            board.cpu_write(0xE000, (0x03 >> bit) & 1, cycle, &mut host);
            if bit == 0 {
                board.cpu_write(0xE000, 1, cycle + divider, &mut host);
            }
            cycle += 24;
        }
        assert_eq!(board.peek_cpu(0x8000), Some(3));
    }

    #[test]
    fn thirty_two_k_mode_pairs_banks() {
        let mut board = sxrom(8);
        serial_write(&mut board, 0x8000, 0x00);
        serial_write(&mut board, 0xE000, 0x04);
        assert_eq!(board.peek_cpu(0x8000), Some(4));
        assert_eq!(board.peek_cpu(0xC000), Some(5));
    }
}
