//! MMC3 (TxROM family): 8 KiB PRG banking, 2+1 KiB CHR banking with A12
//! inversion, and the scanline IRQ counter clocked by debounced PPU A12
//! rising edges.
//!
//! TxSROM routes CHR A17 to the nametable select lines instead of the
//! mirroring register; TQROM mixes CHR ROM and CHR RAM by register bit 6;
//! HKROM (MMC6) adds a small battery-backed mapper RAM at `$7000` (its
//! per-half write-protection bits are not modelled). IRQ edge semantics
//! differ across chip revisions and are selected by the submapper.

use crate::{
    cart::a12::A12Edge,
    cart::bank::{BankKind, Perms, bank},
    cart::board::Board,
    cart::boards::BoardState,
    cart::registry::BoardType,
    emu::{CpuHost, IrqSource},
    memory::sizes::SIZE_1K,
    reset::ResetKind,
};

/// MMC3 IRQ behaviour differs across board revisions.
///
/// - RevA-like: the IRQ is only signalled when the counter reaches zero
///   after a decrement or reload from a non-zero or explicitly reloaded
///   state.
/// - RevB-like: the IRQ is signalled whenever the post-clock counter is
///   zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mmc3IrqRevision {
    RevA,
    #[default]
    RevB,
}

/// NES 2.0 submapper 4 marks MMC3A boards; everything else behaves like
/// the common RevB parts.
fn detect_irq_revision(submapper: u8) -> Mmc3IrqRevision {
    if submapper == 4 {
        Mmc3IrqRevision::RevA
    } else {
        Mmc3IrqRevision::RevB
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mmc3State {
    bank_select: u8,
    bank_regs: [u8; 8],
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_revision: Mmc3IrqRevision,
}

fn state(board: &mut Board) -> &mut Mmc3State {
    match &mut board.state {
        BoardState::Mmc3(state) => state,
        _ => unreachable!("MMC3 handler on a non-MMC3 board"),
    }
}

pub fn reset(board: &mut Board, kind: ResetKind) {
    let revision = detect_irq_revision(board.rom.submapper);
    if kind.is_hard() {
        *state(board) = Mmc3State {
            bank_regs: [0, 2, 4, 5, 6, 7, 0, 1],
            irq_revision: revision,
            ..Mmc3State::default()
        };
        if board.kind() == BoardType::Hkrom {
            // MMC6 internal RAM in the top of the WRAM window.
            board.prg_banks[0] =
                bank(0, 0, SIZE_1K, 0x7000, Perms::ReadWrite, BankKind::MapperRam);
        }
        apply_banks(board);
    }
    state(board).irq_revision = revision;
}

pub fn write(board: &mut Board, addr: u16, value: u8, host: &mut dyn CpuHost) {
    match addr {
        0x8000 => {
            state(board).bank_select = value;
            apply_banks(board);
        }
        0x8001 => {
            let reg = {
                let s = state(board);
                let reg = usize::from(s.bank_select & 0x07);
                s.bank_regs[reg] = value;
                reg
            };
            if board.kind() == BoardType::Txsrom && reg < 2 {
                apply_txsrom_mirroring(board);
            }
            apply_banks(board);
        }
        0xA000 => {
            if board.kind() != BoardType::Txsrom && !board.rom.four_screen {
                board.standard_mirroring(value.into());
            }
        }
        0xA001 => {
            // Bit 7 enables PRG RAM, bit 6 write-protects it.
            let perms = if value & 0x80 == 0 {
                Perms::None
            } else if value & 0x40 != 0 {
                Perms::Read
            } else {
                Perms::ReadWrite
            };
            if board.prg_banks[0].perms != perms {
                board.prg_banks[0].perms = perms;
                board.sync_prg();
            }
        }
        0xC000 => state(board).irq_latch = value,
        0xC001 => state(board).irq_reload = true,
        0xE000 => {
            state(board).irq_enabled = false;
            host.ack_irq(IrqSource::Scanline);
            host.cancel_irq(IrqSource::Scanline);
        }
        0xE001 => state(board).irq_enabled = true,
        _ => {}
    }
}

/// Re-materialise the PRG/CHR layout from the bank-select mode bits and the
/// eight bank registers.
fn apply_banks(board: &mut Board) {
    let (select, regs) = {
        let s = state(board);
        (s.bank_select, s.bank_regs)
    };

    // PRG: bit 6 swaps which of $8000/$C000 is switchable.
    let swap = select & 0x40 != 0;
    board.prg_banks[1].bank = i32::from(regs[6]);
    board.prg_banks[1].address = if swap { 0xC000 } else { 0x8000 };
    board.prg_banks[2].bank = i32::from(regs[7]);
    board.prg_banks[2].address = 0xA000;
    board.prg_banks[3].bank = -2;
    board.prg_banks[3].address = if swap { 0x8000 } else { 0xC000 };
    board.prg_banks[4].bank = -1;
    board.prg_banks[4].address = 0xE000;

    // CHR: bit 7 exchanges the 2 KiB and 1 KiB regions.
    let invert = select & 0x80 != 0;
    let two_k_base: u16 = if invert { 0x1000 } else { 0x0000 };
    let one_k_base: u16 = if invert { 0x0000 } else { 0x1000 };
    board.chr_banks0[0].address = two_k_base;
    board.chr_banks0[1].address = two_k_base + 0x0800;
    for slot in 0..4 {
        board.chr_banks0[2 + slot].address = one_k_base + (slot as u16) * 0x400;
    }
    let tqrom = board.kind() == BoardType::Tqrom;
    for (slot, &reg) in regs[..6].iter().enumerate() {
        board.chr_banks0[slot].bank = i32::from(reg & if tqrom { 0x3F } else { 0xFF });
        if tqrom {
            board.chr_banks0[slot].kind = if reg & 0x40 != 0 {
                BankKind::Vram0
            } else {
                BankKind::Rom
            };
        }
    }

    board.sync_prg();
    board.sync_chr(0);
}

/// TxSROM: CHR A17 of the 2 KiB registers drives the nametable select.
fn apply_txsrom_mirroring(board: &mut Board) {
    let regs = {
        let s = state(board);
        [s.bank_regs[0], s.bank_regs[1]]
    };
    let pages = [
        u16::from(regs[0] >> 7),
        u16::from(regs[0] >> 7),
        u16::from(regs[1] >> 7),
        u16::from(regs[1] >> 7),
    ];
    for (slot, page) in pages.into_iter().enumerate() {
        board.nmt_banks[slot].bank = page;
    }
    board.sync_nmt();
}

/// A12 rising edges clock the IRQ counter.
pub fn ppu_hook(board: &mut Board, addr: u16, cycles: u32, host: &mut dyn CpuHost) {
    if board.a12.update(addr, cycles) != A12Edge::Rise {
        return;
    }
    let fire = {
        let s = state(board);
        let old_counter = s.irq_counter;
        let explicit_reload = s.irq_reload;
        if s.irq_counter == 0 || s.irq_reload {
            s.irq_counter = s.irq_latch;
            s.irq_reload = false;
        } else {
            s.irq_counter -= 1;
        }
        let edge_allowed = match s.irq_revision {
            Mmc3IrqRevision::RevA => old_counter != 0 || explicit_reload,
            Mmc3IrqRevision::RevB => true,
        };
        s.irq_counter == 0 && s.irq_enabled && edge_allowed
    };
    if fire {
        host.schedule_irq(IrqSource::Scanline, cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, emu::tests::NullHost, rom::ines};

    fn txrom_with_submapper(submapper: u8) -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 8, 16, 0x40, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        if submapper != 0 {
            // NES 2.0 form so the submapper nibble is representable.
            bytes[7] = 0x08;
            bytes[8] = submapper << 4;
        }
        for bank in 0..16u8 {
            bytes.extend(vec![bank; 8 * 1024]);
        }
        for bank in 0..128u8 {
            bytes.extend(vec![bank; 1024]);
        }
        let mut board =
            Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board");
        let mut host = NullHost::default();
        board.reset(crate::reset::ResetKind::PowerOn, &mut host);
        board
    }

    fn txrom() -> Board {
        txrom_with_submapper(0)
    }

    fn reg_write(board: &mut Board, select: u8, value: u8) {
        let mut host = NullHost::default();
        board.cpu_write(0x8000, select, 0, &mut host);
        board.cpu_write(0x8001, value, 0, &mut host);
    }

    #[test]
    fn prg_mode_swaps_the_switchable_window() {
        let mut b = txrom();
        reg_write(&mut b, 6, 3);
        assert_eq!(b.peek_cpu(0x8000), Some(3));
        assert_eq!(b.peek_cpu(0xC000), Some(14));

        let mut host = NullHost::default();
        b.cpu_write(0x8000, 0x46, 0, &mut host);
        b.cpu_write(0x8001, 3, 0, &mut host);
        assert_eq!(b.peek_cpu(0xC000), Some(3));
        assert_eq!(b.peek_cpu(0x8000), Some(14));
        assert_eq!(b.peek_cpu(0xE000), Some(15));
    }

    #[test]
    fn chr_inversion_moves_the_2k_windows() {
        let mut b = txrom();
        reg_write(&mut b, 0, 8); // 2K window at $0000 -> banks 8,9
        reg_write(&mut b, 2, 20); // 1K window at $1000 -> bank 20
        assert_eq!(b.ppu_read(0x0000, 0), 8);
        assert_eq!(b.ppu_read(0x0400, 0), 9);
        assert_eq!(b.ppu_read(0x1000, 0), 20);

        let mut host = NullHost::default();
        b.cpu_write(0x8000, 0x80, 0, &mut host);
        assert_eq!(b.ppu_read(0x1000, 0), 8);
        assert_eq!(b.ppu_read(0x0000, 0), 20);
    }

    #[test]
    fn irq_counts_debounced_a12_rises() {
        let mut b = txrom();
        let mut host = NullHost::default();
        b.cpu_write(0xC000, 2, 0, &mut host); // latch
        b.cpu_write(0xC001, 0, 0, &mut host); // reload on next clock
        b.cpu_write(0xE001, 0, 0, &mut host); // enable

        let mut cycles = 0;
        let mut fired = Vec::new();
        for _ in 0..4 {
            // Hold A12 low well past the debounce window, then raise it.
            b.ppu_addr_hook(0x0000, cycles, &mut host);
            cycles += 100;
            b.ppu_addr_hook(0x1000, cycles, &mut host);
            fired.push(!host.scheduled.is_empty());
            host.scheduled.clear();
            cycles += 100;
        }
        // Reload on the first rise (counter = 2), then two decrements.
        assert_eq!(fired, vec![false, false, true, false]);
    }

    /// One qualifying rise: hold A12 low past the debounce window first.
    fn clock_once(b: &mut Board, cycles: &mut u32, host: &mut NullHost) -> bool {
        b.ppu_addr_hook(0x0000, *cycles, host);
        *cycles += 100;
        b.ppu_addr_hook(0x1000, *cycles, host);
        *cycles += 100;
        let fired = !host.scheduled.is_empty();
        host.scheduled.clear();
        fired
    }

    #[test]
    fn revb_reasserts_while_the_counter_sits_at_zero() {
        let mut b = txrom();
        let mut host = NullHost::default();
        // Latch stays zero; enable only.
        b.cpu_write(0xE001, 0, 0, &mut host);

        let mut cycles = 0;
        assert!(clock_once(&mut b, &mut cycles, &mut host));
        assert!(clock_once(&mut b, &mut cycles, &mut host));
    }

    #[test]
    fn reva_needs_a_reload_to_fire_at_zero() {
        let mut b = txrom_with_submapper(4);
        let mut host = NullHost::default();
        b.cpu_write(0xE001, 0, 0, &mut host);

        let mut cycles = 0;
        // Counter parked at zero with no reload pending: silent.
        assert!(!clock_once(&mut b, &mut cycles, &mut host));
        assert!(!clock_once(&mut b, &mut cycles, &mut host));

        // An explicit reload arms exactly one edge.
        b.cpu_write(0xC001, 0, 0, &mut host);
        assert!(clock_once(&mut b, &mut cycles, &mut host));
        assert!(!clock_once(&mut b, &mut cycles, &mut host));
    }
}
