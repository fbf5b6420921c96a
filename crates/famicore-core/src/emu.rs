//! The arena-style owner and the collaborator traits.
//!
//! The core never stores a pointer back to its owner. The host drives a
//! frame loop against [`Emu`] and passes the CPU/PPU collaborators down on
//! each call; handlers that need to reach "up" (schedule an IRQ, peek a
//! zero-page pointer, poke VRAM) do so through [`CpuHost`] and [`PpuHost`].
//!
//! One frame looks like:
//!
//! 1. `process_input(false)` drains host events into devices;
//! 2. the CPU runs, calling `cpu_read`/`cpu_write`/`ppu_read`/`ppu_write`
//!    and `ppu_addr_hook` as the buses cycle;
//! 3. `end_frame` folds timestamps and advances per-frame device state;
//! 4. `process_input(true)` runs deferred actions at the safe point.

use crate::{
    cart::board::Board,
    cart::boards::vs,
    cart::fds,
    config::Config,
    error::Error,
    input::{InputDispatcher, action::ActionId},
    io::hub::{IoHub, PORT_EXP},
    memory::cpu as cpu_mem,
    reset::ResetKind,
    rom::RomImage,
};

/// Interrupt lines the cartridge can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqSource {
    /// Counted down per CPU (M2) clock, scheduled as an absolute cycle.
    M2Timer,
    /// Clocked by PPU A12 rising edges.
    Scanline,
    /// Raised when the FDS drive delivers the next disk byte.
    Disk,
}

/// CPU collaborator surface.
///
/// `cycles` values are master-clock timestamps that fold back to zero at
/// end-of-frame; `schedule_irq` takes the absolute timestamp at which the
/// line should assert.
pub trait CpuHost {
    fn peek(&mut self, addr: u16) -> u8;
    fn poke(&mut self, addr: u16, value: u8);

    fn pc(&self) -> u16;
    fn set_pc(&mut self, pc: u16);
    fn accumulator(&self) -> u8;
    fn set_accumulator(&mut self, value: u8);
    fn set_x_register(&mut self, value: u8);
    fn stack_pointer(&self) -> u8;

    /// True while the current bus read is an instruction opcode fetch.
    /// BIOS interception and auto-disk-select must not trigger on data
    /// reads that happen to land on a patched address.
    fn is_opcode_fetch(&self) -> bool;

    fn schedule_irq(&mut self, source: IrqSource, timestamp: u32);
    fn cancel_irq(&mut self, source: IrqSource);
    fn ack_irq(&mut self, source: IrqSource);
}

/// PPU collaborator surface.
pub trait PpuHost {
    fn poke_vram(&mut self, addr: u16, value: u8);
    /// Whether the screen is bright at `(x, y)` as of `cycles`; drives the
    /// light gun's photodiode bit.
    fn light_sensed(&self, x: i32, y: i32, cycles: u32) -> bool;
}

/// A full-state capture of the emulated core, cheap to clone for rewind
/// buffers at the host layer.
#[derive(Clone)]
pub struct Snapshot {
    pub board: Option<Board>,
    pub io: IoHub,
}

/// Top-level owner of the cartridge, I/O hub and input dispatcher.
pub struct Emu {
    pub config: Config,
    pub board: Option<Board>,
    pub io: IoHub,
    pub input: InputDispatcher,
    /// Emulator-level actions (resets, save-state requests) waiting for
    /// the host.
    host_actions: Vec<(ActionId, u32)>,
}

impl Emu {
    pub fn new(config: Config) -> Self {
        Self {
            io: IoHub::new(&config),
            input: InputDispatcher::new(),
            config,
            board: None,
            host_actions: Vec::new(),
        }
    }

    /// Install a loaded ROM image as the active cartridge.
    ///
    /// On failure the previous state is preserved and the emulator remains
    /// usable with no ROM loaded. Call [`reset`](Self::reset) with
    /// [`ResetKind::PowerOn`] before running.
    pub fn load(&mut self, rom: RomImage) -> Result<(), Error> {
        let board = Board::new(rom, &self.config)?;
        self.io.apply_rom_defaults(board.db_entry());
        self.io.set_vs_system(board.is_vs_system());
        self.board = Some(board);
        Ok(())
    }

    /// Remove the cartridge, handing back its board (the caller collects
    /// pending non-volatile saves from it).
    pub fn eject(&mut self) -> Option<Board> {
        self.io.set_vs_system(false);
        self.board.take()
    }

    pub fn reset(&mut self, kind: ResetKind, host: &mut dyn CpuHost) {
        if let Some(board) = self.board.as_mut() {
            board.reset(kind, host);
        }
        self.io.reset(kind);
    }

    /// CPU bus read entering the cartridge/I/O core.
    pub fn cpu_read(
        &mut self,
        addr: u16,
        open_bus: u8,
        cycles: u32,
        host: &mut dyn CpuHost,
        ppu: Option<&dyn PpuHost>,
    ) -> u8 {
        if addr == cpu_mem::IO_PORT1 || addr == cpu_mem::IO_PORT2 {
            self.pump_input();
            return self.io.read(addr, open_bus, cycles, ppu);
        }
        match self.board.as_mut() {
            Some(board) => board.cpu_read(addr, open_bus, cycles, host),
            None => open_bus,
        }
    }

    /// CPU bus write entering the cartridge/I/O core.
    pub fn cpu_write(&mut self, addr: u16, value: u8, cycles: u32, host: &mut dyn CpuHost) {
        if addr == cpu_mem::IO_PORT1 {
            self.pump_input();
            self.io.write(value, cycles);
            if let Some(value) = self.io.take_vs_bankswitch()
                && let Some(board) = self.board.as_mut()
            {
                vs::bankswitch(board, value);
            }
            return;
        }
        if let Some(board) = self.board.as_mut() {
            board.cpu_write(addr, value, cycles, host);
        }
    }

    pub fn ppu_read(&mut self, addr: u16, cycles: u32) -> u8 {
        match self.board.as_mut() {
            Some(board) => board.ppu_read(addr, cycles),
            None => 0,
        }
    }

    pub fn ppu_write(&mut self, addr: u16, value: u8, cycles: u32) {
        if let Some(board) = self.board.as_mut() {
            board.ppu_write(addr, value, cycles);
        }
    }

    /// PPU address-bus hook (MMC2/MMC4 latches, MMC3 A12 edges).
    pub fn ppu_addr_hook(&mut self, addr: u16, cycles: u32, host: &mut dyn CpuHost) {
        if let Some(board) = self.board.as_mut() {
            board.ppu_addr_hook(addr, cycles, host);
        }
    }

    /// Drain pending host input into devices; called once per $4016/$4017
    /// access and at the safe point after each frame.
    pub fn process_input(&mut self, force: bool) {
        let io = &mut self.io;
        self.input.process(force, &mut |action: ActionId, value: u32| {
            io.dispatch_action(action, value);
        });
        self.route_pending();
        self.io.mark_queue_processed();
    }

    fn route_pending(&mut self) {
        if let Some(board) = self.board.as_mut() {
            for switch in self.io.take_pending_dip_toggles() {
                board.toggle_dip_switch(switch);
            }
            for action in self.io.take_pending_disk_actions() {
                fds::handle_action(board, action);
            }
        } else {
            self.io.take_pending_dip_toggles();
            self.io.take_pending_disk_actions();
        }
        self.host_actions.extend(self.io.take_host_actions());
    }

    /// The host window lost focus: release everything so no emulated
    /// button stays stuck.
    pub fn lost_focus(&mut self) {
        let io = &mut self.io;
        self.input.release_all(&mut |action: ActionId, value: u32| {
            io.dispatch_action(action, value);
        });
        self.route_pending();
    }

    /// Emulator-level actions for the host to execute (resets, save-state
    /// slots, pause).
    pub fn take_host_actions(&mut self) -> Vec<(ActionId, u32)> {
        std::mem::take(&mut self.host_actions)
    }

    fn pump_input(&mut self) {
        if !self.io.queue_processed() {
            self.process_input(false);
        }
    }

    /// Full-state snapshot of the core (cartridge and I/O). The bindings
    /// and queued host events stay live; save states do not capture them.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            io: self.io.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.io = snapshot.io;
    }

    /// End-of-frame housekeeping: fold timestamps, advance turbo and coin
    /// timers, then drain deferred actions at the safe point.
    pub fn end_frame(&mut self, cycles: u32, host: &mut dyn CpuHost) {
        if let Some(board) = self.board.as_mut() {
            board.end_frame(cycles, host);
            let dips = board.dip_switches();
            if let Some(device) = self.io.selected_device_mut(PORT_EXP) {
                device.set_dip_switches(dips);
            }
        }
        self.io.end_frame(cycles);
        self.process_input(true);
        self.io.clear_queue_processed();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// CPU collaborator mock shared by board and drive tests. Peek/poke go
    /// to a flat 64 KiB backing store, and interrupt traffic is recorded
    /// for assertions.
    pub struct NullHost {
        pub memory: Vec<u8>,
        pub pc: u16,
        pub a: u8,
        pub x: u8,
        pub sp: u8,
        pub opcode_fetch: bool,
        pub scheduled: Vec<(IrqSource, u32)>,
        pub cancelled: Vec<IrqSource>,
        pub acked: Vec<IrqSource>,
    }

    impl Default for NullHost {
        fn default() -> Self {
            Self {
                memory: vec![0; 0x10000],
                pc: 0,
                a: 0,
                x: 0,
                sp: 0xFD,
                opcode_fetch: false,
                scheduled: Vec::new(),
                cancelled: Vec::new(),
                acked: Vec::new(),
            }
        }
    }

    impl CpuHost for NullHost {
        fn peek(&mut self, addr: u16) -> u8 {
            self.memory[usize::from(addr)]
        }
        fn poke(&mut self, addr: u16, value: u8) {
            self.memory[usize::from(addr)] = value;
        }
        fn pc(&self) -> u16 {
            self.pc
        }
        fn set_pc(&mut self, pc: u16) {
            self.pc = pc;
        }
        fn accumulator(&self) -> u8 {
            self.a
        }
        fn set_accumulator(&mut self, value: u8) {
            self.a = value;
        }
        fn set_x_register(&mut self, value: u8) {
            self.x = value;
        }
        fn stack_pointer(&self) -> u8 {
            self.sp
        }
        fn is_opcode_fetch(&self) -> bool {
            self.opcode_fetch
        }
        fn schedule_irq(&mut self, source: IrqSource, timestamp: u32) {
            self.scheduled.push((source, timestamp));
        }
        fn cancel_irq(&mut self, source: IrqSource) {
            self.cancelled.push(source);
        }
        fn ack_irq(&mut self, source: IrqSource) {
            self.acked.push(source);
        }
    }
}
