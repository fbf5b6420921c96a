//! Shared M2 (CPU clock) countdown timer.
//!
//! Boards flagged with an M2 timer in the registry get one of these; the
//! FDS wires it to `$4020-$4022`. The counter decrements once per CPU
//! cycle. When it reaches zero the IRQ flag latches and, depending on the
//! flags, the counter either reloads and keeps running or disarms.

use bitflags::bitflags;

use crate::emu::{CpuHost, IrqSource};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct M2TimerFlags: u8 {
        /// Stop after the first expiry instead of reloading.
        const ONE_SHOT = 0x01;
        /// Copy the reload register into the counter on expiry.
        const RELOAD = 0x02;
        /// Disarm IRQ generation after an expiry.
        const AUTO_IRQ_DISABLE = 0x04;
    }
}

#[derive(Debug, Clone)]
pub struct M2Timer {
    counter: u32,
    reload: u32,
    flags: M2TimerFlags,
    enabled: bool,
    irq_pending: bool,
    /// Timestamp of the last counter sync, in master clocks.
    last_sync: u32,
    divider: u32,
}

impl M2Timer {
    pub fn new(divider: u32) -> Self {
        Self {
            counter: 0,
            reload: 0,
            flags: M2TimerFlags::ONE_SHOT | M2TimerFlags::AUTO_IRQ_DISABLE,
            enabled: false,
            irq_pending: false,
            last_sync: 0,
            divider,
        }
    }

    /// Bring the counter up to date with the bus clock.
    pub fn run(&mut self, cycles: u32) {
        if !self.enabled {
            self.last_sync = cycles;
            return;
        }
        let mut elapsed = cycles.saturating_sub(self.last_sync) / self.divider;
        self.last_sync = cycles;
        while elapsed > 0 {
            if self.counter == 0 {
                self.expire();
                if !self.enabled {
                    break;
                }
            }
            let step = elapsed.min(self.counter.max(1));
            self.counter = self.counter.saturating_sub(step);
            elapsed -= step;
            if self.counter == 0 && elapsed > 0 {
                self.expire();
                if !self.enabled {
                    break;
                }
            }
        }
        if self.enabled && self.counter == 0 {
            self.expire();
        }
    }

    fn expire(&mut self) {
        self.irq_pending = true;
        if self.flags.contains(M2TimerFlags::RELOAD) {
            self.counter = self.reload;
        }
        if self.flags.contains(M2TimerFlags::ONE_SHOT) {
            self.enabled = false;
        }
        if self.flags.contains(M2TimerFlags::AUTO_IRQ_DISABLE) {
            self.enabled = false;
        }
    }

    pub fn set_flags(&mut self, flags: M2TimerFlags, cycles: u32) {
        self.run(cycles);
        self.flags = flags;
    }

    pub fn set_reload_lo(&mut self, value: u8, cycles: u32) {
        self.run(cycles);
        self.reload = (self.reload & 0xFF00) | u32::from(value);
    }

    pub fn set_reload_hi(&mut self, value: u8, cycles: u32) {
        self.run(cycles);
        self.reload = (self.reload & 0x00FF) | (u32::from(value) << 8);
    }

    pub fn set_reload(&mut self, value: u32, cycles: u32) {
        self.run(cycles);
        self.reload = value;
    }

    /// Copy the reload register into the counter immediately.
    pub fn force_reload(&mut self, cycles: u32) {
        self.run(cycles);
        self.counter = self.reload;
    }

    pub fn set_enabled(&mut self, enabled: bool, cycles: u32, host: &mut dyn CpuHost) {
        self.run(cycles);
        self.enabled = enabled;
        self.last_sync = cycles;
        self.schedule_irq(cycles, host);
    }

    /// Arm (or disarm) the CPU interrupt line to fire when the counter hits
    /// zero.
    pub fn schedule_irq(&mut self, cycles: u32, host: &mut dyn CpuHost) {
        if self.enabled {
            let target = cycles + self.counter.saturating_mul(self.divider);
            host.schedule_irq(IrqSource::M2Timer, target);
        } else {
            host.cancel_irq(IrqSource::M2Timer);
        }
    }

    /// Clear the latched IRQ flag.
    pub fn ack(&mut self, cycles: u32, host: &mut dyn CpuHost) {
        self.run(cycles);
        self.irq_pending = false;
        host.ack_irq(IrqSource::M2Timer);
    }

    pub fn irq_status(&mut self, cycles: u32) -> bool {
        self.run(cycles);
        self.irq_pending
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fold the sync timestamp at end-of-frame so timestamps stay 32-bit.
    pub fn end_frame(&mut self, frame_cycles: u32) {
        self.last_sync = self.last_sync.saturating_sub(frame_cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emu::tests::NullHost;

    #[test]
    fn one_shot_timer_latches_irq_once() {
        let mut host = NullHost::default();
        let mut timer = M2Timer::new(12);
        timer.set_reload(10, 0);
        timer.force_reload(0);
        timer.set_flags(M2TimerFlags::ONE_SHOT | M2TimerFlags::AUTO_IRQ_DISABLE, 0);
        timer.set_enabled(true, 0, &mut host);

        assert!(!timer.irq_status(5 * 12));
        assert!(timer.irq_status(11 * 12));
        assert!(!timer.is_enabled());
    }

    #[test]
    fn reload_timer_keeps_running_after_expiry() {
        let mut host = NullHost::default();
        let mut timer = M2Timer::new(12);
        timer.set_reload(4, 0);
        timer.force_reload(0);
        timer.set_flags(M2TimerFlags::RELOAD, 0);
        timer.set_enabled(true, 0, &mut host);

        assert!(timer.irq_status(5 * 12));
        timer.ack(5 * 12, &mut host);
        assert!(timer.is_enabled());
        assert!(timer.irq_status(10 * 12));
    }
}
