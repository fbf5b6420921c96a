//! Pressure mats: Power Pad (controller port) and Family Trainer
//! (expansion port).
//!
//! Twelve pressure keys route through a board-specific permutation into a
//! 12-bit stream; the B sides mirror the key columns, which the lookup
//! handles with an index XOR.

use crate::{
    input::action::{ActionCategory, ActionId},
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

static POWERPAD_LOOKUP: [u16; 12] = [
    0x0004, 0x0001, 0x0008, 0x0002, 0x0010, 0x0100, 0x4000, 0x0080, 0x0040, 0x0400, 0x1000,
    0x0020,
];

static FAMILY_TRAINER_LOOKUP: [u16; 12] = [
    0x0008, 0x0004, 0x0002, 0x0001, 0x0080, 0x0040, 0x0020, 0x0010, 0x0800, 0x0400, 0x0200,
    0x0100,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatKind {
    PowerPad,
    FamilyTrainer,
}

#[derive(Debug, Clone)]
pub struct Mat {
    kind: MatKind,
    /// Which controller port's actions feed it (0 or 1).
    index: usize,
    side_a: bool,
    latch: u32,
    buttons: u16,
    strobe: bool,
}

impl Mat {
    pub fn power_pad(index: usize, side_a: bool) -> Self {
        Self {
            kind: MatKind::PowerPad,
            index,
            side_a,
            latch: 0,
            buttons: 0,
            strobe: false,
        }
    }

    pub fn family_trainer(side_a: bool) -> Self {
        Self {
            kind: MatKind::FamilyTrainer,
            index: 1,
            side_a,
            latch: 0,
            buttons: 0,
            strobe: false,
        }
    }

    fn category(&self) -> ActionCategory {
        if self.index == 0 {
            ActionCategory::PowerPad1
        } else {
            ActionCategory::PowerPad2
        }
    }
}

impl Device for Mat {
    fn id(&self) -> DeviceId {
        match (self.kind, self.index, self.side_a) {
            (MatKind::PowerPad, 0, true) => DeviceId::PowerPadA1,
            (MatKind::PowerPad, 0, false) => DeviceId::PowerPadB1,
            (MatKind::PowerPad, _, true) => DeviceId::PowerPadA2,
            (MatKind::PowerPad, _, false) => DeviceId::PowerPadB2,
            (MatKind::FamilyTrainer, _, true) => DeviceId::FamilyTrainerA,
            (MatKind::FamilyTrainer, _, false) => DeviceId::FamilyTrainerB,
        }
    }

    fn name(&self) -> &'static str {
        match (self.kind, self.side_a) {
            (MatKind::PowerPad, true) => "Power Pad Side A",
            (MatKind::PowerPad, false) => "Power Pad Side B",
            (MatKind::FamilyTrainer, true) => "Family Trainer Side A",
            (MatKind::FamilyTrainer, false) => "Family Trainer Side B",
        }
    }

    fn write(&mut self, value: u8, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) {
        match self.kind {
            MatKind::PowerPad => {
                if !self.strobe && value & 0x01 != 0 {
                    self.strobe = true;
                } else if self.strobe && value & 0x01 == 0 {
                    self.strobe = false;
                    self.latch = 0xFFFF_AA00 | u32::from(self.buttons);
                }
            }
            MatKind::FamilyTrainer => {
                // The row select is active-low on the three output bits.
                let value = value ^ 0x07;
                let shift = if value & 0x1 != 0 {
                    8
                } else if value & 0x2 != 0 {
                    4
                } else {
                    0
                };
                self.latch = u32::from(self.buttons >> shift) & 0x0F;
            }
        }
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        match self.kind {
            MatKind::PowerPad => {
                let data = ((self.latch & 0x03) << 3) as u8;
                self.latch >>= 2;
                self.latch |= 3 << 30;
                data
            }
            MatKind::FamilyTrainer => {
                if port == 0 {
                    0
                } else {
                    (((self.latch ^ 0x0F) << 1) & 0x1E) as u8
                }
            }
        }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.strobe = false;
        self.latch = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == self.category()
            && (1..=12).contains(&action.payload())
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        let mut key = usize::from(action.payload()) - 1;
        if self.side_a {
            key ^= 0x03;
        }
        let lookup = match self.kind {
            MatKind::PowerPad => &POWERPAD_LOOKUP,
            MatKind::FamilyTrainer => &FAMILY_TRAINER_LOOKUP,
        };
        let bit = lookup[key % 12];
        if value != 0 {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::input::action::ActionId;

    #[test]
    fn powerpad_serialises_keys_through_the_permutation() {
        let cfg = Config::default();
        let common = crate::io::hub::tests_common(&cfg);
        let ctx = IoCtx {
            common: &common,
            cfg: &cfg,
            vs_system: false,
            recording_movie: false,
            playing_movie: false,
            ppu: None,
        };
        let mut mat = Mat::power_pad(0, false);
        // Key 2 on side B maps straight through the lookup to bit 0.
        mat.handle_action(
            ActionId::digital(ActionCategory::PowerPad1, 2),
            1,
            &ctx,
        );
        mat.write(1, FourPlayerMode::None, &ctx, 0);
        mat.write(0, FourPlayerMode::None, &ctx, 0);
        // First read exposes the low two latch bits on D3/D4.
        assert_eq!(mat.read(0, FourPlayerMode::None, &ctx, 0) & 0x18, 0x08);
    }
}
