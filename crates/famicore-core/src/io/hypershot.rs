//! Konami Hyper Shot: two 2-button paddles on the expansion port.

use crate::{
    input::action::{
        ActionCategory, ActionId, HYPER_SHOT_1_JUMP, HYPER_SHOT_1_RUN, HYPER_SHOT_2_JUMP,
        HYPER_SHOT_2_RUN,
    },
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

#[derive(Debug, Clone, Default)]
pub struct KonamiHyperShot {
    buttons: u8,
}

impl KonamiHyperShot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for KonamiHyperShot {
    fn id(&self) -> DeviceId {
        DeviceId::KonamiHyperShot
    }

    fn name(&self) -> &'static str {
        "Konami Hyper Shot"
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        if port == 0 {
            0
        } else {
            // Player 1 on bits 1-2, player 2 on bits 3-4.
            (self.buttons & 0x03) << 1 | (self.buttons & 0x0C) << 1
        }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.buttons = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == ActionCategory::HyperShot
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        let bit = match action.payload() {
            HYPER_SHOT_1_JUMP => 0x01,
            HYPER_SHOT_1_RUN => 0x02,
            HYPER_SHOT_2_JUMP => 0x04,
            HYPER_SHOT_2_RUN => 0x08,
            _ => return,
        };
        if value != 0 {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
    }
}
