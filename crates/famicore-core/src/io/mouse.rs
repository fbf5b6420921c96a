//! SNES Mouse.
//!
//! Strobing latches a 32-bit packet: signature, button bits, sensitivity,
//! then the two signed deltas scaled by the sensitivity setting. Reads
//! while the strobe is held cycle the sensitivity instead of shifting.

use crate::{
    input::action::{
        ActionCategory, ActionId, MOUSE_LEFT_BUTTON, MOUSE_RIGHT_BUTTON, MOUSE_UPDATE_LOCATION,
    },
    input::event::unpack_coords,
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

#[derive(Debug, Clone)]
pub struct SnesMouse {
    port: usize,
    latch: u32,
    sensitivity: u8,
    buttons: u8,
    strobe: bool,
    relx: i32,
    rely: i32,
}

impl SnesMouse {
    pub fn new(port: usize) -> Self {
        Self {
            port,
            latch: 0,
            sensitivity: 0,
            buttons: 0,
            strobe: false,
            relx: 0,
            rely: 0,
        }
    }

    fn category(&self) -> ActionCategory {
        match self.port {
            0 => ActionCategory::Mouse1,
            1 => ActionCategory::Mouse2,
            2 => ActionCategory::Mouse3,
            _ => ActionCategory::Mouse4,
        }
    }

    fn scaled_delta(&self, delta: i32) -> u32 {
        let negative = delta < 0;
        let mut magnitude = delta.unsigned_abs().min(127);
        magnitude >>= 2 - u32::from(self.sensitivity);
        magnitude | if negative { 0x80 } else { 0 }
    }
}

impl Device for SnesMouse {
    fn id(&self) -> DeviceId {
        match self.port {
            0 => DeviceId::SnesMouse1,
            1 => DeviceId::SnesMouse2,
            2 => DeviceId::SnesMouse3,
            _ => DeviceId::SnesMouse4,
        }
    }

    fn name(&self) -> &'static str {
        "SNES Mouse"
    }

    fn write(&mut self, value: u8, mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) {
        if !self.strobe && value & 0x01 != 0 {
            self.strobe = true;
        } else if self.strobe && value & 0x01 == 0 {
            self.strobe = false;

            let relx = self.scaled_delta(self.relx);
            let rely = self.scaled_delta(self.rely);

            self.latch = 0x0001_0000;
            self.latch |= u32::from(self.buttons) << 22;
            self.latch |= u32::from(self.sensitivity) << 20;
            self.latch |= rely << 8;
            self.latch |= relx;
            if mode == FourPlayerMode::NesFourScore {
                self.latch &= 0xFF;
            }

            self.relx = 0;
            self.rely = 0;
        }
    }

    fn read(&mut self, _port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        if self.strobe {
            self.sensitivity = (self.sensitivity + 1) % 3;
            return 0;
        }
        let data = ((self.latch >> 31) & 1) as u8;
        self.latch <<= 1;
        data
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.strobe = false;
        self.latch = 0;
        self.relx = 0;
        self.rely = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == self.category()
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        match action.payload() {
            MOUSE_LEFT_BUTTON => {
                if value != 0 {
                    self.buttons |= 0x1;
                } else {
                    self.buttons &= 0x2;
                }
            }
            MOUSE_RIGHT_BUTTON => {
                if value != 0 {
                    self.buttons |= 0x2;
                } else {
                    self.buttons &= 0x1;
                }
            }
            MOUSE_UPDATE_LOCATION => {
                let (xrel, yrel) = unpack_coords(value);
                self.relx += i32::from(xrel);
                self.rely += i32::from(yrel);
            }
            _ => {}
        }
    }
}
