//! Zapper light gun.
//!
//! The trigger and the photodiode present on bits 4 and 3 of the port
//! read. Light detection samples the host PPU at the last pointed-at
//! screen position; an offscreen trigger is a distinct action that fires
//! with the diode dark.

use crate::{
    input::action::{
        ActionCategory, ActionId, ZAPPER_TRIGGER, ZAPPER_TRIGGER_OFFSCREEN, ZAPPER_UPDATE_LOCATION,
    },
    input::event::unpack_coords,
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

#[derive(Debug, Clone)]
pub struct Zapper {
    index: usize,
    /// VS-Unisystem guns sit on the expansion port.
    vs: bool,
    x: i16,
    y: i16,
    trigger: bool,
    offscreen: bool,
}

impl Zapper {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            vs: false,
            x: -1,
            y: -1,
            trigger: false,
            offscreen: false,
        }
    }

    pub fn vs() -> Self {
        Self {
            vs: true,
            ..Self::new(1)
        }
    }

    fn category(&self) -> ActionCategory {
        if self.index == 0 {
            ActionCategory::Zapper1
        } else {
            ActionCategory::Zapper2
        }
    }
}

impl Device for Zapper {
    fn id(&self) -> DeviceId {
        if self.vs {
            DeviceId::VsZapper
        } else if self.index == 0 {
            DeviceId::Zapper1
        } else {
            DeviceId::Zapper2
        }
    }

    fn name(&self) -> &'static str {
        "Zapper"
    }

    fn read(&mut self, _port: usize, _mode: FourPlayerMode, ctx: &IoCtx<'_>, cycles: u32) -> u8 {
        let mut result = 0u8;
        let light = if self.offscreen || self.x < 0 {
            false
        } else {
            ctx.ppu
                .map(|ppu| ppu.light_sensed(i32::from(self.x), i32::from(self.y), cycles))
                .unwrap_or(false)
        };
        // The diode line is active-low: 0 means light detected.
        if !light {
            result |= 0x08;
        }
        if self.trigger {
            result |= 0x10;
        }
        result
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.trigger = false;
        self.offscreen = false;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == self.category()
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        match action.payload() {
            ZAPPER_TRIGGER => {
                self.trigger = value != 0;
                self.offscreen = false;
            }
            ZAPPER_TRIGGER_OFFSCREEN => {
                self.trigger = value != 0;
                self.offscreen = true;
            }
            ZAPPER_UPDATE_LOCATION => {
                let (x, y) = unpack_coords(value);
                self.x = x;
                self.y = y;
            }
            _ => {}
        }
    }
}
