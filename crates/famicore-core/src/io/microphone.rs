//! The Famicom's second-controller microphone.
//!
//! Games sample bit 2 of `$4016` for noise. Holding the action alternates
//! the bit so blowing into the mic registers the way the hardware's AC
//! coupling would deliver it.

use crate::{
    input::action::{ActionCategory, ActionId},
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

#[derive(Debug, Clone, Default)]
pub struct Microphone {
    pressed: bool,
    counter: u32,
}

impl Microphone {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for Microphone {
    fn id(&self) -> DeviceId {
        DeviceId::Microphone
    }

    fn name(&self) -> &'static str {
        "Famicom Microphone"
    }

    fn removable(&self) -> bool {
        false
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        if port != 0 || !self.pressed {
            return 0;
        }
        self.counter = self.counter.wrapping_add(1);
        if self.counter & 1 != 0 { 0x04 } else { 0 }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.pressed = false;
        self.counter = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == ActionCategory::Microphone
    }

    fn handle_action(&mut self, _action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        self.pressed = value != 0;
    }
}
