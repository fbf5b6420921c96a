//! Arkanoid paddle controllers.
//!
//! The dial is a 16-bit latch of the paddle position clamped to a window
//! of `center ± 0x50`; a strobe latches the inverted position and each
//! read shifts one bit out. The Famicom variants sit on the expansion
//! port and optionally expose a second paddle.

use crate::{
    input::action::{
        ActionCategory, ActionId, ARKANOID_BUTTON, ARKANOID_DIAL, ARKANOID_DIAL_MOUSE,
    },
    input::event::unpack_coords,
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

const OLD_CONTROLLER_CENTER: i32 = 0xA4;
const NEW_CONTROLLER_CENTER: i32 = 0x98;
/// Dial travel on either side of center.
const DIAL_RANGE: i32 = 0x50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    OldFc,
    OldNes,
    NewFc,
}

#[derive(Debug, Clone)]
pub struct Arkanoid {
    variant: Variant,
    index: usize,
    latch: [u16; 2],
    dial: [i32; 2],
    button: [bool; 2],
    strobe: bool,
    center: i32,
    paddle2_connected: bool,
    relx: i32,
}

impl Arkanoid {
    pub fn nes(index: usize) -> Self {
        Self::new(Variant::OldNes, index, OLD_CONTROLLER_CENTER)
    }

    pub fn famicom() -> Self {
        Self::new(Variant::OldFc, 1, OLD_CONTROLLER_CENTER)
    }

    pub fn arkanoid2() -> Self {
        Self::new(Variant::NewFc, 1, NEW_CONTROLLER_CENTER)
    }

    fn new(variant: Variant, index: usize, center: i32) -> Self {
        Self {
            variant,
            index,
            latch: [0; 2],
            dial: [center; 2],
            button: [false; 2],
            strobe: false,
            center,
            paddle2_connected: false,
            relx: 0,
        }
    }

    fn clamp_dial(&mut self, paddle: usize) {
        self.dial[paddle] = self
            .dial[paddle]
            .clamp(self.center - DIAL_RANGE, self.center + DIAL_RANGE);
    }

    /// Paddle index for an action. The expansion-port variants reuse the
    /// "port 1" actions for their second paddle so a single set of
    /// bindings covers every game.
    fn paddle_for(&self, action: ActionId) -> Option<usize> {
        let first = matches!(action.category(), ActionCategory::Arkanoid1);
        match self.variant {
            Variant::OldNes => {
                if (self.index == 0) == first {
                    Some(0)
                } else {
                    None
                }
            }
            _ => {
                let paddle = usize::from(first); // paddle 1 uses the port-1 actions
                if paddle == 1 && !self.paddle2_connected {
                    None
                } else {
                    Some(paddle)
                }
            }
        }
    }
}

impl Device for Arkanoid {
    fn id(&self) -> DeviceId {
        match (self.variant, self.index) {
            (Variant::OldNes, 0) => DeviceId::ArkanoidNes1,
            (Variant::OldNes, _) => DeviceId::ArkanoidNes2,
            (Variant::OldFc, _) => DeviceId::ArkanoidFc,
            (Variant::NewFc, _) => DeviceId::ArkanoidII,
        }
    }

    fn name(&self) -> &'static str {
        match self.variant {
            Variant::OldNes => "Arkanoid Controller (NES)",
            Variant::OldFc => "Arkanoid Controller (Famicom)",
            Variant::NewFc => "Arkanoid II Controller",
        }
    }

    fn connect(&mut self, cfg: &crate::config::Config) {
        self.paddle2_connected = cfg.arkanoid_paddle2_connected;
    }

    fn write(&mut self, value: u8, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) {
        if !self.strobe && value & 0x01 != 0 {
            self.strobe = true;
        } else if self.strobe && value & 0x01 == 0 {
            self.strobe = false;
            self.dial[0] += self.relx;
            self.clamp_dial(0);
            self.relx = 0;
            self.latch[0] = (self.dial[0] as u16) ^ 0xFF;
            if self.paddle2_connected {
                self.latch[1] = (self.dial[1] as u16) ^ 0xFF;
            }
        }
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        match self.variant {
            Variant::OldNes => {
                let mut data = ((self.latch[0] & 0x80) >> 3) as u8;
                data |= u8::from(self.button[0]) << 3;
                self.latch[0] = (self.latch[0] << 1) & 0xFF;
                data
            }
            Variant::OldFc | Variant::NewFc => {
                if port != 0 {
                    let mut data = ((self.latch[0] & 0x80) >> 6) as u8;
                    self.latch[0] = (self.latch[0] << 1) & 0xFF;
                    if self.paddle2_connected {
                        data |= ((self.latch[1] & 0x80) >> 3) as u8;
                        data |= u8::from(self.button[1]) << 3;
                        self.latch[1] = (self.latch[1] << 1) & 0xFF;
                    }
                    data
                } else {
                    u8::from(self.button[0]) << 1
                }
            }
        }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.strobe = false;
        self.relx = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        matches!(
            action.category(),
            ActionCategory::Arkanoid1 | ActionCategory::Arkanoid2
        ) && self.paddle_for(action).is_some()
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        let Some(paddle) = self.paddle_for(action) else {
            return;
        };
        match action.payload() {
            ARKANOID_DIAL_MOUSE => {
                let (xrel, _) = unpack_coords(value);
                self.relx += i32::from(xrel);
            }
            ARKANOID_DIAL => {
                // Map the full axis range onto the dial window.
                let axis = value as i32 as i16;
                self.dial[paddle] = self.center + i32::from(axis) / 409;
                self.clamp_dial(paddle);
            }
            ARKANOID_BUTTON => {
                self.button[paddle] = value != 0;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, io::hub::FourPlayerMode};

    fn ctx<'a>(common: &'a crate::io::hub::ControllerCommon, cfg: &'a Config) -> IoCtx<'a> {
        IoCtx {
            common,
            cfg,
            vs_system: false,
            recording_movie: false,
            playing_movie: false,
            ppu: None,
        }
    }

    #[test]
    fn dial_clamps_to_the_center_window() {
        let cfg = Config::default();
        let common = crate::io::hub::tests_common(&cfg);
        let c = ctx(&common, &cfg);
        let mut paddle = Arkanoid::nes(0);

        paddle.handle_action(
            crate::input::action::ActionId::mouse(ActionCategory::Arkanoid1, ARKANOID_DIAL_MOUSE),
            crate::input::event::pack_coords(1000, 0),
            &c,
        );
        paddle.write(1, FourPlayerMode::None, &c, 0);
        paddle.write(0, FourPlayerMode::None, &c, 0);
        // Latched value is the inverted clamped dial.
        assert_eq!(paddle.latch[0], ((0xA4 + 0x50) as u16) ^ 0xFF);
    }
}
