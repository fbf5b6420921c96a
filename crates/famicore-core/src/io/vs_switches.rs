//! VS-Unisystem coin, service and DIP switch panel.
//!
//! Coin presses hold for exactly three frames: some games treat a
//! longer-held coin line as tampering. DIP toggles route to the board's
//! switch byte through the hub; this device only presents the read view.

use crate::{
    input::action::{ActionCategory, ActionId, VS_COIN_1, VS_COIN_2, VS_DIP_BASE, VS_SERVICE},
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

const COIN_FRAMES: u8 = 3;

#[derive(Debug, Clone, Default)]
pub struct VsSwitches {
    coin: [u8; 2],
    service: bool,
    /// Mirror of the board's DIP byte, refreshed by the hub each frame.
    dip_switches: u8,
}

impl VsSwitches {
    pub fn new() -> Self {
        Self::default()
    }

}

impl Device for VsSwitches {
    fn id(&self) -> DeviceId {
        DeviceId::VsSwitches
    }

    fn name(&self) -> &'static str {
        "VS. Unisystem Switches"
    }

    fn removable(&self) -> bool {
        false
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        if port == 0 {
            let mut result = 0x80;
            if self.service {
                result |= 0x04;
            }
            result |= (self.dip_switches & 0x03) << 3;
            if self.coin[0] != 0 {
                result |= 1 << 5;
            }
            if self.coin[1] != 0 {
                result |= 1 << 6;
            }
            result
        } else {
            self.dip_switches & 0xFC
        }
    }

    fn end_frame(&mut self, _cycles: u32) {
        for coin in &mut self.coin {
            *coin = coin.saturating_sub(1);
        }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.coin = [0; 2];
        self.service = false;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == ActionCategory::Vs && action.payload() < VS_DIP_BASE
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        match action.payload() {
            VS_COIN_1 => {
                if value != 0 && self.coin[0] == 0 {
                    self.coin[0] = COIN_FRAMES;
                }
            }
            VS_COIN_2 => {
                if value != 0 && self.coin[1] == 0 {
                    self.coin[1] = COIN_FRAMES;
                }
            }
            VS_SERVICE => self.service = value != 0,
            _ => {}
        }
    }

    fn set_dip_switches(&mut self, value: u8) {
        self.dip_switches = value;
    }
}
