//! The peripheral-device interface.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::{
    config::Config,
    emu::PpuHost,
    input::action::ActionId,
    io::hub::{ControllerCommon, FourPlayerMode},
    reset::ResetKind,
};

/// Stable device identifiers, used for Auto selection and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceId {
    None,
    Controller1,
    Controller2,
    Controller3,
    Controller4,
    SnesController1,
    SnesController2,
    SnesController3,
    SnesController4,
    Zapper1,
    Zapper2,
    VsZapper,
    PowerPadA1,
    PowerPadB1,
    PowerPadA2,
    PowerPadB2,
    ArkanoidNes1,
    ArkanoidNes2,
    ArkanoidFc,
    ArkanoidII,
    SnesMouse1,
    SnesMouse2,
    SnesMouse3,
    SnesMouse4,
    FamilyKeyboard,
    SuborKeyboard,
    FamilyTrainerA,
    FamilyTrainerB,
    Microphone,
    KonamiHyperShot,
    BandaiHyperShot,
    VsSwitches,
}

/// Shared state devices may need while handling bus traffic or actions.
pub struct IoCtx<'a> {
    pub common: &'a ControllerCommon,
    pub cfg: &'a Config,
    pub vs_system: bool,
    pub recording_movie: bool,
    pub playing_movie: bool,
    pub ppu: Option<&'a dyn PpuHost>,
}

/// A peripheral in a controller or expansion port slot.
///
/// `read` contributions are ORed by the hub; `write` receives the masked
/// strobe bits. Devices that own per-controller button state read it from
/// [`ControllerCommon`] at strobe time.
pub trait Device: Debug + DynClone {
    fn id(&self) -> DeviceId;
    fn name(&self) -> &'static str;

    /// Non-removable devices cannot be cycled away from their slot.
    fn removable(&self) -> bool {
        true
    }

    fn connect(&mut self, _cfg: &Config) {}
    fn disconnect(&mut self) {}

    fn read(&mut self, _port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        0
    }

    fn write(&mut self, _value: u8, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) {}

    fn reset(&mut self, _kind: ResetKind) {}
    fn end_frame(&mut self, _cycles: u32) {}

    /// Whether this device consumes the given action.
    fn handles(&self, _action: ActionId) -> bool {
        false
    }

    fn handle_action(&mut self, _action: ActionId, _value: u32, _ctx: &IoCtx<'_>) {}

    /// Serial latch state for the PAD save-state chunks.
    fn latch_state(&self) -> Option<(u32, bool)> {
        None
    }

    fn set_latch_state(&mut self, _latch: u32, _strobe: bool) {}

    /// Recorded movie stream, if the device latches from one.
    fn movie_stream(&self) -> Option<Vec<u8>> {
        None
    }

    fn load_movie_stream(&mut self, _data: &[u8]) {}

    /// SNES-style pads use the 12-bit latch layout in movie streams.
    fn is_snes(&self) -> bool {
        false
    }

    /// Refresh the DIP-switch mirror (VS switch panel only).
    fn set_dip_switches(&mut self, _value: u8) {}

    /// Which shared controller state this device reads, for the pads.
    fn controller_index(&self) -> Option<usize> {
        None
    }
}

dyn_clone::clone_trait_object!(Device);
