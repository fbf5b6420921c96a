//! The I/O hub: everything behind `$4016/$4017`.
//!
//! Each of the four controller ports and the expansion port holds a set of
//! registered devices with one selected at a time. CPU writes broadcast
//! bit 0 to the controller ports and bits 0-2 to the expansion port; CPU
//! reads OR together the addressed port's device, the expansion devices
//! through the hub read mask, and (in four-player mode) the third/fourth
//! controller shifted into the next bit. The Four Score signature bytes
//! live here too, as does the shared controller/turbo state.

use tracing::info;

use crate::{
    cart::fds::DiskAction,
    config::Config,
    db::DbEntry,
    input::action::{self, ActionCategory, ActionId},
    io::{
        arkanoid::Arkanoid,
        controller::Controller,
        device::{Device, DeviceId, IoCtx},
        keyboard::Keyboard,
        mat::Mat,
        microphone::Microphone,
        mouse::SnesMouse,
        vs_switches::VsSwitches,
        zapper::Zapper,
    },
    reset::ResetKind,
};

pub const PORT_1: usize = 0;
pub const PORT_2: usize = 1;
pub const PORT_3: usize = 2;
pub const PORT_4: usize = 3;
pub const PORT_EXP: usize = 4;
pub const PORT_COUNT: usize = 5;

const NES_READ_MASK: u8 = 0x1F;
const VS_READ_MASK: u8 = 0xFF;

/// Turbo period table indexed by the speed setting.
pub const TURBO_PERIODS: [u8; 8] = [1, 10, 8, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourPlayerMode {
    None,
    NesFourScore,
    Famicom,
    Auto,
}

/// Button state, turbo machinery and VS remapping shared by the four
/// controllers.
#[derive(Debug, Clone)]
pub struct ControllerCommon {
    pub buttons: [u16; 4],
    pub turbo_buttons: [u16; 4],
    pub turbo_toggles: [u16; 4],
    turbo_mask: [u16; 4],
    current: [u16; 4],
    turbo_counter: u8,
    turbo_period: u8,
    turbo_pressed_frames: u8,
    pub vs_controller_mode: VsControllerMode,
    /// Which controller index each port's pad reads, -1 for none.
    pub port_mapping: [i8; PORT_COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsControllerMode {
    Standard,
    Swapped,
    BungelingBay,
    VsSuperSkyKid,
    VsPinballJ,
}

impl ControllerCommon {
    fn new(cfg: &Config) -> Self {
        let period = TURBO_PERIODS[usize::from(cfg.turbo_speed & 7)];
        Self {
            buttons: [0; 4],
            turbo_buttons: [0; 4],
            turbo_toggles: [0; 4],
            turbo_mask: [0; 4],
            current: [0; 4],
            turbo_counter: 0,
            turbo_period: period,
            turbo_pressed_frames: (period / 2).max(1),
            vs_controller_mode: VsControllerMode::Standard,
            port_mapping: [-1; PORT_COUNT],
        }
    }

    pub fn current_state(&self, controller: usize) -> u16 {
        self.current[controller]
    }

    fn update_button_state(&mut self, controller: usize) {
        let toggled =
            self.buttons[controller] & self.turbo_toggles[controller] & self.turbo_mask[controller];
        let mut state = self.buttons[controller] & !self.turbo_toggles[controller];
        state |= toggled;
        state |= self.turbo_buttons[controller] & self.turbo_mask[controller];
        self.current[controller] = state;
    }

    fn set_button(&mut self, controller: usize, payload: u16, pressed: bool) {
        let button = payload & 0x0FFF;
        if payload & action::BUTTON_TURBO != 0 {
            if pressed {
                self.turbo_buttons[controller] |= button;
            } else {
                self.turbo_buttons[controller] &= !button;
            }
        } else if payload & action::BUTTON_TURBO_TOGGLE != 0 {
            if pressed {
                self.turbo_toggles[controller] ^= button;
                info!(
                    controller = controller + 1,
                    on = self.turbo_toggles[controller] & button != 0,
                    "turbo toggled"
                );
            }
        } else if pressed {
            self.buttons[controller] |= button;
        } else {
            self.buttons[controller] &= !button;
        }
        self.update_button_state(controller);
    }

    fn end_frame(&mut self) {
        self.turbo_counter = (self.turbo_counter + 1) % self.turbo_period;
        for controller in 0..4 {
            self.turbo_mask[controller] = if self.turbo_counter < self.turbo_pressed_frames {
                !0
            } else {
                0
            };
            self.update_button_state(controller);
        }
    }

    fn apply_config(&mut self, cfg: &Config) {
        self.turbo_period = TURBO_PERIODS[usize::from(cfg.turbo_speed & 7)];
        self.turbo_pressed_frames = (self.turbo_period / 2).max(1);
    }
}

/// Four Score adapter state; always present, inert outside its mode.
#[derive(Debug, Clone, Default)]
struct FourScore {
    latch: [u32; 2],
    strobe: bool,
}

impl FourScore {
    fn write(&mut self, value: u8) {
        if !self.strobe && value & 0x01 != 0 {
            self.strobe = true;
        } else if self.strobe && value & 0x01 == 0 {
            self.strobe = false;
            // Signatures are 0x10/0x20 MSB-first; the latches shift LSB
            // first, so store them bit-reversed above the controller bits.
            self.latch[0] = 0x08 << 16 | !0xFF_FFFF;
            self.latch[1] = 0x04 << 16 | !0xFF_FFFF;
        }
    }

    fn read(&mut self, port: usize) -> u8 {
        let data = (self.latch[port] & 1) as u8;
        self.latch[port] >>= 1;
        self.latch[port] |= 1 << 31;
        data
    }
}

#[derive(Clone)]
struct PortSlot {
    devices: Vec<Box<dyn Device>>,
    selected: usize,
    connected: bool,
}

impl PortSlot {
    fn selected_device(&mut self) -> Option<&mut Box<dyn Device>> {
        if self.connected {
            self.devices.get_mut(self.selected)
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct IoHub {
    ports: [PortSlot; PORT_COUNT],
    common: ControllerCommon,
    four_score: FourScore,
    four_player_mode: FourPlayerMode,
    auto_four_player_mode: FourPlayerMode,
    read_mask: u8,
    queue_processed: bool,
    vs_system: bool,
    cfg: Config,
    recording_movie: bool,
    playing_movie: bool,
    pending_dip_toggles: Vec<u8>,
    pending_disk_actions: Vec<DiskAction>,
    pending_host_actions: Vec<(ActionId, u32)>,
    /// VS mainboard bankswitch value latched from $4016 writes.
    pending_vs_bankswitch: Option<u8>,
}

impl IoHub {
    pub fn new(cfg: &Config) -> Self {
        let mut hub = Self {
            ports: std::array::from_fn(|_| PortSlot {
                devices: Vec::new(),
                selected: 0,
                connected: false,
            }),
            common: ControllerCommon::new(cfg),
            four_score: FourScore::default(),
            four_player_mode: cfg.four_player_mode,
            auto_four_player_mode: FourPlayerMode::None,
            read_mask: NES_READ_MASK,
            queue_processed: false,
            vs_system: false,
            cfg: cfg.clone(),
            recording_movie: false,
            playing_movie: false,
            pending_dip_toggles: Vec::new(),
            pending_disk_actions: Vec::new(),
            pending_host_actions: Vec::new(),
            pending_vs_bankswitch: None,
        };
        hub.register_standard_devices();
        hub
    }

    fn register_standard_devices(&mut self) {
        for port in PORT_1..=PORT_4 {
            for index in 0..4 {
                self.register(port, Box::new(Controller::new(port, index, false)));
                self.register(port, Box::new(Controller::new(port, index, true)));
            }
            self.register(port, Box::new(SnesMouse::new(port)));
        }
        self.register(PORT_1, Box::new(Zapper::new(0)));
        self.register(PORT_2, Box::new(Zapper::new(1)));
        self.register(PORT_1, Box::new(Mat::power_pad(0, true)));
        self.register(PORT_1, Box::new(Mat::power_pad(0, false)));
        self.register(PORT_2, Box::new(Mat::power_pad(1, true)));
        self.register(PORT_2, Box::new(Mat::power_pad(1, false)));
        self.register(PORT_1, Box::new(Arkanoid::nes(0)));
        self.register(PORT_2, Box::new(Arkanoid::nes(1)));

        self.register(PORT_EXP, Box::new(Arkanoid::famicom()));
        self.register(PORT_EXP, Box::new(Arkanoid::arkanoid2()));
        self.register(PORT_EXP, Box::new(Keyboard::family_basic()));
        self.register(PORT_EXP, Box::new(Keyboard::subor()));
        self.register(PORT_EXP, Box::new(Mat::family_trainer(true)));
        self.register(PORT_EXP, Box::new(Mat::family_trainer(false)));
        self.register(PORT_EXP, Box::new(Microphone::new()));
        self.register(PORT_EXP, Box::new(crate::io::hypershot::KonamiHyperShot::new()));
        self.register(PORT_EXP, Box::new(Zapper::vs()));
        self.register(PORT_EXP, Box::new(VsSwitches::new()));

        // Defaults: standard pads in ports 1/2, nothing else connected.
        self.select(PORT_1, DeviceId::Controller1);
        self.set_connected(PORT_1, true);
        self.select(PORT_2, DeviceId::Controller2);
        self.set_connected(PORT_2, true);
    }

    pub fn register(&mut self, port: usize, device: Box<dyn Device>) {
        let slot = &mut self.ports[port];
        if slot.devices.iter().any(|d| d.id() == device.id()) {
            return;
        }
        slot.devices.push(device);
    }

    pub fn select(&mut self, port: usize, id: DeviceId) -> bool {
        let slot = &mut self.ports[port];
        if let Some(index) = slot.devices.iter().position(|d| d.id() == id) {
            slot.selected = index;
            self.refresh_port_mapping();
            true
        } else {
            false
        }
    }

    /// Keep the pad-index-per-port view the VS remapping modes read in
    /// sync with device selection.
    fn refresh_port_mapping(&mut self) {
        for port in 0..PORT_COUNT {
            let slot = &self.ports[port];
            self.common.port_mapping[port] = slot
                .devices
                .get(slot.selected)
                .filter(|_| slot.connected)
                .and_then(|device| device.controller_index())
                .map(|index| index as i8)
                .unwrap_or(-1);
        }
    }

    pub fn selected_id(&self, port: usize) -> Option<DeviceId> {
        self.ports[port]
            .devices
            .get(self.ports[port].selected)
            .map(|d| d.id())
    }

    pub fn set_connected(&mut self, port: usize, connected: bool) {
        let cfg = self.cfg.clone();
        let slot = &mut self.ports[port];
        if slot.connected == connected {
            return;
        }
        slot.connected = connected;
        if let Some(device) = slot.devices.get_mut(slot.selected) {
            if connected {
                device.connect(&cfg);
            } else {
                device.disconnect();
            }
        }
        self.refresh_port_mapping();
    }

    pub fn common(&self) -> &ControllerCommon {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut ControllerCommon {
        &mut self.common
    }

    pub fn set_movie_mode(&mut self, recording: bool, playing: bool) {
        self.recording_movie = recording;
        self.playing_movie = playing;
    }

    /// Apply ROM-database and system knowledge at load time.
    pub fn apply_rom_defaults(&mut self, entry: Option<&'static DbEntry>) {
        self.auto_four_player_mode = entry
            .and_then(|e| e.four_player_mode)
            .unwrap_or(FourPlayerMode::None);
        if let Some(entry) = entry {
            if let Some(device) = entry.port1_device
                && self.select(PORT_1, device)
            {
                self.set_connected(PORT_1, true);
            }
            if let Some(device) = entry.port2_device
                && self.select(PORT_2, device)
            {
                self.set_connected(PORT_2, true);
            }
            if let Some(device) = entry.exp_device
                && self.select(PORT_EXP, device)
            {
                self.set_connected(PORT_EXP, true);
            }
        }
    }

    /// Configure for a VS-Unisystem board: full-width expansion reads plus
    /// the switch panel.
    pub fn set_vs_system(&mut self, vs: bool) {
        self.vs_system = vs;
        self.read_mask = if vs { VS_READ_MASK } else { NES_READ_MASK };
        if vs {
            self.select(PORT_EXP, DeviceId::VsSwitches);
            self.set_connected(PORT_EXP, true);
        }
    }

    pub fn is_vs_system(&self) -> bool {
        self.vs_system
    }

    fn effective_four_player_mode(&self) -> FourPlayerMode {
        match self.four_player_mode {
            FourPlayerMode::Auto => self.auto_four_player_mode,
            other => other,
        }
    }

    pub fn set_four_player_mode(&mut self, mode: FourPlayerMode) {
        self.four_player_mode = mode;
    }

    // Queue freshness --------------------------------------------------------

    pub fn queue_processed(&self) -> bool {
        self.queue_processed
    }

    pub fn mark_queue_processed(&mut self) {
        self.queue_processed = true;
    }

    pub fn clear_queue_processed(&mut self) {
        self.queue_processed = false;
    }

    // Bus access -------------------------------------------------------------

    fn ctx<'a>(
        common: &'a ControllerCommon,
        cfg: &'a Config,
        vs: bool,
        recording: bool,
        playing: bool,
    ) -> IoCtx<'a> {
        IoCtx {
            common,
            cfg,
            vs_system: vs,
            recording_movie: recording,
            playing_movie: playing,
            ppu: None,
        }
    }

    /// `$4016` write: strobe to every port, full three bits to the
    /// expansion port.
    pub fn write(&mut self, value: u8, cycles: u32) {
        let mode = self.effective_four_player_mode();
        let ctx = Self::ctx(
            &self.common,
            &self.cfg,
            self.vs_system,
            self.recording_movie,
            self.playing_movie,
        );

        for port in 0..PORT_COUNT {
            if (port == PORT_3 || port == PORT_4) && mode == FourPlayerMode::None {
                continue;
            }
            let mask = if port == PORT_EXP { 0x07 } else { 0x01 };
            let slot = &mut self.ports[port];
            if !slot.connected {
                continue;
            }
            if let Some(device) = slot.devices.get_mut(slot.selected) {
                device.write(value & mask, mode, &ctx, cycles);
            }
        }

        self.four_score.write(value);
        if self.vs_system {
            self.pending_vs_bankswitch = Some(value);
        }
    }

    /// `$4016/$4017` read.
    pub fn read(
        &mut self,
        addr: u16,
        open_bus: u8,
        cycles: u32,
        ppu: Option<&dyn crate::emu::PpuHost>,
    ) -> u8 {
        let port = usize::from(addr - crate::memory::cpu::IO_PORT1);
        let mode = self.effective_four_player_mode();
        let mut ctx = Self::ctx(
            &self.common,
            &self.cfg,
            self.vs_system,
            self.recording_movie,
            self.playing_movie,
        );
        ctx.ppu = ppu;

        let mut result = 0u8;

        if let Some(device) = self.ports[port].selected_device() {
            result |= device.read(port, mode, &ctx, cycles) & 0x19;
        }

        if let Some(device) = self.ports[PORT_EXP].selected_device() {
            result |= device.read(port, mode, &ctx, cycles) & self.read_mask;
        }

        if mode != FourPlayerMode::None {
            let shift = if mode == FourPlayerMode::Famicom { 1 } else { 0 };
            if let Some(device) = self.ports[port + 2].selected_device() {
                result |= (device.read(port, mode, &ctx, cycles) & 0x01) << shift;
            }
            if mode == FourPlayerMode::NesFourScore {
                result |= self.four_score.read(port);
            }
        }

        result | (open_bus & !self.read_mask)
    }

    // Action routing ---------------------------------------------------------

    /// Deliver a dispatched action to whatever consumes it.
    pub fn dispatch_action(&mut self, action: ActionId, value: u32) {
        use ActionCategory::*;

        let mut action = action;
        // VS cabinets can remap Start (or Select, when swapped) onto the
        // coin switch so two-button games remain playable.
        if self.vs_system && self.cfg.vs_coin_on_start {
            let swap = self.cfg.swap_start_select || self.cfg.vs_swap_start_select;
            let payload = action.payload();
            let is_remap_source = matches!(action.category(), Controller1 | Controller2)
                && payload & 0x3000 == 0
                && ((swap && payload == u16::from(action::BUTTON_SELECT))
                    || (!swap && payload == u16::from(action::BUTTON_START)));
            if is_remap_source {
                action = ActionId::digital(Vs, action::VS_COIN_1);
            }
        }

        match action.category() {
            Controller1 | Controller2 | Controller3 | Controller4 => {
                let controller = action.controller_index().unwrap_or(0);
                self.common
                    .set_button(controller, action.payload(), value != 0);
            }
            Vs => {
                let payload = action.payload();
                if payload >= action::VS_DIP_BASE {
                    if value != 0 {
                        self.pending_dip_toggles
                            .push((payload - action::VS_DIP_BASE) as u8);
                    }
                } else {
                    self.deliver_to_devices(action, value);
                }
            }
            Fds => {
                if value != 0 {
                    let disk_action = match action.payload() {
                        action::FDS_EJECT => DiskAction::Eject,
                        action::FDS_FLIP => DiskAction::Flip,
                        _ => DiskAction::Select,
                    };
                    self.pending_disk_actions.push(disk_action);
                }
            }
            Emulator | SaveState | Input => {
                self.pending_host_actions.push((action, value));
            }
            _ => self.deliver_to_devices(action, value),
        }
    }

    fn deliver_to_devices(&mut self, action: ActionId, value: u32) {
        let ctx = Self::ctx(
            &self.common,
            &self.cfg,
            self.vs_system,
            self.recording_movie,
            self.playing_movie,
        );
        for port in 0..PORT_COUNT {
            if !self.ports[port].connected {
                continue;
            }
            let selected = self.ports[port].selected;
            let wants = self.ports[port]
                .devices
                .get(selected)
                .is_some_and(|device| device.handles(action));
            if wants && let Some(device) = self.ports[port].devices.get_mut(selected) {
                device.handle_action(action, value, &ctx);
            }
        }
    }

    pub fn take_pending_dip_toggles(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending_dip_toggles)
    }

    pub fn take_pending_disk_actions(&mut self) -> Vec<DiskAction> {
        std::mem::take(&mut self.pending_disk_actions)
    }

    /// Emulator-level actions (reset, save-state traffic) the host drains
    /// each frame.
    pub fn take_host_actions(&mut self) -> Vec<(ActionId, u32)> {
        std::mem::take(&mut self.pending_host_actions)
    }

    pub fn take_vs_bankswitch(&mut self) -> Option<u8> {
        self.pending_vs_bankswitch.take()
    }

    // Frame hooks ------------------------------------------------------------

    pub fn reset(&mut self, kind: ResetKind) {
        self.queue_processed = false;
        for port in 0..PORT_COUNT {
            let slot = &mut self.ports[port];
            if !slot.connected {
                continue;
            }
            if let Some(device) = slot.devices.get_mut(slot.selected) {
                device.reset(kind);
            }
        }
    }

    pub fn end_frame(&mut self, cycles: u32) {
        self.common.end_frame();
        for port in 0..PORT_COUNT {
            let slot = &mut self.ports[port];
            if !slot.connected {
                continue;
            }
            if let Some(device) = slot.devices.get_mut(slot.selected) {
                device.end_frame(cycles);
            }
        }
        self.queue_processed = false;
    }

    pub fn apply_config(&mut self, cfg: &Config) {
        self.cfg = cfg.clone();
        self.common.apply_config(cfg);
        self.four_player_mode = cfg.four_player_mode;
    }

    /// Access a port's selected device (mainly for savestate plumbing).
    pub fn selected_device_mut(&mut self, port: usize) -> Option<&mut Box<dyn Device>> {
        let slot = &mut self.ports[port];
        slot.devices.get_mut(slot.selected)
    }
}

/// Bare [`ControllerCommon`] for device unit tests.
#[cfg(test)]
pub(crate) fn tests_common(cfg: &Config) -> ControllerCommon {
    ControllerCommon::new(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_score_signature_follows_both_pads() {
        let mut hub = IoHub::new(&Config::default());
        hub.set_four_player_mode(FourPlayerMode::NesFourScore);
        hub.set_connected(PORT_3, true);
        hub.select(PORT_3, DeviceId::Controller3);
        hub.common_mut().set_button(0, action::BUTTON_A, true);

        // Strobe.
        hub.write(1, 0);
        hub.write(0, 0);

        let mut bits = Vec::new();
        for _ in 0..24 {
            bits.push(hub.read(0x4016, 0, 0, None) & 0x03);
        }
        // First 8 bits: controller 1 (A pressed on bit 0).
        assert_eq!(bits[0] & 1, 1);
        assert!(bits[1..8].iter().all(|&b| b & 1 == 0));
        // Next 8: controller 3 (idle).
        assert!(bits[8..16].iter().all(|&b| b & 1 == 0));
        // Signature byte 0x10: MSB-first bit pattern 0001_0000.
        let signature: u8 = bits[16..24]
            .iter()
            .enumerate()
            .map(|(i, &b)| (b & 1) << (7 - i))
            .sum();
        assert_eq!(signature, 0x10);
    }

    #[test]
    fn turbo_speed_three_asserts_half_the_period() {
        let mut cfg = Config::default();
        cfg.turbo_speed = 3; // period 6
        let mut hub = IoHub::new(&cfg);
        hub.common_mut()
            .set_button(0, action::BUTTON_A | action::BUTTON_TURBO, true);

        let mut pressed_frames = 0;
        for _ in 0..6 {
            hub.end_frame(0);
            if hub.common().current_state(0) & action::BUTTON_A != 0 {
                pressed_frames += 1;
            }
        }
        assert_eq!(pressed_frames, 3);
    }
}
