//! End-to-end scenarios spanning the cartridge, hub and input dispatcher.

mod common;

use common::{MockCpu, ines_image};
use famicore_core::{
    Config, Emu, ResetKind,
    input::{action, event::InputEvent},
    rom::{self, LoadResources},
};

fn emu_with(mapper: u16, prg_banks: u8) -> Emu {
    let mut emu = Emu::new(Config::default());
    let rom = rom::load(
        ines_image(mapper, prg_banks, 1),
        &LoadResources::default(),
        &emu.config,
    )
    .expect("load");
    emu.load(rom).expect("install");
    let mut cpu = MockCpu::default();
    emu.reset(ResetKind::PowerOn, &mut cpu);
    emu
}

#[test]
fn mmc1_bank_select_reaches_the_cpu_bus() {
    let mut emu = emu_with(1, 8);
    let mut cpu = MockCpu::default();

    // Reset the shift register, program mode 0x0C, then select bank 1
    // through $E000, five serial bits per register.
    emu.cpu_write(0x8000, 0x80, 0, &mut cpu);
    let mut cycles = 100;
    for bit in 0..5 {
        emu.cpu_write(0x8000, (0x0C >> bit) & 1, cycles, &mut cpu);
        cycles += 36;
    }
    for bit in 0..5 {
        emu.cpu_write(0xE000, (0x01 >> bit) & 1, cycles, &mut cpu);
        cycles += 36;
    }

    assert_eq!(emu.cpu_read(0x8000, 0, cycles, &mut cpu, None), 1);
    // Last 16 KiB stays fixed high.
    assert_eq!(emu.cpu_read(0xC000, 0, cycles, &mut cpu, None), 7);
}

#[test]
fn bound_key_reaches_the_controller_serial_stream() {
    let mut emu = emu_with(0, 1);
    let mut cpu = MockCpu::default();

    emu.input.bind("Keyboard z", "controller1_a").expect("bind");
    emu.input.queue(InputEvent::Keyboard {
        key: 'z' as u32,
        pressed: true,
    });

    // Strobe; the hub drains the queue on the bus access.
    emu.cpu_write(0x4016, 1, 0, &mut cpu);
    emu.cpu_write(0x4016, 0, 0, &mut cpu);

    let first = emu.cpu_read(0x4016, 0, 0, &mut cpu, None);
    assert_eq!(first & 0x01, 1, "A is the first serial bit");
    let second = emu.cpu_read(0x4016, 0, 0, &mut cpu, None);
    assert_eq!(second & 0x01, 0);
}

#[test]
fn ctrl_gated_reset_binding_fires_exactly_once() {
    let mut emu = emu_with(0, 1);

    emu.input
        .bind_modifier("Keyboard lctrl", 4)
        .expect("modifier");
    emu.input.bind("[CTRL] Keyboard r", "soft_reset").expect("bind");

    // Plain r: nothing.
    emu.input.queue(InputEvent::Keyboard {
        key: 'r' as u32,
        pressed: true,
    });
    emu.input.queue(InputEvent::Keyboard {
        key: 'r' as u32,
        pressed: false,
    });
    emu.process_input(true);
    assert!(emu.take_host_actions().is_empty());

    // Ctrl held: one press event.
    emu.input.queue(InputEvent::Keyboard {
        key: 0x114,
        pressed: true,
    });
    emu.input.queue(InputEvent::Keyboard {
        key: 'r' as u32,
        pressed: true,
    });
    emu.process_input(true);
    let actions = emu.take_host_actions();
    let reset = action::lookup("soft_reset").expect("action");
    assert_eq!(actions.iter().filter(|(a, v)| *a == reset && *v == 1).count(), 1);
}

#[test]
fn quick_save_waits_for_the_frame_boundary() {
    let mut emu = emu_with(0, 1);
    let mut cpu = MockCpu::default();

    emu.input.bind("Keyboard f5", "quick_save_state").expect("bind");
    emu.input.queue(InputEvent::Keyboard {
        key: 0x124,
        pressed: true,
    });

    // Mid-frame processing defers the action.
    emu.process_input(false);
    assert!(emu.take_host_actions().is_empty());

    // The end-of-frame safe point delivers it.
    emu.end_frame(0, &mut cpu);
    let save = action::lookup("quick_save_state").expect("action");
    assert!(emu.take_host_actions().iter().any(|(a, _)| *a == save));
}

#[test]
fn zapper_presents_light_and_trigger_bits() {
    use common::BrightPpu;
    use famicore_core::io::{device::DeviceId, hub::PORT_2};

    let mut emu = emu_with(0, 1);
    let mut cpu = MockCpu::default();
    assert!(emu.io.select(PORT_2, DeviceId::Zapper2));
    emu.io.set_connected(PORT_2, true);

    emu.input
        .bind("Mouse", "zapper2_update_location")
        .expect("bind");
    emu.input
        .bind("Mouse Button 1", "zapper2_trigger")
        .expect("bind");
    emu.input.queue(InputEvent::MouseMotion {
        x: 128,
        y: 120,
        xrel: 0,
        yrel: 0,
        buttons: 0,
    });
    emu.input.queue(InputEvent::MouseButton {
        button: 1,
        x: 128,
        y: 120,
        pressed: true,
    });
    emu.process_input(true);

    let ppu = BrightPpu;
    let value = emu.cpu_read(0x4017, 0, 0, &mut cpu, Some(&ppu));
    assert_eq!(value & 0x08, 0, "light sensed pulls the diode line low");
    assert_ne!(value & 0x10, 0, "trigger held");
}

#[test]
fn snapshot_restore_is_identity_on_cartridge_state() {
    // Color Dreams: conflict-free latch, 32 KiB PRG banks.
    let mut emu = emu_with(11, 8);
    let mut cpu = MockCpu::default();

    emu.cpu_write(0x8000, 0x02, 0, &mut cpu);
    let before = emu.cpu_read(0x8000, 0, 0, &mut cpu, None);
    let snapshot = emu.snapshot();

    // Disturb the mapping, then restore.
    emu.cpu_write(0x8000, 0x00, 0, &mut cpu);
    assert_ne!(emu.cpu_read(0x8000, 0, 0, &mut cpu, None), before);
    emu.restore(snapshot);
    assert_eq!(emu.cpu_read(0x8000, 0, 0, &mut cpu, None), before);
}

#[test]
fn save_state_round_trips_controller_latches() {
    use famicore_core::state::{SaveState, capture_io, restore_io};

    let mut emu = emu_with(0, 1);
    let mut cpu = MockCpu::default();

    emu.input.bind("Keyboard z", "controller1_a").expect("bind");
    emu.input.queue(InputEvent::Keyboard {
        key: 'z' as u32,
        pressed: true,
    });
    emu.cpu_write(0x4016, 1, 0, &mut cpu);
    emu.cpu_write(0x4016, 0, 0, &mut cpu);

    let mut state = SaveState::new();
    capture_io(&mut state, &mut emu.io);
    let bytes = state.to_bytes();

    // Drain some bits, then restore; the stream must replay identically.
    let before: Vec<u8> = (0..4)
        .map(|_| emu.cpu_read(0x4016, 0, 0, &mut cpu, None) & 1)
        .collect();
    let reloaded = SaveState::from_bytes(&bytes).expect("parse");
    restore_io(&reloaded, &mut emu.io);
    let after: Vec<u8> = (0..4)
        .map(|_| emu.cpu_read(0x4016, 0, 0, &mut cpu, None) & 1)
        .collect();
    assert_eq!(before, after);
}
