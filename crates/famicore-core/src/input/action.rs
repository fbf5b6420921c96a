//! Emulator actions: the closed set of things an input binding can do.
//!
//! An action id packs its category, type tag and a category-specific
//! payload into one word. Controller actions carry the button bit (plus
//! turbo flags), keyboard actions carry the matrix position, switch
//! actions carry the switch index. The name table is what binding
//! configuration lines refer to.

use std::sync::LazyLock;

/// Action identifier. See the layout constants below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

/// Which peripheral or subsystem consumes the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Controller1,
    Controller2,
    Controller3,
    Controller4,
    Arkanoid1,
    Arkanoid2,
    PowerPad1,
    PowerPad2,
    Zapper1,
    Zapper2,
    Mouse1,
    Mouse2,
    Mouse3,
    Mouse4,
    Keyboard,
    Microphone,
    HyperShot,
    Vs,
    Fds,
    Emulator,
    SaveState,
    Input,
}

/// Digital actions get press/release semantics and reference counting;
/// analog actions receive axis values; mouse actions receive packed
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Digital,
    Analog,
    Mouse,
}

const CATEGORY_SHIFT: u32 = 16;
const KIND_ANALOG: u32 = 1 << 24;
const KIND_MOUSE: u32 = 1 << 25;
/// Deferred actions are held until the safe-point queue drain.
const DEFERRED: u32 = 1 << 26;

pub const PAYLOAD_MASK: u32 = 0xFFFF;

// Controller button payload bits. The low byte matches the hardware shift
// register; SNES pads extend into the next nibble group.
pub const BUTTON_A: u16 = 0x0001;
pub const BUTTON_B: u16 = 0x0002;
pub const BUTTON_SELECT: u16 = 0x0004;
pub const BUTTON_START: u16 = 0x0008;
pub const BUTTON_UP: u16 = 0x0010;
pub const BUTTON_DOWN: u16 = 0x0020;
pub const BUTTON_LEFT: u16 = 0x0040;
pub const BUTTON_RIGHT: u16 = 0x0080;
pub const BUTTON_SNES_A: u16 = 0x0100;
pub const BUTTON_SNES_X: u16 = 0x0200;
pub const BUTTON_SNES_L: u16 = 0x0400;
pub const BUTTON_SNES_R: u16 = 0x0800;
/// Turbo-hold variant of the button in the low bits.
pub const BUTTON_TURBO: u16 = 0x1000;
/// Turbo-toggle variant.
pub const BUTTON_TURBO_TOGGLE: u16 = 0x2000;

// Per-category payload codes for the non-controller devices.
pub const ARKANOID_DIAL: u16 = 0x01;
pub const ARKANOID_DIAL_MOUSE: u16 = 0x02;
pub const ARKANOID_BUTTON: u16 = 0x04;

pub const ZAPPER_TRIGGER: u16 = 0x01;
pub const ZAPPER_TRIGGER_OFFSCREEN: u16 = 0x02;
pub const ZAPPER_UPDATE_LOCATION: u16 = 0x03;

pub const MOUSE_LEFT_BUTTON: u16 = 0x01;
pub const MOUSE_RIGHT_BUTTON: u16 = 0x02;
pub const MOUSE_UPDATE_LOCATION: u16 = 0x03;

pub const HYPER_SHOT_1_JUMP: u16 = 0x01;
pub const HYPER_SHOT_1_RUN: u16 = 0x02;
pub const HYPER_SHOT_2_JUMP: u16 = 0x04;
pub const HYPER_SHOT_2_RUN: u16 = 0x08;

pub const VS_COIN_1: u16 = 0x01;
pub const VS_COIN_2: u16 = 0x02;
pub const VS_SERVICE: u16 = 0x03;
/// DIP switches are `VS_DIP_BASE + index`, index 0-7.
pub const VS_DIP_BASE: u16 = 0x10;

pub const FDS_EJECT: u16 = 0x01;
pub const FDS_FLIP: u16 = 0x02;
pub const FDS_SELECT: u16 = 0x03;

pub const EMU_SOFT_RESET: u16 = 0x01;
pub const EMU_HARD_RESET: u16 = 0x02;
pub const EMU_PAUSE: u16 = 0x03;

pub const STATE_QUICK_SAVE: u16 = 0x01;
pub const STATE_QUICK_LOAD: u16 = 0x02;
/// Slot selection is `STATE_SLOT_BASE + slot`, slot 0-9.
pub const STATE_SLOT_BASE: u16 = 0x10;

/// Keys the Family BASIC matrix does not have; the Subor keyboard
/// translates these through its own table. The flag sits above every
/// matrix position (half-row < 32, so positions stay under `$2000`).
pub const KBD_SPECIAL: u16 = 0x8000;

impl ActionId {
    pub const fn digital(category: ActionCategory, payload: u16) -> ActionId {
        ActionId((category as u32) << CATEGORY_SHIFT | payload as u32)
    }

    pub const fn analog(category: ActionCategory, payload: u16) -> ActionId {
        ActionId((category as u32) << CATEGORY_SHIFT | payload as u32 | KIND_ANALOG)
    }

    pub const fn mouse(category: ActionCategory, payload: u16) -> ActionId {
        ActionId((category as u32) << CATEGORY_SHIFT | payload as u32 | KIND_MOUSE)
    }

    pub const fn deferred(self) -> ActionId {
        ActionId(self.0 | DEFERRED)
    }

    pub fn category(self) -> ActionCategory {
        use ActionCategory::*;
        match (self.0 >> CATEGORY_SHIFT) & 0x1F {
            0 => Controller1,
            1 => Controller2,
            2 => Controller3,
            3 => Controller4,
            4 => Arkanoid1,
            5 => Arkanoid2,
            6 => PowerPad1,
            7 => PowerPad2,
            8 => Zapper1,
            9 => Zapper2,
            10 => Mouse1,
            11 => Mouse2,
            12 => Mouse3,
            13 => Mouse4,
            14 => Keyboard,
            15 => Microphone,
            16 => HyperShot,
            17 => Vs,
            18 => Fds,
            19 => Emulator,
            20 => SaveState,
            _ => Input,
        }
    }

    pub fn kind(self) -> ActionKind {
        if self.0 & KIND_ANALOG != 0 {
            ActionKind::Analog
        } else if self.0 & KIND_MOUSE != 0 {
            ActionKind::Mouse
        } else {
            ActionKind::Digital
        }
    }

    pub fn is_deferred(self) -> bool {
        self.0 & DEFERRED != 0
    }

    pub fn payload(self) -> u16 {
        (self.0 & PAYLOAD_MASK) as u16
    }

    /// Controller index for the controller categories.
    pub fn controller_index(self) -> Option<usize> {
        match self.category() {
            ActionCategory::Controller1 => Some(0),
            ActionCategory::Controller2 => Some(1),
            ActionCategory::Controller3 => Some(2),
            ActionCategory::Controller4 => Some(3),
            _ => None,
        }
    }
}

/// Pack a Family BASIC matrix position: half-row index and column bit
/// (bits 1-4 of the serial read).
pub const fn kbd_key(half_row: u16, column_bit: u16) -> u16 {
    half_row << 8 | column_bit
}

#[derive(Debug, Clone)]
pub struct ActionDesc {
    pub name: String,
    pub id: ActionId,
}

/// The Family BASIC key matrix, row by row, four keys per half-row in
/// column-bit order `$02/$04/$08/$10`.
static KEYBOARD_MATRIX: &[[&str; 8]; 9] = &[
    ["f8", "return", "lbracket", "rbracket", "kana", "rshift", "yen", "stop"],
    ["f7", "at", "colon", "semicolon", "underscore", "slash", "minus", "caret"],
    ["f6", "o", "l", "k", "period", "comma", "p", "0"],
    ["f5", "i", "u", "j", "m", "n", "9", "8"],
    ["f4", "y", "g", "h", "b", "v", "7", "6"],
    ["f3", "t", "r", "d", "f", "c", "5", "4"],
    ["f2", "w", "s", "a", "x", "z", "e", "3"],
    ["f1", "esc", "q", "ctr", "lshift", "grph", "1", "2"],
    ["clr", "up", "right", "left", "down", "space", "del", "ins"],
];

/// Subor-only keys, translated by the Subor keyboard device.
static KEYBOARD_SPECIALS: &[&str] = &[
    "bs", "caps", "pgup", "pgdn", "end", "apostrophe", "equals", "pause", "backslash", "tab",
    "numlock",
];

static ACTIONS: LazyLock<Vec<ActionDesc>> = LazyLock::new(build_action_table);

fn push(table: &mut Vec<ActionDesc>, name: String, id: ActionId) {
    table.push(ActionDesc { name, id });
}

fn build_action_table() -> Vec<ActionDesc> {
    use ActionCategory::*;
    let mut t = Vec::new();

    let controllers = [Controller1, Controller2, Controller3, Controller4];
    let buttons: [(&str, u16); 12] = [
        ("a", BUTTON_A),
        ("b", BUTTON_B),
        ("select", BUTTON_SELECT),
        ("start", BUTTON_START),
        ("up", BUTTON_UP),
        ("down", BUTTON_DOWN),
        ("left", BUTTON_LEFT),
        ("right", BUTTON_RIGHT),
        ("snes_a", BUTTON_SNES_A),
        ("snes_x", BUTTON_SNES_X),
        ("snes_l", BUTTON_SNES_L),
        ("snes_r", BUTTON_SNES_R),
    ];
    for (i, &cat) in controllers.iter().enumerate() {
        let n = i + 1;
        for (name, bit) in buttons {
            push(&mut t, format!("controller{n}_{name}"), ActionId::digital(cat, bit));
        }
        for (name, bit) in [("a", BUTTON_A), ("b", BUTTON_B)] {
            push(
                &mut t,
                format!("controller{n}_turbo_{name}"),
                ActionId::digital(cat, bit | BUTTON_TURBO),
            );
            push(
                &mut t,
                format!("controller{n}_turbo_toggle_{name}"),
                ActionId::digital(cat, bit | BUTTON_TURBO_TOGGLE),
            );
        }
    }

    for (i, &cat) in [Arkanoid1, Arkanoid2].iter().enumerate() {
        let n = i + 1;
        push(&mut t, format!("arkanoid{n}_dial"), ActionId::analog(cat, ARKANOID_DIAL));
        push(
            &mut t,
            format!("arkanoid{n}_dial_mouse"),
            ActionId::mouse(cat, ARKANOID_DIAL_MOUSE),
        );
        push(&mut t, format!("arkanoid{n}_button"), ActionId::digital(cat, ARKANOID_BUTTON));
    }

    for (i, &cat) in [Zapper1, Zapper2].iter().enumerate() {
        let n = i + 1;
        push(&mut t, format!("zapper{n}_trigger"), ActionId::digital(cat, ZAPPER_TRIGGER));
        push(
            &mut t,
            format!("zapper{n}_trigger_offscreen"),
            ActionId::digital(cat, ZAPPER_TRIGGER_OFFSCREEN),
        );
        push(
            &mut t,
            format!("zapper{n}_update_location"),
            ActionId::mouse(cat, ZAPPER_UPDATE_LOCATION),
        );
    }

    for (i, &cat) in [PowerPad1, PowerPad2].iter().enumerate() {
        let n = i + 1;
        for key in 1..=12u16 {
            push(&mut t, format!("mat{n}_{key}"), ActionId::digital(cat, key));
        }
    }

    for (i, &cat) in [Mouse1, Mouse2, Mouse3, Mouse4].iter().enumerate() {
        let n = i + 1;
        push(&mut t, format!("mouse{n}_left"), ActionId::digital(cat, MOUSE_LEFT_BUTTON));
        push(&mut t, format!("mouse{n}_right"), ActionId::digital(cat, MOUSE_RIGHT_BUTTON));
        push(
            &mut t,
            format!("mouse{n}_update_location"),
            ActionId::mouse(cat, MOUSE_UPDATE_LOCATION),
        );
    }

    for (row, keys) in KEYBOARD_MATRIX.iter().enumerate() {
        for (col, key) in keys.iter().enumerate() {
            let half_row = (row * 2 + col / 4) as u16;
            let bit = 0x02u16 << (col % 4);
            push(
                &mut t,
                format!("kbd_{key}"),
                ActionId::digital(Keyboard, kbd_key(half_row, bit)),
            );
        }
    }
    for (i, key) in KEYBOARD_SPECIALS.iter().enumerate() {
        push(
            &mut t,
            format!("kbd_{key}"),
            ActionId::digital(Keyboard, KBD_SPECIAL | i as u16),
        );
    }

    push(&mut t, "microphone".into(), ActionId::digital(Microphone, 1));

    push(&mut t, "hypershot1_jump".into(), ActionId::digital(HyperShot, HYPER_SHOT_1_JUMP));
    push(&mut t, "hypershot1_run".into(), ActionId::digital(HyperShot, HYPER_SHOT_1_RUN));
    push(&mut t, "hypershot2_jump".into(), ActionId::digital(HyperShot, HYPER_SHOT_2_JUMP));
    push(&mut t, "hypershot2_run".into(), ActionId::digital(HyperShot, HYPER_SHOT_2_RUN));

    push(&mut t, "vs_coin_1".into(), ActionId::digital(Vs, VS_COIN_1));
    push(&mut t, "vs_coin_2".into(), ActionId::digital(Vs, VS_COIN_2));
    push(&mut t, "vs_service".into(), ActionId::digital(Vs, VS_SERVICE));
    for dip in 0..8u16 {
        push(
            &mut t,
            format!("vs_dip_{}", dip + 1),
            ActionId::digital(Vs, VS_DIP_BASE + dip),
        );
    }

    push(&mut t, "fds_eject".into(), ActionId::digital(Fds, FDS_EJECT));
    push(&mut t, "fds_flip".into(), ActionId::digital(Fds, FDS_FLIP));
    push(&mut t, "fds_select".into(), ActionId::digital(Fds, FDS_SELECT));

    push(&mut t, "soft_reset".into(), ActionId::digital(Emulator, EMU_SOFT_RESET));
    push(&mut t, "hard_reset".into(), ActionId::digital(Emulator, EMU_HARD_RESET));
    push(&mut t, "pause".into(), ActionId::digital(Emulator, EMU_PAUSE));

    push(
        &mut t,
        "quick_save_state".into(),
        ActionId::digital(SaveState, STATE_QUICK_SAVE).deferred(),
    );
    push(
        &mut t,
        "quick_load_state".into(),
        ActionId::digital(SaveState, STATE_QUICK_LOAD).deferred(),
    );
    for slot in 0..10u16 {
        push(
            &mut t,
            format!("state_slot_{slot}"),
            ActionId::digital(SaveState, STATE_SLOT_BASE + slot),
        );
    }

    t
}

pub fn lookup(name: &str) -> Option<ActionId> {
    ACTIONS
        .iter()
        .find(|desc| desc.name.eq_ignore_ascii_case(name))
        .map(|desc| desc.id)
}

pub fn name_of(id: ActionId) -> Option<&'static str> {
    ACTIONS
        .iter()
        .find(|desc| desc.id == id)
        .map(|desc| desc.name.as_str())
}

pub fn all() -> &'static [ActionDesc] {
    ACTIONS.as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(
            lookup("CONTROLLER1_A"),
            Some(ActionId::digital(ActionCategory::Controller1, BUTTON_A))
        );
        assert_eq!(lookup("not_an_action"), None);
    }

    #[test]
    fn action_ids_are_unique() {
        let table = all();
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                assert_ne!(a.id, b.id, "{} and {} share an id", a.name, b.name);
            }
        }
    }

    #[test]
    fn quick_save_is_deferred_and_digital() {
        let id = lookup("quick_save_state").expect("exists");
        assert!(id.is_deferred());
        assert_eq!(id.kind(), ActionKind::Digital);
        assert_eq!(id.category(), ActionCategory::SaveState);
    }
}
