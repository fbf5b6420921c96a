//! Host input events.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Keyboard,
    MouseMotion,
    MouseButton,
    JoyAxis,
    JoyButton,
    JoyAxisButton,
    JoyHat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatDirection {
    Up = 0x01,
    Right = 0x02,
    Down = 0x04,
    Left = 0x08,
}

impl HatDirection {
    pub fn from_name(name: &str) -> Option<HatDirection> {
        match name.to_ascii_lowercase().as_str() {
            "up" => Some(HatDirection::Up),
            "right" => Some(HatDirection::Right),
            "down" => Some(HatDirection::Down),
            "left" => Some(HatDirection::Left),
            _ => None,
        }
    }
}

/// Identity of an event source: what bindings are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub kind: EventType,
    pub device: u32,
    /// Key code / button number / axis number / hat number.
    pub index: u32,
    /// Direction discriminator for half-axis and hat bindings.
    pub misc: u32,
}

/// A raw host event, as queued by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Keyboard {
        key: u32,
        pressed: bool,
    },
    MouseMotion {
        x: i16,
        y: i16,
        xrel: i16,
        yrel: i16,
        buttons: u8,
    },
    MouseButton {
        button: u32,
        x: i16,
        y: i16,
        pressed: bool,
    },
    JoyAxis {
        device: u32,
        axis: u32,
        value: i16,
    },
    JoyAxisButton {
        device: u32,
        axis: u32,
        direction: i32,
        pressed: bool,
    },
    JoyButton {
        device: u32,
        button: u32,
        pressed: bool,
    },
    JoyHat {
        device: u32,
        hat: u32,
        direction: HatDirection,
        pressed: bool,
    },
}

impl InputEvent {
    pub fn key(&self) -> EventKey {
        match *self {
            InputEvent::Keyboard { key, .. } => EventKey {
                kind: EventType::Keyboard,
                device: 0,
                index: key,
                misc: 0,
            },
            InputEvent::MouseMotion { .. } => EventKey {
                kind: EventType::MouseMotion,
                device: 0,
                index: 0,
                misc: 0,
            },
            InputEvent::MouseButton { button, .. } => EventKey {
                kind: EventType::MouseButton,
                device: 0,
                index: button,
                misc: 0,
            },
            InputEvent::JoyAxis { device, axis, .. } => EventKey {
                kind: EventType::JoyAxis,
                device,
                index: axis,
                misc: 0,
            },
            InputEvent::JoyAxisButton {
                device,
                axis,
                direction,
                ..
            } => EventKey {
                kind: EventType::JoyAxisButton,
                device,
                index: axis,
                misc: direction as u32,
            },
            InputEvent::JoyButton { device, button, .. } => EventKey {
                kind: EventType::JoyButton,
                device,
                index: button,
                misc: 0,
            },
            InputEvent::JoyHat {
                device,
                hat,
                direction,
                ..
            } => EventKey {
                kind: EventType::JoyHat,
                device,
                index: hat,
                misc: direction as u32,
            },
        }
    }
}

/// Pack two signed 16-bit coordinates into an action value.
pub fn pack_coords(x: i16, y: i16) -> u32 {
    (x as u16 as u32) << 16 | (y as u16 as u32)
}

/// Inverse of [`pack_coords`].
pub fn unpack_coords(value: u32) -> (i16, i16) {
    ((value >> 16) as u16 as i16, (value & 0xFFFF) as u16 as i16)
}
