//! Input binding grammar.
//!
//! A binding line names a host event source, optionally prefixed by
//! modifier names:
//!
//! ```text
//! [CTRL-MOD1] Keyboard r
//! Keyboard space
//! Mouse
//! Mouse Button 1
//! Joystick 0 Button 3
//! Joystick 0 Axis 1+
//! Joystick 0 Hat 0 Up
//! Joystick 0 leftx -
//! ```
//!
//! Game-controller semantic names (`a`, `start`, `leftshoulder`, `leftx`,
//! ...) are accepted wherever a button or axis number is; hosts that
//! enumerate pads through a game-controller API deliver the matching
//! indices.

use crate::{error::Error, input::event::{EventKey, EventType, HatDirection}};

/// Modifier slots, in bit order.
pub const MODIFIER_NAMES: [&str; 8] = [
    "mod1", "mod2", "mod3", "kbd", "ctrl", "alt", "shift", "gui",
];

pub const MOD_KBD: usize = 3;
pub const MOD_KBD_BIT: u8 = 1 << MOD_KBD;

/// Parsed binding: the event source plus the modifier set that must be
/// held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: EventKey,
    pub mod_bits: u8,
}

/// Semantic game-controller button names, index order fixed.
static CONTROLLER_BUTTONS: &[&str] = &[
    "a",
    "b",
    "x",
    "y",
    "back",
    "guide",
    "start",
    "leftstick",
    "rightstick",
    "leftshoulder",
    "rightshoulder",
    "dpup",
    "dpdown",
    "dpleft",
    "dpright",
];

/// Semantic game-controller axis names, index order fixed.
static CONTROLLER_AXES: &[&str] = &[
    "leftx",
    "lefty",
    "rightx",
    "righty",
    "triggerleft",
    "triggerright",
];

pub fn modifier_index(name: &str) -> Option<usize> {
    MODIFIER_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
}

pub fn parse(binding: &str) -> Result<Binding, Error> {
    let binding = binding.trim();
    let (mod_bits, rest) = split_modifiers(binding)?;
    let key = parse_source(rest)?;
    Ok(Binding { key, mod_bits })
}

/// Leading modifiers come either bracketed (`[CTRL-MOD1] ...`) or joined
/// to the source with dashes (`ctrl-mod1-Keyboard r`).
fn split_modifiers(binding: &str) -> Result<(u8, &str), Error> {
    if let Some(rest) = binding.strip_prefix('[') {
        let (mods, rest) = rest
            .split_once(']')
            .ok_or_else(|| Error::BindingSyntax(binding.into()))?;
        let mut bits = 0u8;
        for name in mods.split('-').filter(|s| !s.is_empty()) {
            let index = modifier_index(name.trim())
                .ok_or_else(|| Error::BindingSyntax(format!("unknown modifier {name}")))?;
            bits |= 1 << index;
        }
        return Ok((bits, rest.trim_start()));
    }

    let mut bits = 0u8;
    let mut rest = binding;
    while let Some((head, tail)) = rest.split_once('-') {
        match modifier_index(head.trim()) {
            Some(index) => {
                bits |= 1 << index;
                rest = tail;
            }
            None => break,
        }
    }
    Ok((bits, rest.trim_start()))
}

fn parse_source(source: &str) -> Result<EventKey, Error> {
    let mut words = source.split_whitespace();
    let kind = words
        .next()
        .ok_or_else(|| Error::BindingSyntax(source.into()))?;

    if kind.eq_ignore_ascii_case("keyboard") {
        let keyname = words
            .next()
            .ok_or_else(|| Error::BindingSyntax(source.into()))?;
        let key = keycode_from_name(keyname)
            .ok_or_else(|| Error::BindingSyntax(format!("unknown key {keyname}")))?;
        return Ok(EventKey {
            kind: EventType::Keyboard,
            device: 0,
            index: key,
            misc: 0,
        });
    }

    if kind.eq_ignore_ascii_case("mouse") {
        return match words.next() {
            None => Ok(EventKey {
                kind: EventType::MouseMotion,
                device: 0,
                index: 0,
                misc: 0,
            }),
            Some(word) if word.eq_ignore_ascii_case("button") => {
                let button: u32 = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(|| Error::BindingSyntax(source.into()))?;
                Ok(EventKey {
                    kind: EventType::MouseButton,
                    device: 0,
                    index: button,
                    misc: 0,
                })
            }
            Some(_) => Err(Error::BindingSyntax(source.into())),
        };
    }

    if kind.eq_ignore_ascii_case("joystick") {
        let device: u32 = words
            .next()
            .and_then(|w| w.parse().ok())
            .ok_or_else(|| Error::BindingSyntax(source.into()))?;
        let what = words
            .next()
            .ok_or_else(|| Error::BindingSyntax(source.into()))?;

        if what.eq_ignore_ascii_case("button") {
            let button: u32 = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or_else(|| Error::BindingSyntax(source.into()))?;
            return Ok(EventKey {
                kind: EventType::JoyButton,
                device,
                index: button,
                misc: 0,
            });
        }

        if what.eq_ignore_ascii_case("axis") {
            let axis_word = words
                .next()
                .ok_or_else(|| Error::BindingSyntax(source.into()))?;
            return parse_axis(device, axis_word, words.next());
        }

        if what.eq_ignore_ascii_case("hat") {
            let hat: u32 = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or_else(|| Error::BindingSyntax(source.into()))?;
            let direction = words
                .next()
                .and_then(HatDirection::from_name)
                .ok_or_else(|| Error::BindingSyntax(source.into()))?;
            return Ok(EventKey {
                kind: EventType::JoyHat,
                device,
                index: hat,
                misc: direction as u32,
            });
        }

        // Game-controller semantic names.
        if let Some(button) = CONTROLLER_BUTTONS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(what))
        {
            return Ok(EventKey {
                kind: EventType::JoyButton,
                device,
                index: button as u32,
                misc: 0,
            });
        }
        if CONTROLLER_AXES
            .iter()
            .any(|name| what.to_ascii_lowercase().starts_with(name))
        {
            return parse_axis_name(device, what, words.next());
        }
    }

    Err(Error::BindingSyntax(source.into()))
}

/// `Axis <M>` is an analog binding; `Axis <M>+`/`-` is the digital
/// half-axis form.
fn parse_axis(device: u32, axis_word: &str, trailing: Option<&str>) -> Result<EventKey, Error> {
    let (digits, sign) = match axis_word.as_bytes().last() {
        Some(b'+') => (&axis_word[..axis_word.len() - 1], Some(1i32)),
        Some(b'-') => (&axis_word[..axis_word.len() - 1], Some(-1i32)),
        _ => (axis_word, trailing.and_then(parse_sign)),
    };
    let axis: u32 = digits
        .parse()
        .map_err(|_| Error::BindingSyntax(axis_word.into()))?;
    Ok(axis_key(device, axis, sign))
}

fn parse_axis_name(
    device: u32,
    axis_word: &str,
    trailing: Option<&str>,
) -> Result<EventKey, Error> {
    let lower = axis_word.to_ascii_lowercase();
    let (name, sign) = match lower.as_bytes().last() {
        Some(b'+') => (&lower[..lower.len() - 1], Some(1i32)),
        Some(b'-') => (&lower[..lower.len() - 1], Some(-1i32)),
        _ => (lower.as_str(), trailing.and_then(parse_sign)),
    };
    let axis = CONTROLLER_AXES
        .iter()
        .position(|n| *n == name)
        .ok_or_else(|| Error::BindingSyntax(axis_word.into()))?;
    Ok(axis_key(device, axis as u32, sign))
}

fn parse_sign(word: &str) -> Option<i32> {
    match word {
        "+" => Some(1),
        "-" => Some(-1),
        _ => None,
    }
}

fn axis_key(device: u32, axis: u32, sign: Option<i32>) -> EventKey {
    match sign {
        Some(direction) => EventKey {
            kind: EventType::JoyAxisButton,
            device,
            index: axis,
            misc: direction as u32,
        },
        None => EventKey {
            kind: EventType::JoyAxis,
            device,
            index: axis,
            misc: 0,
        },
    }
}

/// Key codes: printable keys use their ASCII value, specials live above
/// `0x100`. Hosts translate their native codes through the same table.
pub fn keycode_from_name(name: &str) -> Option<u32> {
    if name.len() == 1 {
        let c = name.chars().next()?;
        if c.is_ascii_graphic() {
            return Some(c.to_ascii_lowercase() as u32);
        }
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "space" => 0x20,
        "return" | "enter" => 0x101,
        "escape" | "esc" => 0x102,
        "backspace" => 0x103,
        "tab" => 0x104,
        "up" => 0x105,
        "down" => 0x106,
        "left" => 0x107,
        "right" => 0x108,
        "insert" => 0x109,
        "delete" => 0x10A,
        "home" => 0x10B,
        "end" => 0x10C,
        "pageup" => 0x10D,
        "pagedown" => 0x10E,
        "capslock" => 0x10F,
        "numlock" => 0x110,
        "pause" => 0x111,
        "lshift" => 0x112,
        "rshift" => 0x113,
        "lctrl" => 0x114,
        "rctrl" => 0x115,
        "lalt" => 0x116,
        "ralt" => 0x117,
        "lgui" => 0x118,
        "rgui" => 0x119,
        name => {
            let number = name.strip_prefix('f')?.parse::<u32>().ok()?;
            if (1..=12).contains(&number) {
                0x120 + number - 1
            } else {
                return None;
            }
        }
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_modifiers() {
        let binding = parse("[CTRL] Keyboard r").expect("parse");
        assert_eq!(binding.mod_bits, 1 << 4);
        assert_eq!(binding.key.kind, EventType::Keyboard);
        assert_eq!(binding.key.index, 'r' as u32);
    }

    #[test]
    fn parses_dashed_modifiers() {
        let binding = parse("mod1-shift-Keyboard space").expect("parse");
        assert_eq!(binding.mod_bits, (1 << 0) | (1 << 6));
        assert_eq!(binding.key.index, 0x20);
    }

    #[test]
    fn parses_joystick_sources() {
        let button = parse("Joystick 2 Button 5").expect("parse");
        assert_eq!(button.key.kind, EventType::JoyButton);
        assert_eq!(button.key.device, 2);
        assert_eq!(button.key.index, 5);

        let axis = parse("Joystick 0 Axis 1-").expect("parse");
        assert_eq!(axis.key.kind, EventType::JoyAxisButton);
        assert_eq!(axis.key.misc, -1i32 as u32);

        let hat = parse("Joystick 1 Hat 0 Left").expect("parse");
        assert_eq!(hat.key.kind, EventType::JoyHat);
        assert_eq!(hat.key.misc, HatDirection::Left as u32);

        let semantic = parse("Joystick 0 leftshoulder").expect("parse");
        assert_eq!(semantic.key.kind, EventType::JoyButton);
        assert_eq!(semantic.key.index, 9);

        let semantic_axis = parse("Joystick 0 lefty +").expect("parse");
        assert_eq!(semantic_axis.key.kind, EventType::JoyAxisButton);
        assert_eq!(semantic_axis.key.index, 1);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(parse("Keyboard").is_err());
        assert!(parse("Joystick x Button 1").is_err());
        assert!(parse("[WAT] Keyboard a").is_err());
        assert!(parse("Gamepad 0 Button 1").is_err());
    }
}
