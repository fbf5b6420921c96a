//! Family BASIC and Subor keyboards.
//!
//! A row-column matrix read four bits at a time: `$4016` writes select the
//! half-row (enable, column advance, reset-to-row-0), `$4017` reads return
//! the selected half-row's columns inverted. Key actions carry the matrix
//! position directly; the Subor keyboard reroutes them through its own
//! translation table.

use crate::{
    input::action::{ActionCategory, ActionId, KBD_SPECIAL, kbd_key},
    io::device::{Device, DeviceId, IoCtx},
    io::hub::FourPlayerMode,
    reset::ResetKind,
};

const ENABLE: u8 = 0x04;
const COLUMN: u8 = 0x02;
const RESET: u8 = 0x01;

const FAMILY_BASIC_ROWS: usize = 20;
const SUBOR_ROWS: usize = 26;

/// Subor matrix positions indexed by `(family_half_row << 2) | column_log2`.
static SUBOR_TRANSLATION: [u16; 72] = [
    kbd(0x05, 0x02), kbd(0x08, 0x04), kbd(0x09, 0x04), kbd(0x08, 0x02),
    0xFFFF,          kbd(0x0F, 0x10), kbd(0x09, 0x08), 0xFFFF,
    kbd(0x09, 0x02), 0xFFFF,          0xFFFF,          kbd(0x0E, 0x04),
    0xFFFF,          kbd(0x0E, 0x10), kbd(0x0E, 0x02), 0xFFFF,
    kbd(0x0F, 0x02), kbd(0x07, 0x04), kbd(0x06, 0x08), kbd(0x0C, 0x08),
    kbd(0x07, 0x10), kbd(0x06, 0x10), kbd(0x0F, 0x04), kbd(0x07, 0x08),
    kbd(0x07, 0x02), kbd(0x06, 0x04), kbd(0x0D, 0x04), kbd(0x0D, 0x10),
    kbd(0x0C, 0x10), kbd(0x10, 0x08), kbd(0x06, 0x02), kbd(0x0D, 0x08),
    kbd(0x0D, 0x02), kbd(0x0C, 0x04), kbd(0x00, 0x04), kbd(0x10, 0x04),
    kbd(0x11, 0x10), kbd(0x01, 0x10), kbd(0x0C, 0x02), kbd(0x11, 0x08),
    kbd(0x11, 0x02), kbd(0x10, 0x02), kbd(0x11, 0x04), kbd(0x02, 0x04),
    kbd(0x00, 0x08), kbd(0x00, 0x10), kbd(0x01, 0x08), kbd(0x00, 0x02),
    kbd(0x01, 0x02), kbd(0x03, 0x04), kbd(0x02, 0x08), kbd(0x0B, 0x04),
    kbd(0x03, 0x10), kbd(0x0A, 0x08), kbd(0x01, 0x04), kbd(0x03, 0x08),
    kbd(0x03, 0x02), kbd(0x0B, 0x02), kbd(0x0A, 0x02), kbd(0x0B, 0x10),
    kbd(0x0F, 0x10), 0xFFFF,          kbd(0x0B, 0x08), kbd(0x02, 0x02),
    kbd(0x05, 0x10), kbd(0x08, 0x08), kbd(0x04, 0x10), kbd(0x08, 0x10),
    kbd(0x09, 0x10), kbd(0x10, 0x10), kbd(0x05, 0x08), kbd(0x04, 0x02),
];

/// Subor positions of the keys the Family BASIC matrix lacks, in
/// [`crate::input::action`]'s special-key order.
static SUBOR_SPECIALS: [u16; 11] = [
    kbd(4, 0x04),  // backspace
    kbd(10, 0x04), // caps
    kbd(5, 0x04),  // page up
    kbd(4, 0x08),  // page down
    kbd(2, 0x10),  // end
    kbd(14, 0x08), // apostrophe
    kbd(15, 0x08), // equals
    kbd(10, 0x10), // pause
    kbd(9, 0x08),  // backslash
    0xFFFF,        // tab (not present)
    0xFFFF,        // numlock (not present)
];

const fn kbd(row: u16, mask: u16) -> u16 {
    kbd_key(row, mask)
}

#[derive(Debug, Clone)]
pub struct Keyboard {
    subor: bool,
    key_state: [u8; SUBOR_ROWS],
    index: usize,
    prev_write: u8,
}

impl Keyboard {
    pub fn family_basic() -> Self {
        Self::new(false)
    }

    pub fn subor() -> Self {
        Self::new(true)
    }

    fn new(subor: bool) -> Self {
        Self {
            subor,
            key_state: [0x1E; SUBOR_ROWS],
            index: 0,
            prev_write: 0,
        }
    }

    fn rows(&self) -> usize {
        if self.subor { SUBOR_ROWS } else { FAMILY_BASIC_ROWS }
    }

    fn translate(&self, payload: u16) -> Option<(usize, u8)> {
        let payload = if self.subor {
            if payload & KBD_SPECIAL != 0 {
                let index = usize::from(payload & 0xFF);
                let translated = SUBOR_SPECIALS.get(index).copied().unwrap_or(0xFFFF);
                if translated == 0xFFFF {
                    return None;
                }
                translated
            } else {
                let offset = usize::from(payload >> 8);
                let column = match payload & 0x1E {
                    0x02 => 0,
                    0x04 => 1,
                    0x08 => 2,
                    _ => 3,
                };
                let translated = SUBOR_TRANSLATION
                    .get((offset << 2) | column)
                    .copied()
                    .unwrap_or(0xFFFF);
                if translated == 0xFFFF {
                    return None;
                }
                translated
            }
        } else {
            if payload & KBD_SPECIAL != 0 {
                return None;
            }
            payload
        };

        let row = usize::from(payload >> 8);
        if row >= self.rows() {
            return None;
        }
        Some((row, (payload & 0x1E) as u8))
    }
}

impl Device for Keyboard {
    fn id(&self) -> DeviceId {
        if self.subor {
            DeviceId::SuborKeyboard
        } else {
            DeviceId::FamilyKeyboard
        }
    }

    fn name(&self) -> &'static str {
        if self.subor {
            "Subor Keyboard"
        } else {
            "Famicom Keyboard"
        }
    }

    fn write(&mut self, value: u8, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) {
        if value & ENABLE == 0 {
            return;
        }
        let changed = self.prev_write ^ value;
        if changed & COLUMN != 0 {
            self.index = (self.index + 1) % self.rows();
        }
        if value & RESET != 0 {
            self.index = 0;
        }
        self.prev_write = value;
    }

    fn read(&mut self, port: usize, _mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        if port == 0 {
            0
        } else {
            self.key_state[self.index]
        }
    }

    fn reset(&mut self, kind: ResetKind) {
        if kind.is_hard() {
            self.key_state = [0x1E; SUBOR_ROWS];
        }
        self.index = 0;
        self.prev_write = 0;
    }

    fn handles(&self, action: ActionId) -> bool {
        action.category() == ActionCategory::Keyboard
    }

    fn handle_action(&mut self, action: ActionId, value: u32, _ctx: &IoCtx<'_>) {
        let Some((row, mask)) = self.translate(action.payload()) else {
            return;
        };
        if value != 0 {
            self.key_state[row] &= !mask;
        } else {
            self.key_state[row] |= mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx<'a>(
        common: &'a crate::io::hub::ControllerCommon,
        cfg: &'a Config,
    ) -> IoCtx<'a> {
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
    fn row_select_and_key_mask_work_together() {
        let cfg = Config::default();
        let common = crate::io::hub::tests_common(&cfg);
        let c = ctx(&common, &cfg);
        let mut kb = Keyboard::family_basic();

        // Press "w": row 6, first half, column bit $02 -> half-row 12.
        kb.handle_action(
            ActionId::digital(ActionCategory::Keyboard, kbd_key(12, 0x02)),
            1,
            &c,
        );

        // Reset the row counter, then toggle the column line twelve times;
        // every edge advances one half-row.
        kb.write(ENABLE | RESET, FourPlayerMode::None, &c, 0);
        kb.write(ENABLE, FourPlayerMode::None, &c, 0);
        for _ in 0..6 {
            kb.write(ENABLE | COLUMN, FourPlayerMode::None, &c, 0);
            kb.write(ENABLE, FourPlayerMode::None, &c, 0);
        }
        let value = kb.read(1, FourPlayerMode::None, &c, 0);
        assert_eq!(value & 0x02, 0); // pressed key pulls its column low
        assert_eq!(value & 0x1C, 0x1C);
    }
}
