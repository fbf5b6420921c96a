//! Standard NES/Famicom and SNES controllers.
//!
//! Button state lives in the hub's [`ControllerCommon`]; the device latches
//! it on the strobe's falling edge, applying the swap/masking options and
//! the VS-Unisystem remapping modes, then shifts it out bit by bit. Movie
//! playback substitutes a pre-recorded latch stream, run-length encoded
//! with a 1-byte count fast path and 2/3-byte extended forms.

use crate::{
    input::action::{
        ActionCategory, ActionId, BUTTON_A, BUTTON_B, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_SELECT,
        BUTTON_START,
    },
    io::device::{Device, DeviceId, IoCtx},
    io::hub::{FourPlayerMode, VsControllerMode},
    reset::ResetKind,
};

const VS_BUTTON_MASK: u16 = BUTTON_SELECT | BUTTON_START;
const BUTTON_UP_DOWN: u16 = crate::input::action::BUTTON_UP | crate::input::action::BUTTON_DOWN;

#[derive(Debug, Clone)]
pub struct Controller {
    /// Port this instance is registered in.
    port: usize,
    /// Which shared controller state it reads.
    index: usize,
    is_snes: bool,
    latch: u32,
    strobe: bool,
    /// One latch per frame: reruns of the strobe reuse the first capture.
    latched: bool,
    old_latch: u32,
    movie: MovieStream,
}

impl Controller {
    pub fn new(port: usize, index: usize, is_snes: bool) -> Self {
        Self {
            port,
            index,
            is_snes,
            latch: 0,
            strobe: false,
            latched: false,
            old_latch: 0,
            movie: MovieStream::new(is_snes),
        }
    }

    fn capture_latch(&mut self, mode: FourPlayerMode, ctx: &IoCtx<'_>, port_hint: usize) {
        let mut latch = if ctx.playing_movie {
            if self.latched {
                self.old_latch
            } else {
                let value = self.movie.next_latch();
                self.old_latch = value;
                value
            }
        } else {
            u32::from(self.effective_buttons(ctx, port_hint))
        };

        if self.is_snes {
            latch &= 0x0FFF;
        } else {
            latch |= !0xFF;
        }
        if mode == FourPlayerMode::NesFourScore {
            latch &= 0xFF;
            if port_hint >= 2 {
                latch <<= 8;
            }
        }

        if ctx.recording_movie && !self.latched {
            self.movie.add_latch(latch);
        }
        self.latched = true;
        self.latch = latch;
    }

    /// Apply the option and VS remapping pipeline to the shared state.
    fn effective_buttons(&self, ctx: &IoCtx<'_>, port_hint: usize) -> u16 {
        let common = ctx.common;
        let mut latch = common.current_state(self.index);

        let mut swap_start_select = ctx.cfg.swap_start_select;
        if ctx.vs_system && ctx.cfg.vs_swap_start_select {
            swap_start_select = true;
        }
        if swap_start_select {
            let picked = latch & VS_BUTTON_MASK;
            latch &= !VS_BUTTON_MASK;
            latch |= (picked & BUTTON_SELECT) << 1;
            latch |= (picked & BUTTON_START) >> 1;
        }

        if ctx.vs_system {
            let mut standard_controls = true;
            match common.vs_controller_mode {
                VsControllerMode::Standard => {}
                VsControllerMode::BungelingBay => latch |= BUTTON_START,
                VsControllerMode::VsSuperSkyKid => {
                    if port_hint == 0 {
                        let other = common.port_mapping[1];
                        if other >= 0 {
                            let mut other = common.current_state(other as usize);
                            other &= if swap_start_select {
                                BUTTON_START
                            } else {
                                BUTTON_SELECT
                            };
                            if other != 0 {
                                latch |= BUTTON_START;
                            }
                        }
                    }
                }
                VsControllerMode::Swapped => standard_controls = false,
                VsControllerMode::VsPinballJ => {
                    let source = common.port_mapping[port_hint ^ 1];
                    if source >= 0 {
                        let other = common.current_state(source as usize);
                        if port_hint == 1 {
                            latch &= !BUTTON_A;
                            latch |= other & BUTTON_B;
                        } else {
                            latch &= !BUTTON_B;
                            latch |= other & BUTTON_A;
                        }
                    }
                    standard_controls = false;
                }
            }
            if standard_controls {
                // The VS layout crosses the directional lines between the
                // cabinets' sticks; Start/Select stay with the seat.
                let other_port = port_hint ^ 1;
                let source = common.port_mapping[other_port];
                latch &= VS_BUTTON_MASK;
                if source >= 0 {
                    latch |= common.current_state(source as usize) & !VS_BUTTON_MASK;
                }
            }
        }

        if ctx.cfg.swap_a_b {
            let picked = latch & (BUTTON_A | BUTTON_B);
            latch &= !(BUTTON_A | BUTTON_B);
            latch |= (picked & BUTTON_A) << 1;
            latch |= (picked & BUTTON_B) >> 1;
        }

        if ctx.cfg.mask_opposite_directions {
            if latch & (BUTTON_LEFT | BUTTON_RIGHT) == BUTTON_LEFT | BUTTON_RIGHT {
                latch ^= BUTTON_LEFT | BUTTON_RIGHT;
            }
            if latch & BUTTON_UP_DOWN == BUTTON_UP_DOWN {
                latch ^= BUTTON_UP_DOWN;
            }
        }

        latch
    }

    pub fn movie_stream_bytes(&self) -> &[u8] {
        self.movie.buffer()
    }
}

impl Device for Controller {
    fn id(&self) -> DeviceId {
        match (self.is_snes, self.index) {
            (false, 0) => DeviceId::Controller1,
            (false, 1) => DeviceId::Controller2,
            (false, 2) => DeviceId::Controller3,
            (false, 3) => DeviceId::Controller4,
            (true, 0) => DeviceId::SnesController1,
            (true, 1) => DeviceId::SnesController2,
            (true, 2) => DeviceId::SnesController3,
            _ => DeviceId::SnesController4,
        }
    }

    fn name(&self) -> &'static str {
        if self.is_snes {
            "SNES Controller"
        } else {
            "Controller"
        }
    }

    fn read(&mut self, _port: usize, mode: FourPlayerMode, _ctx: &IoCtx<'_>, _cycles: u32) -> u8 {
        let data = (self.latch & 0x01) as u8;
        self.latch >>= 1;
        if mode != FourPlayerMode::NesFourScore {
            // Hardware shifts in 1s once the register drains.
            if self.is_snes {
                self.latch |= 1 << 15;
            } else {
                self.latch |= 1 << 7;
            }
        }
        data
    }

    fn write(&mut self, value: u8, mode: FourPlayerMode, ctx: &IoCtx<'_>, _cycles: u32) {
        if !self.strobe && value & 0x01 != 0 {
            self.strobe = true;
        } else if self.strobe && value & 0x01 == 0 {
            self.strobe = false;
            let port = self.port;
            self.capture_latch(mode, ctx, port);
        }
    }

    fn reset(&mut self, _kind: ResetKind) {
        self.latch = 0;
        self.strobe = false;
        self.latched = false;
    }

    fn end_frame(&mut self, _cycles: u32) {
        self.latched = false;
    }

    fn handles(&self, action: ActionId) -> bool {
        // Button state routes through the hub's shared store, not here.
        matches!(
            action.category(),
            ActionCategory::Controller1
                | ActionCategory::Controller2
                | ActionCategory::Controller3
                | ActionCategory::Controller4
        ) && action.controller_index() == Some(self.index)
    }

    fn latch_state(&self) -> Option<(u32, bool)> {
        Some((self.latch, self.strobe))
    }

    fn set_latch_state(&mut self, latch: u32, strobe: bool) {
        self.latch = latch;
        self.strobe = strobe;
    }

    fn movie_stream(&self) -> Option<Vec<u8>> {
        if self.movie.is_empty() {
            None
        } else {
            Some(self.movie.buffer().to_vec())
        }
    }

    fn load_movie_stream(&mut self, data: &[u8]) {
        self.movie.load(data);
    }

    fn is_snes(&self) -> bool {
        self.is_snes
    }

    fn controller_index(&self) -> Option<usize> {
        Some(self.index)
    }
}

/// Run-length encoded latch stream.
///
/// Plain records are `latch [latch-hi] count` with an 8-bit count. Records
/// introduced by `$FE` carry a 16-bit count, `$FF` a 24-bit count; the
/// escape forms also cover latch values whose high nibble collides with
/// the magic bytes.
#[derive(Debug, Clone)]
struct MovieStream {
    is_snes: bool,
    buffer: Vec<u8>,
    offset: usize,
    latch_data: u32,
    latch_count: u32,
}

const MAGIC_COUNT_16: u8 = 0xFE;
const MAGIC_COUNT_24: u8 = 0xFF;

impl MovieStream {
    fn new(is_snes: bool) -> Self {
        Self {
            is_snes,
            buffer: Vec::new(),
            offset: 0,
            latch_data: 0,
            latch_count: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.latch_count == 0
    }

    fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn load(&mut self, data: &[u8]) {
        self.buffer = data.to_vec();
        self.offset = 0;
        self.latch_data = 0;
        self.latch_count = 0;
    }

    fn next_latch(&mut self) -> u32 {
        if self.latch_count == 0 {
            self.decode_record();
        }
        if self.latch_count > 0 {
            self.latch_count -= 1;
            self.latch_data
        } else {
            0
        }
    }

    fn decode_record(&mut self) {
        let at = |i: usize| self.buffer.get(i).copied().unwrap_or(0);
        let mut offset = self.offset;
        if offset >= self.buffer.len() {
            self.latch_data = 0;
            self.latch_count = 0;
            return;
        }

        let magic = at(offset);
        let extended = magic == MAGIC_COUNT_16 || magic == MAGIC_COUNT_24;
        if extended {
            offset += 1;
        }

        let mut data = u32::from(at(offset));
        offset += 1;
        if self.is_snes {
            data |= u32::from(at(offset)) << 8;
            offset += 1;
        }

        let mut count = u32::from(at(offset));
        offset += 1;
        if extended {
            count |= u32::from(at(offset)) << 8;
            offset += 1;
            if magic == MAGIC_COUNT_24 {
                count |= u32::from(at(offset)) << 16;
                offset += 1;
            }
        }

        self.latch_data = data;
        self.latch_count = count + 1;
        self.offset = offset;
    }

    fn add_latch(&mut self, latch: u32) {
        let data = if self.is_snes {
            latch & 0x0FFF
        } else {
            latch & 0xFF
        };
        if data != self.latch_data || self.latch_count == 0 {
            self.encode_pending();
            self.latch_data = data;
            self.latch_count = 1;
        } else {
            self.latch_count += 1;
        }
    }

    /// Flush the pending run to the buffer.
    fn encode_pending(&mut self) {
        let mut count = self.latch_count;
        let data = self.latch_data;
        while count > 0 {
            let (magic, max) = if count > 65536 {
                (Some(MAGIC_COUNT_24), 1u32 << 24)
            } else if count > 512 || data & 0xF0 == 0xF0 {
                (Some(MAGIC_COUNT_16), 1 << 16)
            } else {
                (None, 256)
            };
            let run = count.min(max) - 1;

            if let Some(magic) = magic {
                self.buffer.push(magic);
            }
            self.buffer.push((data & 0xFF) as u8);
            if self.is_snes {
                self.buffer.push((data >> 8) as u8);
            }
            self.buffer.push((run & 0xFF) as u8);
            if magic.is_some() {
                self.buffer.push((run >> 8) as u8);
                if magic == Some(MAGIC_COUNT_24) {
                    self.buffer.push((run >> 16) as u8);
                }
            }

            count -= run + 1;
        }
        self.latch_count = 0;
    }

    /// Finish a recording, flushing the open run.
    fn finish(&mut self) {
        self.encode_pending();
    }
}

impl Controller {
    pub fn finish_movie(&mut self) {
        self.movie.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_rle_round_trips() {
        let mut stream = MovieStream::new(false);
        let runs: &[(u32, u32)] = &[(0x01, 3), (0x00, 700), (0xF3, 2), (0x42, 1)];
        for &(latch, count) in runs {
            for _ in 0..count {
                stream.add_latch(latch);
            }
        }
        stream.finish();

        let bytes = stream.buffer().to_vec();
        let mut replay = MovieStream::new(false);
        replay.load(&bytes);
        for &(latch, count) in runs {
            for _ in 0..count {
                assert_eq!(replay.next_latch(), latch);
            }
        }
        assert_eq!(replay.next_latch(), 0);
    }

    #[test]
    fn snes_streams_carry_twelve_bits() {
        let mut stream = MovieStream::new(true);
        stream.add_latch(0x0ABC);
        stream.add_latch(0x0ABC);
        stream.finish();

        let mut replay = MovieStream::new(true);
        replay.load(stream.buffer());
        assert_eq!(replay.next_latch(), 0x0ABC);
        assert_eq!(replay.next_latch(), 0x0ABC);
    }
}
