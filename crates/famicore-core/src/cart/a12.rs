//! PPU A12 edge detection for scanline-counter IRQs.
//!
//! MMC3-family boards clock their IRQ counter on rising edges of PPU
//! address line A12 (mask `0x1000`). Rapid toggles during pattern fetches
//! must not count, so a rising edge is only honoured after A12 has stayed
//! low for a minimum time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A12Edge {
    None,
    Rise,
    Fall,
}

/// Debounced A12 edge detector.
///
/// `frame_cycle` inputs are master-clock counts that wrap to zero each
/// frame; wrap-around is folded into the accumulated low time.
#[derive(Debug, Clone)]
pub struct A12Watcher {
    last_cycle: u32,
    cycles_down: u32,
    frame_len: u32,
}

/// Minimum low time, in master clocks, before a rise is honoured.
const MIN_LOW_TIME: u32 = 10;

impl A12Watcher {
    pub const fn new(frame_len: u32) -> Self {
        Self {
            last_cycle: 0,
            cycles_down: 0,
            frame_len,
        }
    }

    pub fn reset(&mut self) {
        self.last_cycle = 0;
        self.cycles_down = 0;
    }

    pub fn update(&mut self, addr: u16, frame_cycle: u32) -> A12Edge {
        let mut result = A12Edge::None;

        if self.cycles_down > 0 {
            if self.last_cycle > frame_cycle {
                // Wrapped into a new frame.
                self.cycles_down = self
                    .cycles_down
                    .saturating_add(self.frame_len.saturating_sub(self.last_cycle))
                    .saturating_add(frame_cycle);
            } else {
                self.cycles_down = self
                    .cycles_down
                    .saturating_add(frame_cycle.saturating_sub(self.last_cycle));
            }
        }

        if addr & 0x1000 == 0 {
            if self.cycles_down == 0 {
                self.cycles_down = 1;
                result = A12Edge::Fall;
            }
        } else {
            if self.cycles_down > MIN_LOW_TIME {
                result = A12Edge::Rise;
            }
            self.cycles_down = 0;
        }

        self.last_cycle = frame_cycle;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_low_time_is_debounced() {
        let mut w = A12Watcher::new(100);
        assert_eq!(w.update(0x1000, 0), A12Edge::None);
        assert_eq!(w.update(0x0000, 1), A12Edge::Fall);
        assert_eq!(w.update(0x1000, 6), A12Edge::None);

        assert_eq!(w.update(0x0000, 10), A12Edge::Fall);
        assert_eq!(w.update(0x0000, 25), A12Edge::None);
        assert_eq!(w.update(0x1000, 26), A12Edge::Rise);
    }

    #[test]
    fn low_time_spans_frame_wrap() {
        let mut w = A12Watcher::new(100);
        assert_eq!(w.update(0x0000, 90), A12Edge::Fall);
        // Accumulates (100 - 90) + 5 on top of the initial 1.
        assert_eq!(w.update(0x1000, 5), A12Edge::Rise);
    }
}
