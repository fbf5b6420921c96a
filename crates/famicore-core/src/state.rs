//! Save-state container.
//!
//! A save state is a `CXNS` header followed by named chunks: a 4-byte
//! ASCII id and a 32-bit little-endian length per chunk. Components own
//! their chunk layouts; unknown chunks are skipped on load so newer files
//! stay readable. The hub's controller latches live in `PAD0`-`PAD3`, and
//! recorded movie streams in `PDM0`-`PDM3` (standard pads) or
//! `PSM0`-`PSM3` (SNES pads).

use crate::{
    error::Error,
    io::hub::{IoHub, PORT_1, PORT_4},
};

pub const MAGIC: [u8; 4] = *b"CXNS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: [u8; 4],
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    chunks: Vec<Chunk>,
}

impl SaveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_chunk(&self, id: [u8; 4]) -> Option<&[u8]> {
        self.chunks
            .iter()
            .find(|chunk| chunk.id == id)
            .map(|chunk| chunk.data.as_slice())
    }

    /// Add or replace the chunk with the given id.
    pub fn replace_chunk(&mut self, id: [u8; 4], data: Vec<u8>) {
        if let Some(chunk) = self.chunks.iter_mut().find(|chunk| chunk.id == id) {
            chunk.data = data;
        } else {
            self.chunks.push(Chunk { id, data });
        }
    }

    pub fn remove_chunk(&mut self, id: [u8; 4]) {
        self.chunks.retain(|chunk| chunk.id != id);
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        for chunk in &self.chunks {
            out.extend(chunk.id);
            out.extend((chunk.data.len() as u32).to_le_bytes());
            out.extend(&chunk.data);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
            return Err(Error::InvalidImage("missing CXNS header".into()));
        }
        let mut chunks = Vec::new();
        let mut cursor = MAGIC.len();
        while cursor < bytes.len() {
            let header = bytes
                .get(cursor..cursor + 8)
                .ok_or_else(|| Error::InvalidImage("truncated chunk header".into()))?;
            let id: [u8; 4] = header[..4].try_into().expect("sliced to length");
            let size = u32::from_le_bytes(header[4..8].try_into().expect("sliced to length"));
            cursor += 8;
            let data = bytes
                .get(cursor..cursor + size as usize)
                .ok_or_else(|| Error::InvalidImage("truncated chunk data".into()))?;
            cursor += size as usize;
            chunks.push(Chunk {
                id,
                data: data.to_vec(),
            });
        }
        Ok(Self { chunks })
    }
}

fn pad_chunk_id(port: usize) -> [u8; 4] {
    [b'P', b'A', b'D', b'0' + port as u8]
}

fn movie_chunk_id(port: usize, snes: bool) -> [u8; 4] {
    [b'P', if snes { b'S' } else { b'D' }, b'M', b'0' + port as u8]
}

/// Capture the per-port serial latches and movie streams.
pub fn capture_io(state: &mut SaveState, hub: &mut IoHub) {
    for port in PORT_1..=PORT_4 {
        let Some(device) = hub.selected_device_mut(port) else {
            continue;
        };
        if let Some((latch, strobe)) = device.latch_state() {
            let mut data = latch.to_le_bytes().to_vec();
            data.push(u8::from(strobe));
            state.replace_chunk(pad_chunk_id(port), data);
        }
        if let Some(stream) = device.movie_stream() {
            state.replace_chunk(movie_chunk_id(port, device.is_snes()), stream);
        }
    }
}

/// Restore whatever chunks apply to the currently selected devices;
/// absent chunks leave state untouched.
pub fn restore_io(state: &SaveState, hub: &mut IoHub) {
    for port in PORT_1..=PORT_4 {
        let pad = state.find_chunk(pad_chunk_id(port)).map(<[u8]>::to_vec);
        let movie = {
            let Some(device) = hub.selected_device_mut(port) else {
                continue;
            };
            state
                .find_chunk(movie_chunk_id(port, device.is_snes()))
                .map(<[u8]>::to_vec)
        };
        let Some(device) = hub.selected_device_mut(port) else {
            continue;
        };
        if let Some(data) = pad {
            if data.len() >= 5 {
                let latch = u32::from_le_bytes(data[..4].try_into().expect("length checked"));
                device.set_latch_state(latch, data[4] != 0);
            }
        }
        if let Some(stream) = movie {
            device.load_movie_stream(&stream);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn container_round_trips_and_skips_unknown_chunks() {
        let mut state = SaveState::new();
        state.replace_chunk(*b"PAD0", vec![1, 2, 3, 4, 0]);
        state.replace_chunk(*b"XYZW", vec![9; 17]);

        let bytes = state.to_bytes();
        let loaded = SaveState::from_bytes(&bytes).expect("load");
        assert_eq!(loaded, state);
        // Unknown chunks survive parsing without interpretation.
        assert_eq!(loaded.find_chunk(*b"XYZW").map(<[u8]>::len), Some(17));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(SaveState::from_bytes(b"NOPE").is_err());
        assert!(SaveState::from_bytes(b"CXNSPAD0\xFF\xFF\xFF\xFF").is_err());
    }

    #[test]
    fn io_latches_round_trip() {
        let mut hub = IoHub::new(&Config::default());
        let mut state = SaveState::new();

        hub.selected_device_mut(PORT_1)
            .expect("device")
            .set_latch_state(0xA5A5, true);
        capture_io(&mut state, &mut hub);

        let mut restored = IoHub::new(&Config::default());
        restore_io(&state, &mut restored);
        assert_eq!(
            restored
                .selected_device_mut(PORT_1)
                .expect("device")
                .latch_state(),
            Some((0xA5A5, true))
        );
    }
}
