//! NSF loading.
//!
//! NSF files are rewritten in place into a synthetic cartridge: a 4 KiB
//! player ROM is prepended (mapped at CPU `$E000`), the NSF header is
//! copied to player offset `$180` so the player code can read the song
//! table, and PRG-RAM is sized to hold the whole payload. Files without a
//! bankswitch table get a synthetic one aligned to the load address.

use tracing::debug;

use crate::{
    cart::{bank::Mirroring, registry::BoardType},
    config::Config,
    error::Error,
    rom::{RomImage, SystemType},
};

pub const NSF_HEADER_LEN: usize = 0x80;
pub const PLAYER_SIZE: usize = 4 * 1024;
/// The header copy lives at this offset inside the player ROM image.
pub const HEADER_COPY_OFFSET: usize = 0x180;

const NSF_REGION_PAL: u8 = 0x01;

#[derive(Debug, Clone, Copy)]
pub struct NsfInfo {
    pub song_count: u8,
    pub starting_song: u8,
    pub load_address: u16,
    pub init_address: u16,
    pub play_address: u16,
    pub bankswitch_init: [u8; 8],
    pub expansion_sound: u8,
    pub pal: bool,
}

impl NsfInfo {
    pub fn parse(header: &[u8]) -> NsfInfo {
        NsfInfo {
            song_count: header[6],
            starting_song: header[7],
            load_address: u16::from(header[8]) | u16::from(header[9]) << 8,
            init_address: u16::from(header[10]) | u16::from(header[11]) << 8,
            play_address: u16::from(header[12]) | u16::from(header[13]) << 8,
            bankswitch_init: header[0x70..0x78].try_into().unwrap_or([0; 8]),
            expansion_sound: header[0x7B] & 0x3F,
            pal: header[0x7A] & NSF_REGION_PAL != 0,
        }
    }
}

pub fn load(
    bytes: Vec<u8>,
    player: Option<&[u8]>,
    config: &Config,
) -> Result<RomImage, Error> {
    if bytes.len() < NSF_HEADER_LEN {
        return Err(Error::InvalidImage("NSF file shorter than its header".into()));
    }
    let player = player
        .ok_or_else(|| Error::InvalidImage("NSF player ROM unavailable".into()))?;
    if player.len() != PLAYER_SIZE {
        return Err(Error::InvalidImage(format!(
            "NSF player ROM must be 4 KiB, got {}",
            player.len()
        )));
    }

    let mut header: Vec<u8> = bytes[..NSF_HEADER_LEN].to_vec();
    let info = NsfInfo::parse(&header);

    let bankswitched = info.bankswitch_init.iter().any(|&b| b != 0);
    // Padding between the start of the 4 KiB bank holding the load address
    // and the load address itself; payload is shifted up by this amount.
    let padding = usize::from(info.load_address) & 0xFFF;

    if !bankswitched {
        // Synthesise a bank table as if the file were bankswitched, aligned
        // so the load address lands where the header says.
        let first_bank = 8u8.wrapping_sub((header[9] >> 4) & 0x07);
        for (slot, entry) in header[0x70..0x78].iter_mut().enumerate() {
            *entry = first_bank.wrapping_add(slot as u8) & 0x07;
        }
    }

    if config.nsf_first_track != 0 && config.nsf_first_track <= info.song_count {
        header[7] = config.nsf_first_track;
    }

    let payload = &bytes[NSF_HEADER_LEN..];
    let mut data_size = payload.len() + padding;
    // Payload pads to 32 KiB, or to the next 4 KiB boundary above that.
    if data_size < 32 * 1024 {
        data_size = 32 * 1024;
    } else if data_size % 4096 != 0 {
        data_size = (data_size / 4096 + 1) * 4096;
    }

    let mut buffer = Vec::with_capacity(PLAYER_SIZE + NSF_HEADER_LEN + data_size);
    buffer.extend_from_slice(player);
    buffer[HEADER_COPY_OFFSET..HEADER_COPY_OFFSET + NSF_HEADER_LEN]
        .copy_from_slice(&header);
    buffer.extend_from_slice(&header);
    buffer.resize(PLAYER_SIZE + NSF_HEADER_LEN + padding, 0);
    buffer.extend_from_slice(payload);
    buffer.resize(PLAYER_SIZE + NSF_HEADER_LEN + data_size, 0);

    debug!(
        songs = info.song_count,
        load = format_args!("{:#06x}", info.load_address),
        bankswitched,
        "loaded NSF image"
    );

    let mut rom = RomImage {
        offset: 0,
        board_type: BoardType::NsfPlayer,
        prg_size: PLAYER_SIZE,
        chr_size: 0,
        wram_size: [8 * 1024, data_size],
        vram_size: [8 * 1024, 0],
        mirroring: Mirroring::Vertical,
        four_screen: false,
        battery: false,
        system: if info.pal {
            SystemType::PalNes
        } else {
            SystemType::Nes
        },
        submapper: 0,
        disk_side_size: 0,
        crc32: 0,
        trainer: None,
        bios: None,
        buffer,
    };
    rom.compute_crc();
    Ok(rom)
}

/// Offset of the payload copy inside the image buffer.
pub fn payload_offset() -> usize {
    PLAYER_SIZE + NSF_HEADER_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nsf_bytes(load_address: u16, banks: [u8; 8]) -> Vec<u8> {
        let mut bytes = vec![0u8; NSF_HEADER_LEN];
        bytes[..5].copy_from_slice(&[b'N', b'E', b'S', b'M', 0x1A]);
        bytes[5] = 1;
        bytes[6] = 12; // songs
        bytes[7] = 1;
        bytes[8] = (load_address & 0xFF) as u8;
        bytes[9] = (load_address >> 8) as u8;
        bytes[0x70..0x78].copy_from_slice(&banks);
        bytes.extend(vec![0xEE; 1000]);
        bytes
    }

    #[test]
    fn non_bankswitched_files_get_a_synthetic_table() {
        let player = vec![0u8; PLAYER_SIZE];
        let rom = load(nsf_bytes(0x8000, [0; 8]), Some(&player), &Config::default())
            .expect("load");
        let header = &rom.buffer[payload_offset() - NSF_HEADER_LEN..payload_offset()];
        assert_eq!(&header[0x70..0x78], &[0, 1, 2, 3, 4, 5, 6, 7]);
        // Payload padded to at least 32 KiB of PRG RAM.
        assert_eq!(rom.wram_size[1], 32 * 1024);
    }

    #[test]
    fn header_copy_lands_inside_player_rom() {
        let player = vec![0u8; PLAYER_SIZE];
        let rom = load(nsf_bytes(0x8000, [1; 8]), Some(&player), &Config::default())
            .expect("load");
        assert_eq!(rom.buffer[HEADER_COPY_OFFSET], b'N');
        assert_eq!(rom.buffer[HEADER_COPY_OFFSET + 6], 12);
    }

    #[test]
    fn missing_player_rom_fails() {
        assert!(load(nsf_bytes(0x8000, [0; 8]), None, &Config::default()).is_err());
    }
}
