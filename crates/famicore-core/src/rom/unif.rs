//! UNIF container loading.
//!
//! UNIF stores the image as tagged chunks after a 32-byte header: `MAPR`
//! names the board, `PRG0`-`PRGF`/`CHR0`-`CHRF` carry ROM data, `MIRR`
//! selects mirroring and `BATR` marks battery backing. Chunks the core does
//! not care about are skipped.

use tracing::{debug, warn};

use crate::{
    cart::{bank::Mirroring, registry::board_from_unif},
    error::Error,
    rom::{RomImage, SystemType},
};

const UNIF_HEADER_LEN: usize = 32;

pub fn load(bytes: Vec<u8>) -> Result<RomImage, Error> {
    let mut board_name = None;
    let mut prg_chunks: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut chr_chunks: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut mirroring = Mirroring::Horizontal;
    let mut four_screen = false;
    let mut battery = false;

    let mut cursor = UNIF_HEADER_LEN;
    while cursor + 8 <= bytes.len() {
        let id: [u8; 4] = bytes[cursor..cursor + 4]
            .try_into()
            .map_err(|_| Error::InvalidImage("short UNIF chunk id".into()))?;
        let len = u32::from_le_bytes(
            bytes[cursor + 4..cursor + 8]
                .try_into()
                .map_err(|_| Error::InvalidImage("short UNIF chunk size".into()))?,
        ) as usize;
        cursor += 8;
        let data = bytes
            .get(cursor..cursor + len)
            .ok_or_else(|| Error::InvalidImage("truncated UNIF chunk".into()))?;
        cursor += len;

        match &id {
            b"MAPR" => {
                let name = data
                    .split(|&b| b == 0)
                    .next()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .unwrap_or_default();
                board_name = Some(name);
            }
            b"MIRR" => {
                (mirroring, four_screen) = match data.first() {
                    Some(0) => (Mirroring::Horizontal, false),
                    Some(1) => (Mirroring::Vertical, false),
                    Some(2) => (Mirroring::SingleA, false),
                    Some(3) => (Mirroring::SingleB, false),
                    Some(4) => (Mirroring::FourScreen, true),
                    Some(5) => (Mirroring::Mapper, false),
                    other => {
                        warn!(?other, "unknown UNIF mirroring value");
                        (Mirroring::Horizontal, false)
                    }
                };
            }
            b"BATR" => battery = true,
            _ if id.starts_with(b"PRG") => {
                prg_chunks.push((id[3], data.to_vec()));
            }
            _ if id.starts_with(b"CHR") => {
                chr_chunks.push((id[3], data.to_vec()));
            }
            _ => {
                debug!(id = %String::from_utf8_lossy(&id), len, "skipping UNIF chunk");
            }
        }
    }

    let board_name =
        board_name.ok_or_else(|| Error::InvalidImage("UNIF image has no MAPR chunk".into()))?;
    let board_type = board_from_unif(&board_name)
        .ok_or_else(|| Error::UnsupportedMapper(format!("UNIF board {board_name}")))?;

    prg_chunks.sort_by_key(|(index, _)| *index);
    chr_chunks.sort_by_key(|(index, _)| *index);
    let prg: Vec<u8> = prg_chunks.into_iter().flat_map(|(_, d)| d).collect();
    let chr: Vec<u8> = chr_chunks.into_iter().flat_map(|(_, d)| d).collect();
    if prg.is_empty() {
        return Err(Error::InvalidImage("UNIF image has no PRG data".into()));
    }

    let prg_size = prg.len();
    let chr_size = chr.len();
    let mut buffer = prg;
    buffer.extend(chr);

    let mut rom = RomImage {
        buffer,
        offset: 0,
        board_type,
        prg_size,
        chr_size,
        wram_size: [0, 0],
        vram_size: [0, 0],
        mirroring,
        four_screen,
        battery,
        system: SystemType::Nes,
        submapper: 0,
        disk_side_size: 0,
        crc32: 0,
        trainer: None,
        bios: None,
    };
    rom.compute_crc();
    Ok(rom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::registry::BoardType;

    fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend((data.len() as u32).to_le_bytes());
        out.extend(data);
        out
    }

    fn image(board: &str) -> Vec<u8> {
        let mut bytes = b"UNIF".to_vec();
        bytes.extend([4, 0, 0, 0]);
        bytes.resize(UNIF_HEADER_LEN, 0);
        let mut name = board.as_bytes().to_vec();
        name.push(0);
        bytes.extend(chunk(b"MAPR", &name));
        bytes.extend(chunk(b"PRG0", &vec![0xAA; 16 * 1024]));
        bytes.extend(chunk(b"CHR0", &vec![0x55; 8 * 1024]));
        bytes.extend(chunk(b"MIRR", &[1]));
        bytes
    }

    #[test]
    fn loads_named_board() {
        let rom = load(image("NES-NROM-128")).expect("load");
        assert_eq!(rom.board_type, BoardType::Nrom);
        assert_eq!(rom.prg_size, 16 * 1024);
        assert_eq!(rom.chr_size, 8 * 1024);
        assert_eq!(rom.mirroring, Mirroring::Vertical);
    }

    #[test]
    fn unknown_board_name_is_unsupported() {
        assert!(matches!(
            load(image("UNL-NOT-A-BOARD")),
            Err(Error::UnsupportedMapper(_))
        ));
    }

    #[test]
    fn missing_mapr_is_invalid() {
        let mut bytes = b"UNIF".to_vec();
        bytes.resize(UNIF_HEADER_LEN, 0);
        bytes.extend(chunk(b"PRG0", &vec![0; 1024]));
        assert!(matches!(load(bytes), Err(Error::InvalidImage(_))));
    }
}
