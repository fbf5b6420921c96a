//! iNES / NES 2.0 container loading.

use tracing::debug;

use crate::{
    cart::registry::{BoardType, board_from_ines},
    error::Error,
    rom::{
        RomImage, SystemType,
        header::{ConsoleType, Header, TRAINER_SIZE, TvSystem},
    },
};

pub fn load(bytes: Vec<u8>) -> Result<RomImage, Error> {
    let header = Header::parse(&bytes)?;

    let board_type = board_from_ines(header.mapper, header.submapper, header.chr_rom_size)
        .ok_or_else(|| Error::UnsupportedMapper(format!("iNES mapper {}", header.mapper)))?;

    let offset = header.prg_offset();
    let needed = offset + header.prg_rom_size + header.chr_rom_size;
    if bytes.len() < needed {
        return Err(Error::InvalidImage(format!(
            "image truncated: expected {needed} bytes, got {}",
            bytes.len()
        )));
    }

    let trainer = header
        .trainer
        .then(|| bytes[16..16 + TRAINER_SIZE].to_vec());

    let system = match header.console {
        ConsoleType::VsUnisystem => SystemType::VsUnisystem,
        ConsoleType::Playchoice10 => SystemType::Playchoice10,
        _ => match header.tv_system {
            TvSystem::Pal => SystemType::PalNes,
            _ => SystemType::Nes,
        },
    };

    let board_type = if system == SystemType::VsUnisystem && board_type == BoardType::Nrom {
        BoardType::VsStandard
    } else {
        board_type
    };

    debug!(
        mapper = header.mapper,
        submapper = header.submapper,
        ?board_type,
        prg = header.prg_rom_size,
        chr = header.chr_rom_size,
        "loaded iNES image"
    );

    let mut rom = RomImage {
        offset,
        board_type,
        prg_size: header.prg_rom_size,
        chr_size: header.chr_rom_size,
        wram_size: [header.prg_ram_size.max(header.prg_nvram_size), 0],
        vram_size: [header.chr_ram_size.max(header.chr_nvram_size), 0],
        mirroring: header.mirroring,
        four_screen: header.four_screen,
        battery: header.battery,
        system,
        submapper: header.submapper,
        disk_side_size: 0,
        crc32: 0,
        trainer,
        bios: None,
        buffer: bytes,
    };
    rom.compute_crc();
    Ok(rom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::bank::Mirroring;

    fn image(prg_banks: u8, chr_banks: u8, flags6: u8) -> Vec<u8> {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        bytes.extend(vec![0xAA; usize::from(prg_banks) * 16 * 1024]);
        bytes.extend(vec![0x55; usize::from(chr_banks) * 8 * 1024]);
        bytes
    }

    #[test]
    fn loads_nrom_image() {
        let rom = load(image(1, 1, 0)).expect("load");
        assert_eq!(rom.board_type, BoardType::Nrom);
        assert_eq!(rom.prg().len(), 16 * 1024);
        assert_eq!(rom.chr().len(), 8 * 1024);
        assert_eq!(rom.mirroring, Mirroring::Horizontal);
    }

    #[test]
    fn unknown_mapper_fails_load() {
        // Mapper 5 (MMC5) is unsupported.
        let rom = load(image(1, 1, 0x50));
        assert!(matches!(rom, Err(Error::UnsupportedMapper(_))));
    }

    #[test]
    fn truncated_prg_fails_load() {
        let mut bytes = image(2, 0, 0);
        bytes.truncate(16 + 1024);
        assert!(matches!(load(bytes), Err(Error::InvalidImage(_))));
    }
}
