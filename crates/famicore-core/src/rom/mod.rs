//! ROM image loading.
//!
//! All accepted formats (iNES 1.0, NES 2.0, UNIF, FDS, NSF) are translated
//! into one internal [`RomImage`] the board constructor consumes. FDS
//! images are converted to the raw on-media form here and converted back on
//! save; NSF files are rewritten into a synthetic cartridge around the
//! player ROM.

pub mod fds;
pub mod header;
pub mod ines;
pub mod nsf;
pub mod unif;

use crate::{
    cart::{bank::Mirroring, registry::BoardType},
    config::Config,
    error::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemType {
    Nes,
    PalNes,
    Famicom,
    VsUnisystem,
    Playchoice10,
}

/// A loaded, format-normalised ROM image.
#[derive(Debug, Clone)]
pub struct RomImage {
    /// Whole file contents (converted in place for FDS/NSF).
    pub buffer: Vec<u8>,
    /// Start of PRG (or disk) data within `buffer`.
    pub offset: usize,
    pub board_type: BoardType,
    pub prg_size: usize,
    pub chr_size: usize,
    pub wram_size: [usize; 2],
    pub vram_size: [usize; 2],
    pub mirroring: Mirroring,
    pub four_screen: bool,
    pub battery: bool,
    pub system: SystemType,
    pub submapper: u8,
    /// Raw side length for disk images, 0 otherwise.
    pub disk_side_size: usize,
    pub crc32: u32,
    pub trainer: Option<Vec<u8>>,
    /// FDS BIOS image, present only for disk images.
    pub bios: Option<Vec<u8>>,
}

impl RomImage {
    pub fn prg(&self) -> &[u8] {
        &self.buffer[self.offset..self.offset + self.prg_size]
    }

    pub fn chr(&self) -> &[u8] {
        let start = self.offset + self.prg_size;
        &self.buffer[start..start + self.chr_size]
    }

    pub fn is_disk(&self) -> bool {
        self.disk_side_size != 0
    }

    pub(crate) fn compute_crc(&mut self) {
        self.crc32 = crc32fast::hash(&self.buffer[self.offset..]);
    }
}

/// External images some formats need at load time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadResources<'a> {
    /// 8 KiB FDS BIOS.
    pub fds_bios: Option<&'a [u8]>,
    /// 4 KiB NSF player ROM.
    pub nsf_player: Option<&'a [u8]>,
}

/// Detect the container format and load `bytes` into a [`RomImage`].
pub fn load(bytes: Vec<u8>, res: &LoadResources<'_>, config: &Config) -> Result<RomImage, Error> {
    if bytes.len() >= 4 && bytes[..4] == [b'N', b'E', b'S', 0x1A] {
        return ines::load(bytes);
    }
    if bytes.len() >= 4 && bytes[..4] == *b"UNIF" {
        return unif::load(bytes);
    }
    if bytes.len() >= 5 && bytes[..5] == [b'N', b'E', b'S', b'M', 0x1A] {
        return nsf::load(bytes, res.nsf_player, config);
    }
    if fds::looks_like_disk_image(&bytes) {
        return fds::load(bytes, res.fds_bios);
    }
    Err(Error::InvalidImage("unrecognised ROM container".into()))
}
