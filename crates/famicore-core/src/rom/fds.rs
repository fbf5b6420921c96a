//! FDS disk image handling.
//!
//! Two container forms are accepted: "fds-with-header" (a 16-byte `FDS\x1a`
//! header followed by packed 65 500-byte sides) and headerless packed
//! sides. On load both are rewritten into the raw on-media form the drive
//! emulates: each side begins with a lead-in gap of zero bytes and then
//! carries `(start mark, block payload, CRC lo, CRC hi, gap)` groups. The
//! conversion back is an involution on valid images, so saves can be
//! emitted in the original container form.

use tracing::warn;

use crate::{
    cart::registry::BoardType,
    error::Error,
    rom::{RomImage, SystemType},
};
use crate::cart::bank::Mirroring;

/// Raw and packed sides share the same side length.
pub const SIDE_SIZE: usize = 65_500;
/// Lead-in gap before the first block (28 300 bit cells on hardware).
pub const LEAD_IN_GAP: usize = 3537;
/// Gap between blocks (976 bit cells on hardware).
pub const INTER_BLOCK_GAP: usize = 122;
/// Every block starts with this mark byte after a gap.
pub const START_MARK: u8 = 0x80;

pub const BLOCK_DISK_HEADER: u8 = 0x01;
pub const BLOCK_FILE_COUNT: u8 = 0x02;
pub const BLOCK_FILE_HEADER: u8 = 0x03;
pub const BLOCK_FILE_DATA: u8 = 0x04;

/// Payload length of the fixed-size block kinds (kind byte included).
pub const DISK_HEADER_LEN: usize = 56;
pub const FILE_COUNT_LEN: usize = 2;
pub const FILE_HEADER_LEN: usize = 16;

const FDS_MAGIC: [u8; 4] = [b'F', b'D', b'S', 0x1A];
const HVC_SIGNATURE: &[u8] = b"*NINTENDO-HVC*";

/// One block of a validated raw side.
#[derive(Debug, Clone, Copy)]
pub struct BlockListEntry {
    /// Absolute buffer offset of the start mark.
    pub offset: usize,
    /// Start mark plus payload; the two CRC bytes follow.
    pub size: usize,
    pub kind: u8,
    /// Scratch slot for the save path's output remapping.
    pub new_offset: usize,
}

pub fn looks_like_disk_image(bytes: &[u8]) -> bool {
    if bytes.len() >= 4 && bytes[..4] == FDS_MAGIC {
        return true;
    }
    // Headerless packed image: the disk-info block leads with its kind byte
    // and the console signature.
    bytes.len() >= 15 && bytes[0] == BLOCK_DISK_HEADER && &bytes[1..15] == HVC_SIGNATURE
}

/// Load a disk image, converting it to raw form.
pub fn load(bytes: Vec<u8>, bios: Option<&[u8]>) -> Result<RomImage, Error> {
    let bios = bios.ok_or(Error::MissingBios)?;
    if bios.len() != 8 * 1024 {
        return Err(Error::InvalidImage(format!(
            "FDS BIOS must be 8 KiB, got {}",
            bios.len()
        )));
    }

    let (buffer, offset) = convert_to_raw(bytes)?;
    let prg_size = buffer.len() - offset;

    let mut rom = RomImage {
        buffer,
        offset,
        board_type: BoardType::Fds,
        prg_size,
        chr_size: 0,
        wram_size: [32 * 1024, 0],
        vram_size: [8 * 1024, 0],
        mirroring: Mirroring::Horizontal,
        four_screen: false,
        battery: false,
        system: SystemType::Famicom,
        submapper: 0,
        disk_side_size: SIDE_SIZE,
        crc32: 0,
        trainer: None,
        bios: Some(bios.to_vec()),
    };
    rom.compute_crc();
    Ok(rom)
}

/// FDS drive CRC: a 16-bit serial LFSR clocked LSB-first, data entering at
/// bit 16. Feeding a complete block including its two stored CRC bytes
/// leaves a zero residue.
pub fn crc16_update(crc: u16, data: u8) -> u16 {
    let mut crc = u32::from(crc);
    let mut bit = 0x01u32;
    while bit <= 0x80 {
        if u32::from(data) & bit != 0 {
            crc |= 0x10000;
        }
        if crc & 1 != 0 {
            crc ^= 0x10810;
        }
        crc >>= 1;
        bit <<= 1;
    }
    (crc & 0xFFFF) as u16
}

/// CRC over a block as stored on disk: start mark, payload, then the two
/// flush bytes the drive shifts out.
pub fn block_crc(payload: &[u8]) -> u16 {
    let mut crc = crc16_update(0, START_MARK);
    for &byte in payload {
        crc = crc16_update(crc, byte);
    }
    crc = crc16_update(crc, 0);
    crc16_update(crc, 0)
}

/// Packed block sizes of one side, in order.
fn packed_block_sizes(side: &[u8]) -> Result<Vec<usize>, Error> {
    let mut sizes = Vec::new();
    let mut pos = 0usize;

    if side.first() != Some(&BLOCK_DISK_HEADER) {
        return Err(Error::InvalidImage("side does not start with a disk header".into()));
    }
    sizes.push(DISK_HEADER_LEN);
    pos += DISK_HEADER_LEN;

    if side.get(pos) != Some(&BLOCK_FILE_COUNT) {
        return Err(Error::InvalidImage("missing file-count block".into()));
    }
    let file_count = usize::from(*side.get(pos + 1).unwrap_or(&0));
    sizes.push(FILE_COUNT_LEN);
    pos += FILE_COUNT_LEN;

    for _ in 0..file_count {
        if side.get(pos) != Some(&BLOCK_FILE_HEADER) {
            // Some dumps under-count hidden files; stop at the last
            // well-formed block rather than rejecting the image.
            warn!("file header expected at {pos}, stopping block scan");
            break;
        }
        let data_size = usize::from(side[pos + 13]) | usize::from(side[pos + 14]) << 8;
        sizes.push(FILE_HEADER_LEN);
        pos += FILE_HEADER_LEN;

        if side.get(pos) != Some(&BLOCK_FILE_DATA) {
            return Err(Error::InvalidImage("file data block missing".into()));
        }
        sizes.push(1 + data_size);
        pos += 1 + data_size;
        if pos > side.len() {
            return Err(Error::InvalidImage("file data runs past end of side".into()));
        }
    }

    Ok(sizes)
}

/// Convert a packed image (with or without the 16-byte header) into raw
/// form. Returns the converted buffer and the offset of the first side.
pub fn convert_to_raw(bytes: Vec<u8>) -> Result<(Vec<u8>, usize), Error> {
    let has_header = bytes.len() >= 4 && bytes[..4] == FDS_MAGIC;
    let data_start = if has_header { 16 } else { 0 };
    let data = &bytes[data_start..];
    if data.is_empty() || data.len() % SIDE_SIZE != 0 {
        return Err(Error::InvalidImage(format!(
            "disk data must be a multiple of {SIDE_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut out = bytes[..data_start].to_vec();
    for side in data.chunks(SIDE_SIZE) {
        let sizes = packed_block_sizes(side)?;
        let mut raw = vec![0u8; SIDE_SIZE];
        let mut src = 0usize;
        let mut dst = LEAD_IN_GAP;
        for size in sizes {
            let needed = 1 + size + 2;
            if dst + needed > SIDE_SIZE {
                return Err(Error::InvalidImage(
                    "side content too large for raw form".into(),
                ));
            }
            let payload = &side[src..src + size];
            raw[dst] = START_MARK;
            raw[dst + 1..dst + 1 + size].copy_from_slice(payload);
            let crc = block_crc(payload);
            raw[dst + 1 + size] = (crc & 0xFF) as u8;
            raw[dst + 2 + size] = (crc >> 8) as u8;
            src += size;
            dst += needed + INTER_BLOCK_GAP;
        }
        out.extend(raw);
    }
    Ok((out, data_start))
}

/// Scan one raw side starting at `offset` into a block list.
pub fn validate_side(buffer: &[u8], offset: usize) -> Result<Vec<BlockListEntry>, Error> {
    let side = buffer
        .get(offset..offset + SIDE_SIZE)
        .ok_or_else(|| Error::InvalidImage("truncated disk side".into()))?;

    let mut entries = Vec::new();
    let mut pos = 0usize;
    let mut expected_files: Option<usize> = None;

    loop {
        while pos < SIDE_SIZE && side[pos] == 0 {
            pos += 1;
        }
        if pos >= SIDE_SIZE {
            break;
        }
        if side[pos] != START_MARK {
            return Err(Error::InvalidImage(format!(
                "expected start mark at side offset {pos}"
            )));
        }
        let kind = *side
            .get(pos + 1)
            .ok_or_else(|| Error::InvalidImage("start mark at end of side".into()))?;
        let payload_len = match kind {
            BLOCK_DISK_HEADER => DISK_HEADER_LEN,
            BLOCK_FILE_COUNT => {
                expected_files = Some(usize::from(*side.get(pos + 2).unwrap_or(&0)));
                FILE_COUNT_LEN
            }
            BLOCK_FILE_HEADER => FILE_HEADER_LEN,
            BLOCK_FILE_DATA => {
                // File size comes from the preceding header block.
                let header = entries
                    .iter()
                    .rev()
                    .find(|e: &&BlockListEntry| e.kind == BLOCK_FILE_HEADER)
                    .ok_or_else(|| {
                        Error::InvalidImage("file data block without file header".into())
                    })?;
                let size = usize::from(side[header.offset - offset + 14])
                    | usize::from(side[header.offset - offset + 15]) << 8;
                1 + size
            }
            other => {
                return Err(Error::InvalidImage(format!(
                    "unknown block kind {other:#04x} at side offset {pos}"
                )));
            }
        };
        if pos + 1 + payload_len + 2 > SIDE_SIZE {
            return Err(Error::InvalidImage("block runs past end of side".into()));
        }
        entries.push(BlockListEntry {
            offset: offset + pos,
            size: 1 + payload_len,
            kind,
            new_offset: 0,
        });
        pos += 1 + payload_len + 2;

        if let Some(files) = expected_files {
            let file_blocks = entries
                .iter()
                .filter(|e| e.kind == BLOCK_FILE_DATA)
                .count();
            if file_blocks >= files {
                break;
            }
        }
    }

    Ok(entries)
}

/// Block lists for every side of the image.
pub fn validate_image(rom: &RomImage) -> Result<Vec<BlockListEntry>, Error> {
    let mut entries = Vec::new();
    let side_count = rom.prg_size / SIDE_SIZE;
    for side in 0..side_count {
        entries.extend(validate_side(&rom.buffer, rom.offset + side * SIDE_SIZE)?);
    }
    Ok(entries)
}

/// Convert a raw image back to the packed container form it was loaded
/// from. Inverse of [`convert_to_raw`] on valid images.
pub fn convert_to_fds(rom: &RomImage) -> Result<Vec<u8>, Error> {
    let mut out = rom.buffer[..rom.offset].to_vec();
    let side_count = rom.prg_size / SIDE_SIZE;
    for side in 0..side_count {
        let offset = rom.offset + side * SIDE_SIZE;
        let entries = validate_side(&rom.buffer, offset)?;
        let mut packed = Vec::with_capacity(SIDE_SIZE);
        for entry in entries {
            let payload = &rom.buffer[entry.offset + 1..entry.offset + entry.size];
            packed.extend_from_slice(payload);
        }
        if packed.len() > SIDE_SIZE {
            return Err(Error::InvalidImage("side content exceeds side size".into()));
        }
        packed.resize(SIDE_SIZE, 0);
        out.extend(packed);
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) fn build_test_side(files: &[(u8, &[u8])]) -> Vec<u8> {
    // Packed side: disk header, file count, then header+data per file.
    let mut side = Vec::new();
    let mut header_block = vec![0u8; DISK_HEADER_LEN];
    header_block[0] = BLOCK_DISK_HEADER;
    header_block[1..15].copy_from_slice(HVC_SIGNATURE);
    header_block[15] = 0xE7; // manufacturer
    header_block[16..20].copy_from_slice(b"TST ");
    side.extend(header_block);
    side.extend([BLOCK_FILE_COUNT, files.len() as u8]);
    for (i, (id, data)) in files.iter().enumerate() {
        let mut file_header = vec![0u8; FILE_HEADER_LEN];
        file_header[0] = BLOCK_FILE_HEADER;
        file_header[1] = i as u8;
        file_header[2] = *id;
        file_header[13] = (data.len() & 0xFF) as u8;
        file_header[14] = (data.len() >> 8) as u8;
        side.extend(file_header);
        side.push(BLOCK_FILE_DATA);
        side.extend(*data);
    }
    side.resize(SIDE_SIZE, 0);
    side
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_of_stored_block_has_zero_residue() {
        let payload = [BLOCK_FILE_COUNT, 0x02];
        let crc = block_crc(&payload);

        let mut residue = crc16_update(0, START_MARK);
        for &byte in &payload {
            residue = crc16_update(residue, byte);
        }
        residue = crc16_update(residue, (crc & 0xFF) as u8);
        residue = crc16_update(residue, (crc >> 8) as u8);
        assert_eq!(residue, 0);
    }

    #[test]
    fn raw_fds_conversion_is_an_involution() {
        let mut image = b"FDS\x1a".to_vec();
        image.push(1);
        image.resize(16, 0);
        image.extend(build_test_side(&[(1, b"KYODAKU-"), (2, &[0xAA; 256])]));

        let (raw, offset) = convert_to_raw(image.clone()).expect("to raw");
        assert_eq!(offset, 16);
        let rom = RomImage {
            prg_size: raw.len() - offset,
            offset,
            buffer: raw,
            board_type: BoardType::Fds,
            chr_size: 0,
            wram_size: [0, 0],
            vram_size: [0, 0],
            mirroring: Mirroring::Horizontal,
            four_screen: false,
            battery: false,
            system: SystemType::Famicom,
            submapper: 0,
            disk_side_size: SIDE_SIZE,
            crc32: 0,
            trainer: None,
            bios: None,
        };
        let packed = convert_to_fds(&rom).expect("to fds");
        assert_eq!(packed, image);
    }

    #[test]
    fn validate_walks_all_blocks() {
        let (raw, offset) =
            convert_to_raw(build_test_side(&[(1, b"DATA"), (9, &[1, 2, 3])])).expect("raw");
        let entries = validate_side(&raw, offset).expect("validate");
        let kinds: Vec<u8> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BLOCK_DISK_HEADER,
                BLOCK_FILE_COUNT,
                BLOCK_FILE_HEADER,
                BLOCK_FILE_DATA,
                BLOCK_FILE_HEADER,
                BLOCK_FILE_DATA
            ]
        );
        assert_eq!(entries[0].offset, offset + LEAD_IN_GAP);
        assert_eq!(entries[0].size, 1 + DISK_HEADER_LEN);
    }

    #[test]
    fn missing_bios_is_a_clean_error() {
        let image = build_test_side(&[]);
        assert!(matches!(load(image, None), Err(Error::MissingBios)));
    }
}
