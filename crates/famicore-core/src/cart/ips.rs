//! Minimal IPS patch emission and application for dirty-save files.

use crate::error::Error;

const MAGIC: &[u8; 5] = b"PATCH";
const EOF_MARK: &[u8; 3] = b"EOF";

/// Build a patch from `(offset, data)` records. Offsets above the 24-bit
/// IPS limit are skipped with a warning; nothing in an NES-sized image
/// should ever get there.
pub fn build<'a>(records: impl IntoIterator<Item = (usize, &'a [u8])>) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    for (offset, data) in records {
        if data.is_empty() {
            continue;
        }
        if offset > 0xFF_FFFF {
            tracing::warn!(offset, "record beyond IPS offset range, skipping");
            continue;
        }
        for (chunk_index, chunk) in data.chunks(0xFFFF).enumerate() {
            let chunk_offset = offset + chunk_index * 0xFFFF;
            out.extend(&(chunk_offset as u32).to_be_bytes()[1..]);
            out.extend((chunk.len() as u16).to_be_bytes());
            out.extend(chunk);
        }
    }
    out.extend(EOF_MARK);
    out
}

/// Apply a patch in place; the image grows if a record extends past its
/// current end.
pub fn apply(image: &mut Vec<u8>, patch: &[u8]) -> Result<(), Error> {
    if patch.len() < MAGIC.len() + EOF_MARK.len() || &patch[..5] != MAGIC {
        return Err(Error::InvalidImage("not an IPS patch".into()));
    }
    let mut cursor = MAGIC.len();
    loop {
        let header = patch
            .get(cursor..cursor + 3)
            .ok_or_else(|| Error::InvalidImage("IPS patch truncated".into()))?;
        if header == EOF_MARK {
            return Ok(());
        }
        let offset = usize::from(header[0]) << 16 | usize::from(header[1]) << 8
            | usize::from(header[2]);
        let size_bytes = patch
            .get(cursor + 3..cursor + 5)
            .ok_or_else(|| Error::InvalidImage("IPS record truncated".into()))?;
        let size = usize::from(u16::from_be_bytes([size_bytes[0], size_bytes[1]]));
        cursor += 5;

        if size == 0 {
            // RLE record: u16 count + fill byte.
            let rle = patch
                .get(cursor..cursor + 3)
                .ok_or_else(|| Error::InvalidImage("IPS RLE record truncated".into()))?;
            let count = usize::from(u16::from_be_bytes([rle[0], rle[1]]));
            if image.len() < offset + count {
                image.resize(offset + count, 0);
            }
            image[offset..offset + count].fill(rle[2]);
            cursor += 3;
            continue;
        }

        let data = patch
            .get(cursor..cursor + size)
            .ok_or_else(|| Error::InvalidImage("IPS data truncated".into()))?;
        if image.len() < offset + size {
            image.resize(offset + size, 0);
        }
        image[offset..offset + size].copy_from_slice(data);
        cursor += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_apply_round_trip() {
        let original = vec![0u8; 64];
        let mut modified = original.clone();
        modified[10..14].copy_from_slice(&[1, 2, 3, 4]);
        modified[40] = 9;

        let patch = build([(10, &modified[10..14]), (40, &modified[40..41])]);
        let mut restored = original;
        apply(&mut restored, &patch).expect("apply");
        assert_eq!(restored, modified);
    }

    #[test]
    fn rejects_garbage() {
        let mut image = vec![0u8; 4];
        assert!(apply(&mut image, b"NOTAPATCH").is_err());
    }
}
