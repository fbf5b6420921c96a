//! Cheat code codecs.
//!
//! The cheat engine itself lives outside the core; what belongs here is
//! the set of wire formats a cheat can arrive in, decoded to
//! `(address, value, optional compare)` triples, plus the encoders that
//! round-trip with them. Accepted formats: raw `AAAA:VV[:CC]`, Game Genie
//! 6/8-letter codes, Pro Action Rocky 32-bit codes, FCEUX, VirtuaNES and
//! the native line format.

use crate::error::Error;

/// A decoded cheat: patch `address` to `value`, optionally only when the
/// original byte equals `compare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cheat {
    pub address: u16,
    pub value: u8,
    pub compare: Option<u8>,
    pub description: Option<String>,
    pub enabled: bool,
}

impl Cheat {
    fn new(address: u16, value: u8, compare: Option<u8>) -> Self {
        Self {
            address,
            value,
            compare,
            description: None,
            enabled: true,
        }
    }
}

const GAME_GENIE_ALPHABET: &[u8; 16] = b"APZLGITYEOXUKSVN";

const ROCKY_INIT_MAGIC: u32 = 0xFCBD_D275;
const ROCKY_XOR_MAGIC: u32 = 0xB830_9722;
/// Bit scatter order of the Pro Action Rocky permutation.
const ROCKY_SHIFTS: [u32; 31] = [
    3, 13, 14, 1, 6, 9, 5, 0, 12, 7, 2, 8, 10, 11, 4, 19, 21, 23, 22, 20, 17, 16, 18, 29, 31,
    24, 26, 25, 30, 27, 28,
];

/// Parse any accepted single-code format (no description payload).
pub fn parse_code(code: &str) -> Result<Cheat, Error> {
    let code = code.trim();
    parse_raw(code)
        .or_else(|_| parse_game_genie(code))
        .or_else(|_| parse_rocky(code))
        .map_err(|_| Error::InvalidImage(format!("unrecognised cheat code {code}")))
}

/// Parse a configuration line in any of the accepted file formats.
pub fn parse_line(line: &str) -> Result<Cheat, Error> {
    let line = line.trim();
    parse_native_line(line)
        .or_else(|_| parse_fceux_line(line))
        .or_else(|_| parse_virtuanes_line(line))
        .or_else(|_| parse_code(line))
}

// Raw ------------------------------------------------------------------------

/// `AAAA:VV[:CC]` (`-` accepted as a separator as well).
pub fn parse_raw(code: &str) -> Result<Cheat, Error> {
    let mut parts = code.split([':', '-']);
    let addr = parts
        .next()
        .and_then(|p| u16::from_str_radix(p, 16).ok())
        .ok_or_else(|| bad(code))?;
    let value = parts
        .next()
        .and_then(|p| u8::from_str_radix(p, 16).ok())
        .ok_or_else(|| bad(code))?;
    let compare = match parts.next() {
        Some(p) => Some(u8::from_str_radix(p, 16).map_err(|_| bad(code))?),
        None => None,
    };
    if parts.next().is_some() {
        return Err(bad(code));
    }
    Ok(Cheat::new(addr, value, compare))
}

// Game Genie -----------------------------------------------------------------

/// 6- or 8-letter codes over the APZLGITYEOXUKSVN alphabet.
pub fn parse_game_genie(code: &str) -> Result<Cheat, Error> {
    let mut nibbles = Vec::with_capacity(8);
    for c in code.chars() {
        if c == '-' {
            continue;
        }
        let nibble = GAME_GENIE_ALPHABET
            .iter()
            .position(|&a| a == c.to_ascii_uppercase() as u8)
            .ok_or_else(|| bad(code))? as u16;
        nibbles.push(nibble);
    }
    if nibbles.len() != 6 && nibbles.len() != 8 {
        return Err(bad(code));
    }
    let n = &nibbles;

    let mut address = (n[3] & 7) << 12 | (n[5] & 7) << 8 | (n[4] & 8) << 8 | (n[2] & 7) << 4
        | (n[1] & 8) << 4
        | (n[4] & 7)
        | (n[3] & 8);
    address += 0x8000;

    let mut value = (n[1] & 7) << 4 | (n[0] & 8) << 4 | (n[0] & 7);
    let compare = if n.len() == 6 {
        value |= n[5] & 8;
        None
    } else {
        value |= n[7] & 8;
        Some(((n[7] & 7) << 4 | (n[6] & 8) << 4 | (n[6] & 7) | (n[5] & 8)) as u8)
    };

    Ok(Cheat::new(address, value as u8, compare))
}

/// Inverse of [`parse_game_genie`]; addresses below `$8000` have no
/// encoding.
pub fn encode_game_genie(cheat: &Cheat) -> Option<String> {
    if cheat.address < 0x8000 {
        return None;
    }
    let address = cheat.address - 0x8000;
    let value = u16::from(cheat.value);
    let mut code = [0u16; 8];
    let length = if cheat.compare.is_some() { 8 } else { 6 };

    code[3] |= (address & 0x7000) >> 12;
    code[3] |= address & 0x0008;
    code[5] |= (address & 0x0700) >> 8;
    code[4] |= (address & 0x0800) >> 8;
    code[4] |= address & 0x0007;
    code[2] |= (address & 0x0070) >> 4;
    if length == 8 {
        code[2] |= 0x08;
    }
    code[1] |= (address & 0x0080) >> 4;
    code[1] |= (value & 0x70) >> 4;
    code[0] |= (value & 0x80) >> 4;
    code[0] |= value & 0x07;

    if let Some(compare) = cheat.compare {
        let compare = u16::from(compare);
        code[7] |= value & 0x08;
        code[7] |= (compare & 0x70) >> 4;
        code[6] |= (compare & 0x80) >> 4;
        code[6] |= compare & 0x07;
        code[5] |= compare & 0x08;
    } else {
        code[5] |= value & 0x08;
    }

    Some(
        code[..length]
            .iter()
            .map(|&nibble| GAME_GENIE_ALPHABET[nibble as usize] as char)
            .collect(),
    )
}

// Pro Action Rocky -----------------------------------------------------------

pub fn decode_rocky(code: u32) -> Cheat {
    let mut result = 0u32;
    let mut decode = ROCKY_INIT_MAGIC;
    let mut code = code;
    for i in (1..32).rev() {
        if (code ^ decode) & 0x8000_0000 != 0 {
            result |= 1 << ROCKY_SHIFTS[i - 1];
            decode ^= ROCKY_XOR_MAGIC;
        }
        decode <<= 1;
        code <<= 1;
    }

    let address = ((result & 0x7FFF) | 0x8000) as u16;
    let compare = ((result >> 16) & 0xFF) as u8;
    let value = ((result >> 24) & 0xFF) as u8;
    Cheat::new(address, value, Some(compare))
}

pub fn parse_rocky(code: &str) -> Result<Cheat, Error> {
    if code.len() != 8 {
        return Err(bad(code));
    }
    let value = u32::from_str_radix(code, 16).map_err(|_| bad(code))?;
    Ok(decode_rocky(value))
}

/// Inverse of [`decode_rocky`]; requires a compare byte.
pub fn encode_rocky(cheat: &Cheat) -> Option<u32> {
    let compare = cheat.compare?;
    if cheat.address < 0x8000 {
        return None;
    }
    let address = u32::from(cheat.address) & 0x7FFF;
    let code = address | u32::from(compare) << 16 | u32::from(cheat.value) << 24;

    let mut decode = ROCKY_INIT_MAGIC.wrapping_sub(1);
    let mut result = 0u32;
    for i in (1..32).rev() {
        let bit = code >> ROCKY_SHIFTS[i - 1] & 1;
        result |= ((decode >> 31) ^ bit) << i;
        if bit != 0 {
            decode ^= ROCKY_XOR_MAGIC;
        }
        decode <<= 1;
    }
    Some(result)
}

// Line formats ---------------------------------------------------------------

/// Native `E AAAA:VV[:CC] desc` / `D ...` lines (E = enabled).
pub fn parse_native_line(line: &str) -> Result<Cheat, Error> {
    let (flag, rest) = line.split_once(char::is_whitespace).ok_or_else(|| bad(line))?;
    let enabled = match flag {
        "E" | "e" => true,
        "D" | "d" => false,
        _ => return Err(bad(line)),
    };
    let rest = rest.trim_start();
    let (code, description) = match rest.split_once(char::is_whitespace) {
        Some((code, desc)) => (code, Some(desc.trim().to_string())),
        None => (rest, None),
    };
    let mut cheat = parse_code(code)?;
    cheat.enabled = enabled;
    cheat.description = description;
    Ok(cheat)
}

/// FCEUX `S?C?:AAAA:VV[:CC]:desc` lines.
pub fn parse_fceux_line(line: &str) -> Result<Cheat, Error> {
    let mut rest = line;
    let mut enabled = true;
    // Leading flags: S = substitute (ROM patch), SC = with compare;
    // a leading ':' marks a disabled cheat.
    if let Some(tail) = rest.strip_prefix(':') {
        enabled = false;
        rest = tail;
    }
    rest = rest.strip_prefix(['S', 's']).unwrap_or(rest);
    rest = rest.strip_prefix(['C', 'c']).unwrap_or(rest);
    let rest = rest.strip_prefix(':').ok_or_else(|| bad(line))?;

    let mut parts = rest.splitn(4, ':');
    let addr = parts
        .next()
        .and_then(|p| u16::from_str_radix(p, 16).ok())
        .ok_or_else(|| bad(line))?;
    let value = parts
        .next()
        .and_then(|p| u8::from_str_radix(p, 16).ok())
        .ok_or_else(|| bad(line))?;
    let (compare, description) = match parts.next() {
        None => (None, None),
        Some(field) => match u8::from_str_radix(field, 16) {
            Ok(compare) => (Some(compare), parts.next().map(|d| d.trim().to_string())),
            Err(_) => (None, Some(field.trim().to_string())),
        },
    };

    let mut cheat = Cheat::new(addr, value, compare);
    cheat.enabled = enabled;
    cheat.description = description;
    Ok(cheat)
}

/// VirtuaNES `#E AAAA-VV[-CC] desc` lines.
pub fn parse_virtuanes_line(line: &str) -> Result<Cheat, Error> {
    let rest = line.strip_prefix('#').ok_or_else(|| bad(line))?;
    let (flag, rest) = rest.split_once(char::is_whitespace).ok_or_else(|| bad(line))?;
    let enabled = flag.eq_ignore_ascii_case("E");
    let rest = rest.trim_start();
    let (code, description) = match rest.split_once(char::is_whitespace) {
        Some((code, desc)) => (code, Some(desc.trim().to_string())),
        None => (rest, None),
    };
    let mut cheat = parse_raw(code)?;
    cheat.enabled = enabled;
    cheat.description = description;
    Ok(cheat)
}

fn bad(code: &str) -> Error {
    Error::InvalidImage(format!("bad cheat code {code}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn decodes_known_game_genie_codes() {
        // The classic infinite-lives code: letter values scatter to
        // $91D9:AD under the published decoding.
        let six = parse_game_genie("SXIOPO").expect("decode");
        assert_eq!(six.address, 0x91D9);
        assert_eq!(six.value, 0xAD);
        assert_eq!(six.compare, None);

        // The 8-letter form of the same patch with a compare byte keeps
        // the address and value intact.
        let eight = Cheat::new(0x91D9, 0xAD, Some(0x05));
        let code = encode_game_genie(&eight).expect("encode");
        let decoded = parse_game_genie(&code).expect("decode");
        assert_eq!(decoded.address, 0x91D9);
        assert_eq!(decoded.value, 0xAD);
        assert_eq!(decoded.compare, Some(0x05));
    }

    #[test]
    fn game_genie_round_trips() {
        let mut rng = rand::rng();
        for _ in 0..512 {
            let cheat = Cheat::new(
                rng.random_range(0x8000..=0xFFFF),
                rng.random(),
                rng.random::<bool>().then(|| rng.random()),
            );
            let code = encode_game_genie(&cheat).expect("encode");
            let decoded = parse_game_genie(&code).expect("decode");
            assert_eq!(decoded.address, cheat.address, "code {code}");
            assert_eq!(decoded.value, cheat.value, "code {code}");
            assert_eq!(decoded.compare, cheat.compare, "code {code}");
            // And letter-for-letter.
            assert_eq!(encode_game_genie(&decoded).as_deref(), Some(code.as_str()));
        }
    }

    #[test]
    fn rocky_round_trips() {
        let mut rng = rand::rng();
        for _ in 0..512 {
            // The permutation never consumes bit 0 of the wire code, so the
            // canonical form keeps it clear.
            let code: u32 = rng.random::<u32>() & !1;
            let cheat = decode_rocky(code);
            assert_eq!(encode_rocky(&cheat), Some(code));
        }
        // Decoding an encoded triple is exact either way.
        for _ in 0..512 {
            let cheat = Cheat::new(
                rng.random_range(0x8000..=0xFFFF),
                rng.random(),
                Some(rng.random()),
            );
            let code = encode_rocky(&cheat).expect("encode");
            let decoded = decode_rocky(code);
            assert_eq!((decoded.address, decoded.value, decoded.compare),
                (cheat.address, cheat.value, cheat.compare));
        }
    }

    #[test]
    fn parses_raw_and_line_formats() {
        let raw = parse_raw("94A7:03:05").expect("raw");
        assert_eq!((raw.address, raw.value, raw.compare), (0x94A7, 3, Some(5)));

        let native = parse_line("E 94A7:03 infinite lives").expect("native");
        assert!(native.enabled);
        assert_eq!(native.description.as_deref(), Some("infinite lives"));

        let fceux = parse_line("SC:94A7:03:05:slow motion").expect("fceux");
        assert_eq!(fceux.compare, Some(5));
        assert_eq!(fceux.description.as_deref(), Some("slow motion"));

        let virtuanes = parse_line("#E 94A7-03-05 something").expect("virtuanes");
        assert!(virtuanes.enabled);
        assert_eq!(virtuanes.compare, Some(5));
    }
}
