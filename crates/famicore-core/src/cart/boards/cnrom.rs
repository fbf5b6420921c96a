//! CNROM security variants.
//!
//! The security versions only pass CHR through when the written value
//! matches the lockout key; a mismatch leaves the pattern tables open-bus.

use crate::cart::{bank::BankKind, board::Board, registry::BoardType};

pub fn security(board: &mut Board, value: u8) {
    let enabled = match board.kind() {
        BoardType::CnromSecurity => {
            let value = value & 0x33;
            value & 0x0F != 0 && value != 0x13
        }
        BoardType::CnromSecurityBank0 => value & 0x03 == 0,
        BoardType::CnromSecurityBank1 => value & 0x03 == 1,
        BoardType::CnromSecurityBank2 => value & 0x03 == 2,
        BoardType::CnromSecurityBank3 => value & 0x03 == 3,
        _ => true,
    };
    if enabled {
        board.chr_banks0[0].kind = BankKind::Auto;
        board.chr_banks0[0].bank = i32::from(value);
    } else {
        board.chr_banks0[0].kind = BankKind::None;
    }
    board.sync_chr(0);
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn cnrom_security() -> Board {
        // Mapper 185.
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 2, 1, 0x90, 0xB0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        bytes.extend(vec![0xEA; 32 * 1024]);
        bytes.extend(vec![0x77; 8 * 1024]);
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn lockout_blanks_chr_until_the_key_matches() {
        let mut b = cnrom_security();
        let mut host = NullHost::default();
        b.cpu_write(0x8000, 0x10, 0, &mut host); // low nibble 0: locked
        assert_eq!(b.ppu_read(0x0000, 0), 0);
        b.cpu_write(0x8000, 0x21, 0, &mut host); // passes the check
        assert_eq!(b.ppu_read(0x0000, 0), 0x77);
    }
}
