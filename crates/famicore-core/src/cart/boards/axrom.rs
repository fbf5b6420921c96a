//! AxROM: 32 KiB PRG banking plus single-screen mirroring select.

use crate::cart::board::Board;

pub fn write(board: &mut Board, value: u8) {
    board.update_prg_bank(1, i32::from(value & 0x0F));
    board.standard_mirroring(value.into());
}

#[cfg(test)]
mod tests {
    use crate::{
        cart::bank::Mirroring, cart::board::Board, config::Config, emu::tests::NullHost,
        rom::ines,
    };

    fn axrom(prg_32k_banks: u8) -> Board {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, prg_32k_banks * 2, 0, 0x70, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        // Bank 0 reads as $FF so register writes from it survive the
        // bus-conflict AND; the other banks carry their index.
        bytes.extend(vec![0xFF; 32 * 1024]);
        for bank in 1..prg_32k_banks {
            bytes.extend(vec![bank; 32 * 1024]);
        }
        Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board")
    }

    #[test]
    fn bank_and_mirroring_share_the_register() {
        let mut b = axrom(4);
        let mut host = NullHost::default();
        b.cpu_write(0x8002, 0x12, 0, &mut host);
        assert_eq!(b.peek_cpu(0x8000), Some(2));
        assert_eq!(b.mirroring(), Mirroring::SingleB);

        // Bank 2 reads back its own index, so the next write is masked
        // down to the bits that survive ANDing with $02.
        b.cpu_write(0x8000, 0x02, 0, &mut host);
        assert_eq!(b.mirroring(), Mirroring::SingleA);
        assert_eq!(b.peek_cpu(0x8000), Some(2));
    }
}
