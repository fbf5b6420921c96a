//! Camerica boards: BF9093/BF9097 (plain + mirroring) and the outer-banked
//! BF9096 / Golden Five multicarts.

use crate::{cart::board::Board, cart::registry::BoardType, reset::ResetKind};

/// Outer-bank registers at `$8000-$BFFF`.
pub fn outer_bank(board: &mut Board, addr: u16, value: u8) {
    if board.kind() == BoardType::CamericaGoldenFive {
        if addr < 0xC000 {
            if value & 0x08 != 0 {
                let or = i32::from(value << 4) & 0x70;
                if board.prg_or != or {
                    board.prg_or = or;
                    board.sync_prg();
                }
            }
        } else {
            board.update_prg_bank(1, i32::from(value));
        }
        return;
    }

    // BF9096: bits 3-4 select a 64 KiB outer block.
    let or = i32::from((value >> 1) & 0x0C);
    if board.prg_or != or {
        board.prg_or = or;
        board.sync_prg();
    }
}

pub fn bf9096_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        // Boot into the last outer block, where the menu lives.
        board.prg_and = 0x03;
        board.prg_or = 0x0C;
    }
}

pub fn goldenfive_reset(board: &mut Board, kind: ResetKind) {
    if kind.is_hard() {
        board.prg_and = 0x0F;
        board.prg_or = 0x00;
    }
}

#[cfg(test)]
mod tests {
    use crate::{cart::board::Board, config::Config, emu::tests::NullHost, rom::ines};

    fn bf9096() -> Board {
        // Mapper 232, 256 KiB PRG.
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 16, 0, 0x80, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..16u8 {
            bytes.extend(vec![bank; 16 * 1024]);
        }
        let mut board =
            Board::new(ines::load(bytes).expect("load"), &Config::default()).expect("board");
        let mut host = NullHost::default();
        board.reset(crate::reset::ResetKind::PowerOn, &mut host);
        board
    }

    #[test]
    fn outer_block_masks_inner_banks() {
        let mut b = bf9096();
        let mut host = NullHost::default();
        // Power-on state points at the last block for the menu.
        assert_eq!(b.peek_cpu(0xC000), Some(15));

        b.cpu_write(0x8000, 0x08, 0, &mut host); // outer block 1 (banks 4-7)
        b.cpu_write(0xC000, 0x02, 0, &mut host); // inner bank 2
        assert_eq!(b.peek_cpu(0x8000), Some(6));
        assert_eq!(b.peek_cpu(0xC000), Some(7));
    }
}
