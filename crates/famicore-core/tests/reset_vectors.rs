//! Power-on sanity across the whole registry: after a hard reset with no
//! CPU writes, the reset vector must be readable from mapped memory.

mod common;

use common::{MockCpu, ines_image};
use famicore_core::{Board, Config, ResetKind, cart::registry, rom};

#[test]
fn every_ines_board_maps_the_reset_vector_at_power_on() {
    let mut covered = 0;
    for mapper in 0..=255u16 {
        for chr_banks in [0u8, 1] {
            if registry::board_from_ines(mapper, 0, usize::from(chr_banks) * 8192).is_none() {
                continue;
            }
            let image = ines_image(mapper, 16, chr_banks);
            let Ok(rom) = rom::ines::load(image) else {
                continue;
            };
            let board_type = rom.board_type;
            let mut board = Board::new(rom, &Config::default()).expect("board");
            let mut cpu = MockCpu::default();
            board.reset(ResetKind::PowerOn, &mut cpu);

            assert!(
                board.peek_cpu(0xFFFC).is_some() && board.peek_cpu(0xFFFD).is_some(),
                "{board_type:?} (mapper {mapper}) leaves the reset vector unmapped"
            );
            assert!(board.check_page_tables(), "{board_type:?} broken page tables");
            covered += 1;
        }
    }
    assert!(covered > 60, "registry coverage unexpectedly small: {covered}");
}
