//! Core configuration.
//!
//! These are the runtime knobs the core consumes. Persistence and file
//! formats live outside the core; the host fills this struct however it
//! likes and hands it to [`crate::Emu::new`].

use crate::io::hub::FourPlayerMode;

/// Master clocks per CPU cycle (NTSC).
pub const NTSC_CPU_CLOCK_DIVIDER: u32 = 12;
/// Master clocks per frame (NTSC).
pub const NTSC_FRAME_LENGTH: u32 = 89_342 * 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub cpu_clock_divider: u32,
    pub frame_length: u32,

    // Controller behaviour ------------------------------------------------
    pub swap_a_b: bool,
    pub swap_start_select: bool,
    pub vs_swap_start_select: bool,
    pub vs_coin_on_start: bool,
    pub mask_opposite_directions: bool,
    /// Index into the turbo period table, 0-7.
    pub turbo_speed: u8,
    pub arkanoid_paddle2_connected: bool,

    pub four_player_mode: FourPlayerMode,

    // FDS ------------------------------------------------------------------
    pub fds_bios_patch_enabled: bool,
    pub fds_auto_disk_change_enabled: bool,
    pub fds_hide_license_screen: bool,
    pub fds_hide_bios_title_screen: bool,
    /// Emit IPS patches for dirty disk data instead of full images.
    pub fds_use_patch_for_saves: bool,

    // NSF -----------------------------------------------------------------
    /// 1-based first track override; 0 keeps the file's starting song.
    pub nsf_first_track: u8,

    // Quirks ---------------------------------------------------------------
    /// Enables quirk behaviour required by certain test ROMs.
    pub blargg_test_rom_hack: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_clock_divider: NTSC_CPU_CLOCK_DIVIDER,
            frame_length: NTSC_FRAME_LENGTH,
            swap_a_b: false,
            swap_start_select: false,
            vs_swap_start_select: false,
            vs_coin_on_start: false,
            mask_opposite_directions: true,
            turbo_speed: 3,
            arkanoid_paddle2_connected: false,
            four_player_mode: FourPlayerMode::Auto,
            fds_bios_patch_enabled: true,
            fds_auto_disk_change_enabled: true,
            fds_hide_license_screen: false,
            fds_hide_bios_title_screen: false,
            fds_use_patch_for_saves: true,
            nsf_first_track: 0,
            blargg_test_rom_hack: false,
        }
    }
}
