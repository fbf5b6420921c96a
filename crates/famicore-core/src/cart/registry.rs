//! The board registry: one immutable entry per supported cartridge variant.
//!
//! At load time the entry for the detected board is cloned into the live
//! cartridge state as its initial configuration; handlers then mutate the
//! clone. Detection goes through the iNES mapper table or the UNIF name
//! table; unknown boards fail the load.

use bitflags::bitflags;

use crate::{
    cart::{
        bank::{self, Bank, BankKind, Mirroring, Perms},
        handlers::{ReadHandler, ReadHandlerRange, WriteHandler, WriteHandlerRange, rh, wh},
    },
    memory::sizes::*,
};

/// Every cartridge variant the core knows how to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardType {
    Nrom,

    Uxrom,
    UxromNoConflict,
    Un1rom,
    Unrom74hc08,
    UxromProWrestling,

    Cnrom,
    CnromNoConflict,
    NamcoCnromWram,
    CnromSecurity,
    CnromSecurityBank0,
    CnromSecurityBank1,
    CnromSecurityBank2,
    CnromSecurityBank3,

    Axrom,
    AxromNoConflict,
    Bnrom,
    Nina001,
    ColorDreams,
    Agci50282,
    Gxrom,
    Cprom,

    CamericaBf9093,
    CamericaBf9097,
    CamericaBf9096,
    CamericaGoldenFive,

    Sxrom,
    SxromWram,
    SeromShrom,
    Snrom,
    Sorom,
    Surom,
    SXrom,
    SxromMmc1a,
    SxromCompat,
    Event,

    Mmc2,
    Mmc4,

    Txrom,
    Txsrom,
    Tqrom,
    Hkrom,

    Namco108,
    Namco88,
    Namco95,
    Namco154,

    Sunsoft1,
    Sunsoft2,
    Sunsoft4,

    IremG101,
    IremG101B,
    IremTamS1,
    Irem74x161,

    JalecoJf16,
    Discrete74x139,
    Discrete74x161,
    Discrete74x161Mirror,

    Vrc1,
    Ntdec112,
    Ntdec193,

    Sachen8259A,
    Sachen8259B,
    Sachen8259C,
    Sachen8259D,
    Sachen72007,
    Sachen72008,
    Sachen74x374A,
    Sachen74x374B,

    Caltron6in1,
    RcmGs2015,
    InlNsf,
    SingleChip,
    Action52,
    Maxi15,

    Bmc20in1,
    Bmc22in1,
    Bmc35in1,
    Bmc76in1,
    Bmc150in1,
    Bmc110in1,
    BmcN625092,
    Contra100in1,
    Super700in1,
    Ines201,
    Ines225,

    VsStandard,
    VsRbiBaseball,
    VsTkoBoxing,
    VsSuperXevious,

    Fds,
    NsfPlayer,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BoardFlags: u16 {
        /// Mirroring is mapper-controlled (via the lookup table or the
        /// nametable descriptors directly).
        const MIRROR_M = 0x0001;
        /// Dirty PRG data saves as an IPS patch (FDS).
        const PRG_IPS = 0x0002;
        /// Board carries an M2 cycle timer.
        const M2_TIMER = 0x0004;
        /// WRAM chip 0 is non-volatile.
        const WRAM0_NV = 0x0008;
        /// WRAM chip 1 is non-volatile.
        const WRAM1_NV = 0x0010;
        /// Writes to ROM space see bus-conflict AND with the ROM byte.
        const BUS_CONFLICT = 0x0020;
        /// Board wants the PPU address-bus hook (CHR latches, A12 IRQs).
        const PPU_HOOK = 0x0040;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoardInfo {
    pub board_type: BoardType,
    pub name: &'static str,
    pub mapper_name: &'static str,
    pub init_prg: &'static [Bank],
    pub init_chr0: &'static [Bank],
    pub init_chr1: &'static [Bank],
    pub read_handlers: &'static [ReadHandlerRange],
    pub write_handlers: &'static [WriteHandlerRange],
    pub max_prg_rom: usize,
    pub max_chr_rom: usize,
    pub min_wram: [usize; 2],
    pub max_wram: [usize; 2],
    pub min_vram: [usize; 2],
    pub max_vram: [usize; 2],
    pub mapper_ram_size: usize,
    pub mirroring_values: &'static [Mirroring],
    pub mirroring_shift: u32,
    pub flags: BoardFlags,
}

const DEF: BoardInfo = BoardInfo {
    board_type: BoardType::Nrom,
    name: "",
    mapper_name: "",
    init_prg: bank::STD_PRG_32K,
    init_chr0: bank::STD_CHR_8K,
    init_chr1: &[],
    read_handlers: &[],
    write_handlers: &[],
    max_prg_rom: SIZE_32K,
    max_chr_rom: SIZE_8K,
    min_wram: [0, 0],
    max_wram: [SIZE_8K, 0],
    min_vram: [0, 0],
    max_vram: [SIZE_8K, 0],
    mapper_ram_size: 0,
    mirroring_values: &[],
    mirroring_shift: 0,
    flags: BoardFlags::empty(),
};

// Shared handler range tables ------------------------------------------------

static PRG_LATCH: &[WriteHandlerRange] = &[wh(WriteHandler::SimplePrg, 0x8000, 0x8000, 0)];
static PRG_LATCH_NC: &[WriteHandlerRange] =
    &[wh(WriteHandler::SimplePrgNoConflict, 0x8000, 0x8000, 0)];
static CHR_LATCH: &[WriteHandlerRange] = &[wh(WriteHandler::SimpleChr, 0x8000, 0x8000, 0)];
static CHR_LATCH_NC: &[WriteHandlerRange] =
    &[wh(WriteHandler::SimpleChrNoConflict, 0x8000, 0x8000, 0)];

static MMC1_HANDLERS: &[WriteHandlerRange] = &[wh(WriteHandler::Mmc1, 0x8000, 0x8000, 0)];
static MMC2_HANDLERS: &[WriteHandlerRange] = &[
    wh(WriteHandler::Mmc2, 0xA000, 5 * 0x1000, 0xF000),
    wh(WriteHandler::StandardMirroring, 0xF000, 0x1000, 0),
];
static MMC3_HANDLERS: &[WriteHandlerRange] = &[wh(WriteHandler::Mmc3, 0x8000, 0x8000, 0xE001)];
static NAMCO108_HANDLERS: &[WriteHandlerRange] =
    &[wh(WriteHandler::Namco108, 0x8000, 0x8000, 0x8001)];
static CNROM_SECURITY_HANDLERS: &[WriteHandlerRange] =
    &[wh(WriteHandler::CnromSecurity, 0x8000, 0x8000, 0)];
static SACHEN_8259_HANDLERS: &[WriteHandlerRange] = &[
    wh(WriteHandler::Sachen8259, 0x4100, 0x800, 0xC101),
    wh(WriteHandler::Sachen8259, 0x4101, 0x800, 0xC101),
];
static SACHEN_8259D_HANDLERS: &[WriteHandlerRange] = &[
    wh(WriteHandler::Sachen8259, 0x4000, 0x800, 0xC101),
    wh(WriteHandler::Sachen8259, 0x4001, 0x800, 0xC101),
    wh(WriteHandler::Sachen8259, 0x4100, 0x800, 0xC101),
    wh(WriteHandler::Sachen8259, 0x4101, 0x800, 0xC101),
];
static SACHEN_374_WRITE_HANDLERS: &[WriteHandlerRange] = &[
    wh(WriteHandler::Sachen74x374, 0x4100, 0x800, 0xC101),
    wh(WriteHandler::Sachen74x374, 0x4101, 0x800, 0xC101),
];
static SACHEN_374_READ_HANDLERS: &[ReadHandlerRange] =
    &[rh(ReadHandler::Sachen374, 0x4100, 0x1E00, 0)];
static MAXI15_READ_HANDLERS: &[ReadHandlerRange] = &[
    rh(ReadHandler::Maxi15, 0xFF80, 32, 0),
    rh(ReadHandler::Maxi15, 0xFFE7, 16, 0),
];

static FDS_WRITE_HANDLERS: &[WriteHandlerRange] = &[wh(WriteHandler::Fds, 0x4020, 16, 0)];
static FDS_READ_HANDLERS: &[ReadHandlerRange] = &[
    rh(ReadHandler::FdsStatus, 0x4030, 7, 0),
    rh(ReadHandler::FdsBios, 0xE000, 0x2000, 0),
];

static VS_5E00_READ_HANDLERS: &[ReadHandlerRange] =
    &[rh(ReadHandler::VsProtection, 0x5E00, 2, 0)];
static VS_XEVIOUS_READ_HANDLERS: &[ReadHandlerRange] = &[
    rh(ReadHandler::VsProtection, 0x54FF, 1, 0),
    rh(ReadHandler::VsProtection, 0x5567, 1, 0),
    rh(ReadHandler::VsProtection, 0x5678, 1, 0),
    rh(ReadHandler::VsProtection, 0x578F, 1, 0),
];

// Board-specific init templates ---------------------------------------------

const fn b(
    bank_index: i32,
    shift: u32,
    size: usize,
    address: u16,
    perms: Perms,
    kind: BankKind,
) -> Bank {
    bank::bank(bank_index, shift, size, address, perms, kind)
}

/// MMC1 with the extra 32 KiB outer-bank slot used by NES-EVENT and
/// SEROM-style boards.
static EVENT_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
    b(0xF, 0, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
    b(0, 0, 0, 0x8000, Perms::Read, BankKind::Rom),
];

static UN1ROM_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 2, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
    b(-1, 2, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
];

/// UNROM+74HC08 fixes the *first* bank at `$C000` and switches `$8000`.
static UNROM_74HC08_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
    b(0, 0, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
];

/// MMC2: one switchable 8 KiB window, three fixed at the end of ROM.
static MMC2_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_8K, 0x8000, Perms::Read, BankKind::Rom),
    b(-3, 0, SIZE_8K, 0xA000, Perms::Read, BankKind::Rom),
    b(-2, 0, SIZE_8K, 0xC000, Perms::Read, BankKind::Rom),
    b(-1, 0, SIZE_8K, 0xE000, Perms::Read, BankKind::Rom),
];

/// MMC2/MMC4 CHR: per 4 KiB half, a `$FD` and a `$FE` candidate window
/// with only one active at a time.
static MMC2_INIT_CHR: &[Bank] = &[
    b(0, 0, 0, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_4K, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, 0, 0x1000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_4K, 0x1000, Perms::ReadWrite, BankKind::Auto),
];

/// Namco 3433/3453/3425 split-CHR layout: 2 KiB windows stay in the low
/// 64 KiB half, 1 KiB windows force CHR A16 high.
static NAMCO_SPLIT_INIT_CHR: &[Bank] = &[
    b(0, 1, SIZE_2K, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(0, 1, SIZE_2K, 0x0800, Perms::ReadWrite, BankKind::Auto),
    b(0x40, 0, SIZE_1K, 0x1000, Perms::ReadWrite, BankKind::Auto),
    b(0x40, 0, SIZE_1K, 0x1400, Perms::ReadWrite, BankKind::Auto),
    b(0x40, 0, SIZE_1K, 0x1800, Perms::ReadWrite, BankKind::Auto),
    b(0x40, 0, SIZE_1K, 0x1C00, Perms::ReadWrite, BankKind::Auto),
];

/// 74*139/74 boards have no WRAM window; the registers live there.
static PRG_32K_NO_WRAM: &[Bank] = &[b(0, 0, SIZE_32K, 0x8000, Perms::Read, BankKind::Rom)];

/// Irem 74*161/161/21/138: 2 KiB of CHR ROM for tiles, VRAM above it, two
/// VRAM nametables.
static IREM_74X161_INIT_CHR: &[Bank] = &[
    b(0, 0, SIZE_2K, 0x0000, Perms::Read, BankKind::Rom),
    b(2, 0, SIZE_1K, 0x0800, Perms::ReadWrite, BankKind::Vram0),
    b(3, 0, SIZE_1K, 0x0C00, Perms::ReadWrite, BankKind::Vram0),
    b(4, 0, SIZE_1K, 0x1000, Perms::ReadWrite, BankKind::Vram0),
    b(5, 0, SIZE_1K, 0x1400, Perms::ReadWrite, BankKind::Vram0),
    b(6, 0, SIZE_1K, 0x1800, Perms::ReadWrite, BankKind::Vram0),
    b(7, 0, SIZE_1K, 0x1C00, Perms::ReadWrite, BankKind::Vram0),
];

static IREM_TAM_S1_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(-1, 0, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
    b(0, 0, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
];

static NTDEC193_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x8000, Perms::Read, BankKind::Rom),
    b(-3, 0, SIZE_8K, 0xA000, Perms::Read, BankKind::Rom),
    b(-2, 0, SIZE_8K, 0xC000, Perms::Read, BankKind::Rom),
    b(-1, 0, SIZE_8K, 0xE000, Perms::Read, BankKind::Rom),
];

static NTDEC193_INIT_CHR: &[Bank] = &[
    b(0, 2, SIZE_4K, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(0, 1, SIZE_2K, 0x1000, Perms::ReadWrite, BankKind::Auto),
    b(0, 1, SIZE_2K, 0x1800, Perms::ReadWrite, BankKind::Auto),
];

/// Sachen 8259 A/B/C: four 2 KiB windows plus three disabled "simple
/// mode" shadows that follow window 0.
static SACHEN_8259_INIT_CHR: &[Bank] = &[
    b(0, 0, SIZE_2K, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(1, 0, SIZE_2K, 0x0800, Perms::ReadWrite, BankKind::Auto),
    b(2, 0, SIZE_2K, 0x1000, Perms::ReadWrite, BankKind::Auto),
    b(3, 0, SIZE_2K, 0x1800, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, 0, 0x0800, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, 0, 0x1000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, 0, 0x1800, Perms::ReadWrite, BankKind::Auto),
];

static SACHEN_8259D_INIT_CHR: &[Bank] = &[
    b(0, 0, SIZE_1K, 0x0000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_1K, 0x0400, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_1K, 0x0800, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_1K, 0x0C00, Perms::ReadWrite, BankKind::Auto),
    b(-1, 0, SIZE_4K, 0x1000, Perms::ReadWrite, BankKind::Auto),
];

/// 22-in-1: separate descriptor groups for the Contra half and the two
/// multicart modes; resets toggle which group is live.
static BMC22IN1_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
    b(7, 0, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
    b(0, 1, 0, 0x8000, Perms::Read, BankKind::Rom),
    b(0, 0, 0, 0x8000, Perms::Read, BankKind::Rom),
    b(0, 0, 0, 0xC000, Perms::Read, BankKind::Rom),
];

static N625092_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_16K, 0x8000, Perms::Read, BankKind::Rom),
    b(0, 0, SIZE_16K, 0xC000, Perms::Read, BankKind::Rom),
];

static CONTRA100IN1_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_8K, 0x6000, Perms::ReadWrite, BankKind::Auto),
    b(0, 0, SIZE_8K, 0x8000, Perms::Read, BankKind::Rom),
    b(1, 0, SIZE_8K, 0xA000, Perms::Read, BankKind::Rom),
    b(2, 0, SIZE_8K, 0xC000, Perms::Read, BankKind::Rom),
    b(3, 0, SIZE_8K, 0xE000, Perms::Read, BankKind::Rom),
];

static FDS_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_32K, 0x6000, Perms::ReadWrite, BankKind::Wram0),
    b(-1, 0, SIZE_8K, 0xE000, Perms::Read, BankKind::Bios),
];

/// NSF player: 4 KiB PRG-RAM banks across `$6000-$FFFF`, player ROM on top.
static NSF_INIT_PRG: &[Bank] = &[
    b(0, 0, SIZE_4K, 0x6000, Perms::ReadWrite, BankKind::Wram1),
    b(1, 0, SIZE_4K, 0x7000, Perms::ReadWrite, BankKind::Wram1),
    b(2, 0, SIZE_4K, 0x8000, Perms::ReadWrite, BankKind::Wram1),
    b(3, 0, SIZE_4K, 0x9000, Perms::ReadWrite, BankKind::Wram1),
    b(4, 0, SIZE_4K, 0xA000, Perms::ReadWrite, BankKind::Wram1),
    b(5, 0, SIZE_4K, 0xB000, Perms::ReadWrite, BankKind::Wram1),
    b(6, 0, SIZE_4K, 0xC000, Perms::ReadWrite, BankKind::Wram1),
    b(7, 0, SIZE_4K, 0xD000, Perms::ReadWrite, BankKind::Wram1),
    b(8, 0, SIZE_4K, 0xE000, Perms::ReadWrite, BankKind::Wram1),
    b(9, 0, SIZE_4K, 0xF000, Perms::ReadWrite, BankKind::Wram1),
    b(0, 0, SIZE_4K, 0xE000, Perms::Read, BankKind::Rom),
];

// The registry ---------------------------------------------------------------

pub static BOARDS: &[BoardInfo] = &[
    BoardInfo {
        board_type: BoardType::Nrom,
        name: "NROM",
        ..DEF
    },
    // UxROM family ---------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Uxrom,
        name: "UxROM",
        init_prg: bank::STD_PRG_16K,
        write_handlers: PRG_LATCH,
        max_prg_rom: SIZE_4096K,
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::UxromNoConflict,
        name: "UxROM-NO-CONFLICT",
        init_prg: bank::STD_PRG_16K,
        write_handlers: PRG_LATCH_NC,
        max_prg_rom: SIZE_4096K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Un1rom,
        name: "HVC-UN1ROM",
        init_prg: UN1ROM_INIT_PRG,
        write_handlers: PRG_LATCH,
        max_prg_rom: SIZE_1024K,
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Unrom74hc08,
        name: "HVC-UNROM+74HC08",
        init_prg: UNROM_74HC08_INIT_PRG,
        write_handlers: PRG_LATCH,
        max_prg_rom: SIZE_4096K,
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::UxromProWrestling,
        name: "UxROM-PLAYCHOICE-PROWRESTLING",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::UxromProWrestling, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_32K + SIZE_64K,
        ..DEF
    },
    // CNROM family ---------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Cnrom,
        name: "CNROM",
        write_handlers: CHR_LATCH,
        max_chr_rom: SIZE_2048K,
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromNoConflict,
        name: "CNROM-NO-CONFLICT",
        write_handlers: CHR_LATCH_NC,
        max_chr_rom: SIZE_2048K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::NamcoCnromWram,
        name: "NAMCOT-CNROM+WRAM",
        write_handlers: CHR_LATCH,
        max_chr_rom: SIZE_2048K,
        min_wram: [SIZE_8K, 0],
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromSecurity,
        name: "CNROM+SECURITY",
        write_handlers: CNROM_SECURITY_HANDLERS,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromSecurityBank0,
        name: "CNROM+SECURITY-BANK0",
        write_handlers: CNROM_SECURITY_HANDLERS,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromSecurityBank1,
        name: "CNROM+SECURITY-BANK1",
        write_handlers: CNROM_SECURITY_HANDLERS,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromSecurityBank2,
        name: "CNROM+SECURITY-BANK2",
        write_handlers: CNROM_SECURITY_HANDLERS,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CnromSecurityBank3,
        name: "CNROM+SECURITY-BANK3",
        write_handlers: CNROM_SECURITY_HANDLERS,
        ..DEF
    },
    // Discrete 32K-bank boards --------------------------------------------
    BoardInfo {
        board_type: BoardType::Axrom,
        name: "AxROM",
        write_handlers: &[wh(WriteHandler::Axrom, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 4,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::BUS_CONFLICT),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::AxromNoConflict,
        name: "AxROM-NO-CONFLICT",
        write_handlers: &[wh(WriteHandler::Axrom, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 4,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bnrom,
        name: "BNROM",
        write_handlers: PRG_LATCH,
        max_prg_rom: SIZE_4096K,
        flags: BoardFlags::BUS_CONFLICT,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Nina001,
        name: "AVE-NINA-01",
        init_chr0: bank::STD_CHR_4K,
        write_handlers: &[wh(WriteHandler::Nina001, 0x7FFD, 3, 0)],
        max_prg_rom: SIZE_64K,
        max_chr_rom: SIZE_64K,
        min_wram: [SIZE_8K, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::ColorDreams,
        name: "COLORDREAMS-74*377",
        write_handlers: &[wh(WriteHandler::ColorDreams, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_128K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Agci50282,
        name: "AGCI-50282",
        write_handlers: &[wh(WriteHandler::Agci50282, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_128K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Gxrom,
        name: "GxROM",
        write_handlers: &[wh(WriteHandler::Gxrom, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_32K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Cprom,
        name: "NES-CPROM",
        init_chr0: bank::STD_CHR_4K,
        write_handlers: &[wh(WriteHandler::Cprom, 0x8000, 0x8000, 0)],
        min_vram: [SIZE_8K, SIZE_8K],
        max_vram: [SIZE_8K, SIZE_8K],
        ..DEF
    },
    // Camerica -------------------------------------------------------------
    BoardInfo {
        board_type: BoardType::CamericaBf9093,
        name: "CAMERICA-BF9093",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::SimplePrgNoConflict, 0xC000, 0x4000, 0)],
        max_prg_rom: SIZE_256K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CamericaBf9097,
        name: "CAMERICA-BF9097",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[
            wh(WriteHandler::StandardMirroring, 0x8000, 0x2000, 0),
            wh(WriteHandler::SimplePrgNoConflict, 0xC000, 0x4000, 0),
        ],
        max_prg_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 4,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CamericaBf9096,
        name: "CAMERICA-BF9096",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[
            wh(WriteHandler::CamericaOuterBank, 0x8000, 0x4000, 0),
            wh(WriteHandler::SimplePrgNoConflict, 0xC000, 0x4000, 0),
        ],
        max_prg_rom: SIZE_256K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::CamericaGoldenFive,
        name: "CAMERICA-GOLDENFIVE",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::CamericaOuterBank, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        ..DEF
    },
    // MMC1 family ----------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Sxrom,
        name: "SxROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SxromWram,
        name: "SxROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        min_wram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SeromShrom,
        name: "SEROM/SHROM/SH1ROM",
        mapper_name: "MMC1",
        init_prg: EVENT_INIT_PRG,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Snrom,
        name: "SNROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        min_wram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sorom,
        name: "SOROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        min_wram: [SIZE_8K, SIZE_8K],
        max_wram: [SIZE_8K, SIZE_8K],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::WRAM1_NV),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Surom,
        name: "SUROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_512K,
        min_wram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SXrom,
        name: "SXROM",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_512K,
        min_wram: [SIZE_32K, 0],
        max_wram: [SIZE_32K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SxromMmc1a,
        name: "SxROM-MMC1A",
        mapper_name: "MMC1A",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SxromCompat,
        name: "SxROM-COMPAT",
        mapper_name: "MMC1",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_512K,
        min_wram: [SIZE_32K, 0],
        max_wram: [SIZE_32K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M
            .union(BoardFlags::WRAM0_NV)
            .union(BoardFlags::WRAM1_NV),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Event,
        name: "NES-EVENT",
        mapper_name: "MMC1",
        init_prg: EVENT_INIT_PRG,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: MMC1_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: 0,
        min_wram: [SIZE_8K, 0],
        min_vram: [SIZE_8K, 0],
        max_vram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_01VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::M2_TIMER),
        ..DEF
    },
    // MMC2 / MMC4 ----------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Mmc2,
        name: "PxROM",
        mapper_name: "MMC2",
        init_prg: MMC2_INIT_PRG,
        init_chr0: MMC2_INIT_CHR,
        write_handlers: MMC2_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Mmc4,
        name: "FxROM",
        mapper_name: "MMC4",
        init_prg: bank::STD_PRG_16K,
        init_chr0: MMC2_INIT_CHR,
        write_handlers: MMC2_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        min_wram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    // MMC3 family ----------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Txrom,
        name: "TxROM",
        mapper_name: "MMC3",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: MMC3_HANDLERS,
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_256K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Txsrom,
        name: "TxSROM",
        mapper_name: "MMC3",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: MMC3_HANDLERS,
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_256K,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Tqrom,
        name: "TQROM",
        mapper_name: "MMC3",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: MMC3_HANDLERS,
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_64K,
        min_vram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Hkrom,
        name: "HKROM",
        mapper_name: "MMC6",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: MMC3_HANDLERS,
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_256K,
        max_wram: [0, 0],
        mapper_ram_size: SIZE_1K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M.union(BoardFlags::PPU_HOOK),
        ..DEF
    },
    // Namco 108 family -----------------------------------------------------
    BoardInfo {
        board_type: BoardType::Namco108,
        name: "NAMCOT-108",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_64K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Namco88,
        name: "NAMCOT-3433",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: NAMCO_SPLIT_INIT_CHR,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_128K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Namco95,
        name: "NAMCOT-3425",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_64K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Namco154,
        name: "NAMCOT-3453",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: NAMCO_SPLIT_INIT_CHR,
        write_handlers: &[wh(WriteHandler::Namco154, 0x8000, 0x8000, 0x8001)],
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 6,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Sunsoft --------------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Sunsoft1,
        name: "SUNSOFT-1",
        init_chr0: bank::STD_CHR_4K,
        write_handlers: &[wh(WriteHandler::Sunsoft1, 0x6000, 0x2000, 0)],
        max_chr_rom: SIZE_128K,
        max_wram: [0, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sunsoft2,
        name: "SUNSOFT-2",
        mapper_name: "SUNSOFT-2",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Sunsoft2, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 3,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sunsoft4,
        name: "SUNSOFT-4",
        init_prg: bank::STD_PRG_16K,
        init_chr0: bank::STD_CHR_2K,
        write_handlers: &[wh(WriteHandler::Sunsoft4, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_4096K,
        max_chr_rom: SIZE_2048K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Irem -----------------------------------------------------------------
    BoardInfo {
        board_type: BoardType::IremG101,
        name: "IREM-G101",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_1K,
        write_handlers: &[wh(WriteHandler::IremG101, 0x8000, 0x4000, 0xF007)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_256K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::IremG101B,
        name: "IREM-G101-B",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_1K,
        write_handlers: &[
            wh(WriteHandler::IremG101, 0x8000, 0x1000, 0xF007),
            wh(WriteHandler::IremG101, 0xA000, 0x2000, 0xF007),
        ],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_256K,
        max_wram: [0, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::IremTamS1,
        name: "IREM-TAM-S1",
        mapper_name: "TAM-S1",
        init_prg: IREM_TAM_S1_INIT_PRG,
        write_handlers: &[wh(WriteHandler::IremTamS1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Irem74x161,
        name: "IREM-74*161/161/21/138",
        init_chr0: IREM_74X161_INIT_CHR,
        write_handlers: &[wh(WriteHandler::Irem74x161, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        max_chr_rom: SIZE_32K,
        min_vram: [SIZE_8K, 0],
        max_vram: [SIZE_8K, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Discrete 74-logic ----------------------------------------------------
    BoardInfo {
        board_type: BoardType::JalecoJf16,
        name: "JALECO-JF-16",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::JalecoJf16, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_01,
        mirroring_shift: 3,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Discrete74x139,
        name: "74*139/74",
        init_prg: PRG_32K_NO_WRAM,
        write_handlers: &[wh(WriteHandler::Discrete74x139, 0x6000, 0x2000, 0)],
        max_chr_rom: SIZE_32K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Discrete74x161,
        name: "74*161/161/32",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Discrete74x161, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Discrete74x161Mirror,
        name: "74*161/161/32-MIRROR",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Discrete74x161, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Konami / NTDEC / Sachen ---------------------------------------------
    BoardInfo {
        board_type: BoardType::Vrc1,
        name: "KONAMI-VRC-1",
        mapper_name: "VRC1",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_4K,
        write_handlers: &[wh(WriteHandler::Vrc1, 0x8000, 0x8000, 0xF000)],
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_128K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Ntdec112,
        name: "NTDEC-112",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        write_handlers: &[wh(WriteHandler::Ntdec112, 0x8000, 0x8000, 0xE000)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_512K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Ntdec193,
        name: "NTDEC-193",
        init_prg: NTDEC193_INIT_PRG,
        init_chr0: NTDEC193_INIT_CHR,
        write_handlers: &[wh(WriteHandler::Ntdec193, 0x6000, 0x2000, 0x6003)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_256K,
        max_wram: [0, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen8259A,
        name: "SACHEN-8259A",
        init_chr0: SACHEN_8259_INIT_CHR,
        write_handlers: SACHEN_8259_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_256K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen8259B,
        name: "SACHEN-8259B",
        init_chr0: SACHEN_8259_INIT_CHR,
        write_handlers: SACHEN_8259_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen8259C,
        name: "SACHEN-8259C",
        init_chr0: SACHEN_8259_INIT_CHR,
        write_handlers: SACHEN_8259_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_512K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen8259D,
        name: "SACHEN-8259D",
        init_chr0: SACHEN_8259D_INIT_CHR,
        write_handlers: SACHEN_8259D_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_32K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen72007,
        name: "UNL-SA-72007",
        write_handlers: &[wh(WriteHandler::Sachen72007, 0x4100, 0x2000, 0x4100)],
        max_chr_rom: SIZE_16K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen72008,
        name: "UNL-SA-72008",
        write_handlers: &[wh(WriteHandler::Sachen72008, 0x4100, 0x2000, 0x4100)],
        max_prg_rom: SIZE_64K,
        max_chr_rom: SIZE_32K,
        max_wram: [0, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen74x374A,
        name: "UNL-SACHEN-74LS374N-A",
        read_handlers: SACHEN_374_READ_HANDLERS,
        write_handlers: SACHEN_374_WRITE_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        min_wram: [SIZE_8K, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Sachen74x374B,
        name: "UNL-SACHEN-74LS374N-B",
        read_handlers: SACHEN_374_READ_HANDLERS,
        write_handlers: SACHEN_374_WRITE_HANDLERS,
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        min_wram: [SIZE_8K, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Oddballs -------------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Caltron6in1,
        name: "MLT-CALTRON6IN1",
        write_handlers: &[
            wh(WriteHandler::Caltron6in1, 0x6000, 0x800, 0),
            wh(WriteHandler::Caltron6in1, 0x8000, 0x8000, 0),
        ],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        max_wram: [0, 0],
        mirroring_values: bank::MIRROR_VH,
        mirroring_shift: 6,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::RcmGs2015,
        name: "RCM-GS2015",
        write_handlers: &[wh(WriteHandler::RcmGs2015, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_1024K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::InlNsf,
        name: "BTL-INL-NSF",
        init_prg: bank::STD_PRG_4K_BANKED,
        write_handlers: &[wh(WriteHandler::InlNsf, 0x5000, 0x1000, 0x5FFF)],
        max_prg_rom: SIZE_1024K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::SingleChip,
        name: "Single Chip",
        max_chr_rom: 0,
        max_vram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Action52,
        name: "MLT-ACTION52",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Action52, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_512K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Maxi15,
        name: "MLT-MAXI15",
        read_handlers: MAXI15_READ_HANDLERS,
        max_prg_rom: SIZE_1024K,
        max_chr_rom: SIZE_1024K,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // Multicarts -----------------------------------------------------------
    BoardInfo {
        board_type: BoardType::Bmc20in1,
        name: "TXC / BMC 20-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Bmc20in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        mirroring_values: bank::MIRROR_VH,
        mirroring_shift: 7,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bmc22in1,
        name: "BMC SUPER 22 GAMES / 20-IN-1",
        init_prg: BMC22IN1_INIT_PRG,
        write_handlers: &[wh(WriteHandler::Bmc22in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_128K + SIZE_512K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bmc35in1,
        name: "BMC 35-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Bmc35in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_32K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bmc76in1,
        name: "BMC 76-IN-1 / BMC SUPER 42-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Bmc76in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        mirroring_values: bank::MIRROR_HV,
        mirroring_shift: 6,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bmc150in1,
        name: "BMC 150-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Bmc150in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_64K,
        max_wram: [0, 0],
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Bmc110in1,
        name: "BMC 58/64/72/110-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Bmc110in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_1024K,
        max_wram: [0, 0],
        mirroring_values: bank::MIRROR_HV,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::BmcN625092,
        name: "BMC-N625092",
        init_prg: N625092_INIT_PRG,
        write_handlers: &[wh(WriteHandler::BmcN625092, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_1024K,
        mirroring_values: bank::MIRROR_VH,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Contra100in1,
        name: "WAIXING / BMC CONTRA 100-IN-1",
        init_prg: CONTRA100IN1_INIT_PRG,
        write_handlers: &[wh(WriteHandler::Contra100in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_512K,
        mirroring_values: bank::MIRROR_VH,
        mirroring_shift: 6,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Super700in1,
        name: "BMC SUPER 700-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Super700in1, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_256K,
        max_chr_rom: SIZE_128K,
        max_wram: [0, 0],
        mirroring_values: bank::MIRROR_VH,
        mirroring_shift: 7,
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Ines201,
        name: "iNES mapper 201",
        write_handlers: &[wh(WriteHandler::Ines201, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_4096K,
        max_chr_rom: SIZE_2048K,
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::Ines225,
        name: "BMC 58/64/72-IN-1",
        init_prg: bank::STD_PRG_16K,
        write_handlers: &[wh(WriteHandler::Ines225, 0x8000, 0x8000, 0)],
        max_prg_rom: SIZE_2048K,
        max_chr_rom: SIZE_512K,
        max_wram: [0, 0],
        flags: BoardFlags::MIRROR_M,
        ..DEF
    },
    // VS-Unisystem ---------------------------------------------------------
    BoardInfo {
        board_type: BoardType::VsStandard,
        name: "VS-UNISYSTEM",
        init_prg: bank::STD_PRG_8K,
        max_prg_rom: SIZE_32K + SIZE_8K,
        max_chr_rom: SIZE_16K,
        min_wram: [SIZE_2K, 0],
        max_wram: [SIZE_2K, 0],
        max_vram: [SIZE_2K, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::VsRbiBaseball,
        name: "NAMCOT-108-VS-RBI-BASEBALL",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        read_handlers: VS_5E00_READ_HANDLERS,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_64K,
        min_wram: [SIZE_2K, 0],
        max_wram: [SIZE_2K, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::VsTkoBoxing,
        name: "NAMCOT-108-VS-TKO-BOXING",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        read_handlers: VS_5E00_READ_HANDLERS,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_64K,
        min_wram: [SIZE_2K, 0],
        max_wram: [SIZE_2K, 0],
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::VsSuperXevious,
        name: "NAMCOT-108-VS-SUPER-XEVIOUS",
        mapper_name: "Namco 108",
        init_prg: bank::STD_PRG_8K,
        init_chr0: bank::STD_CHR_2K_1K,
        read_handlers: VS_XEVIOUS_READ_HANDLERS,
        write_handlers: NAMCO108_HANDLERS,
        max_prg_rom: SIZE_128K,
        max_chr_rom: SIZE_64K,
        min_wram: [SIZE_2K, 0],
        max_wram: [SIZE_2K, 0],
        ..DEF
    },
    // Disk system and NSF --------------------------------------------------
    BoardInfo {
        board_type: BoardType::Fds,
        name: "Famicom Disk System",
        init_prg: FDS_INIT_PRG,
        read_handlers: FDS_READ_HANDLERS,
        write_handlers: FDS_WRITE_HANDLERS,
        max_prg_rom: SIZE_8K + SIZE_64K * 8,
        max_chr_rom: 0,
        min_wram: [SIZE_32K, 0],
        max_wram: [SIZE_32K, 0],
        min_vram: [SIZE_8K, 0],
        max_vram: [SIZE_8K, 0],
        mirroring_values: bank::MIRROR_VH,
        mirroring_shift: 3,
        flags: BoardFlags::MIRROR_M
            .union(BoardFlags::PRG_IPS)
            .union(BoardFlags::M2_TIMER),
        ..DEF
    },
    BoardInfo {
        board_type: BoardType::NsfPlayer,
        name: "NSF Player",
        init_prg: NSF_INIT_PRG,
        write_handlers: &[wh(WriteHandler::NsfPlayer, 0x5FF6, 10, 0)],
        max_prg_rom: SIZE_1024K,
        max_chr_rom: 0,
        min_wram: [SIZE_8K, 0],
        max_wram: [SIZE_8K, SIZE_1024K],
        min_vram: [SIZE_8K, 0],
        max_vram: [SIZE_8K, 0],
        flags: BoardFlags::M2_TIMER,
        ..DEF
    },
];

pub fn lookup(board_type: BoardType) -> Option<&'static BoardInfo> {
    BOARDS.iter().find(|info| info.board_type == board_type)
}

/// Translate an iNES mapper/submapper pair into a board type.
///
/// `chr_rom_size` disambiguates the handful of numbers that cover several
/// physical boards.
pub fn board_from_ines(mapper: u16, submapper: u8, chr_rom_size: usize) -> Option<BoardType> {
    use BoardType::*;
    let board = match mapper {
        0 => Nrom,
        1 => Sxrom,
        2 => match submapper {
            1 => UxromNoConflict,
            _ => Uxrom,
        },
        3 => match submapper {
            1 => CnromNoConflict,
            _ => Cnrom,
        },
        4 => Txrom,
        7 => match submapper {
            1 => AxromNoConflict,
            _ => Axrom,
        },
        9 => Mmc2,
        10 => Mmc4,
        11 => ColorDreams,
        13 => Cprom,
        31 => InlNsf,
        32 => IremG101,
        34 => {
            if chr_rom_size > 0 {
                Nina001
            } else {
                Bnrom
            }
        }
        41 => Caltron6in1,
        61 => Bmc20in1,
        62 => Super700in1,
        66 => Gxrom,
        68 => Sunsoft4,
        70 => Discrete74x161,
        71 => CamericaBf9093,
        75 => Vrc1,
        78 => JalecoJf16,
        87 => Discrete74x139,
        88 => Namco88,
        89 | 93 => Sunsoft2,
        94 => Un1rom,
        95 => Namco95,
        97 => IremTamS1,
        99 => VsStandard,
        104 => CamericaGoldenFive,
        105 => Event,
        112 => Ntdec112,
        118 => Txsrom,
        119 => Tqrom,
        133 => Sachen72008,
        137 => Sachen8259D,
        138 => Sachen8259B,
        139 => Sachen8259C,
        141 => Sachen8259A,
        144 => Agci50282,
        145 => Sachen72007,
        150 => Sachen74x374B,
        152 => Discrete74x161Mirror,
        154 => Namco154,
        155 => SxromMmc1a,
        180 => Unrom74hc08,
        184 => Sunsoft1,
        185 => match submapper {
            4 => CnromSecurityBank0,
            5 => CnromSecurityBank1,
            6 => CnromSecurityBank2,
            7 => CnromSecurityBank3,
            _ => CnromSecurity,
        },
        193 => Ntdec193,
        201 => Ines201,
        202 => Bmc150in1,
        203 => Bmc35in1,
        206 => Namco108,
        216 => RcmGs2015,
        221 => BmcN625092,
        225 => Ines225,
        226 => Bmc76in1,
        228 => Action52,
        230 => Bmc22in1,
        232 => CamericaBf9096,
        234 => Maxi15,
        243 => Sachen74x374A,
        255 => Bmc110in1,
        _ => return None,
    };
    Some(board)
}

/// Translate a UNIF board-name string into a board type.
pub fn board_from_unif(name: &str) -> Option<BoardType> {
    use BoardType::*;
    let name = name.strip_prefix("NES-").unwrap_or(name);
    let name = name.strip_prefix("HVC-").unwrap_or(name);
    let board = match name {
        "NROM" | "NROM-128" | "NROM-256" | "RROM" | "SROM" => Nrom,
        "UNROM" | "UOROM" | "UXROM" => Uxrom,
        "UNROM+74HC08" => Unrom74hc08,
        "UN1ROM" => Un1rom,
        "CNROM" => Cnrom,
        "ANROM" | "AMROM" | "AOROM" | "AN1ROM" => Axrom,
        "BNROM" => Bnrom,
        "NINA-001" | "AVE-NINA-01" => Nina001,
        "GNROM" | "MHROM" => Gxrom,
        "CPROM" => Cprom,
        "SLROM" | "SKROM" | "SGROM" | "SAROM" | "SBROM" | "SCROM" | "SC1ROM" | "SEROM"
        | "SFROM" | "SHROM" => Sxrom,
        "SNROM" => Snrom,
        "SOROM" => Sorom,
        "SUROM" => Surom,
        "SXROM" => SXrom,
        "TLROM" | "TBROM" | "TEROM" | "TFROM" | "TGROM" | "TKROM" | "TNROM" | "TSROM" => Txrom,
        "TKSROM" | "TLSROM" => Txsrom,
        "TQROM" => Tqrom,
        "HKROM" => Hkrom,
        "PNROM" | "PEEOROM" => Mmc2,
        "FJROM" | "FKROM" => Mmc4,
        "UNL-SACHEN-8259A" => Sachen8259A,
        "UNL-SACHEN-8259B" => Sachen8259B,
        "UNL-SACHEN-8259C" => Sachen8259C,
        "UNL-SACHEN-8259D" => Sachen8259D,
        "UNL-SA-72007" => Sachen72007,
        "UNL-SA-72008" => Sachen72008,
        "UNL-SACHEN-74LS374N" => Sachen74x374B,
        "BMC-N625092" => BmcN625092,
        "BMC-CONTRA-100-IN-1" => Contra100in1,
        "BTL-INL-NSF" => InlNsf,
        "UNL-SINGLECHIP" => SingleChip,
        "CAMERICA-BF9093" => CamericaBf9093,
        "CAMERICA-BF9097" => CamericaBf9097,
        "CAMERICA-BF9096" => CamericaBf9096,
        "CAMERICA-GOLDENFIVE" => CamericaGoldenFive,
        "MLT-CALTRON6IN1" => Caltron6in1,
        "MLT-ACTION52" => Action52,
        "MLT-MAXI15" => Maxi15,
        _ => return None,
    };
    Some(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_board_type_in_tables_has_a_registry_entry() {
        for mapper in 0..=255u16 {
            for &chr in &[0usize, 8 * 1024] {
                if let Some(board) = board_from_ines(mapper, 0, chr) {
                    assert!(
                        lookup(board).is_some(),
                        "mapper {mapper} maps to {board:?} with no registry entry"
                    );
                }
            }
        }
    }

    #[test]
    fn registry_entries_are_unique() {
        for (i, a) in BOARDS.iter().enumerate() {
            for other in &BOARDS[i + 1..] {
                assert_ne!(
                    a.board_type, other.board_type,
                    "duplicate {:?}",
                    a.board_type
                );
            }
        }
    }

    #[test]
    fn ines_lookup_disambiguates_mapper_34() {
        assert_eq!(board_from_ines(34, 0, 0), Some(BoardType::Bnrom));
        assert_eq!(board_from_ines(34, 0, 8 * 1024), Some(BoardType::Nina001));
    }

    #[test]
    fn unknown_mapper_is_rejected() {
        assert_eq!(board_from_ines(5, 0, 0), None);
    }

    #[test]
    fn unif_names_resolve_with_and_without_prefix() {
        assert_eq!(board_from_unif("NES-UNROM"), Some(BoardType::Uxrom));
        assert_eq!(board_from_unif("UNROM"), Some(BoardType::Uxrom));
        assert_eq!(board_from_unif("UNL-NOT-A-BOARD"), None);
    }
}
