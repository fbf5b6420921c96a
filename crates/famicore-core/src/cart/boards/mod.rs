//! Per-family cartridge state machines.
//!
//! Each module implements one board family's register decoders. The
//! dispatch functions here route the enum variants from the registry into
//! the owning module, and the per-family private state lives in
//! [`BoardState`] so generic code never pokes at untyped scratch bytes.

pub mod axrom;
pub mod camerica;
pub mod cnrom;
pub mod colordreams;
pub mod discrete;
pub mod gxrom;
pub mod irem;
pub mod mmc1;
pub mod mmc2;
pub mod mmc3;
pub mod multicart;
pub mod namco108;
pub mod nsf;
pub mod ntdec;
pub mod sachen;
pub mod simple;
pub mod singlechip;
pub mod sunsoft;
pub mod vrc1;
pub mod vs;

use crate::{
    cart::{
        board::Board,
        fds::{self, FdsState},
        handlers::{ReadHandler, WriteHandler},
        registry::BoardType,
    },
    emu::CpuHost,
    reset::ResetKind,
    rom::RomImage,
};

/// Mapper-private state, one variant per family that needs any.
#[derive(Debug, Clone)]
pub enum BoardState {
    None,
    Mmc1(mmc1::Mmc1State),
    Mmc2(mmc2::Mmc2State),
    Mmc3(mmc3::Mmc3State),
    Namco108(namco108::Namco108State),
    Sunsoft4(sunsoft::Sunsoft4State),
    Ntdec112(ntdec::Ntdec112State),
    Sachen8259(sachen::Sachen8259State),
    Sachen374(sachen::Sachen374State),
    Multicart(multicart::MulticartState),
    Nsf(nsf::NsfState),
    Fds(Box<FdsState>),
}

pub fn default_state(board_type: BoardType, rom: &RomImage) -> BoardState {
    use BoardType::*;
    match board_type {
        Sxrom | SxromWram | SeromShrom | Snrom | Sorom | Surom | SXrom | SxromMmc1a
        | SxromCompat | Event => BoardState::Mmc1(mmc1::Mmc1State::default()),
        Mmc2 | Mmc4 => BoardState::Mmc2(mmc2::Mmc2State::default()),
        Txrom | Txsrom | Tqrom | Hkrom => BoardState::Mmc3(mmc3::Mmc3State::default()),
        Namco108 | Namco88 | Namco95 | Namco154 | VsRbiBaseball | VsTkoBoxing
        | VsSuperXevious => BoardState::Namco108(namco108::Namco108State::default()),
        Sunsoft4 => BoardState::Sunsoft4(sunsoft::Sunsoft4State::default()),
        Ntdec112 => BoardState::Ntdec112(ntdec::Ntdec112State::default()),
        Sachen8259A | Sachen8259B | Sachen8259C | Sachen8259D => {
            BoardState::Sachen8259(sachen::Sachen8259State::default())
        }
        Sachen74x374A | Sachen74x374B => {
            BoardState::Sachen374(sachen::Sachen374State::default())
        }
        Bmc22in1 | BmcN625092 | Maxi15 => {
            BoardState::Multicart(multicart::MulticartState::default())
        }
        NsfPlayer => BoardState::Nsf(nsf::NsfState::from_rom(rom)),
        Fds => BoardState::Fds(Box::new(FdsState::default())),
        _ => BoardState::None,
    }
}

/// One-time setup after chip allocation.
pub fn init(board: &mut Board) {
    match board.kind() {
        BoardType::Event => board.set_num_dip_switches(4),
        BoardType::VsStandard
        | BoardType::VsRbiBaseball
        | BoardType::VsTkoBoxing
        | BoardType::VsSuperXevious => board.set_num_dip_switches(8),
        BoardType::SingleChip => singlechip::init(board),
        BoardType::NsfPlayer => nsf::init(board),
        _ => {}
    }
    if board.is_vs_system() {
        board.set_num_dip_switches(8);
    }
}

/// Family-specific reset behaviour on top of the generic descriptor reset.
pub fn reset(board: &mut Board, kind: ResetKind, host: &mut dyn CpuHost) {
    match board.kind() {
        BoardType::Sxrom
        | BoardType::SxromWram
        | BoardType::SeromShrom
        | BoardType::Snrom
        | BoardType::Sorom
        | BoardType::Surom
        | BoardType::SXrom
        | BoardType::SxromMmc1a
        | BoardType::SxromCompat
        | BoardType::Event => mmc1::reset(board, kind, host),
        BoardType::Mmc2 | BoardType::Mmc4 => mmc2::reset(board, kind),
        BoardType::Txrom | BoardType::Txsrom | BoardType::Tqrom | BoardType::Hkrom => {
            mmc3::reset(board, kind)
        }
        BoardType::Namco108
        | BoardType::Namco88
        | BoardType::Namco95
        | BoardType::Namco154
        | BoardType::VsRbiBaseball
        | BoardType::VsTkoBoxing
        | BoardType::VsSuperXevious => namco108::reset(board, kind),
        BoardType::Sunsoft4 => sunsoft::sunsoft4_reset(board, kind),
        BoardType::IremG101 | BoardType::IremG101B => irem::g101_reset(board, kind),
        BoardType::Irem74x161 => irem::irem_74x161_reset(board, kind),
        BoardType::CamericaBf9096 => camerica::bf9096_reset(board, kind),
        BoardType::CamericaGoldenFive => camerica::goldenfive_reset(board, kind),
        BoardType::Ntdec112 => ntdec::reset(board, kind),
        BoardType::Caltron6in1 => multicart::caltron_reset(board),
        BoardType::Bmc22in1 => multicart::bmc22in1_reset(board, kind),
        BoardType::Bmc110in1 => multicart::bmc110in1_reset(board, kind, host),
        BoardType::Bmc150in1 => multicart::bmc150in1_reset(board, kind, host),
        BoardType::BmcN625092 => multicart::n625092_reset(board, kind),
        BoardType::Super700in1 => multicart::super700in1_reset(board, kind, host),
        BoardType::Action52 => multicart::action52_reset(board, kind),
        BoardType::Maxi15 => multicart::maxi15_reset(board, kind),
        BoardType::VsStandard => vs::reset(board, kind),
        BoardType::NsfPlayer => nsf::reset(board, kind),
        BoardType::Fds => fds::reset(board, kind, host),
        _ => {}
    }
}

pub fn end_frame(board: &mut Board, cycles: u32, host: &mut dyn CpuHost) {
    match board.kind() {
        BoardType::Sxrom
        | BoardType::SxromWram
        | BoardType::SeromShrom
        | BoardType::Snrom
        | BoardType::Sorom
        | BoardType::Surom
        | BoardType::SXrom
        | BoardType::SxromMmc1a
        | BoardType::SxromCompat
        | BoardType::Event => mmc1::end_frame(board, cycles, host),
        BoardType::Fds => fds::end_frame(board, cycles, host),
        _ => {}
    }
}

/// PPU address-bus hook for boards flagged with one.
pub fn ppu_hook(board: &mut Board, addr: u16, cycles: u32, host: &mut dyn CpuHost) {
    match board.kind() {
        BoardType::Mmc2 | BoardType::Mmc4 => mmc2::ppu_hook(board, addr),
        BoardType::Txrom | BoardType::Txsrom | BoardType::Tqrom | BoardType::Hkrom => {
            mmc3::ppu_hook(board, addr, cycles, host)
        }
        _ => {}
    }
}

pub fn dispatch_write(
    board: &mut Board,
    handler: WriteHandler,
    addr: u16,
    value: u8,
    cycles: u32,
    host: &mut dyn CpuHost,
) {
    use WriteHandler::*;
    match handler {
        SimplePrg | SimplePrgNoConflict => simple::prg_latch(board, value),
        SimpleChr | SimpleChrNoConflict => simple::chr_latch(board, value),
        StandardMirroring => board.standard_mirroring(value.into()),
        UxromProWrestling => simple::prowrestling(board, value),
        CnromSecurity => cnrom::security(board, value),
        Axrom => axrom::write(board, value),
        Nina001 => simple::nina001(board, addr, value),
        ColorDreams => colordreams::write(board, value),
        Agci50282 => colordreams::agci_50282(board, addr, value),
        Gxrom => gxrom::write(board, value),
        Cprom => simple::cprom(board, value),
        CamericaOuterBank => camerica::outer_bank(board, addr, value),
        Mmc1 => mmc1::write(board, addr, value, cycles, host),
        Mmc2 => mmc2::write(board, addr, value),
        Mmc3 => mmc3::write(board, addr, value, host),
        Namco108 | Namco154 => namco108::write(board, addr, value),
        Sunsoft1 => sunsoft::sunsoft1(board, value),
        Sunsoft2 => sunsoft::sunsoft2(board, value),
        Sunsoft4 => sunsoft::sunsoft4(board, addr, value),
        IremG101 => irem::g101(board, addr, value),
        IremTamS1 => irem::tam_s1(board, value),
        Irem74x161 => irem::irem_74x161(board, value),
        JalecoJf16 => discrete::jaleco_jf16(board, value),
        Discrete74x139 => discrete::d74x139(board, value),
        Discrete74x161 => discrete::d74x161(board, value),
        Vrc1 => vrc1::write(board, addr, value),
        Ntdec112 => ntdec::ntdec112(board, addr, value),
        Ntdec193 => ntdec::ntdec193(board, addr, value),
        Sachen8259 => sachen::sachen_8259(board, addr, value),
        Sachen72007 => sachen::sachen_72007(board, value),
        Sachen72008 => sachen::sachen_72008(board, value),
        Sachen74x374 => sachen::sachen_374_write(board, addr, value),
        Caltron6in1 => multicart::caltron(board, addr, value),
        RcmGs2015 => multicart::rcm_gs2015(board, addr),
        InlNsf => simple::inlnsf(board, addr, value),
        Action52 => multicart::action52(board, addr, value),
        Bmc20in1 => multicart::bmc20in1(board, addr, value),
        Bmc22in1 => multicart::bmc22in1(board, value),
        Bmc35in1 => multicart::bmc35in1(board, value),
        Bmc76in1 => multicart::bmc76in1(board, addr, value),
        Bmc150in1 => multicart::bmc150in1(board, addr),
        Bmc110in1 => multicart::bmc110in1(board, addr),
        BmcN625092 => multicart::n625092(board, addr),
        Contra100in1 => multicart::contra100in1(board, addr, value),
        Super700in1 => multicart::super700in1(board, addr, value),
        Ines201 => multicart::ines201(board, addr),
        Ines225 => multicart::ines225(board, addr),
        NsfPlayer => nsf::write(board, addr, value),
        Fds => fds::write(board, addr, value, cycles, host),
    }
}

pub fn dispatch_read(
    board: &mut Board,
    handler: ReadHandler,
    addr: u16,
    value: u8,
    cycles: u32,
    host: &mut dyn CpuHost,
) -> u8 {
    match handler {
        ReadHandler::FdsStatus => fds::read(board, addr, value, cycles, host),
        ReadHandler::FdsBios => fds::bios_read(board, addr, value, cycles, host),
        ReadHandler::VsProtection => namco108::vs_security_read(board, addr, value),
        ReadHandler::Maxi15 => multicart::maxi15_read(board, addr, value),
        ReadHandler::Sachen374 => sachen::sachen_374_read(board, addr, value),
    }
}
