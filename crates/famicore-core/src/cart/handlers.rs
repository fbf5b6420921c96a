//! Register-handler dispatch.
//!
//! The registry describes each board's register-mapped regions as address
//! ranges tagged with a dispatch variant. The bus layer decodes the range,
//! collapses aliases through the mask, and routes into the owning family
//! module. This keeps the "register a handler for a range" model of the
//! hardware documentation without function pointers in static tables.

/// Write-handler dispatch variants. One variant per register decoder; a
/// family with several distinct register regions gets several variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteHandler {
    /// Latch the written value into PRG slot 1 (bus conflicts apply).
    SimplePrg,
    /// Same, with bus-conflict AND skipped.
    SimplePrgNoConflict,
    /// Latch the written value into CHR slot 0 (bus conflicts apply).
    SimpleChr,
    /// Same, with bus-conflict AND skipped.
    SimpleChrNoConflict,
    /// Route through the board's mirroring lookup table.
    StandardMirroring,

    Mmc1,
    Mmc2,
    Mmc3,
    UxromProWrestling,
    CnromSecurity,
    Axrom,
    Nina001,
    ColorDreams,
    Agci50282,
    Gxrom,
    Cprom,
    CamericaOuterBank,
    Namco108,
    Namco154,
    Sunsoft1,
    Sunsoft2,
    Sunsoft4,
    IremG101,
    IremTamS1,
    Irem74x161,
    JalecoJf16,
    Discrete74x139,
    Discrete74x161,
    Vrc1,
    Ntdec112,
    Ntdec193,
    Sachen8259,
    Sachen72007,
    Sachen72008,
    Sachen74x374,
    Caltron6in1,
    RcmGs2015,
    InlNsf,
    Action52,
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
    NsfPlayer,
    Fds,
}

/// Read-handler dispatch variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadHandler {
    /// FDS status/data/drive registers at `$4030-$4036`.
    FdsStatus,
    /// FDS BIOS interception over `$E000-$FFFF` (patch sites decoded
    /// internally; everything else passes through).
    FdsBios,
    /// VS-Unisystem protection chips.
    VsProtection,
    /// Maxi 15 banking, driven by vector-area fetches.
    Maxi15,
    /// Sachen 74LS374N register readback.
    Sachen374,
}

#[derive(Debug, Clone, Copy)]
pub struct WriteHandlerRange {
    pub handler: WriteHandler,
    pub addr: u16,
    pub size: u32,
    /// 0 means every address bit within the range is decoded; a non-zero
    /// mask collapses aliases before the handler sees the address.
    pub mask: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadHandlerRange {
    pub handler: ReadHandler,
    pub addr: u16,
    pub size: u32,
    pub mask: u16,
}

pub const fn wh(handler: WriteHandler, addr: u16, size: u32, mask: u16) -> WriteHandlerRange {
    WriteHandlerRange {
        handler,
        addr,
        size,
        mask,
    }
}

pub const fn rh(handler: ReadHandler, addr: u16, size: u32, mask: u16) -> ReadHandlerRange {
    ReadHandlerRange {
        handler,
        addr,
        size,
        mask,
    }
}

impl WriteHandlerRange {
    #[inline]
    pub fn matches(&self, addr: u16) -> bool {
        let base = u32::from(self.addr);
        (u32::from(addr)) >= base && u32::from(addr) < base + self.size
    }

    #[inline]
    pub fn effective_addr(&self, addr: u16) -> u16 {
        if self.mask != 0 { addr & self.mask } else { addr }
    }
}

impl ReadHandlerRange {
    #[inline]
    pub fn matches(&self, addr: u16) -> bool {
        let base = u32::from(self.addr);
        (u32::from(addr)) >= base && u32::from(addr) < base + self.size
    }

    #[inline]
    pub fn effective_addr(&self, addr: u16) -> u16 {
        if self.mask != 0 { addr & self.mask } else { addr }
    }
}
