//! The live cartridge: chips, bank descriptors and bus dispatch.
//!
//! A `Board` is a registry entry cloned into mutable state plus the chips
//! allocated for the loaded image. CPU and PPU bus accesses either hit the
//! materialised page tables directly or fall into a register range, which
//! routes through the dispatch enums into the owning family module.

use tracing::warn;

use crate::{
    cart::{
        a12::A12Watcher,
        bank::{
            Bank, BankKind, EMPTY_BANK, Mirroring, NmtBank, NmtKind, Page, PageSource, Perms,
        },
        boards::{self, BoardState},
        registry::{self, BoardFlags, BoardInfo, BoardType},
    },
    chip::{Chip, ChipKind},
    config::Config,
    db::{self, DbEntry},
    emu::CpuHost,
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    ranges::RangeList,
    reset::ResetKind,
    rom::RomImage,
    timer::M2Timer,
};

pub const PRG_SLOTS: usize = 12;
pub const CHR_SLOTS: usize = 10;
pub const NMT_SLOTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Board {
    info: &'static BoardInfo,
    pub(crate) rom: RomImage,
    db_entry: Option<&'static DbEntry>,

    // Chips ----------------------------------------------------------------
    pub(crate) prg_rom: Chip,
    pub(crate) chr_rom: Chip,
    pub(crate) bios: Chip,
    pub(crate) wram: [Chip; 2],
    pub(crate) vram: [Chip; 2],
    pub(crate) ciram: Chip,
    pub(crate) mapper_ram: Chip,
    pub(crate) fill_nmt: Vec<u8>,
    pub(crate) modified_ranges: RangeList,

    // Descriptors and masks -------------------------------------------------
    pub(crate) prg_banks: [Bank; PRG_SLOTS],
    pub(crate) chr_banks0: [Bank; CHR_SLOTS],
    pub(crate) chr_banks1: [Bank; CHR_SLOTS],
    pub(crate) nmt_banks: [NmtBank; NMT_SLOTS],
    pub(crate) prg_and: i32,
    pub(crate) prg_or: i32,
    pub(crate) chr_and: i32,
    pub(crate) chr_or: i32,
    pub(crate) wram_and: i32,
    pub(crate) wram_or: i32,
    mirroring: Mirroring,

    // Shared mapper registers ----------------------------------------------
    pub(crate) prg_mode: u8,
    pub(crate) chr_mode: u8,
    pub(crate) irq_control: u8,
    pub(crate) irq_counter: i32,
    pub(crate) irq_counter_reload: u32,
    pub(crate) irq_counter_timestamp: u32,
    pub(crate) dip_switches: u8,
    pub(crate) num_dip_switches: u8,

    pub(crate) state: BoardState,
    pub(crate) m2_timer: M2Timer,
    pub(crate) a12: A12Watcher,
    /// Dirty disk data produced by a mid-session flush, waiting for the
    /// host to collect it.
    pub(crate) pending_fds_save: Option<crate::cart::fds::FdsSave>,

    // Materialised translation tables --------------------------------------
    cpu_pages: [Page; cpu_mem::PAGE_COUNT],
    chr_pages: [Page; ppu_mem::PATTERN_PAGE_COUNT],
    nmt_pages: [Page; NMT_SLOTS],
    /// Which CHR bank set is currently materialised.
    pub(crate) chr_set: u8,

    pub(crate) cfg: Config,
    vs_system: bool,
}

impl Board {
    pub fn new(rom: RomImage, cfg: &Config) -> Result<Self, Error> {
        let info = registry::lookup(rom.board_type)
            .ok_or_else(|| Error::UnsupportedMapper(format!("{:?}", rom.board_type)))?;

        if rom.prg_size == 0 {
            return Err(Error::InvalidImage("image has no PRG data".into()));
        }
        if info.max_prg_rom != 0 && rom.prg_size > info.max_prg_rom {
            warn!(
                size = rom.prg_size,
                max = info.max_prg_rom,
                board = info.name,
                "PRG ROM larger than the board supports"
            );
        }

        let prg_rom = Chip::from_data(ChipKind::PrgRom, rom.prg().to_vec());
        let chr_rom = Chip::from_data(ChipKind::ChrRom, rom.chr().to_vec());
        let bios = match &rom.bios {
            Some(data) => Chip::from_data(ChipKind::PrgRom, data.clone()),
            None => Chip::new(ChipKind::PrgRom, 0),
        };

        let wants_auto_wram = info
            .init_prg
            .iter()
            .any(|b| b.kind == BankKind::Auto && b.address < cpu_mem::PRG_ROM_START);
        let mut wram0_size = rom.wram_size[0].max(info.min_wram[0]);
        if wram0_size == 0 && wants_auto_wram && info.max_wram[0] != 0 {
            wram0_size = info.max_wram[0].min(8 * 1024);
        }
        wram0_size = cap(wram0_size, info.max_wram[0]);
        let wram1_size = cap(rom.wram_size[1].max(info.min_wram[1]), info.max_wram[1]);

        let mut wram0 = Chip::new(ChipKind::Wram, wram0_size);
        let mut wram1 = Chip::new(ChipKind::Wram, wram1_size);
        if rom.battery && !info.flags.contains(BoardFlags::WRAM1_NV) {
            wram0 = wram0.non_volatile();
        }
        if info.flags.contains(BoardFlags::WRAM0_NV) {
            wram0 = wram0.non_volatile();
        }
        if info.flags.contains(BoardFlags::WRAM1_NV) {
            wram1 = wram1.non_volatile();
        }
        if let Some(trainer) = &rom.trainer {
            // Trainers load at $7000, 4 KiB into the WRAM window.
            let dest = 0x1000;
            if wram0.len() >= dest + trainer.len() {
                wram0.data_mut()[dest..dest + trainer.len()].copy_from_slice(trainer);
            }
        }

        let vram0_size = if chr_rom.is_empty() || info.min_vram[0] != 0 {
            cap(rom.vram_size[0].max(info.min_vram[0]).max(
                if chr_rom.is_empty() && info.max_vram[0] != 0 {
                    8 * 1024
                } else {
                    0
                },
            ), info.max_vram[0])
        } else {
            0
        };
        let vram1_size = cap(rom.vram_size[1].max(info.min_vram[1]), info.max_vram[1]);
        let vram0 = Chip::new(ChipKind::Vram, vram0_size);
        let vram1 = Chip::new(ChipKind::Vram, vram1_size);

        let ciram_size = if rom.four_screen {
            ppu_mem::CIRAM_4SCREEN_SIZE
        } else {
            ppu_mem::CIRAM_SIZE
        };

        let mut board = Board {
            info,
            db_entry: db::lookup(rom.crc32),
            prg_rom,
            chr_rom,
            bios,
            wram: [wram0, wram1],
            vram: [vram0, vram1],
            ciram: Chip::new(ChipKind::Ciram, ciram_size),
            mapper_ram: Chip::new(ChipKind::MapperRam, info.mapper_ram_size),
            fill_nmt: Vec::new(),
            modified_ranges: RangeList::new(),
            prg_banks: fill_slots(info.init_prg),
            chr_banks0: fill_slots(info.init_chr0),
            chr_banks1: fill_slots(info.init_chr1),
            nmt_banks: [NmtBank::default(); NMT_SLOTS],
            prg_and: -1,
            prg_or: 0,
            chr_and: -1,
            chr_or: 0,
            wram_and: -1,
            wram_or: 0,
            mirroring: rom.mirroring,
            prg_mode: 0,
            chr_mode: 0,
            irq_control: 0,
            irq_counter: 0,
            irq_counter_reload: 0,
            irq_counter_timestamp: 0,
            dip_switches: 0,
            num_dip_switches: 0,
            state: boards::default_state(rom.board_type, &rom),
            m2_timer: M2Timer::new(cfg.cpu_clock_divider),
            a12: A12Watcher::new(cfg.frame_length),
            pending_fds_save: None,
            cpu_pages: [Page::OPEN_BUS; cpu_mem::PAGE_COUNT],
            chr_pages: [Page::OPEN_BUS; ppu_mem::PATTERN_PAGE_COUNT],
            nmt_pages: [Page::OPEN_BUS; NMT_SLOTS],
            chr_set: 0,
            cfg: cfg.clone(),
            vs_system: matches!(rom.system, crate::rom::SystemType::VsUnisystem),
            rom,
        };

        boards::init(&mut board);
        board.set_mirroring(board.rom.mirroring);
        board.sync_prg();
        board.sync_chr(0);
        board.sync_nmt();
        Ok(board)
    }

    // Accessors -------------------------------------------------------------

    pub fn kind(&self) -> BoardType {
        self.info.board_type
    }

    pub fn info(&self) -> &'static BoardInfo {
        self.info
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn db_entry(&self) -> Option<&'static DbEntry> {
        self.db_entry
    }

    pub fn is_vs_system(&self) -> bool {
        self.vs_system
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn dip_switches(&self) -> u8 {
        self.dip_switches
    }

    pub fn set_num_dip_switches(&mut self, count: u8) {
        self.num_dip_switches = count;
    }

    pub fn toggle_dip_switch(&mut self, switch: u8) {
        if switch < self.num_dip_switches {
            self.dip_switches ^= 1 << switch;
        }
    }

    pub fn modified_ranges(&self) -> &RangeList {
        &self.modified_ranges
    }

    /// Collect a disk save produced by a mid-session flush, if any.
    pub fn take_fds_save(&mut self) -> Option<crate::cart::fds::FdsSave> {
        self.pending_fds_save.take()
    }

    /// Non-volatile WRAM contents, if the board carries any; the host
    /// persists these at shutdown or eject.
    pub fn nvram(&self) -> Option<&[u8]> {
        self.wram
            .iter()
            .find(|chip| chip.is_non_volatile() && !chip.is_empty())
            .map(|chip| chip.data())
    }

    /// Preload non-volatile WRAM from a previous session's save file.
    pub fn load_nvram(&mut self, data: &[u8]) {
        if let Some(chip) = self
            .wram
            .iter_mut()
            .find(|chip| chip.is_non_volatile() && !chip.is_empty())
        {
            let len = chip.len().min(data.len());
            chip.data_mut()[..len].copy_from_slice(&data[..len]);
        }
    }

    // Reset and frame hooks -------------------------------------------------

    pub fn reset(&mut self, kind: ResetKind, host: &mut dyn CpuHost) {
        if kind.is_hard() {
            self.prg_banks = fill_slots(self.info.init_prg);
            self.chr_banks0 = fill_slots(self.info.init_chr0);
            self.chr_banks1 = fill_slots(self.info.init_chr1);
            self.prg_and = -1;
            self.prg_or = 0;
            self.chr_and = -1;
            self.chr_or = 0;
            self.wram_and = -1;
            self.wram_or = 0;
            self.chr_set = 0;
            self.irq_counter = 0;
            self.irq_counter_reload = 0;
            self.irq_counter_timestamp = 0;
            self.set_mirroring(self.rom.mirroring);
        }
        boards::reset(self, kind, host);
        self.sync_prg();
        self.sync_chr(self.chr_set);
        self.sync_nmt();
    }

    pub fn end_frame(&mut self, cycles: u32, host: &mut dyn CpuHost) {
        boards::end_frame(self, cycles, host);
        self.m2_timer.end_frame(cycles);
    }

    // CPU bus ---------------------------------------------------------------

    pub fn cpu_read(&mut self, addr: u16, open_bus: u8, cycles: u32, host: &mut dyn CpuHost) -> u8 {
        let mut value = self.read_mapped_cpu(addr).unwrap_or(open_bus);
        // Overlapping registrations are last-writer-wins.
        if let Some(range) = self
            .info
            .read_handlers
            .iter()
            .rev()
            .find(|r| r.matches(addr))
        {
            value = boards::dispatch_read(self, range.handler, addr, value, cycles, host);
        }
        value
    }

    pub fn cpu_write(&mut self, addr: u16, value: u8, cycles: u32, host: &mut dyn CpuHost) {
        if let Some(range) = self
            .info
            .write_handlers
            .iter()
            .rev()
            .find(|r| r.matches(addr))
        {
            let mut value = value;
            if self.info.flags.contains(BoardFlags::BUS_CONFLICT)
                && let Some(rom_byte) = self.rom_byte_at(addr)
            {
                value &= rom_byte;
            }
            let handler = range.handler;
            let eff = range.effective_addr(addr);
            boards::dispatch_write(self, handler, eff, value, cycles, host);
            return;
        }
        self.write_mapped_cpu(addr, value);
    }

    /// Read through the CPU page table without side effects.
    pub fn peek_cpu(&self, addr: u16) -> Option<u8> {
        self.read_mapped_cpu(addr)
    }

    /// Write through the CPU page table, bypassing register handlers; used
    /// by boards whose registers overlay RAM.
    pub(crate) fn write_mapped(&mut self, addr: u16, value: u8) {
        self.write_mapped_cpu(addr, value);
    }

    fn read_mapped_cpu(&self, addr: u16) -> Option<u8> {
        let page = &self.cpu_pages[usize::from(addr) >> cpu_mem::PAGE_SHIFT];
        if !page.perms.readable() {
            return None;
        }
        let offset = page.base + (usize::from(addr) & (cpu_mem::PAGE_SIZE - 1));
        self.chip_for(page.source).map(|chip| chip.read(offset))
    }

    fn write_mapped_cpu(&mut self, addr: u16, value: u8) {
        let page = self.cpu_pages[usize::from(addr) >> cpu_mem::PAGE_SHIFT];
        if !page.perms.writable() {
            return;
        }
        let offset = page.base + (usize::from(addr) & (cpu_mem::PAGE_SIZE - 1));
        self.write_chip(page.source, offset, value);
    }

    /// The ROM byte a bus-conflicting write would collide with.
    fn rom_byte_at(&self, addr: u16) -> Option<u8> {
        let page = &self.cpu_pages[usize::from(addr) >> cpu_mem::PAGE_SHIFT];
        match page.source {
            PageSource::PrgRom if page.perms.readable() => {
                let offset = page.base + (usize::from(addr) & (cpu_mem::PAGE_SIZE - 1));
                Some(self.prg_rom.read(offset))
            }
            _ => None,
        }
    }

    // PPU bus ---------------------------------------------------------------

    pub fn ppu_read(&mut self, addr: u16, _cycles: u32) -> u8 {
        let addr = addr & 0x3FFF;
        if addr <= ppu_mem::PATTERN_END {
            let page = &self.chr_pages[usize::from(addr) >> ppu_mem::PAGE_SHIFT];
            if !page.perms.readable() {
                return 0;
            }
            let offset = page.base + (usize::from(addr) & (ppu_mem::PAGE_SIZE - 1));
            return self
                .chip_for(page.source)
                .map(|chip| chip.read(offset))
                .unwrap_or(0);
        }
        let page = &self.nmt_pages[usize::from(addr >> 10) & 3];
        if !page.perms.readable() {
            return 0;
        }
        let offset = page.base + (usize::from(addr) & 0x3FF);
        match page.source {
            PageSource::Fill => self.fill_nmt.get(offset % 0x400).copied().unwrap_or(0),
            source => self
                .chip_for(source)
                .map(|chip| chip.read(offset))
                .unwrap_or(0),
        }
    }

    pub fn ppu_write(&mut self, addr: u16, value: u8, _cycles: u32) {
        let addr = addr & 0x3FFF;
        if addr <= ppu_mem::PATTERN_END {
            let page = self.chr_pages[usize::from(addr) >> ppu_mem::PAGE_SHIFT];
            if !page.perms.writable() {
                return;
            }
            let offset = page.base + (usize::from(addr) & (ppu_mem::PAGE_SIZE - 1));
            self.write_chip(page.source, offset, value);
            return;
        }
        let page = self.nmt_pages[usize::from(addr >> 10) & 3];
        if !page.perms.writable() {
            return;
        }
        let offset = page.base + (usize::from(addr) & 0x3FF);
        if page.source == PageSource::Fill {
            if self.fill_nmt.is_empty() {
                self.fill_nmt = vec![0; 0x400];
            }
            let len = self.fill_nmt.len();
            self.fill_nmt[offset % len] = value;
        } else {
            self.write_chip(page.source, offset, value);
        }
    }

    /// PPU address-bus hook; only boards flagged for it get called.
    pub fn ppu_addr_hook(&mut self, addr: u16, cycles: u32, host: &mut dyn CpuHost) {
        if self.info.flags.contains(BoardFlags::PPU_HOOK) {
            boards::ppu_hook(self, addr, cycles, host);
        }
    }

    // Chip plumbing ---------------------------------------------------------

    fn chip_for(&self, source: PageSource) -> Option<&Chip> {
        let chip = match source {
            PageSource::PrgRom => &self.prg_rom,
            PageSource::ChrRom => &self.chr_rom,
            PageSource::Bios => &self.bios,
            PageSource::Wram0 => &self.wram[0],
            PageSource::Wram1 => &self.wram[1],
            PageSource::Vram0 => &self.vram[0],
            PageSource::Vram1 => &self.vram[1],
            PageSource::Ciram => &self.ciram,
            PageSource::MapperRam => &self.mapper_ram,
            PageSource::OpenBus | PageSource::Fill => return None,
        };
        if chip.is_empty() { None } else { Some(chip) }
    }

    fn write_chip(&mut self, source: PageSource, offset: usize, value: u8) {
        let rom_offset = self.rom.offset;
        let chip = match source {
            // ROM writes are dropped unless a handler re-tagged the page;
            // the FDS is the exception, its "PRG ROM" is the writable disk.
            PageSource::PrgRom => {
                if self.info.board_type == BoardType::Fds {
                    &mut self.prg_rom
                } else {
                    return;
                }
            }
            PageSource::ChrRom | PageSource::Bios => return,
            PageSource::Wram0 => &mut self.wram[0],
            PageSource::Wram1 => &mut self.wram[1],
            PageSource::Vram0 => &mut self.vram[0],
            PageSource::Vram1 => &mut self.vram[1],
            PageSource::Ciram => &mut self.ciram,
            PageSource::MapperRam => &mut self.mapper_ram,
            PageSource::OpenBus | PageSource::Fill => return,
        };
        if chip.is_empty() {
            return;
        }
        let wrapped = offset % chip.len();
        chip.write(wrapped, value);
        if chip.is_non_volatile() {
            self.modified_ranges.add(wrapped, 1);
        } else if source == PageSource::PrgRom {
            self.modified_ranges.add(rom_offset + wrapped, 1);
        }
    }

    // Sync ------------------------------------------------------------------

    pub fn sync_prg(&mut self) {
        // Rebuild the whole CPU view; register pages stay untouched because
        // descriptors never cover them.
        for page in self.cpu_pages.iter_mut() {
            *page = Page::OPEN_BUS;
        }
        for slot in 0..PRG_SLOTS {
            let bank = self.prg_banks[slot];
            if bank.size == 0 || bank.kind == BankKind::None {
                continue;
            }
            self.apply_cpu_bank(&bank);
        }
    }

    fn apply_cpu_bank(&mut self, bank: &Bank) {
        let (source, chip_len, and, or) = match self.resolve_prg_kind(bank.kind) {
            Some(resolved) => resolved,
            None => return,
        };
        if chip_len == 0 {
            return;
        }
        let perms = match source {
            PageSource::PrgRom if self.info.board_type != BoardType::Fds => {
                if bank.perms.writable() {
                    // A handler re-tagged the window writable; honour it.
                    bank.perms
                } else {
                    Perms::Read
                }
            }
            PageSource::Bios => Perms::Read,
            _ => bank.perms,
        };

        let effective = ((i64::from(bank.bank) & i64::from(and)) | i64::from(or)) >> bank.shift;
        let slot_count = (chip_len / bank.size).max(1) as i64;
        let base = effective.rem_euclid(slot_count) as usize * bank.size;

        let first_page = usize::from(bank.address) >> cpu_mem::PAGE_SHIFT;
        let pages = bank.size >> cpu_mem::PAGE_SHIFT;
        for i in 0..pages {
            let index = first_page + i;
            if index >= cpu_mem::PAGE_COUNT {
                break;
            }
            self.cpu_pages[index] = Page {
                source,
                base: (base + i * cpu_mem::PAGE_SIZE) % chip_len,
                perms,
            };
        }
    }

    fn resolve_prg_kind(&self, kind: BankKind) -> Option<(PageSource, usize, i32, i32)> {
        match kind {
            BankKind::Rom => Some((PageSource::PrgRom, self.prg_rom.len(), self.prg_and, self.prg_or)),
            BankKind::Bios => Some((PageSource::Bios, self.bios.len(), -1, 0)),
            BankKind::Wram0 | BankKind::Auto => {
                if self.wram[0].is_empty() {
                    None
                } else {
                    Some((
                        PageSource::Wram0,
                        self.wram[0].len(),
                        self.wram_and,
                        self.wram_or,
                    ))
                }
            }
            BankKind::Wram1 => Some((
                PageSource::Wram1,
                self.wram[1].len(),
                self.wram_and,
                self.wram_or,
            )),
            BankKind::MapperRam => Some((PageSource::MapperRam, self.mapper_ram.len(), -1, 0)),
            BankKind::OpenBus | BankKind::None => None,
            other => {
                warn!(?other, "unsupported PRG bank kind");
                None
            }
        }
    }

    pub fn sync_chr(&mut self, set: u8) {
        self.chr_set = set;
        for page in self.chr_pages.iter_mut() {
            *page = Page::OPEN_BUS;
        }
        let banks = if set == 0 {
            self.chr_banks0
        } else {
            self.chr_banks1
        };
        for bank in banks.iter() {
            if bank.size == 0 || bank.kind == BankKind::None {
                continue;
            }
            self.apply_chr_bank(bank);
        }
    }

    fn apply_chr_bank(&mut self, bank: &Bank) {
        let (source, chip_len) = match self.resolve_chr_kind(bank.kind) {
            Some(resolved) => resolved,
            None => return,
        };
        if chip_len == 0 {
            return;
        }
        let perms = if source == PageSource::ChrRom && bank.perms.writable() {
            Perms::Read
        } else {
            bank.perms
        };

        let effective =
            ((i64::from(bank.bank) & i64::from(self.chr_and)) | i64::from(self.chr_or)) >> bank.shift;
        let slot_count = (chip_len / bank.size).max(1) as i64;
        let base = effective.rem_euclid(slot_count) as usize * bank.size;

        let first_page = usize::from(bank.address) >> ppu_mem::PAGE_SHIFT;
        let pages = bank.size >> ppu_mem::PAGE_SHIFT;
        for i in 0..pages {
            let index = first_page + i;
            if index >= ppu_mem::PATTERN_PAGE_COUNT {
                break;
            }
            self.chr_pages[index] = Page {
                source,
                base: (base + i * ppu_mem::PAGE_SIZE) % chip_len,
                perms,
            };
        }
    }

    fn resolve_chr_kind(&self, kind: BankKind) -> Option<(PageSource, usize)> {
        match kind {
            BankKind::Auto => {
                if !self.chr_rom.is_empty() {
                    Some((PageSource::ChrRom, self.chr_rom.len()))
                } else if !self.vram[0].is_empty() {
                    Some((PageSource::Vram0, self.vram[0].len()))
                } else {
                    None
                }
            }
            BankKind::Rom => Some((PageSource::ChrRom, self.chr_rom.len())),
            BankKind::Vram0 => Some((PageSource::Vram0, self.vram[0].len())),
            BankKind::Vram1 => Some((PageSource::Vram1, self.vram[1].len())),
            BankKind::Ciram => Some((PageSource::Ciram, self.ciram.len())),
            BankKind::MapperRam => Some((PageSource::MapperRam, self.mapper_ram.len())),
            BankKind::OpenBus | BankKind::None => None,
            other => {
                warn!(?other, "unsupported CHR bank kind");
                None
            }
        }
    }

    pub fn sync_nmt(&mut self) {
        for (i, bank) in self.nmt_banks.iter().enumerate() {
            let (source, chip_len) = match bank.kind {
                NmtKind::Ciram => (PageSource::Ciram, self.ciram.len()),
                NmtKind::Vram0 => (PageSource::Vram0, self.vram[0].len()),
                NmtKind::Vram1 => (PageSource::Vram1, self.vram[1].len()),
                NmtKind::Rom => (PageSource::ChrRom, self.chr_rom.len()),
                NmtKind::MapperRam => (PageSource::MapperRam, self.mapper_ram.len()),
                NmtKind::Fill => {
                    self.nmt_pages[i] = Page {
                        source: PageSource::Fill,
                        base: 0,
                        perms: bank.perms,
                    };
                    continue;
                }
            };
            if chip_len == 0 {
                self.nmt_pages[i] = Page::OPEN_BUS;
                continue;
            }
            let pages = (chip_len / 0x400).max(1) as i64;
            let base = i64::from(bank.bank).rem_euclid(pages) as usize * 0x400;
            self.nmt_pages[i] = Page {
                source,
                base,
                perms: if source == PageSource::ChrRom {
                    Perms::Read
                } else {
                    bank.perms
                },
            };
        }
    }

    // Mirroring -------------------------------------------------------------

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        if let Some(pattern) = mirroring.nmt_pattern() {
            for (slot, page) in pattern.into_iter().enumerate() {
                self.nmt_banks[slot] = NmtBank {
                    bank: page,
                    kind: NmtKind::Ciram,
                    perms: Perms::ReadWrite,
                };
            }
        }
        self.sync_nmt();
    }

    /// The standard mirroring handler: index the board's lookup table with
    /// the written value (or the register address, for the boards that
    /// decode mirroring from address lines).
    pub fn standard_mirroring(&mut self, value: u16) {
        let table = self.info.mirroring_values;
        if table.is_empty() {
            return;
        }
        let index = (usize::from(value) >> self.info.mirroring_shift) & (table.len() - 1);
        self.set_mirroring(table[index]);
    }

    // Bank update helpers ---------------------------------------------------

    pub fn update_prg_bank(&mut self, slot: usize, value: i32) {
        if self.prg_banks[slot].bank != value {
            self.prg_banks[slot].bank = value;
            self.sync_prg();
        }
    }

    pub fn update_chr0_bank(&mut self, slot: usize, value: i32) {
        if self.chr_banks0[slot].bank != value {
            self.chr_banks0[slot].bank = value;
            if self.chr_set == 0 {
                self.sync_chr(0);
            }
        }
    }

    pub fn update_chr1_bank(&mut self, slot: usize, value: i32) {
        if self.chr_banks1[slot].bank != value {
            self.chr_banks1[slot].bank = value;
            if self.chr_set == 1 {
                self.sync_chr(1);
            }
        }
    }

    /// Sanity check used by debug builds and tests: every readable page's
    /// base offset must sit inside its chip.
    pub fn check_page_tables(&self) -> bool {
        self.cpu_pages
            .iter()
            .chain(self.chr_pages.iter())
            .chain(self.nmt_pages.iter())
            .all(|page| match self.chip_for(page.source) {
                Some(chip) => page.base < chip.len(),
                None => !page.perms.readable() || page.source == PageSource::Fill,
            })
    }
}

fn cap(size: usize, max: usize) -> usize {
    if max == 0 { 0 } else { size.min(max) }
}

fn fill_slots<const N: usize>(template: &[Bank]) -> [Bank; N] {
    let mut slots = [EMPTY_BANK; N];
    for (slot, bank) in template.iter().enumerate().take(N) {
        slots[slot] = *bank;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::ines;

    fn nrom_image(prg_banks: u8, chr_banks: u8) -> RomImage {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        for bank in 0..prg_banks {
            bytes.extend(vec![bank; 16 * 1024]);
        }
        for bank in 0..chr_banks {
            bytes.extend(vec![0x40 + bank; 8 * 1024]);
        }
        ines::load(bytes).expect("load")
    }

    #[test]
    fn nrom_maps_prg_and_chr() {
        let mut board = Board::new(nrom_image(1, 1), &Config::default()).expect("board");
        assert_eq!(board.peek_cpu(0x8000), Some(0));
        // 16 KiB PRG mirrors into the upper window.
        assert_eq!(board.peek_cpu(0xC000), Some(0));
        assert_eq!(board.ppu_read(0x0000, 0), 0x40);
        assert!(board.check_page_tables());
    }

    #[test]
    fn descriptor_sync_claims_each_page_once() {
        let board = Board::new(nrom_image(2, 1), &Config::default()).expect("board");
        // Every CPU page in $8000-$FFFF maps PRG ROM within bounds.
        for addr in (0x8000u32..0x10000).step_by(1024) {
            let page = &board.cpu_pages[(addr >> 10) as usize];
            assert_eq!(page.source, PageSource::PrgRom);
            assert!(page.base < board.prg_rom.len());
        }
    }

    #[test]
    fn rom_writes_are_dropped() {
        let mut board = Board::new(nrom_image(1, 1), &Config::default()).expect("board");
        let mut host = crate::emu::tests::NullHost::default();
        board.cpu_write(0x8123, 0xFF, 0, &mut host);
        assert_eq!(board.peek_cpu(0x8123), Some(0));
    }

    #[test]
    fn mirroring_patterns_materialise_into_nametables() {
        let mut board = Board::new(nrom_image(1, 1), &Config::default()).expect("board");
        board.set_mirroring(Mirroring::Vertical);
        board.ppu_write(0x2000, 0xAB, 0);
        assert_eq!(board.ppu_read(0x2800, 0), 0xAB);
        assert_ne!(board.ppu_read(0x2400, 0), 0xAB);

        board.set_mirroring(Mirroring::Horizontal);
        board.ppu_write(0x2000, 0xCD, 0);
        assert_eq!(board.ppu_read(0x2400, 0), 0xCD);
    }

    #[test]
    fn nv_wram_writes_land_in_modified_ranges() {
        let mut bytes = vec![
            b'N', b'E', b'S', 0x1A, 1, 0, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        bytes.extend(vec![0; 16 * 1024]);
        let rom = ines::load(bytes).expect("load");
        let mut board = Board::new(rom, &Config::default()).expect("board");
        let mut host = crate::emu::tests::NullHost::default();
        board.cpu_write(0x6010, 0x55, 0, &mut host);
        board.cpu_write(0x6011, 0x66, 0, &mut host);
        let ranges: Vec<_> = board
            .modified_ranges()
            .iter()
            .map(|r| (r.offset, r.length))
            .collect();
        assert_eq!(ranges, vec![(0x10, 2)]);
    }
}
