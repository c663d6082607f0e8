use std::io::Read;

use log::{debug, info, warn};

use crate::{
    banks::{BankTable, ROM_BANK_SIZE},
    cheats::{GameGenieCode, PatchLog},
    error::LoadError,
    header::{self, CartridgeKind, HEADER_SIZE, Header},
    rtc::{Clock, Rtc, SystemClock},
    savestate::SaveState,
};

/// MBC1 interpretation of the 0x4000-0x5FFF register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankingMode {
    /// Upper bits extend the ROM bank number.
    #[default]
    Rom,
    /// Upper bits select the RAM bank.
    Ram,
}

/// Raw mapper registers as written by software. Effective banks are derived
/// from these and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registers {
    rom_bank: u16,
    ram_bank: u8,
    ram_enabled: bool,
    mode: BankingMode,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            mode: BankingMode::Rom,
        }
    }
}

/// Facts about the loaded image, fixed for the cartridge's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeInfo {
    pub title: String,
    pub kind: CartridgeKind,
    pub cart_type: u8,
    pub rom_banks: usize,
    pub ram_banks: usize,
    pub cgb: bool,
    pub battery: bool,
    pub rtc: bool,
    /// MBC1 64-bank multicart wiring is emulated.
    pub multicart: bool,
}

#[derive(Debug)]
pub struct Cartridge {
    banks: BankTable,
    rtc: Rtc,
    regs: Registers,
    info: Option<CartridgeInfo>,
    cheats: PatchLog,
}

/// Remap a raw MBC1 register onto the 64-bank multicart wiring: bits 5-6
/// become bits 4-5, the low nibble is kept and bit 4 is not connected.
fn to_multi64_rom_bank(rom_bank: u16) -> usize {
    ((rom_bank >> 1 & 0x30) | (rom_bank & 0x0F)) as usize
}

fn copy_prefix(dst: &mut [u8], src: &[u8]) {
    let len = dst.len().min(src.len());
    dst[..len].copy_from_slice(&src[..len]);
}

impl Cartridge {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            banks: BankTable::new(),
            rtc: Rtc::new(clock),
            regs: Registers::default(),
            info: None,
            cheats: PatchLog::new(),
        }
    }

    pub fn info(&self) -> Option<&CartridgeInfo> {
        self.info.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.info.is_some()
    }

    pub fn kind(&self) -> Option<CartridgeKind> {
        self.info.as_ref().map(|info| info.kind)
    }

    pub fn banks(&self) -> &BankTable {
        &self.banks
    }

    pub fn rtc(&self) -> &Rtc {
        &self.rtc
    }

    pub fn ram_enabled(&self) -> bool {
        self.regs.ram_enabled
    }

    pub fn banking_mode(&self) -> BankingMode {
        self.regs.mode
    }

    pub fn rom_bank_select(&self) -> u16 {
        self.regs.rom_bank
    }

    pub fn ram_bank_select(&self) -> u8 {
        self.regs.ram_bank
    }

    pub fn multicart(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.multicart)
    }

    fn has_rtc(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.rtc)
    }

    fn has_battery(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.battery)
    }

    /// Load a ROM image, replacing any previously loaded cartridge.
    ///
    /// Nothing is touched unless the image passes validation.
    pub fn load_rom(
        &mut self,
        image: &[u8],
        force_dmg: bool,
        multicart_compat: bool,
    ) -> Result<(), LoadError> {
        if image.len() < ROM_BANK_SIZE {
            return Err(LoadError::TooSmall {
                size: image.len(),
                min: ROM_BANK_SIZE,
            });
        }

        let header = Header::parse(&image[..HEADER_SIZE]);
        let kind = header.kind()?;
        let cart_type = header.cart_type();
        if header::has_rumble(cart_type) {
            warn!("{}: rumble motor is not emulated", header.description());
        }

        let ram_banks = header.ram_banks();
        let cgb = header.cgb_supported() && !force_dmg;
        let image_banks = image.len() / ROM_BANK_SIZE;
        let rom_banks = image_banks.next_power_of_two().max(2);
        let multicart =
            ram_banks == 0 && rom_banks == 64 && kind == CartridgeKind::Mbc1 && multicart_compat;

        self.banks.reset(rom_banks, ram_banks, if cgb { 8 } else { 2 });
        let copied = image_banks * ROM_BANK_SIZE;
        let rom = self.banks.rom_mut();
        rom[..copied].copy_from_slice(&image[..copied]);
        // Banks past the end of a non power-of-two image read as open bus.
        rom[copied..].fill(0xFF);

        info!(
            "{} loaded: {} ROM banks ({} in image), {} RAM banks, CGB: {}",
            header.description(),
            rom_banks,
            image_banks,
            ram_banks,
            if cgb { "yes" } else { "no" }
        );
        if multicart {
            warn!("Multi-ROM \"MBC1\" presumed");
        }

        self.info = Some(CartridgeInfo {
            title: header.title(),
            kind,
            cart_type,
            rom_banks,
            ram_banks,
            cgb,
            battery: header.has_battery(),
            rtc: header.has_rtc(),
            multicart,
        });
        self.regs = Registers::default();
        self.cheats = PatchLog::new();
        self.rtc.reset();
        Ok(())
    }

    /// Load a ROM image from any byte source.
    pub fn load_rom_from<R: Read>(
        &mut self,
        mut reader: R,
        force_dmg: bool,
        multicart_compat: bool,
    ) -> Result<(), LoadError> {
        let mut image = Vec::new();
        reader.read_to_end(&mut image)?;
        self.load_rom(&image, force_dmg, multicart_compat)
    }

    fn rom_bank_mask(&self) -> usize {
        self.banks.rom_bank_count().saturating_sub(1)
    }

    fn ram_bank_mask(&self) -> usize {
        self.banks.ram_bank_count().saturating_sub(1)
    }

    /// Map the switchable ROM window from the raw register.
    fn map_rom_bank(&mut self, kind: CartridgeKind) {
        let bank = self.regs.rom_bank as usize & self.rom_bank_mask();
        self.banks.set_rom_bank(kind.adjusted_rom_bank(bank));
    }

    /// Map both ROM windows through the MBC1 multicart wiring.
    fn map_multi64(&mut self, kind: CartridgeKind) {
        let bank = to_multi64_rom_bank(self.regs.rom_bank);
        self.banks.set_rom_bank0(bank & 0x30);
        self.banks.set_rom_bank(kind.adjusted_rom_bank(bank));
    }

    fn refresh_ram_mapping(&mut self, bank: usize) {
        self.banks
            .set_ram_bank(self.regs.ram_enabled, self.rtc.get_active(), bank);
    }

    /// Decode a CPU write into 0x0000-0x7FFF.
    ///
    /// Writes with no effect for the loaded mapper are ignored, as on
    /// hardware.
    pub fn mbc_write(&mut self, addr: u16, data: u8) {
        let Some(kind) = self.kind() else {
            return;
        };

        match addr >> 12 & 0x7 {
            0x0 | 0x1 => self.write_ram_enable(kind, addr, data),
            0x2 => match kind {
                CartridgeKind::Plain => {}
                // MBC5 takes a full low byte here; 0x3000-0x3FFF holds bit 8.
                CartridgeKind::Mbc5 => {
                    self.regs.rom_bank = (self.regs.rom_bank & 0x100) | u16::from(data);
                    self.map_rom_bank(kind);
                }
                _ => self.write_rom_bank(kind, addr, data),
            },
            0x3 => self.write_rom_bank(kind, addr, data),
            0x4 | 0x5 => self.write_ram_bank(kind, data),
            _ => self.write_banking_mode(kind, data),
        }
    }

    fn write_ram_enable(&mut self, kind: CartridgeKind, addr: u16, data: u8) {
        // MBC2 decodes RAM enable only with address bit 8 clear.
        if kind == CartridgeKind::Mbc2 && addr & 0x0100 != 0 {
            return;
        }

        self.regs.ram_enabled = data & 0x0F == 0x0A;
        if self.has_rtc() {
            self.rtc.set_enabled(self.regs.ram_enabled);
        }
        self.refresh_ram_mapping(self.regs.ram_bank as usize);
    }

    fn write_rom_bank(&mut self, kind: CartridgeKind, addr: u16, data: u8) {
        let multi64 = self.multicart();
        let regs = &mut self.regs;
        match kind {
            CartridgeKind::Mbc1 => {
                regs.rom_bank = if regs.mode == BankingMode::Ram && !multi64 {
                    u16::from(data & 0x1F)
                } else {
                    (regs.rom_bank & 0x60) | u16::from(data & 0x1F)
                };

                if regs.mode == BankingMode::Ram && multi64 {
                    self.map_multi64(kind);
                    return;
                }
            }
            CartridgeKind::Mbc2 => {
                // ROM bank select needs address bit 8 set.
                if addr & 0x0100 == 0 {
                    return;
                }
                regs.rom_bank = u16::from(data & 0x0F);
            }
            CartridgeKind::Mbc3 => regs.rom_bank = u16::from(data & 0x7F),
            CartridgeKind::Mbc5 => {
                regs.rom_bank = u16::from(data & 0x01) << 8 | (regs.rom_bank & 0xFF);
            }
            CartridgeKind::Plain => return,
        }

        self.map_rom_bank(kind);
    }

    fn write_ram_bank(&mut self, kind: CartridgeKind, data: u8) {
        match kind {
            CartridgeKind::Mbc1 => match self.regs.mode {
                BankingMode::Ram if self.multicart() => {
                    self.regs.rom_bank =
                        u16::from(data & 0x03) << 5 | (self.regs.rom_bank & 0x1F);
                    self.map_multi64(kind);
                    return;
                }
                BankingMode::Ram => self.regs.ram_bank = data & 0x03,
                BankingMode::Rom => {
                    self.regs.rom_bank =
                        u16::from(data & 0x03) << 5 | (self.regs.rom_bank & 0x1F);
                    self.map_rom_bank(kind);
                    return;
                }
            },
            CartridgeKind::Mbc3 => {
                if self.has_rtc() {
                    self.rtc.swap_active(data);
                }
                self.regs.ram_bank = data & 0x03;
            }
            CartridgeKind::Mbc5 => self.regs.ram_bank = data & 0x0F,
            CartridgeKind::Plain | CartridgeKind::Mbc2 => return,
        }

        self.refresh_ram_mapping(self.regs.ram_bank as usize & self.ram_bank_mask());
    }

    fn write_banking_mode(&mut self, kind: CartridgeKind, data: u8) {
        match kind {
            CartridgeKind::Mbc1 => {
                self.regs.mode = if data & 0x01 != 0 {
                    BankingMode::Ram
                } else {
                    BankingMode::Rom
                };

                // Multicart wiring reacts to the mode switch immediately.
                if self.multicart() {
                    match self.regs.mode {
                        BankingMode::Ram => self.map_multi64(kind),
                        BankingMode::Rom => {
                            self.banks.set_rom_bank0(0);
                            self.map_rom_bank(kind);
                        }
                    }
                }
            }
            CartridgeKind::Mbc3 => self.rtc.latch(data),
            _ => {}
        }
    }

    /// Read from the ROM (0x0000-0x7FFF), cartridge RAM (0xA000-0xBFFF) or
    /// work RAM (0xC000-0xDFFF) windows.
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.banks.read_rom(addr),
            0xA000..=0xBFFF => self
                .banks
                .read_sram(addr)
                .unwrap_or_else(|| self.rtc.read()),
            0xC000..=0xDFFF => self.banks.read_wram(addr),
            _ => 0xFF,
        }
    }

    /// Write to the cartridge windows. ROM-area writes go to the mapper.
    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x7FFF => self.mbc_write(addr, val),
            0xA000..=0xBFFF => {
                if !self.banks.write_sram(addr, val) {
                    self.rtc.write(val);
                }
            }
            0xC000..=0xDFFF => self.banks.write_wram(addr, val),
            _ => {}
        }
    }

    /// SVBK: select the work RAM bank at 0xD000-0xDFFF. Bank 0 maps bank 1.
    pub fn set_wram_bank(&mut self, bank: usize) {
        self.banks.set_wram_bank(bank);
    }

    pub fn capture_state(&self, state: &mut SaveState) {
        state.mem.rom_bank = self.regs.rom_bank;
        state.mem.ram_bank = self.regs.ram_bank;
        state.mem.enable_ram = self.regs.ram_enabled;
        state.mem.ram_bank_mode = self.regs.mode == BankingMode::Ram;
        state.mem.sram = self.banks.sram().to_vec();
        state.mem.wram = self.banks.wram_all().to_vec();

        self.rtc.capture(&mut state.rtc);
    }

    /// Restore registers and memory, then re-derive the mapped banks exactly
    /// as the live write path would.
    pub fn restore_state(&mut self, state: &SaveState) {
        let Some(kind) = self.kind() else {
            return;
        };

        self.rtc
            .restore(&state.rtc, self.has_rtc() && state.mem.enable_ram);

        self.regs = Registers {
            rom_bank: state.mem.rom_bank,
            ram_bank: state.mem.ram_bank,
            ram_enabled: state.mem.enable_ram,
            mode: if state.mem.ram_bank_mode {
                BankingMode::Ram
            } else {
                BankingMode::Rom
            },
        };
        copy_prefix(self.banks.sram_mut(), &state.mem.sram);
        copy_prefix(self.banks.wram_all_mut(), &state.mem.wram);

        self.refresh_ram_mapping(self.regs.ram_bank as usize);

        if self.regs.mode == BankingMode::Ram && self.multicart() {
            self.map_multi64(kind);
        } else {
            self.banks.set_rom_bank0(0);
            self.map_rom_bank(kind);
        }
    }

    /// Battery-backed RAM to persist, or `None` when the cartridge has no
    /// battery.
    pub fn save_data(&self) -> Option<&[u8]> {
        self.has_battery().then(|| self.banks.sram())
    }

    pub fn save_data_mut(&mut self) -> Option<&mut [u8]> {
        if self.has_battery() {
            Some(self.banks.sram_mut())
        } else {
            None
        }
    }

    /// RTC base time (little-endian seconds) to persist alongside the save.
    pub fn rtc_data(&self) -> Option<[u8; 8]> {
        self.has_rtc()
            .then(|| self.rtc.base_time().to_le_bytes())
    }

    /// Restore a blob produced by [`Cartridge::rtc_data`]. Returns `false`
    /// when the cartridge has no RTC or the blob is too short.
    pub fn load_rtc_data(&mut self, data: &[u8]) -> bool {
        if !self.has_rtc() {
            return false;
        }
        let Some(bytes) = data.get(..8).and_then(|b| <[u8; 8]>::try_from(b).ok()) else {
            return false;
        };
        self.rtc.set_base_time(i64::from_le_bytes(bytes));
        true
    }

    /// Replace the active cheat set with `codes` (`;`-separated).
    ///
    /// Every byte patched by the previous set is restored first. Malformed
    /// codes are skipped.
    pub fn set_cheat_codes(&mut self, codes: &str) {
        self.cheats.revert(self.banks.rom_mut());

        for code in codes.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            match GameGenieCode::parse(code) {
                Some(gg) => {
                    let patched = self.cheats.apply(&gg, self.banks.rom_mut());
                    debug!("cheat {code}: patched {patched} byte(s)");
                }
                None => debug!("skipping malformed cheat code {code:?}"),
            }
        }
    }

    pub fn clear_cheat_codes(&mut self) {
        self.cheats.revert(self.banks.rom_mut());
    }

    pub fn cheat_patch_count(&self) -> usize {
        self.cheats.len()
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi64_remap_formula() {
        assert_eq!(to_multi64_rom_bank(0x01), 0x01);
        assert_eq!(to_multi64_rom_bank(0x1F), 0x0F);
        assert_eq!(to_multi64_rom_bank(0x41), 0x21);
        assert_eq!(to_multi64_rom_bank(0x7F), 0x3F);
    }

    #[test]
    fn copy_prefix_clamps_to_shorter_side() {
        let mut dst = [0u8; 4];
        copy_prefix(&mut dst, &[1, 2]);
        assert_eq!(dst, [1, 2, 0, 0]);
        copy_prefix(&mut dst, &[9; 8]);
        assert_eq!(dst, [9; 4]);
    }

    #[test]
    fn writes_before_load_are_ignored() {
        let mut cart = Cartridge::new();
        cart.mbc_write(0x2000, 0x05);
        cart.write(0xA000, 0x12);
        assert_eq!(cart.rom_bank_select(), 1);
        assert_eq!(cart.read(0x4000), 0xFF);
    }
}
