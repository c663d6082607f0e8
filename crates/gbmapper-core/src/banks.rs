pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;
pub const WRAM_BANK_SIZE: usize = 0x1000;

/// What the 0xA000-0xBFFF window currently exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamMapping {
    /// Reads return 0xFF and writes are dropped.
    Disabled,
    /// The active RTC register is visible instead of RAM.
    Rtc,
    /// Cartridge RAM bank `n`.
    Bank(usize),
}

/// Owns the cartridge ROM/RAM and work RAM buffers and tracks which banks
/// are mapped into the CPU-visible windows.
#[derive(Debug)]
pub struct BankTable {
    rom: Vec<u8>,
    sram: Vec<u8>,
    wram: Vec<u8>,
    rom_bank0: usize,
    rom_bank: usize,
    ram: RamMapping,
    wram_bank: usize,
}

impl BankTable {
    pub fn new() -> Self {
        Self {
            rom: Vec::new(),
            sram: Vec::new(),
            wram: vec![0; 2 * WRAM_BANK_SIZE],
            rom_bank0: 0,
            rom_bank: 1,
            ram: RamMapping::Disabled,
            wram_bank: 1,
        }
    }

    /// Reallocate every buffer and return to the power-on mapping.
    pub fn reset(&mut self, rom_banks: usize, ram_banks: usize, wram_banks: usize) {
        self.rom = vec![0; rom_banks * ROM_BANK_SIZE];
        self.sram = vec![0; ram_banks * RAM_BANK_SIZE];
        self.wram = vec![0; wram_banks.max(2) * WRAM_BANK_SIZE];
        self.rom_bank0 = 0;
        self.rom_bank = 1 % rom_banks.max(1);
        self.ram = RamMapping::Disabled;
        self.wram_bank = 1;
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn rom_mut(&mut self) -> &mut [u8] {
        &mut self.rom
    }

    pub fn sram(&self) -> &[u8] {
        &self.sram
    }

    pub fn sram_mut(&mut self) -> &mut [u8] {
        &mut self.sram
    }

    /// Work RAM bank `bank`, or an empty slice when out of range.
    pub fn wram(&self, bank: usize) -> &[u8] {
        let start = bank * WRAM_BANK_SIZE;
        self.wram
            .get(start..start + WRAM_BANK_SIZE)
            .unwrap_or_default()
    }

    pub(crate) fn wram_all(&self) -> &[u8] {
        &self.wram
    }

    pub(crate) fn wram_all_mut(&mut self) -> &mut [u8] {
        &mut self.wram
    }

    pub fn rom_bank_count(&self) -> usize {
        self.rom.len() / ROM_BANK_SIZE
    }

    pub fn ram_bank_count(&self) -> usize {
        self.sram.len() / RAM_BANK_SIZE
    }

    pub fn wram_bank_count(&self) -> usize {
        self.wram.len() / WRAM_BANK_SIZE
    }

    pub fn rom_bank0(&self) -> usize {
        self.rom_bank0
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank
    }

    pub fn ram_mapping(&self) -> RamMapping {
        self.ram
    }

    pub fn wram_bank(&self) -> usize {
        self.wram_bank
    }

    fn wrap_rom_bank(&self, bank: usize) -> usize {
        match self.rom_bank_count() {
            0 => 0,
            count => bank % count,
        }
    }

    /// Select the bank visible at 0x0000-0x3FFF.
    pub fn set_rom_bank0(&mut self, bank: usize) {
        self.rom_bank0 = self.wrap_rom_bank(bank);
    }

    /// Select the bank visible at 0x4000-0x7FFF.
    pub fn set_rom_bank(&mut self, bank: usize) {
        self.rom_bank = self.wrap_rom_bank(bank);
    }

    /// Refresh the 0xA000-0xBFFF window. An active RTC register takes
    /// priority over RAM.
    pub fn set_ram_bank(&mut self, enabled: bool, rtc_active: bool, bank: usize) {
        let count = self.ram_bank_count();
        self.ram = if rtc_active {
            RamMapping::Rtc
        } else if enabled && count > 0 {
            RamMapping::Bank(bank % count)
        } else {
            RamMapping::Disabled
        };
    }

    pub fn set_wram_bank(&mut self, bank: usize) {
        let bank = (bank % self.wram_bank_count()).max(1);
        self.wram_bank = bank;
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        let (bank, offset) = if addr < 0x4000 {
            (self.rom_bank0, addr as usize)
        } else {
            (self.rom_bank, (addr as usize - 0x4000) & 0x3FFF)
        };
        self.rom
            .get(bank * ROM_BANK_SIZE + offset)
            .copied()
            .unwrap_or(0xFF)
    }

    fn sram_index(&self, addr: u16) -> Option<usize> {
        match self.ram {
            RamMapping::Bank(bank) => {
                Some(bank * RAM_BANK_SIZE + ((addr as usize - 0xA000) & 0x1FFF))
            }
            _ => None,
        }
    }

    /// Read through the RAM window. Returns `None` when the RTC is mapped.
    pub fn read_sram(&self, addr: u16) -> Option<u8> {
        if self.ram == RamMapping::Rtc {
            return None;
        }
        Some(
            self.sram_index(addr)
                .and_then(|idx| self.sram.get(idx).copied())
                .unwrap_or(0xFF),
        )
    }

    /// Write through the RAM window. Returns `false` when the RTC is mapped
    /// and the caller must route the write to the clock instead.
    pub fn write_sram(&mut self, addr: u16, val: u8) -> bool {
        if self.ram == RamMapping::Rtc {
            return false;
        }
        if let Some(idx) = self.sram_index(addr)
            && let Some(b) = self.sram.get_mut(idx)
        {
            *b = val;
        }
        true
    }

    pub fn read_wram(&self, addr: u16) -> u8 {
        let idx = match addr {
            0xC000..=0xCFFF => addr as usize - 0xC000,
            0xD000..=0xDFFF => self.wram_bank * WRAM_BANK_SIZE + (addr as usize - 0xD000),
            _ => return 0xFF,
        };
        self.wram.get(idx).copied().unwrap_or(0xFF)
    }

    pub fn write_wram(&mut self, addr: u16, val: u8) {
        let idx = match addr {
            0xC000..=0xCFFF => addr as usize - 0xC000,
            0xD000..=0xDFFF => self.wram_bank * WRAM_BANK_SIZE + (addr as usize - 0xD000),
            _ => return,
        };
        if let Some(b) = self.wram.get_mut(idx) {
            *b = val;
        }
    }
}

impl Default for BankTable {
    fn default() -> Self {
        Self::new()
    }
}
