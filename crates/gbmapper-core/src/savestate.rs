/// Snapshot of everything the cartridge persists between sessions.
///
/// The mapper registers are stored raw; effective banks are re-derived on
/// restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    pub mem: MemState,
    pub rtc: RtcState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemState {
    /// Raw ROM bank select register (up to 9 bits on MBC5).
    pub rom_bank: u16,
    /// Raw RAM bank select register.
    pub ram_bank: u8,
    pub enable_ram: bool,
    /// MBC1 banking mode latch (`true` = RAM banking mode).
    pub ram_bank_mode: bool,
    pub sram: Vec<u8>,
    pub wram: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcState {
    pub base_time: i64,
    pub halt_time: i64,
    pub index: u8,
    pub data_dh: u8,
    pub data_dl: u8,
    pub data_h: u8,
    pub data_m: u8,
    pub data_s: u8,
    pub last_latch_data: bool,
}
