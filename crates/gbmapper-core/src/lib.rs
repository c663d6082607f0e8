//! Game Boy cartridge memory bank controller (MBC) emulation.
//!
//! This crate reproduces how cartridge hardware (plain ROM, MBC1, MBC2, MBC3
//! and MBC5, with optional battery RAM and an MBC3 real-time clock) responds
//! to CPU writes into 0x0000-0x7FFF, and exposes the currently mapped ROM/RAM
//! banks to the rest of an emulator through [`cartridge::Cartridge`].

/// Bank pointer table: ROM/RAM/WRAM buffers and the currently mapped banks.
pub mod banks;

/// Cartridge facade: ROM loading, the bank-switch write decoder, save states.
pub mod cartridge;

/// Game Genie code decoding and the reversible ROM patch log.
pub mod cheats;

/// Load-time error types.
pub mod error;

/// Cartridge header parsing and mapper classification.
pub mod header;

/// MBC3 real-time clock chip.
pub mod rtc;

/// Save-state container for cartridge and RTC registers.
pub mod savestate;

pub use cartridge::Cartridge;
pub use error::LoadError;
pub use header::CartridgeKind;
