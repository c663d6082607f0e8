use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gbmapper_core::Cartridge;
use log::info;

/// Battery RAM file stored next to the ROM.
pub fn save_path(rom: &Path) -> PathBuf {
    rom.with_extension("sav")
}

/// RTC base time file stored next to the ROM.
pub fn rtc_path(rom: &Path) -> PathBuf {
    rom.with_extension("rtc")
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fill battery RAM from `<rom>.sav`. A missing file leaves RAM untouched
/// and returns `false`; a short file fills only its prefix.
pub fn load_save(cart: &mut Cartridge, rom: &Path) -> io::Result<bool> {
    let Some(sram) = cart.save_data_mut() else {
        return Ok(false);
    };
    let path = save_path(rom);
    let Some(bytes) = read_optional(&path)? else {
        return Ok(false);
    };
    let len = sram.len().min(bytes.len());
    sram[..len].copy_from_slice(&bytes[..len]);
    info!("Loaded {} bytes of battery RAM from {}", len, path.display());
    Ok(true)
}

/// Restore the clock from `<rom>.rtc`.
pub fn load_rtc(cart: &mut Cartridge, rom: &Path) -> io::Result<bool> {
    if cart.rtc_data().is_none() {
        return Ok(false);
    }
    let path = rtc_path(rom);
    let Some(bytes) = read_optional(&path)? else {
        return Ok(false);
    };
    if !cart.load_rtc_data(&bytes) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is too short for an RTC record", path.display()),
        ));
    }
    Ok(true)
}

/// Write battery RAM and RTC data for whatever the cartridge carries.
pub fn store(cart: &Cartridge, rom: &Path) -> io::Result<()> {
    if let Some(sram) = cart.save_data()
        && !sram.is_empty()
    {
        fs::write(save_path(rom), sram)?;
    }
    if let Some(rtc) = cart.rtc_data() {
        fs::write(rtc_path(rom), rtc)?;
    }
    Ok(())
}
