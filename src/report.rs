use std::fmt::Write;

use gbmapper_core::{Cartridge, banks::RamMapping};

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Human-readable description of the loaded cartridge and its current bank
/// mapping. Returns an empty string when nothing is loaded.
pub fn summary(cart: &Cartridge) -> String {
    let Some(info) = cart.info() else {
        return String::new();
    };
    let banks = cart.banks();
    let mut out = String::new();

    let _ = writeln!(out, "Title:      {}", info.title);
    let _ = writeln!(
        out,
        "Mapper:     {} (type {:#04x})",
        info.kind.name(),
        info.cart_type
    );
    let _ = writeln!(out, "ROM banks:  {}", info.rom_banks);
    let _ = writeln!(out, "RAM banks:  {}", info.ram_banks);
    let _ = writeln!(out, "CGB:        {}", yes_no(info.cgb));
    let _ = writeln!(out, "Battery:    {}", yes_no(info.battery));
    let _ = writeln!(out, "RTC:        {}", yes_no(info.rtc));
    if info.multicart {
        let _ = writeln!(out, "Multicart:  yes");
    }

    let _ = writeln!(out, "0000-3FFF:  bank {:#04x}", banks.rom_bank0());
    let _ = writeln!(out, "4000-7FFF:  bank {:#04x}", banks.rom_bank());
    let ram = match banks.ram_mapping() {
        RamMapping::Disabled => "disabled".to_string(),
        RamMapping::Bank(bank) => format!("bank {bank:#04x}"),
        RamMapping::Rtc => match cart.rtc().active() {
            Some(reg) => format!("RTC {reg:?}"),
            None => "RTC".to_string(),
        },
    };
    let _ = writeln!(out, "A000-BFFF:  {ram}");
    if cart.cheat_patch_count() > 0 {
        let _ = writeln!(out, "Cheats:     {} byte(s) patched", cart.cheat_patch_count());
    }
    out
}
