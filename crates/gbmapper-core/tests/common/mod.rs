#![allow(dead_code)]

use gbmapper_core::{
    Cartridge,
    rtc::{Clock, ManualClock},
};

pub const ROM_BANK: usize = 0x4000;

/// Build a ROM image whose banks are tagged: byte 0 and byte 0x3FFF of every
/// bank hold the bank number, so the mapped bank can be read back through
/// either window.
pub fn rom_image(cart_type: u8, ram_size: u8, banks: usize) -> Vec<u8> {
    let mut rom = vec![0u8; banks * ROM_BANK];
    for bank in 0..banks {
        rom[bank * ROM_BANK + 0x3FFF] = bank as u8;
        if bank > 0 {
            rom[bank * ROM_BANK] = bank as u8;
        }
    }
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = cart_type;
    rom[0x0149] = ram_size;
    rom
}

pub fn load(cart_type: u8, ram_size: u8, banks: usize) -> Cartridge {
    load_with(cart_type, ram_size, banks, false)
}

pub fn load_with(cart_type: u8, ram_size: u8, banks: usize, multicart: bool) -> Cartridge {
    let mut cart = Cartridge::new();
    cart.load_rom(&rom_image(cart_type, ram_size, banks), false, multicart)
        .expect("synthetic ROM should load");
    cart
}

pub fn load_with_clock(cart_type: u8, ram_size: u8, banks: usize, clock: &ManualClock) -> Cartridge {
    let boxed: Box<dyn Clock> = Box::new(clock.clone());
    let mut cart = Cartridge::with_clock(boxed);
    cart.load_rom(&rom_image(cart_type, ram_size, banks), false, false)
        .expect("synthetic ROM should load");
    cart
}

/// Bank number visible in the switchable window.
pub fn high_bank(cart: &Cartridge) -> u8 {
    cart.read(0x7FFF)
}

/// Bank number visible in the fixed window.
pub fn low_bank(cart: &Cartridge) -> u8 {
    cart.read(0x3FFF)
}
