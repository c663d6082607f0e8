use std::fs;

use gbmapper::{
    config::{self, CliConfig},
    persist, report,
};
use gbmapper_core::Cartridge;
use tempfile::tempdir;

fn rom_image(cart_type: u8, ram_size: u8, banks: usize) -> Vec<u8> {
    let mut rom = vec![0u8; banks * 0x4000];
    rom[0x0134..0x0139].copy_from_slice(b"HOSTS");
    rom[0x0147] = cart_type;
    rom[0x0149] = ram_size;
    rom
}

fn loaded(cart_type: u8, ram_size: u8) -> Cartridge {
    let mut cart = Cartridge::new();
    cart.load_rom(&rom_image(cart_type, ram_size, 4), false, false)
        .unwrap();
    cart
}

#[test]
fn config_reads_all_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "force_dmg = true\nmulticart_compat = true\ncheats = \"AB1-50F\"\n",
    )
    .unwrap();

    let cfg = config::load_from_file(&path);
    assert!(cfg.force_dmg);
    assert!(cfg.multicart_compat);
    assert_eq!(cfg.cheats.as_deref(), Some("AB1-50F"));
}

#[test]
fn config_missing_keys_use_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "multicart_compat = true\n").unwrap();

    let cfg = config::load_from_file(&path);
    assert_eq!(
        cfg,
        CliConfig {
            multicart_compat: true,
            ..CliConfig::default()
        }
    );
}

#[test]
fn config_falls_back_on_missing_or_broken_file() {
    let dir = tempdir().unwrap();
    assert_eq!(
        config::load_from_file(&dir.path().join("absent.toml")),
        CliConfig::default()
    );

    let path = dir.path().join("broken.toml");
    fs::write(&path, "force_dmg = \"maybe\"").unwrap();
    assert_eq!(config::load_from_file(&path), CliConfig::default());
}

#[test]
fn default_config_path_names_the_tool() {
    let path = config::default_config_path();
    assert!(path.ends_with("config.toml"));
}

#[test]
fn battery_ram_and_rtc_roundtrip_through_files() {
    let dir = tempdir().unwrap();
    let rom = dir.path().join("game.gbc");

    let mut cart = loaded(0x10, 0x03);
    cart.save_data_mut().unwrap()[0x10] = 0x42;
    persist::store(&cart, &rom).unwrap();
    assert_eq!(fs::read(dir.path().join("game.sav")).unwrap().len(), 4 * 0x2000);
    assert_eq!(fs::read(dir.path().join("game.rtc")).unwrap().len(), 8);

    let mut fresh = loaded(0x10, 0x03);
    assert!(persist::load_save(&mut fresh, &rom).unwrap());
    assert!(persist::load_rtc(&mut fresh, &rom).unwrap());
    assert_eq!(fresh.save_data().unwrap()[0x10], 0x42);
    assert_eq!(fresh.rtc().base_time(), cart.rtc().base_time());
}

#[test]
fn missing_save_files_are_not_errors() {
    let dir = tempdir().unwrap();
    let rom = dir.path().join("game.gb");
    let mut cart = loaded(0x10, 0x03);
    assert!(!persist::load_save(&mut cart, &rom).unwrap());
    assert!(!persist::load_rtc(&mut cart, &rom).unwrap());
}

#[test]
fn carts_without_battery_write_nothing() {
    let dir = tempdir().unwrap();
    let rom = dir.path().join("game.gb");
    let cart = loaded(0x02, 0x02);
    persist::store(&cart, &rom).unwrap();
    assert!(!persist::save_path(&rom).exists());
    assert!(!persist::rtc_path(&rom).exists());
}

#[test]
fn short_rtc_file_is_rejected() {
    let dir = tempdir().unwrap();
    let rom = dir.path().join("game.gb");
    fs::write(persist::rtc_path(&rom), [1, 2, 3]).unwrap();
    let mut cart = loaded(0x0F, 0x00);
    assert!(persist::load_rtc(&mut cart, &rom).is_err());
}

#[test]
fn summary_shows_current_mapping() {
    let mut cart = loaded(0x13, 0x03);
    cart.mbc_write(0x0000, 0x0A);
    cart.mbc_write(0x2000, 0x03);
    cart.mbc_write(0x4000, 0x02);

    let text = report::summary(&cart);
    assert!(text.contains("HOSTS"));
    assert!(text.contains("MBC3 (type 0x13)"));
    assert!(text.contains("4000-7FFF:  bank 0x03"));
    assert!(text.contains("A000-BFFF:  bank 0x02"));
    assert!(!text.contains("Cheats"));
}
