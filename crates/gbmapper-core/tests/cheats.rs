mod common;

use common::{high_bank, load};

#[test]
fn high_window_code_patches_every_switchable_bank() {
    let mut cart = load(0x01, 0x00, 8);
    cart.set_cheat_codes("3C1-23B");
    assert_eq!(cart.cheat_patch_count(), 7);

    for bank in 1..8u8 {
        cart.mbc_write(0x2000, bank);
        assert_eq!(cart.read(0x4123), 0x3C, "bank {bank}");
    }
    assert_eq!(cart.read(0x0123), 0x00);
}

#[test]
fn low_window_code_patches_bank_zero_only() {
    let mut cart = load(0x01, 0x00, 8);
    cart.set_cheat_codes("AB1-50F");
    assert_eq!(cart.cheat_patch_count(), 1);
    assert_eq!(cart.read(0x0150), 0xAB);
    assert_eq!(cart.banks().rom()[0x4000 + 0x0150], 0x00);
}

#[test]
fn compare_byte_limits_patch_to_matching_bank() {
    let mut cart = load(0x01, 0x00, 8);
    // Write 0x99 at 0x7FFF wherever the ROM holds 0x07.
    cart.set_cheat_codes("99F-FF8-FE6");
    assert_eq!(cart.cheat_patch_count(), 1);

    cart.mbc_write(0x2000, 7);
    assert_eq!(high_bank(&cart), 0x99);
    cart.mbc_write(0x2000, 6);
    assert_eq!(high_bank(&cart), 6);
}

#[test]
fn new_set_replaces_previous_patches() {
    let mut cart = load(0x01, 0x00, 8);
    cart.set_cheat_codes("AB1-50F");
    cart.set_cheat_codes("CD1-51F");
    assert_eq!(cart.cheat_patch_count(), 1);
    assert_eq!(cart.read(0x0150), 0x00);
    assert_eq!(cart.read(0x0151), 0xCD);
}

#[test]
fn separators_whitespace_and_malformed_codes() {
    let mut cart = load(0x01, 0x00, 8);
    cart.set_cheat_codes(" ;;AB1-50F ; ");
    assert_eq!(cart.cheat_patch_count(), 1);
    assert_eq!(cart.read(0x0150), 0xAB);

    cart.set_cheat_codes("XYZ;12");
    assert_eq!(cart.cheat_patch_count(), 0);
    assert_eq!(cart.read(0x0150), 0x00);

    cart.set_cheat_codes("");
    assert_eq!(cart.cheat_patch_count(), 0);
}

#[test]
fn clearing_restores_pristine_rom() {
    let mut cart = load(0x19, 0x00, 16);
    let pristine = cart.banks().rom().to_vec();

    cart.set_cheat_codes("3C1-23B;AB1-50F;99F-FF8-FE6");
    assert_ne!(cart.banks().rom(), &pristine[..]);

    cart.clear_cheat_codes();
    assert_eq!(cart.cheat_patch_count(), 0);
    assert_eq!(cart.banks().rom(), &pristine[..]);
}
