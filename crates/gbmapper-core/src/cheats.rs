use crate::banks::ROM_BANK_SIZE;

/// Decoded Game Genie code: write `value` at `address`, optionally only
/// where the ROM currently holds `compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameGenieCode {
    pub value: u8,
    pub address: u16,
    pub compare: Option<u8>,
}

impl GameGenieCode {
    /// Decode a `VVA-AAA-CCC` code. Short codes, or codes with a non-hex
    /// digit at a decoded position, yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.as_bytes();
        if code.len() < 7 {
            return None;
        }
        let hex = |pos: usize| -> Option<u16> {
            char::from(code[pos]).to_digit(16).map(|d| d as u16)
        };

        let value = (hex(0)? << 4 | hex(1)?) as u8;
        let address =
            (hex(2)? << 8 | hex(4)? << 4 | hex(5)? | (hex(6)? ^ 0xF) << 12) & 0x7FFF;

        let compare = if code.len() >= 11 {
            let cmp = ((hex(8)? << 4 | hex(10)?) as u8) ^ 0xFF;
            Some(cmp.rotate_right(2) ^ 0x45)
        } else {
            None
        };

        Some(Self {
            value,
            address,
            compare,
        })
    }

    /// A low-window address can only be reached through bank 0, a high-window
    /// address only through the switchable banks.
    fn reachable_through(&self, bank: usize) -> bool {
        (self.address < 0x4000) == (bank == 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RomPatch {
    offset: usize,
    original: u8,
}

/// Undo log of every ROM byte overwritten by the active cheat set.
#[derive(Debug, Default)]
pub struct PatchLog {
    undo: Vec<RomPatch>,
}

impl PatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Patch every bank the code's address could be mapped from. Returns the
    /// number of bytes overwritten.
    pub fn apply(&mut self, code: &GameGenieCode, rom: &mut [u8]) -> usize {
        let offset_in_bank = (code.address & 0x3FFF) as usize;
        let mut patched = 0;
        for bank in 0..rom.len() / ROM_BANK_SIZE {
            if !code.reachable_through(bank) {
                continue;
            }
            let offset = bank * ROM_BANK_SIZE + offset_in_bank;
            let original = rom[offset];
            if code.compare.is_some_and(|cmp| cmp != original) {
                continue;
            }
            self.undo.push(RomPatch { offset, original });
            rom[offset] = code.value;
            patched += 1;
        }
        patched
    }

    /// Restore every patched byte, newest first, and empty the log.
    pub fn revert(&mut self, rom: &mut [u8]) {
        for patch in self.undo.drain(..).rev() {
            if let Some(b) = rom.get_mut(patch.offset) {
                *b = patch.original;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_value_and_address() {
        let code = GameGenieCode::parse("00A-17B").unwrap();
        assert_eq!(code.value, 0x00);
        // A, 1, 7 form the low three nibbles, B ^ F = 4 the top nibble.
        assert_eq!(code.address, 0x4A17);
        assert_eq!(code.compare, None);
    }

    #[test]
    fn decodes_compare_byte() {
        let code = GameGenieCode::parse("3E1-BFD-E62").unwrap();
        assert_eq!(code.value, 0x3E);
        assert_eq!(code.address, 0x21BF);
        // (E2 ^ FF) = 1D, ror 2 = 47, ^ 45 = 02
        assert_eq!(code.compare, Some(0x02));
    }

    #[test]
    fn rejects_short_and_malformed_codes() {
        assert_eq!(GameGenieCode::parse(""), None);
        assert_eq!(GameGenieCode::parse("00A-17"), None);
        assert_eq!(GameGenieCode::parse("0GA-17B"), None);
        assert!(GameGenieCode::parse("0fa-17b").is_some());
    }

    #[test]
    fn patches_only_reachable_banks() {
        let mut rom = vec![0u8; 4 * ROM_BANK_SIZE];
        let mut log = PatchLog::new();

        let high = GameGenieCode {
            value: 0x99,
            address: 0x4010,
            compare: None,
        };
        assert_eq!(log.apply(&high, &mut rom), 3);
        assert_eq!(rom[0x0010], 0x00);
        for bank in 1..4 {
            assert_eq!(rom[bank * ROM_BANK_SIZE + 0x10], 0x99);
        }

        let low = GameGenieCode {
            value: 0x77,
            address: 0x0020,
            compare: None,
        };
        assert_eq!(log.apply(&low, &mut rom), 1);
        assert_eq!(rom[0x0020], 0x77);
        assert_eq!(rom[ROM_BANK_SIZE + 0x20], 0x00);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn compare_byte_filters_banks() {
        let mut rom = vec![0u8; 4 * ROM_BANK_SIZE];
        rom[2 * ROM_BANK_SIZE + 0x100] = 0x5A;
        let mut log = PatchLog::new();
        let code = GameGenieCode {
            value: 0x01,
            address: 0x4100,
            compare: Some(0x5A),
        };
        assert_eq!(log.apply(&code, &mut rom), 1);
        assert_eq!(rom[2 * ROM_BANK_SIZE + 0x100], 0x01);
        assert_eq!(rom[ROM_BANK_SIZE + 0x100], 0x00);
    }

    #[test]
    fn revert_restores_overlapping_patches() {
        let mut rom = vec![0x42u8; 2 * ROM_BANK_SIZE];
        let pristine = rom.clone();
        let mut log = PatchLog::new();
        for value in [0x10, 0x20, 0x30] {
            let code = GameGenieCode {
                value,
                address: 0x4000,
                compare: None,
            };
            log.apply(&code, &mut rom);
        }
        assert_eq!(rom[ROM_BANK_SIZE], 0x30);

        log.revert(&mut rom);
        assert!(log.is_empty());
        assert_eq!(rom, pristine);
    }

    #[test]
    fn revert_skips_offsets_past_shrunk_rom() {
        let mut rom = vec![0u8; 4 * ROM_BANK_SIZE];
        let mut log = PatchLog::new();
        let code = GameGenieCode {
            value: 0xEE,
            address: 0x4000,
            compare: None,
        };
        log.apply(&code, &mut rom);

        let mut shrunk = vec![0xEEu8; 2 * ROM_BANK_SIZE];
        log.revert(&mut shrunk);
        assert_eq!(shrunk[ROM_BANK_SIZE], 0x00);
        assert!(log.is_empty());
    }
}
