use crate::error::LoadError;

/// Size of the cartridge header area that the loader inspects.
pub const HEADER_SIZE: usize = 0x150;

const TITLE_START: usize = 0x0134;
const CGB_FLAG: usize = 0x0143;
const CART_TYPE: usize = 0x0147;
const RAM_SIZE: usize = 0x0149;

/// Memory bank controller family driving the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeKind {
    Plain,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

impl CartridgeKind {
    /// Classify the cartridge type byte at 0x0147.
    pub fn from_header_byte(code: u8) -> Result<Self, LoadError> {
        match code {
            0x00 | 0x08 | 0x09 => Ok(Self::Plain),
            0x01..=0x03 => Ok(Self::Mbc1),
            0x05 | 0x06 => Ok(Self::Mbc2),
            0x0F..=0x13 => Ok(Self::Mbc3),
            0x19..=0x1E => Ok(Self::Mbc5),
            0x0B..=0x0D => Err(unsupported(code, "MMM01")),
            0x15..=0x17 => Err(unsupported(code, "MBC4")),
            0xFC => Err(unsupported(code, "Pocket Camera")),
            0xFD => Err(unsupported(code, "Bandai TAMA5")),
            0xFE => Err(unsupported(code, "HuC3")),
            0xFF => Err(unsupported(code, "HuC1")),
            _ => Err(LoadError::UnknownMapper(code)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "ROM only",
            Self::Mbc1 => "MBC1",
            Self::Mbc2 => "MBC2",
            Self::Mbc3 => "MBC3",
            Self::Mbc5 => "MBC5",
        }
    }

    /// MBC1 and MBC5 cannot map bank 0 into the switchable window.
    pub(crate) fn adjusted_rom_bank(self, bank: usize) -> usize {
        match self {
            Self::Mbc1 if bank & 0x1F == 0 => bank + 1,
            Self::Mbc5 if bank == 0 => 1,
            _ => bank,
        }
    }
}

fn unsupported(code: u8, name: &'static str) -> LoadError {
    LoadError::UnsupportedMapper { code, name }
}

/// Read-only view over the first 0x150 bytes of a ROM image.
pub struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    pub fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn byte(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(0)
    }

    pub fn title(&self) -> String {
        let start = TITLE_START.min(self.data.len());
        let end = CGB_FLAG.min(self.data.len());
        let mut slice = &self.data[start..end];
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    pub fn cart_type(&self) -> u8 {
        self.byte(CART_TYPE)
    }

    pub fn kind(&self) -> Result<CartridgeKind, LoadError> {
        CartridgeKind::from_header_byte(self.cart_type())
    }

    pub fn cgb_supported(&self) -> bool {
        self.byte(CGB_FLAG) & 0x80 != 0
    }

    /// Number of 8 KiB RAM banks declared by the header.
    ///
    /// MBC2 always carries its internal RAM. Undocumented size codes are
    /// treated as the largest defined size.
    pub fn ram_banks(&self) -> usize {
        match self.byte(RAM_SIZE) {
            0x00 => usize::from(matches!(self.kind(), Ok(CartridgeKind::Mbc2))),
            0x01 | 0x02 => 1,
            0x03 => 4,
            _ => 16,
        }
    }

    pub fn has_battery(&self) -> bool {
        has_battery(self.cart_type())
    }

    pub fn has_rtc(&self) -> bool {
        has_rtc(self.cart_type())
    }

    pub fn description(&self) -> &'static str {
        match self.cart_type() {
            0x00 => "Plain ROM",
            0x01 => "MBC1 ROM",
            0x02 => "MBC1 ROM+RAM",
            0x03 => "MBC1 ROM+RAM+BATTERY",
            0x05 => "MBC2 ROM",
            0x06 => "MBC2 ROM+BATTERY",
            0x08 => "Plain ROM+RAM",
            0x09 => "Plain ROM+RAM+BATTERY",
            0x0F => "MBC3 ROM+TIMER+BATTERY",
            0x10 => "MBC3 ROM+TIMER+RAM+BATTERY",
            0x11 => "MBC3 ROM",
            0x12 => "MBC3 ROM+RAM",
            0x13 => "MBC3 ROM+RAM+BATTERY",
            0x19 => "MBC5 ROM",
            0x1A => "MBC5 ROM+RAM",
            0x1B => "MBC5 ROM+RAM+BATTERY",
            0x1C => "MBC5+RUMBLE ROM",
            0x1D => "MBC5+RUMBLE+RAM ROM",
            0x1E => "MBC5+RUMBLE+RAM+BATTERY ROM",
            _ => "unsupported ROM",
        }
    }
}

pub(crate) fn has_battery(cart_type: u8) -> bool {
    matches!(
        cart_type,
        0x03 | 0x06 | 0x09 | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E | 0xFF
    )
}

pub(crate) fn has_rtc(cart_type: u8) -> bool {
    matches!(cart_type, 0x0F | 0x10)
}

pub(crate) fn has_rumble(cart_type: u8) -> bool {
    matches!(cart_type, 0x1C..=0x1E)
}
