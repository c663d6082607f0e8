use std::io;

use thiserror::Error;

/// Reasons a ROM image can be rejected by [`crate::Cartridge::load_rom`].
///
/// A failed load leaves the previously loaded cartridge (if any) untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM image is too small ({size:#x} bytes, need at least {min:#x})")]
    TooSmall { size: usize, min: usize },

    #[error("{name} cartridges are not supported (type byte {code:#04x})")]
    UnsupportedMapper { code: u8, name: &'static str },

    #[error("unknown cartridge type byte {0:#04x}; corrupt or unsupported ROM")]
    UnknownMapper(u8),

    #[error("failed to read ROM image: {0}")]
    Io(#[from] io::Error),
}
