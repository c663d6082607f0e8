use std::fmt;
use std::str::FromStr;

/// One scripted CPU write, given on the command line as `ADDR=DATA` in hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusWrite {
    pub addr: u16,
    pub data: u8,
}

fn parse_hex<T>(text: &str, what: &str) -> Result<T, String>
where
    T: TryFrom<u32>,
{
    let digits = text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('$');
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid {what} {text:?}: {e}"))?;
    T::try_from(value).map_err(|_| format!("{what} {text:?} is out of range"))
}

impl FromStr for BusWrite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, data) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ADDR=DATA, got {s:?}"))?;
        Ok(Self {
            addr: parse_hex(addr, "address")?,
            data: parse_hex(data, "data byte")?,
        })
    }
}

impl fmt::Display for BusWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}={:02X}", self.addr, self.data)
    }
}
