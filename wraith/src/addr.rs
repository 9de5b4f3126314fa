//! Addresses recovered from the supported Tetris ROM revision.
//!
//! None of these values mean anything for any other cartridge. They are only trusted after the
//! cartridge has passed [`crate::rom::verify`].

use serde::Deserialize;
use serde::Serialize;

use crate::error::WatchError;

/// The PC values at which the game-over routine is entered. The game reaches game over through
/// three different code paths; all three are treated as the same signal.
pub const GAME_OVER_ADDRS: [WatchAddress; 3] = [
    WatchAddress(0x6803),
    WatchAddress(0x690D),
    WatchAddress(0x6964),
];

/// The first byte of the packed BCD score counter in WRAM.
pub const SCORE_ADDR: u16 = 0xC0A0;

/// The number of bytes in the score counter, `0xC0A0..=0xC0A2`.
pub const SCORE_LEN: usize = 3;

/// A program counter value that an engine should break on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[display("0x{_0:0>4X}")]
#[serde(transparent)]
pub struct WatchAddress(u16);

impl WatchAddress {
    pub const fn new(pc: u16) -> Self {
        Self(pc)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u32> for WatchAddress {
    type Error = WatchError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .map(Self)
            .map_err(|_| WatchError::OutOfRange(value))
    }
}

/// Parses an address written as decimal, `0x` hex, or `0b` binary.
pub fn parse_addr(input: &str) -> Result<u16, std::num::ParseIntError> {
    if let Some(input) = input.strip_prefix("0x") {
        u16::from_str_radix(input, 16)
    } else if let Some(input) = input.strip_prefix("0b") {
        u16::from_str_radix(input, 2)
    } else {
        input.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_padded_hex() {
        assert_eq!(WatchAddress::new(0x6803).to_string(), "0x6803");
        assert_eq!(WatchAddress::new(0x42).to_string(), "0x0042");
    }

    #[test]
    fn wide_values_are_rejected() {
        assert_eq!(
            WatchAddress::try_from(0x1_0000u32),
            Err(WatchError::OutOfRange(0x1_0000))
        );
        assert_eq!(WatchAddress::try_from(0xFFFFu32), Ok(WatchAddress::new(0xFFFF)));
    }

    #[test]
    fn parse_prefixes() {
        assert_eq!(parse_addr("0x690D"), Ok(0x690D));
        assert_eq!(parse_addr("0b101"), Ok(5));
        assert_eq!(parse_addr("26979"), Ok(0x6963));
        assert!(parse_addr("0x10000").is_err());
    }
}
