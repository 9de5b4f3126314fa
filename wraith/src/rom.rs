//! Identifying the cartridge. Every address in [`crate::addr`] was found by hand on one build of
//! the game, so the ROM is hashed and checked before any of them are trusted.

use sha2::Digest;
use sha2::Sha256;

use crate::error::RomError;

/// SHA-256 of the only supported ROM revision.
pub const SUPPORTED_DIGEST: &str =
    "0d6535aef23969c7e5af2b077acaddb4a445b3d0df7bf34c8acef07b51b015c3";

/// Hex encoded SHA-256 of the entire file.
pub fn digest(rom: &[u8]) -> String {
    Sha256::digest(rom)
        .iter()
        .map(|b| format!("{b:0>2x}"))
        .collect()
}

/// Fails unless `rom` hashes to `expected`. The expected digest is validated first, so a typo in
/// a config is reported as such rather than as an unsupported ROM.
pub fn verify(rom: &[u8], expected: &str) -> Result<(), RomError> {
    let expected = expected.trim().to_ascii_lowercase();
    if expected.len() != 64 || !expected.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RomError::MalformedDigest(expected));
    }
    let found = digest(rom);
    if found != expected {
        return Err(RomError::UnsupportedRom { found, expected });
    }
    Ok(())
}

/// The parts of the cartridge header, `0x100..=0x14F`, that are useful when reporting which
/// cartridge was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// `0x134..=0x142`, zero-padded.
    title: [u8; 15],
    /// The byte at `0x14C`.
    mask_rom_version: u8,
    /// The byte at `0x14D`. The boot ROM refuses to start if this does not match the checksum of
    /// `0x134..=0x14C`.
    header_checksum: u8,
    /// The big-endian word at `0x14E`.
    global_checksum: u16,
}

impl CartridgeHeader {
    pub const START_ADDR: usize = 0x100;
    pub const END_ADDR: usize = 0x14F;
    pub const LENGTH: usize = Self::END_ADDR - Self::START_ADDR + 1;

    pub fn extract_from_rom(rom: &[u8]) -> Result<Self, RomError> {
        if rom.len() <= Self::END_ADDR {
            return Err(RomError::Truncated(rom.len()));
        }
        let mut title = [0; 15];
        title.copy_from_slice(&rom[0x134..=0x142]);
        Ok(Self {
            title,
            mask_rom_version: rom[0x14C],
            header_checksum: rom[0x14D],
            global_checksum: u16::from_be_bytes([rom[0x14E], rom[0x14F]]),
        })
    }

    /// The title with the padding stripped and anything that isn't printable ASCII dropped.
    pub fn title(&self) -> String {
        self.title
            .iter()
            .take_while(|b| **b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|b| *b as char)
            .collect()
    }

    pub fn mask_rom_version(&self) -> u8 {
        self.mask_rom_version
    }

    pub fn header_checksum(&self) -> u8 {
        self.header_checksum
    }

    pub fn global_checksum(&self) -> u16 {
        self.global_checksum
    }
}

/// Computes the header checksum over `0x134..=0x14C` the way the boot ROM does.
pub fn header_checksum(rom: &[u8]) -> Result<u8, RomError> {
    let Some(header) = rom.get(0x134..0x14D) else {
        return Err(RomError::Truncated(rom.len()));
    };
    Ok(header
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_sub(b).wrapping_sub(1)))
}
