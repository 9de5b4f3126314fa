use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure that the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bcd(#[from] BcdError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error(transparent)]
    Rom(#[from] RomError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("bad config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("engine error: {0}")]
    Engine(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Errors from packing or unpacking the BCD score counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BcdError {
    /// A nibble held 0xA-0xF. Either the memory is corrupted or this is not the supported ROM.
    #[error("byte {byte} holds nibble 0x{nibble:X}, which is not a decimal digit")]
    MalformedDigit { byte: usize, nibble: u8 },
    #[error("{0} does not fit in six decimal digits")]
    Overflow(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("at least one watch address is required")]
    NoAddresses,
    #[error("0x{0:X} does not fit in a 16-bit address")]
    OutOfRange(u32),
    #[error("more than {0} distinct watch addresses were given")]
    TooManyAddresses(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("unsupported ROM: digest {found} does not match {expected}")]
    UnsupportedRom { found: String, expected: String },
    #[error("'{0}' is not a 64 character hex SHA-256 digest")]
    MalformedDigest(String),
    #[error("ROM is {0} bytes, too short to hold a cartridge header")]
    Truncated(usize),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not parse recording: {0}")]
    Recording(#[from] toml::de::Error),
    #[error("bad snapshot: {0}")]
    Snapshot(#[from] postcard::Error),
    #[error("snapshot memory is {0} bytes, expected 65536")]
    SnapshotSize(usize),
    #[error("screen has {0} pixels, expected 160x144")]
    ScreenSize(usize),
}
