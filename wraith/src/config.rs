//! The facts about a ROM that the watch and driver need, bundled so they can be passed in
//! explicitly (and swapped out in tests) rather than read from constants.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::addr::GAME_OVER_ADDRS;
use crate::addr::SCORE_ADDR;
use crate::addr::WatchAddress;
use crate::error::Error;
use crate::rom::SUPPORTED_DIGEST;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// The PCs that signal a game over.
    pub watch: Vec<WatchAddress>,
    /// Where the BCD score counter starts.
    pub score_addr: u16,
    /// The SHA-256 digest, in hex, of the only ROM these addresses are valid for.
    pub rom_digest: String,
    /// When set, only the first hit of an episode produces a game over.
    pub latch: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            watch: GAME_OVER_ADDRS.to_vec(),
            score_addr: SCORE_ADDR,
            rom_digest: SUPPORTED_DIGEST.to_owned(),
            latch: true,
        }
    }
}

impl WatchConfig {
    pub fn from_toml(data: &str) -> Result<Self, Error> {
        Ok(toml::from_str(data)?)
    }

    /// Reads a config from disk. A missing file yields the default config.
    pub fn read(path: &Path) -> Result<Self, Error> {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::from_toml(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {path:?}, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = WatchConfig::from_toml("watch = [0x6803]\nlatch = false").unwrap();
        assert_eq!(config.watch, vec![WatchAddress::new(0x6803)]);
        assert!(!config.latch);
        assert_eq!(config.score_addr, SCORE_ADDR);
        assert_eq!(config.rom_digest, SUPPORTED_DIGEST);
    }

    #[test]
    fn wide_addresses_fail_to_parse() {
        assert!(WatchConfig::from_toml("watch = [0x10000]").is_err());
    }

    #[test]
    fn default_round_trips() {
        let config = WatchConfig::default();
        assert_eq!(WatchConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
    }
}
