//! Wraith watches a Game Boy emulator running Tetris and reports when, and with what score, each
//! game ends. It does not emulate anything itself. An emulator is plugged in through the
//! [`Engine`] trait, and wraith installs breakpoints on it at the three places the game's code
//! enters its game over routine. When one fires, the packed BCD score counter is copied out of
//! WRAM and decoded.
//!
//! The addresses were found by hand on a single revision of the ROM. [`rom::verify`] guards every
//! entry point that loads a real cartridge.
//!
//! # Layout
//!  - [`watch`] installs the breakpoints and forwards hits into a channel.
//!  - [`bcd`] decodes (and encodes) the score counter.
//!  - [`env`] is the episode driver built from the two.
//!  - [`replay`] is an engine that plays back recorded runs, for tooling and tests.

pub mod addr;
pub mod bcd;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod replay;
pub mod rom;
pub mod watch;

pub use addr::GAME_OVER_ADDRS;
pub use addr::SCORE_ADDR;
pub use addr::WatchAddress;
pub use bcd::Score;
pub use bcd::ScoreBytes;
pub use config::WatchConfig;
pub use engine::Engine;
pub use engine::MemoryLike;
pub use engine::MemoryLikeExt;
pub use engine::Key;
pub use env::Environment;
pub use error::Error;
pub use error::Result;
pub use events::GameOver;
pub use events::WatchHit;
pub use watch::WatchRegistry;
