//! Packed binary-coded decimal, as the game stores its score.
//!
//! The counter is three bytes, least significant byte first. Within a byte the low nibble is the
//! less significant digit, so `[0x73, 0x64, 0x01]` reads as `016473`.

use serde::Deserialize;
use serde::Serialize;

use crate::addr::SCORE_LEN;
use crate::engine::MemoryLike;
use crate::engine::MemoryLikeExt;
use crate::error::BcdError;

/// The largest value six decimal digits can hold.
pub const MAX_SCORE: u32 = 999_999;

/// The raw score counter, captured from WRAM when a watch fires.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Into,
)]
pub struct ScoreBytes(pub [u8; SCORE_LEN]);

/// A decoded score.
#[derive(
    Debug,
    Default,
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
#[serde(transparent)]
pub struct Score(u32);

impl Score {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl ScoreBytes {
    /// Copies the counter starting at `base` out of memory.
    pub fn capture<M: MemoryLike + ?Sized>(mem: &M, base: u16) -> Self {
        Self(mem.read_window::<SCORE_LEN>(base))
    }

    pub fn decode(self) -> Result<Score, BcdError> {
        decode(self.0)
    }
}

/// Decodes the counter into a number. Every nibble must be a decimal digit.
pub fn decode(bytes: [u8; SCORE_LEN]) -> Result<Score, BcdError> {
    bytes
        .iter()
        .enumerate()
        .rev()
        .try_fold(0u32, |acc, (byte, &b)| -> Result<u32, BcdError> {
            let hi = digit(byte, b >> 4)?;
            let lo = digit(byte, b & 0x0F)?;
            Ok(acc * 100 + hi * 10 + lo)
        })
        .map(Score)
}

fn digit(byte: usize, nibble: u8) -> Result<u32, BcdError> {
    if nibble > 9 {
        return Err(BcdError::MalformedDigit { byte, nibble });
    }
    Ok(nibble as u32)
}

/// Packs a score into the layout the game uses.
pub fn encode(score: u32) -> Result<ScoreBytes, BcdError> {
    if score > MAX_SCORE {
        return Err(BcdError::Overflow(score));
    }
    let mut bytes = [0u8; SCORE_LEN];
    let mut rest = score;
    for b in bytes.iter_mut() {
        let lo = (rest % 10) as u8;
        let hi = ((rest / 10) % 10) as u8;
        *b = (hi << 4) | lo;
        rest /= 100;
    }
    Ok(ScoreBytes(bytes))
}

/// Reads the counter starting at `base` and decodes it.
pub fn read_score<M: MemoryLike + ?Sized>(mem: &M, base: u16) -> Result<Score, BcdError> {
    ScoreBytes::capture(mem, base).decode()
}
