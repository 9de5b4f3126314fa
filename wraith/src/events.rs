use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use serde::Deserialize;
use serde::Serialize;

use crate::addr::WatchAddress;
use crate::bcd::Score;
use crate::bcd::ScoreBytes;

/// Sent by a breakpoint hook each time the engine reaches a watched address. The score counter is
/// copied while the engine is stopped on the breakpoint, so later writes in the same frame do not
/// change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("watch hit @ {cause}")]
pub struct WatchHit {
    pub cause: WatchAddress,
    pub bytes: ScoreBytes,
}

/// A finished game, as reported by the episode driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("game over @ {cause} with score {score}")]
pub struct GameOver {
    pub score: Score,
    pub cause: WatchAddress,
}

/// Both halves of an unbounded channel. Sending never blocks, so hooks are safe to call from
/// inside the engine's stepping loop.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    crossbeam_channel::unbounded()
}
