//! The work behind `scan` and `replay`, kept apart from file handling and printing.

use anyhow::bail;
use tracing::info;
use wraith::Environment;
use wraith::GameOver;
use wraith::Score;
use wraith::WatchConfig;
use wraith::addr::SCORE_LEN;
use wraith::bcd;
use wraith::replay::Recording;
use wraith::replay::ReplayEngine;

/// Decodes the score out of a memory dump that was taken starting at `base`. The dump must cover
/// the whole counter.
pub fn scan_score(image: &[u8], base: u16, config: &WatchConfig) -> anyhow::Result<Score> {
    let start = base as usize;
    let end = start + image.len();
    let score = config.score_addr as usize;
    if score < start || score + SCORE_LEN > end {
        bail!(
            "the dump covers 0x{start:0>4X}..0x{end:0>4X}, which misses the score at 0x{score:0>4X}"
        );
    }
    let engine = ReplayEngine::with_memory(Recording::default(), image, base);
    Ok(bcd::read_score(&engine, config.score_addr)?)
}

/// Plays up to `limit` frames of `recording` through the watches and returns every game over,
/// along with the frame it happened in. After each game over, the next game starts from a
/// snapshot of wherever the recording is.
pub fn replay_games(
    recording: Recording,
    limit: Option<usize>,
    rom: Option<&[u8]>,
    config: WatchConfig,
) -> anyhow::Result<Vec<(usize, GameOver)>> {
    let total = recording.frames.len();
    let engine = ReplayEngine::new(recording);
    let mut env = match rom {
        Some(rom) => Environment::new(engine, rom, config)?,
        None => Environment::without_rom_check(engine, config)?,
    };

    let limit = limit.unwrap_or(total).min(total);
    let mut overs = Vec::new();
    for frame in 0..limit {
        if !env.is_running() {
            let snapshot = env.engine().save_state()?;
            env.start_episode(&snapshot)?;
        }
        if let Some(over) = env.run_frame()? {
            overs.push((frame, over));
        }
    }
    info!("Replayed {limit} of {total} frames, {} game(s) ended", overs.len());
    Ok(overs)
}
