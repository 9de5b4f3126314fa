//! The episode driver. This ties the engine, the watch registry, and the score decoder together
//! into a loop a learning agent can drive: start an episode, run frames and press keys until the
//! game ends, read the score, and start again.

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use rand::Rng;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::bcd::Score;
use crate::bcd::read_score;
use crate::config::WatchConfig;
use crate::engine::Engine;
use crate::engine::Key;
use crate::error::Error;
use crate::error::Result;
use crate::events::GameOver;
use crate::events::WatchHit;
use crate::events::channel;
use crate::rom;
use crate::rom::CartridgeHeader;
use crate::watch::WatchRegistry;

pub struct Environment<E: Engine> {
    engine: E,
    registry: WatchRegistry,
    config: WatchConfig,
    hits: Receiver<WatchHit>,
    send: Sender<GameOver>,
    recv: Receiver<GameOver>,
    running: bool,
    last: Option<GameOver>,
    ignored: usize,
}

impl<E: Engine> Environment<E> {
    /// Checks that `rom` is the supported revision and then installs the game over watches on
    /// the engine. The engine is expected to already have `rom` loaded.
    pub fn new(engine: E, rom: &[u8], config: WatchConfig) -> Result<Self> {
        rom::verify(rom, &config.rom_digest)?;
        let header = CartridgeHeader::extract_from_rom(rom)?;
        info!(
            "Loaded '{}' (mask ROM v{}, global checksum 0x{:0>4X})",
            header.title(),
            header.mask_rom_version(),
            header.global_checksum()
        );
        Self::without_rom_check(engine, config)
    }

    /// Installs the watches without looking at the ROM. Only use this with engines that do not
    /// run a real cartridge, such as [`crate::replay::ReplayEngine`].
    pub fn without_rom_check(mut engine: E, config: WatchConfig) -> Result<Self> {
        let (hit_send, hits) = channel();
        let registry = WatchRegistry::register(
            &mut engine,
            config.watch.iter().copied(),
            config.score_addr,
            hit_send,
        )?;
        let (send, recv) = channel();
        Ok(Self {
            engine,
            registry,
            config,
            hits,
            send,
            recv,
            running: false,
            last: None,
            ignored: 0,
        })
    }

    /// Restores `start_state` and reseeds the game's piece generator.
    pub fn start_episode(&mut self, start_state: &[u8]) -> Result<()> {
        let seed = rand::thread_rng().gen_range(0..0xFFFF);
        self.start_episode_seeded(start_state, seed)
    }

    pub fn start_episode_seeded(&mut self, start_state: &[u8], seed: u16) -> Result<()> {
        self.engine.load_state(start_state).map_err(engine_err)?;
        self.engine.set_div(seed);
        let stale = self.hits.try_iter().count();
        if stale != 0 {
            debug!("Discarding {stale} watch hits from the previous episode");
        }
        debug!("Starting episode with DIV seed 0x{seed:0>4X}");
        self.running = true;
        self.last = None;
        self.ignored = 0;
        Ok(())
    }

    /// Emulates one frame. If the game ended during it, the game over is returned and also sent
    /// to every receiver handed out by [`Environment::events`].
    ///
    /// A hit whose score does not decode still ends the episode. Every hit of the frame is
    /// handled before the first such error is returned.
    pub fn run_frame(&mut self) -> Result<Option<GameOver>> {
        self.engine.run_frame().map_err(engine_err)?;
        let hits: Vec<_> = self.hits.try_iter().collect();
        let mut first = None;
        let mut failed = None;
        for hit in hits {
            if !self.running && self.config.latch {
                self.ignored += 1;
                debug!("Ignoring {hit}, the episode is not running");
                continue;
            }
            self.running = false;
            let score = match hit.bytes.decode() {
                Ok(score) => score,
                Err(err) => {
                    warn!("Game over @ {} with an unreadable score: {err}", hit.cause);
                    failed.get_or_insert(err);
                    continue;
                }
            };
            let over = GameOver {
                score,
                cause: hit.cause,
            };
            info!("{over}");
            self.last = Some(over);
            // `self` holds a receiver, so this can not fail
            _ = self.send.send(over);
            first.get_or_insert(over);
        }
        match failed {
            Some(err) => Err(err.into()),
            None => Ok(first),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Reads and decodes the score counter as it is right now.
    pub fn score(&self) -> Result<Score> {
        Ok(read_score(&self.engine, self.config.score_addr)?)
    }

    /// The last frame the engine drew.
    pub fn pixels(&self) -> &[u32] {
        self.engine.pixels()
    }

    pub fn last_game_over(&self) -> Option<GameOver> {
        self.last
    }

    /// How many watch hits were swallowed by the latch since the episode started.
    pub fn ignored_hits(&self) -> usize {
        self.ignored
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.engine.set_key(key, pressed)
    }

    pub fn events(&self) -> Receiver<GameOver> {
        self.recv.clone()
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Removes the watches and hands the engine back.
    pub fn into_engine(self) -> E {
        let Self {
            mut engine,
            registry,
            ..
        } = self;
        registry.deregister(&mut engine);
        engine
    }
}

fn engine_err<Err: std::error::Error + Send + Sync + 'static>(err: Err) -> Error {
    Error::Engine(Box::new(err))
}
