//! Drives the whole stack the way an agent would: a recorded run of three games, each ending
//! through a different game over path.

use std::collections::HashMap;
use std::convert::Infallible;

use wraith::engine::BreakpointHook;
use wraith::replay::Recording;
use wraith::replay::ReplayEngine;
use wraith::Engine;
use wraith::Environment;
use wraith::GameOver;
use wraith::Key;
use wraith::MemoryLike;
use wraith::Score;
use wraith::WatchAddress;
use wraith::WatchConfig;
use wraith::WatchRegistry;
use wraith::GAME_OVER_ADDRS;
use wraith::SCORE_ADDR;

const THREE_GAMES: &str = r#"
[[frames]]
writes = [[0xC0A0, 0x73], [0xC0A1, 0x64], [0xC0A2, 0x01]]
pcs = [0x0150, 0x2000]

[[frames]]
pcs = [0x2000, 0x6803]

[[frames]]
writes = [[0xC0A0, 0x00], [0xC0A1, 0x00], [0xC0A2, 0x00]]
pcs = [0x0150]

[[frames]]
writes = [[0xC0A0, 0x99], [0xC0A1, 0x99], [0xC0A2, 0x99]]
pcs = [0x690D]

[[frames]]
writes = [[0xC0A0, 0x40], [0xC0A1, 0x00], [0xC0A2, 0x00]]
pcs = [0x6964, 0x6803]
"#;

#[test_log::test]
fn three_games_three_causes() {
    let engine = ReplayEngine::new(Recording::from_toml(THREE_GAMES).unwrap());
    let mut env = Environment::without_rom_check(engine, WatchConfig::default()).unwrap();
    let events = env.events();

    let mut overs = Vec::new();
    for _ in 0..5 {
        if !env.is_running() {
            // The recording carries on where it left off, so the next game starts from here
            let snapshot = env.engine().save_state().unwrap();
            env.start_episode(&snapshot).unwrap();
        }
        if let Some(over) = env.run_frame().unwrap() {
            overs.push(over);
        }
    }

    let expected = vec![
        GameOver {
            score: Score::from(16473),
            cause: GAME_OVER_ADDRS[0],
        },
        GameOver {
            score: Score::from(999_999),
            cause: GAME_OVER_ADDRS[1],
        },
        GameOver {
            score: Score::from(40),
            cause: GAME_OVER_ADDRS[2],
        },
    ];
    assert_eq!(overs, expected);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), expected);
    // The trailing 0x6803 in the last frame belongs to the same game over
    assert_eq!(env.ignored_hits(), 1);
}

/// Memory where every byte reads as 0x11.
struct Ones;

impl MemoryLike for Ones {
    fn read_byte(&self, _addr: u16) -> u8 {
        0x11
    }
}

/// An engine written outside of the crate, to check that the trait is implementable as published.
#[derive(Default)]
struct CountingEngine {
    hooks: HashMap<u16, BreakpointHook>,
    frames: usize,
    keys: Vec<(Key, bool)>,
}

impl MemoryLike for CountingEngine {
    fn read_byte(&self, addr: u16) -> u8 {
        Ones.read_byte(addr)
    }
}

impl Engine for CountingEngine {
    type Error = Infallible;

    fn set_breakpoint(&mut self, pc: u16, hook: BreakpointHook) {
        self.hooks.insert(pc, hook);
    }

    fn clear_breakpoint(&mut self, pc: u16) {
        self.hooks.remove(&pc);
    }

    fn run_frame(&mut self) -> Result<(), Infallible> {
        self.frames += 1;
        // Every third frame ends a game
        if self.frames % 3 == 0 {
            let pc = GAME_OVER_ADDRS[self.frames / 3 % 3].get();
            if let Some(hook) = self.hooks.get_mut(&pc) {
                hook(pc, &Ones);
            }
        }
        Ok(())
    }

    fn pixels(&self) -> &[u32] {
        &[]
    }

    fn load_state(&mut self, _state: &[u8]) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_div(&mut self, _value: u16) {}

    fn set_key(&mut self, key: Key, pressed: bool) {
        self.keys.push((key, pressed));
    }
}

#[test]
fn foreign_engine() {
    let mut env = Environment::without_rom_check(CountingEngine::default(), WatchConfig::default())
        .unwrap();
    env.start_episode(&[]).unwrap();
    env.set_key(Key::Left, true);
    assert_eq!(env.run_frame().unwrap(), None);
    assert_eq!(env.run_frame().unwrap(), None);
    let over = env.run_frame().unwrap().unwrap();
    assert_eq!(over.score, Score::from(111_111));
    assert_eq!(over.cause, WatchAddress::new(0x690D));

    let engine = env.into_engine();
    assert!(engine.hooks.is_empty());
    assert_eq!(engine.keys, vec![(Key::Left, true)]);
}

#[test]
fn registry_reports_each_address_once() {
    let recording = GAME_OVER_ADDRS
        .iter()
        .map(|addr| format!("[[frames]]\npcs = [{}]\n", addr.get()))
        .collect::<String>();
    let mut engine = ReplayEngine::new(Recording::from_toml(&recording).unwrap());
    let (send, recv) = wraith::events::channel();
    let registry = WatchRegistry::register(&mut engine, GAME_OVER_ADDRS, SCORE_ADDR, send).unwrap();
    for addr in registry.addresses() {
        engine.run_frame().unwrap();
        let hits: Vec<_> = recv.try_iter().map(|hit| hit.cause).collect();
        assert_eq!(hits, vec![*addr]);
    }
    registry.deregister(&mut engine);
    assert!(!engine.has_breakpoint(0x6803));
}

/// Ends a game at 0x6803 with 16473 points, then zeroes the counter before the frame is over, the
/// way the game resets it on its way back to the title screen.
struct ResettingEngine {
    hooks: HashMap<u16, BreakpointHook>,
    wram: Vec<u8>,
}

impl MemoryLike for ResettingEngine {
    fn read_byte(&self, addr: u16) -> u8 {
        self.wram.read_byte(addr)
    }
}

impl Engine for ResettingEngine {
    type Error = Infallible;

    fn set_breakpoint(&mut self, pc: u16, hook: BreakpointHook) {
        self.hooks.insert(pc, hook);
    }

    fn clear_breakpoint(&mut self, pc: u16) {
        self.hooks.remove(&pc);
    }

    fn run_frame(&mut self) -> Result<(), Infallible> {
        let score = SCORE_ADDR as usize..SCORE_ADDR as usize + 3;
        self.wram[score.clone()].copy_from_slice(&[0x73, 0x64, 0x01]);
        if let Some(hook) = self.hooks.get_mut(&0x6803) {
            hook(0x6803, &self.wram);
        }
        self.wram[score].fill(0);
        Ok(())
    }

    fn pixels(&self) -> &[u32] {
        &[]
    }

    fn load_state(&mut self, _state: &[u8]) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_div(&mut self, _value: u16) {}

    fn set_key(&mut self, _key: Key, _pressed: bool) {}
}

#[test]
fn score_is_read_when_the_game_ends() {
    let engine = ResettingEngine {
        hooks: HashMap::new(),
        wram: vec![0; 0x1_0000],
    };
    let mut env = Environment::without_rom_check(engine, WatchConfig::default()).unwrap();
    env.start_episode(&[]).unwrap();
    let over = env.run_frame().unwrap().unwrap();
    assert_eq!(over.score, Score::from(16473));
    assert_eq!(over.cause, WatchAddress::new(0x6803));
    // By the end of the frame the counter has been cleared
    assert_eq!(env.score().unwrap(), Score::from(0));
}
