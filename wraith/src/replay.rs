//! An [`Engine`] that plays back a recorded run instead of emulating one.
//!
//! A [`Recording`] is a list of frames. Each frame lists the memory writes that happened during it
//! and the PCs that were executed, in order. Playing a frame applies its writes and then walks its
//! PCs, calling the hook of any that have a breakpoint with memory as it stands at that point. A
//! frame may also carry the screen it ended on. This is enough to exercise everything
//! downstream of the emulator without a ROM.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;
use tracing::trace;

use crate::engine::BreakpointHook;
use crate::engine::Engine;
use crate::engine::Key;
use crate::engine::MemoryLike;
use crate::engine::SCREEN_HEIGHT;
use crate::engine::SCREEN_WIDTH;
use crate::error::ReplayError;

const MEM_SIZE: usize = 0x1_0000;
const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// `(addr, value)` pairs, applied before any PC is walked.
    #[serde(default)]
    pub writes: Vec<(u16, u8)>,
    #[serde(default)]
    pub pcs: Vec<u16>,
    /// The picture at the end of the frame. Frames without one leave the previous picture up.
    #[serde(default)]
    pub screen: Option<Vec<u32>>,
}

impl Recording {
    pub fn from_toml(data: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(data)?)
    }
}

/// The part of the engine that a snapshot captures. Breakpoints survive loading a snapshot.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ReplayState {
    #[serde_as(as = "serde_with::Bytes")]
    memory: Vec<u8>,
    screen: Vec<u32>,
    cursor: usize,
    div: u16,
}

pub struct ReplayEngine {
    recording: Recording,
    state: ReplayState,
    breakpoints: HashMap<u16, BreakpointHook>,
    keys: [bool; 8],
}

impl ReplayEngine {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            state: ReplayState {
                memory: vec![0; MEM_SIZE],
                screen: vec![0; SCREEN_SIZE],
                cursor: 0,
                div: 0,
            },
            breakpoints: HashMap::new(),
            keys: [false; 8],
        }
    }

    /// Starts from a memory image mapped at `base` rather than from zeroed memory. Anything past
    /// the end of the address space is ignored.
    pub fn with_memory(recording: Recording, image: &[u8], base: u16) -> Self {
        let mut engine = Self::new(recording);
        let start = base as usize;
        let len = image.len().min(MEM_SIZE - start);
        engine.state.memory[start..start + len].copy_from_slice(&image[..len]);
        engine
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        self.state.memory[addr as usize] = val;
    }

    pub fn frames_played(&self) -> usize {
        self.state.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.state.cursor >= self.recording.frames.len()
    }

    pub fn div(&self) -> u16 {
        self.state.div
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys[key as usize]
    }

    pub fn has_breakpoint(&self, pc: u16) -> bool {
        self.breakpoints.contains_key(&pc)
    }

    pub fn save_state(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(postcard::to_allocvec(&self.state)?)
    }
}

impl MemoryLike for ReplayEngine {
    fn read_byte(&self, addr: u16) -> u8 {
        self.state.memory[addr as usize]
    }
}

impl Engine for ReplayEngine {
    type Error = ReplayError;

    fn set_breakpoint(&mut self, pc: u16, hook: BreakpointHook) {
        self.breakpoints.insert(pc, hook);
    }

    fn clear_breakpoint(&mut self, pc: u16) {
        self.breakpoints.remove(&pc);
    }

    /// Plays the next recorded frame. Once the recording runs out, this does nothing.
    fn run_frame(&mut self) -> Result<(), ReplayError> {
        let Some(frame) = self.recording.frames.get(self.state.cursor) else {
            return Ok(());
        };
        trace!("Replaying frame {}", self.state.cursor);
        if let Some(screen) = &frame.screen {
            if screen.len() != SCREEN_SIZE {
                return Err(ReplayError::ScreenSize(screen.len()));
            }
        }
        for &(addr, val) in &frame.writes {
            self.state.memory[addr as usize] = val;
        }
        for &pc in &frame.pcs {
            if let Some(hook) = self.breakpoints.get_mut(&pc) {
                hook(pc, &self.state.memory);
            }
        }
        if let Some(screen) = &frame.screen {
            self.state.screen.copy_from_slice(screen);
        }
        self.state.cursor += 1;
        Ok(())
    }

    fn pixels(&self) -> &[u32] {
        &self.state.screen
    }

    fn load_state(&mut self, state: &[u8]) -> Result<(), ReplayError> {
        let state: ReplayState = postcard::from_bytes(state)?;
        if state.memory.len() != MEM_SIZE {
            return Err(ReplayError::SnapshotSize(state.memory.len()));
        }
        if state.screen.len() != SCREEN_SIZE {
            return Err(ReplayError::ScreenSize(state.screen.len()));
        }
        self.state = state;
        Ok(())
    }

    fn set_div(&mut self, value: u16) {
        self.state.div = value;
    }

    fn set_key(&mut self, key: Key, pressed: bool) {
        self.keys[key as usize] = pressed;
    }
}
