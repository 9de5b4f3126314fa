//! The contract with the emulator that actually runs the game.
//!
//! Nothing in this crate steps a CPU. Instead, an emulator implements [`Engine`] and this crate
//! drives it: breakpoints are installed with a hook that the engine calls when its PC reaches
//! the address, and memory is read back through [`MemoryLike`].

use serde::Deserialize;
use serde::Serialize;

/// The width of the Game Boy screen, in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// The height of the Game Boy screen, in pixels.
pub const SCREEN_HEIGHT: usize = 144;

/// Called by the engine, on its own thread and before continuing execution, with the PC that
/// tripped the breakpoint and a view of memory as it is at that instruction.
pub type BreakpointHook = Box<dyn FnMut(u16, &dyn MemoryLike)>;

/// Read access to the emulated address space. This is split out of [`Engine`] so that hooks can
/// be handed memory while the engine is in the middle of stepping.
pub trait MemoryLike {
    fn read_byte(&self, addr: u16) -> u8;
}

/// The const generic in `read_window` would make `MemoryLike` non-object safe, which hooks
/// need.
pub trait MemoryLikeExt: MemoryLike {
    /// Reads `N` consecutive bytes starting at `start`, wrapping at the end of the address space.
    fn read_window<const N: usize>(&self, start: u16) -> [u8; N] {
        std::array::from_fn(|i| self.read_byte(start.wrapping_add(i as u16)))
    }
}

impl<M: MemoryLike + ?Sized> MemoryLikeExt for M {}

/// A flat image of the address space, starting at 0x0000. Reads past the end see an open bus.
impl MemoryLike for [u8] {
    fn read_byte(&self, addr: u16) -> u8 {
        self.get(addr as usize).copied().unwrap_or(0xFF)
    }
}

impl MemoryLike for Vec<u8> {
    fn read_byte(&self, addr: u16) -> u8 {
        self.as_slice().read_byte(addr)
    }
}

pub trait Engine: MemoryLike {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Installs an execution breakpoint at `pc`. Installing a second hook for the same `pc`
    /// replaces the first.
    fn set_breakpoint(&mut self, pc: u16, hook: BreakpointHook);

    fn clear_breakpoint(&mut self, pc: u16);

    /// Emulates a single frame, roughly 1/60th of a second.
    fn run_frame(&mut self) -> Result<(), Self::Error>;

    /// The last completed frame, `SCREEN_WIDTH * SCREEN_HEIGHT` pixels in row-major order, each
    /// packed as `0x00RRGGBB`.
    fn pixels(&self) -> &[u32];

    /// Replaces the entire emulated state with a previously saved one.
    fn load_state(&mut self, state: &[u8]) -> Result<(), Self::Error>;

    /// Writes the DIV register. The game seeds its piece generator from it.
    fn set_div(&mut self, value: u16);

    fn set_key(&mut self, key: Key, pressed: bool);
}

/// The joypad buttons. The discriminants are stable ids exposed to callers outside of Rust.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Key {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    B = 4,
    A = 5,
    Select = 6,
    Start = 7,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::B,
        Key::A,
        Key::Select,
        Key::Start,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }
}
