//! The breakpoint watch registry.
//!
//! The registry owns no engine. It installs one breakpoint per address on the engine it is given,
//! and each breakpoint's hook copies the score counter and forwards it as a [`WatchHit`] into a
//! channel. Whoever holds the receiver (usually [`crate::env::Environment`]) decides what a hit
//! means.

use crossbeam_channel::Sender;
use heapless::Vec as InlineVec;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::addr::WatchAddress;
use crate::bcd::ScoreBytes;
use crate::engine::BreakpointHook;
use crate::engine::Engine;
use crate::engine::MemoryLike;
use crate::error::WatchError;
use crate::events::WatchHit;

/// The most distinct addresses a single registry will watch.
pub const MAX_WATCHES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRegistry {
    addrs: InlineVec<WatchAddress, MAX_WATCHES>,
}

impl WatchRegistry {
    /// Installs a breakpoint at every given address. Duplicates are collapsed. Each hit carries
    /// the counter at `score_addr` as it was when the breakpoint tripped. The set is fixed once
    /// this returns; to stop watching, call [`WatchRegistry::deregister`].
    pub fn register<E, I>(
        engine: &mut E,
        addresses: I,
        score_addr: u16,
        sink: Sender<WatchHit>,
    ) -> Result<Self, WatchError>
    where
        E: Engine + ?Sized,
        I: IntoIterator<Item = WatchAddress>,
    {
        let mut addrs = InlineVec::new();
        for addr in addresses {
            if addrs.contains(&addr) {
                continue;
            }
            addrs
                .push(addr)
                .map_err(|_| WatchError::TooManyAddresses(MAX_WATCHES))?;
        }
        if addrs.is_empty() {
            return Err(WatchError::NoAddresses);
        }
        for &addr in &addrs {
            debug!("Setting game over breakpoint at {addr}");
            engine.set_breakpoint(addr.get(), hook(score_addr, sink.clone()));
        }
        Ok(Self { addrs })
    }

    pub fn addresses(&self) -> &[WatchAddress] {
        &self.addrs
    }

    pub fn contains(&self, pc: u16) -> bool {
        self.addrs.contains(&WatchAddress::new(pc))
    }

    /// Removes every breakpoint this registry installed.
    pub fn deregister<E: Engine + ?Sized>(self, engine: &mut E) {
        for addr in self.addrs {
            debug!("Clearing game over breakpoint at {addr}");
            engine.clear_breakpoint(addr.get());
        }
    }
}

fn hook(score_addr: u16, sink: Sender<WatchHit>) -> BreakpointHook {
    Box::new(move |pc: u16, mem: &dyn MemoryLike| {
        let hit = WatchHit {
            cause: WatchAddress::new(pc),
            bytes: ScoreBytes::capture(mem, score_addr),
        };
        trace!("{hit}");
        if sink.send(hit).is_err() {
            warn!("Dropping {hit}, nothing is listening for watch hits");
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use crate::addr::GAME_OVER_ADDRS;
    use crate::addr::SCORE_ADDR;
    use crate::engine::Key;
    use crate::events::channel;

    use super::*;

    /// Just enough of an engine to hold hooks and fire them by hand.
    struct Hooks {
        hooks: HashMap<u16, BreakpointHook>,
        mem: Vec<u8>,
    }

    impl Default for Hooks {
        fn default() -> Self {
            Self {
                hooks: HashMap::new(),
                mem: vec![0; 0x1_0000],
            }
        }
    }

    impl Hooks {
        fn reach(&mut self, pc: u16) {
            if let Some(hook) = self.hooks.get_mut(&pc) {
                hook(pc, &self.mem)
            }
        }
    }

    impl MemoryLike for Hooks {
        fn read_byte(&self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }
    }

    impl Engine for Hooks {
        type Error = Infallible;

        fn set_breakpoint(&mut self, pc: u16, hook: BreakpointHook) {
            self.hooks.insert(pc, hook);
        }

        fn clear_breakpoint(&mut self, pc: u16) {
            self.hooks.remove(&pc);
        }

        fn run_frame(&mut self) -> Result<(), Infallible> {
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

    #[test_log::test]
    fn one_hit_per_reached_address() {
        let mut engine = Hooks::default();
        let (send, recv) = channel();
        let reg = WatchRegistry::register(&mut engine, GAME_OVER_ADDRS, SCORE_ADDR, send).unwrap();
        assert_eq!(reg.addresses(), &GAME_OVER_ADDRS);
        for addr in GAME_OVER_ADDRS {
            engine.reach(0x0150);
            engine.reach(addr.get());
            let hits: Vec<_> = recv.try_iter().collect();
            assert_eq!(
                hits,
                vec![WatchHit {
                    cause: addr,
                    bytes: ScoreBytes([0; 3]),
                }]
            );
        }
    }

    #[test]
    fn hits_copy_the_counter_when_they_fire() {
        let mut engine = Hooks::default();
        let (send, recv) = channel();
        let _reg = WatchRegistry::register(&mut engine, GAME_OVER_ADDRS, SCORE_ADDR, send).unwrap();
        engine.mem[0xC0A0..0xC0A3].copy_from_slice(&[0x73, 0x64, 0x01]);
        engine.reach(0x6803);
        engine.mem[0xC0A0..0xC0A3].fill(0);
        let hit = recv.try_recv().unwrap();
        assert_eq!(hit.bytes, ScoreBytes([0x73, 0x64, 0x01]));
        assert_eq!(hit.bytes.decode().unwrap().get(), 16473);
    }

    #[test]
    fn empty_set_is_rejected() {
        let mut engine = Hooks::default();
        let (send, _recv) = channel();
        assert_eq!(
            WatchRegistry::register(&mut engine, [], SCORE_ADDR, send),
            Err(WatchError::NoAddresses)
        );
        assert!(engine.hooks.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let mut engine = Hooks::default();
        let (send, recv) = channel();
        let addr = WatchAddress::new(0x6803);
        let reg = WatchRegistry::register(&mut engine, [addr, addr], SCORE_ADDR, send).unwrap();
        assert_eq!(reg.addresses(), &[addr]);
        engine.reach(0x6803);
        assert_eq!(recv.try_iter().count(), 1);
    }

    #[test]
    fn too_many_addresses() {
        let mut engine = Hooks::default();
        let (send, _recv) = channel();
        let addrs = (0..=MAX_WATCHES as u16).map(WatchAddress::new);
        assert_eq!(
            WatchRegistry::register(&mut engine, addrs, SCORE_ADDR, send),
            Err(WatchError::TooManyAddresses(MAX_WATCHES))
        );
    }

    #[test]
    fn deregister_clears_breakpoints() {
        let mut engine = Hooks::default();
        let (send, recv) = channel();
        let reg = WatchRegistry::register(&mut engine, GAME_OVER_ADDRS, SCORE_ADDR, send).unwrap();
        assert!(reg.contains(0x690D));
        assert!(!reg.contains(0x690E));
        reg.deregister(&mut engine);
        assert!(engine.hooks.is_empty());
        engine.reach(0x690D);
        assert!(recv.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_is_not_fatal() {
        let mut engine = Hooks::default();
        let (send, recv) = channel();
        let _reg = WatchRegistry::register(&mut engine, GAME_OVER_ADDRS, SCORE_ADDR, send).unwrap();
        drop(recv);
        engine.reach(0x6964);
    }
}
