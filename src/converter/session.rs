//! Interpreter session guard
//!
//! A `Session` owns one Lua state for exactly one conversion. The state is
//! closed when the session is dropped, so every early return in the
//! converter releases it.

use log::{debug, trace};
use mlua::Lua;
use std::cell::Cell;

thread_local! {
    static LIVE: Cell<usize> = const { Cell::new(0) };
}

/// Number of sessions currently open on this thread.
pub fn live_sessions() -> usize {
    LIVE.with(|n| n.get())
}

pub struct Session {
    lua: Lua,
}

impl Session {
    /// Open a fresh Lua state with the safe standard libraries loaded.
    pub fn open() -> Self {
        let lua = Lua::new();
        let live = LIVE.with(|n| {
            n.set(n.get() + 1);
            n.get()
        });
        debug!("opened interpreter session ({} live)", live);
        Session { lua }
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let live = LIVE.with(|n| {
            n.set(n.get().saturating_sub(1));
            n.get()
        });
        trace!("lua memory in use at close: {} bytes", self.lua.used_memory());
        debug!("closed interpreter session ({} live)", live);
    }
}
