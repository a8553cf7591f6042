//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use registrar_core::{ValidationTicket, Verdict};

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// A field validator finished; applied only if its page and ticket are
    /// still current.
    Validated {
        page: u64,
        ticket: ValidationTicket,
        verdict: Verdict,
    },
}
