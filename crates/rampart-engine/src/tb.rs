//! Endgame tablebase seam.
//!
//! The search only consumes the trait; without real tablebase files the
//! [`NoTablebase`] prober reports every probe as failed and the search
//! degrades gracefully to full-width search.

use rampart_core::Board;

/// Win/draw/loss from the side to move's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wdl {
    Loss,
    Draw,
    Win,
}

/// A WDL prober for small-piece-count endings.
///
/// Callers must gate probes themselves: few enough pieces, no castling
/// rights, and a zero halfmove clock, since tablebase scores ignore the
/// 50-move history.
pub trait Tablebase: Sync {
    /// Largest piece count (kings included) the prober covers; probes
    /// above it are pointless.
    fn max_pieces(&self) -> u32;

    /// Probe the position. `None` means the probe failed (missing file,
    /// unsupported material) and the caller searches normally.
    fn probe_wdl(&self, board: &Board) -> Option<Wdl>;
}

/// The default prober: no files, every probe fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTablebase;

impl Tablebase for NoTablebase {
    fn max_pieces(&self) -> u32 {
        0
    }

    fn probe_wdl(&self, _board: &Board) -> Option<Wdl> {
        None
    }
}
