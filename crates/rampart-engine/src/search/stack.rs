//! Per-ply search state with sentinel padding.
//!
//! The search reads up to six plies behind the current node (for
//! continuation history) and writes up to two plies ahead (clearing the
//! grandchild killers). Rather than bounds-check every access, the
//! frame array carries six zeroed frames before ply 0 and two after
//! `MAX_PLY`, so every look-back and look-ahead lands on a real entry.

use rampart_core::{Move, Piece, Square};

use crate::search::negamax::MAX_PLY;

/// Frames reachable below ply 0.
const LOOK_BACK: usize = 6;

/// Total frame count: `LOOK_BACK` sentinels, the searchable plies, and
/// two look-ahead frames.
const FRAME_COUNT: usize = LOOK_BACK + MAX_PLY + 2;

/// State the search keeps per ply.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    /// Static evaluation at this node, or [`Frame::EVAL_UNSET`] while in
    /// check or before evaluation.
    pub static_eval: i32,
    /// Move played at this node on the current line.
    pub current_move: Move,
    /// Continuation-history key of `current_move`: the moving piece and
    /// its destination.
    pub moved: Option<(Piece, Square)>,
    /// Quiet moves that produced beta cutoffs at this ply.
    pub killers: [Move; 2],
    /// Move excluded by a singular verification search.
    pub excluded: Move,
    /// Number of moves tried at this node so far.
    pub move_count: u32,
    /// Whether the side to move at this node is in check.
    pub in_check: bool,
    /// Whether this node lies on a line the TT marked as PV.
    pub tt_pv: bool,
    /// Singular double-extensions granted on the path to this node.
    pub double_extensions: u8,
    /// Beta cutoffs observed at the next ply while this node was the
    /// parent; feeds the LMR adjustment.
    pub cutoff_count: u32,
}

impl Frame {
    /// Marker for "no evaluation computed"; outside every legal score
    /// and identical to the transposition table's unset-eval encoding.
    pub const EVAL_UNSET: i32 = i16::MIN as i32;

    const EMPTY: Frame = Frame {
        static_eval: Self::EVAL_UNSET,
        current_move: Move::NULL,
        moved: None,
        killers: [Move::NULL; 2],
        excluded: Move::NULL,
        move_count: 0,
        in_check: false,
        tt_pv: false,
        double_extensions: 0,
        cutoff_count: 0,
    };

    /// Push a killer, shifting the previous one to the second slot.
    pub fn store_killer(&mut self, mv: Move) {
        if self.killers[0] != mv {
            self.killers[1] = self.killers[0];
            self.killers[0] = mv;
        }
    }
}

/// The padded frame array. Indexed by signed ply so callers can write
/// `stack.at(ply - 4)` without caring whether that underflows ply 0.
pub(crate) struct SearchStack {
    frames: Box<[Frame; FRAME_COUNT]>,
}

impl SearchStack {
    pub fn new() -> Self {
        Self {
            frames: Box::new([Frame::EMPTY; FRAME_COUNT]),
        }
    }

    /// Frame at `ply`; accepts `-6..MAX_PLY + 2`.
    #[inline]
    pub fn at(&self, ply: i32) -> &Frame {
        &self.frames[(ply + LOOK_BACK as i32) as usize]
    }

    #[inline]
    pub fn at_mut(&mut self, ply: i32) -> &mut Frame {
        &mut self.frames[(ply + LOOK_BACK as i32) as usize]
    }

    /// Continuation-history key `plies_ago` behind `ply`, if a real move
    /// was played there (sentinels and null moves yield `None`).
    #[inline]
    pub fn conthist_key(&self, ply: i32, plies_ago: i32) -> Option<(Piece, Square)> {
        self.at(ply - plies_ago).moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::Square;

    #[test]
    fn lookback_from_ply_zero_hits_sentinels() {
        let stack = SearchStack::new();
        for plies_ago in 1..=6 {
            assert!(stack.conthist_key(0, plies_ago).is_none());
            assert!(stack.at(-plies_ago).current_move.is_null());
        }
    }

    #[test]
    fn lookahead_from_top_ply_is_in_bounds() {
        let mut stack = SearchStack::new();
        stack.at_mut(MAX_PLY as i32 + 1).killers = [Move::NULL; 2];
    }

    #[test]
    fn killer_slots_shift() {
        let mut frame = Frame::EMPTY;
        let first = Move::new(Square::E2, Square::E4);
        let second = Move::new(Square::D2, Square::D4);

        frame.store_killer(first);
        frame.store_killer(second);
        assert_eq!(frame.killers, [second, first]);

        // Restoring the same move must not duplicate it.
        frame.store_killer(second);
        assert_eq!(frame.killers, [second, first]);
    }
}
