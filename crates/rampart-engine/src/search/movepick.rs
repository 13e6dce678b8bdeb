//! Staged move picker.
//!
//! Moves are produced in bands: hash move, winning captures, killers,
//! counter-move, quiets by history, losing captures. Each band is
//! generated only when the previous one runs dry, so a node that cuts
//! off on the hash move never pays for quiet generation, and each band
//! is emitted best-first by selection sort. A move never appears in two
//! bands.

use rampart_core::{
    Board, GenCategory, MAX_MOVES, Move, MoveList, Piece, PieceKind, Promotion, Square, generate,
};

use crate::eval::material::piece_value;
use crate::search::heuristics::Histories;
use crate::search::see::see_ge;

/// Captures and capture-like moves for the given board, `None` for
/// quiet moves. En passant reports the pawn it removes.
pub(crate) fn captured_kind(board: &Board, mv: Move) -> Option<PieceKind> {
    if mv.is_en_passant() {
        Some(PieceKind::Pawn)
    } else if mv.is_castle() {
        None
    } else {
        board.piece_on(mv.dest())
    }
}

/// Whether `mv` takes material (en passant included, castling excluded).
pub(crate) fn is_capture(board: &Board, mv: Move) -> bool {
    captured_kind(board, mv).is_some()
}

/// Check a hash-table move against the current position by membership
/// in the category that would have generated it. The generator emits
/// only legal moves, so membership doubles as a legality check.
pub(crate) fn is_playable(board: &Board, mv: Move) -> bool {
    if mv.is_null() {
        return false;
    }
    let category = if board.in_check() {
        GenCategory::Evasions
    } else if mv.is_promotion() {
        match mv.promo() {
            Promotion::Queen | Promotion::Knight => GenCategory::Captures,
            Promotion::Rook | Promotion::Bishop => GenCategory::Quiets,
        }
    } else if is_capture(board, mv) {
        GenCategory::Captures
    } else {
        GenCategory::Quiets
    };

    let mut list = MoveList::new();
    generate(board, category, &mut list);
    list.contains(&mv)
}

#[derive(Clone, Copy)]
struct ScoredMove {
    mv: Move,
    score: i32,
}

impl ScoredMove {
    const EMPTY: ScoredMove = ScoredMove {
        mv: Move::NULL,
        score: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    HashMove,
    CaptureInit,
    GoodCaptures,
    QuietInit,
    Killers,
    Counter,
    Quiets,
    BadCaptures,
    EvasionHashMove,
    EvasionInit,
    Evasions,
    QsearchHashMove,
    QsearchCaptureInit,
    QsearchCaptures,
    Done,
}

/// Resumable cursor over the move bands of one node.
pub(crate) struct MovePicker<'a> {
    board: &'a Board,
    hash_move: Move,
    killers: [Move; 2],
    counter: Move,
    cont_keys: [Option<(Piece, Square)>; 3],
    stage: Stage,
    moves: [ScoredMove; MAX_MOVES],
    captures_end: usize,
    quiets_end: usize,
    cursor: usize,
    bad_captures: [Move; 64],
    bad_len: usize,
    bad_cursor: usize,
    killer_index: usize,
}

impl<'a> MovePicker<'a> {
    /// Picker for a main-search node. `cont_keys` are the 1/2/4-ply
    /// continuation-history keys behind this node.
    pub fn new_main(
        board: &'a Board,
        hash_move: Move,
        killers: [Move; 2],
        counter: Move,
        cont_keys: [Option<(Piece, Square)>; 3],
    ) -> Self {
        let stage = if board.in_check() {
            Stage::EvasionHashMove
        } else {
            Stage::HashMove
        };
        Self::with_stage(board, hash_move, killers, counter, cont_keys, stage)
    }

    /// Picker for quiescence: hash move (if it grabs material) and
    /// captures only; evasions when in check.
    pub fn new_quiescence(board: &'a Board, hash_move: Move) -> Self {
        let stage = if board.in_check() {
            Stage::EvasionHashMove
        } else {
            Stage::QsearchHashMove
        };
        Self::with_stage(board, hash_move, [Move::NULL; 2], Move::NULL, [None; 3], stage)
    }

    fn with_stage(
        board: &'a Board,
        hash_move: Move,
        killers: [Move; 2],
        counter: Move,
        cont_keys: [Option<(Piece, Square)>; 3],
        stage: Stage,
    ) -> Self {
        Self {
            board,
            hash_move,
            killers,
            counter,
            cont_keys,
            stage,
            moves: [ScoredMove::EMPTY; MAX_MOVES],
            captures_end: 0,
            quiets_end: 0,
            cursor: 0,
            bad_captures: [Move::NULL; 64],
            bad_len: 0,
            bad_cursor: 0,
            killer_index: 0,
        }
    }

    fn mover(&self, mv: Move) -> Piece {
        self.board
            .colored_piece_on(mv.origin())
            .unwrap_or(Piece::new(self.board.side_to_move(), PieceKind::Pawn))
    }

    fn score_capture(&self, hists: &Histories, mv: Move) -> i32 {
        let victim = captured_kind(self.board, mv).unwrap_or(PieceKind::Pawn);
        let promo_bonus = if mv.is_promotion() {
            piece_value(mv.promo().piece_kind())
        } else {
            0
        };
        16 * piece_value(victim)
            + promo_bonus
            + hists.capture.get(self.mover(mv), mv.dest(), victim)
    }

    fn score_quiet(&self, hists: &Histories, mv: Move) -> i32 {
        let piece = self.mover(mv);
        hists.main.get(self.board.side_to_move(), mv)
            + hists.continuation_score(&self.cont_keys, piece, mv.dest())
    }

    fn score_evasion(&self, hists: &Histories, mv: Move) -> i32 {
        // Capture the checker with the cheapest piece first, then
        // quiet blocks and retreats by history.
        if let Some(victim) = captured_kind(self.board, mv) {
            1_000_000 + 16 * piece_value(victim) - piece_value(self.mover(mv).kind)
        } else {
            self.score_quiet(hists, mv)
        }
    }

    /// Fill `self.moves[start..]` from a category, returning the new end.
    fn generate_band(&mut self, category: GenCategory, start: usize) -> usize {
        let mut list = MoveList::new();
        generate(self.board, category, &mut list);
        let mut end = start;
        for &mv in list.iter() {
            self.moves[end] = ScoredMove { mv, score: 0 };
            end += 1;
        }
        end
    }

    fn rescore(&mut self, range: std::ops::Range<usize>, f: impl Fn(&Self, Move) -> i32) {
        for i in range {
            self.moves[i].score = f(self, self.moves[i].mv);
        }
    }

    /// Selection sort step: swap the best remaining move in
    /// `cursor..end` to the cursor and advance past it.
    fn take_best(&mut self, end: usize) -> Option<Move> {
        if self.cursor >= end {
            return None;
        }
        let mut best = self.cursor;
        for i in self.cursor + 1..end {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(self.cursor, best);
        let mv = self.moves[self.cursor].mv;
        self.cursor += 1;
        Some(mv)
    }

    fn quiet_band_contains(&self, mv: Move) -> bool {
        self.moves[self.captures_end..self.quiets_end]
            .iter()
            .any(|sm| sm.mv == mv)
    }

    fn already_tried(&self, mv: Move) -> bool {
        mv == self.hash_move
            || mv == self.killers[0]
            || mv == self.killers[1]
            || mv == self.counter
    }

    /// Yield the next move, or `None` when the node is exhausted.
    ///
    /// With `skip_quiets` the killer, counter, and quiet bands are
    /// bypassed; losing captures are still produced.
    pub fn next(&mut self, hists: &Histories, skip_quiets: bool) -> Option<Move> {
        loop {
            match self.stage {
                Stage::HashMove | Stage::EvasionHashMove | Stage::QsearchHashMove => {
                    let qsearch_quiet_hash = self.stage == Stage::QsearchHashMove
                        && !is_capture(self.board, self.hash_move)
                        && !self.hash_move.is_promotion();
                    self.stage = match self.stage {
                        Stage::HashMove => Stage::CaptureInit,
                        Stage::EvasionHashMove => Stage::EvasionInit,
                        _ => Stage::QsearchCaptureInit,
                    };
                    if !qsearch_quiet_hash && is_playable(self.board, self.hash_move) {
                        return Some(self.hash_move);
                    }
                }

                Stage::CaptureInit | Stage::QsearchCaptureInit => {
                    self.captures_end = self.generate_band(GenCategory::Captures, 0);
                    self.rescore(0..self.captures_end, |p, mv| p.score_capture(hists, mv));
                    self.cursor = 0;
                    self.stage = if self.stage == Stage::CaptureInit {
                        Stage::GoodCaptures
                    } else {
                        Stage::QsearchCaptures
                    };
                }

                Stage::GoodCaptures => {
                    while let Some(mv) = self.take_best(self.captures_end) {
                        if mv == self.hash_move {
                            continue;
                        }
                        if see_ge(self.board, mv, 0) {
                            return Some(mv);
                        }
                        if self.bad_len < self.bad_captures.len() {
                            self.bad_captures[self.bad_len] = mv;
                            self.bad_len += 1;
                        }
                    }
                    self.stage = Stage::QuietInit;
                }

                Stage::QuietInit => {
                    self.quiets_end = self.generate_band(GenCategory::Quiets, self.captures_end);
                    self.rescore(self.captures_end..self.quiets_end, |p, mv| {
                        p.score_quiet(hists, mv)
                    });
                    self.killer_index = 0;
                    self.stage = Stage::Killers;
                }

                Stage::Killers => {
                    if skip_quiets {
                        self.stage = Stage::BadCaptures;
                        continue;
                    }
                    while self.killer_index < 2 {
                        let killer = self.killers[self.killer_index];
                        self.killer_index += 1;
                        if killer != self.hash_move && self.quiet_band_contains(killer) {
                            return Some(killer);
                        }
                    }
                    self.stage = Stage::Counter;
                }

                Stage::Counter => {
                    self.cursor = self.captures_end;
                    self.stage = Stage::Quiets;
                    if skip_quiets {
                        self.stage = Stage::BadCaptures;
                        continue;
                    }
                    let counter = self.counter;
                    if counter != self.hash_move
                        && counter != self.killers[0]
                        && counter != self.killers[1]
                        && self.quiet_band_contains(counter)
                    {
                        return Some(counter);
                    }
                }

                Stage::Quiets => {
                    if skip_quiets {
                        self.stage = Stage::BadCaptures;
                        continue;
                    }
                    while let Some(mv) = self.take_best(self.quiets_end) {
                        if !self.already_tried(mv) {
                            return Some(mv);
                        }
                    }
                    self.stage = Stage::BadCaptures;
                }

                Stage::BadCaptures => {
                    if self.bad_cursor < self.bad_len {
                        let mv = self.bad_captures[self.bad_cursor];
                        self.bad_cursor += 1;
                        return Some(mv);
                    }
                    self.stage = Stage::Done;
                }

                Stage::EvasionInit => {
                    self.quiets_end = self.generate_band(GenCategory::Evasions, 0);
                    self.captures_end = 0;
                    self.rescore(0..self.quiets_end, |p, mv| p.score_evasion(hists, mv));
                    self.cursor = 0;
                    self.stage = Stage::Evasions;
                }

                Stage::Evasions => {
                    while let Some(mv) = self.take_best(self.quiets_end) {
                        if mv != self.hash_move {
                            return Some(mv);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::QsearchCaptures => {
                    while let Some(mv) = self.take_best(self.captures_end) {
                        if mv != self.hash_move {
                            return Some(mv);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::Done => return None,
            }
        }
    }
}
