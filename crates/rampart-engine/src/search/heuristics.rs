//! History tables for quiet-move and capture ordering.
//!
//! All tables use the same gravity update: a bonus pulls the entry
//! toward saturation, scaled down by how close the entry already is, so
//! values stay bounded and stale scores decay as new evidence arrives.

use rampart_core::{Color, Move, Piece, PieceKind, Square};

/// Saturation bound for every history entry.
pub const HISTORY_MAX: i32 = 16_384;

/// Bonus for a move that caused a beta cutoff at `depth`; the same
/// magnitude, negated, penalises moves tried before it.
pub fn history_bonus(depth: i32) -> i32 {
    (150 * depth - 100).clamp(0, 1_700)
}

/// Gravity update: move `entry` toward `±HISTORY_MAX` by `bonus`,
/// damped as the entry approaches saturation.
#[inline]
fn apply_gravity(entry: &mut i32, bonus: i32) {
    let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
    *entry += bonus - *entry * bonus.abs() / HISTORY_MAX;
}

/// Main quiet history, indexed by `[color][from][to]`.
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[inline]
    pub fn get(&self, color: Color, mv: Move) -> i32 {
        self.table[color.index()][mv.origin().index()][mv.dest().index()]
    }

    pub fn update(&mut self, color: Color, mv: Move, bonus: i32) {
        apply_gravity(
            &mut self.table[color.index()][mv.origin().index()][mv.dest().index()],
            bonus,
        );
    }

    pub fn clear(&mut self) {
        *self.table = [[[0; 64]; 64]; 2];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Capture history, indexed by `[moving piece][to][captured kind]`.
pub struct CaptureHistory {
    table: Box<[i32]>,
}

impl CaptureHistory {
    pub fn new() -> Self {
        Self {
            table: vec![0; 12 * 64 * 6].into_boxed_slice(),
        }
    }

    #[inline]
    fn slot(piece: Piece, to: Square, captured: PieceKind) -> usize {
        (piece.index() * 64 + to.index()) * 6 + captured.index()
    }

    #[inline]
    pub fn get(&self, piece: Piece, to: Square, captured: PieceKind) -> i32 {
        self.table[Self::slot(piece, to, captured)]
    }

    pub fn update(&mut self, piece: Piece, to: Square, captured: PieceKind, bonus: i32) {
        apply_gravity(&mut self.table[Self::slot(piece, to, captured)], bonus);
    }

    pub fn clear(&mut self) {
        self.table.fill(0);
    }
}

impl Default for CaptureHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Continuation history: how well `(piece, to)` follows an earlier
/// `(piece, to)`, indexed `[prev piece][prev to][piece][to]`.
pub struct ContinuationHistory {
    table: Box<[i32]>,
}

impl ContinuationHistory {
    pub fn new() -> Self {
        Self {
            table: vec![0; 12 * 64 * 12 * 64].into_boxed_slice(),
        }
    }

    #[inline]
    fn slot(prev: (Piece, Square), piece: Piece, to: Square) -> usize {
        ((prev.0.index() * 64 + prev.1.index()) * 12 + piece.index()) * 64 + to.index()
    }

    #[inline]
    pub fn get(&self, prev: (Piece, Square), piece: Piece, to: Square) -> i32 {
        self.table[Self::slot(prev, piece, to)]
    }

    pub fn update(&mut self, prev: (Piece, Square), piece: Piece, to: Square, bonus: i32) {
        apply_gravity(&mut self.table[Self::slot(prev, piece, to)], bonus);
    }

    pub fn clear(&mut self) {
        self.table.fill(0);
    }
}

impl Default for ContinuationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Refutation of the previous move, indexed by `[prev piece][prev to]`.
pub struct CounterMoves {
    table: [[Move; 64]; 12],
}

impl CounterMoves {
    pub fn new() -> Self {
        Self {
            table: [[Move::NULL; 64]; 12],
        }
    }

    #[inline]
    pub fn get(&self, prev: (Piece, Square)) -> Move {
        self.table[prev.0.index()][prev.1.index()]
    }

    pub fn store(&mut self, prev: (Piece, Square), mv: Move) {
        self.table[prev.0.index()][prev.1.index()] = mv;
    }

    pub fn clear(&mut self) {
        self.table = [[Move::NULL; 64]; 12];
    }
}

impl Default for CounterMoves {
    fn default() -> Self {
        Self::new()
    }
}

/// All heuristic tables a search thread owns.
pub struct Histories {
    pub main: HistoryTable,
    pub capture: CaptureHistory,
    pub continuation: ContinuationHistory,
    pub counters: CounterMoves,
}

impl Histories {
    pub fn new() -> Self {
        Self {
            main: HistoryTable::new(),
            capture: CaptureHistory::new(),
            continuation: ContinuationHistory::new(),
            counters: CounterMoves::new(),
        }
    }

    /// Continuation score of playing `(piece, to)` after the moves in
    /// `prev_keys` (the 1/2/4-ply look-back chain).
    pub fn continuation_score(
        &self,
        prev_keys: &[Option<(Piece, Square)>],
        piece: Piece,
        to: Square,
    ) -> i32 {
        prev_keys
            .iter()
            .flatten()
            .map(|&prev| self.continuation.get(prev, piece, to))
            .sum()
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.capture.clear();
        self.continuation.clear();
        self.counters.clear();
    }
}

impl Default for Histories {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_saturates_without_overflow() {
        let mut entry = 0;
        for _ in 0..1_000 {
            apply_gravity(&mut entry, 1_700);
        }
        assert!(entry <= HISTORY_MAX);
        assert!(entry > HISTORY_MAX / 2, "entry {entry} should approach the bound");

        for _ in 0..1_000 {
            apply_gravity(&mut entry, -1_700);
        }
        assert!(entry >= -HISTORY_MAX);
    }

    #[test]
    fn gravity_decays_stale_scores() {
        let mut high = 10_000;
        apply_gravity(&mut high, -500);
        // The penalty is amplified while the entry is far from the
        // negative bound.
        assert!(high < 10_000 - 500);
    }

    #[test]
    fn history_bonus_scales_and_caps() {
        assert!(history_bonus(2) < history_bonus(6));
        assert_eq!(history_bonus(40), 1_700);
        assert_eq!(history_bonus(0), 0);
    }

    #[test]
    fn main_history_tracks_color_and_squares() {
        let mut hist = HistoryTable::new();
        let mv = Move::new(Square::G1, Square::F3);

        hist.update(Color::White, mv, 800);
        assert!(hist.get(Color::White, mv) > 0);
        assert_eq!(hist.get(Color::Black, mv), 0);

        hist.clear();
        assert_eq!(hist.get(Color::White, mv), 0);
    }

    #[test]
    fn capture_history_separates_victims() {
        let mut hist = CaptureHistory::new();
        let knight = Piece::new(Color::White, PieceKind::Knight);

        hist.update(knight, Square::E5, PieceKind::Queen, 1_200);
        assert!(hist.get(knight, Square::E5, PieceKind::Queen) > 0);
        assert_eq!(hist.get(knight, Square::E5, PieceKind::Pawn), 0);
    }

    #[test]
    fn continuation_chain_sums_available_keys() {
        let mut hists = Histories::new();
        let prev = (Piece::new(Color::Black, PieceKind::Knight), Square::F6);
        let piece = Piece::new(Color::White, PieceKind::Bishop);

        hists.continuation.update(prev, piece, Square::G5, 900);
        let keys = [Some(prev), None, None];
        let score = hists.continuation_score(&keys, piece, Square::G5);
        assert!(score > 0);
        assert_eq!(score, hists.continuation.get(prev, piece, Square::G5));
    }

    #[test]
    fn counter_move_roundtrip() {
        let mut counters = CounterMoves::new();
        let prev = (Piece::new(Color::White, PieceKind::Pawn), Square::E4);
        let reply = Move::new(Square::E7, Square::E5);

        assert!(counters.get(prev).is_null());
        counters.store(prev, reply);
        assert_eq!(counters.get(prev), reply);
    }
}
