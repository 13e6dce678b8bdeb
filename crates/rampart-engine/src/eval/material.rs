//! Material counting.

use rampart_core::{Board, Color, PieceKind};

use super::score::{S, Score};

/// Tapered material values indexed by [`PieceKind::index()`].
pub const MATERIAL: [Score; 6] = [
    S(100, 130),  // pawn
    S(325, 305),  // knight
    S(340, 330),  // bishop
    S(500, 540),  // rook
    S(950, 1000), // queen
    S(0, 0),      // king
];

/// Flat piece values for pruning margins and exchange evaluation.
/// Kept separate from the tapered pair so search code never needs a
/// game phase.
pub const PIECE_VALUE: [i32; 6] = [100, 325, 340, 500, 950, 0];

const BISHOP_PAIR: Score = S(40, 55);

/// Material balance from White's perspective.
pub fn material(board: &Board) -> Score {
    let mut score = Score::ZERO;
    for kind in PieceKind::ALL {
        let white = board.colored_pieces(Color::White, kind).count() as i32;
        let black = board.colored_pieces(Color::Black, kind).count() as i32;
        score += MATERIAL[kind.index()] * (white - black);
    }
    if board.colored_pieces(Color::White, PieceKind::Bishop).count() >= 2 {
        score += BISHOP_PAIR;
    }
    if board.colored_pieces(Color::Black, PieceKind::Bishop).count() >= 2 {
        score -= BISHOP_PAIR;
    }
    score
}

/// Flat value of the piece kind, zero for kings.
#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    PIECE_VALUE[kind.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::starting_position();
        assert_eq!(material(&board), Score::ZERO);
    }

    #[test]
    fn extra_rook_counts_for_white() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let score = material(&board);
        assert_eq!(score.mg(), 500);
        assert_eq!(score.eg(), 540);
    }

    #[test]
    fn bishop_pair_bonus_applies() {
        let pair: Board = "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1".parse().unwrap();
        let single: Board = "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1".parse().unwrap();
        let diff = material(&pair) - material(&single);
        assert_eq!(diff.mg(), MATERIAL[PieceKind::Bishop.index()].mg() + 40);
    }
}
