//! Static evaluation: tapered material and piece placement.

pub mod material;
pub mod phase;
pub mod pst;
pub mod score;

use rampart_core::{Board, Color, Piece};

use self::phase::{MAX_PHASE, game_phase};
use self::score::Score;

/// Evaluation scores stay inside this range so they never collide with
/// mate scores.
pub const EVAL_LIMIT: i32 = 20_000;

/// Static evaluation from the side to move's perspective, in centipawns.
///
/// Pure with respect to the position: equal boards always evaluate
/// equally, which the search relies on when reusing stored evaluations.
pub fn evaluate(board: &Board) -> i32 {
    let mut total = material::material(board);

    for piece in Piece::ALL {
        let sign = match piece.color {
            Color::White => 1,
            Color::Black => -1,
        };
        let mut sum = Score::ZERO;
        for sq in board.colored_pieces(piece.color, piece.kind) {
            sum += pst::pst(piece.color, piece.kind, sq);
        }
        total += sum * sign;
    }

    let white_view = total.taper(game_phase(board), MAX_PHASE);
    let relative = match board.side_to_move() {
        Color::White => white_view,
        Color::Black => -white_view,
    };
    relative.clamp(-EVAL_LIMIT, EVAL_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_symmetric() {
        let board = Board::starting_position();
        assert_eq!(evaluate(&board), 0);
    }

    #[test]
    fn perspective_flips_with_side_to_move() {
        let white: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let black: Board = "4k3/8/8/8/8/8/8/R3K3 b - - 0 1".parse().unwrap();
        assert_eq!(evaluate(&white), -evaluate(&black));
        assert!(evaluate(&white) > 300, "a clean rook up should show");
    }

    #[test]
    fn mirrored_positions_evaluate_equally() {
        let pos: Board = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
            .parse()
            .unwrap();
        let mirrored: Board = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3"
            .parse()
            .unwrap();
        assert_eq!(evaluate(&pos), evaluate(&mirrored));
    }

    #[test]
    fn evaluation_is_bounded() {
        let board: Board = "QQQQk3/QQQQ4/8/8/8/8/8/QQQQK3 w - - 0 1".parse().unwrap();
        assert!(evaluate(&board) <= EVAL_LIMIT);
    }
}
