//! Game phase from remaining non-pawn material.

use rampart_core::{Board, PieceKind};

/// Full middlegame material: 4 minors apiece at weight 1, rooks at 2,
/// queens at 4.
pub const MAX_PHASE: i32 = 24;

/// Phase in `0..=MAX_PHASE`; promoted pieces cannot push it past the cap.
pub fn game_phase(board: &Board) -> i32 {
    let minors =
        (board.pieces(PieceKind::Knight) | board.pieces(PieceKind::Bishop)).count() as i32;
    let rooks = board.pieces(PieceKind::Rook).count() as i32;
    let queens = board.pieces(PieceKind::Queen).count() as i32;
    (minors + 2 * rooks + 4 * queens).min(MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_extremes() {
        assert_eq!(game_phase(&Board::starting_position()), MAX_PHASE);
        let bare: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&bare), 0);
        let pawn_ending: Board = "4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pawn_ending), 0);
    }

    #[test]
    fn promoted_queens_do_not_overflow() {
        let board: Board = "QQQQk3/8/8/8/8/8/8/QQQQK3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&board), MAX_PHASE);
    }
}
