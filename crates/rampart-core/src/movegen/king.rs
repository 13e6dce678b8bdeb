//! King move and castling generation.

use crate::attacks::king_attacks;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::square::Square;

use super::{GenCategory, GenCtx, MoveList, king_targets};

/// Per-side castling descriptor: the right required, the king's travel,
/// the squares that must be empty, and the squares that must be safe.
struct CastleLane {
    right: CastleRights,
    king_from: Square,
    king_to: Square,
    must_be_empty: [Option<Square>; 3],
    must_be_safe: [Square; 2],
}

const LANES: [CastleLane; 4] = [
    CastleLane {
        right: CastleRights::WHITE_KING,
        king_from: Square::E1,
        king_to: Square::G1,
        must_be_empty: [Some(Square::F1), Some(Square::G1), None],
        must_be_safe: [Square::F1, Square::G1],
    },
    CastleLane {
        right: CastleRights::WHITE_QUEEN,
        king_from: Square::E1,
        king_to: Square::C1,
        must_be_empty: [Some(Square::B1), Some(Square::C1), Some(Square::D1)],
        must_be_safe: [Square::D1, Square::C1],
    },
    CastleLane {
        right: CastleRights::BLACK_KING,
        king_from: Square::E8,
        king_to: Square::G8,
        must_be_empty: [Some(Square::F8), Some(Square::G8), None],
        must_be_safe: [Square::F8, Square::G8],
    },
    CastleLane {
        right: CastleRights::BLACK_QUEEN,
        king_from: Square::E8,
        king_to: Square::C8,
        must_be_empty: [Some(Square::B8), Some(Square::C8), Some(Square::D8)],
        must_be_safe: [Square::D8, Square::C8],
    },
];

pub(super) fn gen_moves(board: &Board, ctx: &GenCtx, category: GenCategory, list: &mut MoveList) {
    let king = ctx.king();

    // Under quiet checks the king contributes only discovered checks.
    if category != GenCategory::QuietChecks || ctx.discoverers().contains(king) {
        for dst in king_attacks(king) & king_targets(ctx, category) {
            if !ctx.king_dest_safe(board, dst) {
                continue;
            }
            if category == GenCategory::QuietChecks
                && !ctx.gives_check(PieceKind::King, king, dst)
            {
                continue;
            }
            list.push(Move::new(king, dst));
        }
    }

    // Castling: quiet, never an evasion, never counted as a quiet check.
    if !matches!(category, GenCategory::Quiets | GenCategory::NonEvasions) || ctx.in_check() {
        return;
    }
    let rights = board.castling();
    let ours = CastleRights::for_color(ctx.us());
    for lane in &LANES {
        if !ours.contains(lane.right) || !rights.contains(lane.right) {
            continue;
        }
        debug_assert_eq!(lane.king_from, king);
        let clear = lane
            .must_be_empty
            .iter()
            .flatten()
            .all(|&sq| !ctx.occupied().contains(sq));
        let safe = lane.must_be_safe.iter().all(|&sq| !ctx.attacked(board, sq));
        if clear && safe {
            list.push(Move::castle(lane.king_from, lane.king_to));
        }
    }
}
