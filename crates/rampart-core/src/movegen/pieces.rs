//! Knight, bishop, rook and queen move generation.

use crate::attacks::{bishop_attacks, knight_attacks, line, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::square::Square;

use super::{GenCategory, GenCtx, MoveList};

const KINDS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

fn attacks(kind: PieceKind, sq: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        _ => unreachable!("pawns and kings have their own generators"),
    }
}

pub(super) fn gen_moves(
    board: &Board,
    ctx: &GenCtx,
    category: GenCategory,
    targets: Bitboard,
    list: &mut MoveList,
) {
    for kind in KINDS {
        for src in board.colored_pieces(ctx.us(), kind) {
            let mut dests = attacks(kind, src, ctx.occupied()) & targets;
            if ctx.pinned().contains(src) {
                // Sliders may stay on the pin ray; a knight never can,
                // since no knight move is collinear with its origin.
                dests &= line(ctx.king(), src);
            }
            for dst in dests {
                if category == GenCategory::QuietChecks && !ctx.gives_check(kind, src, dst) {
                    continue;
                }
                list.push(Move::new(src, dst));
            }
        }
    }
}
