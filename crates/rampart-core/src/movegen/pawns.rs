//! Pawn move generation: pushes, captures, promotions, en passant.

use crate::attacks::{bishop_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, Promotion};
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

use super::{GenCategory, GenCtx, MoveList};

#[inline]
fn forward(us: Color, bb: Bitboard) -> Bitboard {
    match us {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    }
}

pub(super) fn gen_moves(
    board: &Board,
    ctx: &GenCtx,
    category: GenCategory,
    targets: Bitboard,
    list: &mut MoveList,
) {
    let us = ctx.us();
    let them = !us;
    let pawns = board.colored_pieces(us, PieceKind::Pawn);
    let empty = !ctx.occupied();

    let (seventh, double_rank) = match us {
        Color::White => (Bitboard::RANK_7, Bitboard::RANK_4),
        Color::Black => (Bitboard::RANK_2, Bitboard::RANK_5),
    };
    let step = us.forward();

    // Quiet pushes. The target mask is empty-square based for every
    // category that wants them, so captures-only generation falls out
    // naturally.
    let singles = forward(us, pawns & !seventh) & empty;
    let doubles = forward(us, singles) & empty & double_rank;
    for dst in singles & targets {
        let src = Square::from_index_unchecked((dst.index() as i8 - step) as u8);
        if !ctx.pin_ok(src, dst) {
            continue;
        }
        if category == GenCategory::QuietChecks && !ctx.gives_check(PieceKind::Pawn, src, dst) {
            continue;
        }
        list.push(Move::new(src, dst));
    }
    for dst in doubles & targets {
        let src = Square::from_index_unchecked((dst.index() as i8 - 2 * step) as u8);
        if !ctx.pin_ok(src, dst) {
            continue;
        }
        if category == GenCategory::QuietChecks && !ctx.gives_check(PieceKind::Pawn, src, dst) {
            continue;
        }
        list.push(Move::new(src, dst));
    }

    let want_captures = matches!(
        category,
        GenCategory::Captures | GenCategory::Evasions | GenCategory::NonEvasions
    );

    // Promotions. Queen and knight go with the capture-ish categories,
    // rook and bishop with the quiet ones, so each of the four appears
    // exactly once across the category split.
    if (pawns & seventh).is_nonempty() && category != GenCategory::QuietChecks {
        let queen_knight = want_captures;
        let rook_bishop = matches!(
            category,
            GenCategory::Quiets | GenCategory::Evasions | GenCategory::NonEvasions
        );

        let pushes = forward(us, pawns & seventh) & empty & ctx.check_mask();
        for dst in pushes {
            let src = Square::from_index_unchecked((dst.index() as i8 - step) as u8);
            if ctx.pin_ok(src, dst) {
                expand_promotions(src, dst, queen_knight, rook_bishop, list);
            }
        }
        for src in pawns & seventh {
            for dst in pawn_attacks(us, src) & ctx.enemy() & ctx.check_mask() {
                if ctx.pin_ok(src, dst) {
                    expand_promotions(src, dst, queen_knight, rook_bishop, list);
                }
            }
        }
    }

    if !want_captures {
        return;
    }

    // Plain captures.
    for src in pawns & !seventh {
        for dst in pawn_attacks(us, src) & ctx.enemy() & ctx.check_mask() {
            if ctx.pin_ok(src, dst) {
                list.push(Move::new(src, dst));
            }
        }
    }

    // En passant. The capture leaves the destination empty of victims,
    // so its legality needs direct checks: the captured pawn must be the
    // checker under evasions, the pin ray must allow the diagonal step,
    // and removing both pawns must not uncover a slider on the king.
    if let Some(ep) = board.en_passant() {
        let victim = Square::from_index_unchecked((ep.index() as i8 - step) as u8);
        if category == GenCategory::Evasions && !ctx.check_mask().contains(victim) {
            return;
        }
        for src in pawn_attacks(them, ep) & pawns {
            if !ctx.pin_ok(src, ep) {
                continue;
            }
            let after = (ctx.occupied() ^ src.bitboard() ^ victim.bitboard()) | ep.bitboard();
            let rooks_queens = (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen))
                & board.side(them);
            let bishops_queens = (board.pieces(PieceKind::Bishop)
                | board.pieces(PieceKind::Queen))
                & board.side(them);
            if (rook_attacks(ctx.king(), after) & rooks_queens).is_nonempty()
                || (bishop_attacks(ctx.king(), after) & bishops_queens).is_nonempty()
            {
                continue;
            }
            list.push(Move::en_passant(src, ep));
        }
    }
}

fn expand_promotions(
    src: Square,
    dst: Square,
    queen_knight: bool,
    rook_bishop: bool,
    list: &mut MoveList,
) {
    if queen_knight {
        list.push(Move::promotion(src, dst, Promotion::Queen));
        list.push(Move::promotion(src, dst, Promotion::Knight));
    }
    if rook_bishop {
        list.push(Move::promotion(src, dst, Promotion::Rook));
        list.push(Move::promotion(src, dst, Promotion::Bishop));
    }
}
