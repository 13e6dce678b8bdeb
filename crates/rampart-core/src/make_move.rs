//! Applying moves to a board (copy-make).

use crate::board::Board;
use crate::castling::CastleRights;
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;
use crate::zobrist;

/// Castling rights that die when a square is vacated or captured on.
/// Rook home squares and king home squares carry flags; everything else
/// is `NONE`.
fn rights_lost(sq: Square) -> CastleRights {
    match sq {
        Square::A1 => CastleRights::WHITE_QUEEN,
        Square::H1 => CastleRights::WHITE_KING,
        Square::E1 => CastleRights::for_color(Color::White),
        Square::A8 => CastleRights::BLACK_QUEEN,
        Square::H8 => CastleRights::BLACK_KING,
        Square::E8 => CastleRights::for_color(Color::Black),
        _ => CastleRights::NONE,
    }
}

impl Board {
    /// Apply a legal move, returning the resulting position.
    ///
    /// Feeding an illegal move is a programming error: debug builds
    /// assert on the obvious cases, release builds produce garbage.
    pub fn make_move(&self, mv: Move) -> Board {
        debug_assert!(!mv.is_null(), "make_move on null move");

        let mut next = *self;
        let us = self.side_to_move;
        let them = !us;
        let origin = mv.origin();
        let dest = mv.dest();

        let kind = self
            .piece_on(origin)
            .unwrap_or_else(|| panic!("no piece on {origin} for move {mv}"));
        debug_assert_eq!(self.color_on(origin), Some(us), "moving opponent's piece");

        // Clear the old en-passant file from the hash; a new one may be set below.
        if let Some(ep) = next.en_passant.take() {
            next.hash ^= zobrist::EP_FILE[ep.file() as usize];
        }

        next.halfmove_clock += 1;
        if kind == PieceKind::Pawn {
            next.halfmove_clock = 0;
        }

        match mv.kind() {
            MoveKind::Normal => {
                if let Some(victim) = self.piece_on(dest) {
                    debug_assert_ne!(victim, PieceKind::King, "capturing a king");
                    next.toggle(them, victim, dest);
                    next.halfmove_clock = 0;
                }
                next.toggle(us, kind, origin);
                next.toggle(us, kind, dest);

                // Double pawn push sets the en-passant target behind the pawn,
                // but only when an enemy pawn could actually take it.
                if kind == PieceKind::Pawn
                    && (origin.index() as i8 - dest.index() as i8).abs() == 16
                {
                    let ep = Square::from_index_unchecked(
                        (origin.index() as i8 + us.forward()) as u8,
                    );
                    let enemy_pawns = next.colored_pieces(them, PieceKind::Pawn);
                    if (crate::attacks::pawn_attacks(us, ep) & enemy_pawns).is_nonempty() {
                        next.en_passant = Some(ep);
                        next.hash ^= zobrist::EP_FILE[ep.file() as usize];
                    }
                }
            }
            MoveKind::Promotion => {
                if let Some(victim) = self.piece_on(dest) {
                    next.toggle(them, victim, dest);
                    next.halfmove_clock = 0;
                }
                next.toggle(us, PieceKind::Pawn, origin);
                next.toggle(us, mv.promo().piece_kind(), dest);
            }
            MoveKind::EnPassant => {
                let captured = Square::from_index_unchecked(
                    (dest.index() as i8 - us.forward()) as u8,
                );
                debug_assert_eq!(self.piece_on(captured), Some(PieceKind::Pawn));
                next.toggle(them, PieceKind::Pawn, captured);
                next.toggle(us, PieceKind::Pawn, origin);
                next.toggle(us, PieceKind::Pawn, dest);
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = match dest {
                    Square::G1 => (Square::H1, Square::F1),
                    Square::C1 => (Square::A1, Square::D1),
                    Square::G8 => (Square::H8, Square::F8),
                    _ => (Square::A8, Square::D8),
                };
                next.toggle(us, PieceKind::King, origin);
                next.toggle(us, PieceKind::King, dest);
                next.toggle(us, PieceKind::Rook, rook_from);
                next.toggle(us, PieceKind::Rook, rook_to);
            }
        }

        // Castling rights lost by moving from or capturing on a key square.
        let remaining = next.castling.remove(rights_lost(origin).add(rights_lost(dest)));
        if remaining != next.castling {
            next.hash ^= zobrist::CASTLING[next.castling.bits() as usize]
                ^ zobrist::CASTLING[remaining.bits() as usize];
            next.castling = remaining;
        }

        next.side_to_move = them;
        next.hash ^= zobrist::SIDE_TO_MOVE;
        if us == Color::Black {
            next.fullmove_number += 1;
        }

        debug_assert_eq!(next.hash, zobrist::hash_from_scratch(&next));
        next
    }

    /// Pass the turn without moving ("null move"). Used by null-move
    /// pruning; never legal while in check.
    pub fn make_null_move(&self) -> Board {
        debug_assert!(!self.in_check(), "null move while in check");

        let mut next = *self;
        if let Some(ep) = next.en_passant.take() {
            next.hash ^= zobrist::EP_FILE[ep.file() as usize];
        }
        next.side_to_move = !self.side_to_move;
        next.hash ^= zobrist::SIDE_TO_MOVE;
        next.halfmove_clock += 1;
        next
    }
}
