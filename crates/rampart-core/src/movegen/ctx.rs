//! Shared per-position data for the piece generators.

use crate::attacks::{between, bishop_attacks, knight_attacks, line, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

/// Everything the generators need that is worth computing once: check
/// and pin state for our king, discovered-check candidates against the
/// enemy king, and (on demand) the per-piece-kind check squares.
pub(crate) struct GenCtx {
    us: Color,
    king: Square,
    their_king: Square,
    occupied: Bitboard,
    friendly: Bitboard,
    enemy: Bitboard,
    checkers: Bitboard,
    /// Our pieces pinned against our own king.
    pinned: Bitboard,
    /// Our pieces whose departure uncovers a check on the enemy king.
    discoverers: Bitboard,
    /// Capture-or-block squares while in (single) check; `FULL` otherwise.
    check_mask: Bitboard,
    /// `check_squares[kind]` holds the squares from which a piece of that
    /// kind gives direct check. Only filled for quiet-check generation.
    check_squares: [Bitboard; 6],
}

impl GenCtx {
    pub(crate) fn new(board: &Board, want_check_squares: bool) -> GenCtx {
        let us = board.side_to_move();
        let them = !us;
        let king = board.king_square(us);
        let their_king = board.king_square(them);
        let occupied = board.occupied();

        let checkers = board.attackers_to(king, occupied) & board.side(them);
        let pinned = slider_blockers(board, king, them) & board.side(us);
        let discoverers = slider_blockers(board, their_king, us) & board.side(us);

        let check_mask = match checkers.lsb() {
            None => Bitboard::FULL,
            Some(checker) => between(king, checker) | checkers,
        };

        let mut check_squares = [Bitboard::EMPTY; 6];
        if want_check_squares {
            let bishop = bishop_attacks(their_king, occupied);
            let rook = rook_attacks(their_king, occupied);
            check_squares[PieceKind::Pawn.index()] = pawn_attacks(them, their_king);
            check_squares[PieceKind::Knight.index()] = knight_attacks(their_king);
            check_squares[PieceKind::Bishop.index()] = bishop;
            check_squares[PieceKind::Rook.index()] = rook;
            check_squares[PieceKind::Queen.index()] = bishop | rook;
            // A king never gives direct check; its entry stays empty.
        }

        GenCtx {
            us,
            king,
            their_king,
            occupied,
            friendly: board.side(us),
            enemy: board.side(them),
            checkers,
            pinned,
            discoverers,
            check_mask,
            check_squares,
        }
    }

    #[inline]
    pub(crate) fn us(&self) -> Color {
        self.us
    }

    #[inline]
    pub(crate) fn king(&self) -> Square {
        self.king
    }

    #[inline]
    pub(crate) fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub(crate) fn friendly(&self) -> Bitboard {
        self.friendly
    }

    #[inline]
    pub(crate) fn enemy(&self) -> Bitboard {
        self.enemy
    }

    #[inline]
    pub(crate) fn checkers(&self) -> Bitboard {
        self.checkers
    }

    #[inline]
    pub(crate) fn pinned(&self) -> Bitboard {
        self.pinned
    }

    #[inline]
    pub(crate) fn discoverers(&self) -> Bitboard {
        self.discoverers
    }

    #[inline]
    pub(crate) fn check_mask(&self) -> Bitboard {
        self.check_mask
    }

    #[inline]
    pub(crate) fn in_check(&self) -> bool {
        self.checkers.is_nonempty()
    }

    /// `true` if the piece on `src` may move to `dst` as far as pins to
    /// our own king are concerned.
    #[inline]
    pub(crate) fn pin_ok(&self, src: Square, dst: Square) -> bool {
        !self.pinned.contains(src) || line(self.king, src).contains(dst)
    }

    /// `true` if moving a piece of `kind` from `src` to `dst` gives
    /// check, directly or by discovery. Valid only when check squares
    /// were requested.
    #[inline]
    pub(crate) fn gives_check(&self, kind: PieceKind, src: Square, dst: Square) -> bool {
        self.check_squares[kind.index()].contains(dst)
            || (self.discoverers.contains(src) && !line(self.their_king, src).contains(dst))
    }

    /// `true` if the king may stand on `dst` with sliders seeing through
    /// its current square.
    pub(crate) fn king_dest_safe(&self, board: &Board, dst: Square) -> bool {
        let occ_without_king = self.occupied ^ self.king.bitboard();
        (board.attackers_to(dst, occ_without_king) & self.enemy).is_empty()
    }

    /// `true` if `sq` is attacked by the enemy with the current occupancy.
    pub(crate) fn attacked(&self, board: &Board, sq: Square) -> bool {
        (board.attackers_to(sq, self.occupied) & self.enemy).is_nonempty()
    }
}

/// Pieces of either color that are the sole blocker between `king` and
/// an enemy sniper; intersect with one side to get pins or
/// discovered-check candidates.
fn slider_blockers(board: &Board, king: Square, attackers: Color) -> Bitboard {
    let rooks_queens = board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen);
    let bishops_queens = board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen);

    let snipers = ((rook_attacks(king, Bitboard::EMPTY) & rooks_queens)
        | (bishop_attacks(king, Bitboard::EMPTY) & bishops_queens))
        & board.side(attackers);

    let mut blockers = Bitboard::EMPTY;
    for sniper in snipers {
        let blocking = between(king, sniper) & board.occupied();
        if blocking.is_single() {
            blockers |= blocking;
        }
    }
    blockers
}
