//! The position: piece placement, side to move, castling, en passant,
//! move counters, and the incrementally maintained Zobrist key.

use std::fmt;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// A complete chess position. Copy-make: [`Board::make_move`] returns a
/// new board, leaving the parent untouched for backtracking.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    /// One bitboard per piece kind, both colors merged.
    pub(crate) pieces: [Bitboard; 6],
    /// One bitboard per side.
    pub(crate) sides: [Bitboard; 2],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
}

impl Board {
    /// The standard starting position.
    pub fn starting_position() -> Board {
        crate::fen::STARTING_FEN
            .parse()
            .expect("starting FEN is valid")
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    /// Pieces of one kind belonging to one side.
    #[inline]
    pub fn colored_pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()] & self.sides[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    pub fn piece_on(&self, sq: Square) -> Option<PieceKind> {
        PieceKind::ALL
            .into_iter()
            .find(|&kind| self.pieces[kind.index()].contains(sq))
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        if self.sides[0].contains(sq) {
            Some(Color::White)
        } else if self.sides[1].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn colored_piece_on(&self, sq: Square) -> Option<Piece> {
        Some(Piece::new(self.color_on(sq)?, self.piece_on(sq)?))
    }

    /// King square for a side.
    ///
    /// # Panics
    ///
    /// Panics when the side has no king; FEN parsing rejects such boards.
    pub fn king_square(&self, color: Color) -> Square {
        self.colored_pieces(color, PieceKind::King)
            .lsb()
            .expect("each side has a king")
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// The position's Zobrist key, maintained incrementally by make-move.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// All pieces of either color attacking `sq`, with sliding rays
    /// traced through `occupied`.
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let rooks_queens = self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen);
        let bishops_queens = self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen);

        (pawn_attacks(Color::Black, sq) & self.colored_pieces(Color::White, PieceKind::Pawn))
            | (pawn_attacks(Color::White, sq) & self.colored_pieces(Color::Black, PieceKind::Pawn))
            | (knight_attacks(sq) & self.pieces(PieceKind::Knight))
            | (king_attacks(sq) & self.pieces(PieceKind::King))
            | (rook_attacks(sq, occupied) & rooks_queens)
            | (bishop_attacks(sq, occupied) & bishops_queens)
    }

    /// `true` if `by` attacks `sq`, tracing sliders through `occupied`.
    pub fn is_attacked(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        (self.attackers_to(sq, occupied) & self.side(by)).is_nonempty()
    }

    /// Enemy pieces currently giving check to the side to move.
    pub fn checkers(&self) -> Bitboard {
        let king = self.king_square(self.side_to_move);
        self.attackers_to(king, self.occupied()) & self.side(!self.side_to_move)
    }

    /// `true` if the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers().is_nonempty()
    }

    /// `true` if `color` has any piece besides pawns and the king.
    /// Null-move pruning is disabled without this, to avoid zugzwang traps.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let minors_majors = self.pieces(PieceKind::Knight)
            | self.pieces(PieceKind::Bishop)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        (minors_majors & self.side(color)).is_nonempty()
    }

    /// Draw by bare kings, king+minor vs king, or king+bishop vs
    /// king+bishop on same-colored squares.
    pub fn is_insufficient_material(&self) -> bool {
        if (self.pieces(PieceKind::Pawn)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen))
        .is_nonempty()
        {
            return false;
        }
        let minors = self.pieces(PieceKind::Knight) | self.pieces(PieceKind::Bishop);
        match minors.count() {
            0 | 1 => true,
            2 => {
                // Two bishops on the same square color cannot mate
                let bishops = self.pieces(PieceKind::Bishop);
                if bishops.count() != 2 {
                    return false;
                }
                const LIGHT: u64 = 0x55AA_55AA_55AA_55AA;
                let on_light = bishops.bits() & LIGHT;
                on_light == 0 || on_light == bishops.bits()
            }
            _ => false,
        }
    }

    /// Total piece count, kings included. Used to gate tablebase probes.
    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.occupied().count()
    }

    /// Add or remove a piece by XOR, updating the hash alongside.
    #[inline]
    pub(crate) fn toggle(&mut self, color: Color, kind: PieceKind, sq: Square) {
        let mask = sq.bitboard();
        self.pieces[kind.index()] ^= mask;
        self.sides[color.index()] ^= mask;
        self.hash ^= zobrist::PIECE_SQUARE[Piece::new(color, kind).index()][sq.index()];
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\"{}\")", self.to_fen())
    }
}

impl fmt::Display for Board {
    /// 8x8 diagram with rank 8 on top, FEN letters, dots for empty squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::make(file, rank);
                let c = self.colored_piece_on(sq).map_or('.', Piece::to_char);
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
