//! 16-bit packed move representation.

use std::fmt;

use crate::piece::PieceKind;
use crate::square::Square;

/// Move kind tag stored in the top two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castling = 3,
}

/// Pieces a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Promotion {
    Knight = 0,
    Bishop = 1,
    Rook = 2,
    Queen = 3,
}

impl Promotion {
    pub const ALL: [Promotion; 4] = [
        Promotion::Queen,
        Promotion::Rook,
        Promotion::Bishop,
        Promotion::Knight,
    ];

    pub const fn piece_kind(self) -> PieceKind {
        match self {
            Promotion::Knight => PieceKind::Knight,
            Promotion::Bishop => PieceKind::Bishop,
            Promotion::Rook => PieceKind::Rook,
            Promotion::Queen => PieceKind::Queen,
        }
    }

    pub const fn uci_char(self) -> char {
        match self {
            Promotion::Knight => 'n',
            Promotion::Bishop => 'b',
            Promotion::Rook => 'r',
            Promotion::Queen => 'q',
        }
    }
}

/// A move packed into 16 bits:
///
/// ```text
/// bits  0-5:  destination square
/// bits  6-11: origin square
/// bits 12-13: promotion piece (Knight=0 .. Queen=3)
/// bits 14-15: move kind
/// ```
///
/// The destination occupies the low bits so the common "is this the same
/// move" comparisons compile to a single integer compare, and so a raw
/// value read back from the transposition table can be rebuilt with
/// [`Move::from_raw`] and validated by a legality check.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

const ORIGIN_SHIFT: u32 = 6;
const PROMO_SHIFT: u32 = 12;
const KIND_SHIFT: u32 = 14;

impl Move {
    /// Sentinel that is never a legal move (a1a1).
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(origin: Square, dest: Square) -> Move {
        Move((dest.index() as u16) | ((origin.index() as u16) << ORIGIN_SHIFT))
    }

    #[inline]
    pub const fn promotion(origin: Square, dest: Square, promo: Promotion) -> Move {
        Move(
            (dest.index() as u16)
                | ((origin.index() as u16) << ORIGIN_SHIFT)
                | ((promo as u16) << PROMO_SHIFT)
                | ((MoveKind::Promotion as u16) << KIND_SHIFT),
        )
    }

    #[inline]
    pub const fn en_passant(origin: Square, dest: Square) -> Move {
        Move(
            (dest.index() as u16)
                | ((origin.index() as u16) << ORIGIN_SHIFT)
                | ((MoveKind::EnPassant as u16) << KIND_SHIFT),
        )
    }

    /// Castling encoded by the king's origin and destination squares.
    #[inline]
    pub const fn castle(king_from: Square, king_to: Square) -> Move {
        Move(
            (king_to.index() as u16)
                | ((king_from.index() as u16) << ORIGIN_SHIFT)
                | ((MoveKind::Castling as u16) << KIND_SHIFT),
        )
    }

    /// Rebuild a move from its raw bits (e.g. out of a TT entry).
    ///
    /// The result may be garbage under hash collisions; callers must
    /// validate it against the position before making it.
    #[inline]
    pub const fn from_raw(raw: u16) -> Move {
        Move(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn origin(self) -> Square {
        Square::from_index_unchecked(((self.0 >> ORIGIN_SHIFT) & 63) as u8)
    }

    #[inline]
    pub const fn dest(self) -> Square {
        Square::from_index_unchecked((self.0 & 63) as u8)
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        match self.0 >> KIND_SHIFT {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    /// Promotion piece; meaningful only when `kind() == Promotion`.
    #[inline]
    pub const fn promo(self) -> Promotion {
        match (self.0 >> PROMO_SHIFT) & 3 {
            0 => Promotion::Knight,
            1 => Promotion::Bishop,
            2 => Promotion::Rook,
            _ => Promotion::Queen,
        }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.0 >> KIND_SHIFT == MoveKind::Promotion as u16
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.0 >> KIND_SHIFT == MoveKind::EnPassant as u16
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.0 >> KIND_SHIFT == MoveKind::Castling as u16
    }
}

impl fmt::Display for Move {
    /// UCI long algebraic notation; the null move prints as "0000".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "0000")
        } else if self.is_promotion() {
            write!(f, "{}{}{}", self.origin(), self.dest(), self.promo().uci_char())
        } else {
            write!(f, "{}{}", self.origin(), self.dest())
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self}, {:?})", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_two_bytes() {
        assert_eq!(std::mem::size_of::<Move>(), 2);
    }

    #[test]
    fn normal_fields() {
        let mv = Move::new(Square::G1, Square::F3);
        assert_eq!(mv.origin(), Square::G1);
        assert_eq!(mv.dest(), Square::F3);
        assert_eq!(mv.kind(), MoveKind::Normal);
        assert!(!mv.is_null());
    }

    #[test]
    fn promotion_fields() {
        for promo in Promotion::ALL {
            let mv = Move::promotion(Square::B7, Square::A8, promo);
            assert_eq!(mv.origin(), Square::B7);
            assert_eq!(mv.dest(), Square::A8);
            assert_eq!(mv.promo(), promo);
            assert!(mv.is_promotion());
        }
    }

    #[test]
    fn en_passant_and_castle_tags() {
        let ep = Move::en_passant(Square::E5, Square::D6);
        assert!(ep.is_en_passant());
        assert!(!ep.is_castle());

        let castle = Move::castle(Square::E1, Square::G1);
        assert!(castle.is_castle());
        assert_eq!(castle.dest(), Square::G1);
    }

    #[test]
    fn raw_roundtrip() {
        let mv = Move::promotion(Square::H7, Square::G8, Promotion::Knight);
        assert_eq!(Move::from_raw(mv.raw()), mv);
    }

    #[test]
    fn uci_strings() {
        assert_eq!(Move::new(Square::E2, Square::E4).to_string(), "e2e4");
        assert_eq!(
            Move::promotion(Square::E7, Square::E8, Promotion::Queen).to_string(),
            "e7e8q"
        );
        assert_eq!(Move::NULL.to_string(), "0000");
    }

    #[test]
    fn exhaustive_origin_dest_roundtrip() {
        for from in 0u8..64 {
            for to in 0u8..64 {
                let f = Square::from_index(from).unwrap();
                let t = Square::from_index(to).unwrap();
                let mv = Move::new(f, t);
                assert_eq!(mv.origin(), f);
                assert_eq!(mv.dest(), t);
            }
        }
    }
}
