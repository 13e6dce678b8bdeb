//! Board squares in little-endian rank-file mapping (A1 = 0, H8 = 63).

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::error::ParseSquareError;

/// A square index in 0..64, LERF mapping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

macro_rules! square_consts {
    ($($name:ident = $idx:expr;)*) => {
        impl Square {
            $(pub const $name: Square = Square($idx);)*
        }
    };
}

square_consts! {
    A1 = 0;  B1 = 1;  C1 = 2;  D1 = 3;  E1 = 4;  F1 = 5;  G1 = 6;  H1 = 7;
    A2 = 8;  B2 = 9;  C2 = 10; D2 = 11; E2 = 12; F2 = 13; G2 = 14; H2 = 15;
    A3 = 16; B3 = 17; C3 = 18; D3 = 19; E3 = 20; F3 = 21; G3 = 22; H3 = 23;
    A4 = 24; B4 = 25; C4 = 26; D4 = 27; E4 = 28; F4 = 29; G4 = 30; H4 = 31;
    A5 = 32; B5 = 33; C5 = 34; D5 = 35; E5 = 36; F5 = 37; G5 = 38; H5 = 39;
    A6 = 40; B6 = 41; C6 = 42; D6 = 43; E6 = 44; F6 = 45; G6 = 46; H6 = 47;
    A7 = 48; B7 = 49; C7 = 50; D7 = 51; E7 = 52; F7 = 53; G7 = 54; H7 = 55;
    A8 = 56; B8 = 57; C8 = 58; D8 = 59; E8 = 60; F8 = 61; G8 = 62; H8 = 63;
}

impl Square {
    /// Build a square from file (0 = a) and rank (0 = 1) indices.
    #[inline]
    pub const fn make(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Build a square from a raw index, returning `None` above 63.
    #[inline]
    pub const fn from_index(idx: u8) -> Option<Square> {
        if idx < 64 { Some(Square(idx)) } else { None }
    }

    /// Build a square from a raw index without bounds checking the value.
    ///
    /// The index is masked to 0..64, so an out-of-range argument wraps
    /// rather than producing an invalid square.
    #[inline]
    pub const fn from_index_unchecked(idx: u8) -> Square {
        Square(idx & 63)
    }

    /// The raw index in 0..64.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// File index, 0 (a-file) .. 7 (h-file).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Rank index, 0 (rank 1) .. 7 (rank 8).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Single-bit bitboard for this square.
    #[inline]
    pub const fn bitboard(self) -> Bitboard {
        Bitboard::new(1u64 << self.0)
    }

    /// Offset the square by a signed index delta, returning `None` off-board.
    ///
    /// Only guards the 0..64 range; callers stepping east/west must check
    /// file wrap themselves (the attack tables do).
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Square> {
        let idx = self.0 as i8 + delta;
        if idx >= 0 && idx < 64 { Some(Square(idx as u8)) } else { None }
    }

    /// Mirror the square vertically (A1 <-> A8). Used by piece-square tables.
    #[inline]
    pub const fn flip_rank(self) -> Square {
        Square(self.0 ^ 56)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

// Squares read better as "e4" than as tuple-struct indices.
impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Ok(Square::make(file, rank))
        } else {
            Err(ParseSquareError(s.to_string()))
        }
    }
}
