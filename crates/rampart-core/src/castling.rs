//! Castling rights as a 4-bit flag set.

use std::fmt;

use crate::color::Color;

/// Castling availability flags, one bit per side/wing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleRights(u8);

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const WHITE_KING: CastleRights = CastleRights(0b0001);
    pub const WHITE_QUEEN: CastleRights = CastleRights(0b0010);
    pub const BLACK_KING: CastleRights = CastleRights(0b0100);
    pub const BLACK_QUEEN: CastleRights = CastleRights(0b1000);
    pub const ALL: CastleRights = CastleRights(0b1111);

    /// The raw flag bits (0..16), usable as a Zobrist table index.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, rights: CastleRights) -> bool {
        self.0 & rights.0 == rights.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Both flags for one side.
    #[inline]
    pub const fn for_color(color: Color) -> CastleRights {
        match color {
            Color::White => CastleRights(0b0011),
            Color::Black => CastleRights(0b1100),
        }
    }

    #[inline]
    pub const fn add(self, rights: CastleRights) -> CastleRights {
        CastleRights(self.0 | rights.0)
    }

    #[inline]
    pub const fn remove(self, rights: CastleRights) -> CastleRights {
        CastleRights(self.0 & !rights.0)
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for CastleRights {
    /// FEN castling field ("KQkq", subsets thereof, or "-").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.contains(CastleRights::WHITE_KING) {
            write!(f, "K")?;
        }
        if self.contains(CastleRights::WHITE_QUEEN) {
            write!(f, "Q")?;
        }
        if self.contains(CastleRights::BLACK_KING) {
            write!(f, "k")?;
        }
        if self.contains(CastleRights::BLACK_QUEEN) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove() {
        let rights = CastleRights::NONE.add(CastleRights::WHITE_KING);
        assert!(rights.contains(CastleRights::WHITE_KING));
        assert!(!rights.contains(CastleRights::WHITE_QUEEN));
        assert!(rights.remove(CastleRights::WHITE_KING).is_empty());
    }

    #[test]
    fn for_color_covers_both_wings() {
        let white = CastleRights::for_color(Color::White);
        assert!(white.contains(CastleRights::WHITE_KING));
        assert!(white.contains(CastleRights::WHITE_QUEEN));
        assert!(!white.contains(CastleRights::BLACK_KING));
    }

    #[test]
    fn display_fen_field() {
        assert_eq!(CastleRights::ALL.to_string(), "KQkq");
        assert_eq!(CastleRights::NONE.to_string(), "-");
        assert_eq!(
            CastleRights::WHITE_KING.add(CastleRights::BLACK_QUEEN).to_string(),
            "Kq"
        );
    }

    #[test]
    fn bits_index_range() {
        assert!(CastleRights::ALL.bits() < 16);
    }
}
