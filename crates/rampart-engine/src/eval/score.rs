//! Packed middlegame/endgame score pair.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A middlegame and an endgame value packed into one `i32`.
///
/// The encoding `((mg as i32) << 16) + eg` is additive, so sums and
/// differences work on the packed value directly. Extraction of the
/// middlegame half adds `0x8000` first to undo the sign bleed from a
/// negative endgame half.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Score(i32);

impl Score {
    pub const ZERO: Score = Score(0);

    #[inline]
    pub const fn new(mg: i16, eg: i16) -> Score {
        Score(((mg as i32) << 16).wrapping_add(eg as i32))
    }

    #[inline]
    pub const fn mg(self) -> i32 {
        ((self.0.wrapping_add(0x8000)) >> 16) as i16 as i32
    }

    #[inline]
    pub const fn eg(self) -> i32 {
        self.0 as i16 as i32
    }

    /// Blend the two halves by game phase (`phase` in `0..=max`).
    #[inline]
    pub fn taper(self, phase: i32, max: i32) -> i32 {
        (self.mg() * phase + self.eg() * (max - phase)) / max
    }
}

/// Shorthand constructor, the usual notation in hand-crafted evaluations.
#[allow(non_snake_case)]
#[inline]
pub const fn S(mg: i16, eg: i16) -> Score {
    Score::new(mg, eg)
}

impl Add for Score {
    type Output = Score;
    #[inline]
    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl Sub for Score {
    type Output = Score;
    #[inline]
    fn sub(self, rhs: Score) -> Score {
        Score(self.0 - rhs.0)
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) {
        self.0 -= rhs.0;
    }
}

impl Neg for Score {
    type Output = Score;
    #[inline]
    fn neg(self) -> Score {
        Score(-self.0)
    }
}

impl Mul<i32> for Score {
    type Output = Score;
    #[inline]
    fn mul(self, rhs: i32) -> Score {
        Score::new((self.mg() * rhs) as i16, (self.eg() * rhs) as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let s = S(31, -7);
        assert_eq!(s.mg(), 31);
        assert_eq!(s.eg(), -7);
        let n = S(-120, -350);
        assert_eq!(n.mg(), -120);
        assert_eq!(n.eg(), -350);
    }

    #[test]
    fn additive_encoding() {
        let a = S(10, -20);
        let b = S(-3, 5);
        assert_eq!((a + b).mg(), 7);
        assert_eq!((a + b).eg(), -15);
        assert_eq!((a - b).mg(), 13);
        assert_eq!((a - b).eg(), -25);
        assert_eq!((-a).mg(), -10);
        assert_eq!((-a).eg(), 20);
    }

    #[test]
    fn taper_endpoints() {
        let s = S(100, 40);
        assert_eq!(s.taper(24, 24), 100);
        assert_eq!(s.taper(0, 24), 40);
        assert_eq!(s.taper(12, 24), 70);
    }
}
