//! Piece-square tables.
//!
//! Tables are written from White's point of view in LERF order (index 0
//! is a1). Black lookups mirror the square vertically.

use rampart_core::{Color, PieceKind, Square};

use super::score::{S, Score};

#[rustfmt::skip]
const PAWN: [Score; 64] = [
    S(0,0),   S(0,0),   S(0,0),   S(0,0),    S(0,0),    S(0,0),   S(0,0),   S(0,0),
    S(2,-4),  S(8,-4),  S(6,-8),  S(-16,-8), S(-16,-8), S(6,-8),  S(8,-4),  S(2,-4),
    S(2,0),   S(-4,0),  S(-8,2),  S(2,4),    S(2,4),    S(-8,2),  S(-4,0),  S(2,0),
    S(0,4),   S(0,4),   S(4,6),   S(18,14),  S(18,14),  S(4,6),   S(0,4),   S(0,4),
    S(4,10),  S(6,10),  S(10,14), S(22,20),  S(22,20),  S(10,14), S(6,10),  S(4,10),
    S(12,24), S(14,26), S(22,32), S(28,34),  S(28,34),  S(22,32), S(14,26), S(12,24),
    S(60,110),S(64,116),S(70,120),S(76,124), S(76,124), S(70,120),S(64,116),S(60,110),
    S(0,0),   S(0,0),   S(0,0),   S(0,0),    S(0,0),    S(0,0),   S(0,0),   S(0,0),
];

#[rustfmt::skip]
const KNIGHT: [Score; 64] = [
    S(-56,-44),S(-38,-34),S(-28,-22),S(-24,-16),S(-24,-16),S(-28,-22),S(-38,-34),S(-56,-44),
    S(-36,-32),S(-18,-18),S(-4,-6),  S(2,0),    S(2,0),    S(-4,-6),  S(-18,-18),S(-36,-32),
    S(-26,-20),S(0,-4),   S(10,8),   S(16,14),  S(16,14),  S(10,8),   S(0,-4),   S(-26,-20),
    S(-22,-14),S(4,2),    S(16,14),  S(24,22),  S(24,22),  S(16,14),  S(4,2),    S(-22,-14),
    S(-20,-14),S(6,2),    S(18,14),  S(26,22),  S(26,22),  S(18,14),  S(6,2),    S(-20,-14),
    S(-24,-20),S(2,-4),   S(12,8),   S(20,14),  S(20,14),  S(12,8),   S(2,-4),   S(-24,-20),
    S(-36,-32),S(-16,-18),S(-2,-6),  S(4,0),    S(4,0),    S(-2,-6),  S(-16,-18),S(-36,-32),
    S(-60,-44),S(-36,-34),S(-26,-22),S(-22,-16),S(-22,-16),S(-26,-22),S(-36,-34),S(-60,-44),
];

#[rustfmt::skip]
const BISHOP: [Score; 64] = [
    S(-22,-18),S(-8,-10), S(-12,-8), S(-14,-6), S(-14,-6), S(-12,-8), S(-8,-10), S(-22,-18),
    S(-6,-10), S(8,-2),   S(4,0),    S(0,2),    S(0,2),    S(4,0),    S(8,-2),   S(-6,-10),
    S(-8,-6),  S(6,0),    S(10,6),   S(8,8),    S(8,8),    S(10,6),   S(6,0),    S(-8,-6),
    S(-10,-4), S(2,2),    S(10,8),   S(16,12),  S(16,12),  S(10,8),   S(2,2),    S(-10,-4),
    S(-10,-4), S(2,2),    S(10,8),   S(16,12),  S(16,12),  S(10,8),   S(2,2),    S(-10,-4),
    S(-8,-6),  S(6,0),    S(10,6),   S(8,8),    S(8,8),    S(10,6),   S(6,0),    S(-8,-6),
    S(-6,-10), S(8,-2),   S(4,0),    S(0,2),    S(0,2),    S(4,0),    S(8,-2),   S(-6,-10),
    S(-22,-18),S(-8,-10), S(-12,-8), S(-14,-6), S(-14,-6), S(-12,-8), S(-8,-10), S(-22,-18),
];

#[rustfmt::skip]
const ROOK: [Score; 64] = [
    S(-14,-8), S(-10,-4), S(-4,0),   S(2,0),    S(2,0),    S(-4,0),   S(-10,-4), S(-14,-8),
    S(-16,-6), S(-8,-2),  S(-2,0),   S(4,2),    S(4,2),    S(-2,0),   S(-8,-2),  S(-16,-6),
    S(-14,-4), S(-8,0),   S(-2,2),   S(2,2),    S(2,2),    S(-2,2),   S(-8,0),   S(-14,-4),
    S(-12,-2), S(-6,2),   S(0,4),    S(4,4),    S(4,4),    S(0,4),    S(-6,2),   S(-12,-2),
    S(-10,0),  S(-4,4),   S(2,6),    S(6,6),    S(6,6),    S(2,6),    S(-4,4),   S(-10,0),
    S(-8,2),   S(-2,6),   S(4,8),    S(8,8),    S(8,8),    S(4,8),    S(-2,6),   S(-8,2),
    S(10,8),   S(14,10),  S(18,12),  S(22,12),  S(22,12),  S(18,12),  S(14,10),  S(10,8),
    S(4,6),    S(6,8),    S(10,10),  S(14,10),  S(14,10),  S(10,10),  S(6,8),    S(4,6),
];

#[rustfmt::skip]
const QUEEN: [Score; 64] = [
    S(-12,-22),S(-8,-16), S(-6,-12), S(2,-8),   S(2,-8),   S(-6,-12), S(-8,-16), S(-12,-22),
    S(-6,-14), S(2,-8),   S(6,-4),   S(8,0),    S(8,0),    S(6,-4),   S(2,-8),   S(-6,-14),
    S(-4,-10), S(4,-2),   S(8,4),    S(10,8),   S(10,8),   S(8,4),    S(4,-2),   S(-4,-10),
    S(0,-6),   S(6,2),    S(10,10),  S(12,16),  S(12,16),  S(10,10),  S(6,2),    S(0,-6),
    S(0,-6),   S(6,2),    S(10,10),  S(12,16),  S(12,16),  S(10,10),  S(6,2),    S(0,-6),
    S(-4,-10), S(4,-2),   S(8,4),    S(10,8),   S(10,8),   S(8,4),    S(4,-2),   S(-4,-10),
    S(-6,-14), S(2,-8),   S(6,-4),   S(8,0),    S(8,0),    S(6,-4),   S(2,-8),   S(-6,-14),
    S(-12,-22),S(-8,-16), S(-6,-12), S(2,-8),   S(2,-8),   S(-6,-12), S(-8,-16), S(-12,-22),
];

#[rustfmt::skip]
const KING: [Score; 64] = [
    S(24,-50), S(34,-30), S(14,-18), S(-10,-10),S(-10,-10),S(14,-18), S(34,-30), S(24,-50),
    S(18,-24), S(20,-12), S(0,-2),   S(-20,4),  S(-20,4),  S(0,-2),   S(20,-12), S(18,-24),
    S(-12,-18),S(-16,-4), S(-20,8),  S(-24,16), S(-24,16), S(-20,8),  S(-16,-4), S(-12,-18),
    S(-24,-12),S(-28,4),  S(-32,18), S(-36,24), S(-36,24), S(-32,18), S(-28,4),  S(-24,-12),
    S(-32,-10),S(-36,8),  S(-40,22), S(-44,28), S(-44,28), S(-40,22), S(-36,8),  S(-32,-10),
    S(-36,-10),S(-40,10), S(-44,24), S(-48,28), S(-48,28), S(-44,24), S(-40,10), S(-36,-10),
    S(-40,-16),S(-44,0),  S(-48,14), S(-52,20), S(-52,20), S(-48,14), S(-44,0),  S(-40,-16),
    S(-44,-34),S(-48,-18),S(-52,-6), S(-56,0),  S(-56,0),  S(-52,-6), S(-48,-18),S(-44,-34),
];

const TABLES: [&[Score; 64]; 6] = [&PAWN, &KNIGHT, &BISHOP, &ROOK, &QUEEN, &KING];

/// PST value for a piece of `color` and `kind` on `sq`, from that
/// side's own perspective.
#[inline]
pub fn pst(color: Color, kind: PieceKind, sq: Square) -> Score {
    let sq = match color {
        Color::White => sq,
        Color::Black => sq.flip_rank(),
    };
    TABLES[kind.index()][sq.index()]
}
