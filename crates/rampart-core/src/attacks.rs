//! Precomputed attack tables.
//!
//! Leaper attacks (pawn, knight, king) and the `between`/`line` geometry
//! tables are plain lookups. Sliding attacks use the classical ray scan:
//! take the full ray from the square, find the first blocker, and clear
//! everything behind it. All tables are built in const context, so there
//! is no runtime initialization step.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;

// Direction order: N, NE, E, SE, S, SW, W, NW.
const DIR_DELTAS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

const ROOK_DIRS: [usize; 4] = [0, 2, 4, 6];
const BISHOP_DIRS: [usize; 4] = [1, 3, 5, 7];

/// Step one square in a direction, `None` past the board edge.
const fn step(sq: u8, dir: usize) -> Option<u8> {
    let (df, dr) = DIR_DELTAS[dir];
    let file = (sq & 7) as i8 + df;
    let rank = (sq >> 3) as i8 + dr;
    if file >= 0 && file < 8 && rank >= 0 && rank < 8 {
        Some((rank * 8 + file) as u8)
    } else {
        None
    }
}

/// Full ray from (exclusive) `sq` in `dir` to the board edge.
const fn build_ray(sq: u8, dir: usize) -> u64 {
    let mut ray = 0u64;
    let mut cur = sq;
    while let Some(next) = step(cur, dir) {
        ray |= 1u64 << next;
        cur = next;
    }
    ray
}

const RAYS: [[u64; 64]; 8] = {
    let mut rays = [[0u64; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let mut sq = 0;
        while sq < 64 {
            rays[dir][sq as usize] = build_ray(sq, dir);
            sq += 1;
        }
        dir += 1;
    }
    rays
};

static KNIGHT: [u64; 64] = {
    const JUMPS: [(i8, i8); 8] = [
        (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
    ];
    let mut table = [0u64; 64];
    let mut sq = 0i8;
    while sq < 64 {
        let mut i = 0;
        while i < 8 {
            let file = (sq & 7) + JUMPS[i].0;
            let rank = (sq >> 3) + JUMPS[i].1;
            if file >= 0 && file < 8 && rank >= 0 && rank < 8 {
                table[sq as usize] |= 1u64 << (rank * 8 + file);
            }
            i += 1;
        }
        sq += 1;
    }
    table
};

static KING: [u64; 64] = {
    let mut table = [0u64; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let mut dir = 0;
        while dir < 8 {
            if let Some(dst) = step(sq, dir) {
                table[sq as usize] |= 1u64 << dst;
            }
            dir += 1;
        }
        sq += 1;
    }
    table
};

/// Pawn capture targets per color; `PAWN[color][sq]` are the squares a
/// pawn of `color` standing on `sq` attacks.
static PAWN: [[u64; 64]; 2] = {
    let mut table = [[0u64; 64]; 2];
    let mut sq = 0u8;
    while sq < 64 {
        // White attacks NE/NW, Black attacks SE/SW.
        if let Some(dst) = step(sq, 1) {
            table[0][sq as usize] |= 1u64 << dst;
        }
        if let Some(dst) = step(sq, 7) {
            table[0][sq as usize] |= 1u64 << dst;
        }
        if let Some(dst) = step(sq, 3) {
            table[1][sq as usize] |= 1u64 << dst;
        }
        if let Some(dst) = step(sq, 5) {
            table[1][sq as usize] |= 1u64 << dst;
        }
        sq += 1;
    }
    table
};

/// Squares strictly between two aligned squares (empty when not aligned).
static BETWEEN: [[u64; 64]; 64] = {
    let mut table = [[0u64; 64]; 64];
    let mut from = 0u8;
    while from < 64 {
        let mut dir = 0;
        while dir < 8 {
            let mut path = 0u64;
            let mut cur = from;
            while let Some(next) = step(cur, dir) {
                table[from as usize][next as usize] = path;
                path |= 1u64 << next;
                cur = next;
            }
            dir += 1;
        }
        from += 1;
    }
    table
};

/// The full line (edge to edge, both endpoints included) through two
/// aligned squares; empty when not aligned.
static LINE: [[u64; 64]; 64] = {
    let mut table = [[0u64; 64]; 64];
    let mut from = 0u8;
    while from < 64 {
        let mut dir = 0;
        while dir < 8 {
            let opposite = (dir + 4) % 8;
            let line = RAYS[dir][from as usize]
                | RAYS[opposite][from as usize]
                | (1u64 << from);
            let mut cur = from;
            while let Some(next) = step(cur, dir) {
                table[from as usize][next as usize] = line;
                cur = next;
            }
            dir += 1;
        }
        from += 1;
    }
    table
};

#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard::new(PAWN[color.index()][sq.index()])
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard::new(KNIGHT[sq.index()])
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    Bitboard::new(KING[sq.index()])
}

/// Sliding attack along one direction, cut at the first blocker.
#[inline]
fn ray_attack(sq: Square, dir: usize, occupied: Bitboard) -> Bitboard {
    let ray = Bitboard::new(RAYS[dir][sq.index()]);
    let blockers = ray & occupied;
    // Directions 0..4 (N, NE, E, SE with positive index delta for N/NE/E)
    // scan from the low end; the rest from the high end.
    let first = if matches!(dir, 0 | 1 | 2) || (dir == 7) {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match first {
        Some(blocker) => ray & !Bitboard::new(RAYS[dir][blocker.index()]),
        None => ray,
    }
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for dir in BISHOP_DIRS {
        attacks |= ray_attack(sq, dir, occupied);
    }
    attacks
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for dir in ROOK_DIRS {
        attacks |= ray_attack(sq, dir, occupied);
    }
    attacks
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Squares strictly between `a` and `b` (empty when not on a common ray).
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    Bitboard::new(BETWEEN[a.index()][b.index()])
}

/// The full board-edge-to-edge line through `a` and `b`, or empty.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    Bitboard::new(LINE[a.index()][b.index()])
}

/// `true` if `a`, `b` and `c` share a rank, file or diagonal.
#[inline]
pub fn aligned(a: Square, b: Square, c: Square) -> bool {
    line(a, b).contains(c)
}
