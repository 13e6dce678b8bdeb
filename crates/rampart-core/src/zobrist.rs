//! Zobrist keys, generated at compile time from a splitmix64 stream.

use crate::board::Board;
use crate::color::Color;
use crate::piece::Piece;

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// splitmix64 step: returns (output, next state).
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next)
}

/// Skip `n` outputs from the seed and return the state reached.
const fn advance(n: usize) -> u64 {
    let mut state = SEED;
    let mut i = 0;
    while i < n {
        state = splitmix64(state).1;
        i += 1;
    }
    state
}

/// Keys per (colored piece, square); indexed `[Piece::index()][Square::index()]`.
pub(crate) static PIECE_SQUARE: [[u64; 64]; 12] = {
    let mut table = [[0u64; 64]; 12];
    let mut state = SEED;
    let mut piece = 0;
    while piece < 12 {
        let mut sq = 0;
        while sq < 64 {
            let (key, next) = splitmix64(state);
            table[piece][sq] = key;
            state = next;
            sq += 1;
        }
        piece += 1;
    }
    table
};

/// Key XORed in when Black is to move.
pub(crate) static SIDE_TO_MOVE: u64 = splitmix64(advance(768)).0;

/// Keys per castling-rights configuration; indexed by `CastleRights::bits()`.
pub(crate) static CASTLING: [u64; 16] = {
    let mut table = [0u64; 16];
    let mut state = advance(769);
    let mut i = 0;
    while i < 16 {
        let (key, next) = splitmix64(state);
        table[i] = key;
        state = next;
        i += 1;
    }
    table
};

/// Keys per en-passant file; indexed by `Square::file()`.
pub(crate) static EP_FILE: [u64; 8] = {
    let mut table = [0u64; 8];
    let mut state = advance(785);
    let mut i = 0;
    while i < 8 {
        let (key, next) = splitmix64(state);
        table[i] = key;
        state = next;
        i += 1;
    }
    table
};

/// Recompute a position's hash from scratch. Used to seed new boards and
/// to cross-check the incrementally maintained key in tests.
pub(crate) fn hash_from_scratch(board: &Board) -> u64 {
    let mut hash = 0u64;

    for piece in Piece::ALL {
        for sq in board.pieces(piece.kind) & board.side(piece.color) {
            hash ^= PIECE_SQUARE[piece.index()][sq.index()];
        }
    }

    if board.side_to_move() == Color::Black {
        hash ^= SIDE_TO_MOVE;
    }
    hash ^= CASTLING[board.castling().bits() as usize];
    if let Some(ep) = board.en_passant() {
        hash ^= EP_FILE[ep.file() as usize];
    }

    hash
}
