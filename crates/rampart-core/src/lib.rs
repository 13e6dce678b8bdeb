//! Board representation, legal move generation, and game rules.

mod attacks;
mod bitboard;
mod board;
mod castling;
mod chess_move;
mod color;
mod error;
mod fen;
mod make_move;
mod piece;
mod square;
mod zobrist;

pub mod movegen;
pub mod perft;

pub use attacks::{
    aligned, between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks,
    queen_attacks, rook_attacks,
};
pub use bitboard::Bitboard;
pub use board::Board;
pub use castling::CastleRights;
pub use chess_move::{Move, MoveKind, Promotion};
pub use color::Color;
pub use error::{FenError, ParseSquareError};
pub use fen::STARTING_FEN;
pub use movegen::{GenCategory, MAX_MOVES, MoveList, generate, generate_legal};
pub use piece::{Piece, PieceKind};
pub use square::Square;
