//! FEN parsing and serialization.

use std::str::FromStr;

use crate::attacks::pawn_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let mut board = Board {
            pieces: [Bitboard::EMPTY; 6],
            sides: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastleRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        };

        // Piece placement, rank 8 first.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadPlacement(format!(
                "{} ranks, expected 8",
                ranks.len()
            )));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| FenError::BadPlacement(format!("bad piece char {c:?}")))?;
                    if file >= 8 {
                        return Err(FenError::BadPlacement(format!("rank {} overflows", rank + 1)));
                    }
                    let sq = Square::make(file, rank);
                    board.pieces[piece.kind.index()] |= sq.bitboard();
                    board.sides[piece.color.index()] |= sq.bitboard();
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadPlacement(format!(
                    "rank {} has {file} files",
                    rank + 1
                )));
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        board.castling = parse_castling(fields[2])?;

        board.en_passant = match fields[3] {
            "-" => None,
            s => {
                let sq: Square = s
                    .parse()
                    .map_err(|_| FenError::BadEnPassant(s.to_string()))?;
                // Keep the square only when a capture is actually possible,
                // so hashes agree with positions reached move by move.
                let us = board.side_to_move;
                let our_pawns = board.pieces[PieceKind::Pawn.index()] & board.sides[us.index()];
                if (pawn_attacks(!us, sq) & our_pawns).is_nonempty() {
                    Some(sq)
                } else {
                    None
                }
            }
        };

        if let Some(field) = fields.get(4) {
            board.halfmove_clock = field
                .parse()
                .map_err(|_| FenError::BadClock(field.to_string()))?;
        }
        if let Some(field) = fields.get(5) {
            board.fullmove_number = field
                .parse()
                .map_err(|_| FenError::BadClock(field.to_string()))?;
        }

        // Minimal structural checks: exactly one king per side, no pawns
        // on the back ranks.
        for color in [Color::White, Color::Black] {
            let kings = board.pieces[PieceKind::King.index()] & board.sides[color.index()];
            if kings.count() != 1 {
                return Err(FenError::IllegalPosition("each side needs exactly one king"));
            }
        }
        let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
        if (board.pieces[PieceKind::Pawn.index()] & back_ranks).is_nonempty() {
            return Err(FenError::IllegalPosition("pawn on a back rank"));
        }

        board.hash = zobrist::hash_from_scratch(&board);
        Ok(board)
    }
}

fn parse_castling(field: &str) -> Result<CastleRights, FenError> {
    if field == "-" {
        return Ok(CastleRights::NONE);
    }
    let mut rights = CastleRights::NONE;
    for c in field.chars() {
        let flag = match c {
            'K' => CastleRights::WHITE_KING,
            'Q' => CastleRights::WHITE_QUEEN,
            'k' => CastleRights::BLACK_KING,
            'q' => CastleRights::BLACK_QUEEN,
            _ => return Err(FenError::BadCastling(field.to_string())),
        };
        rights = rights.add(flag);
    }
    Ok(rights)
}

impl Board {
    /// Serialize the position back to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::make(file, rank);
                match self.colored_piece_on(sq) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let stm = if self.side_to_move() == Color::White { 'w' } else { 'b' };
        let ep = self
            .en_passant()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{fen} {stm} {} {ep} {} {}",
            self.castling(),
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_fen_roundtrip() {
        let board = Board::starting_position();
        assert_eq!(board.to_fen(), STARTING_FEN);
    }

    #[test]
    fn kiwipete_roundtrip() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn four_field_fen_defaults_clocks() {
        let board: Board = "4k3/8/8/8/8/8/8/4K3 w - -".parse().unwrap();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn spurious_ep_square_dropped() {
        // EP square given but no white pawn can capture there
        let board: Board = "4k3/8/8/3p4/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        assert_eq!(board.en_passant(), None);
    }

    #[test]
    fn rejects_malformed() {
        assert!("".parse::<Board>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3".parse::<Board>().is_err()); // missing fields
        assert!("9k3/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Board>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3 w XX - 0 1".parse::<Board>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3 w - z9 0 1".parse::<Board>().is_err());
        assert!("4k3/8/8/8/8/8/8/8 w - - 0 1".parse::<Board>().is_err()); // no white king
        assert!("Pppp4/8/8/8/8/8/8/k3K3 w - - 0 1".parse::<Board>().is_err()); // pawn on rank 8
    }

    #[test]
    fn black_to_move_parses() {
        let board: Board = "4k3/8/8/8/8/8/8/4K3 b - - 3 42".parse().unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.halfmove_clock(), 3);
        assert_eq!(board.fullmove_number(), 42);
    }
}
