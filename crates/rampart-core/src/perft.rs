//! Perft: exhaustive legal-move tree counts for validating generation.

use crate::board::Board;
use crate::movegen::generate_legal;

/// Count leaf nodes of the legal move tree at `depth`.
///
/// Depth 1 is bulk-counted from the move list without making moves.
pub fn perft(board: &Board, depth: u32) -> u64 {
    match depth {
        0 => 1,
        1 => generate_legal(board).len() as u64,
        _ => generate_legal(board)
            .iter()
            .map(|&mv| perft(&board.make_move(mv), depth - 1))
            .sum(),
    }
}

/// Perft split by root move, sorted by UCI string. The usual tool for
/// pinning down a generation bug against a reference engine.
pub fn divide(board: &Board, depth: u32) -> Vec<(String, u64)> {
    let mut split: Vec<(String, u64)> = generate_legal(board)
        .iter()
        .map(|&mv| {
            let nodes = perft(&board.make_move(mv), depth.saturating_sub(1));
            (mv.to_string(), nodes)
        })
        .collect();
    split.sort();
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Standard reference positions with known node counts per depth.
    const SUITE: &[(&str, &[u64])] = &[
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[20, 400, 8_902, 197_281],
        ),
        (
            // "Kiwipete": castling, pins, en passant, promotions all live.
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[48, 2_039, 97_862, 4_085_603],
        ),
        (
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            &[14, 191, 2_812, 43_238],
        ),
        (
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[6, 264, 9_467, 422_333],
        ),
        (
            // Mirror of the previous position; catches color-asymmetry bugs.
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            &[6, 264, 9_467, 422_333],
        ),
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[44, 1_486, 62_379, 2_103_487],
        ),
        (
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 10 10",
            &[46, 2_079, 89_890, 3_894_594],
        ),
    ];

    #[test]
    fn reference_suite_shallow() {
        for (fen, expected) in SUITE {
            let board: Board = fen.parse().unwrap();
            for (depth, &nodes) in expected.iter().take(3).enumerate() {
                assert_eq!(
                    perft(&board, depth as u32 + 1),
                    nodes,
                    "perft({}) of {fen}",
                    depth + 1
                );
            }
        }
    }

    #[test]
    #[ignore = "several seconds in debug builds"]
    fn reference_suite_deep() {
        for (fen, expected) in SUITE {
            let board: Board = fen.parse().unwrap();
            for (depth, &nodes) in expected.iter().enumerate() {
                assert_eq!(
                    perft(&board, depth as u32 + 1),
                    nodes,
                    "perft({}) of {fen}",
                    depth + 1
                );
            }
        }
    }

    #[test]
    fn depth_zero_is_one_node() {
        assert_eq!(perft(&Board::starting_position(), 0), 1);
    }

    #[test]
    fn divide_sums_to_perft() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let split = divide(&board, 3);
        assert_eq!(split.len(), 48);
        let total: u64 = split.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&board, 3));
        for pair in split.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
    }
}
