//! Iterative-deepening search.
//!
//! The tree walk lives in [`negamax`]; this module drives it depth by
//! depth with aspiration windows, tracks the root moves (for MultiPV
//! and for tablebase move ranking), and feeds best-move stability back
//! into the time manager. The public entry point is
//! [`pool::ThreadPool`], which runs one driver per thread over a shared
//! transposition table.

pub mod control;
pub mod heuristics;
pub mod movepick;
pub mod negamax;
pub mod pool;
pub mod see;
pub mod stack;
pub mod tt;

use std::time::Duration;

use rampart_core::{Board, Move, generate_legal};
use tracing::debug;

use negamax::{INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, SearchContext, mated_in, search};

use crate::tb::Wdl;

/// Caller-imposed bounds on a search, beyond the clock.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Stop after completing this iteration depth.
    pub depth: Option<i32>,
    /// Stop once a mate in at most this many moves is proven.
    pub mate: Option<u32>,
    /// Number of principal variations to report.
    pub multi_pv: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            depth: None,
            mate: None,
            multi_pv: 1,
        }
    }
}

/// One move at the root and everything learned about it so far.
#[derive(Debug, Clone)]
pub struct RootMove {
    pub mv: Move,
    /// Score from the most recent iteration that searched this move.
    pub score: i32,
    /// Score from the iteration before that.
    pub previous_score: i32,
    /// Running average across iterations; centers the aspiration window.
    pub average_score: i32,
    pub pv: Vec<Move>,
    /// Tablebase ranking: 1 proven win, 0 unknown or draw, -1 proven
    /// loss. Moves ranked below the best rank are never searched.
    pub tb_rank: i32,
    /// The last aspiration window failed low: `score` is only an
    /// upper bound.
    pub score_upperbound: bool,
    /// The last aspiration window failed high: `score` is only a
    /// lower bound.
    pub score_lowerbound: bool,
}

impl RootMove {
    fn new(mv: Move) -> Self {
        Self {
            mv,
            score: -INF,
            previous_score: -INF,
            average_score: -INF,
            pv: vec![mv],
            tb_rank: 0,
            score_upperbound: false,
            score_lowerbound: false,
        }
    }
}

/// Snapshot emitted after each completed iteration, one per PV line.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: i32,
    pub seldepth: u8,
    /// 1-based PV index; always 1 unless MultiPV is raised.
    pub multipv: usize,
    pub score: i32,
    /// Whether `score` is only a bound (mid-aspiration fail report).
    pub upperbound: bool,
    pub lowerbound: bool,
    pub nodes: u64,
    pub nps: u64,
    /// Permille of the transposition table holding current entries.
    pub hashfull: u32,
    pub tb_hits: u64,
    pub time: Duration,
    pub pv: Vec<Move>,
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move at the highest completed depth; null only when the
    /// root position is already over.
    pub best_move: Move,
    /// Expected reply, for pondering.
    pub ponder_move: Option<Move>,
    pub pv: Vec<Move>,
    /// Score in centipawns from the side to move's perspective.
    pub score: i32,
    pub nodes: u64,
    pub tb_hits: u64,
    /// Depth of the last completed iteration.
    pub depth: i32,
}

impl SearchResult {
    fn game_over(board: &Board, nodes: u64) -> Self {
        Self {
            best_move: Move::NULL,
            ponder_move: None,
            pv: Vec::new(),
            score: if board.in_check() { mated_in(0) } else { 0 },
            nodes,
            tb_hits: 0,
            depth: 0,
        }
    }
}

/// Tracks best-move stability across iterations for time management.
///
/// A changing best move or a dropping score means the position is not
/// yet understood and earns more time; a long stable streak means the
/// remaining budget is better banked for later moves.
struct StabilityTracker {
    last_move: Move,
    last_score: i32,
    stable_streak: u32,
}

impl StabilityTracker {
    fn new() -> Self {
        Self {
            last_move: Move::NULL,
            last_score: 0,
            stable_streak: 0,
        }
    }

    /// Update with the latest iteration and return a soft-limit scale
    /// in hundredths.
    fn update(&mut self, best_move: Move, score: i32) -> i32 {
        let scale;

        if self.last_move.is_null() {
            scale = 100;
        } else {
            let score_drop = self.last_score - score;

            if score_drop > 100 {
                self.stable_streak = 0;
                scale = 250;
            } else if score_drop > 50 {
                self.stable_streak = 0;
                scale = 180;
            } else if best_move == self.last_move {
                self.stable_streak += 1;
                scale = if self.stable_streak >= 3 { 60 } else { 100 };
            } else {
                self.stable_streak = 0;
                scale = 100;
            }
        }

        self.last_move = best_move;
        self.last_score = score;
        scale
    }
}

/// Rank the root moves through the tablebases.
///
/// Returns the moves that must be withheld from the search: everything
/// ranked strictly below the best available rank. With no tablebase (or
/// too many pieces) every rank stays 0 and nothing is withheld.
fn rank_root_moves(board: &Board, root_moves: &mut [RootMove], ctx: &mut SearchContext) -> Vec<Move> {
    if board.piece_count() > ctx.tb.max_pieces() || !board.castling().is_empty() {
        return Vec::new();
    }

    let mut probed = false;
    for rm in root_moves.iter_mut() {
        let child = board.make_move(rm.mv);
        if child.halfmove_clock() != 0 {
            continue;
        }
        // The child's WDL is from the opponent's perspective.
        if let Some(wdl) = ctx.tb.probe_wdl(&child) {
            ctx.tb_hits += 1;
            probed = true;
            rm.tb_rank = match wdl {
                Wdl::Loss => 1,
                Wdl::Draw => 0,
                Wdl::Win => -1,
            };
        }
    }
    if !probed {
        return Vec::new();
    }

    let best_rank = root_moves.iter().map(|rm| rm.tb_rank).max().unwrap_or(0);
    root_moves
        .iter()
        .filter(|rm| rm.tb_rank < best_rank)
        .map(|rm| rm.mv)
        .collect()
}

/// Build the mid-aspiration progress report for one root move.
fn bound_info(
    rm: &RootMove,
    score: i32,
    depth: i32,
    pv_index: usize,
    ctx: &SearchContext<'_>,
) -> SearchInfo {
    let time = ctx.control.elapsed();
    let millis = time.as_millis().max(1) as u64;
    SearchInfo {
        depth,
        seldepth: ctx.seldepth,
        multipv: pv_index + 1,
        score,
        upperbound: rm.score_upperbound,
        lowerbound: rm.score_lowerbound,
        nodes: ctx.nodes,
        nps: ctx.nodes * 1000 / millis,
        hashfull: ctx.tt.hashfull(),
        tb_hits: ctx.tb_hits,
        time,
        pv: rm.pv.clone(),
    }
}

/// Run iterative deepening on one thread.
///
/// `on_info` fires after every completed iteration, once per PV line,
/// in MultiPV order. Only the main thread drives the soft time limit;
/// helpers iterate until the shared stop flag ends them, starting at
/// `start_depth` so they diverge from the main line.
pub(crate) fn iterate(
    board: &Board,
    limits: &Limits,
    ctx: &mut SearchContext<'_>,
    main_thread: bool,
    start_depth: i32,
    mut on_info: Option<&mut dyn FnMut(&SearchInfo)>,
) -> SearchResult {
    let legal = generate_legal(board);
    if legal.is_empty() {
        return SearchResult::game_over(board, ctx.nodes);
    }

    let mut root_moves: Vec<RootMove> = legal.iter().map(|&mv| RootMove::new(mv)).collect();
    let tb_withheld = rank_root_moves(board, &mut root_moves, ctx);

    let searchable = root_moves.len() - tb_withheld.len();
    let multi_pv = limits.multi_pv.clamp(1, searchable.max(1));
    let max_depth = limits
        .depth
        .unwrap_or(MAX_PLY as i32 - 1)
        .clamp(1, MAX_PLY as i32 - 1);

    let mut stability = StabilityTracker::new();
    let mut result = SearchResult {
        best_move: root_moves[0].mv,
        ponder_move: None,
        pv: vec![root_moves[0].mv],
        score: -INF,
        nodes: ctx.nodes,
        tb_hits: ctx.tb_hits,
        depth: 0,
    };

    'deepening: for depth in start_depth.clamp(1, max_depth)..=max_depth {
        for rm in &mut root_moves {
            rm.previous_score = rm.score;
        }

        for pv_index in 0..multi_pv {
            ctx.root_omit.clear();
            ctx.root_omit.extend_from_slice(&tb_withheld);
            ctx.root_omit
                .extend(root_moves[..pv_index].iter().map(|rm| rm.mv));
            ctx.seldepth = 0;

            // Aspiration: once a few iterations have settled the score,
            // search inside a narrow window around it and widen
            // geometrically on failure.
            let prior = root_moves[pv_index].average_score;
            let mut delta = 20;
            let (mut alpha, mut beta) = if depth >= 4 && prior.abs() < MATE_THRESHOLD {
                ((prior - delta).max(-INF), (prior + delta).min(INF))
            } else {
                (-INF, INF)
            };

            let score = loop {
                let score = search(board, depth, 0, alpha, beta, false, ctx);
                if ctx.control.should_stop(ctx.nodes) {
                    break 'deepening;
                }
                if score <= alpha {
                    // Fail low: pull beta toward the window so the
                    // re-search stays cheap, then drop alpha.
                    beta = (alpha + beta) / 2;
                    alpha = (score - delta).max(-INF);
                    root_moves[pv_index].score_upperbound = true;
                    root_moves[pv_index].score_lowerbound = false;
                } else if score >= beta {
                    beta = (score + delta).min(INF);
                    root_moves[pv_index].score_lowerbound = true;
                    root_moves[pv_index].score_upperbound = false;
                } else {
                    break score;
                }
                // A long re-search deserves a progress report so the
                // GUI sees the bound move.
                if let Some(on_info) = on_info.as_deref_mut()
                    && ctx.control.elapsed().as_secs() >= 3
                {
                    let rm = &root_moves[pv_index];
                    on_info(&bound_info(rm, score, depth, pv_index, ctx));
                }
                delta += delta / 2;
            };
            {
                let rm = &mut root_moves[pv_index];
                rm.score_upperbound = false;
                rm.score_lowerbound = false;
            }

            // Commit the resolved line to its root move and float that
            // move to the front of the current MultiPV band.
            let line = ctx.pv.root_line().to_vec();
            let best = line.first().copied().unwrap_or(root_moves[pv_index].mv);
            let found = root_moves
                .iter()
                .position(|rm| rm.mv == best)
                .unwrap_or(pv_index);
            {
                let rm = &mut root_moves[found];
                rm.score = score;
                rm.average_score = if rm.average_score == -INF {
                    score
                } else {
                    (rm.average_score + score) / 2
                };
                if !line.is_empty() {
                    rm.pv = line;
                }
            }
            root_moves[pv_index..=found].rotate_right(1);
        }

        // Keep the searched band ordered by tablebase rank, then score.
        root_moves[..multi_pv]
            .sort_by(|a, b| (b.tb_rank, b.score).cmp(&(a.tb_rank, a.score)));

        let best = &root_moves[0];
        result = SearchResult {
            best_move: best.mv,
            ponder_move: best.pv.get(1).copied(),
            pv: best.pv.clone(),
            score: best.score,
            nodes: ctx.nodes,
            tb_hits: ctx.tb_hits,
            depth,
        };

        if let Some(on_info) = on_info.as_deref_mut() {
            let time = ctx.control.elapsed();
            let millis = time.as_millis().max(1) as u64;
            for (i, rm) in root_moves[..multi_pv].iter().enumerate() {
                on_info(&SearchInfo {
                    depth,
                    seldepth: ctx.seldepth,
                    multipv: i + 1,
                    score: rm.score,
                    upperbound: false,
                    lowerbound: false,
                    nodes: ctx.nodes,
                    nps: ctx.nodes * 1000 / millis,
                    hashfull: ctx.tt.hashfull(),
                    tb_hits: ctx.tb_hits,
                    time,
                    pv: rm.pv.clone(),
                });
            }
        }

        if let Some(mate) = limits.mate
            && result.score >= MATE_SCORE - 2 * mate as i32
        {
            debug!(depth, score = result.score, "mate limit satisfied");
            break;
        }

        if main_thread {
            let scale = stability.update(result.best_move, result.score);
            ctx.control.update_soft_scale(scale);
            if ctx.control.should_stop_iterating() {
                break;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use rampart_core::Square;

    use crate::tb::NoTablebase;
    use super::control::SearchControl;
    use super::tt::TranspositionTable;

    fn run(board: &Board, limits: &Limits, stopped: Arc<AtomicBool>) -> SearchResult {
        let tt = TranspositionTable::new(16);
        let control = SearchControl::new_infinite(stopped);
        let mut ctx = SearchContext::new(&tt, &NoTablebase, &control, &[]);
        iterate(board, limits, &mut ctx, true, 1, None)
    }

    fn run_depth(board: &Board, depth: i32) -> SearchResult {
        let limits = Limits {
            depth: Some(depth),
            ..Limits::default()
        };
        run(board, &limits, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn depth_1_returns_legal_move() {
        let result = run_depth(&Board::starting_position(), 1);
        assert!(!result.best_move.is_null());
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn finds_mate_in_one() {
        // Scholar's mate: Qxf7 ends it.
        let board: Board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse()
            .unwrap();
        let result = run_depth(&board, 4);
        assert_eq!(result.best_move, Move::new(Square::H5, Square::F7));
        assert_eq!(result.score, MATE_SCORE - 1);
    }

    #[test]
    fn stalemate_scores_zero_with_no_move() {
        let board: Board = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert!(!board.in_check());
        let result = run_depth(&board, 3);
        assert!(result.best_move.is_null());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn checkmated_root_reports_mate_score() {
        let board: Board = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let result = run_depth(&board, 3);
        assert!(result.best_move.is_null());
        assert_eq!(result.score, mated_in(0));
    }

    #[test]
    fn preset_stop_flag_still_yields_a_legal_move() {
        let stopped = Arc::new(AtomicBool::new(true));
        let board = Board::starting_position();
        let result = run(
            &board,
            &Limits {
                depth: Some(10),
                ..Limits::default()
            },
            stopped,
        );
        let legal = generate_legal(&board);
        assert!(legal.contains(&result.best_move));
        assert_eq!(result.depth, 0, "no iteration completed");
    }

    #[test]
    fn iteration_callback_reports_increasing_depths() {
        let tt = TranspositionTable::new(16);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = SearchContext::new(&tt, &NoTablebase, &control, &[]);
        let mut depths = Vec::new();
        let mut callback = |info: &SearchInfo| depths.push(info.depth);
        let limits = Limits {
            depth: Some(6),
            ..Limits::default()
        };
        let result = iterate(
            &Board::starting_position(),
            &limits,
            &mut ctx,
            true,
            1,
            Some(&mut callback),
        );
        assert_eq!(depths, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(result.depth, 6);
        assert!(result.nodes > 0);
    }

    #[test]
    fn multipv_reports_distinct_lines() {
        let tt = TranspositionTable::new(16);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = SearchContext::new(&tt, &NoTablebase, &control, &[]);
        let mut seen: Vec<(i32, usize, Move)> = Vec::new();
        let mut callback =
            |info: &SearchInfo| seen.push((info.depth, info.multipv, info.pv[0]));
        let limits = Limits {
            depth: Some(4),
            multi_pv: 3,
            ..Limits::default()
        };
        iterate(
            &Board::starting_position(),
            &limits,
            &mut ctx,
            true,
            1,
            Some(&mut callback),
        );

        for depth in 1..=4 {
            let lines: Vec<Move> = seen
                .iter()
                .filter(|(d, _, _)| *d == depth)
                .map(|&(_, _, mv)| mv)
                .collect();
            assert_eq!(lines.len(), 3, "three lines at depth {depth}");
            for i in 0..lines.len() {
                for j in i + 1..lines.len() {
                    assert_ne!(lines[i], lines[j], "duplicate PV head at depth {depth}");
                }
            }
        }
    }

    #[test]
    fn mate_limit_stops_the_deepening() {
        let board: Board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse()
            .unwrap();
        let limits = Limits {
            depth: Some(30),
            mate: Some(1),
            ..Limits::default()
        };
        let result = run(&board, &limits, Arc::new(AtomicBool::new(false)));
        assert!(result.depth < 30, "search should stop once the mate is proven");
        assert_eq!(result.score, MATE_SCORE - 1);
    }

    #[test]
    fn searches_cleanly_through_a_repeated_position() {
        let board = Board::starting_position();
        let nf3 = Move::new(Square::G1, Square::F3);
        let b1 = board.make_move(nf3);
        let b2 = b1.make_move(Move::new(Square::G8, Square::F6));
        let b3 = b2.make_move(Move::new(Square::F3, Square::G1));
        let b4 = b3.make_move(Move::new(Square::F6, Square::G8));

        let tt = TranspositionTable::new(16);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let history = vec![board.hash(), b1.hash(), b2.hash(), b3.hash()];
        let mut ctx = SearchContext::new(&tt, &NoTablebase, &control, &history);
        let limits = Limits {
            depth: Some(4),
            ..Limits::default()
        };
        // The current position already occurred once; the search must
        // treat any third occurrence down the tree as a draw without
        // tripping over the game history.
        let result = iterate(&b4, &limits, &mut ctx, true, 1, None);
        assert!(!result.best_move.is_null());
    }

    #[test]
    fn stability_tracker_scales() {
        let mut tracker = StabilityTracker::new();
        let mv = Move::new(Square::E2, Square::E4);
        let other = Move::new(Square::D2, Square::D4);

        assert_eq!(tracker.update(mv, 50), 100, "first iteration is neutral");
        assert_eq!(tracker.update(mv, 50), 100);
        assert_eq!(tracker.update(mv, 50), 100);
        assert_eq!(tracker.update(mv, 50), 60, "long stable streak plays fast");
        assert_eq!(tracker.update(other, 45), 100, "move change resets");
        assert_eq!(tracker.update(other, -80), 250, "big score drop slows down");
        assert_eq!(tracker.update(other, -140), 180, "moderate drop slows down");
    }

    #[test]
    fn finds_ladder_mate_in_two() {
        // 1. Rb7 boxes the king onto the back rank, 2. Ra8 mates. The
        // mating move is a quiet check, so the shallow quiet pruning
        // delays it; depth 8 gives the search room to prove the mate.
        let board: Board = "7k/8/8/8/8/8/R7/1R4K1 w - - 0 1".parse().unwrap();
        let result = run_depth(&board, 8);
        assert_eq!(result.score, MATE_SCORE - 3);
        assert!(result.pv.len() >= 3);
    }

    #[test]
    fn aborted_search_visits_few_nodes() {
        let stopped = Arc::new(AtomicBool::new(false));
        let board = Board::starting_position();
        stopped.store(true, Ordering::Release);
        let result = run(
            &board,
            &Limits {
                depth: Some(64),
                ..Limits::default()
            },
            stopped,
        );
        assert!(result.nodes < 10_000, "aborted search must not run long");
    }
}
