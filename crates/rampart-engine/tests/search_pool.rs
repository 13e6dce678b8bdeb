//! Integration tests for the Lazy SMP thread pool.
//!
//! Covers correctness (legal moves, mate detection), stop-signal
//! propagation across threads, node accounting, and info callbacks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rampart_core::{Board, generate_legal};
use rampart_engine::{Limits, NoTablebase, SearchControl, SearchResult, ThreadPool};

const SCHOLARS_MATE_FEN: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

const SICILIAN_FEN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2";

const RUY_LOPEZ_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";

const ENDGAME_FEN: &str = "8/8/8/3k4/8/3K4/4P3/8 w - - 0 1";

fn depth_limits(depth: i32) -> Limits {
    Limits {
        depth: Some(depth),
        ..Limits::default()
    }
}

fn search_with_threads(board: &Board, depth: i32, threads: usize) -> SearchResult {
    let mut pool = ThreadPool::new(16);
    pool.set_num_threads(threads);
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
    pool.search(board, &depth_limits(depth), &control, &NoTablebase, &[], |_| {})
}

#[test]
fn single_thread_returns_legal_move() {
    let board = Board::starting_position();
    let result = search_with_threads(&board, 4, 1);
    assert!(generate_legal(&board).contains(&result.best_move));
}

#[test]
fn single_thread_finds_mate_in_one() {
    let board: Board = SCHOLARS_MATE_FEN.parse().unwrap();
    let result = search_with_threads(&board, 3, 1);
    assert_eq!(result.best_move.to_string(), "h5f7");
    assert!(
        result.score > 28_000,
        "score {} should indicate mate",
        result.score
    );
}

#[test]
fn multi_thread_returns_legal_move() {
    let board = Board::starting_position();
    for threads in [2, 4] {
        let result = search_with_threads(&board, 4, threads);
        assert!(
            generate_legal(&board).contains(&result.best_move),
            "{threads}-thread search returned an illegal move"
        );
    }
}

#[test]
fn multi_thread_finds_mate_in_one() {
    let board: Board = SCHOLARS_MATE_FEN.parse().unwrap();
    let result = search_with_threads(&board, 3, 4);
    assert_eq!(result.best_move.to_string(), "h5f7");
    assert!(result.score > 28_000);
}

#[test]
fn multi_thread_various_positions() {
    let positions = [
        ("Sicilian Defence", SICILIAN_FEN),
        ("Ruy Lopez", RUY_LOPEZ_FEN),
        ("King and pawn endgame", ENDGAME_FEN),
    ];

    for (name, fen) in positions {
        let board: Board = fen
            .parse()
            .unwrap_or_else(|_| panic!("invalid FEN for {name}"));
        let result = search_with_threads(&board, 4, 4);
        assert!(
            generate_legal(&board).contains(&result.best_move),
            "4-thread search on {name} ({fen}) returned a bad move"
        );
    }
}

#[test]
fn stop_signal_terminates_all_threads() {
    use std::thread;

    let stopped = Arc::new(AtomicBool::new(false));
    let control = Arc::new(SearchControl::new_infinite(Arc::clone(&stopped)));

    let stop_clone = Arc::clone(&stopped);
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stop_clone.store(true, Ordering::Release);
    });

    // Run the search on a worker so the test can time out the join.
    let (tx, rx) = std::sync::mpsc::channel::<SearchResult>();
    let control_clone = Arc::clone(&control);
    thread::spawn(move || {
        let board = Board::starting_position();
        let mut pool = ThreadPool::new(16);
        pool.set_num_threads(4);
        let result = pool.search(
            &board,
            &depth_limits(100),
            &control_clone,
            &NoTablebase,
            &[],
            |_| {},
        );
        let _ = tx.send(result);
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("search with stop signal did not finish within 5 seconds");
    assert!(
        result.depth < 100,
        "search should have been stopped early, got depth {}",
        result.depth
    );
}

#[test]
fn pre_set_stop_returns_immediately() {
    let board = Board::starting_position();
    let mut pool = ThreadPool::new(16);
    pool.set_num_threads(4);
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(true)));

    let result = pool.search(
        &board,
        &depth_limits(100),
        &control,
        &NoTablebase,
        &[],
        |_| {},
    );
    assert_eq!(result.depth, 0, "no iteration should complete");
    assert!(
        generate_legal(&board).contains(&result.best_move),
        "even an aborted search must hand back a legal move"
    );
}

#[test]
fn multi_thread_reports_total_nodes() {
    let board = Board::starting_position();

    let single = search_with_threads(&board, 6, 1);
    let quad = search_with_threads(&board, 6, 4);

    assert!(single.nodes > 0);
    assert!(
        quad.nodes >= single.nodes / 2,
        "pool total ({}) should aggregate every thread's nodes",
        quad.nodes
    );
}

#[test]
fn info_callback_fires_once_per_depth() {
    let board = Board::starting_position();
    let mut pool = ThreadPool::new(16);
    pool.set_num_threads(4);
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));

    let mut depths_seen: Vec<i32> = Vec::new();
    pool.search(&board, &depth_limits(3), &control, &NoTablebase, &[], |info| {
        depths_seen.push(info.depth);
    });

    assert_eq!(depths_seen, vec![1, 2, 3]);
}

#[test]
fn repetition_history_is_honored_across_threads() {
    // The knights have already bounced out and back once; searching
    // the repeated position with its history must not crash or return
    // a null move.
    let board = Board::starting_position();
    let mut history = vec![board.hash()];
    let mut current = board;
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = generate_legal(&current)
            .iter()
            .copied()
            .find(|m| m.to_string() == uci)
            .expect("move should be legal");
        current = current.make_move(mv);
        history.push(current.hash());
    }
    history.pop();

    let mut pool = ThreadPool::new(16);
    pool.set_num_threads(2);
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
    let result = pool.search(
        &current,
        &depth_limits(5),
        &control,
        &NoTablebase,
        &history,
        |_| {},
    );
    assert!(generate_legal(&current).contains(&result.best_move));
}
