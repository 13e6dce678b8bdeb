//! Event-driven, multi-threaded UCI engine with pondering support.
//!
//! The main thread runs an event loop fed by two sources: a stdin
//! reader thread and the search worker. Searches run on their own
//! thread and hand the pool back through the channel, so `stop`,
//! `ponderhit`, and `setoption` stay responsive mid-search.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use tracing::{debug, info, warn};

use rampart_core::Board;
use rampart_engine::search::negamax::{MATE_SCORE, MATE_THRESHOLD};
use rampart_engine::{
    Clock, Limits, NoTablebase, SearchControl, SearchInfo, SearchResult, ThreadPool,
    control_from_go,
};

use crate::command::{Command, GoParams, PositionInfo, UciOption, parse_command};
use crate::error::UciError;

/// Knobs adjustable via `setoption`.
struct EngineConfig {
    hash_mb: usize,
    threads: usize,
    multi_pv: usize,
    move_overhead: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            threads: 1,
            multi_pv: 1,
            move_overhead: Duration::from_millis(10),
        }
    }
}

/// Whether the engine is idle, searching, or pondering.
enum EngineState {
    Idle,
    Searching,
    Pondering,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    pool: ThreadPool,
}

/// The UCI engine: current position, search pool, and protocol state.
pub struct UciEngine {
    board: Board,
    history: Vec<u64>,
    pool: Option<ThreadPool>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    control: Option<Arc<SearchControl>>,
    config: EngineConfig,
    pending_clear_tt: bool,
    /// Pending TT resize (MB) to apply once the search thread returns
    /// the pool.
    pending_resize_tt: Option<usize>,
    /// `go infinite` or `go ponder` forbid `bestmove` until the GUI
    /// sends `stop` (or `ponderhit` resolves the ponder).
    hold_until_stopped: bool,
    stop_requested: bool,
    /// Result of a search that finished while `bestmove` was held.
    held_result: Option<SearchResult>,
}

impl UciEngine {
    /// Create an engine at the starting position.
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            history: Vec::new(),
            pool: Some(ThreadPool::new(16)),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            control: None,
            config: EngineConfig::default(),
            pending_clear_tt: false,
            pending_resize_tt: None,
            hold_until_stopped: false,
            stop_requested: false,
            held_result: None,
        }
    }

    /// Run the UCI event loop until `quit` or stdin closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UCI command");
                        let cmd = parse_command(trimmed);
                        if stdin_tx.send(EngineEvent::UciCommand(cmd)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => self.handle_isready(),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption(option) => self.handle_setoption(option),
                    Command::PonderHit => self.handle_ponderhit(),
                    Command::Stop => self.handle_stop(),
                    Command::Quit => {
                        if !matches!(self.state, EngineState::Idle) {
                            self.handle_stop();
                            // Wait for the search thread to hand the
                            // pool back before tearing down.
                            for ev in &rx {
                                if let EngineEvent::SearchDone(done) = ev {
                                    self.finish_search(done);
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(_) => {}
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
            }
        }

        info!("rampart shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name rampart");
        println!("id author the rampart developers");
        println!("option name Hash type spin default 16 min 1 max 65536");
        println!("option name Threads type spin default 1 min 1 max 256");
        println!("option name MultiPV type spin default 1 min 1 max 256");
        println!("option name Move Overhead type spin default 10 min 0 max 5000");
        println!("option name Ponder type check default false");
        println!("uciok");
    }

    fn handle_isready(&self) {
        println!("readyok");
    }

    fn handle_ucinewgame(&mut self) {
        self.board = Board::starting_position();
        self.history.clear();
        if let Some(ref pool) = self.pool {
            pool.clear_tt();
        } else {
            // Search thread owns the pool; defer until it comes back.
            self.pending_clear_tt = true;
        }
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::Hash(mb) => {
                self.config.hash_mb = mb;
                if let Some(ref mut pool) = self.pool {
                    pool.resize_tt(mb);
                } else {
                    self.pending_resize_tt = Some(mb);
                }
            }
            UciOption::Threads(threads) => {
                self.config.threads = threads;
                if let Some(ref mut pool) = self.pool {
                    pool.set_num_threads(threads);
                }
            }
            UciOption::MultiPv(lines) => self.config.multi_pv = lines,
            UciOption::MoveOverhead(overhead) => self.config.move_overhead = overhead,
            UciOption::Ponder(_) => {
                // Pondering is driven by `go ponder`; nothing to store.
            }
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.board = info.board;
        self.history = info.history;
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while not idle, ignoring");
            return;
        }

        self.stop_flag = Arc::new(AtomicBool::new(false));
        self.stop_requested = false;
        self.hold_until_stopped = params.infinite;
        self.held_result = None;

        let clock = Clock {
            wtime: params.wtime,
            btime: params.btime,
            winc: params.winc,
            binc: params.binc,
            movestogo: params.movestogo,
            movetime: params.movetime,
            infinite: params.infinite,
            ponder: params.ponder,
        };
        let control = Arc::new(
            control_from_go(
                &clock,
                &self.board,
                self.config.move_overhead,
                Arc::clone(&self.stop_flag),
            )
            .with_node_limit(params.nodes),
        );
        let limits = Limits {
            depth: params.depth,
            mate: params.mate,
            multi_pv: self.config.multi_pv,
        };

        let mut pool = self.pool.take().unwrap_or_default();
        pool.set_num_threads(self.config.threads);

        let board = self.board;
        let history = self.history.clone();
        let search_control = Arc::clone(&control);
        let tx = tx.clone();

        std::thread::spawn(move || {
            let result = pool.search(&board, &limits, &search_control, &NoTablebase, &history, print_info);
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, pool }));
        });

        self.state = if params.ponder {
            EngineState::Pondering
        } else {
            EngineState::Searching
        };
        self.control = Some(control);
    }

    fn handle_ponderhit(&mut self) {
        if !matches!(self.state, EngineState::Pondering) {
            warn!("ponderhit received while not pondering, ignoring");
            return;
        }
        if let Some(ref control) = self.control {
            control.activate();
        }
        self.state = EngineState::Searching;
        // The pondered search may already have bottomed out.
        if let Some(result) = self.held_result.take() {
            self.emit_bestmove(&result);
            self.state = EngineState::Idle;
            self.control = None;
        }
    }

    fn handle_stop(&mut self) {
        self.stop_requested = true;
        self.stop_flag.store(true, Ordering::Release);
        if let Some(result) = self.held_result.take() {
            self.emit_bestmove(&result);
            self.state = EngineState::Idle;
            self.control = None;
        }
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut pool = done.pool;

        if let Some(mb) = self.pending_resize_tt.take() {
            // Resize supersedes clear; a fresh allocation starts empty.
            pool.resize_tt(mb);
            self.pending_clear_tt = false;
        } else if self.pending_clear_tt {
            pool.clear_tt();
            self.pending_clear_tt = false;
        }
        self.pool = Some(pool);

        // Under `go infinite` or an unresolved ponder the protocol
        // forbids bestmove until the GUI speaks.
        let must_hold = !self.stop_requested
            && (self.hold_until_stopped || matches!(self.state, EngineState::Pondering));
        if must_hold {
            self.held_result = Some(done.result);
            return;
        }

        self.emit_bestmove(&done.result);
        self.control = None;
        self.state = EngineState::Idle;
    }

    fn emit_bestmove(&self, result: &SearchResult) {
        if result.best_move.is_null() {
            println!("bestmove 0000");
            return;
        }
        match result.ponder_move {
            Some(ponder) if !ponder.is_null() => {
                println!("bestmove {} ponder {}", result.best_move, ponder);
            }
            _ => println!("bestmove {}", result.best_move),
        }
    }
}

/// Format one `info` line from a completed iteration.
fn info_line(info: &SearchInfo) -> String {
    let pv: Vec<String> = info.pv.iter().map(|mv| mv.to_string()).collect();
    let bound = if info.lowerbound {
        " lowerbound"
    } else if info.upperbound {
        " upperbound"
    } else {
        ""
    };
    format!(
        "info depth {} seldepth {} multipv {} score {}{} nodes {} nps {} hashfull {} tbhits {} time {} pv {}",
        info.depth,
        info.seldepth,
        info.multipv,
        format_score(info.score),
        bound,
        info.nodes,
        info.nps,
        info.hashfull,
        info.tb_hits,
        info.time.as_millis(),
        pv.join(" "),
    )
}

fn print_info(info: &SearchInfo) {
    println!("{}", info_line(info));
}

/// `cp` for ordinary scores, `mate n` (moves, signed) for mate scores.
fn format_score(score: i32) -> String {
    if score > MATE_THRESHOLD {
        format!("mate {}", (MATE_SCORE - score + 1) / 2)
    } else if score < -MATE_THRESHOLD {
        format!("mate -{}", (MATE_SCORE + score + 1) / 2)
    } else {
        format!("cp {score}")
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{Move, Square};

    #[test]
    fn centipawn_scores_format_plainly() {
        assert_eq!(format_score(0), "cp 0");
        assert_eq!(format_score(-137), "cp -137");
    }

    #[test]
    fn mate_scores_count_full_moves() {
        // Mate delivered at ply 1: mate in 1 move.
        assert_eq!(format_score(MATE_SCORE - 1), "mate 1");
        // Mate at ply 3: two of our moves remain.
        assert_eq!(format_score(MATE_SCORE - 3), "mate 2");
        // Getting mated at ply 2: one opposing move away.
        assert_eq!(format_score(-(MATE_SCORE - 2)), "mate -1");
    }

    #[test]
    fn info_line_carries_every_field() {
        let info = SearchInfo {
            depth: 9,
            seldepth: 14,
            multipv: 1,
            score: 35,
            upperbound: false,
            lowerbound: false,
            nodes: 120_000,
            nps: 600_000,
            hashfull: 42,
            tb_hits: 0,
            time: Duration::from_millis(200),
            pv: vec![
                Move::new(Square::E2, Square::E4),
                Move::new(Square::E7, Square::E5),
            ],
        };
        assert_eq!(
            info_line(&info),
            "info depth 9 seldepth 14 multipv 1 score cp 35 nodes 120000 nps 600000 \
             hashfull 42 tbhits 0 time 200 pv e2e4 e7e5"
        );

        let failing_high = SearchInfo {
            lowerbound: true,
            ..info
        };
        assert!(info_line(&failing_high).contains("score cp 35 lowerbound nodes"));
    }
}
