//! Lazy SMP thread pool for parallel search.
//!
//! All threads run the same iterative deepening over one shared
//! transposition table; coordination happens entirely through the
//! table and the shared stop flag. Helpers start one ply apart so the
//! threads explore different parts of the tree early on.

use std::sync::atomic::{AtomicU64, Ordering};

use rampart_core::Board;
use tracing::debug;

use crate::search::control::SearchControl;
use crate::search::negamax::SearchContext;
use crate::search::tt::TranspositionTable;
use crate::search::{Limits, SearchInfo, SearchResult, iterate};
use crate::tb::Tablebase;

/// Lazy SMP thread pool; owns the shared transposition table.
pub struct ThreadPool {
    tt: TranspositionTable,
    num_threads: usize,
}

impl ThreadPool {
    /// Create a pool with a `hash_mb` MB transposition table and one
    /// search thread.
    pub fn new(hash_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
            num_threads: 1,
        }
    }

    /// Set the number of search threads.
    pub fn set_num_threads(&mut self, n: usize) {
        self.num_threads = n.max(1);
    }

    /// Resize the transposition table, discarding its contents.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Clear the transposition table, preserving the allocation.
    pub fn clear_tt(&self) {
        self.tt.clear();
    }

    /// Permille of the transposition table in use.
    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }

    /// Run a search across all configured threads.
    ///
    /// Thread 0 runs on the calling thread and drives `on_info`;
    /// helpers search silently and contribute through the table.
    /// `history` holds the hashes of every position before `board`.
    /// `std::thread::scope` joins the helpers before this returns, so
    /// the table needs no `Arc`.
    pub fn search<F>(
        &self,
        board: &Board,
        limits: &Limits,
        control: &SearchControl,
        tb: &dyn Tablebase,
        history: &[u64],
        mut on_info: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        self.tt.new_generation();

        if self.num_threads <= 1 {
            let mut ctx = SearchContext::new(&self.tt, tb, control, history);
            let mut callback = |info: &SearchInfo| on_info(info);
            return iterate(board, limits, &mut ctx, true, 1, Some(&mut callback));
        }

        // One counter per thread; each thread stores its final node
        // count so the coordinator can report a pool-wide total.
        let node_counters: Vec<AtomicU64> =
            (0..self.num_threads).map(|_| AtomicU64::new(0)).collect();
        let mut helper_results: Vec<Option<SearchResult>> = Vec::new();
        let mut main_result = None;

        std::thread::scope(|s| {
            let handles: Vec<_> = node_counters
                .iter()
                .enumerate()
                .skip(1)
                .map(|(thread_id, counter)| {
                    let tt = &self.tt;
                    s.spawn(move || {
                        let mut ctx = SearchContext::new(tt, tb, control, history);
                        // Odd helpers skip depth 1 to decorrelate.
                        let start_depth = 1 + (thread_id % 2) as i32;
                        let result = iterate(board, limits, &mut ctx, false, start_depth, None);
                        counter.store(ctx.nodes, Ordering::Relaxed);
                        result
                    })
                })
                .collect();

            let mut ctx = SearchContext::new(&self.tt, tb, control, history);
            let mut callback = |info: &SearchInfo| on_info(info);
            let result = iterate(board, limits, &mut ctx, true, 1, Some(&mut callback));
            node_counters[0].store(ctx.nodes, Ordering::Relaxed);

            // The main thread is done iterating; release the helpers.
            control
                .stop_flag()
                .store(true, Ordering::Release);
            main_result = Some(result);

            helper_results = handles
                .into_iter()
                .map(|h| h.join().ok())
                .collect();
        });

        let mut best = main_result.unwrap_or_else(|| SearchResult::game_over(board, 0));

        // Adopt a helper's line only if it finished strictly deeper, or
        // equally deep with a better score. A panicked helper is logged
        // and its contribution dropped.
        for (thread_id, result) in helper_results.into_iter().enumerate() {
            let Some(result) = result else {
                debug!(thread_id = thread_id + 1, "helper thread panicked");
                continue;
            };
            if result.best_move.is_null() {
                continue;
            }
            let deeper = result.depth > best.depth;
            let better = result.depth == best.depth && result.score > best.score;
            if best.best_move.is_null() || deeper || better {
                let nodes = best.nodes;
                let tb_hits = best.tb_hits;
                best = result;
                best.nodes = nodes;
                best.tb_hits = tb_hits;
            }
        }

        best.nodes = node_counters.iter().map(|c| c.load(Ordering::Relaxed)).sum();
        best
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new(16)
    }
}
