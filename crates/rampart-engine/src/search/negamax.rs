//! The negamax tree walk and quiescence search.
//!
//! One node proceeds through: draw and ceiling shortcuts, mate-distance
//! pruning, transposition-table cutoff, tablebase probe, static
//! evaluation, the whole-node prunes (razoring, reverse futility, null
//! move, internal iterative reduction, ProbCut), then the staged move
//! loop with singular and check extensions, per-move pruning, late-move
//! reductions, and principal-variation re-searches. Fail-high bookkeeping
//! and the table store close the node out.

use std::sync::OnceLock;

use rampart_core::{Board, Move, generate_legal};

use crate::eval::evaluate;
use crate::eval::material::piece_value;
use crate::search::control::SearchControl;
use crate::search::heuristics::{Histories, history_bonus};
use crate::search::movepick::{MovePicker, captured_kind, is_capture};
use crate::search::see::see_ge;
use crate::search::stack::{Frame, SearchStack};
use crate::search::tt::{Bound, TranspositionTable, TtHit};
use crate::tb::{Tablebase, Wdl};

/// Larger than any score the search can produce.
pub const INF: i32 = 30_000;
/// Score for delivering mate at the root; mate at ply `n` scores
/// `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 29_000;
/// Scores beyond this magnitude are mate scores.
pub const MATE_THRESHOLD: i32 = 28_000;
/// Tablebase wins sit below every mate score but above every eval.
pub const TB_WIN: i32 = 27_000;
/// Hard ceiling on search depth in plies.
pub const MAX_PLY: usize = 128;

/// Being mated in `ply` halfmoves.
#[inline]
pub const fn mated_in(ply: i32) -> i32 {
    -MATE_SCORE + ply
}

/// A draw score dithered by the node count so lines that shuffle into
/// repetitions are not all scored identically, which would blind the
/// search to the difference between forcing and avoiding them.
#[inline]
fn draw_score(nodes: u64) -> i32 {
    1 - (nodes as i32 & 2)
}

/// Draw by repetition, the 50-move rule, or bare material.
///
/// `history` holds the hashes of every earlier position on the game
/// plus the current search line; one earlier occurrence inside the
/// lookback window counts as a draw, which is sound within a search.
pub(crate) fn is_draw(board: &Board, history: &[u64]) -> bool {
    if board.halfmove_clock() >= 100 {
        // A mating move still mates on the hundredth halfmove.
        if !board.in_check() || !generate_legal(board).is_empty() {
            return true;
        }
    }
    if board.is_insufficient_material() {
        return true;
    }

    let lookback = (board.halfmove_clock() as usize).min(history.len());
    history[history.len() - lookback..]
        .iter()
        .rev()
        .skip(1)
        .step_by(2)
        .any(|&h| h == board.hash())
}

// ── Principal variation bookkeeping ─────────────────────────────────

/// Triangular PV table: the line at each ply is that ply's best move
/// followed by the child's line.
pub(crate) struct PvTable {
    lines: Box<[[Move; MAX_PLY]; MAX_PLY]>,
    lens: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            lines: Box::new([[Move::NULL; MAX_PLY]; MAX_PLY]),
            lens: [0; MAX_PLY],
        }
    }

    pub fn clear_ply(&mut self, ply: i32) {
        if (ply as usize) < MAX_PLY {
            self.lens[ply as usize] = 0;
        }
    }

    /// Record `mv` as best at `ply`, appending the line found below it.
    pub fn update(&mut self, ply: i32, mv: Move) {
        let ply = ply as usize;
        if ply >= MAX_PLY {
            return;
        }
        let child_len = if ply + 1 < MAX_PLY {
            self.lens[ply + 1].min(MAX_PLY - ply - 1)
        } else {
            0
        };
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        head[ply][0] = mv;
        head[ply][1..=child_len].copy_from_slice(&tail[0][..child_len]);
        self.lens[ply] = child_len + 1;
    }

    pub fn root_line(&self) -> &[Move] {
        &self.lines[0][..self.lens[0]]
    }
}

// ── Per-thread search state ─────────────────────────────────────────

/// Everything one search thread owns, plus references to the shared
/// table, prober, and control.
pub(crate) struct SearchContext<'a> {
    pub tt: &'a TranspositionTable,
    pub tb: &'a dyn Tablebase,
    pub control: &'a SearchControl,
    pub nodes: u64,
    pub seldepth: u8,
    pub tb_hits: u64,
    pub pv: PvTable,
    pub stack: SearchStack,
    pub hists: Histories,
    /// Hashes of all positions preceding the one being searched: the
    /// game so far, then the current line. Pushed and popped around
    /// every recursion.
    pub history: Vec<u64>,
    /// Root moves claimed by earlier MultiPV lines.
    pub root_omit: Vec<Move>,
    /// Set while verifying a null-move cutoff to keep the verification
    /// from trying another null move.
    null_guard: bool,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        tt: &'a TranspositionTable,
        tb: &'a dyn Tablebase,
        control: &'a SearchControl,
        game_history: &[u64],
    ) -> Self {
        Self {
            tt,
            tb,
            control,
            nodes: 0,
            seldepth: 0,
            tb_hits: 0,
            pv: PvTable::new(),
            stack: SearchStack::new(),
            hists: Histories::new(),
            history: game_history.to_vec(),
            root_omit: Vec::new(),
            null_guard: false,
        }
    }

    fn stopped(&self) -> bool {
        self.control
            .stop_flag()
            .load(std::sync::atomic::Ordering::Relaxed)
    }
}

// ── Late-move reduction schedule ────────────────────────────────────

/// Base reductions in 1024ths of a ply, by depth and move index.
static REDUCTIONS: OnceLock<[[i32; 64]; 64]> = OnceLock::new();

fn base_reduction(depth: i32, move_count: u32) -> i32 {
    let table = REDUCTIONS.get_or_init(|| {
        let mut t = [[0i32; 64]; 64];
        for d in 1..64 {
            for m in 1..64 {
                t[d][m] = ((0.78 + (d as f64).ln() * (m as f64).ln() / 2.36) * 1024.0) as i32;
            }
        }
        t
    });
    table[depth.clamp(0, 63) as usize][(move_count.min(63)) as usize]
}

// ── Quiescence ──────────────────────────────────────────────────────

/// Search only captures (and evasions while in check) until the
/// position is quiet enough for the static evaluation to stand.
pub(crate) fn qsearch(
    board: &Board,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext,
) -> i32 {
    ctx.nodes += 1;
    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }
    ctx.seldepth = ctx.seldepth.max(ply.min(MAX_PLY as i32) as u8);

    let pv_node = beta - alpha > 1;
    let in_check = board.in_check();

    if is_draw(board, &ctx.history) {
        return draw_score(ctx.nodes);
    }
    if ply >= MAX_PLY as i32 {
        return if in_check { 0 } else { evaluate(board) };
    }

    let hash = board.hash();
    let hit = ctx.tt.probe(hash, ply);
    if !pv_node
        && let Some(h) = hit
    {
        let cutoff = match h.bound {
            Bound::Exact => true,
            Bound::Lower => h.score >= beta,
            Bound::Upper => h.score <= alpha,
            Bound::None => false,
        };
        if cutoff {
            return h.score;
        }
    }

    let mut best = -INF;
    let mut stand_pat = Frame::EVAL_UNSET;
    if !in_check {
        stand_pat = match hit {
            Some(h) if h.eval != TtHit::EVAL_UNSET => h.eval,
            _ => evaluate(board),
        };
        best = stand_pat;
        if best >= beta {
            if !ctx.stopped() {
                ctx.tt
                    .store(hash, 0, best, stand_pat, Move::NULL, Bound::Lower, ply, false);
            }
            return best;
        }
        alpha = alpha.max(best);
    }

    let tt_move = hit.map_or(Move::NULL, |h| h.mv);
    let mut picker = MovePicker::new_quiescence(board, tt_move);
    let mut best_move = Move::NULL;
    let mut move_count = 0u32;

    while let Some(mv) = picker.next(&ctx.hists, false) {
        move_count += 1;

        if !in_check {
            // Futility: even winning this victim outright cannot reach
            // alpha, so don't bother unless it promotes.
            if !mv.is_promotion()
                && let Some(victim) = captured_kind(board, mv)
                && stand_pat + piece_value(victim) + 200 <= alpha
            {
                continue;
            }
            if !see_ge(board, mv, 0) {
                continue;
            }
        }

        let child = board.make_move(mv);
        {
            let frame = ctx.stack.at_mut(ply);
            frame.current_move = mv;
            frame.moved = board.colored_piece_on(mv.origin()).map(|p| (p, mv.dest()));
        }
        ctx.history.push(hash);
        let score = -qsearch(&child, ply + 1, -beta, -alpha, ctx);
        ctx.history.pop();

        if ctx.control.should_stop(ctx.nodes) {
            return 0;
        }

        if score > best {
            best = score;
            if score > alpha {
                best_move = mv;
                if score >= beta {
                    break;
                }
                alpha = score;
            }
        }
    }

    if in_check && move_count == 0 {
        return mated_in(ply);
    }

    if !ctx.stopped() {
        let bound = if best >= beta { Bound::Lower } else { Bound::Upper };
        ctx.tt
            .store(hash, 0, best, stand_pat, best_move, bound, ply, false);
    }
    best
}

// ── Main search ─────────────────────────────────────────────────────

/// Negamax with alpha-beta and the full pruning suite. Returns the
/// score of `board` from the side to move's perspective; the value is
/// meaningless once the stop flag has been raised.
pub(crate) fn search(
    board: &Board,
    mut depth: i32,
    ply: i32,
    mut alpha: i32,
    mut beta: i32,
    cut_node: bool,
    ctx: &mut SearchContext,
) -> i32 {
    if depth <= 0 {
        return qsearch(board, ply, alpha, beta, ctx);
    }

    ctx.nodes += 1;
    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    let root = ply == 0;
    let pv_node = beta - alpha > 1;
    debug_assert!(!root || pv_node, "the root is searched with a full window");

    if pv_node {
        ctx.pv.clear_ply(ply);
        ctx.seldepth = ctx.seldepth.max(ply.min(MAX_PLY as i32) as u8);
    }

    if !root {
        if is_draw(board, &ctx.history) {
            return draw_score(ctx.nodes);
        }
        if ply >= MAX_PLY as i32 {
            return if board.in_check() { 0 } else { evaluate(board) };
        }

        // Mate-distance pruning: a mate further away than one already
        // found cannot change the root choice.
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(MATE_SCORE - ply - 1);
        if alpha >= beta {
            return alpha;
        }
    }

    let in_check = board.in_check();
    let us = board.side_to_move();
    let hash = board.hash();
    let excluded = ctx.stack.at(ply).excluded;

    {
        let frame = ctx.stack.at_mut(ply);
        frame.in_check = in_check;
        frame.move_count = 0;
        frame.current_move = Move::NULL;
        frame.moved = None;
    }
    {
        let ahead = ctx.stack.at_mut(ply + 2);
        ahead.killers = [Move::NULL; 2];
        ahead.cutoff_count = 0;
    }

    // 1. Transposition table.
    let hit = if excluded.is_null() {
        ctx.tt.probe(hash, ply)
    } else {
        None
    };
    let tt_move = hit.map_or(Move::NULL, |h| h.mv);
    let tt_pv = pv_node || hit.is_some_and(|h| h.is_pv);
    ctx.stack.at_mut(ply).tt_pv = tt_pv;

    if !pv_node
        && let Some(h) = hit
        && h.depth as i32 >= depth
        && board.halfmove_clock() < 90
    {
        let cutoff = match h.bound {
            Bound::Exact => true,
            Bound::Lower => h.score >= beta,
            Bound::Upper => h.score <= alpha,
            Bound::None => false,
        };
        if cutoff {
            return h.score;
        }
    }

    // 2. Tablebases. Only positions reachable without castling and
    // with a fresh 50-move counter are probed; WDL scores ignore both.
    if !root
        && excluded.is_null()
        && board.piece_count() <= ctx.tb.max_pieces()
        && board.castling().is_empty()
        && board.halfmove_clock() == 0
        && let Some(wdl) = ctx.tb.probe_wdl(board)
    {
        ctx.tb_hits += 1;
        let (score, bound) = match wdl {
            Wdl::Win => (TB_WIN - ply, Bound::Lower),
            Wdl::Loss => (-TB_WIN + ply, Bound::Upper),
            Wdl::Draw => (draw_score(ctx.nodes), Bound::Exact),
        };
        let decisive = match bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
            Bound::None => false,
        };
        if decisive {
            ctx.tt.store(
                hash,
                depth as u8,
                score,
                TtHit::EVAL_UNSET,
                Move::NULL,
                bound,
                ply,
                tt_pv,
            );
            return score;
        }
    }

    // 3. Static evaluation and the improving flag.
    let static_eval = if in_check {
        Frame::EVAL_UNSET
    } else {
        match hit {
            Some(h) if h.eval != TtHit::EVAL_UNSET => h.eval,
            _ => evaluate(board),
        }
    };
    ctx.stack.at_mut(ply).static_eval = static_eval;

    let improving = !in_check && {
        let two_ago = ctx.stack.at(ply - 2).static_eval;
        let four_ago = ctx.stack.at(ply - 4).static_eval;
        if two_ago != Frame::EVAL_UNSET {
            static_eval > two_ago
        } else if four_ago != Frame::EVAL_UNSET {
            static_eval > four_ago
        } else {
            true
        }
    };

    // 4. Whole-node pruning. None of it applies in check, on PV nodes,
    // or under an excluded move.
    if !pv_node && !in_check && excluded.is_null() {
        // Razoring: hopeless nodes drop straight to quiescence.
        if depth <= 3 && static_eval + 250 * depth < alpha {
            let value = qsearch(board, ply, alpha - 1, alpha, ctx);
            if value < alpha {
                return value;
            }
        }

        // Reverse futility: a comfortable static margin over beta at
        // shallow depth fails high without searching.
        if depth <= 8
            && static_eval.abs() < MATE_THRESHOLD
            && static_eval - 70 * (depth - i32::from(improving)) >= beta
        {
            return static_eval;
        }

        // Null move: hand the opponent a free shot; surviving it at
        // reduced depth fails high. Verified at high depth to protect
        // zugzwang-heavy endings alongside the non-pawn-material gate.
        if !ctx.null_guard
            && static_eval >= beta
            && depth >= 3
            && beta > -MATE_THRESHOLD
            && !ctx.stack.at(ply - 1).current_move.is_null()
            && board.has_non_pawn_material(us)
        {
            let reduction = 3 + depth / 3 + ((static_eval - beta) / 200).min(3);
            {
                let frame = ctx.stack.at_mut(ply);
                frame.current_move = Move::NULL;
                frame.moved = None;
            }
            let child = board.make_null_move();
            ctx.history.push(hash);
            let mut score = -search(
                &child,
                depth - 1 - reduction,
                ply + 1,
                -beta,
                -beta + 1,
                !cut_node,
                ctx,
            );
            ctx.history.pop();

            if score >= beta {
                if score >= MATE_THRESHOLD {
                    score = beta;
                }
                if depth < 12 {
                    return score;
                }
                ctx.null_guard = true;
                let verified = search(board, depth - 1 - reduction, ply, beta - 1, beta, false, ctx);
                ctx.null_guard = false;
                if verified >= beta {
                    return score;
                }
            }
        }
    }

    // 5. Internal iterative reduction: a deep node with no hash move
    // will be re-visited cheaper once the shallower search seeds one.
    if depth >= 8 && tt_move.is_null() && (pv_node || cut_node) {
        depth -= 1;
    }

    // 6. ProbCut: if a good capture beats beta by a margin at reduced
    // depth, the full-depth result will almost surely beat beta too.
    let probcut_beta = beta + 170;
    if !pv_node
        && !in_check
        && excluded.is_null()
        && depth >= 5
        && beta.abs() < MATE_THRESHOLD
        && !hit.is_some_and(|h| h.depth as i32 >= depth - 3 && h.score < probcut_beta)
    {
        let probcut_tt = if !tt_move.is_null() && is_capture(board, tt_move) {
            tt_move
        } else {
            Move::NULL
        };
        let mut picker = MovePicker::new_quiescence(board, probcut_tt);
        while let Some(mv) = picker.next(&ctx.hists, false) {
            if !see_ge(board, mv, probcut_beta - static_eval) {
                continue;
            }
            {
                let frame = ctx.stack.at_mut(ply);
                frame.current_move = mv;
                frame.moved = board.colored_piece_on(mv.origin()).map(|p| (p, mv.dest()));
            }
            let child = board.make_move(mv);
            ctx.history.push(hash);
            let mut score = -qsearch(&child, ply + 1, -probcut_beta, -probcut_beta + 1, ctx);
            if score >= probcut_beta {
                score = -search(
                    &child,
                    depth - 4,
                    ply + 1,
                    -probcut_beta,
                    -probcut_beta + 1,
                    !cut_node,
                    ctx,
                );
            }
            ctx.history.pop();

            if score >= probcut_beta && !ctx.stopped() {
                ctx.tt.store(
                    hash,
                    (depth - 3) as u8,
                    score,
                    static_eval,
                    mv,
                    Bound::Lower,
                    ply,
                    tt_pv,
                );
                return score;
            }
        }
    }

    // 7. The move loop.
    let cont_keys = [
        ctx.stack.conthist_key(ply, 1),
        ctx.stack.conthist_key(ply, 2),
        ctx.stack.conthist_key(ply, 4),
    ];
    let killers = ctx.stack.at(ply).killers;
    let counter = cont_keys[0].map_or(Move::NULL, |prev| ctx.hists.counters.get(prev));
    let mut picker = MovePicker::new_main(board, tt_move, killers, counter, cont_keys);

    let mut best_score = -INF;
    let mut best_move = Move::NULL;
    let mut move_count = 0u32;
    let mut skip_quiets = false;
    let mut quiets_tried: Vec<Move> = Vec::with_capacity(32);
    let mut captures_tried: Vec<Move> = Vec::with_capacity(16);

    while let Some(mv) = picker.next(&ctx.hists, skip_quiets) {
        if mv == excluded {
            continue;
        }
        if root && ctx.root_omit.contains(&mv) {
            continue;
        }
        move_count += 1;

        let capture = is_capture(board, mv);
        let Some(piece) = board.colored_piece_on(mv.origin()) else {
            debug_assert!(false, "picker yielded a move with an empty origin");
            continue;
        };

        // Per-move pruning at shallow depth, never when a mate score
        // is already on the table.
        if !root && best_score > -MATE_THRESHOLD && board.has_non_pawn_material(us) {
            if !capture && !mv.is_promotion() {
                let late_limit = (3 + depth * depth) / (2 - i32::from(improving));
                if move_count as i32 >= late_limit {
                    skip_quiets = true;
                }
                let cont = ctx.hists.continuation_score(&cont_keys, piece, mv.dest());
                if depth <= 4 && cont < -3_000 * depth {
                    continue;
                }
                if !in_check
                    && depth <= 8
                    && alpha.abs() < MATE_THRESHOLD
                    && static_eval + 120 + 150 * depth <= alpha
                {
                    skip_quiets = true;
                }
                if !see_ge(board, mv, -60 * depth) {
                    continue;
                }
            } else if !see_ge(board, mv, -200 * depth) {
                continue;
            }
        }

        // Singular extension: verify that the hash move is the only
        // move holding its score; extend it if so, and fail high
        // outright when even the rest of the moves beat beta.
        let mut extension = 0;
        if !root
            && depth >= 8
            && mv == tt_move
            && excluded.is_null()
            && ply < (MAX_PLY as i32) - 4
            && let Some(h) = hit
            && matches!(h.bound, Bound::Lower | Bound::Exact)
            && h.depth as i32 >= depth - 3
            && h.score.abs() < MATE_THRESHOLD
        {
            let singular_beta = h.score - 2 * depth;
            ctx.stack.at_mut(ply).excluded = mv;
            let value = search(
                board,
                (depth - 1) / 2,
                ply,
                singular_beta - 1,
                singular_beta,
                cut_node,
                ctx,
            );
            ctx.stack.at_mut(ply).excluded = Move::NULL;

            if value < singular_beta {
                extension = 1;
                if !pv_node
                    && value < singular_beta - 25
                    && ctx.stack.at(ply).double_extensions < 9
                {
                    extension = 2;
                }
            } else if singular_beta >= beta {
                // Multicut: two moves beat beta at reduced depth.
                return singular_beta;
            } else if h.score >= beta {
                extension = -1;
            }
        }

        let child = board.make_move(mv);
        let gives_check = child.in_check();
        if gives_check && extension == 0 && see_ge(board, mv, 0) {
            extension = 1;
        }
        let new_depth = depth - 1 + extension;

        {
            let frame = ctx.stack.at_mut(ply);
            frame.current_move = mv;
            frame.moved = Some((piece, mv.dest()));
            frame.move_count = move_count;
        }
        ctx.stack.at_mut(ply + 1).double_extensions =
            ctx.stack.at(ply).double_extensions + u8::from(extension == 2);

        ctx.history.push(hash);

        let mut score = -INF;
        let full_window_needed;
        if !pv_node || move_count > 1 {
            if depth >= 2 && move_count > 1 + u32::from(root) {
                let mut r = base_reduction(depth, move_count);
                if cut_node {
                    r += 1024;
                }
                if !improving {
                    r += 512;
                }
                if tt_pv {
                    r -= 1024;
                }
                if ctx.stack.at(ply + 1).cutoff_count > 3 {
                    r += 1024;
                }
                if !capture {
                    let hist = ctx.hists.main.get(us, mv)
                        + ctx.hists.continuation_score(&cont_keys, piece, mv.dest());
                    r -= hist * 1024 / 8_000;
                }
                let r = (r / 1024).clamp(0, (new_depth - 1).max(0));

                score = -search(&child, new_depth - r, ply + 1, -alpha - 1, -alpha, true, ctx);
                if score > alpha && r > 0 {
                    score = -search(
                        &child,
                        new_depth,
                        ply + 1,
                        -alpha - 1,
                        -alpha,
                        !cut_node,
                        ctx,
                    );
                }
            } else {
                score = -search(
                    &child,
                    new_depth,
                    ply + 1,
                    -alpha - 1,
                    -alpha,
                    !cut_node,
                    ctx,
                );
            }
            full_window_needed = pv_node && score > alpha;
        } else {
            full_window_needed = true;
        }
        if full_window_needed {
            score = -search(&child, new_depth, ply + 1, -beta, -alpha, false, ctx);
        }

        ctx.history.pop();

        if ctx.control.should_stop(ctx.nodes) {
            return 0;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                best_move = mv;
                if pv_node {
                    ctx.pv.update(ply, mv);
                }
                if score >= beta {
                    ctx.stack.at_mut(ply).cutoff_count += 1;
                    break;
                }
                alpha = score;
            }
        }
        if mv != best_move {
            if capture {
                captures_tried.push(mv);
            } else {
                quiets_tried.push(mv);
            }
        }
    }

    // 8. Terminal nodes. A singular verification with no legal move
    // besides the excluded one must not report a stalemate score: the
    // position has moves, this probe just may not use them.
    if move_count == 0 {
        return if !excluded.is_null() {
            alpha
        } else if in_check {
            mated_in(ply)
        } else {
            0
        };
    }

    // 9. Ordering statistics on a fail-high.
    if best_score >= beta {
        update_stats(
            ctx,
            board,
            ply,
            depth,
            best_move,
            &quiets_tried,
            &captures_tried,
        );
    }

    // 10. Store, unless this search is being abandoned or excluded.
    if excluded.is_null() && !ctx.stopped() {
        let bound = if best_score >= beta {
            Bound::Lower
        } else if pv_node && !best_move.is_null() {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt.store(
            hash,
            depth.max(0) as u8,
            best_score,
            static_eval,
            best_move,
            bound,
            ply,
            tt_pv,
        );
    }

    best_score
}

/// Reward the cutoff move and punish everything tried before it, with
/// continuation-history updates along the 1/2/4/6-ply chains.
fn update_stats(
    ctx: &mut SearchContext,
    board: &Board,
    ply: i32,
    depth: i32,
    best_move: Move,
    quiets_tried: &[Move],
    captures_tried: &[Move],
) {
    let bonus = history_bonus(depth);
    let us = board.side_to_move();
    let chain: Vec<(i32, _)> = [1, 2, 4, 6]
        .iter()
        .filter_map(|&back| ctx.stack.conthist_key(ply, back).map(|k| (back, k)))
        .collect();

    if let Some(victim) = captured_kind(board, best_move) {
        if let Some(piece) = board.colored_piece_on(best_move.origin()) {
            ctx.hists
                .capture
                .update(piece, best_move.dest(), victim, bonus);
        }
    } else {
        ctx.stack.at_mut(ply).store_killer(best_move);
        if let Some(prev) = ctx.stack.conthist_key(ply, 1) {
            ctx.hists.counters.store(prev, best_move);
        }
        ctx.hists.main.update(us, best_move, bonus);
        if let Some(piece) = board.colored_piece_on(best_move.origin()) {
            for &(_, key) in &chain {
                ctx.hists
                    .continuation
                    .update(key, piece, best_move.dest(), bonus);
            }
        }

        for &quiet in quiets_tried {
            ctx.hists.main.update(us, quiet, -bonus);
            if let Some(piece) = board.colored_piece_on(quiet.origin()) {
                for &(_, key) in &chain {
                    ctx.hists
                        .continuation
                        .update(key, piece, quiet.dest(), -bonus);
                }
            }
        }
    }

    for &cap in captures_tried {
        if let (Some(piece), Some(victim)) =
            (board.colored_piece_on(cap.origin()), captured_kind(board, cap))
        {
            ctx.hists.capture.update(piece, cap.dest(), victim, -bonus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_order_by_distance() {
        assert!(mated_in(2) < mated_in(4));
        assert!(mated_in(2) < -MATE_THRESHOLD);
        assert!(TB_WIN < MATE_THRESHOLD);
    }

    #[test]
    fn draw_dither_is_plus_minus_one() {
        for nodes in 0..8u64 {
            assert!(matches!(draw_score(nodes), -1 | 1));
        }
    }

    #[test]
    fn fifty_move_rule_draws() {
        let board: Board = "4k3/8/8/8/8/8/3R4/4K3 b - - 100 80".parse().unwrap();
        assert!(is_draw(&board, &[]));
    }

    #[test]
    fn mate_on_the_hundredth_halfmove_is_not_a_draw() {
        // Back-rank mate delivered exactly as the counter reaches 100.
        let board: Board = "6k1/5ppp/8/8/8/8/8/4R1K1 b - - 100 90".parse().unwrap();
        let mated: Board = "4R1k1/5ppp/8/8/8/8/8/6K1 b - - 101 90".parse().unwrap();
        assert!(is_draw(&board, &[]), "checkless position is a draw at 100");
        assert!(!is_draw(&mated, &[]), "checkmate trumps the 50-move rule");
    }

    #[test]
    fn repetition_detected_within_lookback() {
        let board = Board::starting_position();
        let b1 = board.make_move(Move::new(rampart_core::Square::G1, rampart_core::Square::F3));
        let b2 = b1.make_move(Move::new(rampart_core::Square::G8, rampart_core::Square::F6));
        let b3 = b2.make_move(Move::new(rampart_core::Square::F3, rampart_core::Square::G1));
        let b4 = b3.make_move(Move::new(rampart_core::Square::F6, rampart_core::Square::G8));
        assert_eq!(b4.hash(), board.hash());

        let history = vec![board.hash(), b1.hash(), b2.hash(), b3.hash()];
        assert!(is_draw(&b4, &history));
        assert!(!is_draw(&b2, &[board.hash(), b1.hash()]));
    }

    #[test]
    fn bare_kings_draw() {
        let board: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(is_draw(&board, &[]));
    }

    #[test]
    fn pv_table_concatenates_child_lines() {
        let mut pv = PvTable::new();
        let reply = Move::new(rampart_core::Square::E7, rampart_core::Square::E5);
        let first = Move::new(rampart_core::Square::E2, rampart_core::Square::E4);

        pv.update(1, reply);
        pv.update(0, first);
        assert_eq!(pv.root_line(), &[first, reply]);

        pv.clear_ply(1);
        pv.update(0, first);
        assert_eq!(pv.root_line(), &[first]);
    }

    #[test]
    fn reductions_grow_with_depth_and_lateness() {
        assert!(base_reduction(20, 5) > base_reduction(4, 5));
        assert!(base_reduction(10, 30) > base_reduction(10, 3));
        assert_eq!(base_reduction(0, 0), 0);
    }
}
