//! Move generation by category.
//!
//! Legality (pins, check evasion, king safety, en-passant discovered
//! checks) is enforced during generation, so every category produces
//! only legal moves and [`GenCategory::Legal`] needs no filtering pass.

mod ctx;
mod king;
mod pawns;
mod pieces;

use std::ops::{Deref, DerefMut};

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;

pub(crate) use self::ctx::GenCtx;

/// Upper bound on moves in any reachable position (the known maximum
/// is 218).
pub const MAX_MOVES: usize = 256;

/// Which class of moves to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenCategory {
    /// Captures, en passant, and queen/knight promotions.
    Captures,
    /// Non-captures, plus rook/bishop under-promotions.
    Quiets,
    /// Everything, for positions not in check.
    NonEvasions,
    /// King moves, blocks and checker captures, for positions in check.
    Evasions,
    /// Quiet moves that give check, direct or discovered.
    QuietChecks,
    /// Evasions when in check, non-evasions otherwise.
    Legal,
}

/// Fixed-capacity move buffer that lives on the stack.
pub struct MoveList {
    buf: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[inline]
    pub fn new() -> MoveList {
        MoveList {
            buf: [Move::NULL; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.buf[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.buf[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.buf[..self.len]
    }
}

impl Default for MoveList {
    fn default() -> MoveList {
        MoveList::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];
    #[inline]
    fn deref(&self) -> &[Move] {
        self.as_slice()
    }
}

impl DerefMut for MoveList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Move] {
        self.as_mut_slice()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Append every legal move of `category` to `list`.
///
/// `Evasions` requires the side to move to be in check; the other
/// concrete categories require it not to be. `Legal` picks for you.
pub fn generate(board: &Board, category: GenCategory, list: &mut MoveList) {
    let want_checks = category == GenCategory::QuietChecks;
    let ctx = GenCtx::new(board, want_checks);

    let category = match category {
        GenCategory::Legal => {
            if ctx.in_check() {
                GenCategory::Evasions
            } else {
                GenCategory::NonEvasions
            }
        }
        other => {
            debug_assert_eq!(
                other == GenCategory::Evasions,
                ctx.in_check(),
                "category {other:?} used while in_check = {}",
                ctx.in_check(),
            );
            other
        }
    };

    // Double check: nothing but a king move can help.
    if ctx.checkers().more_than_one() {
        king::gen_moves(board, &ctx, category, list);
        return;
    }

    let targets = match category {
        GenCategory::Captures => ctx.enemy(),
        GenCategory::Quiets | GenCategory::QuietChecks => !ctx.occupied(),
        GenCategory::NonEvasions | GenCategory::Evasions => !ctx.friendly(),
        GenCategory::Legal => unreachable!(),
    } & ctx.check_mask();

    pawns::gen_moves(board, &ctx, category, targets, list);
    pieces::gen_moves(board, &ctx, category, targets, list);
    king::gen_moves(board, &ctx, category, list);
}

/// All legal moves for the side to move.
pub fn generate_legal(board: &Board) -> MoveList {
    let mut list = MoveList::new();
    generate(board, GenCategory::Legal, &mut list);
    list
}

/// Target mask for king moves, which ignore the check mask.
fn king_targets(ctx: &GenCtx, category: GenCategory) -> Bitboard {
    match category {
        GenCategory::Captures => ctx.enemy(),
        GenCategory::Quiets | GenCategory::QuietChecks => !ctx.occupied(),
        GenCategory::NonEvasions | GenCategory::Evasions => !ctx.friendly(),
        GenCategory::Legal => unreachable!(),
    }
}
