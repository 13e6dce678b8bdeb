//! Time management: turn clock state into search limits.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use rampart_core::{Board, Color};

use crate::eval::phase::game_phase;
use crate::search::control::SearchControl;

/// Clock fields of a `go` command, as reported by the GUI.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub movetime: Option<Duration>,
    pub infinite: bool,
    pub ponder: bool,
}

/// Soft and hard time budgets for one move.
///
/// Without a GUI-provided `moves_to_go` the expected number of moves
/// left comes from the game phase (24 opening, 0 endgame): openings
/// stretch the budget thin and endgames spend freely, on the theory
/// that early moves are bookish and late moves decide the game.
///
/// | Condition | mtg at phase 24 | at 12 | at 0 |
/// |-----------|-----------------|-------|------|
/// | increment | 35              | 25    | 15   |
/// | sudden death | 40           | 29    | 18   |
///
/// Increment games add three quarters of the increment to the soft
/// budget and cap the hard budget at 25% of the remaining clock;
/// sudden death caps at 12%. The hard budget never exceeds 3.0x
/// (with increment) or 2.5x (without) of the soft budget. `overhead`
/// is subtracted from the clock up front to absorb GUI and transport
/// latency.
pub fn compute_limits(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
    phase: i32,
    overhead: Duration,
) -> (Duration, Duration) {
    let remaining_ms = remaining.as_millis() as f64;
    let overhead_ms = overhead.as_millis() as f64;

    if remaining_ms < overhead_ms {
        let floor = Duration::from_millis(1);
        return (floor, floor);
    }

    let usable = (remaining_ms - overhead_ms).max(1.0);
    let inc_ms = increment.as_millis() as f64;
    let has_increment = inc_ms > 0.0;

    let mtg = match moves_to_go {
        Some(x) => x.max(1) as f64,
        None => {
            let (base, scale) = if has_increment { (15, 20) } else { (18, 22) };
            (base + scale * phase / 24) as f64
        }
    };

    let base = usable / mtg;
    let soft = if has_increment {
        base + inc_ms * 0.75
    } else {
        base
    };

    let hard_cap_pct = if has_increment { 0.25 } else { 0.12 };
    let hard_ratio_cap = if has_increment { 3.0 } else { 2.5 };
    let hard = (usable * hard_cap_pct).min(soft * hard_ratio_cap);

    let soft = soft.min(usable).max(1.0);
    let hard = hard.min(usable).max(1.0);

    (
        Duration::from_millis(soft as u64),
        Duration::from_millis(hard as u64),
    )
}

/// Build a [`SearchControl`] from a `go` command's clock fields.
///
/// Precedence: `infinite` beats `movetime` beats the game clock; a
/// bare `go` (or `go depth N`) searches without time limits. `ponder`
/// arms the computed limits but holds the clock until `ponderhit`.
pub fn control_from_go(
    clock: &Clock,
    board: &Board,
    overhead: Duration,
    stopped: Arc<AtomicBool>,
) -> SearchControl {
    if clock.infinite && !clock.ponder {
        return SearchControl::new_infinite(stopped);
    }

    if let Some(movetime) = clock.movetime {
        return if clock.ponder {
            SearchControl::new_ponder(stopped, movetime, movetime)
        } else {
            SearchControl::new_timed(stopped, movetime, movetime)
        };
    }

    let (remaining, increment) = match board.side_to_move() {
        Color::White => (clock.wtime, clock.winc),
        Color::Black => (clock.btime, clock.binc),
    };

    if let Some(remaining) = remaining {
        let increment = increment.unwrap_or(Duration::ZERO);
        let phase = game_phase(board);
        let (soft, hard) = compute_limits(remaining, increment, clock.movestogo, phase, overhead);
        return if clock.ponder {
            SearchControl::new_ponder(stopped, soft, hard)
        } else {
            SearchControl::new_timed(stopped, soft, hard)
        };
    }

    SearchControl::new_infinite(stopped)
}
