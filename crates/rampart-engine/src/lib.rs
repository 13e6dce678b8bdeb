//! Search and evaluation for rampart.

pub mod eval;
pub mod search;
pub mod tb;
pub mod time;

pub use eval::evaluate;
pub use search::control::SearchControl;
pub use search::pool::ThreadPool;
pub use search::{Limits, RootMove, SearchInfo, SearchResult};
pub use tb::{NoTablebase, Tablebase, Wdl};
pub use time::{Clock, compute_limits, control_from_go};
