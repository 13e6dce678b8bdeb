//! Lockless shared transposition table.
//!
//! Entries are two `AtomicU64` words (16 bytes) grouped into two-slot
//! buckets (32 bytes, one cache line per pair of buckets). Threads read
//! and write with `Relaxed` ordering and no locks; a torn write from a
//! racing thread is caught by an XOR check rather than prevented.
//!
//! ## Word layout
//!
//! ```text
//! word0: [63:32] key32   upper half of the Zobrist hash
//!        [31:27] generation (5 bits)
//!        [26]    pv flag
//!        [25:24] bound
//!        [23:16] depth
//!        [15:0]  move
//! word1: [63:32] check = key32 XOR word0[31:0]
//!        [31:16] score (i16)
//!        [15:0]  static eval (i16)
//! ```
//!
//! A probe recomputes the XOR from word0 and compares it against the
//! check field in word1; a mismatch means the two words belong to
//! different writes and the slot is treated as a miss. Probed moves are
//! hints only: the search legality-checks them before use.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use rampart_core::Move;

use crate::search::negamax::MATE_THRESHOLD;

const GENERATION_MASK: u8 = 0x1F;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// Empty slot.
    None = 0,
    /// Exact score from a PV node.
    Exact = 1,
    /// Score is a lower bound (the node failed high).
    Lower = 2,
    /// Score is an upper bound (the node failed low).
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Self {
        match bits & 0x03 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::None,
        }
    }
}

/// A successful probe.
#[derive(Debug, Clone, Copy)]
pub struct TtHit {
    /// Best move from the earlier search; may be stale.
    pub mv: Move,
    pub depth: u8,
    pub bound: Bound,
    /// Score converted back to root-relative mate distances.
    pub score: i32,
    /// Static eval recorded when the entry was written, or
    /// [`TtHit::EVAL_UNSET`].
    pub eval: i32,
    /// Whether the entry was written on a PV line.
    pub is_pv: bool,
}

impl TtHit {
    pub const EVAL_UNSET: i32 = i16::MIN as i32;
}

/// Mate scores are stored as distance-from-node so the entry stays
/// valid whatever path reaches the position; everything else is stored
/// verbatim.
pub fn score_to_tt(score: i32, ply: i32) -> i16 {
    if score > MATE_THRESHOLD {
        (score + ply) as i16
    } else if score < -MATE_THRESHOLD {
        (score - ply) as i16
    } else {
        score as i16
    }
}

/// Inverse of [`score_to_tt`].
pub fn score_from_tt(score: i16, ply: i32) -> i32 {
    let score = score as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

struct Slot {
    word0: AtomicU64,
    word1: AtomicU64,
}

impl Slot {
    const fn empty() -> Self {
        Self {
            word0: AtomicU64::new(0),
            word1: AtomicU64::new(0),
        }
    }

    fn encode(
        key32: u32,
        generation: u8,
        is_pv: bool,
        bound: Bound,
        depth: u8,
        mv: Move,
        score: i16,
        eval: i16,
    ) -> (u64, u64) {
        let w0 = ((key32 as u64) << 32)
            | (((generation & GENERATION_MASK) as u64) << 27)
            | ((is_pv as u64) << 26)
            | ((bound as u8 as u64) << 24)
            | ((depth as u64) << 16)
            | mv.raw() as u64;
        let check = key32 ^ (w0 as u32);
        let w1 = ((check as u64) << 32) | (((score as u16) as u64) << 16) | (eval as u16) as u64;
        (w0, w1)
    }

    /// Read both words and reject torn or mismatched entries.
    fn read(&self, key32: u32) -> Option<(u64, u64)> {
        let w0 = self.word0.load(Ordering::Relaxed);
        let w1 = self.word1.load(Ordering::Relaxed);

        let stored_key = (w0 >> 32) as u32;
        if stored_key ^ (w0 as u32) != (w1 >> 32) as u32 {
            return None;
        }
        if stored_key != key32 {
            return None;
        }
        Some((w0, w1))
    }

    fn write(&self, w0: u64, w1: u64) {
        self.word0.store(w0, Ordering::Relaxed);
        self.word1.store(w1, Ordering::Relaxed);
    }

    fn peek(&self) -> u64 {
        self.word0.load(Ordering::Relaxed)
    }
}

fn decode_generation(w0: u64) -> u8 {
    ((w0 >> 27) & GENERATION_MASK as u64) as u8
}

fn decode_depth(w0: u64) -> u8 {
    (w0 >> 16) as u8
}

fn decode_bound(w0: u64) -> Bound {
    Bound::from_bits(w0 >> 24)
}

/// Two slots sharing one hash index.
struct Bucket {
    slots: [Slot; 2],
}

impl Bucket {
    const fn empty() -> Self {
        Self {
            slots: [Slot::empty(), Slot::empty()],
        }
    }
}

/// The shared table. Every receiver is `&self`; the table is handed to
/// search threads by reference and raced on deliberately.
pub struct TranspositionTable {
    buckets: Box<[Bucket]>,
    mask: u64,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate `mb` megabytes, rounded down to a power-of-two bucket
    /// count (at least one bucket).
    pub fn new(mb: usize) -> Self {
        let bucket_size = std::mem::size_of::<Bucket>();
        let want = (mb * 1024 * 1024 / bucket_size).max(1);
        let rounded = want.next_power_of_two();
        let buckets = if rounded > want { rounded >> 1 } else { rounded };

        Self {
            buckets: (0..buckets).map(|_| Bucket::empty()).collect(),
            mask: (buckets - 1) as u64,
            generation: AtomicU8::new(0),
        }
    }

    /// Wipe all entries and the generation counter.
    pub fn clear(&self) {
        for bucket in self.buckets.iter() {
            for slot in &bucket.slots {
                slot.write(0, 0);
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Advance the generation; called once per `go`.
    pub fn new_generation(&self) {
        let current = self.generation.load(Ordering::Relaxed);
        self.generation
            .store(current.wrapping_add(1) & GENERATION_MASK, Ordering::Relaxed);
    }

    fn bucket(&self, hash: u64) -> &Bucket {
        &self.buckets[(hash & self.mask) as usize]
    }

    /// Look the position up, converting any stored mate score back to
    /// the probing ply.
    pub fn probe(&self, hash: u64, ply: i32) -> Option<TtHit> {
        let key32 = (hash >> 32) as u32;

        for slot in &self.bucket(hash).slots {
            let Some((w0, w1)) = slot.read(key32) else {
                continue;
            };
            let bound = decode_bound(w0);
            if bound == Bound::None {
                continue;
            }
            return Some(TtHit {
                mv: Move::from_raw(w0 as u16),
                depth: decode_depth(w0),
                bound,
                score: score_from_tt((w1 >> 16) as u16 as i16, ply),
                eval: (w1 as u16 as i16) as i32,
                is_pv: (w0 >> 26) & 1 != 0,
            });
        }
        None
    }

    /// Age of a slot relative to the current generation, in searches.
    fn relative_age(&self, w0: u64, generation: u8) -> u8 {
        (32 + generation - decode_generation(w0)) & GENERATION_MASK
    }

    /// Store an entry.
    ///
    /// Within the bucket the slot holding the same key is reused;
    /// otherwise the shallower-adjusted-for-age slot is the victim. A
    /// matching slot is only overwritten by an exact bound, a different
    /// generation, or a search at least as deep (minus a small slack so
    /// refreshed entries can replace barely-deeper stale ones).
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        hash: u64,
        depth: u8,
        score: i32,
        eval: i32,
        mv: Move,
        bound: Bound,
        ply: i32,
        is_pv: bool,
    ) {
        let key32 = (hash >> 32) as u32;
        let generation = self.generation.load(Ordering::Relaxed);
        let bucket = self.bucket(hash);

        let words: [u64; 2] = [bucket.slots[0].peek(), bucket.slots[1].peek()];
        let slot_index = if let Some(i) = (0..2).find(|&i| (words[i] >> 32) as u32 == key32) {
            let w0 = words[i];
            let keep = decode_bound(w0) != Bound::None
                && decode_generation(w0) == generation
                && bound != Bound::Exact
                && depth + 2 < decode_depth(w0);
            if keep {
                return;
            }
            i
        } else {
            // Victim: lower depth loses, with stale generations
            // handicapped so old deep entries eventually yield.
            let worth = |w0: u64| {
                decode_depth(w0) as i32 - 8 * self.relative_age(w0, generation) as i32
            };
            if worth(words[0]) <= worth(words[1]) { 0 } else { 1 }
        };

        let (w0, w1) = Slot::encode(
            key32,
            generation,
            is_pv,
            bound,
            depth,
            mv,
            score_to_tt(score, ply),
            eval.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        );
        bucket.slots[slot_index].write(w0, w1);
    }

    /// Permille of slots holding an entry from the current generation,
    /// estimated from the first thousand buckets.
    pub fn hashfull(&self) -> u32 {
        let generation = self.generation.load(Ordering::Relaxed);
        let sample = self.buckets.len().min(1000);
        let mut used = 0u32;
        for bucket in &self.buckets[..sample] {
            for slot in &bucket.slots {
                let w0 = slot.peek();
                if decode_bound(w0) != Bound::None && decode_generation(w0) == generation {
                    used += 1;
                }
            }
        }
        used * 1000 / (2 * sample as u32)
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("buckets", &self.buckets.len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

// Lazy SMP hands the table to scoped threads by reference.
const _: () = {
    const fn assert_sync<T: Sync>() {}
    assert_sync::<TranspositionTable>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::Square;

    #[test]
    fn bucket_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Bucket>(), 32);
    }

    #[test]
    fn sizing_uses_the_full_power_of_two_budget() {
        let bucket_size = std::mem::size_of::<Bucket>();
        // Power-of-two requests divide evenly and must not be halved.
        for mb in [1, 16, 64] {
            let tt = TranspositionTable::new(mb);
            assert_eq!(tt.buckets.len() * bucket_size, mb * 1024 * 1024);
        }
        // Odd requests round down to the previous power of two.
        let tt = TranspositionTable::new(3);
        assert_eq!(tt.buckets.len() * bucket_size, 2 * 1024 * 1024);
    }

    #[test]
    fn store_probe_roundtrip() {
        let tt = TranspositionTable::new(1);
        let hash = 0xDEAD_BEEF_1234_5678u64;
        let mv = Move::new(Square::E2, Square::E4);

        tt.store(hash, 7, 120, 45, mv, Bound::Exact, 0, true);

        let hit = tt.probe(hash, 0).expect("stored entry");
        assert_eq!(hit.mv, mv);
        assert_eq!(hit.depth, 7);
        assert_eq!(hit.bound, Bound::Exact);
        assert_eq!(hit.score, 120);
        assert_eq!(hit.eval, 45);
        assert!(hit.is_pv);
    }

    #[test]
    fn miss_on_unknown_hash() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(0x1234_5678_9ABC_DEF0, 0).is_none());
    }

    #[test]
    fn two_positions_share_a_bucket() {
        let tt = TranspositionTable::new(1);
        // Same low bits (same bucket), different upper keys.
        let first = 0x1111_0000_0000_0042u64;
        let second = 0x2222_0000_0000_0042u64;
        let mv1 = Move::new(Square::E2, Square::E4);
        let mv2 = Move::new(Square::D2, Square::D4);

        tt.store(first, 5, 10, 0, mv1, Bound::Lower, 0, false);
        tt.store(second, 6, -20, 0, mv2, Bound::Upper, 0, false);

        assert_eq!(tt.probe(first, 0).expect("first entry").mv, mv1);
        assert_eq!(tt.probe(second, 0).expect("second entry").mv, mv2);
    }

    #[test]
    fn shallower_slot_is_evicted() {
        let tt = TranspositionTable::new(1);
        let deep = 0x1111_0000_0000_0042u64;
        let shallow = 0x2222_0000_0000_0042u64;
        let newcomer = 0x3333_0000_0000_0042u64;
        let mv = Move::new(Square::E2, Square::E4);

        tt.store(deep, 20, 0, 0, mv, Bound::Exact, 0, false);
        tt.store(shallow, 3, 0, 0, mv, Bound::Exact, 0, false);
        tt.store(newcomer, 10, 0, 0, mv, Bound::Exact, 0, false);

        assert!(tt.probe(deep, 0).is_some(), "deep entry survives");
        assert!(tt.probe(shallow, 0).is_none(), "shallow entry evicted");
        assert!(tt.probe(newcomer, 0).is_some());
    }

    #[test]
    fn same_key_not_downgraded_within_generation() {
        let tt = TranspositionTable::new(1);
        let hash = 0xAAAA_BBBB_CCCC_DDDDu64;
        let deep_mv = Move::new(Square::E2, Square::E4);
        let shallow_mv = Move::new(Square::D2, Square::D4);

        tt.store(hash, 9, 50, 0, deep_mv, Bound::Lower, 0, false);
        tt.store(hash, 3, 75, 0, shallow_mv, Bound::Lower, 0, false);

        assert_eq!(tt.probe(hash, 0).expect("entry").mv, deep_mv);
    }

    #[test]
    fn stale_generation_gets_replaced() {
        let tt = TranspositionTable::new(1);
        let hash = 0xAAAA_BBBB_CCCC_DDDDu64;
        let old_mv = Move::new(Square::E2, Square::E4);
        let new_mv = Move::new(Square::D2, Square::D4);

        tt.store(hash, 12, 50, 0, old_mv, Bound::Lower, 0, false);
        tt.new_generation();
        tt.store(hash, 1, 75, 0, new_mv, Bound::Lower, 0, false);

        assert_eq!(tt.probe(hash, 0).expect("entry").mv, new_mv);
    }

    #[test]
    fn mate_scores_survive_path_changes() {
        // Mate found 5 plies into one line, probed 9 plies into another.
        let mate_at_node = crate::search::negamax::MATE_SCORE - 8;
        let stored = score_to_tt(mate_at_node, 5);
        assert_eq!(score_from_tt(stored, 5), mate_at_node);

        let from_other_path = score_from_tt(stored, 9);
        assert_eq!(from_other_path, mate_at_node - 4);
    }

    #[test]
    fn ordinary_scores_pass_through() {
        assert_eq!(score_from_tt(score_to_tt(144, 31), 31), 144);
        assert_eq!(score_from_tt(score_to_tt(-2_500, 12), 12), -2_500);
    }

    #[test]
    fn torn_write_reads_as_miss() {
        let tt = TranspositionTable::new(1);
        let hash = 0xDEAD_BEEF_1234_5678u64;
        tt.store(hash, 5, 100, 50, Move::new(Square::E2, Square::E4), Bound::Exact, 0, false);
        assert!(tt.probe(hash, 0).is_some());

        // Flip the check field as a racing writer would.
        let bucket = &tt.buckets[(hash & tt.mask) as usize];
        for slot in &bucket.slots {
            let w1 = slot.word1.load(Ordering::Relaxed);
            slot.word1.store(w1 ^ 0xFFFF_FFFF_0000_0000, Ordering::Relaxed);
        }
        assert!(tt.probe(hash, 0).is_none());
    }

    #[test]
    fn clear_empties_the_table() {
        let tt = TranspositionTable::new(1);
        let hash = 0xAAAA_BBBB_CCCC_DDDDu64;
        tt.store(hash, 5, 100, 50, Move::new(Square::E2, Square::E4), Bound::Exact, 0, false);
        tt.clear();
        assert!(tt.probe(hash, 0).is_none());
        assert_eq!(tt.hashfull(), 0);
    }

    #[test]
    fn hashfull_reports_occupancy() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull(), 0);

        let mv = Move::new(Square::E2, Square::E4);
        for i in 0..4_000u64 {
            tt.store(i.wrapping_mul(0x9E37_79B9_7F4A_7C15), 4, 0, 0, mv, Bound::Lower, 0, false);
        }
        assert!(tt.hashfull() > 0);
        assert!(tt.hashfull() <= 1000);
    }

    #[test]
    fn concurrent_hammering_is_memory_safe() {
        let tt = TranspositionTable::new(4);
        std::thread::scope(|s| {
            for t in 0..8u64 {
                let tt = &tt;
                s.spawn(move || {
                    let mv = Move::new(Square::E2, Square::E4);
                    for i in 0..10_000u64 {
                        let hash = (t << 60) ^ i.wrapping_mul(0x2545_F491_4F6C_DD1D);
                        tt.store(hash, 5, 100, 50, mv, Bound::Exact, 0, false);
                        let _ = tt.probe(hash, 0);
                    }
                });
            }
        });
    }
}
