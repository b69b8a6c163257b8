//! Per-read state: the loaded read itself, its persistent score heap and
//! filter cache, and the transient per-pass scan state.
//!
//! Scan state lives in its own dense array, separate from the read entries,
//! so the scan inner loop touches only the small hot struct per candidate.

use crate::core::filter_cache::VectorAlignmentCache;
use crate::core::score_heap::ScoreHeap;
use crate::seed::SeedSet;
use crate::sequence::PackedSequence;

/// Sentinel genome offset meaning "no hit recorded".
pub const NO_HIT: u32 = u32::MAX;

/// One raw seed match recorded during scanning.
#[derive(Debug, Clone, Copy)]
pub struct ScanHit {
    /// Genome position where the seed window starts.
    pub g_start: u32,
    /// Read position where the k-mer first ends within the read.
    pub r_end_first: u8,
    /// Read position where the k-mer last ends (differs when the k-mer
    /// occurs more than once in the read).
    pub r_end_last: u8,
    /// Ambiguous k-mers are exempt from the colinearity ordering check.
    pub multi: bool,
    /// Which seed produced the hit.
    pub seed: u8,
}

impl ScanHit {
    fn empty() -> ScanHit {
        ScanHit { g_start: NO_HIT, r_end_first: 0, r_end_last: 0, multi: false, seed: 0 }
    }
}

/// A seed anchor retained with a score-heap entry, expressed relative to
/// the candidate window so the final pass can band its alignment.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    /// Window-relative genome offset of the seed match.
    pub x: i64,
    /// Read offset of the seed match start (first occurrence).
    pub y: i64,
    pub length: u16,
    pub multi: bool,
}

/// Transient per-read scan state, reset before every contig/strand pass.
///
/// Recent hits sit in a fixed ring of `num_matches` slots overwritten
/// oldest-first; whether hits lost to overwrite should have widened the
/// window is deliberately not second-guessed here.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub read_len: u16,
    pub window_len: u16,
    /// Genome offset of the last vector-filter invocation, `NO_HIT` if none.
    pub last_filter_goff: u32,
    last: usize,
    hits: Vec<ScanHit>,
}

impl ScanState {
    pub fn new(num_matches: usize, read_len: u16) -> ScanState {
        debug_assert!(num_matches >= 1);
        ScanState {
            read_len,
            window_len: read_len,
            last_filter_goff: NO_HIT,
            last: 0,
            hits: vec![ScanHit::empty(); num_matches],
        }
    }

    pub fn reset(&mut self) {
        for h in &mut self.hits {
            h.g_start = NO_HIT;
        }
        self.last = 0;
        self.last_filter_goff = NO_HIT;
    }

    /// The most recently recorded hit (meaningless until one is recorded).
    #[inline(always)]
    pub fn newest(&self) -> &ScanHit {
        &self.hits[self.last]
    }

    /// The slot about to be overwritten; once its `g_start` is real the
    /// ring has seen at least `num_matches` hits.
    #[inline(always)]
    pub fn oldest(&self) -> &ScanHit {
        &self.hits[(self.last + 1) % self.hits.len()]
    }

    #[inline(always)]
    pub fn record(&mut self, hit: ScanHit) {
        self.last = (self.last + 1) % self.hits.len();
        self.hits[self.last] = hit;
    }

    /// Check that the ring's hits advance monotonically along the read,
    /// oldest to newest. A hit flagged multi-occurrence may sit anywhere.
    pub fn hits_colinear(&self) -> bool {
        let n = self.hits.len();
        let mut prev = (self.last + 1) % n;
        for _ in 1..n {
            let crt = (prev + 1) % n;
            let (p, c) = (&self.hits[prev], &self.hits[crt]);
            debug_assert!(p.g_start != NO_HIT && c.g_start != NO_HIT);
            if !p.multi && p.r_end_last > c.r_end_last {
                return false;
            }
            prev = crt;
        }
        true
    }

    /// Snapshot the ring as window-relative anchors, oldest first.
    pub fn anchors(&self, goff: u32, seeds: &SeedSet) -> Vec<Anchor> {
        let n = self.hits.len();
        let mut out = Vec::with_capacity(n);
        let mut crt = (self.last + 1) % n;
        for _ in 0..n {
            let h = &self.hits[crt];
            if h.g_start != NO_HIT {
                let span = seeds.get(h.seed as usize).span as i64;
                out.push(Anchor {
                    x: i64::from(h.g_start) - i64::from(goff),
                    y: i64::from(h.r_end_first) - (span - 1),
                    length: span as u16,
                    multi: h.multi,
                });
            }
            crt = (crt + 1) % n;
        }
        out
    }
}

/// One loaded read with its scan-global accumulators. Created once at load
/// time; `scores` and `cache` persist across all contigs and both strands
/// until the final pass drains them.
#[derive(Debug)]
pub struct ReadEntry {
    pub id: u32,
    pub name: String,
    /// Letter codes, or colour codes in colour-space mode.
    pub seq: PackedSequence,
    /// Colour-space only: the letter base the leading colour hangs off.
    pub initial_base: Option<u8>,
    pub scores: ScoreHeap,
    pub cache: VectorAlignmentCache,
    /// Vector-filter hits accepted into the heap across the whole scan.
    pub sw_hits: u32,
    /// Final alignments emitted for this read.
    pub final_matches: u32,
}
