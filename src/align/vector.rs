//! Score-only affine-gap local alignment of a read against a genome window.
//!
//! This is the filter oracle of the scan loop: pure, deterministic in its
//! inputs, and called at a rate where allocation would dominate, so the DP
//! rows live in the aligner and are reused across invocations. A SIMD
//! striped layout would drop in behind the same interface; the scalar
//! two-row recurrence is the portable baseline.

use crate::align::NEG_INF;
use crate::config::SwParams;
use crate::sequence::PackedSequence;

pub struct VectorAligner {
    params: SwParams,
    prev_h: Vec<i32>,
    cur_h: Vec<i32>,
    gap_b: Vec<i32>,
    pub invocations: u64,
    pub cells: u64,
}

impl VectorAligner {
    pub fn new(params: SwParams) -> VectorAligner {
        VectorAligner {
            params,
            prev_h: Vec::new(),
            cur_h: Vec::new(),
            gap_b: Vec::new(),
            invocations: 0,
            cells: 0,
        }
    }

    /// Best local alignment score of `read` against
    /// `genome[goff .. goff + glen]`, zero if nothing aligns.
    pub fn score(
        &mut self,
        genome: &PackedSequence,
        goff: usize,
        glen: usize,
        read: &PackedSequence,
    ) -> i32 {
        let rlen = read.len();
        if rlen == 0 || glen == 0 {
            return 0;
        }
        debug_assert!(goff + glen <= genome.len());

        let p = self.params;
        self.invocations += 1;
        self.cells += (glen * rlen) as u64;

        self.prev_h.clear();
        self.prev_h.resize(rlen + 1, 0);
        self.cur_h.clear();
        self.cur_h.resize(rlen + 1, 0);
        self.gap_b.clear();
        self.gap_b.resize(rlen + 1, NEG_INF);

        let mut best = 0;
        for i in 0..glen {
            let a = genome.get(goff + i);
            let mut gap_a = NEG_INF;
            self.cur_h[0] = 0;
            for j in 1..=rlen {
                let sub = if a == read.get(j - 1) { p.match_value } else { p.mismatch_value };
                gap_a = (self.cur_h[j - 1] + p.a_gap_open + p.a_gap_extend)
                    .max(gap_a + p.a_gap_extend);
                self.gap_b[j] = (self.prev_h[j] + p.b_gap_open + p.b_gap_extend)
                    .max(self.gap_b[j] + p.b_gap_extend);
                let h = (self.prev_h[j - 1] + sub).max(gap_a).max(self.gap_b[j]).max(0);
                self.cur_h[j] = h;
                if h > best {
                    best = h;
                }
            }
            std::mem::swap(&mut self.prev_h, &mut self.cur_h);
        }
        best
    }
}
