//! Full local alignment with traceback, used only by the final pass to turn
//! a retained candidate window into a reportable alignment.
//!
//! Same scoring model as the vector filter; the extra cost here is the
//! traceback matrices, paid only for the top candidates. An optional
//! diagonal band (derived from the candidate's seed anchors) restricts the
//! searched cells.

use crate::align::{EditOp, NEG_INF};
use crate::config::SwParams;
use crate::sequence::{colour_char, letter_char, PackedSequence};

/// A finished alignment of a read against a genome window. Positions are
/// window-relative, 0-based and inclusive; the caller rebases them onto the
/// contig.
#[derive(Debug, Clone)]
pub struct FullAlignment {
    pub score: i32,
    pub genome_start: usize,
    pub genome_end: usize,
    pub read_start: usize,
    pub read_end: usize,
    pub matches: u32,
    pub mismatches: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub edit: Vec<EditOp>,
    pub db_align: String,
    pub qr_align: String,
}

impl FullAlignment {
    /// Two candidate windows for the same read can refine to the very same
    /// alignment; the final pass suppresses such duplicates.
    pub fn same_alignment(&self, other: &FullAlignment) -> bool {
        self.score == other.score
            && self.genome_start == other.genome_start
            && self.genome_end == other.genome_end
            && self.read_start == other.read_start
            && self.read_end == other.read_end
            && self.matches == other.matches
            && self.mismatches == other.mismatches
    }
}

/// Align `read` against `genome[goff .. goff + glen]`.
///
/// `band` restricts the DP to diagonals `lo..=hi` (diagonal = genome
/// position minus read position, window-relative). Returns `None` when no
/// cell scores above zero.
pub fn full_align(
    genome: &PackedSequence,
    goff: usize,
    glen: usize,
    read: &PackedSequence,
    params: &SwParams,
    band: Option<(i64, i64)>,
    colour_space: bool,
) -> Option<FullAlignment> {
    let rlen = read.len();
    if rlen == 0 || glen == 0 {
        return None;
    }
    debug_assert!(goff + glen <= genome.len());

    let cols = rlen + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut h = vec![0i32; (glen + 1) * cols];
    let mut ga = vec![NEG_INF; (glen + 1) * cols];
    let mut gb = vec![NEG_INF; (glen + 1) * cols];

    let in_band = |i: usize, j: usize| match band {
        None => true,
        Some((lo, hi)) => {
            let d = i as i64 - j as i64;
            d >= lo && d <= hi
        }
    };

    let mut best = 0i32;
    let mut best_i = 0usize;
    let mut best_j = 0usize;

    for i in 1..=glen {
        let a = genome.get(goff + i - 1);
        for j in 1..=rlen {
            if !in_band(i - 1, j - 1) {
                continue;
            }
            let sub = if a == read.get(j - 1) { params.match_value } else { params.mismatch_value };
            let open_a = h[idx(i, j - 1)] + params.a_gap_open + params.a_gap_extend;
            let ext_a = ga[idx(i, j - 1)] + params.a_gap_extend;
            ga[idx(i, j)] = open_a.max(ext_a);

            let open_b = h[idx(i - 1, j)] + params.b_gap_open + params.b_gap_extend;
            let ext_b = gb[idx(i - 1, j)] + params.b_gap_extend;
            gb[idx(i, j)] = open_b.max(ext_b);

            let score =
                (h[idx(i - 1, j - 1)] + sub).max(ga[idx(i, j)]).max(gb[idx(i, j)]).max(0);
            h[idx(i, j)] = score;
            if score > best {
                best = score;
                best_i = i;
                best_j = j;
            }
        }
    }

    if best <= 0 {
        return None;
    }

    // Walk back from the best cell through whichever matrix produced each
    // value; ops come out newest-first.
    enum State {
        H,
        GapA,
        GapB,
    }
    let mut ops: Vec<EditOp> = Vec::new();
    let (mut i, mut j) = (best_i, best_j);
    let mut state = State::H;
    loop {
        match state {
            State::H => {
                let score = h[idx(i, j)];
                if score == 0 {
                    break;
                }
                let a = genome.get(goff + i - 1);
                let sub =
                    if a == read.get(j - 1) { params.match_value } else { params.mismatch_value };
                if i > 0 && j > 0 && score == h[idx(i - 1, j - 1)] + sub {
                    ops.push(if sub == params.match_value && a == read.get(j - 1) {
                        EditOp::Match
                    } else {
                        EditOp::Mismatch
                    });
                    i -= 1;
                    j -= 1;
                } else if score == ga[idx(i, j)] {
                    state = State::GapA;
                } else {
                    debug_assert_eq!(score, gb[idx(i, j)]);
                    state = State::GapB;
                }
            }
            State::GapA => {
                ops.push(EditOp::Ins);
                let opened = ga[idx(i, j)]
                    == h[idx(i, j - 1)] + params.a_gap_open + params.a_gap_extend;
                j -= 1;
                if opened {
                    state = State::H;
                }
            }
            State::GapB => {
                ops.push(EditOp::Del);
                let opened = gb[idx(i, j)]
                    == h[idx(i - 1, j)] + params.b_gap_open + params.b_gap_extend;
                i -= 1;
                if opened {
                    state = State::H;
                }
            }
        }
    }
    ops.reverse();

    // Replay the ops to render the aligned strings and count columns.
    let render = |code: u8| if colour_space { colour_char(code) } else { letter_char(code) };
    let mut db_align = String::with_capacity(ops.len());
    let mut qr_align = String::with_capacity(ops.len());
    let (mut gi, mut rj) = (i, j);
    let (mut matches, mut mismatches, mut insertions, mut deletions) = (0u32, 0u32, 0u32, 0u32);
    for &op in &ops {
        match op {
            EditOp::Match | EditOp::Mismatch => {
                db_align.push(render(genome.get(goff + gi)));
                qr_align.push(render(read.get(rj)));
                if op == EditOp::Match {
                    matches += 1;
                } else {
                    mismatches += 1;
                }
                gi += 1;
                rj += 1;
            }
            EditOp::Ins => {
                db_align.push('-');
                qr_align.push(render(read.get(rj)));
                insertions += 1;
                rj += 1;
            }
            EditOp::Del => {
                db_align.push(render(genome.get(goff + gi)));
                qr_align.push('-');
                deletions += 1;
                gi += 1;
            }
        }
    }
    debug_assert_eq!(gi, best_i);
    debug_assert_eq!(rj, best_j);

    Some(FullAlignment {
        score: best,
        genome_start: i,
        genome_end: best_i - 1,
        read_start: j,
        read_end: best_j - 1,
        matches,
        mismatches,
        insertions,
        deletions,
        edit: ops,
        db_align,
        qr_align,
    })
}
