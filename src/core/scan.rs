//! The genome scanner: one streaming pass over a contig (per strand),
//! driving index lookups, hit recording and the vector-filter gate.
//!
//! The k-mer window runs one position ahead of the position being
//! finalized: while position `i`'s keys are consumed, position `i+1`'s keys
//! are already being computed. The lookahead is where prefetches for the
//! next index buckets would be issued; with or without them, later state
//! depends on the one-ahead window, so the structure stays.

use crate::align::VectorAligner;
use crate::core::context::ScanContext;
use crate::core::filter_cache::hash_window;
use crate::core::reads::{ScanHit, NO_HIT};
use crate::core::score_heap::ScoreEntry;
use crate::sequence::{is_ambiguous, KmerWindow, PackedSequence};

/// Scan `scan_seq` (already strand- and encoding-resolved) against the
/// index, accumulating qualifying candidates into each read's score heap.
///
/// `progress` is called with the current genome position at a coarse
/// stride so the caller can drive a progress bar.
pub fn scan_contig<F>(
    scan_seq: &PackedSequence,
    contig_num: u32,
    revcmpl: bool,
    ctx: &mut ScanContext,
    aligner: &mut VectorAligner,
    mut progress: F,
) where
    F: FnMut(usize),
{
    let ScanContext { cfg, seeds, index, reads, scan_states, stats } = ctx;

    let genome_len = scan_seq.len();
    let max_span = seeds.max_span();
    let n_seeds = seeds.len();
    if genome_len < max_span {
        return;
    }

    let scheme = index.scheme().clone();
    let mut window = KmerWindow::new(max_span);

    // Warm the window with the first max_span symbols. An ambiguous symbol
    // invalidates every window that would contain it, so key consumption
    // stays suppressed for the next max_span positions.
    let mut skip = 0usize;
    for i in 0..max_span {
        let symbol = scan_seq.get(i);
        window.shift_in(symbol);
        if is_ambiguous(symbol) {
            skip = max_span;
        }
        if skip > 0 {
            skip -= 1;
        }
    }

    // Keys one ahead: these belong to the window ending at `i`, computed
    // while position `i - 1` was being finalized.
    let mut keys = vec![0u32; n_seeds];
    let mut keys_next = vec![0u32; n_seeds];
    for sn in 0..n_seeds {
        keys_next[sn] = scheme.window_key(seeds, &window, sn);
    }

    let mut skip_next = skip;
    let mut i = max_span - 1;
    loop {
        if i % 4096 == 0 {
            progress(i);
        }

        // Shift one ahead to zero ahead.
        std::mem::swap(&mut keys, &mut keys_next);
        skip = skip_next;

        // One ahead for i + 1.
        if i + 1 < genome_len {
            let symbol = scan_seq.get(i + 1);
            window.shift_in(symbol);
            if is_ambiguous(symbol) {
                skip_next = max_span;
            }
            if skip_next > 0 {
                skip_next -= 1;
            }
            for sn in 0..n_seeds {
                keys_next[sn] = scheme.window_key(seeds, &window, sn);
            }
        }

        // Zero ahead: the real work for the window ending at `i`.
        if skip == 0 {
            for sn in 0..n_seeds {
                let entries = index.lookup(sn, keys[sn]);
                stats.note_kmer_list(entries.len() as u64);
                if entries.is_empty() {
                    continue;
                }
                let span = seeds.get(sn).span;
                let idx = (i + 1 - span) as u32;

                for entry in entries {
                    let rid = entry.read_id as usize;
                    let state = &mut scan_states[rid];

                    // Taboo: ignore a hit landing too close behind the
                    // read's previous one; repetitive local matches would
                    // otherwise flood the ring.
                    let prevhit = state.newest().g_start;
                    if prevhit != NO_HIT
                        && idx >= prevhit
                        && idx - prevhit < cfg.hit_taboo_len
                    {
                        continue;
                    }

                    state.record(ScanHit {
                        g_start: idx,
                        r_end_first: entry.r_end_first as u8,
                        r_end_last: entry.r_end_last as u8,
                        multi: entry.r_end_first != entry.r_end_last,
                        seed: sn as u8,
                    });

                    // Candidate window start, centred so the read's matched
                    // position sits mid-window, clamped to the contig.
                    let window_len = state.window_len as usize;
                    let read_len = state.read_len as usize;
                    let centre = entry.r_end_first as usize + (window_len - read_len) / 2;
                    let goff = (i.saturating_sub(centre)) as u32;

                    // Gate the vector filter: the ring must have seen a full
                    // complement of hits, the window must advance
                    // monotonically, stay clear of the last invocation by a
                    // quarter window, and the recorded hits must be colinear.
                    if state.oldest().g_start == NO_HIT {
                        continue;
                    }
                    if goff > state.oldest().g_start {
                        continue;
                    }
                    if state.last_filter_goff != NO_HIT
                        && goff < state.last_filter_goff + (state.window_len / 4) as u32
                    {
                        continue;
                    }
                    stats.colinearity_checks += 1;
                    if !state.hits_colinear() {
                        continue;
                    }

                    let read = &mut reads[rid];
                    stats.filter_calls += 1;

                    let goff_usize = goff as usize;
                    let glen = window_len.min(genome_len - goff_usize);

                    let score = if cfg.cache_filter_calls {
                        let hash = hash_window(scan_seq, goff_usize, glen);
                        match read.cache.lookup(hash) {
                            Some(score) => {
                                stats.filter_calls_bypassed += 1;
                                score
                            }
                            None => {
                                let score = aligner.score(scan_seq, goff_usize, glen, &read.seq);
                                read.cache.insert(hash, score);
                                score
                            }
                        }
                    } else {
                        aligner.score(scan_seq, goff_usize, glen, &read.seq)
                    };

                    if score >= cfg.vect_threshold_for(read_len) {
                        stats.filter_passes += 1;
                        read.scores.push(ScoreEntry {
                            score,
                            g_offset: goff,
                            contig: contig_num,
                            revcmpl,
                            anchors: state.anchors(goff, seeds),
                        });
                        state.last_filter_goff = goff;
                        read.sw_hits += 1;
                    }
                }
            }
        }

        i += 1;
        if i >= genome_len {
            break;
        }
    }

    stats.vector_invocations = aligner.invocations;
    stats.vector_cells = aligner.cells;
}
