//! The scan context: everything a scan pass needs, owned in one place.
//!
//! Reads, seeds, the k-mer index and the statistics counters live here and
//! are passed by reference into the scanner and the final pass, so repeated
//! or concurrent scans in tests never meet hidden shared state.

use crate::config::MapperConfig;
use crate::core::filter_cache::VectorAlignmentCache;
use crate::core::kmer_index::KmerIndex;
use crate::core::reads::{ReadEntry, ScanState};
use crate::core::score_heap::ScoreHeap;
use crate::seed::SeedSet;
use crate::sequence::fasta::LoadedRead;
use crate::stats::ScanStats;

pub struct ScanContext {
    pub cfg: MapperConfig,
    pub seeds: SeedSet,
    pub index: KmerIndex,
    pub reads: Vec<ReadEntry>,
    /// Hot per-read scan state, indexed by read id, densely packed apart
    /// from the read entries it belongs to.
    pub scan_states: Vec<ScanState>,
    pub stats: ScanStats,
}

impl ScanContext {
    /// Turn loaded reads into scan-ready entries. Window lengths resolve
    /// against each read's own length.
    pub fn prepare_reads(
        cfg: &MapperConfig,
        loaded: Vec<LoadedRead>,
    ) -> (Vec<ReadEntry>, Vec<ScanState>) {
        let mut reads = Vec::with_capacity(loaded.len());
        let mut states = Vec::with_capacity(loaded.len());
        for (id, r) in loaded.into_iter().enumerate() {
            let read_len = r.seq.len();
            let mut state = ScanState::new(cfg.num_matches, read_len as u16);
            state.window_len = cfg.window_len_for(read_len).min(u16::MAX as usize) as u16;
            states.push(state);
            reads.push(ReadEntry {
                id: id as u32,
                name: r.name,
                seq: r.seq,
                initial_base: r.initial_base,
                scores: ScoreHeap::new(cfg.num_outputs),
                cache: VectorAlignmentCache::new(),
                sw_hits: 0,
                final_matches: 0,
            });
        }
        (reads, states)
    }

    /// Reset every read's per-pass state; called between contigs/strands.
    pub fn reset_scan_states(&mut self) {
        for state in &mut self.scan_states {
            state.reset();
        }
    }

    pub fn longest_window(&self) -> usize {
        self.scan_states.iter().map(|s| s.window_len as usize).max().unwrap_or(0)
    }
}
