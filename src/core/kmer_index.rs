//! K-mer index: for every seed, a table from compressed k-mer key to the
//! reads carrying that k-mer.
//!
//! Built once from all loaded reads and read-only during scanning. Two
//! keying schemes exist with one build/lookup path:
//!
//! * direct: the seed's sampled positions are gathered into a `4^weight`
//!   table index. Exact, but table size is exponential in seed weight.
//! * hashed: the masked window words are folded through a multiplicative
//!   mixer into a fixed `4^H` table. Collisions become false-positive seed
//!   matches that the vector-filter stage weeds out; the trade is index
//!   memory against a higher filter call rate.

use rayon::prelude::*;

use crate::config::SpaceMode;
use crate::core::reads::ReadEntry;
use crate::seed::SeedSet;
use crate::sequence::{is_ambiguous, KmerWindow};

/// One read's occurrence of a (seed, key) pair. A read occurring at the
/// same key more than once keeps only its first and last end offsets, so
/// repetitive reads cannot inflate the index.
#[derive(Debug, Clone, Copy)]
pub struct KmerIndexEntry {
    pub read_id: u32,
    pub r_end_first: u16,
    pub r_end_last: u16,
}

/// How window contents become table indices.
#[derive(Debug, Clone)]
pub enum KeyScheme {
    Direct,
    Hashed {
        power: u32,
        /// Per-seed nibble masks over the scan window words: 0xF where the
        /// seed samples, 0x0 elsewhere.
        masks: Vec<Vec<u32>>,
    },
}

impl KeyScheme {
    pub fn direct() -> KeyScheme {
        KeyScheme::Direct
    }

    pub fn hashed(seeds: &SeedSet, power: u32) -> KeyScheme {
        let words = seeds.max_span().div_ceil(8);
        let masks = seeds
            .iter()
            .map(|seed| {
                let mut mask = vec![0u32; words];
                for j in 0..seed.span {
                    if (seed.mask >> j) & 1 == 1 {
                        // Pattern position j samples window nibble span-1-j.
                        let w = seed.span - 1 - j;
                        mask[w / 8] |= 0xf << (4 * (w % 8));
                    }
                }
                mask
            })
            .collect();
        KeyScheme::Hashed { power, masks }
    }

    /// Table size for seed `sn` under this scheme.
    pub fn table_size(&self, seeds: &SeedSet, sn: usize) -> usize {
        match self {
            KeyScheme::Direct => 1usize << (2 * seeds.get(sn).weight),
            KeyScheme::Hashed { power, .. } => 1usize << (2 * power),
        }
    }

    /// Compress the current window into a table index for seed `sn`.
    /// Deterministic in the window contents: symbols outside the seed's
    /// sampled positions never influence the key.
    #[inline]
    pub fn window_key(&self, seeds: &SeedSet, window: &KmerWindow, sn: usize) -> u32 {
        let seed = seeds.get(sn);
        match self {
            KeyScheme::Direct => {
                let mut key = 0u32;
                for j in 0..seed.span {
                    if (seed.mask >> j) & 1 == 1 {
                        key = (key << 2) | u32::from(window.base(seed.span - 1 - j) & 0x3);
                    }
                }
                key
            }
            KeyScheme::Hashed { power, masks } => {
                let mut h = 0u32;
                for (word, mask) in window.words().iter().zip(&masks[sn]) {
                    h = mix32((word & mask) ^ h);
                }
                h & ((1u32 << (2 * power)) - 1)
            }
        }
    }
}

/// 32-bit finalizing mixer (murmur3 fmix32).
#[inline(always)]
fn mix32(mut a: u32) -> u32 {
    a ^= a >> 16;
    a = a.wrapping_mul(0x85eb_ca6b);
    a ^= a >> 13;
    a = a.wrapping_mul(0xc2b2_ae35);
    a ^= a >> 16;
    a
}

struct SeedTable {
    buckets: Vec<Vec<KmerIndexEntry>>,
    entries: u64,
}

pub struct KmerIndex {
    tables: Vec<SeedTable>,
    scheme: KeyScheme,
}

impl KmerIndex {
    /// Build the index from all loaded reads. Tables are independent per
    /// seed, so they build in parallel.
    pub fn build(
        reads: &[ReadEntry],
        seeds: &SeedSet,
        scheme: KeyScheme,
        mode: SpaceMode,
    ) -> KmerIndex {
        let tables: Vec<SeedTable> = (0..seeds.len())
            .into_par_iter()
            .map(|sn| build_seed_table(reads, seeds, &scheme, sn, mode))
            .collect();
        KmerIndex { tables, scheme }
    }

    #[inline(always)]
    pub fn lookup(&self, sn: usize, key: u32) -> &[KmerIndexEntry] {
        &self.tables[sn].buckets[key as usize]
    }

    pub fn scheme(&self) -> &KeyScheme {
        &self.scheme
    }

    /// Total entries across all seed tables.
    pub fn total_entries(&self) -> u64 {
        self.tables.iter().map(|t| t.entries).sum()
    }

    /// Drop every (seed, key) bucket whose occurrence count exceeds
    /// `mean + limit * stddev` for that seed, trading recall for runtime on
    /// repetitive inputs. Returns the number of pruned keys. Only valid
    /// with direct keying; the config layer rejects the combination with
    /// the hashed table.
    pub fn prune(&mut self, limit: i32, verbose: bool) -> u64 {
        if limit < 0 {
            return 0;
        }
        debug_assert!(matches!(self.scheme, KeyScheme::Direct));

        let mut total_pruned = 0u64;
        for (sn, table) in self.tables.iter_mut().enumerate() {
            let n = table.buckets.len() as f64;
            let mean = table.buckets.iter().map(|b| b.len() as f64).sum::<f64>() / n;
            let var = table
                .buckets
                .iter()
                .map(|b| {
                    let d = b.len() as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let stddev = var.sqrt();
            let cutoff = mean + f64::from(limit) * stddev;

            if verbose {
                eprintln!(
                    "- Pruning kmers for seed {}; mu: {:.4}, sigma: {:.4}, limit: {:.4}",
                    sn, mean, stddev, cutoff
                );
                if mean < 1.0 {
                    eprintln!("WARNING: low mean - are you sure you want to prune kmers?");
                }
            }

            let mut pruned = 0u64;
            for bucket in &mut table.buckets {
                if bucket.len() as f64 > cutoff {
                    table.entries -= bucket.len() as u64;
                    bucket.clear();
                    bucket.shrink_to_fit();
                    pruned += 1;
                }
            }
            if verbose {
                eprintln!("  - Pruned {} kmer(s) from seed {}", pruned, sn);
            }
            total_pruned += pruned;
        }
        total_pruned
    }
}

fn build_seed_table(
    reads: &[ReadEntry],
    seeds: &SeedSet,
    scheme: &KeyScheme,
    sn: usize,
    mode: SpaceMode,
) -> SeedTable {
    let span = seeds.get(sn).span;
    let max_span = seeds.max_span();
    let mut buckets: Vec<Vec<KmerIndexEntry>> = vec![Vec::new(); scheme.table_size(seeds, sn)];
    let mut entries = 0u64;

    let mut window = KmerWindow::new(max_span);
    for read in reads {
        window.clear();
        // load = number of consecutive unambiguous symbols in the window;
        // an ambiguous symbol forces re-accumulation of a full span.
        let mut load = 0usize;
        for (i, symbol) in read.seq.symbols().enumerate() {
            window.shift_in(symbol);
            if is_ambiguous(symbol) {
                load = 0;
            } else if load < max_span {
                load += 1;
            }
            if load < span {
                continue;
            }
            // A colour-space read's first full k-mer is thrown out: its
            // leading colour depends on the read's initial base, which the
            // genome side derives from the preceding reference base instead.
            if mode.skips_first_kmer() && i == span - 1 {
                continue;
            }

            let key = scheme.window_key(seeds, &window, sn);
            let bucket = &mut buckets[key as usize];
            if let Some(last) = bucket.last_mut() {
                if last.read_id == read.id {
                    last.r_end_last = i as u16;
                    continue;
                }
            }
            bucket.push(KmerIndexEntry {
                read_id: read.id,
                r_end_first: i as u16,
                r_end_last: i as u16,
            });
            entries += 1;
        }
    }

    SeedTable { buckets, entries }
}
