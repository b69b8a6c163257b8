//! The scan-and-score engine: k-mer index, genome scanner, per-read hit
//! state, bounded score heaps and the vector-filter cache.

pub mod context;
pub mod filter_cache;
pub mod kmer_index;
pub mod reads;
pub mod scan;
pub mod score_heap;
