pub mod filter_cache;
pub mod scan;
pub mod score_heap;
