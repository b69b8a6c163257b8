//! Unit tests for the genome scanner: hit recording, taboo suppression,
//! ring gating and the filter cache on the hot path.

use srmap::align::VectorAligner;
use srmap::core::reads::NO_HIT;
use srmap::core::scan::scan_contig;

use crate::unit::helpers::{context, letter_config, loaded_read, seq, sw_params, ConfigSpec};

#[test]
fn taboo_suppresses_close_hits() {
    // Read CGT occurs at genome starts 1 and 5 (distance 4).
    let genome = seq("ACGTACGT");

    // Distance below the taboo length: only the first hit is recorded.
    let mut ctx = context(
        letter_config(ConfigSpec { hit_taboo_len: 5, ..ConfigSpec::default() }),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.scan_states[0].newest().g_start, 1);
    assert_eq!(ctx.reads[0].sw_hits, 1);

    // Distance meeting the taboo length: both hits are recorded.
    let mut ctx = context(
        letter_config(ConfigSpec { hit_taboo_len: 4, ..ConfigSpec::default() }),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.scan_states[0].newest().g_start, 5);
    assert_eq!(ctx.reads[0].sw_hits, 2);
}

#[test]
fn single_hit_never_scores_with_two_required_matches() {
    let genome = seq("ACGTTTTTTTTT");
    let mut ctx = context(
        letter_config(ConfigSpec { num_matches: 2, ..ConfigSpec::default() }),
        &["1111"],
        vec![loaded_read("r1", "ACGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    // The one hit is recorded but the ring never fills, so the vector
    // filter never runs and nothing reaches the heap.
    assert_ne!(ctx.scan_states[0].newest().g_start, NO_HIT);
    assert_eq!(ctx.stats.filter_calls, 0);
    assert!(ctx.reads[0].scores.is_empty());
}

#[test]
fn full_ring_with_colinear_hits_scores() {
    // Both kmers of the read hit in order; the ring fills and the window
    // qualifies.
    let genome = seq("ACGTACGT");
    let mut ctx = context(
        letter_config(ConfigSpec {
            num_matches: 2,
            hit_taboo_len: 1,
            ..ConfigSpec::default()
        }),
        &["1111"],
        vec![loaded_read("r1", "ACGTACGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert!(ctx.stats.filter_calls > 0);
    assert_eq!(ctx.reads[0].scores.len(), 1);
    let entries = ctx.reads[0].scores.drain();
    assert_eq!(entries[0].score, 800);
    assert_eq!(entries[0].g_offset, 0);
    assert!(!entries[0].revcmpl);
}

#[test]
fn cache_bypasses_repeat_windows() {
    // The same read window content recurs; the second filter call must be
    // served from the cache without touching the aligner.
    let genome = seq("ACGTACGT");
    let mut ctx = context(
        letter_config(ConfigSpec { vect_threshold: "100.0", ..ConfigSpec::default() }),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});

    // Hits at genome starts 1 and 5 produce byte-identical CGT windows.
    assert_eq!(ctx.stats.filter_calls, 2);
    assert_eq!(ctx.stats.filter_calls_bypassed, 1);
    assert_eq!(ctx.stats.vector_invocations, 1);
    assert_eq!(ctx.reads[0].cache.occupancy(), 1);
    // Both windows scored identically and cleared the threshold.
    assert_eq!(ctx.reads[0].scores.len(), 2);
}

#[test]
fn disabled_cache_recomputes_every_window() {
    let genome = seq("ACGTACGT");
    let mut cfg = letter_config(ConfigSpec::default());
    cfg.cache_filter_calls = false;
    let mut ctx = context(cfg, &["111"], vec![loaded_read("r1", "CGT")]);
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.stats.filter_calls, 2);
    assert_eq!(ctx.stats.filter_calls_bypassed, 0);
    assert_eq!(ctx.stats.vector_invocations, 2);
}

#[test]
fn ambiguous_genome_run_suspends_kmer_generation() {
    // The N invalidates every window containing it; CGT right after the N
    // is still found once the window re-fills.
    let genome = seq("ANCGTAAA");
    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.scan_states[0].newest().g_start, 2);
    assert_eq!(ctx.reads[0].sw_hits, 1);
}

#[test]
fn genome_shorter_than_seed_span_is_a_no_op() {
    let genome = seq("ACG");
    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["11110111"],
        vec![loaded_read("r1", "ACGTACGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.stats.kmer_lists_scanned, 0);
    assert!(ctx.reads[0].scores.is_empty());
}

#[test]
fn colour_space_scan_matches_colour_streams() {
    use srmap::config::SpaceMode;
    use srmap::sequence::fasta::LoadedRead;
    use srmap::sequence::{to_colour_stream, PackedSequence};

    // Genome ACGTACGT has colour stream 0,1,3,1,3,1,3,1 (anchored on an
    // implicit leading A). A read with colours 3,1,3 matches the stream at
    // three window positions; its first k-mer is not indexed, so hits come
    // from the (1,3) k-mer ending at read position 2.
    let genome = seq("ACGTACGT");
    let stream = to_colour_stream(&genome);

    let mut cfg = letter_config(ConfigSpec { hit_taboo_len: 1, ..ConfigSpec::default() });
    cfg.mode = SpaceMode::Colour;
    let read = LoadedRead {
        name: "r1".to_string(),
        seq: PackedSequence::from_symbols(&[3, 1, 3]),
        initial_base: Some(1),
    };
    let mut ctx = context(cfg, &["11"], vec![read]);
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&stream, 0, false, &mut ctx, &mut aligner, |_| {});

    // Exact colour windows at stream offsets 2 and 4 clear the threshold;
    // the second window is byte-identical and served from the cache.
    assert_eq!(ctx.reads[0].sw_hits, 2);
    assert_eq!(ctx.stats.filter_calls_bypassed, 1);
    let mut entries = ctx.reads[0].scores.drain();
    entries.sort_by_key(|e| e.g_offset);
    assert_eq!(entries[0].g_offset, 2);
    assert_eq!(entries[1].g_offset, 4);
    assert_eq!(entries[0].score, 300);
}

#[test]
fn scan_state_reset_clears_between_passes() {
    let genome = seq("ACGTACGT");
    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_ne!(ctx.scan_states[0].newest().g_start, NO_HIT);
    ctx.reset_scan_states();
    assert_eq!(ctx.scan_states[0].newest().g_start, NO_HIT);
    assert_eq!(ctx.scan_states[0].last_filter_goff, NO_HIT);
    // Heap contents survive the reset; only transient state clears.
    assert_eq!(ctx.reads[0].scores.len(), 2);
}
