//! Whole-pipeline scenarios: scan a small genome, then refine and report
//! through the final pass against a real FASTA file on disk.

use std::fs;
use std::path::PathBuf;

use srmap::align::VectorAligner;
use srmap::core::scan::scan_contig;
use srmap::mapper::final_pass::final_pass;
use srmap::sequence::fasta::contig_records;

use crate::unit::helpers::{context, letter_config, loaded_read, seq, sw_params, ConfigSpec};

#[test]
fn exact_read_is_found_at_both_occurrences() {
    // Seed 111, genome ACGTACGT, read CGT: matches start at (1-based)
    // genome offsets 2 and 6 on the forward strand.
    let genome = seq("ACGTACGT");
    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});

    assert_eq!(ctx.reads[0].sw_hits, 2);
    let mut entries = ctx.reads[0].scores.drain();
    entries.sort_by_key(|e| e.g_offset);
    assert_eq!(entries.len(), 2);
    // A perfect 3-mer match scores 3 * match_value and clears the 75%
    // threshold at both windows.
    assert_eq!(entries[0].score, 300);
    assert_eq!(entries[1].score, 300);
    assert_eq!(entries[0].g_offset, 1);
    assert_eq!(entries[1].g_offset, 5);
}

#[test]
fn pruned_index_produces_no_hits() {
    let genome = seq("ACGTACGT");
    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );
    // With a zero stddev limit the read's only k-mer key sits above the
    // per-seed mean and is dropped outright.
    let pruned = ctx.index.prune(0, false);
    assert!(pruned > 0);
    let mut aligner = VectorAligner::new(sw_params());
    scan_contig(&genome, 0, false, &mut ctx, &mut aligner, |_| {});
    assert_eq!(ctx.reads[0].sw_hits, 0);
    assert!(ctx.reads[0].scores.is_empty());
}

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("srmap_{}_{}", tag, std::process::id()))
}

#[test]
fn final_pass_reports_both_hits_in_order() {
    let genome_fa = temp_path("genome.fa");
    let out_path = temp_path("hits.out");
    fs::write(&genome_fa, ">c1 test contig\nACGTACGT\n").unwrap();

    let mut ctx = context(
        letter_config(ConfigSpec::default()),
        &["111"],
        vec![loaded_read("r1", "CGT")],
    );

    // Scan from the same file the final pass will re-stream.
    let genome_files = vec![genome_fa.clone()];
    let mut aligner = VectorAligner::new(sw_params());
    let mut ncontigs = 0usize;
    for contig in contig_records(&genome_fa).unwrap() {
        let contig = contig.unwrap();
        scan_contig(&contig.seq, ncontigs as u32, false, &mut ctx, &mut aligner, |_| {});
        ctx.reset_scan_states();
        ncontigs += 1;
    }
    assert_eq!(ncontigs, 1);
    assert_eq!(ctx.reads[0].sw_hits, 2);

    final_pass(&genome_files, ncontigs, &mut ctx, Some(&out_path)).unwrap();

    let output = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("#FORMAT:"));
    assert_eq!(lines[1], "r1\tc1\t+\t2\t4\t1\t3\t3\t300\t3M");
    assert_eq!(lines[2], "r1\tc1\t+\t6\t8\t1\t3\t3\t300\t3M");
    assert_eq!(ctx.reads[0].final_matches, 2);

    fs::remove_file(&genome_fa).ok();
    fs::remove_file(&out_path).ok();
}

#[test]
fn reverse_strand_candidates_are_reported_on_flipped_coordinates() {
    let genome_fa = temp_path("rcgenome.fa");
    let out_path = temp_path("rchits.out");
    // Forward contig has no CCCGGG, but its reverse complement does.
    fs::write(&genome_fa, ">c1\nTTTCCCGGGTTT\n").unwrap();

    let mut ctx = context(
        letter_config(ConfigSpec { vect_threshold: "90.0", ..ConfigSpec::default() }),
        &["111111"],
        vec![loaded_read("r1", "CCCGGG")],
    );

    let mut aligner = VectorAligner::new(sw_params());
    let contig = contig_records(&genome_fa).unwrap().next().unwrap().unwrap();
    let rc = srmap::sequence::reverse_complement(&contig.seq, contig.is_rna);
    scan_contig(&rc, 0, true, &mut ctx, &mut aligner, |_| {});
    ctx.reset_scan_states();
    assert_eq!(ctx.reads[0].sw_hits, 1);

    final_pass(&[genome_fa.clone()], 1, &mut ctx, Some(&out_path)).unwrap();
    let output = fs::read_to_string(&out_path).unwrap();
    let hit = output.lines().nth(1).expect("one hit line expected");
    let fields: Vec<&str> = hit.split('\t').collect();
    assert_eq!(fields[0], "r1");
    assert_eq!(fields[2], "-");
    // rc(TTTCCCGGGTTT) = AAACCCGGGAAA: match at rc positions 4..9, which
    // flips back to forward positions 4..9 as well (1-based).
    assert_eq!(fields[3], "4");
    assert_eq!(fields[4], "9");
    assert_eq!(fields[8], "600");

    fs::remove_file(&genome_fa).ok();
    fs::remove_file(&out_path).ok();
}
