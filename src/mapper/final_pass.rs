//! The final pass: re-stream the genome, refine each read's retained
//! candidates with the full aligner, and emit the hit report.
//!
//! Heap entries are regrouped per (contig, strand) so each contig is loaded
//! exactly once more; within a read's candidate group the expensive
//! alignments run in parallel, and the serial tail does the deterministic
//! sorting, duplicate suppression and printing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::align::{full_align, FullAlignment, VectorAligner};
use crate::config::SpaceMode;
use crate::core::context::ScanContext;
use crate::core::reads::Anchor;
use crate::core::score_heap::ScoreEntry;
use crate::report::{format_header, format_line, format_pretty};
use crate::sequence::fasta::{contig_records, Contig};
use crate::sequence::{reverse_complement, to_colour_stream, PackedSequence};

struct Candidate {
    read_id: u32,
    entry: ScoreEntry,
}

pub fn final_pass(
    genome_files: &[PathBuf],
    ncontigs: usize,
    ctx: &mut ScanContext,
    out_path: Option<&PathBuf>,
) -> Result<()> {
    // Regroup every read's retained entries by contig and strand. Entries
    // for one read stay contiguous within each list.
    let mut forward: Vec<Vec<Candidate>> = (0..ncontigs).map(|_| Vec::new()).collect();
    let mut reverse: Vec<Vec<Candidate>> = (0..ncontigs).map(|_| Vec::new()).collect();
    for read in &mut ctx.reads {
        if read.sw_hits == 0 {
            continue;
        }
        for entry in read.scores.drain() {
            let cn = entry.contig as usize;
            debug_assert!(cn < ncontigs);
            let list = if entry.revcmpl { &mut reverse[cn] } else { &mut forward[cn] };
            list.push(Candidate { read_id: read.id, entry });
        }
    }

    let mut writer: BufWriter<Box<dyn Write>> = match out_path {
        Some(path) => BufWriter::new(Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output file [{}]", path.display()))?,
        )),
        None => BufWriter::new(Box::new(io::stdout())),
    };
    let mut header_done = false;

    let mut cn = 0usize;
    for file in genome_files {
        for contig in contig_records(file)? {
            let contig = contig?;
            if cn >= ncontigs {
                bail!("genome file [{}] grew between scan and final pass", file.display());
            }

            if !forward[cn].is_empty() {
                refine_strand(&contig, false, &forward[cn], ctx, &mut writer, &mut header_done)?;
            }
            if !reverse[cn].is_empty() {
                let rc_start = Instant::now();
                let rc = reverse_complement(&contig.seq, contig.is_rna);
                ctx.stats.revcmpl_time += rc_start.elapsed();
                let rc_contig = Contig { name: contig.name.clone(), seq: rc, is_rna: contig.is_rna };
                refine_strand(&rc_contig, true, &reverse[cn], ctx, &mut writer, &mut header_done)?;
            }
            cn += 1;
        }
    }

    writer.flush()?;
    Ok(())
}

fn refine_strand(
    contig: &Contig,
    revcmpl: bool,
    list: &[Candidate],
    ctx: &mut ScanContext,
    writer: &mut impl Write,
    header_done: &mut bool,
) -> Result<()> {
    let ScanContext { cfg, reads, scan_states, stats, .. } = ctx;
    let genome_len = contig.seq.len();
    let colour_mode = cfg.mode == SpaceMode::Colour;

    // The sequence alignment runs against: letters, or the contig's colour
    // stream, exactly as the scan pass saw it.
    let colour_stream;
    let scan_seq: &PackedSequence = if colour_mode {
        colour_stream = to_colour_stream(&contig.seq);
        &colour_stream
    } else {
        &contig.seq
    };

    let sw = cfg.sw;
    let anchor_width = cfg.anchor_width;

    let mut start = 0usize;
    while start < list.len() {
        let read_id = list[start].read_id;
        let mut end = start + 1;
        while end < list.len() && list[end].read_id == read_id {
            end += 1;
        }
        let group = &list[start..end];
        start = end;

        let read = &mut reads[read_id as usize];
        let state = &scan_states[read_id as usize];
        let window_len = state.window_len as usize;
        let read_len = state.read_len as usize;
        let read_seq = &read.seq;

        // Refine every candidate window of this read in parallel; each
        // item returns its alignment plus the DP cell counts it spent.
        let refined: Vec<(Option<FullAlignment>, u64, u64, u64)> = group
            .par_iter()
            .map(|cand| {
                let entry = &cand.entry;
                let mut goff = entry.g_offset as usize;
                let mut glen = window_len.min(genome_len - goff);
                let mut homing_invocs = 0u64;
                let mut homing_cells = 0u64;

                if !colour_mode {
                    // In letter space the full aligner reproduces the filter
                    // score exactly, so a few extra (cheap) filter calls can
                    // home in on a half-length window and shrink the much
                    // slower traceback alignment.
                    let trylen = glen / 2;
                    let tryoff = goff + trylen / 2;
                    if trylen > 0 {
                        let mut vector = VectorAligner::new(sw);
                        let score = vector.score(scan_seq, tryoff, trylen, read_seq);
                        homing_invocs = vector.invocations;
                        homing_cells = vector.cells;
                        if score == entry.score {
                            goff = tryoff;
                            glen = trylen;
                        }
                    }
                }

                let band = if colour_mode {
                    anchor_width.map(|w| anchor_band(&entry.anchors, w))
                } else {
                    None
                };

                let aln = full_align(scan_seq, goff, glen, read_seq, &sw, band, colour_mode)
                    .map(|mut aln| {
                        if !colour_mode && band.is_none() {
                            debug_assert_eq!(aln.score, entry.score);
                        }
                        aln.genome_start += goff;
                        aln.genome_end += goff;
                        aln
                    });
                (aln, (glen * read_len) as u64, homing_invocs, homing_cells)
            })
            .collect();

        let mut alignments: Vec<FullAlignment> = Vec::with_capacity(refined.len());
        for (aln, full_cells, homing_invocs, homing_cells) in refined {
            stats.full_invocations += 1;
            stats.full_cells += full_cells;
            stats.vector_invocations += homing_invocs;
            stats.vector_cells += homing_cells;
            if let Some(aln) = aln {
                alignments.push(aln);
            }
        }

        // Deterministic output order: best score first, then leftmost on
        // the genome, then most matches.
        alignments.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.genome_start.cmp(&b.genome_start))
                .then(b.matches.cmp(&a.matches))
        });

        let threshold = cfg.full_threshold_for(read_len);
        let mut last: Option<&FullAlignment> = None;
        for aln in &alignments {
            let dup = last.is_some_and(|prev| prev.same_alignment(aln));
            if dup {
                stats.duplicate_hits += 1;
            }
            if !dup && aln.score >= threshold {
                if !*header_done {
                    writeln!(writer, "{}", format_header())?;
                    *header_done = true;
                }
                writeln!(
                    writer,
                    "{}",
                    format_line(&read.name, &contig.name, revcmpl, aln, genome_len, read_len)
                )?;
                if cfg.pretty {
                    writeln!(
                        writer,
                        "{}",
                        format_pretty(
                            &read.name,
                            &contig.name,
                            revcmpl,
                            aln,
                            genome_len,
                            read.initial_base,
                        )
                    )?;
                }
                read.final_matches += 1;
            }
            last = Some(aln);
        }
    }

    Ok(())
}

/// Diagonal range implied by a candidate's seed anchors, widened by the
/// configured extra width on both sides.
fn anchor_band(anchors: &[Anchor], width: u32) -> (i64, i64) {
    let mut lo = i64::MAX;
    let mut hi = i64::MIN;
    for a in anchors {
        let d = a.x - a.y;
        lo = lo.min(d);
        hi = hi.max(d);
    }
    if lo > hi {
        // No anchors survived; fall back to an unconstrained band.
        (i64::MIN / 2, i64::MAX / 2)
    } else {
        (lo - i64::from(width), hi + i64::from(width))
    }
}
