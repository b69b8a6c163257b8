//! The mapping pipeline: load reads, build the index, stream every contig
//! on both strands, then hand the retained candidates to the final pass.

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::align::VectorAligner;
use crate::config::{MapperConfig, SpaceMode};
use crate::core::context::ScanContext;
use crate::core::kmer_index::{KeyScheme, KmerIndex};
use crate::core::scan::scan_contig;
use crate::mapper::args::MapArgs;
use crate::mapper::final_pass::final_pass;
use crate::seed::SeedSet;
use crate::sequence::fasta::{contig_records, load_reads, Contig};
use crate::sequence::{reverse_complement, to_colour_stream, PackedSequence};
use crate::stats::ScanStats;

pub fn run(mode: SpaceMode, args: MapArgs) -> Result<()> {
    let seeds = SeedSet::from_patterns(&args.seeds)?;
    let cfg = MapperConfig::from_args(mode, &args, &seeds)?;

    let num_threads =
        if args.num_threads == 0 { num_cpus::get() } else { args.num_threads };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("failed to build thread pool")?;

    if cfg.verbose {
        print_settings(&cfg, &seeds);
    }

    let mut stats = ScanStats::new();

    // Load reads.
    let load_start = Instant::now();
    let spinner = if cfg.progress {
        let s = ProgressBar::new_spinner();
        s.set_message("Loading reads...");
        Some(s)
    } else {
        None
    };
    let loaded = load_reads(&args.reads, mode, |n| {
        if let Some(s) = &spinner {
            s.set_message(format!("Loading reads... {}", n));
            s.tick();
        }
    })?;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let nreads = loaded.len();
    let total_symbols: usize = loaded.iter().map(|r| r.seq.len()).sum();

    let (reads, scan_states) = ScanContext::prepare_reads(&cfg, loaded);

    // Build the k-mer index, one table per seed.
    let scheme = if cfg.use_hash_table {
        KeyScheme::hashed(&seeds, cfg.hash_power)
    } else {
        KeyScheme::direct()
    };
    let index = KmerIndex::build(&reads, &seeds, scheme, mode);
    stats.kmers_indexed = index.total_entries();
    stats.load_time = load_start.elapsed();

    eprintln!(
        "- Loaded {} {} in {} reads ({} kmers)",
        total_symbols,
        match mode {
            SpaceMode::Letter => "letters",
            SpaceMode::Colour => "colours",
        },
        nreads,
        stats.kmers_indexed
    );

    let mut ctx = ScanContext { cfg, seeds, index, reads, scan_states, stats };
    ctx.stats.kmers_pruned = ctx.index.prune(ctx.cfg.kmer_stddev_limit, ctx.cfg.verbose);

    // Scan every contig, forward and reverse-complement.
    let mut aligner = VectorAligner::new(ctx.cfg.sw);
    let mut ncontigs = 0usize;
    for (fi, file) in args.genomes.iter().enumerate() {
        eprintln!(
            "- Processing contig file [{}] ({} of {})",
            file.display(),
            fi + 1,
            args.genomes.len()
        );
        for contig in contig_records(file)? {
            let contig = contig?;
            eprintln!(
                "  - Loaded {} letters from contig \"{}\"",
                contig.seq.len(),
                contig.name
            );
            scan_one_contig(&contig, ncontigs as u32, &mut ctx, &mut aligner);
            ncontigs += 1;
        }
    }

    eprintln!();
    eprintln!("Generating output...");
    final_pass(&args.genomes, ncontigs, &mut ctx, args.out.as_ref())?;

    if ctx.cfg.list_unmapped {
        println!("#");
        println!("#UNMAPPED READS:");
        println!("#");
        for read in &ctx.reads {
            if read.final_matches == 0 {
                println!("{}", read.name);
            }
        }
    }

    let reads_matched = ctx.reads.iter().filter(|r| r.final_matches > 0).count() as u64;
    let total_matches: u64 = ctx.reads.iter().map(|r| u64::from(r.final_matches)).sum();
    ctx.stats.print(reads_matched, total_matches, nreads);

    Ok(())
}

/// Scan one contig on the configured strands, resetting the per-read scan
/// state between passes. The heaps keep accumulating; only the transient
/// hit rings reset.
fn scan_one_contig(
    contig: &Contig,
    contig_num: u32,
    ctx: &mut ScanContext,
    aligner: &mut VectorAligner,
) {
    let scan_start = Instant::now();

    if ctx.cfg.scan_forward {
        let colour_stream;
        let scan_seq: &PackedSequence = match ctx.cfg.mode {
            SpaceMode::Letter => &contig.seq,
            SpaceMode::Colour => {
                colour_stream = to_colour_stream(&contig.seq);
                &colour_stream
            }
        };
        scan_with_progress(scan_seq, contig_num, false, ctx, aligner);
        ctx.reset_scan_states();
    }

    if ctx.cfg.scan_reverse {
        if ctx.cfg.verbose {
            eprintln!("    - Processing reverse complement");
        }
        let rc_start = Instant::now();
        let rc = reverse_complement(&contig.seq, contig.is_rna);
        ctx.stats.revcmpl_time += rc_start.elapsed();

        let colour_stream;
        let scan_seq: &PackedSequence = match ctx.cfg.mode {
            SpaceMode::Letter => &rc,
            SpaceMode::Colour => {
                colour_stream = to_colour_stream(&rc);
                &colour_stream
            }
        };
        scan_with_progress(scan_seq, contig_num, true, ctx, aligner);
        ctx.reset_scan_states();
    }

    ctx.stats.scan_time += scan_start.elapsed();
}

fn scan_with_progress(
    scan_seq: &PackedSequence,
    contig_num: u32,
    revcmpl: bool,
    ctx: &mut ScanContext,
    aligner: &mut VectorAligner,
) {
    let bar = if ctx.cfg.progress {
        let b = ProgressBar::new(scan_seq.len() as u64);
        b.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap(),
        );
        Some(b)
    } else {
        None
    };

    scan_contig(scan_seq, contig_num, revcmpl, ctx, aligner, |pos| {
        if let Some(b) = &bar {
            b.set_position(pos as u64);
        }
    });

    if let Some(b) = bar {
        b.finish_and_clear();
    }
}

fn print_settings(cfg: &MapperConfig, seeds: &SeedSet) {
    eprintln!("Settings ({}):", cfg.mode.label());
    for (sn, seed) in seeds.iter().enumerate() {
        if sn == 0 {
            eprintln!(
                "    Spaced Seed{}:                         {} span:{} weight:{}",
                if seeds.len() == 1 { " " } else { "s" },
                seed.pattern(),
                seed.span,
                seed.weight
            );
        } else {
            eprintln!(
                "                                          {} span:{} weight:{}",
                seed.pattern(),
                seed.span,
                seed.weight
            );
        }
    }
    eprintln!("    Seed Matches per Window:              {}", cfg.num_matches);
    eprintln!("    Seed Hit Taboo Length:                {}", cfg.hit_taboo_len);
    eprintln!("    Seed Window Length:                   {}", cfg.window_len);
    eprintln!("    Maximum Hits per Read:                {}", cfg.num_outputs);
    eprintln!(
        "    Kmer Std. Deviation Limit:            {}{}",
        cfg.kmer_stddev_limit,
        if cfg.kmer_stddev_limit < 0 { " (None)" } else { "" }
    );
    eprintln!();
    eprintln!("    S-W Match Value:                      {}", cfg.sw.match_value);
    eprintln!("    S-W Mismatch Value:                   {}", cfg.sw.mismatch_value);
    eprintln!("    S-W Gap Open Penalty (Ref):           {}", cfg.sw.a_gap_open);
    eprintln!("    S-W Gap Open Penalty (Qry):           {}", cfg.sw.b_gap_open);
    eprintln!("    S-W Gap Extend Penalty (Ref):         {}", cfg.sw.a_gap_extend);
    eprintln!("    S-W Gap Extend Penalty (Qry):         {}", cfg.sw.b_gap_extend);
    eprintln!("    S-W Vector Hit Threshold:             {}", cfg.sw_vect_threshold);
    eprintln!("    S-W Full Hit Threshold:               {}", cfg.sw_full_threshold);
    eprintln!(
        "    Hash filter SW calls:                 {}",
        if cfg.cache_filter_calls { "yes" } else { "no" }
    );
    if cfg.use_hash_table {
        eprintln!("    Hashed Kmer Table Power:              {}", cfg.hash_power);
    }
    eprintln!();
}
