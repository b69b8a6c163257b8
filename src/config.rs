//! Run configuration: scoring parameters, thresholds, and validation.
//!
//! Everything here is resolved once at startup; the scan and alignment
//! layers receive the config read-only. Configuration errors are fatal
//! before any scanning begins.

use anyhow::{bail, Result};

use crate::mapper::args::MapArgs;
use crate::seed::{SeedSet, MAX_SEED_WEIGHT};

/// Read/genome encoding mode. The two modes share the whole pipeline; the
/// differences (colour translation of contigs, the first-k-mer skip when
/// indexing reads) are explicit per-mode rules, not separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceMode {
    Letter,
    Colour,
}

impl SpaceMode {
    /// Colour-space discards a read's first full k-mer: its leading colour
    /// depends on an initial base the genome side cannot know.
    #[inline(always)]
    pub fn skips_first_kmer(self) -> bool {
        matches!(self, SpaceMode::Colour)
    }

    pub fn label(self) -> &'static str {
        match self {
            SpaceMode::Letter => "letter space",
            SpaceMode::Colour => "colour space",
        }
    }
}

/// A threshold that is either a percentage of some base quantity or an
/// absolute value. Stored internally as a signed float: negative means
/// absolute, mirroring how the values travel through the scoring math.
#[derive(Debug, Clone, Copy)]
pub struct RatioOrAbs(f64);

impl RatioOrAbs {
    /// Parse a CLI value. A trailing `%` or a decimal point marks a
    /// percentage; a bare integer is an absolute value.
    pub fn parse(text: &str) -> Result<RatioOrAbs> {
        let trimmed = text.trim();
        let is_pct = trimmed.ends_with('%') || trimmed.contains('.');
        let digits = trimmed.trim_end_matches('%');
        let value: f64 = match digits.parse() {
            Ok(v) => v,
            Err(_) => bail!("invalid threshold value \"{}\"", text),
        };
        if value <= 0.0 {
            bail!("threshold value \"{}\" must be positive", text);
        }
        Ok(RatioOrAbs(if is_pct { value } else { -value }))
    }

    pub fn is_absolute(&self) -> bool {
        self.0 < 0.0
    }

    /// Resolve against a base quantity: absolute values ignore the base,
    /// percentages scale it.
    #[inline]
    pub fn resolve(&self, base: f64) -> f64 {
        if self.0 < 0.0 {
            -self.0
        } else {
            base * (self.0 / 100.0)
        }
    }
}

impl std::fmt::Display for RatioOrAbs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0.0 {
            write!(f, "{}", -self.0)
        } else {
            write!(f, "{:.2}%", self.0)
        }
    }
}

/// Smith-Waterman scoring values. Gap penalties are stored as the (negative)
/// additive values used by the recurrences; `a_*` penalise gaps in the
/// reference, `b_*` gaps in the read.
#[derive(Debug, Clone, Copy)]
pub struct SwParams {
    pub match_value: i32,
    pub mismatch_value: i32,
    pub a_gap_open: i32,
    pub a_gap_extend: i32,
    pub b_gap_open: i32,
    pub b_gap_extend: i32,
}

/// Resolved run configuration, owned by the `ScanContext`.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub mode: SpaceMode,
    pub num_matches: usize,
    pub hit_taboo_len: u32,
    pub num_outputs: usize,
    pub window_len: RatioOrAbs,
    pub sw_vect_threshold: RatioOrAbs,
    pub sw_full_threshold: RatioOrAbs,
    pub kmer_stddev_limit: i32,
    pub use_hash_table: bool,
    pub hash_power: u32,
    pub cache_filter_calls: bool,
    pub scan_forward: bool,
    pub scan_reverse: bool,
    pub anchor_width: Option<u32>,
    pub sw: SwParams,
    pub pretty: bool,
    pub list_unmapped: bool,
    pub progress: bool,
    pub verbose: bool,
}

impl MapperConfig {
    pub fn from_args(mode: SpaceMode, args: &MapArgs, seeds: &SeedSet) -> Result<MapperConfig> {
        let window_len = RatioOrAbs::parse(&args.window_len)?;
        let full_threshold = RatioOrAbs::parse(&args.full_threshold)?;
        // In letter space the vector filter computes the same score the full
        // pass would, so a separate filter threshold would only mislead.
        let vect_threshold = match mode {
            SpaceMode::Letter => full_threshold,
            SpaceMode::Colour => RatioOrAbs::parse(&args.vector_threshold)?,
        };

        if args.num_matches < 1 {
            bail!("invalid number of matches per window");
        }
        if args.num_outputs < 1 {
            bail!("invalid maximum hits per read");
        }
        if !window_len.is_absolute() && window_len.resolve(100.0) < 100.0 {
            bail!("window length must be at least 100% of read length");
        }
        if !full_threshold.is_absolute() && full_threshold.resolve(100.0) > 100.0 {
            bail!("invalid S-W full hit threshold");
        }
        if !vect_threshold.is_absolute() && vect_threshold.resolve(100.0) > 100.0 {
            bail!("invalid S-W vector hit threshold");
        }
        if args.gap_open > 0 || args.gap_open_query.unwrap_or(0) > 0 {
            bail!("invalid gap open penalty (must be <= 0)");
        }
        if args.gap_extend > 0 || args.gap_extend_query.unwrap_or(0) > 0 {
            bail!("invalid gap extend penalty (must be <= 0)");
        }
        if args.hash_table && args.kmer_stddev_limit >= 0 {
            bail!("k-mer frequency pruning cannot be combined with the hashed table");
        }
        if args.hash_table {
            if !(4..=14).contains(&args.hash_power) {
                bail!("hash table power must be in 4..=14");
            }
        } else if seeds.max_weight() > MAX_SEED_WEIGHT {
            bail!(
                "seed weight {} too heavy for a direct table (max {}); use --hash-table",
                seeds.max_weight(),
                MAX_SEED_WEIGHT
            );
        }

        // Neither strand flag set means both strands.
        let (scan_forward, scan_reverse) = match (args.forward_only, args.reverse_only) {
            (false, false) => (true, true),
            (f, r) => (f, r),
        };

        Ok(MapperConfig {
            mode,
            num_matches: args.num_matches,
            hit_taboo_len: args.hit_taboo_len,
            num_outputs: args.num_outputs,
            window_len,
            sw_vect_threshold: vect_threshold,
            sw_full_threshold: full_threshold,
            kmer_stddev_limit: args.kmer_stddev_limit,
            use_hash_table: args.hash_table,
            hash_power: args.hash_power,
            cache_filter_calls: !args.no_cache,
            scan_forward,
            scan_reverse,
            anchor_width: args.anchor_width,
            sw: SwParams {
                match_value: args.match_value,
                mismatch_value: args.mismatch_value,
                a_gap_open: args.gap_open,
                a_gap_extend: args.gap_extend,
                b_gap_open: args.gap_open_query.unwrap_or(args.gap_open),
                b_gap_extend: args.gap_extend_query.unwrap_or(args.gap_extend),
            },
            pretty: args.pretty,
            list_unmapped: args.unmapped,
            progress: args.progress,
            verbose: args.verbose,
        })
    }

    /// Window length in genome positions for a read of `read_len` symbols,
    /// never smaller than the read itself.
    pub fn window_len_for(&self, read_len: usize) -> usize {
        (self.window_len.resolve(read_len as f64) as usize).max(read_len)
    }

    /// Vector-filter acceptance score for a read of `read_len` symbols.
    pub fn vect_threshold_for(&self, read_len: usize) -> i32 {
        self.sw_vect_threshold
            .resolve(f64::from(self.sw.match_value) * read_len as f64) as i32
    }

    /// Final acceptance score for a read of `read_len` symbols.
    pub fn full_threshold_for(&self, read_len: usize) -> i32 {
        self.sw_full_threshold
            .resolve(f64::from(self.sw.match_value) * read_len as f64) as i32
    }
}
