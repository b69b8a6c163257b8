use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Reads file (FASTA; colour-space reads begin with an initial letter base)
    pub reads: PathBuf,

    /// Genome contig file(s) (FASTA)
    #[arg(required = true)]
    pub genomes: Vec<PathBuf>,

    /// Spaced seed pattern(s), e.g. 11110111 (comma-separated for several)
    #[arg(short = 's', long = "seed", value_delimiter = ',')]
    pub seeds: Vec<String>,

    /// Seed matches per window before the filter may run
    #[arg(short = 'n', long, default_value_t = 2)]
    pub num_matches: usize,

    /// Minimum genome distance between recorded hits for one read
    #[arg(short = 't', long, default_value_t = 4)]
    pub hit_taboo_len: u32,

    /// Candidate window length: percentage of read length (e.g. 115.0) or
    /// absolute bases (bare integer)
    #[arg(short = 'w', long, default_value = "115.0")]
    pub window_len: String,

    /// Maximum retained hits per read
    #[arg(short = 'o', long, default_value_t = 100)]
    pub num_outputs: usize,

    /// Prune k-mer keys above mean + N standard deviations (negative = off)
    #[arg(short = 'd', long, default_value_t = -1, allow_hyphen_values = true)]
    pub kmer_stddev_limit: i32,

    /// S-W match value
    #[arg(short = 'm', long, default_value_t = 100)]
    pub match_value: i32,

    /// S-W mismatch value
    #[arg(short = 'i', long, default_value_t = -70, allow_hyphen_values = true)]
    pub mismatch_value: i32,

    /// S-W gap open penalty (reference)
    #[arg(short = 'g', long, default_value_t = -100, allow_hyphen_values = true)]
    pub gap_open: i32,

    /// S-W gap extend penalty (reference)
    #[arg(short = 'e', long, default_value_t = -70, allow_hyphen_values = true)]
    pub gap_extend: i32,

    /// S-W gap open penalty (query); defaults to the reference penalty
    #[arg(short = 'q', long, allow_hyphen_values = true)]
    pub gap_open_query: Option<i32>,

    /// S-W gap extend penalty (query); defaults to the reference penalty
    #[arg(short = 'f', long, allow_hyphen_values = true)]
    pub gap_extend_query: Option<i32>,

    /// Vector filter threshold: percentage of the perfect score or absolute
    /// (colour space only; letter space reuses the full threshold)
    #[arg(short = 'v', long, default_value = "70.0")]
    pub vector_threshold: String,

    /// Final hit threshold: percentage of the perfect score or absolute
    #[arg(long, default_value = "75.0")]
    pub full_threshold: String,

    /// Use a fixed-size hashed k-mer table instead of direct indexing
    /// (required for seed weights above the direct-table limit)
    #[arg(short = 'H', long)]
    pub hash_table: bool,

    /// Hashed table power: the table holds 4^H keys
    #[arg(long, default_value_t = 12)]
    pub hash_power: u32,

    /// Only scan the forward strand
    #[arg(short = 'F', long, conflicts_with = "reverse_only")]
    pub forward_only: bool,

    /// Only scan the reverse-complement strand
    #[arg(short = 'C', long)]
    pub reverse_only: bool,

    /// Band the final alignment around the seed anchors, +/- this width
    #[arg(short = 'A', long)]
    pub anchor_width: Option<u32>,

    /// Disable the per-read vector-filter result cache
    #[arg(short = 'Z', long)]
    pub no_cache: bool,

    /// Print progress bars while loading and scanning
    #[arg(short = 'B', long)]
    pub progress: bool,

    /// Pretty-print alignments beneath each hit line
    #[arg(short = 'P', long)]
    pub pretty: bool,

    /// List unmapped read names after the hits
    #[arg(short = 'U', long)]
    pub unmapped: bool,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    pub num_threads: usize,

    /// Write hits to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print settings and extra diagnostics to stderr
    #[arg(long)]
    pub verbose: bool,
}
