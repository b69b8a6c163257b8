//! Scan statistics, accumulated across the whole run and printed at exit.

use std::time::Duration;

#[derive(Debug, Default)]
pub struct ScanStats {
    // Index construction
    pub kmers_indexed: u64,
    pub kmers_pruned: u64,

    // Spaced-seed scan
    pub kmer_lists_scanned: u64,
    pub kmer_list_entries_scanned: u64,
    pub shortest_scanned_kmer_list: u64,
    pub longest_scanned_kmer_list: u64,
    pub colinearity_checks: u64,

    // Vector filter
    pub filter_calls: u64,
    pub filter_calls_bypassed: u64,
    pub filter_passes: u64,
    pub vector_invocations: u64,
    pub vector_cells: u64,

    // Final refinement
    pub full_invocations: u64,
    pub full_cells: u64,
    pub duplicate_hits: u64,

    // Timing
    pub load_time: Duration,
    pub scan_time: Duration,
    pub revcmpl_time: Duration,
}

impl ScanStats {
    pub fn new() -> ScanStats {
        ScanStats { shortest_scanned_kmer_list: u64::MAX, ..ScanStats::default() }
    }

    pub fn note_kmer_list(&mut self, entries: u64) {
        self.kmer_lists_scanned += 1;
        if entries > 0 {
            self.kmer_list_entries_scanned += entries;
            self.shortest_scanned_kmer_list = self.shortest_scanned_kmer_list.min(entries);
            self.longest_scanned_kmer_list = self.longest_scanned_kmer_list.max(entries);
        }
    }

    pub fn print(&self, reads_matched: u64, total_matches: u64, nreads: usize) {
        let avg_list = if self.kmer_lists_scanned == 0 {
            0.0
        } else {
            self.kmer_list_entries_scanned as f64 / self.kmer_lists_scanned as f64
        };
        let shortest = if self.shortest_scanned_kmer_list == u64::MAX {
            0
        } else {
            self.shortest_scanned_kmer_list
        };

        eprintln!();
        eprintln!("Statistics:");
        eprintln!("    Spaced Seed Scan:");
        eprintln!("        Run-time:               {:.2} seconds", self.scan_time.as_secs_f64());
        eprintln!("        Total Kmers:            {}", self.kmers_indexed);
        eprintln!("        Pruned Kmers:           {}", self.kmers_pruned);
        eprintln!("        Minimal Reads/Kmer:     {}", shortest);
        eprintln!("        Maximal Reads/Kmer:     {}", self.longest_scanned_kmer_list);
        eprintln!("        Kmer List Entries:      {}", self.kmer_list_entries_scanned);
        eprintln!("        Average Reads/Kmer:     {:.2}", avg_list);
        eprintln!("        Colinearity Checks:     {}", self.colinearity_checks);
        eprintln!();
        eprintln!("    Vector Smith-Waterman:");
        eprintln!("        Invocations:            {}", self.vector_invocations);
        eprintln!("        Bypassed Calls:         {}", self.filter_calls_bypassed);
        eprintln!("        Passed Threshold:       {}", self.filter_passes);
        eprintln!("        Cells Computed:         {:.2} million", self.vector_cells as f64 / 1.0e6);
        eprintln!();
        eprintln!("    Scalar Smith-Waterman:");
        eprintln!("        Invocations:            {}", self.full_invocations);
        eprintln!("        Cells Computed:         {:.2} million", self.full_cells as f64 / 1.0e6);
        eprintln!();
        eprintln!("    Miscellaneous:");
        eprintln!("        Load Time:              {:.2} seconds", self.load_time.as_secs_f64());
        eprintln!("        Revcmpl. Time:          {:.2} seconds", self.revcmpl_time.as_secs_f64());
        eprintln!();
        eprintln!("    General:");
        eprintln!(
            "        Reads Matched:          {}    ({:.4}%)",
            reads_matched,
            if nreads == 0 { 0.0 } else { reads_matched as f64 / nreads as f64 * 100.0 }
        );
        eprintln!("        Total Matches:          {}", total_matches);
        eprintln!(
            "        Avg Hits/Matched Read:  {:.2}",
            if reads_matched == 0 { 0.0 } else { total_matches as f64 / reads_matched as f64 }
        );
        eprintln!("        Duplicate Hits Pruned:  {}", self.duplicate_hits);
    }
}
