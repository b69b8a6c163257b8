//! FASTA loading for reads and genome contigs.
//!
//! Parsing proper is delegated to `bio::io::fasta`; this module owns the
//! translation into `PackedSequence` and the mode-specific validation
//! (colour-space reads carry a leading initial letter base).

use std::path::Path;

use anyhow::{bail, Context, Result};
use bio::io::fasta;

use crate::config::SpaceMode;
use crate::sequence::{colour_code, letter_code, PackedSequence, BASE_U, MAX_READ_LEN};

/// One genome contig, always letter-space.
#[derive(Debug, Clone)]
pub struct Contig {
    pub name: String,
    pub seq: PackedSequence,
    pub is_rna: bool,
}

/// One loaded query read. In colour-space mode `seq` holds the colour codes
/// and `initial_base` the leading letter the colours are anchored to.
#[derive(Debug, Clone)]
pub struct LoadedRead {
    pub name: String,
    pub seq: PackedSequence,
    pub initial_base: Option<u8>,
}

fn record_name(record: &fasta::Record) -> String {
    record.id().to_string()
}

fn translate_letters(name: &str, raw: &[u8]) -> Result<(PackedSequence, bool)> {
    let mut symbols = Vec::with_capacity(raw.len());
    let mut is_rna = false;
    for &b in raw {
        let code = letter_code(b)
            .with_context(|| format!("invalid character {:?} in sequence [{}]", b as char, name))?;
        is_rna |= code == BASE_U;
        symbols.push(code);
    }
    Ok((PackedSequence::from_symbols(&symbols), is_rna))
}

/// Stream the contigs of a genome file in record order.
pub fn contig_records(path: &Path) -> Result<impl Iterator<Item = Result<Contig>>> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("failed to open genome file [{}]", path.display()))?;
    Ok(reader.records().map(|record| {
        let record = record.context("malformed FASTA record")?;
        let name = record_name(&record);
        if record.seq().is_empty() {
            bail!("contig [{}] has no sequence", name);
        }
        let (seq, is_rna) = translate_letters(&name, record.seq())?;
        Ok(Contig { name, seq, is_rna })
    }))
}

/// Load all reads from a FASTA file in the given encoding mode.
///
/// `progress` is invoked with the running read count so the caller can drive
/// a spinner without this module knowing about terminals.
pub fn load_reads<F>(path: &Path, mode: SpaceMode, mut progress: F) -> Result<Vec<LoadedRead>>
where
    F: FnMut(usize),
{
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("failed to open reads file [{}]", path.display()))?;

    let mut reads = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed FASTA record in reads file")?;
        let name = record_name(&record);
        let raw = record.seq();
        if raw.is_empty() {
            bail!("read [{}] has no sequence", name);
        }

        let read = match mode {
            SpaceMode::Letter => {
                let (seq, _) = translate_letters(&name, raw)?;
                LoadedRead { name, seq, initial_base: None }
            }
            SpaceMode::Colour => {
                // The record begins with the initial letter base; the colours
                // that follow are relative to it.
                let initbp = letter_code(raw[0]).filter(|&c| c <= 3).with_context(|| {
                    format!("colour-space read [{}] must start with an initial A/C/G/T base", name)
                })?;
                if raw.len() < 2 {
                    bail!("read [{}] has no colours after the initial base", name);
                }
                let mut symbols = Vec::with_capacity(raw.len() - 1);
                for &b in &raw[1..] {
                    let code = colour_code(b).with_context(|| {
                        format!(
                            "invalid colour {:?} in read [{}] (mixed up letter and colour space?)",
                            b as char, name
                        )
                    })?;
                    symbols.push(code);
                }
                LoadedRead {
                    name,
                    seq: PackedSequence::from_symbols(&symbols),
                    initial_base: Some(initbp),
                }
            }
        };

        if read.seq.len() > MAX_READ_LEN {
            bail!("read [{}] is longer than {} symbols", read.name, MAX_READ_LEN);
        }

        reads.push(read);
        if reads.len() % 1024 == 0 {
            progress(reads.len());
        }
    }

    Ok(reads)
}
