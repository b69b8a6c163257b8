//! Hit rendering: the tab-separated output line and the optional pretty
//! alignment block.

use crate::align::{EditOp, FullAlignment};
use crate::sequence::letter_char;

pub fn format_header() -> &'static str {
    "#FORMAT: readname contigname strand contigstart contigend readstart readend readlength score editstring"
}

/// Render a run-length edit string: `M` match, `X` mismatch, `I` read
/// insertion, `D` read deletion, e.g. `18M1X9M2D4M`.
pub fn edit_string(ops: &[EditOp]) -> String {
    let mut out = String::new();
    let mut run: Option<(EditOp, usize)> = None;
    for &op in ops {
        match run {
            Some((prev, n)) if prev == op => run = Some((prev, n + 1)),
            Some((prev, n)) => {
                push_run(&mut out, prev, n);
                run = Some((op, 1));
            }
            None => run = Some((op, 1)),
        }
    }
    if let Some((op, n)) = run {
        push_run(&mut out, op, n);
    }
    out
}

fn push_run(out: &mut String, op: EditOp, n: usize) {
    let c = match op {
        EditOp::Match => 'M',
        EditOp::Mismatch => 'X',
        EditOp::Ins => 'I',
        EditOp::Del => 'D',
    };
    out.push_str(&n.to_string());
    out.push(c);
}

/// One hit line. `aln` carries contig-absolute 0-based inclusive
/// coordinates on the scanned strand; reverse-complement hits are flipped
/// back onto forward-strand coordinates here.
pub fn format_line(
    read_name: &str,
    contig_name: &str,
    revcmpl: bool,
    aln: &FullAlignment,
    genome_len: usize,
    read_len: usize,
) -> String {
    let (contig_start, contig_end) = strand_coords(aln, revcmpl, genome_len);
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        read_name,
        contig_name,
        if revcmpl { '-' } else { '+' },
        contig_start,
        contig_end,
        aln.read_start + 1,
        aln.read_end + 1,
        read_len,
        aln.score,
        edit_string(&aln.edit),
    )
}

fn strand_coords(aln: &FullAlignment, revcmpl: bool, genome_len: usize) -> (usize, usize) {
    if revcmpl {
        (genome_len - aln.genome_end, genome_len - aln.genome_start)
    } else {
        (aln.genome_start + 1, aln.genome_end + 1)
    }
}

/// Multi-line alignment block for `--pretty`. Colour-space reads print
/// their initial base ahead of the colour row.
pub fn format_pretty(
    read_name: &str,
    contig_name: &str,
    revcmpl: bool,
    aln: &FullAlignment,
    genome_len: usize,
    initial_base: Option<u8>,
) -> String {
    let (contig_start, contig_end) = strand_coords(aln, revcmpl, genome_len);
    let midline: String = aln
        .edit
        .iter()
        .map(|op| match op {
            EditOp::Match => '|',
            EditOp::Mismatch => ' ',
            EditOp::Ins | EditOp::Del => ' ',
        })
        .collect();
    let read_prefix = match initial_base {
        Some(b) => format!("({})", letter_char(b)),
        None => String::new(),
    };
    format!(
        "\nALIGNMENT: [{}] vs [{}] strand {} {}..{} score {}\n  G: {}\n     {}\n  R: {}{}\n",
        read_name,
        contig_name,
        if revcmpl { '-' } else { '+' },
        contig_start,
        contig_end,
        aln.score,
        aln.db_align,
        midline,
        read_prefix,
        aln.qr_align,
    )
}
