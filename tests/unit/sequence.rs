//! Unit tests for packed sequences and encoding translation.

use srmap::sequence::{
    colour_code, letter_code, reverse_complement, to_colour_stream, PackedSequence, BASE_A,
    BASE_C, BASE_G, BASE_N, BASE_T, BASE_U,
};

use crate::unit::helpers::seq;

#[test]
fn letter_codes_cover_alphabet() {
    assert_eq!(letter_code(b'a'), Some(BASE_A));
    assert_eq!(letter_code(b'T'), Some(BASE_T));
    assert_eq!(letter_code(b'u'), Some(BASE_U));
    assert_eq!(letter_code(b'N'), Some(BASE_N));
    assert_eq!(letter_code(b'5'), None);
    assert_eq!(letter_code(b'\t'), None);
}

#[test]
fn colour_codes_cover_alphabet() {
    assert_eq!(colour_code(b'0'), Some(0));
    assert_eq!(colour_code(b'3'), Some(3));
    assert_eq!(colour_code(b'4'), Some(BASE_N));
    assert_eq!(colour_code(b'n'), Some(BASE_N));
    assert_eq!(colour_code(b'A'), None);
}

#[test]
fn extraction_is_stable_across_word_boundaries() {
    let s = seq("ACGTACGTACGTACGTACGT");
    for (i, expect) in [BASE_A, BASE_C, BASE_G, BASE_T].iter().cycle().take(20).enumerate() {
        assert_eq!(s.get(i), *expect);
    }
}

#[test]
fn reverse_complement_round_trips() {
    let s = seq("ACCGTTAGN");
    let rc = reverse_complement(&s, false);
    let back = reverse_complement(&rc, false);
    assert_eq!(back, s);
}

#[test]
fn reverse_complement_rna_writes_uracil() {
    let s = seq("AU");
    let rc = reverse_complement(&s, true);
    // complement(U) = A, complement(A) = U; reversed.
    assert_eq!(rc.symbols().collect::<Vec<_>>(), vec![BASE_U, BASE_A]);
}

#[test]
fn colour_stream_matches_between_read_and_genome() {
    // A read's colours (past its first) must equal the genome's colour
    // stream over the matching region, whatever base precedes the match.
    let genome = seq("TTGACGTACC");
    let stream = to_colour_stream(&genome);
    // Transitions inside ACGTA: A->C=1, C->G=3, G->T=1, T->A=3.
    let inner: Vec<u8> = (4..8).map(|i| stream.get(i)).collect();
    assert_eq!(inner, vec![1, 3, 1, 3]);
}

#[test]
fn empty_sequence() {
    let s = PackedSequence::from_symbols(&[]);
    assert!(s.is_empty());
    assert_eq!(s.len(), 0);
    assert_eq!(s.symbols().count(), 0);
}
