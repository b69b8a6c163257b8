//! Unit tests for the vector-filter cache against the real aligner: the
//! second scoring of a byte-identical window must not invoke it.

use srmap::align::VectorAligner;
use srmap::core::filter_cache::{hash_window, VectorAlignmentCache};

use crate::unit::helpers::{seq, sw_params};

#[test]
fn identical_windows_bypass_the_aligner() {
    // Two copies of the same 9-symbol region back to back.
    let genome = seq("ACGTATTGGACGTATTGG");
    let read = seq("ACGTATT");
    let mut aligner = VectorAligner::new(sw_params());
    let mut cache = VectorAlignmentCache::new();

    let (off1, off2, len) = (0usize, 9usize, 9usize);
    assert_eq!(hash_window(&genome, off1, len), hash_window(&genome, off2, len));

    let h1 = hash_window(&genome, off1, len);
    let s1 = match cache.lookup(h1) {
        Some(s) => s,
        None => {
            let s = aligner.score(&genome, off1, len, &read);
            cache.insert(h1, s);
            s
        }
    };
    assert_eq!(aligner.invocations, 1);

    let h2 = hash_window(&genome, off2, len);
    let s2 = cache.lookup(h2).expect("second identical window must hit the cache");
    assert_eq!(aligner.invocations, 1);
    assert_eq!(s1, s2);
}

#[test]
fn different_windows_do_not_collide() {
    let genome = seq("ACGTACGTGGGGCCCCTTTT");
    let mut cache = VectorAlignmentCache::new();
    let h1 = hash_window(&genome, 0, 8);
    let h2 = hash_window(&genome, 8, 8);
    assert_ne!(h1, h2);
    cache.insert(h1, 111);
    cache.insert(h2, 222);
    assert_eq!(cache.lookup(h1), Some(111));
    assert_eq!(cache.lookup(h2), Some(222));
    assert_eq!(cache.occupancy(), 2);
}
