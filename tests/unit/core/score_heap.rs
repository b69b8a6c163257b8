//! Unit tests for the bounded score heap (integration-level sequences; the
//! structural properties live next to the implementation).

use srmap::core::score_heap::{ScoreEntry, ScoreHeap};

fn entry(score: i32, g_offset: u32) -> ScoreEntry {
    ScoreEntry { score, g_offset, contig: 0, revcmpl: false, anchors: Vec::new() }
}

#[test]
fn retains_highest_regardless_of_push_order() {
    let orders: [&[i32]; 3] =
        [&[5, 9, 2, 8, 7], &[7, 8, 2, 9, 5], &[2, 5, 7, 8, 9]];
    for order in orders {
        let mut heap = ScoreHeap::new(3);
        for &s in order {
            heap.push(entry(s, 0));
        }
        let mut retained: Vec<i32> = heap.drain().iter().map(|e| e.score).collect();
        retained.sort_unstable();
        assert_eq!(retained, vec![7, 8, 9], "push order {:?}", order);
    }
}

#[test]
fn long_adversarial_sequence_respects_bound_and_minimum() {
    let mut heap = ScoreHeap::new(10);
    // Descending pushes exercise percolate-up; ascending exercise root
    // replacement and percolate-down.
    for s in (0..100).rev() {
        heap.push(entry(s, 0));
        assert!(heap.len() <= 10);
    }
    for s in 100..200 {
        heap.push(entry(s, 0));
        assert!(heap.len() <= 10);
        let min = heap.min_score().unwrap();
        assert!(min <= s);
    }
    let mut retained: Vec<i32> = heap.drain().iter().map(|e| e.score).collect();
    retained.sort_unstable();
    assert_eq!(retained, (190..200).collect::<Vec<i32>>());
}

#[test]
fn capacity_one_keeps_single_best() {
    let mut heap = ScoreHeap::new(1);
    for s in [3, 9, 1, 9, 12, 2] {
        heap.push(entry(s, 0));
    }
    let retained = heap.drain();
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].score, 12);
}

#[test]
fn entries_keep_their_payload() {
    let mut heap = ScoreHeap::new(2);
    heap.push(ScoreEntry { score: 5, g_offset: 42, contig: 7, revcmpl: true, anchors: Vec::new() });
    heap.push(entry(9, 1));
    let retained = heap.drain();
    let kept = retained.iter().find(|e| e.score == 5).unwrap();
    assert_eq!(kept.g_offset, 42);
    assert_eq!(kept.contig, 7);
    assert!(kept.revcmpl);
}
