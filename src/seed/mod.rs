//! Spaced-seed patterns.
//!
//! A seed is a string of `1`s (sampled positions) and `0`s (don't-care
//! positions). During indexing and scanning the sampled positions of a
//! k-mer window are gathered into a compressed key; the don't-care
//! positions buy sensitivity to mismatches at no key-width cost.

use anyhow::{bail, Result};

/// Seeds wider than a `u64` mask cannot be represented.
pub const MAX_SEED_SPAN: usize = 64;

/// Direct-indexed tables hold `4^weight` buckets; heavier seeds must use
/// the hashed table instead.
pub const MAX_SEED_WEIGHT: u32 = 14;

/// One spaced seed. Bit `j` of `mask` is set when position `j` of the
/// pattern (left to right) is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub mask: u64,
    pub span: usize,
    pub weight: u32,
}

impl Seed {
    pub fn parse(pattern: &str) -> Result<Seed> {
        let span = pattern.len();
        if span < 1 || span > MAX_SEED_SPAN {
            bail!("invalid spaced seed \"{}\": span must be 1..={}", pattern, MAX_SEED_SPAN);
        }
        let mut mask = 0u64;
        for (j, c) in pattern.chars().enumerate() {
            match c {
                '1' => mask |= 1 << j,
                '0' => {}
                _ => bail!("invalid spaced seed \"{}\": only '0' and '1' are allowed", pattern),
            }
        }
        let weight = mask.count_ones();
        if weight < 1 {
            bail!("invalid spaced seed \"{}\": at least one sampled position required", pattern);
        }
        Ok(Seed { mask, span, weight })
    }

    /// Render the pattern back as a `0`/`1` string.
    pub fn pattern(&self) -> String {
        (0..self.span)
            .map(|j| if (self.mask >> j) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// An ordered collection of seeds; insertion order is scan order.
#[derive(Debug, Clone)]
pub struct SeedSet {
    seeds: Vec<Seed>,
    max_span: usize,
}

/// The classic sensitive default, shared by both encoding modes.
pub const DEFAULT_SEED: &str = "11110111";

impl SeedSet {
    pub fn from_patterns(patterns: &[String]) -> Result<SeedSet> {
        if patterns.is_empty() {
            return SeedSet::from_patterns(&[DEFAULT_SEED.to_string()]);
        }
        let mut seeds = Vec::with_capacity(patterns.len());
        for p in patterns {
            seeds.push(Seed::parse(p)?);
        }
        let max_span = seeds.iter().map(|s| s.span).max().unwrap_or(0);
        Ok(SeedSet { seeds, max_span })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, sn: usize) -> &Seed {
        &self.seeds[sn]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seed> {
        self.seeds.iter()
    }

    /// Widest span across the set; the scan window is sized to this.
    #[inline(always)]
    pub fn max_span(&self) -> usize {
        self.max_span
    }

    /// Heaviest seed weight, used to validate direct-table limits.
    pub fn max_weight(&self) -> u32 {
        self.seeds.iter().map(|s| s.weight).max().unwrap_or(0)
    }
}
