//! Decision sources for the generators.
//!
//! A [`SymbolIndex`] picks the alternative used for each substitution. None
//! of the implementations are synchronized; give every generator its own.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies the index of the alternative to expand
pub trait SymbolIndex {
    /// Return an index in `[0, bound)`; `bound` is always greater than zero
    fn next(&mut self, bound: usize) -> usize;
}

impl<F> SymbolIndex for F
where
    F: FnMut(usize) -> usize,
{
    fn next(&mut self, bound: usize) -> usize {
        self(bound)
    }
}

/// Uniformly random decisions from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomIndex<R> {
    rng: R,
}

impl<R: Rng> RandomIndex<R> {
    pub fn new(rng: R) -> Self {
        RandomIndex { rng }
    }
}

impl RandomIndex<StdRng> {
    /// Reproducible decisions from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        RandomIndex::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        RandomIndex::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SymbolIndex for RandomIndex<R> {
    fn next(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Decisions read from a fixed vector of codons.
///
/// Each call consumes the next codon and returns `codon % bound`; reading
/// wraps around to the first codon at the end of the vector.
#[derive(Debug, Clone)]
pub struct Codons {
    values: Vec<u8>,
    position: usize,
}

impl Codons {
    pub fn new(values: Vec<u8>) -> Self {
        Codons {
            values,
            position: 0,
        }
    }

    /// Number of codons consumed so far, wraps included
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl SymbolIndex for Codons {
    fn next(&mut self, bound: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let codon = self.values[self.position % self.values.len()];
        self.position += 1;
        codon as usize % bound
    }
}
