pub mod mutation;
pub mod runner;

use fastrand::Rng;
use image::Rgb;

use crate::scorer::{DeviationScorer, NeighborhoodStats};

/// Fitness carried by a candidate that has not been scored this generation.
pub const UNSCORED: f32 = f32::INFINITY;

/// One replacement color under evaluation. The stored fitness is always a
/// non-negative magnitude; lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub color: Rgb<u8>,
    pub fitness: f32,
}

impl Candidate {
    pub fn unscored(color: Rgb<u8>) -> Self {
        Self {
            color,
            fitness: UNSCORED,
        }
    }
}

/// One pixel's generation of candidates. Holds exactly the configured
/// population size from seeding onward; order is meaningful only after
/// `sort_by_fitness`.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Candidate>,
}

impl Population {
    /// Seeds one candidate per neighborhood pixel. Clipped windows hand in
    /// short samples, which are padded with random mutants up to `size`;
    /// oversized samples are cut off at `size`.
    pub fn seed(neighborhood: &[Rgb<u8>], size: usize, rng: &mut Rng) -> Self {
        let mut members: Vec<Candidate> = neighborhood
            .iter()
            .take(size)
            .map(|&color| Candidate::unscored(color))
            .collect();
        while members.len() < size {
            members.push(Candidate::unscored(mutation::random_color(rng)));
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    /// Rescores every member against the fixed neighborhood reference.
    pub fn score_against(&mut self, scorer: &DeviationScorer, stats: &NeighborhoodStats) {
        for member in &mut self.members {
            member.fitness = scorer.fitness(member.color, stats);
        }
    }

    /// Stable ascending sort, fittest first. Equal scores keep their
    /// relative order.
    pub fn sort_by_fitness(&mut self) {
        self.members.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
    }

    /// The front of the sorted population. Populations are never empty.
    pub fn fittest(&self) -> &Candidate {
        &self.members[0]
    }

    /// Swaps in the next generation.
    pub fn replace(&mut self, next: Vec<Candidate>) {
        self.members = next;
    }
}
